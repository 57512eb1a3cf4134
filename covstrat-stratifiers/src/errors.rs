use covstrat_core::CovStratError;
use thiserror::Error;

/// Error type for covstrat-stratifiers operations.
#[derive(Error, Debug)]
pub enum StratifierError {
    #[error("Invalid stratification config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Core(#[from] CovStratError),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StratifierError>;

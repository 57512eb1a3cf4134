use statrs::distribution::{Discrete, Poisson};

/// Division that yields zero when the denominator is zero.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

///
/// Poisson probability mass at `k` for the given mean.
///
/// A mean of zero (or anything that is not a positive finite number) is treated
/// as the degenerate distribution with all of its mass at zero.
///
pub fn poisson_probability(mean: f64, k: u64) -> f64 {
    match Poisson::new(mean) {
        Ok(poisson) if mean > 0.0 && mean.is_finite() => poisson.pmf(k),
        _ => {
            if k == 0 {
                1.0
            } else {
                0.0
            }
        }
    }
}

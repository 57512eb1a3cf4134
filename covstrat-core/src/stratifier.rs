//! The stratifier abstraction and binning helpers.
//!
//! A stratifier maps one input (a reference window, a feature set, an aligned
//! read) to a single [`Value`]. Stratifiers are composed into ordered
//! [`StratifierList`]s whose values, in order, form the leading part of a
//! [`StratificationKey`].

use std::fmt;

use crate::key::{StratificationKey, Value};
use crate::table::{Column, ColumnFormat};

/// Number of bases before and after the current position a stratifier looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseWindow {
    pub leading: u32,
    pub trailing: u32,
}

impl BaseWindow {
    pub fn new(leading: u32, trailing: u32) -> Self {
        BaseWindow { leading, trailing }
    }

    /// The smallest window covering both `self` and `other`.
    pub fn union(&self, other: &BaseWindow) -> BaseWindow {
        BaseWindow {
            leading: self.leading.max(other.leading),
            trailing: self.trailing.max(other.trailing),
        }
    }

    /// Bases covered including the center position.
    pub fn width(&self) -> u32 {
        self.leading + self.trailing + 1
    }
}

pub trait Stratifier<In: ?Sized>: Send + Sync {
    /// Name of the report column holding this stratifier's values.
    fn column_name(&self) -> &str;

    fn column_format(&self) -> ColumnFormat;

    /// Compute the value for `input`. Only called while the stratifier is enabled.
    fn evaluate(&self, input: &In) -> Value;

    fn is_enabled(&self) -> bool {
        true
    }

    /// The value every input collapses to while disabled.
    fn disabled_value(&self) -> Value {
        Value::Disabled
    }

    /// The value for `input`, rounded to the printed precision of the column.
    fn stratify(&self, input: &In) -> Value {
        if self.is_enabled() {
            self.column_format().normalize(self.evaluate(input))
        } else {
            self.disabled_value()
        }
    }

    /// Reference context required around the position, for window based stratifiers.
    fn window(&self) -> Option<BaseWindow> {
        None
    }

    fn column(&self) -> Column {
        Column::new(self.column_name(), self.column_format())
    }
}

///
/// Attaches a base window to a stratifier that does not declare one.
///
#[derive(Debug, Clone)]
pub struct Windowed<S> {
    inner: S,
    window: BaseWindow,
}

impl<S> Windowed<S> {
    pub fn new(inner: S, window: BaseWindow) -> Self {
        Windowed { inner, window }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<In: ?Sized, S: Stratifier<In>> Stratifier<In> for Windowed<S> {
    fn column_name(&self) -> &str {
        self.inner.column_name()
    }

    fn column_format(&self) -> ColumnFormat {
        self.inner.column_format()
    }

    fn evaluate(&self, input: &In) -> Value {
        self.inner.evaluate(input)
    }

    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    fn disabled_value(&self) -> Value {
        self.inner.disabled_value()
    }

    fn window(&self) -> Option<BaseWindow> {
        Some(self.window)
    }
}

/// An ordered list of stratifiers over the same input type.
pub struct StratifierList<In: ?Sized> {
    stratifiers: Vec<Box<dyn Stratifier<In>>>,
}

impl<In: ?Sized> Default for StratifierList<In> {
    fn default() -> Self {
        StratifierList {
            stratifiers: Vec::new(),
        }
    }
}

impl<In: ?Sized> fmt::Debug for StratifierList<In> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stratifiers.iter().map(|s| s.column()))
            .finish()
    }
}

impl<In: ?Sized> StratifierList<In> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S: Stratifier<In> + 'static>(&mut self, stratifier: S) {
        self.stratifiers.push(Box::new(stratifier));
    }

    pub fn push_boxed(&mut self, stratifier: Box<dyn Stratifier<In>>) {
        self.stratifiers.push(stratifier);
    }

    pub fn len(&self) -> usize {
        self.stratifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stratifiers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Stratifier<In>> {
        self.stratifiers.iter().map(|s| s.as_ref())
    }

    pub fn columns(&self) -> Vec<Column> {
        self.stratifiers.iter().map(|s| s.column()).collect()
    }

    /// Widest window declared by any stratifier in the list.
    pub fn window(&self) -> BaseWindow {
        self.stratifiers
            .iter()
            .filter_map(|s| s.window())
            .fold(BaseWindow::default(), |acc, w| acc.union(&w))
    }

    /// Appends one value per stratifier to `key`, in list order.
    pub fn stratify_into(&self, input: &In, key: &mut StratificationKey) {
        for stratifier in &self.stratifiers {
            key.append(stratifier.stratify(input));
        }
    }

    pub fn key(&self, input: &In) -> StratificationKey {
        let mut key = StratificationKey::with_capacity(self.stratifiers.len());
        self.stratify_into(input, &mut key);
        key
    }
}

/// `floor(value / size) * size`. `size` must be positive.
pub fn bin_integer(value: i64, size: i64) -> i64 {
    debug_assert!(size > 0, "bin size must be positive");
    value.div_euclid(size) * size
}

pub fn bin_integer_capped(value: i64, size: i64, max: i64) -> i64 {
    bin_integer(value, size).min(max)
}

pub fn bin_float(value: f64, size: f64) -> f64 {
    debug_assert!(size > 0.0, "bin size must be positive");
    (value / size).floor() * size
}

pub fn bin_float_capped(value: f64, size: f64, max: f64) -> f64 {
    bin_float(value, size).min(max)
}

//! Multi-dimension keyed numeric tables.
//!
//! A [`DataTable`] is an ordered collection of observations. Each observation
//! carries one [`Label`] per named dimension (e.g. `model`, `metric`,
//! `rng_offset`, `iteration`) and one `f32` per named value field (usually
//! just `value`, or `mean`/`std` for precomputed statistics).

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};

/// Name of the value field used by [`DataTable::new`].
pub const VALUE_FIELD: &str = "value";

/// A categorical dimension value.
///
/// Numeric labels order numerically (integers and floats interleave by
/// value); text labels order after all numeric labels, lexicographically.
#[derive(Debug, Clone)]
pub enum Label {
    /// Integer label (iterations, seeds, epochs).
    Int(i64),
    /// Floating-point label (fidelities, learning rates).
    Float(f64),
    /// Text label (model names, metric names).
    Text(String),
}

impl Label {
    /// Numeric value of the label, if it has one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Label::Int(v) => Some(*v as f64),
            Label::Float(v) => Some(*v),
            Label::Text(_) => None,
        }
    }

    /// Text of the label, if it is textual.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Label::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Whether the label is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Label::Text(_))
    }

    fn rank(&self) -> u8 {
        match self {
            Label::Int(_) => 0,
            Label::Float(_) => 1,
            Label::Text(_) => 2,
        }
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Label {}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Label::Int(a), Label::Int(b)) => a.cmp(b),
            (Label::Float(a), Label::Float(b)) => a.total_cmp(b),
            (Label::Text(a), Label::Text(b)) => a.cmp(b),
            (Label::Text(_), _) => Ordering::Greater,
            (_, Label::Text(_)) => Ordering::Less,
            (a, b) => {
                let (x, y) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                x.total_cmp(&y).then(a.rank().cmp(&b.rank()))
            }
        }
    }
}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Label::Int(v) => v.hash(state),
            Label::Float(v) => v.to_bits().hash(state),
            Label::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(v) => write!(f, "{v}"),
            Label::Float(v) => write!(f, "{v}"),
            Label::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Label {
    fn from(v: i64) -> Self {
        Label::Int(v)
    }
}

impl From<i32> for Label {
    fn from(v: i32) -> Self {
        Label::Int(i64::from(v))
    }
}

impl From<u32> for Label {
    fn from(v: u32) -> Self {
        Label::Int(i64::from(v))
    }
}

impl From<usize> for Label {
    fn from(v: usize) -> Self {
        Label::Int(v as i64)
    }
}

impl From<f64> for Label {
    fn from(v: f64) -> Self {
        Label::Float(v)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Text(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label::Text(s)
    }
}

/// Ordered, read-only-after-construction table of keyed observations.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    /// Dimension names, in key order.
    dimensions: Vec<String>,
    /// Value field names, in value order.
    fields: Vec<String>,
    /// Row-major keys, `dimensions.len()` labels per row.
    keys: Vec<Label>,
    /// Row-major values, `fields.len()` values per row.
    values: Vec<f32>,
}

impl DataTable {
    /// Create an empty table with the given dimensions and a single `value` field.
    #[must_use]
    pub fn new(dimensions: &[&str]) -> Self {
        Self::with_fields(dimensions, &[VALUE_FIELD])
    }

    /// Create an empty table with the given dimensions and value fields.
    #[must_use]
    pub fn with_fields(dimensions: &[&str], fields: &[&str]) -> Self {
        Self {
            dimensions: dimensions.iter().map(|s| (*s).to_string()).collect(),
            fields: fields.iter().map(|s| (*s).to_string()).collect(),
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Append an observation with a single value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key length does not match the dimension count
    /// or the table has more than one value field.
    pub fn push<I, L>(&mut self, key: I, value: f32) -> Result<()>
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        self.push_fields(key, &[value])
    }

    /// Append an observation with one value per field.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or value count does not match the table.
    pub fn push_fields<I, L>(&mut self, key: I, values: &[f32]) -> Result<()>
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        let key: Vec<Label> = key.into_iter().map(Into::into).collect();
        if key.len() != self.dimensions.len() {
            return Err(Error::DataLengthMismatch {
                expected: self.dimensions.len(),
                actual: key.len(),
            });
        }
        if values.len() != self.fields.len() {
            return Err(Error::DataLengthMismatch {
                expected: self.fields.len(),
                actual: values.len(),
            });
        }
        self.keys.extend(key);
        self.values.extend_from_slice(values);
        Ok(())
    }

    /// Number of observations.
    #[must_use]
    pub fn nrows(&self) -> usize {
        if self.dimensions.is_empty() {
            self.values.len() / self.fields.len().max(1)
        } else {
            self.keys.len() / self.dimensions.len()
        }
    }

    /// Whether the table holds no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nrows() == 0
    }

    /// Dimension names.
    #[must_use]
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// Value field names.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Position of a dimension in the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionNotFound`] if the table has no such dimension.
    pub fn dimension_index(&self, name: &str) -> Result<usize> {
        self.dimensions.iter().position(|d| d == name).ok_or_else(|| Error::DimensionNotFound {
            name: name.to_string(),
            available: self.dimensions.clone(),
        })
    }

    /// Check that `dim` is a dimension position of this table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionNotFound`] when `dim` is out of range.
    pub fn check_dimension(&self, dim: usize) -> Result<()> {
        if dim < self.dimensions.len() {
            return Ok(());
        }
        Err(Error::DimensionNotFound { name: format!("#{dim}"), available: self.dimensions.clone() })
    }

    /// Position of a value field.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    /// Label of `row` along dimension `dim`.
    #[must_use]
    pub fn label(&self, row: usize, dim: usize) -> &Label {
        &self.keys[row * self.dimensions.len() + dim]
    }

    /// Full key of `row`.
    #[must_use]
    pub fn key(&self, row: usize) -> &[Label] {
        let n = self.dimensions.len();
        &self.keys[row * n..(row + 1) * n]
    }

    /// Value of `row` in field `field`.
    #[must_use]
    pub fn value(&self, row: usize, field: usize) -> f32 {
        self.values[row * self.fields.len() + field]
    }

    /// Unique labels of a dimension, in first-appearance order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionNotFound`] if the table has no such dimension.
    pub fn unique(&self, name: &str) -> Result<Vec<Label>> {
        let dim = self.dimension_index(name)?;
        Ok(self.unique_at(dim, 0..self.nrows()))
    }

    /// Unique labels of dimension `dim` over the given rows, in first-appearance order.
    pub(crate) fn unique_at(&self, dim: usize, rows: impl IntoIterator<Item = usize>) -> Vec<Label> {
        let mut seen = HashSet::new();
        let mut labels = Vec::new();
        for row in rows {
            let label = self.label(row, dim);
            if seen.insert(label) {
                labels.push(label.clone());
            }
        }
        labels
    }

    /// Check that every name is a dimension of this table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionNotFound`] for the first unknown name.
    pub fn require_dimensions<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            self.dimension_index(name.as_ref())?;
        }
        Ok(())
    }
}

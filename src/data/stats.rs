//! Replicate aggregation into mean/standard-deviation curves.
//!
//! Observations sharing a `(series, x)` pair are collapsed over every other
//! dimension (seeds, replicates). The spread is the sample standard deviation
//! (divisor `n - 1`), defined as `0` for single-observation groups.

use std::collections::HashMap;

use trueno::Vector;

use super::table::{Label, VALUE_FIELD};
use super::view::CrossSection;
use crate::error::{Error, Result};

/// Name of the mean field expected by [`StatsInput::precomputed`].
pub const MEAN_FIELD: &str = "mean";
/// Name of the standard-deviation field expected by [`StatsInput::precomputed`].
pub const STD_FIELD: &str = "std";

/// How the renderer obtains per-point statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsInput {
    /// Raw replicate observations; statistics are computed on the fly.
    RawReplicateData {
        /// Value field holding the observations.
        value: String,
    },
    /// Statistics already present in the table, one row per `(series, x)`.
    PrecomputedStats {
        /// Field holding the means.
        mean: String,
        /// Field holding the standard deviations.
        std: String,
    },
}

impl Default for StatsInput {
    fn default() -> Self {
        Self::raw()
    }
}

impl StatsInput {
    /// Raw replicate observations in the `value` field.
    #[must_use]
    pub fn raw() -> Self {
        StatsInput::RawReplicateData { value: VALUE_FIELD.to_string() }
    }

    /// Precomputed statistics in the `mean` and `std` fields.
    #[must_use]
    pub fn precomputed() -> Self {
        StatsInput::PrecomputedStats { mean: MEAN_FIELD.to_string(), std: STD_FIELD.to_string() }
    }
}

/// Aggregated statistics at one x position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatPoint {
    /// Numeric x position.
    pub x: f64,
    /// Mean of the group.
    pub mean: f32,
    /// Standard deviation of the group.
    pub std: f32,
    /// Number of observations behind the point (1 for precomputed input).
    pub count: usize,
}

impl StatPoint {
    /// Lower edge of the 1-sigma band.
    #[must_use]
    pub fn lower(&self) -> f32 {
        self.mean - self.std
    }

    /// Upper edge of the 1-sigma band.
    #[must_use]
    pub fn upper(&self) -> f32 {
        self.mean + self.std
    }
}

/// One series' points, sorted ascending by x.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesCurve {
    /// Series label.
    pub label: Label,
    /// Points sorted by x.
    pub points: Vec<StatPoint>,
}

/// Aggregated curves of one panel, in first-appearance order of the series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesStats {
    curves: Vec<SeriesCurve>,
}

impl SeriesStats {
    /// All curves.
    #[must_use]
    pub fn curves(&self) -> &[SeriesCurve] {
        &self.curves
    }

    /// Curve of a series, if the panel has one.
    #[must_use]
    pub fn get(&self, label: &Label) -> Option<&SeriesCurve> {
        self.curves.iter().find(|c| &c.label == label)
    }

    /// Number of series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Whether no series were aggregated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    fn points(&self) -> impl Iterator<Item = &StatPoint> {
        self.curves.iter().flat_map(|c| c.points.iter())
    }

    /// Minimum and maximum of the means.
    #[must_use]
    pub fn mean_extent(&self) -> Option<(f32, f32)> {
        extent(self.points().map(|p| p.mean))
    }

    /// Minimum of `mean - std` and maximum of `mean + std`.
    #[must_use]
    pub fn band_extent(&self) -> Option<(f32, f32)> {
        let (lo, _) = extent(self.points().map(StatPoint::lower))?;
        let (_, hi) = extent(self.points().map(StatPoint::upper))?;
        Some((lo, hi))
    }

    /// Minimum and maximum of the x positions.
    #[must_use]
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        let xs: Vec<f64> = self.points().map(|p| p.x).collect();
        if xs.is_empty() {
            return None;
        }
        let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((lo, hi))
    }
}

fn extent(values: impl Iterator<Item = f32>) -> Option<(f32, f32)> {
    let values: Vec<f32> = values.filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return None;
    }
    let v = Vector::from_vec(values);
    Some((v.min().ok()?, v.max().ok()?))
}

/// Arithmetic mean and sample standard deviation of a non-empty group.
///
/// # Errors
///
/// Returns [`Error::EmptyData`] for an empty group and
/// [`Error::DataShape`] if the SIMD reduction fails.
pub fn mean_std(values: &[f32]) -> Result<(f32, f32)> {
    if values.is_empty() {
        return Err(Error::EmptyData);
    }
    let mean = Vector::from_slice(values).mean().map_err(|e| Error::DataShape(e.to_string()))?;
    if values.len() == 1 {
        return Ok((mean, 0.0));
    }

    let deviations = Vector::from_vec(values.iter().map(|v| v - mean).collect());
    let squares = deviations.mul(&deviations).map_err(|e| Error::DataShape(e.to_string()))?;
    let sum_sq: f32 = squares.as_slice().iter().sum();
    let variance = sum_sq / (values.len() - 1) as f32;
    Ok((mean, variance.max(0.0).sqrt()))
}

fn numeric_x(label: &Label, x_name: &str) -> Result<f64> {
    label.as_f64().ok_or_else(|| {
        Error::DataShape(format!("x-axis dimension '{x_name}' has non-numeric label '{label}'"))
    })
}

fn require_field(section: &CrossSection<'_>, name: &str) -> Result<usize> {
    section.table().field_index(name).ok_or_else(|| {
        Error::DataShape(format!(
            "field '{name}' is missing, table has fields {:?}",
            section.table().fields()
        ))
    })
}

/// Aggregate a cross-section into per-series curves.
///
/// `series_dim` and `x_dim` are dimension positions in the backing table.
///
/// # Errors
///
/// Returns [`Error::DimensionNotFound`] for an out-of-range dimension
/// position and [`Error::DataShape`] when the x dimension is not numeric, the
/// required value fields are missing, the series and x dimensions coincide,
/// or precomputed input carries more than one row per `(series, x)`.
pub fn aggregate(
    section: &CrossSection<'_>,
    series_dim: usize,
    x_dim: usize,
    input: &StatsInput,
) -> Result<SeriesStats> {
    let table = section.table();
    table.check_dimension(series_dim)?;
    table.check_dimension(x_dim)?;
    if series_dim == x_dim {
        return Err(Error::DataShape(
            "series and x-axis must be different dimensions".to_string(),
        ));
    }
    let x_name = table.dimensions()[x_dim].as_str();

    let mut order: Vec<Label> = Vec::new();
    let mut slots: HashMap<Label, usize> = HashMap::new();
    let mut groups: Vec<Vec<(Label, Vec<usize>)>> = Vec::new();
    let mut positions: HashMap<(Label, Label), usize> = HashMap::new();

    for &row in section.rows() {
        let series = table.label(row, series_dim);
        let x = table.label(row, x_dim);
        let slot = *slots.entry(series.clone()).or_insert_with(|| {
            order.push(series.clone());
            groups.push(Vec::new());
            groups.len() - 1
        });
        let pos = *positions.entry((series.clone(), x.clone())).or_insert_with(|| {
            groups[slot].push((x.clone(), Vec::new()));
            groups[slot].len() - 1
        });
        groups[slot][pos].1.push(row);
    }

    let mut curves = Vec::with_capacity(order.len());
    for (label, series_groups) in order.into_iter().zip(groups) {
        let mut points = Vec::with_capacity(series_groups.len());
        for (x, rows) in series_groups {
            let x_val = numeric_x(&x, x_name)?;
            let point = match input {
                StatsInput::RawReplicateData { value } => {
                    let field = require_field(section, value)?;
                    let values: Vec<f32> = rows.iter().map(|&r| table.value(r, field)).collect();
                    let (mean, std) = mean_std(&values)?;
                    StatPoint { x: x_val, mean, std, count: values.len() }
                }
                StatsInput::PrecomputedStats { mean, std } => {
                    let mean_field = require_field(section, mean)?;
                    let std_field = require_field(section, std)?;
                    if rows.len() != 1 {
                        return Err(Error::DataShape(format!(
                            "precomputed statistics expect one row per series/x pair, \
                             found {} rows for {label} at {x_name}={x}",
                            rows.len()
                        )));
                    }
                    StatPoint {
                        x: x_val,
                        mean: table.value(rows[0], mean_field),
                        std: table.value(rows[0], std_field),
                        count: 1,
                    }
                }
            };
            points.push(point);
        }
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        curves.push(SeriesCurve { label, points });
    }

    Ok(SeriesStats { curves })
}

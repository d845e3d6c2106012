//! Grid figure families.
//!
//! Each family has a per-panel renderer and a figure driver that plans the
//! grid, walks the panels in row-major order and assembles the shared legend.

mod hist_groups;
mod mean_std;
mod rank_correlation;

pub use hist_groups::{HistGroupRenderer, HistGroupsPlot};
pub use mean_std::{MeanStdPlot, MeanStdRenderer, YAxis};
pub use rank_correlation::{LabeledMatrix, RankCorrelationPlot};

use crate::data::{DataTable, Label};
use crate::error::{Error, Result};

/// Grid labels along an optional dimension: its unique labels, or a single
/// `None` slot when the dimension is absent.
pub(crate) fn grid_labels(table: &DataTable, dim: Option<&str>) -> Result<Vec<Option<Label>>> {
    match dim {
        Some(name) => Ok(table.unique(name)?.into_iter().map(Some).collect()),
        None => Ok(vec![None]),
    }
}

/// Validate a comparison list against the table and the family's maximum.
pub(crate) fn check_compare(table: &DataTable, compare: &[String], max: usize) -> Result<()> {
    if compare.is_empty() {
        return Err(Error::Configuration("at least one comparison dimension is required".to_string()));
    }
    if compare.len() > max {
        return Err(Error::TooManyDimensions { count: compare.len(), max });
    }
    table.require_dimensions(compare)
}

/// `"{dimension}={label}"`, or the bare dimension when the slot is unlabeled.
pub(crate) fn coordinate(dimension: &str, label: Option<&Label>) -> String {
    match label {
        Some(label) => format!("{dimension}={label}"),
        None => dimension.to_string(),
    }
}

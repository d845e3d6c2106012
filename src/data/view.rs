//! Cross-section lookup for grid panels.
//!
//! [`MultiIndexView`] groups the rows of a [`DataTable`] by the grid's
//! column dimension and by the (row, column) dimension pair in a single pass,
//! so every panel lookup afterwards is a hash probe instead of a table scan.

use std::collections::HashMap;

use super::table::{DataTable, Label};
use crate::error::{Error, Result};

/// A subset of table rows fixed at one panel's coordinates.
#[derive(Debug, Clone, Copy)]
pub struct CrossSection<'a> {
    table: &'a DataTable,
    rows: &'a [usize],
}

impl<'a> CrossSection<'a> {
    /// Wrap explicit row indices of `table`.
    #[must_use]
    pub fn new(table: &'a DataTable, rows: &'a [usize]) -> Self {
        Self { table, rows }
    }

    /// Backing table.
    #[must_use]
    pub fn table(&self) -> &'a DataTable {
        self.table
    }

    /// Row indices into the backing table, in table order.
    #[must_use]
    pub fn rows(&self) -> &'a [usize] {
        self.rows
    }

    /// Number of rows in the cross-section.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the cross-section is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Unique labels of dimension `dim` in this subset, in first-appearance order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionNotFound`] when `dim` is not a dimension position.
    pub fn unique(&self, dim: usize) -> Result<Vec<Label>> {
        self.table.check_dimension(dim)?;
        Ok(self.table.unique_at(dim, self.rows.iter().copied()))
    }
}

/// Indexed view answering per-panel cross-section requests.
#[derive(Debug)]
pub struct MultiIndexView<'a> {
    table: &'a DataTable,
    row_dim: Option<(usize, String)>,
    col_dim: Option<(usize, String)>,
    all: Vec<usize>,
    by_col: HashMap<Label, Vec<usize>>,
    by_cell: HashMap<(Label, Label), Vec<usize>>,
}

impl<'a> MultiIndexView<'a> {
    /// Build the index for the given grid dimensions.
    ///
    /// A row dimension without a column dimension is rejected: the grid
    /// always fills columns first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionNotFound`] for unknown dimension names and
    /// [`Error::Configuration`] for a row dimension without a column dimension.
    pub fn new(table: &'a DataTable, row_dim: Option<&str>, col_dim: Option<&str>) -> Result<Self> {
        if row_dim.is_some() && col_dim.is_none() {
            return Err(Error::Configuration(
                "a grid row dimension requires a grid column dimension".to_string(),
            ));
        }
        let row_dim = row_dim.map(|n| table.dimension_index(n).map(|i| (i, n.to_string()))).transpose()?;
        let col_dim = col_dim.map(|n| table.dimension_index(n).map(|i| (i, n.to_string()))).transpose()?;

        let all: Vec<usize> = (0..table.nrows()).collect();
        let mut by_col: HashMap<Label, Vec<usize>> = HashMap::new();
        let mut by_cell: HashMap<(Label, Label), Vec<usize>> = HashMap::new();

        if let Some((c, _)) = &col_dim {
            for &row in &all {
                let col_label = table.label(row, *c);
                by_col.entry(col_label.clone()).or_default().push(row);
                if let Some((r, _)) = &row_dim {
                    by_cell
                        .entry((table.label(row, *r).clone(), col_label.clone()))
                        .or_default()
                        .push(row);
                }
            }
        }

        Ok(Self { table, row_dim, col_dim, all, by_col, by_cell })
    }

    /// Backing table.
    #[must_use]
    pub fn table(&self) -> &'a DataTable {
        self.table
    }

    /// Cross-section for one panel.
    ///
    /// - no column label: the whole table;
    /// - column label only: rows where the column dimension matches;
    /// - both labels: rows where both grid dimensions match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySelection`] when no rows match. Callers are
    /// expected to branch on it and render a blank panel.
    pub fn select(&self, row: Option<&Label>, col: Option<&Label>) -> Result<CrossSection<'_>> {
        let Some(col) = col else {
            return Ok(CrossSection::new(self.table, &self.all));
        };

        let rows = match (row, &self.row_dim) {
            (Some(row), Some(_)) => self.by_cell.get(&(row.clone(), col.clone())),
            _ => self.by_col.get(col),
        };

        match rows {
            Some(rows) if !rows.is_empty() => Ok(CrossSection::new(self.table, rows)),
            _ => Err(Error::EmptySelection { coordinates: self.describe(row, col) }),
        }
    }

    fn describe(&self, row: Option<&Label>, col: &Label) -> String {
        let col_name = self.col_dim.as_ref().map_or("column", |(_, n)| n.as_str());
        match (row, &self.row_dim) {
            (Some(row), Some((_, row_name))) => format!("{row_name}={row}, {col_name}={col}"),
            _ => format!("{col_name}={col}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_table() -> DataTable {
        let mut t = DataTable::new(&["model", "metric", "seed"]);
        for (model, metric, seed, v) in [
            ("A", "acc", 0, 0.9),
            ("B", "acc", 0, 0.8),
            ("A", "loss", 0, 0.1),
            ("A", "acc", 1, 0.7),
        ] {
            t.push([Label::from(model), Label::from(metric), Label::from(seed)], v).unwrap();
        }
        t
    }

    #[test]
    fn test_select_without_column_is_identity() {
        let t = grid_table();
        let view = MultiIndexView::new(&t, None, None).unwrap();
        let section = view.select(None, None).unwrap();
        assert_eq!(section.rows(), &[0, 1, 2, 3]);
        assert_eq!(section.len(), t.nrows());
    }

    #[test]
    fn test_select_column_only() {
        let t = grid_table();
        let view = MultiIndexView::new(&t, None, Some("metric")).unwrap();
        let section = view.select(None, Some(&Label::from("acc"))).unwrap();
        assert_eq!(section.rows(), &[0, 1, 3]);
    }

    #[test]
    fn test_select_cell() {
        let t = grid_table();
        let view = MultiIndexView::new(&t, Some("seed"), Some("metric")).unwrap();
        let section = view.select(Some(&Label::from(0)), Some(&Label::from("acc"))).unwrap();
        assert_eq!(section.rows(), &[0, 1]);
        assert_eq!(section.unique(0).unwrap(), vec![Label::from("A"), Label::from("B")]);
    }

    #[test]
    fn test_unique_rejects_out_of_range_dimension() {
        let t = grid_table();
        let rows = [0];
        let err = CrossSection::new(&t, &rows).unique(3).unwrap_err();
        assert!(matches!(err, Error::DimensionNotFound { .. }));
    }

    #[test]
    fn test_select_missing_cell_is_empty_selection() {
        let t = grid_table();
        let view = MultiIndexView::new(&t, Some("seed"), Some("metric")).unwrap();
        let err = view.select(Some(&Label::from(1)), Some(&Label::from("loss"))).unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("seed=1, metric=loss"));
    }

    #[test]
    fn test_unknown_dimension_is_fatal() {
        let t = grid_table();
        let err = MultiIndexView::new(&t, None, Some("dataset")).unwrap_err();
        assert!(matches!(err, Error::DimensionNotFound { .. }));
    }

    #[test]
    fn test_row_without_column_rejected() {
        let t = grid_table();
        let err = MultiIndexView::new(&t, Some("seed"), None).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}

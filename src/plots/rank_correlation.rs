//! Paired heat maps of a rank-correlation matrix and its p-values.
//!
//! Independent of the grid/legend engine: two stacked panels, one
//! color-mapped mesh each, with the cell value printed in every cell.

use std::collections::HashMap;

use tracing::info;

use crate::data::Label;
use crate::error::{Error, Result};
use crate::figure::{Colorbar, Figure, Mark, Panel};
use crate::geometry::Point;
use crate::layout::{GridLayoutPlanner, LegendPosition};
use crate::scale::{format_linear_ticks, linear_ticks, ColorScale, Scale, Tick};
use crate::style::Style;

/// Annotation font size in points.
const ANNOTATION_FONT_SIZE: f32 = 12.0;
/// Rotation of textual column labels.
const TEXT_LABEL_ROTATION: f32 = 45.0;
/// Overall figure size in inches.
const FIGURE_SIZE: (f32, f32) = (16.0, 9.0);

/// A dense matrix with labeled rows and columns.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    rows: Vec<Label>,
    cols: Vec<Label>,
    values: Vec<f32>,
}

impl LabeledMatrix {
    /// Create a matrix from row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLengthMismatch`] if `values` does not hold
    /// `rows.len() * cols.len()` entries.
    pub fn new(rows: Vec<Label>, cols: Vec<Label>, values: Vec<f32>) -> Result<Self> {
        let expected = rows.len() * cols.len();
        if values.len() != expected {
            return Err(Error::DataLengthMismatch { expected, actual: values.len() });
        }
        Ok(Self { rows, cols, values })
    }

    /// Row labels.
    #[must_use]
    pub fn rows(&self) -> &[Label] {
        &self.rows
    }

    /// Column labels.
    #[must_use]
    pub fn cols(&self) -> &[Label] {
        &self.cols
    }

    /// Row-major values.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Value at a row and column position.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        (row < self.rows.len() && col < self.cols.len()).then(|| self.values[row * self.cols.len() + col])
    }

    /// Whether the matrix has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop the listed row and column labels, keeping the order of the rest.
    #[must_use]
    pub fn without(&self, rows: &[Label], cols: &[Label]) -> Self {
        let keep_rows: Vec<usize> = (0..self.rows.len()).filter(|&i| !rows.contains(&self.rows[i])).collect();
        let keep_cols: Vec<usize> = (0..self.cols.len()).filter(|&j| !cols.contains(&self.cols[j])).collect();
        self.pick(&keep_rows, &keep_cols)
    }

    /// Reorder to the given row and column labels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataShape`] if a requested label is missing.
    pub fn align_to(&self, rows: &[Label], cols: &[Label]) -> Result<Self> {
        let find = |labels: &[Label], wanted: &[Label], axis: &str| -> Result<Vec<usize>> {
            let index: HashMap<&Label, usize> = labels.iter().enumerate().map(|(i, l)| (l, i)).collect();
            wanted
                .iter()
                .map(|l| {
                    index.get(l).copied().ok_or_else(|| Error::DataShape(format!("{axis} label '{l}' is missing")))
                })
                .collect()
        };
        let keep_rows = find(&self.rows, rows, "row")?;
        let keep_cols = find(&self.cols, cols, "column")?;
        Ok(self.pick(&keep_rows, &keep_cols))
    }

    fn pick(&self, rows: &[usize], cols: &[usize]) -> Self {
        let values =
            rows.iter().flat_map(|&i| cols.iter().map(move |&j| self.values[i * self.cols.len() + j])).collect();
        Self {
            rows: rows.iter().map(|&i| self.rows[i].clone()).collect(),
            cols: cols.iter().map(|&j| self.cols[j].clone()).collect(),
            values,
        }
    }
}

/// Builder for the correlation / p-value heat-map pair.
#[derive(Debug, Clone)]
pub struct RankCorrelationPlot {
    rho: LabeledMatrix,
    pvalues: LabeledMatrix,
    exclude_rows: Vec<Label>,
    exclude_cols: Vec<Label>,
    style: Style,
}

impl RankCorrelationPlot {
    /// Start from a correlation matrix and its p-value matrix.
    #[must_use]
    pub fn new(rho: LabeledMatrix, pvalues: LabeledMatrix) -> Self {
        Self { rho, pvalues, exclude_rows: Vec::new(), exclude_cols: Vec::new(), style: Style::default() }
    }

    /// Row labels to leave out.
    #[must_use]
    pub fn exclude_rows(mut self, labels: &[Label]) -> Self {
        self.exclude_rows = labels.to_vec();
        self
    }

    /// Column labels to leave out.
    #[must_use]
    pub fn exclude_cols(mut self, labels: &[Label]) -> Self {
        self.exclude_cols = labels.to_vec();
        self
    }

    /// Style configuration (fonts and colors; the figure size is fixed).
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Build the two-panel figure.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyData`] when exclusions leave no cells
    /// - [`Error::DataShape`] when the p-values miss a label of the
    ///   correlation matrix or any cell is NaN
    pub fn render(&self) -> Result<Figure> {
        let rho = self.rho.without(&self.exclude_rows, &self.exclude_cols);
        if rho.is_empty() {
            return Err(Error::EmptyData);
        }
        let pvalues = self.pvalues.align_to(rho.rows(), rho.cols())?;

        let style = self.style.clone().cell_size(FIGURE_SIZE.0, FIGURE_SIZE.1 / 2.0);
        let grid = GridLayoutPlanner::new(style.clone()).plan(2, 1, 0, LegendPosition::None)?;
        let mut figure = Figure::new(grid, style.clone());

        let panels = [
            (&rho, (-1.0, 1.0), "Spearman's Rank Correlation Comparison."),
            (&pvalues, (0.0, 1.0), "p-Values of the respective correlations."),
        ];
        for (row, (matrix, bounds, title)) in panels.into_iter().enumerate() {
            if matrix.values().iter().any(|v| v.is_nan()) {
                return Err(Error::DataShape(format!("found NaN in '{title}' matrix")));
            }
            let Some(panel) = figure.panel_mut(row, 0) else { continue };
            draw_matrix(panel, matrix, bounds)?;
            panel.title = Some(title.to_string());
        }
        figure.set_padding(style.panel_padding());

        info!(rows = rho.rows().len(), cols = rho.cols().len(), "Rank correlation figure complete");
        Ok(figure)
    }
}

fn draw_matrix(panel: &mut Panel, matrix: &LabeledMatrix, bounds: (f32, f32)) -> Result<()> {
    let scale = ColorScale::viridis(bounds)?;
    let (nrows, ncols) = (matrix.rows().len(), matrix.cols().len());

    panel.push(Mark::Mesh { rows: nrows, cols: ncols, values: matrix.values().to_vec(), scale: scale.clone() });
    for i in 0..nrows {
        for j in 0..ncols {
            let Some(v) = matrix.get(i, j) else { continue };
            panel.push(Mark::Text {
                position: Point::new(j as f32 + 0.5, i as f32 + 0.5),
                text: format!("{v:.4}"),
                font_size: ANNOTATION_FONT_SIZE,
                color: scale.scale(v).contrasting_text(),
            });
        }
    }

    panel.x_range = Some((0.0, ncols as f32));
    panel.y_range = Some((0.0, nrows as f32));
    panel.x_ticks =
        matrix.cols().iter().enumerate().map(|(j, l)| Tick::major(j as f32 + 0.5, l.to_string())).collect();
    panel.y_ticks =
        matrix.rows().iter().enumerate().map(|(i, l)| Tick::major(i as f32 + 0.5, l.to_string())).collect();
    if matrix.cols().iter().any(|l| !l.is_numeric()) {
        panel.x_tick_rotation = TEXT_LABEL_ROTATION;
    }

    let values = linear_ticks(bounds.0, bounds.1, 4);
    let labels = format_linear_ticks(&values, (-5, 6));
    panel.colorbar = Some(Colorbar {
        scale,
        ticks: values.iter().zip(labels.labels).map(|(&v, l)| Tick::major(v, l)).collect(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    fn labels(names: &[&str]) -> Vec<Label> {
        names.iter().map(|n| Label::from(*n)).collect()
    }

    fn matrices() -> (LabeledMatrix, LabeledMatrix) {
        let rho = LabeledMatrix::new(labels(&["lr", "wd"]), labels(&["acc", "loss", "time"]), vec![
            0.9, -0.8, 0.1, //
            0.2, -0.1, 0.0,
        ])
        .unwrap();
        let pval = LabeledMatrix::new(labels(&["wd", "lr"]), labels(&["time", "loss", "acc"]), vec![
            0.5, 0.6, 0.7, //
            0.3, 0.02, 0.01,
        ])
        .unwrap();
        (rho, pval)
    }

    fn texts(panel: &Panel) -> Vec<String> {
        panel
            .marks
            .iter()
            .filter_map(|m| match m {
                Mark::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_two_stacked_panels() {
        let (rho, pval) = matrices();
        let fig = RankCorrelationPlot::new(rho, pval).render().unwrap();
        assert_eq!((fig.nrows(), fig.ncols()), (2, 1));
        assert!(fig.legend().is_none());
        assert_eq!(fig.panel(0, 0).unwrap().title.as_deref(), Some("Spearman's Rank Correlation Comparison."));
        assert_eq!(fig.panel(1, 0).unwrap().title.as_deref(), Some("p-Values of the respective correlations."));
        assert!(fig.panels().iter().all(|p| p.colorbar.is_some()));
    }

    #[test]
    fn test_pvalues_aligned_to_rho() {
        let (rho, pval) = matrices();
        let fig = RankCorrelationPlot::new(rho, pval).render().unwrap();
        let p = texts(fig.panel(1, 0).unwrap());
        // row "lr" in rho order, columns acc, loss, time
        assert_eq!(&p[..3], &["0.0100", "0.0200", "0.3000"]);
    }

    #[test]
    fn test_annotations_and_ticks() {
        let (rho, pval) = matrices();
        let fig = RankCorrelationPlot::new(rho, pval).render().unwrap();
        let panel = fig.panel(0, 0).unwrap();
        assert_eq!(texts(panel)[0], "0.9000");
        assert_eq!(panel.x_ticks.len(), 3);
        assert!((panel.x_ticks[1].position - 1.5).abs() < f32::EPSILON);
        assert_eq!(panel.y_ticks[1].label, "wd");
        assert!((panel.x_tick_rotation - 45.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_text_contrasts_with_cell() {
        let (rho, pval) = matrices();
        let fig = RankCorrelationPlot::new(rho, pval).render().unwrap();
        let colors: Vec<Rgba> = fig
            .panel(0, 0)
            .unwrap()
            .marks
            .iter()
            .filter_map(|m| match m {
                Mark::Text { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        // 0.9 maps to a bright cell, -0.8 to a dark one
        assert_eq!(colors[0], Rgba::BLACK);
        assert_eq!(colors[1], Rgba::WHITE);
    }

    #[test]
    fn test_exclusions() {
        let (rho, pval) = matrices();
        let fig = RankCorrelationPlot::new(rho, pval)
            .exclude_rows(&labels(&["wd"]))
            .exclude_cols(&labels(&["time"]))
            .render()
            .unwrap();
        assert_eq!(texts(fig.panel(0, 0).unwrap()), vec!["0.9000", "-0.8000"]);
        assert_eq!(texts(fig.panel(1, 0).unwrap()), vec!["0.0100", "0.0200"]);
    }

    #[test]
    fn test_nan_rejected() {
        let rho = LabeledMatrix::new(labels(&["a"]), labels(&["b"]), vec![f32::NAN]).unwrap();
        let pval = LabeledMatrix::new(labels(&["a"]), labels(&["b"]), vec![0.1]).unwrap();
        let err = RankCorrelationPlot::new(rho, pval).render().unwrap_err();
        assert!(matches!(err, Error::DataShape(_)));
    }

    #[test]
    fn test_missing_pvalue_label() {
        let rho = LabeledMatrix::new(labels(&["a"]), labels(&["b"]), vec![0.5]).unwrap();
        let pval = LabeledMatrix::new(labels(&["z"]), labels(&["b"]), vec![0.1]).unwrap();
        assert!(matches!(RankCorrelationPlot::new(rho, pval).render(), Err(Error::DataShape(_))));
    }

    #[test]
    fn test_matrix_length_checked() {
        let err = LabeledMatrix::new(labels(&["a", "b"]), labels(&["c"]), vec![1.0]).unwrap_err();
        assert!(matches!(err, Error::DataLengthMismatch { expected: 2, actual: 1 }));
    }
}

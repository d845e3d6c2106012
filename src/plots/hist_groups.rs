//! Grouped horizontal bar histograms on a grid.
//!
//! Comparison roles: bar, group, grid column, grid row. Every observation of
//! a group becomes one bar; groups are stacked top to bottom with a fixed gap.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::data::{CrossSection, DataTable, Label, MultiIndexView, VALUE_FIELD};
use crate::error::{Error, Result};
use crate::figure::{Axis, Figure, GridLines, Mark, Panel};
use crate::layout::{GridLayoutPlanner, LegendPosition};
use crate::legend::LegendConsolidator;
use crate::palette::ColorAssigner;
use crate::scale::{format_linear_ticks, linear_ticks, Tick};
use crate::style::Style;

/// Most comparison dimensions a histogram figure accepts.
const MAX_COMPARE: usize = 4;
/// Most dimensions one histogram panel can show (bar and group).
const MAX_PANEL_COMPARE: usize = 2;

/// Draws one panel's grouped bars.
#[derive(Debug, Clone)]
pub struct HistGroupRenderer<'a> {
    style: &'a Style,
    value_field: String,
}

impl<'a> HistGroupRenderer<'a> {
    /// Create a renderer reading bar lengths from the `value` field.
    #[must_use]
    pub fn new(style: &'a Style) -> Self {
        Self { style, value_field: VALUE_FIELD.to_string() }
    }

    /// Field holding bar lengths.
    #[must_use]
    pub fn value_field(mut self, field: &str) -> Self {
        self.value_field = field.to_string();
        self
    }

    /// Draw bars for `compare = [bar_dim]` or `[bar_dim, group_dim]`.
    ///
    /// Without a group dimension the whole cross-section forms one unlabeled
    /// group. Bars of a group sit one thickness apart starting at the running
    /// offset; the offset then advances past the group plus the group gap.
    /// The group tick sits at the mean position of its bars.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for zero or more than two dimensions,
    /// [`Error::DimensionNotFound`] for an out-of-range dimension position and
    /// [`Error::DataShape`] when the value field is missing.
    pub fn render(
        &self,
        panel: &mut Panel,
        section: &CrossSection<'_>,
        compare: &[usize],
        colors: &mut ColorAssigner,
    ) -> Result<()> {
        let (bar_dim, group_dim) = match *compare {
            [bar] => (bar, None),
            [bar, group] => (bar, Some(group)),
            _ => {
                return Err(Error::Configuration(format!(
                    "a histogram panel compares 1 to {MAX_PANEL_COMPARE} dimensions, got {}",
                    compare.len()
                )))
            }
        };
        let table = section.table();
        for &dim in compare {
            table.check_dimension(dim)?;
        }
        let field = table.field_index(&self.value_field).ok_or_else(|| {
            Error::DataShape(format!("field '{}' is missing, table has fields {:?}", self.value_field, table.fields()))
        })?;

        let thickness = self.style.bar_thickness;
        let mut offset = thickness;
        for (group, rows) in groups(section, group_dim) {
            let mut positions = Vec::with_capacity(rows.len());
            for (i, &row) in rows.iter().enumerate() {
                let label = table.label(row, bar_dim);
                let y = offset + i as f32 * thickness;
                panel.push(Mark::Bar {
                    label: label.clone(),
                    y,
                    length: table.value(row, field),
                    thickness,
                    color: colors.color_for(label),
                    edge: self.style.bar_edge,
                });
                positions.push(y);
            }
            let centroid = positions.iter().sum::<f32>() / positions.len() as f32;
            panel.y_ticks.push(Tick::major(centroid, group.map(|g| g.to_string()).unwrap_or_default()));
            offset += rows.len() as f32 * thickness + self.style.group_gap();
        }
        panel.y_inverted = true;
        Ok(())
    }

    /// Apply x ticks and the x grid lines.
    pub fn decorate_axes(&self, panel: &mut Panel) {
        if let Some(((lo, hi), _)) = panel.data_ranges() {
            let values = linear_ticks(lo.min(0.0), hi.max(0.0), 5);
            let labels = format_linear_ticks(&values, (-5, 6));
            panel.x_ticks = values.iter().zip(labels.labels).map(|(&v, l)| Tick::major(v, l)).collect();
        }
        panel.grid.push(GridLines {
            axis: Axis::X,
            major: true,
            width: self.style.major_grid_width,
            dashed: false,
            color: self.style.grid_color,
        });
        panel.grid.push(GridLines {
            axis: Axis::X,
            major: false,
            width: self.style.grid_width,
            dashed: true,
            color: self.style.grid_color,
        });
    }
}

/// Rows of a cross-section grouped by label, in first-appearance order.
fn groups(section: &CrossSection<'_>, group_dim: Option<usize>) -> Vec<(Option<Label>, Vec<usize>)> {
    let Some(dim) = group_dim else {
        return vec![(None, section.rows().to_vec())];
    };
    let table = section.table();
    let mut out: Vec<(Option<Label>, Vec<usize>)> = Vec::new();
    let mut index: HashMap<&Label, usize> = HashMap::new();
    for &row in section.rows() {
        let label = table.label(row, dim);
        let slot = *index.entry(label).or_insert_with(|| {
            out.push((Some(label.clone()), Vec::new()));
            out.len() - 1
        });
        out[slot].1.push(row);
    }
    out
}

/// Builder for a grid of grouped histograms.
#[derive(Debug, Clone)]
pub struct HistGroupsPlot<'a> {
    table: &'a DataTable,
    compare: Vec<String>,
    x_label: String,
    value_field: String,
    legend_position: LegendPosition,
    suptitle: Option<String>,
    style: Style,
}

impl<'a> HistGroupsPlot<'a> {
    /// Start a histogram figure over a table.
    #[must_use]
    pub fn new(table: &'a DataTable) -> Self {
        Self {
            table,
            compare: Vec::new(),
            x_label: String::new(),
            value_field: VALUE_FIELD.to_string(),
            legend_position: LegendPosition::Auto,
            suptitle: None,
            style: Style::default(),
        }
    }

    /// Comparison dimensions: bar, group, grid column, grid row.
    #[must_use]
    pub fn compare(mut self, dimensions: &[&str]) -> Self {
        self.compare = dimensions.iter().map(ToString::to_string).collect();
        self
    }

    /// X-axis label shown on the bottom row.
    #[must_use]
    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    /// Field holding bar lengths.
    #[must_use]
    pub fn value_field(mut self, field: &str) -> Self {
        self.value_field = field.to_string();
        self
    }

    /// Legend position.
    #[must_use]
    pub fn legend_position(mut self, position: LegendPosition) -> Self {
        self.legend_position = position;
        self
    }

    /// Figure-level title.
    #[must_use]
    pub fn suptitle(mut self, title: impl Into<String>) -> Self {
        self.suptitle = Some(title.into());
        self
    }

    /// Style configuration.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Build the figure.
    ///
    /// # Errors
    ///
    /// - [`Error::TooManyDimensions`] for more than four comparison dimensions
    /// - [`Error::Configuration`] without comparison dimensions
    /// - [`Error::DimensionNotFound`] for unknown dimension names
    /// - [`Error::DataShape`] when the value field is missing
    pub fn render(&self) -> Result<Figure> {
        let table = self.table;
        let style = &self.style;
        info!(dimensions = ?self.compare, "Inferring plot layout");

        super::check_compare(table, &self.compare, MAX_COMPARE)?;
        let bar_name = self.compare[0].as_str();
        let group_name = self.compare.get(1).map(String::as_str);
        let col_name = self.compare.get(2).map(String::as_str);
        let row_name = self.compare.get(3).map(String::as_str);

        let panel_dims = self
            .compare
            .iter()
            .take(MAX_PANEL_COMPARE)
            .map(|n| table.dimension_index(n))
            .collect::<Result<Vec<_>>>()?;
        let col_labels = super::grid_labels(table, col_name)?;
        let row_labels = super::grid_labels(table, row_name)?;
        let legend_items = table.unique(bar_name)?.len();

        let grid = GridLayoutPlanner::new(style.clone()).plan(
            row_labels.len(),
            col_labels.len(),
            legend_items,
            self.legend_position,
        )?;
        info!(nrows = grid.nrows(), ncols = grid.ncols(), bars = legend_items, "Setting up plot");

        let view = MultiIndexView::new(table, row_name, col_name)?;
        let renderer = HistGroupRenderer::new(style).value_field(&self.value_field);
        let mut colors = ColorAssigner::new(style.palette.clone());
        let nrows = grid.nrows();
        let ncols = grid.ncols();
        let mut figure = Figure::new(grid, style.clone());

        for (ridx, row) in row_labels.iter().enumerate() {
            for (cidx, col) in col_labels.iter().enumerate() {
                let Some(panel) = figure.panel_mut(ridx, cidx) else { continue };
                match view.select(row.as_ref(), col.as_ref()) {
                    Ok(section) => {
                        debug!(row = ?row, col = ?col, rows = section.len(), "Drawing histogram panel");
                        renderer.render(panel, &section, &panel_dims, &mut colors)?;
                    }
                    Err(e) if e.is_recoverable() => debug!(error = %e, "Leaving panel blank"),
                    Err(e) => return Err(e),
                }
                renderer.decorate_axes(panel);

                if ridx == nrows - 1 && !self.x_label.is_empty() {
                    panel.x_label = Some(self.x_label.clone());
                }
                if let (0, Some(name)) = (ridx, col_name) {
                    panel.title = Some(super::coordinate(name, col.as_ref()));
                }
                if cidx == 0 {
                    panel.y_label = group_name.map(ToString::to_string);
                }
                if let (true, Some(name)) = (cidx == ncols - 1, row_name) {
                    panel.secondary_y_label = Some(super::coordinate(name, row.as_ref()));
                }
            }
        }

        if let Some(geometry) = figure.grid().legend().copied() {
            figure.set_legend(LegendConsolidator::from_colors(
                &colors,
                bar_name,
                style.legend_handle_width,
                &geometry,
                style.legend_font_size,
            ));
        }
        figure.set_padding(style.panel_padding());
        if let Some(title) = &self.suptitle {
            figure.set_suptitle(title.clone());
        }

        info!(panels = figure.panels().len(), colors = colors.len(), "Histogram figure complete");
        Ok(figure)
    }
}

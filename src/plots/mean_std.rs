//! Mean +/- standard deviation trend curves on a grid.
//!
//! The first comparison dimension distinguishes series inside a panel, the
//! second (optional) spreads panels over columns and the third (optional)
//! over rows. All remaining dimensions except the x-axis are collapsed as
//! replicates.

use tracing::{debug, info, warn};

use crate::color::Rgba;
use crate::data::{aggregate, CrossSection, DataTable, Label, MultiIndexView, SeriesStats, StatsInput};
use crate::error::{Error, Result};
use crate::figure::{Axis, Figure, GridLines, Mark, Panel, YScale};
use crate::geometry::Point;
use crate::layout::{GridLayoutPlanner, LegendPosition};
use crate::legend::LegendConsolidator;
use crate::palette::ColorAssigner;
use crate::scale::{format_linear_ticks, linear_ticks, log_ticks, Tick};
use crate::style::Style;

/// Most comparison dimensions a trend figure accepts.
const MAX_COMPARE: usize = 3;
/// Labeled decades on a log axis.
const LOG_MAJOR_TICKS: usize = 3;
/// Target tick count on linear axes.
const LINEAR_TICKS: usize = 5;
/// Power limits for x tick labels (scientific only for extreme magnitudes).
const X_POWER_LIMITS: (i32, i32) = (-5, 6);

/// Y-axis configuration shared by every panel of a figure.
#[derive(Debug, Clone, PartialEq)]
pub enum YAxis {
    /// Linear axis, ticks chosen per panel.
    Linear,
    /// Log axis with a figure-wide range and decade ticks.
    Log {
        /// Visible `(bottom, top)` range.
        range: (f32, f32),
        /// Shared ticks.
        ticks: Vec<Tick>,
    },
}

impl YAxis {
    /// Derive the shared axis from every panel's statistics.
    ///
    /// For a log axis the extremes of the means are taken over all panels,
    /// offset by the style's epsilon, and the bottom of the visible range is
    /// clipped to one decade below the smallest mean. Falls back to a linear
    /// axis when the means cannot be shown on a log scale.
    #[must_use]
    pub fn shared<'s>(stats: impl IntoIterator<Item = &'s SeriesStats>, style: &Style) -> Self {
        if !style.log_y {
            return YAxis::Linear;
        }
        let mut mean_lo = f32::INFINITY;
        let mut mean_hi = f32::NEG_INFINITY;
        let mut band_hi = f32::NEG_INFINITY;
        let mut positive_lo = f32::INFINITY;
        for s in stats {
            if let Some((lo, hi)) = s.mean_extent() {
                mean_lo = mean_lo.min(lo);
                mean_hi = mean_hi.max(hi);
            }
            for p in s.curves().iter().flat_map(|c| c.points.iter()) {
                band_hi = band_hi.max(p.upper());
                for v in [p.lower(), p.mean] {
                    if v > 0.0 {
                        positive_lo = positive_lo.min(v);
                    }
                }
            }
        }
        if !mean_lo.is_finite() {
            return YAxis::Linear;
        }
        if mean_lo + style.log_epsilon <= 0.0 || mean_hi <= 0.0 {
            warn!(min_mean = mean_lo, "Non-positive means, using a linear y-axis");
            return YAxis::Linear;
        }

        let min_exp = (mean_lo + style.log_epsilon).log10();
        let floor = 10f32.powf(min_exp - 1.0);
        let bottom = if positive_lo.is_finite() { positive_lo.max(floor) } else { floor };
        let mut top = band_hi.max(mean_hi);
        if top <= bottom {
            top = bottom * 10.0;
        }
        YAxis::Log { range: (bottom, top), ticks: log_ticks(bottom, top, LOG_MAJOR_TICKS) }
    }
}

/// Draws one panel's mean curves with their 1-sigma bands.
#[derive(Debug, Clone)]
pub struct MeanStdRenderer<'a> {
    style: &'a Style,
    input: StatsInput,
}

impl<'a> MeanStdRenderer<'a> {
    /// Create a renderer aggregating raw replicate data.
    #[must_use]
    pub fn new(style: &'a Style) -> Self {
        Self { style, input: StatsInput::default() }
    }

    /// Select how statistics are obtained.
    #[must_use]
    pub fn input(mut self, input: StatsInput) -> Self {
        self.input = input;
        self
    }

    /// Aggregate a cross-section into per-series curves.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::DataShape`] from the aggregation.
    pub fn aggregate(&self, section: &CrossSection<'_>, series_dim: usize, x_dim: usize) -> Result<SeriesStats> {
        aggregate(section, series_dim, x_dim, &self.input)
    }

    /// Draw aggregated curves into a panel.
    ///
    /// Series are drawn in the color map's first-appearance order; series
    /// unknown to the map are assigned the next color.
    pub fn draw(&self, panel: &mut Panel, stats: &SeriesStats, colors: &mut ColorAssigner) {
        for curve in stats.curves() {
            colors.color_for(&curve.label);
        }
        let order: Vec<(Label, Rgba)> = colors.entries().map(|(l, c)| (l.clone(), c)).collect();

        for (label, color) in order {
            let Some(curve) = stats.get(&label) else { continue };
            let xs: Vec<f32> = curve.points.iter().map(|p| p.x as f32).collect();
            let means: Vec<Point> = curve.points.iter().map(|p| Point::new(p.x as f32, p.mean)).collect();
            let lower: Vec<f32> = curve.points.iter().map(|p| p.lower()).collect();
            let upper: Vec<f32> = curve.points.iter().map(|p| p.upper()).collect();

            panel.push(Mark::Line { series: Some(label.clone()), points: means, color, width: self.style.line_width });
            panel.push(Mark::Band {
                xs: xs.clone(),
                lower: lower.clone(),
                upper: upper.clone(),
                color: color.with_opacity(self.style.band_alpha),
            });
            if self.style.outlines {
                let outline = color.with_opacity(self.style.outline_alpha);
                for edge in [lower, upper] {
                    panel.push(Mark::Line {
                        series: None,
                        points: xs.iter().zip(edge).map(|(&x, y)| Point::new(x, y)).collect(),
                        color: outline,
                        width: self.style.outline_width(),
                    });
                }
            }
        }
    }

    /// Apply the y-axis, ticks and grid lines to a panel after drawing.
    pub fn decorate_axes(&self, panel: &mut Panel, y_axis: &YAxis) {
        let ranges = panel.data_ranges();
        match y_axis {
            YAxis::Log { range, ticks } => {
                panel.y_scale = YScale::Log;
                panel.y_range = Some(*range);
                panel.y_ticks.clone_from(ticks);
            }
            YAxis::Linear => {
                panel.y_scale = YScale::Linear;
                if let Some((_, (lo, hi))) = ranges {
                    let values = linear_ticks(lo, hi, LINEAR_TICKS);
                    let labels = format_linear_ticks(&values, self.style.power_limits);
                    panel.y_ticks = values.iter().zip(labels.labels).map(|(&v, l)| Tick::major(v, l)).collect();
                    panel.y_exponent = labels.exponent;
                }
            }
        }
        if let Some(((lo, hi), _)) = ranges {
            let values = linear_ticks(lo, hi, LINEAR_TICKS);
            let labels = format_linear_ticks(&values, X_POWER_LIMITS);
            panel.x_ticks = values.iter().zip(labels.labels).map(|(&v, l)| Tick::major(v, l)).collect();
        }
        for axis in [Axis::X, Axis::Y] {
            for major in [true, false] {
                panel.grid.push(GridLines {
                    axis,
                    major,
                    width: self.style.grid_width,
                    dashed: false,
                    color: self.style.grid_color,
                });
            }
        }
    }

    /// Aggregate, draw and decorate a single panel with its own y-axis.
    ///
    /// # Errors
    ///
    /// Propagates aggregation errors.
    pub fn render(
        &self,
        panel: &mut Panel,
        section: &CrossSection<'_>,
        series_dim: usize,
        x_dim: usize,
        colors: &mut ColorAssigner,
    ) -> Result<SeriesStats> {
        let stats = self.aggregate(section, series_dim, x_dim)?;
        self.draw(panel, &stats, colors);
        self.decorate_axes(panel, &YAxis::shared([&stats], self.style));
        Ok(stats)
    }
}

/// Builder for a grid of mean/std trend panels.
///
/// # Example
///
/// ```rust,ignore
/// let figure = MeanStdPlot::new(&table)
///     .compare(&["model", "metric"])
///     .x_axis("iteration")
///     .render()?;
/// ```
#[derive(Debug, Clone)]
pub struct MeanStdPlot<'a> {
    table: &'a DataTable,
    compare: Vec<String>,
    x_axis: Option<String>,
    input: StatsInput,
    legend_position: LegendPosition,
    suptitle: Option<String>,
    style: Style,
}

impl<'a> MeanStdPlot<'a> {
    /// Start a trend figure over a table.
    #[must_use]
    pub fn new(table: &'a DataTable) -> Self {
        Self {
            table,
            compare: Vec::new(),
            x_axis: None,
            input: StatsInput::default(),
            legend_position: LegendPosition::Auto,
            suptitle: None,
            style: Style::default(),
        }
    }

    /// Comparison dimensions: series, then grid column, then grid row.
    #[must_use]
    pub fn compare(mut self, dimensions: &[&str]) -> Self {
        self.compare = dimensions.iter().map(ToString::to_string).collect();
        self
    }

    /// Dimension providing the x positions.
    #[must_use]
    pub fn x_axis(mut self, dimension: &str) -> Self {
        self.x_axis = Some(dimension.to_string());
        self
    }

    /// How statistics are obtained.
    #[must_use]
    pub fn stats(mut self, input: StatsInput) -> Self {
        self.input = input;
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
    /// Panels whose coordinates match no rows are left blank but still
    /// decorated.
    ///
    /// # Errors
    ///
    /// - [`Error::TooManyDimensions`] for more than three comparison dimensions
    /// - [`Error::Configuration`] without comparison dimensions or x-axis
    /// - [`Error::DimensionNotFound`] for unknown dimension names
    /// - [`Error::DataShape`] when aggregation fails
    pub fn render(&self) -> Result<Figure> {
        let table = self.table;
        let style = &self.style;
        info!(dimensions = ?self.compare, "Inferring plot layout");

        super::check_compare(table, &self.compare, MAX_COMPARE)?;
        let x_name = self
            .x_axis
            .as_deref()
            .ok_or_else(|| Error::Configuration("an x-axis dimension is required".to_string()))?;
        let series_dim = table.dimension_index(&self.compare[0])?;
        let x_dim = table.dimension_index(x_name)?;
        let col_name = self.compare.get(1).map(String::as_str);
        let row_name = self.compare.get(2).map(String::as_str);

        let col_labels = super::grid_labels(table, col_name)?;
        let row_labels = super::grid_labels(table, row_name)?;
        let series_labels = table.unique(&self.compare[0])?;

        let grid = GridLayoutPlanner::new(style.clone()).plan(
            row_labels.len(),
            col_labels.len(),
            series_labels.len(),
            self.legend_position,
        )?;
        info!(nrows = grid.nrows(), ncols = grid.ncols(), series = series_labels.len(), "Setting up plot");

        let view = MultiIndexView::new(table, row_name, col_name)?;
        let renderer = MeanStdRenderer::new(style).input(self.input.clone());
        let mut colors = ColorAssigner::new(style.palette.clone());
        for label in &series_labels {
            colors.color_for(label);
        }

        let mut cells: Vec<Option<SeriesStats>> = Vec::with_capacity(grid.nrows() * grid.ncols());
        for row in &row_labels {
            for col in &col_labels {
                match view.select(row.as_ref(), col.as_ref()) {
                    Ok(section) => {
                        debug!(row = ?row, col = ?col, rows = section.len(), "Aggregating panel");
                        cells.push(Some(renderer.aggregate(&section, series_dim, x_dim)?));
                    }
                    Err(e) if e.is_recoverable() => {
                        debug!(error = %e, "Leaving panel blank");
                        cells.push(None);
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        let y_axis = YAxis::shared(cells.iter().flatten(), style);

        let nrows = grid.nrows();
        let ncols = grid.ncols();
        let mut figure = Figure::new(grid, style.clone());
        let mut legend = LegendConsolidator::new();

        for (ridx, row) in row_labels.iter().enumerate() {
            for (cidx, col) in col_labels.iter().enumerate() {
                let Some(panel) = figure.panel_mut(ridx, cidx) else { continue };
                if let Some(stats) = &cells[ridx * ncols + cidx] {
                    renderer.draw(panel, stats, &mut colors);
                }
                renderer.decorate_axes(panel, &y_axis);

                if ridx == nrows - 1 {
                    panel.x_label = Some(x_name.to_string());
                } else {
                    panel.x_tick_labels = false;
                }
                if let (0, Some(name)) = (ridx, col_name) {
                    panel.title = Some(super::coordinate(name, col.as_ref()));
                }
                if let (0, Some(name)) = (cidx, row_name) {
                    panel.y_label = Some(super::coordinate(name, row.as_ref()));
                }

                legend.observe(&panel.legend_handles());
            }
        }

        if let Some(geometry) = figure.grid().legend().copied() {
            figure.set_legend(legend.finish(&geometry, style.legend_font_size));
        }
        figure.set_padding(style.panel_padding());
        if let Some(title) = &self.suptitle {
            figure.set_suptitle(title.clone());
        }

        info!(
            panels = figure.panels().len(),
            blank = figure.panels().iter().filter(|p| p.is_blank()).count(),
            "Mean-std figure complete"
        );
        Ok(figure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LegendPlacement;
    use approx::assert_relative_eq;

    /// model x metric x seed x iteration, value = (model + 1) * (iteration + 1) + seed.
    fn runs() -> DataTable {
        let mut t = DataTable::new(&["model", "metric", "seed", "iteration"]);
        for (m, model) in ["A", "B"].iter().enumerate() {
            for metric in ["acc", "loss"] {
                for seed in 0..3 {
                    for it in 0..4 {
                        let v = (m as f32 + 1.0) * (it as f32 + 1.0) + seed as f32;
                        t.push([Label::from(*model), Label::from(metric), Label::from(seed), Label::from(it)], v)
                            .unwrap();
                    }
                }
            }
        }
        t
    }

    #[test]
    fn test_render_single_panel() {
        let t = runs();
        let style = Style::default();
        let view = MultiIndexView::new(&t, None, None).unwrap();
        let section = view.select(None, None).unwrap();
        let mut panel = Panel::new(0, 0, &style);
        let mut colors = ColorAssigner::new(style.palette.clone());

        let stats = MeanStdRenderer::new(&style).render(&mut panel, &section, 0, 3, &mut colors).unwrap();
        assert_eq!(stats.len(), 2);
        // seeds 0..3 at iteration 1 for A: 2, 3, 4 twice (acc and loss)
        let p = stats.get(&Label::from("A")).unwrap().points[1];
        assert_relative_eq!(p.mean, 3.0);
        assert_eq!(p.count, 6);

        // mean line + band + two outlines per series
        assert_eq!(panel.marks.len(), 8);
        assert_eq!(panel.legend_handles().len(), 2);
        assert_eq!(panel.y_scale, YScale::Log);
    }

    #[test]
    fn test_outlines_disabled() {
        let t = runs();
        let style = Style::default().outlines(false);
        let view = MultiIndexView::new(&t, None, None).unwrap();
        let section = view.select(None, None).unwrap();
        let mut panel = Panel::new(0, 0, &style);
        let mut colors = ColorAssigner::new(style.palette.clone());
        MeanStdRenderer::new(&style).render(&mut panel, &section, 0, 3, &mut colors).unwrap();
        assert_eq!(panel.marks.len(), 4);
    }

    #[test]
    fn test_grid_shape_and_decoration() {
        let t = runs();
        let fig = MeanStdPlot::new(&t).compare(&["model", "metric", "seed"]).x_axis("iteration").render().unwrap();
        assert_eq!(fig.nrows(), 3);
        assert_eq!(fig.ncols(), 2);

        let top_left = fig.panel(0, 0).unwrap();
        assert_eq!(top_left.title.as_deref(), Some("metric=acc"));
        assert_eq!(top_left.y_label.as_deref(), Some("seed=0"));
        assert!(!top_left.x_tick_labels);
        assert!(top_left.x_label.is_none());

        let bottom_right = fig.panel(2, 1).unwrap();
        assert_eq!(bottom_right.x_label.as_deref(), Some("iteration"));
        assert!(bottom_right.title.is_none());
        assert!(bottom_right.y_label.is_none());
    }

    #[test]
    fn test_shared_log_axis() {
        let t = runs();
        let fig = MeanStdPlot::new(&t).compare(&["model", "metric"]).x_axis("iteration").render().unwrap();
        let a = fig.panel(0, 0).unwrap();
        let b = fig.panel(0, 1).unwrap();
        assert_eq!(a.y_range, b.y_range);
        assert_eq!(a.y_ticks, b.y_ticks);
        let (bottom, _) = a.y_range.unwrap();
        // smallest mean is 2.0 (A at iteration 0)
        assert!(bottom >= 0.2 - 1e-4);
    }

    #[test]
    fn test_linear_axis_scientific() {
        let mut t = DataTable::new(&["model", "iteration"]);
        for it in 0..3 {
            t.push([Label::from("A"), Label::from(it)], 1000.0 * (it as f32 + 1.0)).unwrap();
        }
        let fig = MeanStdPlot::new(&t)
            .compare(&["model"])
            .x_axis("iteration")
            .style(Style::default().log_y(false))
            .render()
            .unwrap();
        let panel = fig.panel(0, 0).unwrap();
        assert_eq!(panel.y_scale, YScale::Linear);
        assert_eq!(panel.y_exponent, Some(3));
    }

    #[test]
    fn test_linear_axis_flat_large_series_has_ticks() {
        let mut t = DataTable::new(&["model", "iteration"]);
        for it in 0..3 {
            t.push([Label::from("A"), Label::from(it)], 1e8).unwrap();
        }
        let fig = MeanStdPlot::new(&t)
            .compare(&["model"])
            .x_axis("iteration")
            .style(Style::default().log_y(false))
            .render()
            .unwrap();
        let panel = fig.panel(0, 0).unwrap();
        assert!(panel.y_ticks.len() >= 3);
        assert!(panel.y_ticks.iter().all(|t| (t.position - 1e8).abs() <= 1e5 + 1.0));
    }

    #[test]
    fn test_blank_panel_keeps_grid() {
        let mut t = DataTable::new(&["model", "metric", "seed", "iteration"]);
        t.push([Label::from("A"), Label::from("acc"), Label::from(0), Label::from(0)], 1.0).unwrap();
        t.push([Label::from("A"), Label::from("loss"), Label::from(1), Label::from(0)], 2.0).unwrap();
        let fig = MeanStdPlot::new(&t).compare(&["model", "metric", "seed"]).x_axis("iteration").render().unwrap();
        assert_eq!((fig.nrows(), fig.ncols()), (2, 2));
        assert!(fig.panel(0, 1).unwrap().is_blank());
        assert!(fig.panel(1, 0).unwrap().is_blank());
        assert!(!fig.panel(0, 0).unwrap().is_blank());
        // decoration applies to blank panels too
        assert_eq!(fig.panel(0, 1).unwrap().title.as_deref(), Some("metric=loss"));
    }

    #[test]
    fn test_legend_union() {
        let mut t = DataTable::new(&["model", "metric", "iteration"]);
        t.push([Label::from("A"), Label::from("acc"), Label::from(0)], 1.0).unwrap();
        t.push([Label::from("B"), Label::from("loss"), Label::from(0)], 1.0).unwrap();
        t.push([Label::from("C"), Label::from("loss"), Label::from(0)], 1.0).unwrap();
        let fig = MeanStdPlot::new(&t).compare(&["model", "metric"]).x_axis("iteration").render().unwrap();
        let legend = fig.legend().unwrap();
        let labels: Vec<String> = legend.labels().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
        assert_eq!(legend.placement, LegendPlacement::Bottom);
        assert_eq!(legend.columns, 2);
    }

    #[test]
    fn test_colors_follow_global_order() {
        let mut t = DataTable::new(&["model", "metric", "iteration"]);
        t.push([Label::from("A"), Label::from("acc"), Label::from(0)], 1.0).unwrap();
        t.push([Label::from("B"), Label::from("loss"), Label::from(0)], 1.0).unwrap();
        let style = Style::default();
        let fig = MeanStdPlot::new(&t).compare(&["model", "metric"]).x_axis("iteration").render().unwrap();
        let handles = fig.panel(0, 1).unwrap().legend_handles();
        assert_eq!(handles[0].color, style.palette.get(1));
    }

    #[test]
    fn test_too_many_dimensions() {
        let t = runs();
        let err = MeanStdPlot::new(&t)
            .compare(&["model", "metric", "seed", "iteration"])
            .x_axis("iteration")
            .render()
            .unwrap_err();
        assert!(matches!(err, Error::TooManyDimensions { count: 4, max: 3 }));
    }

    #[test]
    fn test_missing_dimension_is_fatal() {
        let t = runs();
        let err = MeanStdPlot::new(&t).compare(&["optimizer"]).x_axis("iteration").render().unwrap_err();
        assert!(matches!(err, Error::DimensionNotFound { .. }));
        let err = MeanStdPlot::new(&t).compare(&["model"]).x_axis("epoch").render().unwrap_err();
        assert!(matches!(err, Error::DimensionNotFound { .. }));
    }

    #[test]
    fn test_precomputed_stats() {
        let mut t = DataTable::with_fields(&["model", "iteration"], &["mean", "std"]);
        t.push_fields([Label::from("A"), Label::from(0)], &[1.0, 0.1]).unwrap();
        t.push_fields([Label::from("A"), Label::from(1)], &[2.0, 0.2]).unwrap();
        let fig = MeanStdPlot::new(&t)
            .compare(&["model"])
            .x_axis("iteration")
            .stats(StatsInput::precomputed())
            .legend_position(LegendPosition::Right)
            .suptitle("Precomputed")
            .render()
            .unwrap();
        assert_eq!(fig.suptitle(), Some("Precomputed"));
        assert_eq!(fig.legend().unwrap().placement, LegendPlacement::Right);
        let (_, points) = fig.panel(0, 0).unwrap().series_lines().next().unwrap();
        assert_relative_eq!(points[1].y, 2.0);
    }

    #[test]
    fn test_precomputed_requires_fields() {
        let t = runs();
        let err = MeanStdPlot::new(&t)
            .compare(&["model"])
            .x_axis("iteration")
            .stats(StatsInput::precomputed())
            .render()
            .unwrap_err();
        assert!(matches!(err, Error::DataShape(_)));
    }

    #[test]
    fn test_no_legend() {
        let t = runs();
        let fig = MeanStdPlot::new(&t)
            .compare(&["model"])
            .x_axis("iteration")
            .legend_position(LegendPosition::None)
            .render()
            .unwrap();
        assert!(fig.legend().is_none());
    }

    #[test]
    fn test_shared_axis_falls_back_for_negative_means() {
        let mut t = DataTable::new(&["model", "iteration"]);
        t.push([Label::from("A"), Label::from(0)], -1.0).unwrap();
        t.push([Label::from("A"), Label::from(1)], 1.0).unwrap();
        let view = MultiIndexView::new(&t, None, None).unwrap();
        let section = view.select(None, None).unwrap();
        let style = Style::default();
        let stats = MeanStdRenderer::new(&style).aggregate(&section, 0, 1).unwrap();
        assert_eq!(YAxis::shared([&stats], &style), YAxis::Linear);
    }
}

//! Retained-mode figure model.
//!
//! A [`Figure`] is a planned grid of [`Panel`]s plus at most one shared
//! [`Legend`]. Renderers only append [`Mark`]s and axis decoration to panels;
//! turning the result into pixels is the job of [`crate::output`].

use crate::color::Rgba;
use crate::data::Label;
use crate::geometry::{Point, Rect};
use crate::layout::{GridSpec, LegendPlacement};
use crate::scale::{ColorScale, Tick};
use crate::style::Style;

/// Y-axis transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YScale {
    /// Linear axis.
    #[default]
    Linear,
    /// Base-10 logarithmic axis.
    Log,
}

/// Axis selector for grid lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

/// Grid lines drawn at one axis' major or minor ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLines {
    /// Axis whose ticks the lines follow.
    pub axis: Axis,
    /// Follow major (true) or minor (false) ticks.
    pub major: bool,
    /// Stroke width in points.
    pub width: f32,
    /// Dashed stroke.
    pub dashed: bool,
    /// Stroke color.
    pub color: Rgba,
}

/// A drawable primitive in panel data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// Polyline. Lines carrying a `series` label become legend handles.
    Line {
        /// Legend label, if any.
        series: Option<Label>,
        /// Vertices in data coordinates.
        points: Vec<Point>,
        /// Stroke color.
        color: Rgba,
        /// Stroke width in points.
        width: f32,
    },
    /// Area between two curves sharing x positions.
    Band {
        /// Shared x positions.
        xs: Vec<f32>,
        /// Lower edge.
        lower: Vec<f32>,
        /// Upper edge.
        upper: Vec<f32>,
        /// Fill color (alpha included).
        color: Rgba,
    },
    /// Horizontal bar starting at x = 0.
    Bar {
        /// Label the bar color was assigned for.
        label: Label,
        /// Center position on the y axis.
        y: f32,
        /// Bar length along x.
        length: f32,
        /// Extent along y.
        thickness: f32,
        /// Fill color.
        color: Rgba,
        /// Edge color.
        edge: Rgba,
    },
    /// Text centered on a data position.
    Text {
        /// Anchor in data coordinates.
        position: Point,
        /// Content.
        text: String,
        /// Font size in points.
        font_size: f32,
        /// Fill color.
        color: Rgba,
    },
    /// Color-mapped cell grid; cell `(i, j)` spans `[j, j+1] x [i, i+1]`.
    Mesh {
        /// Number of cell rows.
        rows: usize,
        /// Number of cell columns.
        cols: usize,
        /// Row-major cell values.
        values: Vec<f32>,
        /// Value to color mapping.
        scale: ColorScale,
    },
}

impl Mark {
    /// Data-space bounding box `(x_min, x_max, y_min, y_max)` of the mark.
    fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let xs_ys: (Vec<f32>, Vec<f32>) = match self {
            Mark::Line { points, .. } => points.iter().map(|p| (p.x, p.y)).unzip(),
            Mark::Band { xs, lower, upper, .. } => {
                let ys = lower.iter().chain(upper.iter()).copied().collect();
                (xs.clone(), ys)
            }
            Mark::Bar { y, length, thickness, .. } => {
                (vec![0.0, *length], vec![y - thickness / 2.0, y + thickness / 2.0])
            }
            Mark::Text { position, .. } => (vec![position.x], vec![position.y]),
            Mark::Mesh { rows, cols, .. } => (vec![0.0, *cols as f32], vec![0.0, *rows as f32]),
        };
        let (xs, ys) = xs_ys;
        let fin = |v: &Vec<f32>| {
            v.iter().copied().filter(|v| v.is_finite()).fold(None, |acc: Option<(f32, f32)>, v| {
                Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
            })
        };
        let (x0, x1) = fin(&xs)?;
        let (y0, y1) = fin(&ys)?;
        Some((x0, x1, y0, y1))
    }
}

/// One entry of a legend.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    /// Label the entry stands for.
    pub label: Label,
    /// Displayed text.
    pub text: String,
    /// Handle color.
    pub color: Rgba,
    /// Handle line width in points.
    pub line_width: f32,
}

/// The consolidated figure legend.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    /// Entries in display order.
    pub entries: Vec<LegendEntry>,
    /// Slot the legend occupies.
    pub placement: LegendPlacement,
    /// Number of item columns.
    pub columns: usize,
    /// Font size in points.
    pub font_size: f32,
}

impl Legend {
    /// Entry labels in display order.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.entries.iter().map(|e| &e.label)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the legend has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Colorbar attached to the right of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Colorbar {
    /// Value to color mapping.
    pub scale: ColorScale,
    /// Labeled ticks along the bar.
    pub ticks: Vec<Tick>,
}

/// One grid cell's drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// Grid row.
    pub row: usize,
    /// Grid column.
    pub col: usize,
    /// Title above the panel.
    pub title: Option<String>,
    /// Title font size in points.
    pub title_font_size: f32,
    /// X-axis label.
    pub x_label: Option<String>,
    /// Y-axis label.
    pub y_label: Option<String>,
    /// Label on a secondary y-axis at the right edge.
    pub secondary_y_label: Option<String>,
    /// Axis label font size in points.
    pub label_font_size: f32,
    /// Whether x tick labels are drawn.
    pub x_tick_labels: bool,
    /// X ticks in data coordinates.
    pub x_ticks: Vec<Tick>,
    /// Rotation of the x tick labels in degrees.
    pub x_tick_rotation: f32,
    /// Y ticks in data coordinates.
    pub y_ticks: Vec<Tick>,
    /// Shared power-of-ten exponent of the y tick labels.
    pub y_exponent: Option<i32>,
    /// Tick label font size in points.
    pub tick_font_size: f32,
    /// Explicit x range; derived from the marks when absent.
    pub x_range: Option<(f32, f32)>,
    /// Explicit y range; derived from the marks when absent.
    pub y_range: Option<(f32, f32)>,
    /// Y-axis transform.
    pub y_scale: YScale,
    /// Larger y values drawn lower.
    pub y_inverted: bool,
    /// Grid lines.
    pub grid: Vec<GridLines>,
    /// Data marks in drawing order.
    pub marks: Vec<Mark>,
    /// Optional colorbar.
    pub colorbar: Option<Colorbar>,
}

impl Panel {
    /// Create an empty panel at a grid position.
    #[must_use]
    pub fn new(row: usize, col: usize, style: &Style) -> Self {
        Self {
            row,
            col,
            title: None,
            title_font_size: style.label_font_size,
            x_label: None,
            y_label: None,
            secondary_y_label: None,
            label_font_size: style.label_font_size,
            x_tick_labels: true,
            x_ticks: Vec::new(),
            x_tick_rotation: 0.0,
            y_ticks: Vec::new(),
            y_exponent: None,
            tick_font_size: style.tick_font_size,
            x_range: None,
            y_range: None,
            y_scale: YScale::Linear,
            y_inverted: false,
            grid: Vec::new(),
            marks: Vec::new(),
            colorbar: None,
        }
    }

    /// Append a mark.
    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    /// Whether nothing has been drawn into the panel.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.marks.is_empty()
    }

    /// Legend handles this panel exposes: one per labeled line, in drawing order.
    #[must_use]
    pub fn legend_handles(&self) -> Vec<LegendEntry> {
        self.marks
            .iter()
            .filter_map(|m| match m {
                Mark::Line { series: Some(label), color, width, .. } => Some(LegendEntry {
                    label: label.clone(),
                    text: label.to_string(),
                    color: *color,
                    line_width: *width,
                }),
                _ => None,
            })
            .collect()
    }

    /// Labeled lines of the panel, in drawing order.
    pub fn series_lines(&self) -> impl Iterator<Item = (&Label, &[Point])> {
        self.marks.iter().filter_map(|m| match m {
            Mark::Line { series: Some(label), points, .. } => Some((label, points.as_slice())),
            _ => None,
        })
    }

    /// Bars of the panel, in drawing order.
    pub fn bars(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter().filter(|m| matches!(m, Mark::Bar { .. }))
    }

    /// X and y ranges: explicit where set, else the union of mark bounds.
    ///
    /// Returns `None` for a blank panel without explicit ranges.
    #[must_use]
    pub fn data_ranges(&self) -> Option<((f32, f32), (f32, f32))> {
        let bounds = self.marks.iter().filter_map(Mark::bounds).fold(None, |acc, b| {
            Some(match acc {
                None => b,
                Some((x0, x1, y0, y1)) => (b.0.min(x0), b.1.max(x1), b.2.min(y0), b.3.max(y1)),
            })
        });
        let x = self.x_range.or(bounds.map(|b| (b.0, b.1)))?;
        let y = self.y_range.or(bounds.map(|b| (b.2, b.3)))?;
        Some((x, y))
    }
}

/// A complete figure: panels on a planned grid, one optional legend and title.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    grid: GridSpec,
    panels: Vec<Panel>,
    legend: Option<Legend>,
    suptitle: Option<String>,
    padding: f32,
    style: Style,
}

impl Figure {
    /// Create a figure with one blank panel per grid cell.
    #[must_use]
    pub fn new(grid: GridSpec, style: Style) -> Self {
        let panels = grid.cells().map(|(r, c)| Panel::new(r, c, &style)).collect();
        Self { grid, panels, legend: None, suptitle: None, padding: 0.0, style }
    }

    /// Planned grid.
    #[must_use]
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Style the figure was built with.
    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Panel rows.
    #[must_use]
    pub fn nrows(&self) -> usize {
        self.grid.nrows()
    }

    /// Panel columns.
    #[must_use]
    pub fn ncols(&self) -> usize {
        self.grid.ncols()
    }

    /// All panels in row-major order.
    #[must_use]
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Panel at a grid position.
    #[must_use]
    pub fn panel(&self, row: usize, col: usize) -> Option<&Panel> {
        (row < self.nrows() && col < self.ncols()).then(|| &self.panels[row * self.ncols() + col])
    }

    /// Mutable panel at a grid position.
    pub fn panel_mut(&mut self, row: usize, col: usize) -> Option<&mut Panel> {
        let ncols = self.ncols();
        if row < self.nrows() && col < ncols {
            Some(&mut self.panels[row * ncols + col])
        } else {
            None
        }
    }

    /// Figure-space rectangle of a panel.
    #[must_use]
    pub fn panel_rect(&self, row: usize, col: usize) -> Option<Rect> {
        self.grid.cell_rect(row, col)
    }

    /// Consolidated legend, if any.
    #[must_use]
    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    /// Install the consolidated legend.
    pub fn set_legend(&mut self, legend: Legend) {
        self.legend = Some(legend);
    }

    /// Figure-level title.
    #[must_use]
    pub fn suptitle(&self) -> Option<&str> {
        self.suptitle.as_deref()
    }

    /// Set the figure-level title.
    pub fn set_suptitle(&mut self, title: impl Into<String>) {
        self.suptitle = Some(title.into());
    }

    /// Figure title font size in points.
    #[must_use]
    pub fn suptitle_font_size(&self) -> f32 {
        self.style.suptitle_font_size()
    }

    /// Uniform padding between panels, in inches.
    #[must_use]
    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Set the inter-panel padding.
    pub fn set_padding(&mut self, padding: f32) {
        self.padding = padding.max(0.0);
    }

    /// Canvas size in inches.
    #[must_use]
    pub fn size(&self) -> (f32, f32) {
        (self.grid.width(), self.grid.height())
    }

    /// Canvas size in pixels at the style's dpi.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        let (w, h) = self.size();
        ((w * self.style.dpi).round() as u32, (h * self.style.dpi).round() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{GridLayoutPlanner, LegendPosition};

    fn figure(nrows: usize, ncols: usize) -> Figure {
        let grid = GridLayoutPlanner::default().plan(nrows, ncols, 2, LegendPosition::Auto).unwrap();
        Figure::new(grid, Style::default())
    }

    #[test]
    fn test_one_panel_per_cell() {
        let fig = figure(2, 3);
        assert_eq!(fig.panels().len(), 6);
        assert!(fig.panels().iter().all(Panel::is_blank));
        let p = fig.panel(1, 2).unwrap();
        assert_eq!((p.row, p.col), (1, 2));
        assert!(fig.panel(2, 0).is_none());
    }

    #[test]
    fn test_legend_handles_from_labeled_lines() {
        let mut fig = figure(1, 1);
        let panel = fig.panel_mut(0, 0).unwrap();
        panel.push(Mark::Line {
            series: Some(Label::from("A")),
            points: vec![Point::new(0.0, 1.0)],
            color: Rgba::BLACK,
            width: 4.0,
        });
        panel.push(Mark::Line { series: None, points: vec![Point::new(0.0, 0.5)], color: Rgba::BLACK, width: 2.0 });
        let handles = panel.legend_handles();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].text, "A");
    }

    #[test]
    fn test_data_ranges() {
        let mut panel = Panel::new(0, 0, &Style::default());
        assert!(panel.data_ranges().is_none());
        panel.push(Mark::Bar {
            label: Label::from("A"),
            y: 1.0,
            length: 3.0,
            thickness: 1.0,
            color: Rgba::WHITE,
            edge: Rgba::BLACK,
        });
        let ((x0, x1), (y0, y1)) = panel.data_ranges().unwrap();
        assert_eq!((x0, x1, y0, y1), (0.0, 3.0, 0.5, 1.5));

        panel.y_range = Some((0.0, 10.0));
        assert_eq!(panel.data_ranges().unwrap().1, (0.0, 10.0));
    }

    #[test]
    fn test_pixel_size_follows_dpi() {
        let fig = figure(1, 1);
        let (w, h) = fig.size();
        assert_eq!(fig.pixel_size(), ((w * 100.0).round() as u32, (h * 100.0).round() as u32));
    }
}

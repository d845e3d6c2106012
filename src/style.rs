//! Style configuration for grid figures.
//!
//! Controls sizes, fonts, strokes and colors. A [`Style`] is passed by value
//! into each plot builder; nothing is shared between render calls.

use crate::color::Rgba;
use crate::palette::Palette;

/// Points to inches conversion used for font-derived padding.
pub const PT_TO_INCH: f32 = 0.04167 / 3.0;

/// Immutable style configuration.
///
/// Lengths are in inches (figure units) unless noted; font sizes are in points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Style {
    /// Width of one grid cell.
    pub cell_width: f32,
    /// Height of one grid cell.
    pub cell_height: f32,
    /// Output pixels per inch.
    pub dpi: f32,
    /// Axis label and panel title font size.
    pub label_font_size: f32,
    /// Legend font size.
    pub legend_font_size: f32,
    /// Tick label font size.
    pub tick_font_size: f32,
    /// Mean curve line width.
    pub line_width: f32,
    /// Opacity of the 1-sigma band.
    pub band_alpha: f32,
    /// Draw light lines at mean - std and mean + std.
    pub outlines: bool,
    /// Opacity of the boundary lines.
    pub outline_alpha: f32,
    /// Log-scale y-axis for trend plots.
    pub log_y: bool,
    /// Offset keeping log-scale minima away from zero.
    pub log_epsilon: f32,
    /// Exponent range outside which linear ticks switch to scientific notation.
    pub power_limits: (i32, i32),
    /// Thickness of one histogram bar (y units).
    pub bar_thickness: f32,
    /// Histogram bar edge color.
    pub bar_edge: Rgba,
    /// Line width of histogram legend handles.
    pub legend_handle_width: f32,
    /// Trend panel grid line width.
    pub grid_width: f32,
    /// Histogram major x grid line width.
    pub major_grid_width: f32,
    /// Grid line color.
    pub grid_color: Rgba,
    /// Horizontal spacing between panels (fraction of a cell).
    pub wspace: f32,
    /// Vertical spacing between panels (fraction of a cell).
    pub hspace: f32,
    /// Background color.
    pub background: Rgba,
    /// Text color.
    pub text_color: Rgba,
    /// Categorical palette for series and bars.
    pub palette: Palette,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            cell_height: 4.0,
            dpi: 100.0,
            label_font_size: 20.0,
            legend_font_size: 15.0,
            tick_font_size: 14.0,
            line_width: 4.0,
            band_alpha: 0.2,
            outlines: true,
            outline_alpha: 0.6,
            log_y: true,
            log_epsilon: 1e-6,
            power_limits: (-1, 1),
            bar_thickness: 1.0,
            bar_edge: Rgba::BLACK,
            legend_handle_width: 8.0,
            grid_width: 0.5,
            major_grid_width: 1.5,
            grid_color: Rgba::BLACK,
            wspace: 0.02,
            hspace: 0.02,
            background: Rgba::WHITE,
            text_color: Rgba::BLACK,
            palette: Palette::set2(),
        }
    }
}

impl Style {
    /// Set the cell size.
    #[must_use]
    pub fn cell_size(mut self, width: f32, height: f32) -> Self {
        self.cell_width = width.max(0.1);
        self.cell_height = height.max(0.1);
        self
    }

    /// Set the output resolution.
    #[must_use]
    pub fn dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi.max(1.0);
        self
    }

    /// Set the label font size.
    #[must_use]
    pub fn label_font_size(mut self, size: f32) -> Self {
        self.label_font_size = size;
        self
    }

    /// Set the legend font size.
    #[must_use]
    pub fn legend_font_size(mut self, size: f32) -> Self {
        self.legend_font_size = size;
        self
    }

    /// Set the mean curve line width.
    #[must_use]
    pub fn line_width(mut self, width: f32) -> Self {
        self.line_width = width.max(0.5);
        self
    }

    /// Enable or disable the band boundary lines.
    #[must_use]
    pub fn outlines(mut self, show: bool) -> Self {
        self.outlines = show;
        self
    }

    /// Enable or disable the log-scale y-axis.
    #[must_use]
    pub fn log_y(mut self, enabled: bool) -> Self {
        self.log_y = enabled;
        self
    }

    /// Set the bar thickness.
    #[must_use]
    pub fn bar_thickness(mut self, thickness: f32) -> Self {
        self.bar_thickness = thickness.max(f32::EPSILON);
        self
    }

    /// Set the categorical palette.
    #[must_use]
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Boundary line width: half the mean line width, truncated.
    #[must_use]
    pub fn outline_width(&self) -> f32 {
        (self.line_width / 2.0).trunc().max(1.0)
    }

    /// Gap between histogram groups (two bar thicknesses).
    #[must_use]
    pub fn group_gap(&self) -> f32 {
        2.0 * self.bar_thickness
    }

    /// Height of one legend row in a bottom legend.
    #[must_use]
    pub fn legend_row_height(&self) -> f32 {
        self.cell_height / 8.0
    }

    /// Width of a right-hand legend column.
    #[must_use]
    pub fn legend_column_width(&self) -> f32 {
        self.cell_width / 2.0
    }

    /// Extra canvas padding reserved for the legend.
    #[must_use]
    pub fn legend_padding(&self) -> f32 {
        self.legend_font_size * PT_TO_INCH * 1.4
    }

    /// Uniform inter-panel padding.
    #[must_use]
    pub fn panel_padding(&self) -> f32 {
        1.1 * self.label_font_size * PT_TO_INCH
    }

    /// Figure title font size.
    #[must_use]
    pub fn suptitle_font_size(&self) -> f32 {
        self.label_font_size + 10.0
    }
}

//! Grid geometry and legend placement.
//!
//! The planner turns a panel count (`nrows x ncols`) and a legend size into
//! per-row heights, per-column widths, a reserved legend slot and the overall
//! canvas size. Every figure plans its own [`GridSpec`]; a spec is never
//! reused once the grid shape or legend size changes.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::style::Style;

/// Requested legend position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LegendPosition {
    /// Bottom when the grid is at least as wide as tall, right otherwise.
    #[default]
    Auto,
    /// Extra full-width row below the grid.
    Bottom,
    /// Extra full-height column right of the grid.
    Right,
    /// No legend slot.
    None,
}

impl LegendPosition {
    /// Resolve `Auto` against the grid shape. `None` stays unresolved.
    #[must_use]
    pub fn resolve(self, nrows: usize, ncols: usize) -> Option<LegendPlacement> {
        match self {
            LegendPosition::Auto if ncols >= nrows => Some(LegendPlacement::Bottom),
            LegendPosition::Auto => Some(LegendPlacement::Right),
            LegendPosition::Bottom => Some(LegendPlacement::Bottom),
            LegendPosition::Right => Some(LegendPlacement::Right),
            LegendPosition::None => None,
        }
    }
}

impl FromStr for LegendPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(LegendPosition::Auto),
            "bottom" => Ok(LegendPosition::Bottom),
            "right" => Ok(LegendPosition::Right),
            "none" => Ok(LegendPosition::None),
            other => Err(Error::Configuration(format!("Unrecognized legend position '{other}'"))),
        }
    }
}

impl fmt::Display for LegendPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LegendPosition::Auto => "auto",
            LegendPosition::Bottom => "bottom",
            LegendPosition::Right => "right",
            LegendPosition::None => "none",
        })
    }
}

/// Resolved legend placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPlacement {
    /// Full-width row below the panels.
    Bottom,
    /// Full-height column right of the panels.
    Right,
}

/// Size and arrangement of the legend slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendGeometry {
    /// Where the slot sits.
    pub placement: LegendPlacement,
    /// Slot height (bottom) or width (right), in inches.
    pub size: f32,
    /// Number of legend item columns.
    pub columns: usize,
    /// Number of legend items the slot was sized for.
    pub items: usize,
}

/// Planned grid: panel slots, legend slot and canvas size.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    nrows: usize,
    ncols: usize,
    row_heights: Vec<f32>,
    col_widths: Vec<f32>,
    legend: Option<LegendGeometry>,
    padding: f32,
    width: f32,
    height: f32,
}

impl GridSpec {
    /// Panel rows (legend row excluded).
    #[must_use]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Panel columns (legend column excluded).
    #[must_use]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Rows of the underlying grid, legend row included.
    #[must_use]
    pub fn draw_nrows(&self) -> usize {
        self.row_heights.len()
    }

    /// Columns of the underlying grid, legend column included.
    #[must_use]
    pub fn draw_ncols(&self) -> usize {
        self.col_widths.len()
    }

    /// Height of every grid row, legend row included.
    #[must_use]
    pub fn row_heights(&self) -> &[f32] {
        &self.row_heights
    }

    /// Width of every grid column, legend column included.
    #[must_use]
    pub fn col_widths(&self) -> &[f32] {
        &self.col_widths
    }

    /// Legend slot, if one is reserved.
    #[must_use]
    pub fn legend(&self) -> Option<&LegendGeometry> {
        self.legend.as_ref()
    }

    /// Canvas width in inches.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Canvas height in inches.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Panel slots in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.nrows).flat_map(move |r| (0..self.ncols).map(move |c| (r, c)))
    }

    fn offset(sizes: &[f32], index: usize) -> f32 {
        sizes[..index].iter().sum()
    }

    /// Figure-space rectangle of a panel slot.
    #[must_use]
    pub fn cell_rect(&self, row: usize, col: usize) -> Option<Rect> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        let half = self.padding / 2.0;
        Some(Rect::new(
            half + Self::offset(&self.col_widths, col),
            half + Self::offset(&self.row_heights, row),
            self.col_widths[col],
            self.row_heights[row],
        ))
    }

    /// Figure-space rectangle of the legend slot.
    #[must_use]
    pub fn legend_rect(&self) -> Option<Rect> {
        let legend = self.legend?;
        let half = self.padding / 2.0;
        let grid_w: f32 = self.col_widths.iter().sum();
        let grid_h: f32 = self.row_heights.iter().sum();
        Some(match legend.placement {
            LegendPlacement::Bottom => Rect::new(half, half + grid_h - legend.size, grid_w, legend.size),
            LegendPlacement::Right => Rect::new(half + grid_w - legend.size, half, legend.size, grid_h),
        })
    }
}

/// Computes [`GridSpec`]s from grid shape and legend size.
#[derive(Debug, Clone, Default)]
pub struct GridLayoutPlanner {
    style: Style,
}

impl GridLayoutPlanner {
    /// Create a planner for the given style.
    #[must_use]
    pub fn new(style: Style) -> Self {
        Self { style }
    }

    /// Plan a grid of `nrows x ncols` panels with a legend of `legend_items` entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for an empty grid.
    pub fn plan(
        &self,
        nrows: usize,
        ncols: usize,
        legend_items: usize,
        position: LegendPosition,
    ) -> Result<GridSpec> {
        if nrows == 0 || ncols == 0 {
            return Err(Error::InvalidDimensions { width: ncols, height: nrows });
        }
        let style = &self.style;
        let mut row_heights = vec![style.cell_height; nrows];
        let mut col_widths = vec![style.cell_width; ncols];

        let legend = position.resolve(nrows, ncols).map(|placement| match placement {
            LegendPlacement::Bottom => {
                let size = style.legend_row_height() * legend_items.div_ceil(ncols) as f32;
                row_heights.push(size);
                LegendGeometry { placement, size, columns: ncols, items: legend_items }
            }
            LegendPlacement::Right => {
                let size = style.legend_column_width();
                col_widths.push(size);
                LegendGeometry { placement, size, columns: 1, items: legend_items }
            }
        });

        let padding = style.legend_padding();
        let width = col_widths.iter().sum::<f32>() + padding;
        let height = row_heights.iter().sum::<f32>() + padding;

        Ok(GridSpec { nrows, ncols, row_heights, col_widths, legend, padding, width, height })
    }

    /// Like [`GridLayoutPlanner::plan`], parsing the legend position from text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unknown position.
    pub fn plan_str(&self, nrows: usize, ncols: usize, legend_items: usize, position: &str) -> Result<GridSpec> {
        self.plan(nrows, ncols, legend_items, position.parse()?)
    }
}

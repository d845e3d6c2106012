//! # Trellis-Viz
//!
//! Grid-based comparative visualizations over multi-dimensional labeled tables.
//!
//! Built on the [trueno](https://crates.io/crates/trueno) core library for the
//! numeric reductions, trellis-viz turns a table of observations keyed by named
//! categorical dimensions (model, metric, seed, iteration, ...) into a grid of
//! panels that share one color mapping and one consolidated legend.
//!
//! ## Features
//!
//! - **Mean/std trend grids**: replicate aggregation into mean curves with
//!   1-sigma bands, compared across up to three dimensions
//! - **Grouped histograms**: horizontal bar groups compared across up to four
//!   dimensions
//! - **Rank-correlation heat maps**: correlation and p-value grids side by side
//! - **Retained-mode output**: every figure is an inspectable [`figure::Figure`]
//!   that serializes to SVG
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trellis_viz::prelude::*;
//!
//! let mut table = DataTable::new(&["model", "seed", "iteration"]);
//! table.push([Label::from("A"), Label::from(0), Label::from(0)], 0.5)?;
//! table.push([Label::from("A"), Label::from(1), Label::from(0)], 0.7)?;
//!
//! let figure = MeanStdPlot::new(&table)
//!     .compare(&["model"])
//!     .x_axis("iteration")
//!     .render()?;
//! let svg = figure.to_svg();
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for [`style::Style`] and its parts
//!
//! ## Logging
//!
//! Layout inference, per-panel progress and palette exhaustion are reported
//! through [`tracing`]. No subscriber is installed by the library.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code (Cloudflare incident 2025-11-18)
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types and interpolation.
pub mod color;

/// Figure-space geometry.
pub mod geometry;

/// Scale functions and tick locators.
pub mod scale;

/// Categorical palettes and call-scoped color assignment.
pub mod palette;

/// Immutable style configuration.
pub mod style;

/// Labeled tables, cross-sections and replicate statistics.
pub mod data;

// ============================================================================
// Layout Modules
// ============================================================================

/// Grid geometry and legend placement.
pub mod layout;

/// Retained-mode figure model.
pub mod figure;

/// Shared legend consolidation.
pub mod legend;

// ============================================================================
// Visualization Modules
// ============================================================================

/// Grid figure families (trend curves, grouped histograms, heat maps).
pub mod plots;

/// Output encoders (SVG).
pub mod output;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for trellis-viz operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust,ignore
/// use trellis_viz::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::color::Rgba;
    pub use crate::data::{DataTable, Label, MultiIndexView, StatsInput};
    pub use crate::error::{Error, Result};
    pub use crate::figure::{Figure, Legend, Mark, Panel};
    pub use crate::layout::{GridLayoutPlanner, GridSpec, LegendPosition};
    pub use crate::output::SvgEncoder;
    pub use crate::palette::{ColorAssigner, Palette};
    pub use crate::plots::{HistGroupsPlot, LabeledMatrix, MeanStdPlot, RankCorrelationPlot};
    pub use crate::style::Style;
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;

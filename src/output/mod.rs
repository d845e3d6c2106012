//! Output encoders.
//!
//! Figures serialize to SVG in memory; writing the document anywhere is left
//! to the caller.

mod compose;
mod svg;

pub use svg::{SvgElement, SvgEncoder, TextAnchor};

//! Labeled tables, per-panel cross-sections and replicate statistics.

mod stats;
mod table;
mod view;

pub use stats::{
    aggregate, mean_std, SeriesCurve, SeriesStats, StatPoint, StatsInput, MEAN_FIELD, STD_FIELD,
};
pub use table::{DataTable, Label, VALUE_FIELD};
pub use view::{CrossSection, MultiIndexView};

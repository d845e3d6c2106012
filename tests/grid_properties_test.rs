//! Falsifiable claims about grid figures, checked end to end.
//!
//! Each test states one claim about grid shape, aggregation, coloring or the
//! consolidated legend and tries to refute it through the public API.
//!
//! Run: cargo test --test grid_properties_test

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use proptest::prelude::*;

use trellis_viz::data::{aggregate, MultiIndexView, StatsInput};
use trellis_viz::figure::Mark;
use trellis_viz::layout::LegendPlacement;
use trellis_viz::prelude::*;

fn experiment_table(models: &[&str], metrics: &[&str], seeds: i64, iterations: i64) -> DataTable {
    let mut table = DataTable::new(&["model", "metric", "rng_offset", "iteration"]);
    for (m, model) in models.iter().enumerate() {
        for metric in metrics {
            for seed in 0..seeds {
                for it in 0..iterations {
                    let value = 1.0 + m as f32 + it as f32 * 0.5 + seed as f32 * 0.1;
                    table
                        .push(
                            [Label::from(*model), Label::from(*metric), Label::from(seed), Label::from(it)],
                            value,
                        )
                        .unwrap();
                }
            }
        }
    }
    table
}

fn bar_colors(panel: &Panel) -> Vec<(String, Rgba)> {
    panel
        .bars()
        .filter_map(|m| match m {
            Mark::Bar { label, color, .. } => Some((label.to_string(), *color)),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Grid shape
// ============================================================================

/// Claim 1: one comparison dimension yields a single panel.
#[test]
fn claim_01_single_dimension_single_panel() {
    let table = experiment_table(&["A", "B"], &["acc"], 2, 5);
    let fig = MeanStdPlot::new(&table).compare(&["model"]).x_axis("iteration").render().unwrap();
    assert_eq!((fig.nrows(), fig.ncols()), (1, 1));
}

/// Claim 2: two series over five iterations produce exactly two curves of five points.
#[test]
fn claim_02_two_series_five_points() {
    let table = experiment_table(&["A", "B"], &["acc"], 3, 5);
    let fig = MeanStdPlot::new(&table).compare(&["model"]).x_axis("iteration").render().unwrap();
    let panel = fig.panel(0, 0).unwrap();
    let curves: Vec<(String, usize)> = panel.series_lines().map(|(l, pts)| (l.to_string(), pts.len())).collect();
    assert_eq!(curves, vec![("A".to_string(), 5), ("B".to_string(), 5)]);
}

/// Claim 3: the grid does not shrink when a row/column combination is empty.
#[test]
fn claim_03_grid_keeps_empty_combinations() {
    let mut table = DataTable::new(&["model", "metric", "rng_offset", "iteration"]);
    table.push([Label::from("A"), Label::from("acc"), Label::from(0), Label::from(0)], 1.0).unwrap();
    table.push([Label::from("A"), Label::from("loss"), Label::from(1), Label::from(0)], 1.0).unwrap();
    table.push([Label::from("A"), Label::from("time"), Label::from(2), Label::from(0)], 1.0).unwrap();
    let fig = MeanStdPlot::new(&table)
        .compare(&["model", "metric", "rng_offset"])
        .x_axis("iteration")
        .render()
        .unwrap();
    assert_eq!((fig.nrows(), fig.ncols()), (3, 3));
    assert_eq!(fig.panels().iter().filter(|p| !p.is_blank()).count(), 3);
}

// ============================================================================
// Aggregation
// ============================================================================

/// Claim 4: the mean at x=1 is the arithmetic mean of all replicates at x=1.
#[test]
fn claim_04_mean_over_replicates() {
    let table = experiment_table(&["A"], &["acc"], 4, 3);
    let view = MultiIndexView::new(&table, None, None).unwrap();
    let section = view.select(None, None).unwrap();
    let stats = aggregate(&section, 0, 3, &StatsInput::raw()).unwrap();
    let point = stats.get(&Label::from("A")).unwrap().points[1];
    // 1.5 + seed * 0.1 for seeds 0..4
    assert!((point.mean - 1.65).abs() < 1e-5);
    assert!(point.std > 0.0);
    assert_eq!(point.count, 4);
}

/// Claim 5: a single replicate yields a zero standard deviation.
#[test]
fn claim_05_single_replicate_zero_std() {
    let table = experiment_table(&["A"], &["acc"], 1, 3);
    let view = MultiIndexView::new(&table, None, None).unwrap();
    let stats = aggregate(&view.select(None, None).unwrap(), 0, 3, &StatsInput::raw()).unwrap();
    assert!(stats.curves()[0].points.iter().all(|p| p.std == 0.0));
}

// ============================================================================
// Colors and legend
// ============================================================================

/// Claim 6: a bar label keeps its color across all groups of a histogram.
#[test]
fn claim_06_histogram_colors_consistent() {
    let mut table = DataTable::new(&["model", "metric"]);
    for (model, metric, v) in [("A", "acc", 0.9), ("B", "acc", 0.7), ("A", "loss", 0.2), ("B", "loss", 0.4)] {
        table.push([Label::from(model), Label::from(metric)], v).unwrap();
    }
    let fig = HistGroupsPlot::new(&table).compare(&["model", "metric"]).render().unwrap();
    assert_eq!((fig.nrows(), fig.ncols()), (1, 1));

    let panel = fig.panel(0, 0).unwrap();
    assert_eq!(panel.y_ticks.len(), 2);
    let bars = bar_colors(panel);
    assert_eq!(bars.len(), 4);
    assert_eq!(bars[0].1, bars[2].1);
    assert_eq!(bars[1].1, bars[3].1);
    assert_ne!(bars[0].1, bars[1].1);
}

/// Claim 7: the legend holds the union of series seen in any panel, once each.
#[test]
fn claim_07_legend_union() {
    let mut table = DataTable::new(&["model", "metric", "iteration"]);
    for (model, metric) in [("A", "acc"), ("B", "acc"), ("B", "loss"), ("C", "loss"), ("D", "time")] {
        table.push([Label::from(model), Label::from(metric), Label::from(0)], 1.0).unwrap();
    }
    let fig = MeanStdPlot::new(&table).compare(&["model", "metric"]).x_axis("iteration").render().unwrap();
    let labels: Vec<String> = fig.legend().unwrap().labels().map(ToString::to_string).collect();
    assert_eq!(labels, vec!["A", "B", "C", "D"]);
}

/// Claim 8: independent render calls do not share color assignments.
#[test]
fn claim_08_colors_are_call_scoped() {
    let first = experiment_table(&["A", "B"], &["acc"], 1, 2);
    let second = experiment_table(&["B"], &["acc"], 1, 2);
    let _ = MeanStdPlot::new(&first).compare(&["model"]).x_axis("iteration").render().unwrap();
    let fig = MeanStdPlot::new(&second).compare(&["model"]).x_axis("iteration").render().unwrap();
    let handles = fig.panel(0, 0).unwrap().legend_handles();
    assert_eq!(handles[0].color, Palette::set2().get(0));
}

/// Claim 9: a wide grid puts the legend below, a tall grid to the right.
#[test]
fn claim_09_auto_legend_placement() {
    let table = experiment_table(&["A", "B"], &["acc", "loss"], 3, 2);
    let wide = MeanStdPlot::new(&table).compare(&["model", "metric"]).x_axis("iteration").render().unwrap();
    assert_eq!(wide.legend().unwrap().placement, LegendPlacement::Bottom);

    let tall = HistGroupsPlot::new(&table)
        .compare(&["model", "iteration", "metric", "rng_offset"])
        .render()
        .unwrap();
    assert_eq!((tall.nrows(), tall.ncols()), (3, 2));
    assert_eq!(tall.legend().unwrap().placement, LegendPlacement::Right);
    assert_eq!(tall.legend().unwrap().columns, 1);
}

// ============================================================================
// Errors
// ============================================================================

/// Claim 10: unknown dimension names abort the call.
#[test]
fn claim_10_unknown_dimension_fatal() {
    let table = experiment_table(&["A"], &["acc"], 1, 2);
    let err = HistGroupsPlot::new(&table).compare(&["model", "optimizer"]).render().unwrap_err();
    assert!(matches!(err, Error::DimensionNotFound { .. }));
    assert!(!err.is_recoverable());
}

/// Claim 11: an unknown legend position string is a configuration error.
#[test]
fn claim_11_unknown_legend_position() {
    let err = GridLayoutPlanner::default().plan_str(2, 3, 7, "top").unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

/// Claim 12: the bottom legend row for 7 items over 3 columns is 3 rows tall.
#[test]
fn claim_12_bottom_legend_rows() {
    let style = Style::default();
    let spec = GridLayoutPlanner::new(style.clone()).plan(2, 3, 7, LegendPosition::Bottom).unwrap();
    let legend = spec.legend().unwrap();
    assert!((legend.size - style.cell_height / 8.0 * 3.0).abs() < 1e-6);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Claim 13: grid shape equals the unique label counts of the grid dimensions.
    #[test]
    fn claim_13_grid_shape_matches_labels(models in 1usize..4, metrics in 1usize..4, seeds in 1i64..4) {
        let model_names = ["A", "B", "C"];
        let metric_names = ["acc", "loss", "time"];
        let table = experiment_table(&model_names[..models], &metric_names[..metrics], seeds, 2);
        let fig = MeanStdPlot::new(&table)
            .compare(&["model", "metric", "rng_offset"])
            .x_axis("iteration")
            .render()
            .unwrap();
        prop_assert_eq!(fig.ncols(), metrics);
        prop_assert_eq!(fig.nrows(), seeds as usize);
        prop_assert_eq!(fig.legend().map_or(0, Legend::len), models);
    }
}

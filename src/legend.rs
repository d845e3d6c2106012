//! Shared legend consolidation.
//!
//! Panels are rendered independently and each exposes only the handles of the
//! series it happened to contain. The consolidator folds those per-panel views
//! into one legend in which every label appears exactly once.

use std::collections::HashMap;

use crate::data::Label;
use crate::figure::{Legend, LegendEntry};
use crate::layout::LegendGeometry;
use crate::palette::ColorAssigner;

#[derive(Debug, Clone)]
struct Slot {
    entry: LegendEntry,
    richness: usize,
}

/// Accumulates legend entries across panels.
#[derive(Debug, Clone, Default)]
pub struct LegendConsolidator {
    slots: Vec<Slot>,
    index: HashMap<Label, usize>,
}

impl LegendConsolidator {
    /// Create an empty consolidator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the handles one panel exposed.
    ///
    /// A label keeps the entry of the panel that exposed the most handles;
    /// ties keep the earlier panel. New labels are appended.
    pub fn observe(&mut self, handles: &[LegendEntry]) {
        let richness = handles.len();
        for handle in handles {
            match self.index.get(&handle.label) {
                Some(&idx) => {
                    let slot = &mut self.slots[idx];
                    if richness > slot.richness {
                        *slot = Slot { entry: handle.clone(), richness };
                    }
                }
                None => {
                    self.index.insert(handle.label.clone(), self.slots.len());
                    self.slots.push(Slot { entry: handle.clone(), richness });
                }
            }
        }
    }

    /// Number of distinct labels observed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing has been observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Build the final legend for the reserved slot.
    #[must_use]
    pub fn finish(self, geometry: &LegendGeometry, font_size: f32) -> Legend {
        Legend {
            entries: self.slots.into_iter().map(|s| s.entry).collect(),
            placement: geometry.placement,
            columns: geometry.columns,
            font_size,
        }
    }

    /// Legend built directly from a color map, in assignment order.
    ///
    /// Entry text is `"{dimension}={label}"`.
    #[must_use]
    pub fn from_colors(
        colors: &ColorAssigner,
        dimension: &str,
        line_width: f32,
        geometry: &LegendGeometry,
        font_size: f32,
    ) -> Legend {
        let entries = colors
            .entries()
            .map(|(label, color)| LegendEntry {
                label: label.clone(),
                text: format!("{dimension}={label}"),
                color,
                line_width,
            })
            .collect();
        Legend { entries, placement: geometry.placement, columns: geometry.columns, font_size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::layout::LegendPlacement;
    use crate::palette::Palette;

    fn entry(label: &str, color: Rgba) -> LegendEntry {
        LegendEntry { label: Label::from(label), text: label.to_string(), color, line_width: 4.0 }
    }

    fn geometry() -> LegendGeometry {
        LegendGeometry { placement: LegendPlacement::Bottom, size: 0.5, columns: 2, items: 3 }
    }

    #[test]
    fn test_union_each_label_once() {
        let mut legend = LegendConsolidator::new();
        legend.observe(&[entry("A", Rgba::BLACK)]);
        legend.observe(&[entry("B", Rgba::WHITE), entry("A", Rgba::BLACK)]);
        legend.observe(&[]);
        legend.observe(&[entry("C", Rgba::BLACK)]);
        let legend = legend.finish(&geometry(), 15.0);
        let labels: Vec<String> = legend.labels().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
        assert_eq!(legend.columns, 2);
    }

    #[test]
    fn test_richest_panel_wins() {
        let mut legend = LegendConsolidator::new();
        let mut thin = entry("A", Rgba::BLACK);
        thin.line_width = 1.0;
        legend.observe(&[thin]);
        legend.observe(&[entry("A", Rgba::BLACK), entry("B", Rgba::WHITE)]);
        let legend = legend.finish(&geometry(), 15.0);
        assert!((legend.entries[0].line_width - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_colors_insertion_order() {
        let mut colors = ColorAssigner::new(Palette::set2());
        colors.color_for(&Label::from("y"));
        colors.color_for(&Label::from("x"));
        let legend = LegendConsolidator::from_colors(&colors, "model", 8.0, &geometry(), 15.0);
        let texts: Vec<&str> = legend.entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["model=y", "model=x"]);
        assert_eq!(legend.entries[0].color, colors.get(&Label::from("y")).unwrap());
    }
}

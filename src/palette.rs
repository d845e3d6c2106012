//! Categorical palettes and per-figure label coloring.
//!
//! A [`ColorAssigner`] belongs to exactly one render call. Labels receive the
//! next palette color on first encounter and keep it for the rest of the
//! call; the palette wraps around once exhausted.

use std::collections::HashMap;

use tracing::warn;

use crate::color::Rgba;
use crate::data::Label;

/// ColorBrewer "Set2" qualitative palette.
pub const SET2: [Rgba; 8] = [
    Rgba::rgb(102, 194, 165),
    Rgba::rgb(252, 141, 98),
    Rgba::rgb(141, 160, 203),
    Rgba::rgb(231, 138, 195),
    Rgba::rgb(166, 216, 84),
    Rgba::rgb(255, 217, 47),
    Rgba::rgb(229, 196, 148),
    Rgba::rgb(179, 179, 179),
];

/// An ordered list of categorical colors.
///
/// Never empty: an empty list, built or deserialized, falls back to Set2.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "PaletteColors"))]
pub struct Palette {
    colors: Vec<Rgba>,
}

/// Wire form of [`Palette`], validated through [`Palette::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct PaletteColors {
    colors: Vec<Rgba>,
}

#[cfg(feature = "serde")]
impl From<PaletteColors> for Palette {
    fn from(wire: PaletteColors) -> Self {
        Palette::new(wire.colors)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::set2()
    }
}

impl Palette {
    /// Build a palette from explicit colors. An empty list falls back to Set2.
    #[must_use]
    pub fn new(colors: Vec<Rgba>) -> Self {
        if colors.is_empty() {
            return Self::set2();
        }
        Self { colors }
    }

    /// The Set2 palette.
    #[must_use]
    pub fn set2() -> Self {
        Self { colors: SET2.to_vec() }
    }

    /// Number of distinct colors before wrap-around.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; palettes are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at position `index`, wrapping cyclically.
    #[must_use]
    pub fn get(&self, index: usize) -> Rgba {
        self.colors[index % self.colors.len()]
    }
}

/// Insertion-ordered label to color mapping, scoped to one figure.
#[derive(Debug, Clone)]
pub struct ColorAssigner {
    palette: Palette,
    assigned: Vec<(Label, Rgba)>,
    lookup: HashMap<Label, usize>,
}

impl ColorAssigner {
    /// Create an assigner drawing from `palette`.
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self { palette, assigned: Vec::new(), lookup: HashMap::new() }
    }

    /// Color of `label`, assigning the next palette color on first encounter.
    pub fn color_for(&mut self, label: &Label) -> Rgba {
        if let Some(&idx) = self.lookup.get(label) {
            return self.assigned[idx].1;
        }
        let idx = self.assigned.len();
        if idx == self.palette.len() {
            warn!(colors = self.palette.len(), "Palette exhausted, reusing colors");
        }
        let color = self.palette.get(idx);
        self.lookup.insert(label.clone(), idx);
        self.assigned.push((label.clone(), color));
        color
    }

    /// Color of `label` if it has already been assigned.
    #[must_use]
    pub fn get(&self, label: &Label) -> Option<Rgba> {
        self.lookup.get(label).map(|&idx| self.assigned[idx].1)
    }

    /// Assigned labels and colors, in first-encounter order.
    pub fn entries(&self) -> impl Iterator<Item = (&Label, Rgba)> {
        self.assigned.iter().map(|(l, c)| (l, *c))
    }

    /// Number of assigned labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    /// Whether no label has been assigned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

//! SVG output encoder.
//!
//! Collects vector elements in a fixed coordinate system (the `viewBox`) and
//! serializes them to a string. The output pixel size can be changed
//! independently through [`WithDimensions`]; the drawing scales with it.

use std::fmt::Write as FmtWrite;

use batuta_common::display::WithDimensions;

use crate::color::Rgba;

/// SVG encoder for vector output.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    /// viewBox width
    view_width: f32,
    /// viewBox height
    view_height: f32,
    /// Output width in pixels
    width: u32,
    /// Output height in pixels
    height: u32,
    /// Background color (None for transparent)
    background: Option<Rgba>,
    /// SVG elements
    elements: Vec<SvgElement>,
}

/// An SVG element.
///
/// Field names are self-documenting and match SVG attribute names.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum SvgElement {
    /// Rectangle
    Rect { x: f32, y: f32, width: f32, height: f32, fill: Rgba, stroke: Option<Rgba>, stroke_width: f32 },
    /// Line
    Line { x1: f32, y1: f32, x2: f32, y2: f32, stroke: Rgba, stroke_width: f32, dashed: bool },
    /// Polyline (connected line segments), closed and filled when `fill` is set
    Polyline { points: Vec<(f32, f32)>, stroke: Option<Rgba>, stroke_width: f32, fill: Option<Rgba> },
    /// Text, optionally rotated about its anchor point
    Text { x: f32, y: f32, text: String, font_size: f32, fill: Rgba, anchor: TextAnchor, rotation: f32 },
}

/// Text anchor position for SVG text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAnchor {
    /// Align text start at position (left-aligned for LTR)
    #[default]
    Start,
    /// Center text at position
    Middle,
    /// Align text end at position (right-aligned for LTR)
    End,
}

impl Default for SvgEncoder {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl SvgEncoder {
    /// Create a new SVG encoder; the viewBox matches the pixel size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            view_width: width as f32,
            view_height: height as f32,
            width,
            height,
            background: Some(Rgba::WHITE),
            elements: Vec::new(),
        }
    }

    /// Set background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Output size in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of collected elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no elements have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Collected elements.
    #[must_use]
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Add a rectangle, optionally outlined with `(color, width)`.
    #[allow(clippy::too_many_arguments)]
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Rgba, stroke: Option<(Rgba, f32)>) {
        let (stroke, stroke_width) = match stroke {
            Some((color, width)) => (Some(color), width),
            None => (None, 1.0),
        };
        self.elements.push(SvgElement::Rect { x, y, width, height, fill, stroke, stroke_width });
    }

    /// Add a line.
    #[allow(clippy::too_many_arguments)]
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: Rgba, stroke_width: f32, dashed: bool) {
        self.elements.push(SvgElement::Line { x1, y1, x2, y2, stroke, stroke_width, dashed });
    }

    /// Add a polyline.
    pub fn polyline(&mut self, points: Vec<(f32, f32)>, stroke: Rgba, stroke_width: f32) {
        if points.len() < 2 {
            return;
        }
        self.elements.push(SvgElement::Polyline { points, stroke: Some(stroke), stroke_width, fill: None });
    }

    /// Add a filled polygon without outline.
    pub fn polygon(&mut self, points: Vec<(f32, f32)>, fill: Rgba) {
        if points.len() < 3 {
            return;
        }
        self.elements.push(SvgElement::Polyline { points, stroke: None, stroke_width: 0.0, fill: Some(fill) });
    }

    /// Add text.
    #[allow(clippy::too_many_arguments)]
    pub fn text(&mut self, x: f32, y: f32, text: &str, font_size: f32, fill: Rgba, anchor: TextAnchor, rotation: f32) {
        self.elements.push(SvgElement::Text { x, y, text: text.to_string(), font_size, fill, anchor, rotation });
    }

    /// Add a raw element.
    pub fn add_element(&mut self, element: SvgElement) {
        self.elements.push(element);
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096 + self.elements.len() * 96);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.view_width, self.view_height
        );

        if let Some(bg) = self.background {
            let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{}"/>"#, bg.to_css());
        }

        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }

        svg.push_str("</svg>\n");
        svg
    }
}

impl WithDimensions for SvgEncoder {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

/// Convert an SVG element to its string representation.
fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Rect { x, y, width, height, fill, stroke, stroke_width } => {
            let stroke_attr = stroke
                .map(|s| format!(r#" stroke="{}" stroke-width="{stroke_width}""#, s.to_css()))
                .unwrap_or_default();
            format!(
                r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}"{stroke_attr}/>"#,
                fill.to_css()
            )
        }
        SvgElement::Line { x1, y1, x2, y2, stroke, stroke_width, dashed } => {
            let dash = if *dashed { r#" stroke-dasharray="4,3""# } else { "" };
            format!(
                r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{}" stroke-width="{stroke_width}"{dash}/>"#,
                stroke.to_css()
            )
        }
        SvgElement::Polyline { points, stroke, stroke_width, fill } => {
            let points_str: String = points.iter().map(|(x, y)| format!("{x},{y}")).collect::<Vec<_>>().join(" ");
            let fill_attr = fill.map_or_else(|| "none".to_string(), Rgba::to_css);
            let stroke_attr = stroke.map_or_else(
                || r#" stroke="none""#.to_string(),
                |s| format!(r#" stroke="{}" stroke-width="{stroke_width}" stroke-linejoin="round""#, s.to_css()),
            );
            let tag = if fill.is_some() { "polygon" } else { "polyline" };
            format!(r#"<{tag} points="{points_str}" fill="{fill_attr}"{stroke_attr}/>"#)
        }
        SvgElement::Text { x, y, text, font_size, fill, anchor, rotation } => {
            let anchor_str = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let transform = if rotation.abs() > f32::EPSILON {
                format!(r#" transform="rotate({rotation} {x} {y})""#)
            } else {
                String::new()
            };
            format!(
                r#"<text x="{x}" y="{y}" font-size="{font_size}" fill="{}" text-anchor="{anchor_str}" dominant-baseline="middle" font-family="sans-serif"{transform}>{}</text>"#,
                fill.to_css(),
                escape(text)
            )
        }
    }
}

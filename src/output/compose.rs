//! Figure to SVG composition.
//!
//! Lays out every panel's plot area inside its grid cell, maps data
//! coordinates through the panel's scales and emits SVG elements for marks,
//! axes, labels, colorbars and the shared legend.

use super::svg::{SvgEncoder, TextAnchor};
use crate::color::Rgba;
use crate::figure::{Axis, Colorbar, Figure, Legend, Mark, Panel, YScale};
use crate::geometry::Rect;
use crate::scale::{LinearScale, LogScale, Scale};

/// Points per inch.
const POINTS_PER_INCH: f32 = 72.0;
/// Axis frame stroke width in points.
const FRAME_WIDTH: f32 = 2.0;
/// Colorbar strip subdivisions.
const COLORBAR_STEPS: usize = 32;

struct Units {
    dpi: f32,
}

impl Units {
    fn inches(&self, v: f32) -> f32 {
        v * self.dpi
    }

    fn points(&self, v: f32) -> f32 {
        v * self.dpi / POINTS_PER_INCH
    }
}

impl SvgEncoder {
    /// Compose a finished figure into SVG elements.
    ///
    /// The output size is the figure's canvas at the style's dpi, plus room
    /// for the figure title when one is set.
    #[must_use]
    pub fn from_figure(figure: &Figure) -> Self {
        let style = figure.style();
        let units = Units { dpi: style.dpi };
        let title_height = figure.suptitle().map_or(0.0, |_| units.points(figure.suptitle_font_size()) * 1.8);

        let (w, h) = figure.size();
        let width = units.inches(w);
        let height = units.inches(h) + title_height;
        let mut svg = SvgEncoder::new(width.round() as u32, height.round() as u32).background(Some(style.background));

        if let Some(title) = figure.suptitle() {
            svg.text(
                width / 2.0,
                title_height / 2.0,
                title,
                units.points(figure.suptitle_font_size()),
                style.text_color,
                TextAnchor::Middle,
                0.0,
            );
        }

        for panel in figure.panels() {
            let Some(cell) = figure.panel_rect(panel.row, panel.col) else { continue };
            let pad = figure.padding() / 2.0;
            let mut cell = cell.inset(pad, pad).scaled(units.dpi);
            cell.y += title_height;
            draw_panel(&mut svg, panel, cell, &units, style.text_color);
        }

        if let (Some(legend), Some(rect)) = (figure.legend(), figure.grid().legend_rect()) {
            let mut rect = rect.scaled(units.dpi);
            rect.y += title_height;
            draw_legend(&mut svg, legend, rect, &units, style.text_color);
        }
        svg
    }
}

impl Figure {
    /// Serialize the figure as an SVG document.
    #[must_use]
    pub fn to_svg(&self) -> String {
        SvgEncoder::from_figure(self).render()
    }
}

fn plot_area(panel: &Panel, cell: Rect, units: &Units) -> Rect {
    let tick = units.points(panel.tick_font_size);
    let label = units.points(panel.label_font_size);

    let left = tick * 4.0 + if panel.y_label.is_some() { label * 1.6 } else { 0.0 };
    let bottom = tick * 1.8 + if panel.x_label.is_some() { label * 1.6 } else { 0.0 };
    let top = if panel.title.is_some() { units.points(panel.title_font_size) * 1.8 } else { tick };
    let mut right = tick + if panel.secondary_y_label.is_some() { label * 1.6 } else { 0.0 };
    if panel.colorbar.is_some() {
        right += cell.width * 0.05 + tick * 4.0;
    }
    Rect::new(
        cell.x + left,
        cell.y + top,
        (cell.width - left - right).max(1.0),
        (cell.height - top - bottom).max(1.0),
    )
}

fn y_mapping(panel: &Panel, domain: (f32, f32), area: Rect) -> Box<dyn Scale<f32, f32>> {
    let range = if panel.y_inverted { (area.y, area.bottom()) } else { (area.bottom(), area.y) };
    if panel.y_scale == YScale::Log {
        if let Ok(scale) = LogScale::new(domain, range) {
            return Box::new(scale);
        }
    }
    Box::new(LinearScale::padded(domain, range))
}

fn draw_panel(svg: &mut SvgEncoder, panel: &Panel, cell: Rect, units: &Units, text: Rgba) {
    let area = plot_area(panel, cell, units);
    let tick_px = units.points(panel.tick_font_size);
    let label_px = units.points(panel.label_font_size);

    if let Some(title) = &panel.title {
        let size = units.points(panel.title_font_size);
        svg.text(area.center().x, area.y - size * 0.9, title, size, text, TextAnchor::Middle, 0.0);
    }
    if let Some(label) = &panel.y_label {
        svg.text(cell.x + label_px * 0.6, area.center().y, label, label_px, text, TextAnchor::Middle, -90.0);
    }
    if let Some(label) = &panel.secondary_y_label {
        let x = area.right() + tick_px * 0.5 + label_px * 0.6;
        svg.text(x, area.center().y, label, label_px, text, TextAnchor::Middle, 90.0);
    }
    if let Some(label) = &panel.x_label {
        let y = area.bottom() + tick_px * 1.8 + label_px * 0.6;
        svg.text(area.right(), y, label, label_px, text, TextAnchor::End, 0.0);
    }

    if let Some((x_domain, y_domain)) = panel.data_ranges() {
        let x = LinearScale::padded(x_domain, (area.x, area.right()));
        let y = y_mapping(panel, y_domain, area);
        let clamp_y = |v: f32| v.clamp(area.y, area.bottom());
        let clamp_x = |v: f32| v.clamp(area.x, area.right());

        for grid in &panel.grid {
            let ticks = match grid.axis {
                Axis::X => &panel.x_ticks,
                Axis::Y => &panel.y_ticks,
            };
            for t in ticks.iter().filter(|t| t.major == grid.major) {
                let (x1, y1, x2, y2) = match grid.axis {
                    Axis::X => (x.scale(t.position), area.y, x.scale(t.position), area.bottom()),
                    Axis::Y => (area.x, y.scale(t.position), area.right(), y.scale(t.position)),
                };
                if (area.x..=area.right()).contains(&x1) && (area.y..=area.bottom()).contains(&y1) {
                    svg.line(x1, y1, x2, y2, grid.color, units.points(grid.width), grid.dashed);
                }
            }
        }

        for mark in &panel.marks {
            match mark {
                Mark::Line { points, color, width, .. } => {
                    let pts = points.iter().map(|p| (clamp_x(x.scale(p.x)), clamp_y(y.scale(p.y)))).collect();
                    svg.polyline(pts, *color, units.points(*width));
                }
                Mark::Band { xs, lower, upper, color } => {
                    let mut pts: Vec<(f32, f32)> =
                        xs.iter().zip(upper).map(|(&px, &py)| (clamp_x(x.scale(px)), clamp_y(y.scale(py)))).collect();
                    pts.extend(
                        xs.iter().zip(lower).rev().map(|(&px, &py)| (clamp_x(x.scale(px)), clamp_y(y.scale(py)))),
                    );
                    svg.polygon(pts, *color);
                }
                Mark::Bar { y: center, length, thickness, color, edge, .. } => {
                    let (xa, xb) = (x.scale(0.0), x.scale(*length));
                    let (ya, yb) = (y.scale(center - thickness / 2.0), y.scale(center + thickness / 2.0));
                    svg.rect(xa.min(xb), ya.min(yb), (xb - xa).abs(), (yb - ya).abs(), *color, Some((*edge, 1.0)));
                }
                Mark::Text { position, text: content, font_size, color } => {
                    let (px, py) = (x.scale(position.x), y.scale(position.y));
                    svg.text(px, py, content, units.points(*font_size), *color, TextAnchor::Middle, 0.0);
                }
                Mark::Mesh { rows, cols, values, scale } => {
                    for (idx, v) in values.iter().enumerate().take(rows * cols) {
                        let (i, j) = ((idx / cols) as f32, (idx % cols) as f32);
                        let (xa, xb) = (x.scale(j), x.scale(j + 1.0));
                        let (ya, yb) = (y.scale(i), y.scale(i + 1.0));
                        svg.rect(xa.min(xb), ya.min(yb), (xb - xa).abs(), (yb - ya).abs(), scale.scale(*v), None);
                    }
                }
            }
        }

        let tick_len = tick_px * 0.35;
        for t in panel.x_ticks.iter().filter(|t| t.major) {
            let px = x.scale(t.position);
            if !(area.x - 0.5..=area.right() + 0.5).contains(&px) {
                continue;
            }
            svg.line(px, area.bottom(), px, area.bottom() + tick_len, text, 1.0, false);
            if panel.x_tick_labels {
                let rotated = panel.x_tick_rotation.abs() > f32::EPSILON;
                let anchor = if rotated { TextAnchor::End } else { TextAnchor::Middle };
                let ly = area.bottom() + tick_len + tick_px * 0.7;
                svg.text(px, ly, &t.label, tick_px, text, anchor, -panel.x_tick_rotation);
            }
        }
        for t in panel.y_ticks.iter().filter(|t| t.major) {
            let py = y.scale(t.position);
            if !(area.y - 0.5..=area.bottom() + 0.5).contains(&py) {
                continue;
            }
            svg.line(area.x - tick_len, py, area.x, py, text, 1.0, false);
            svg.text(area.x - tick_len * 1.5, py, &t.label, tick_px, text, TextAnchor::End, 0.0);
        }
        if let Some(exp) = panel.y_exponent {
            svg.text(area.x, area.y - tick_px * 0.6, &format!("x10^{exp}"), tick_px, text, TextAnchor::Start, 0.0);
        }
    }

    if let Some(colorbar) = &panel.colorbar {
        draw_colorbar(svg, colorbar, area, cell, tick_px, text);
    }
    svg.rect(area.x, area.y, area.width, area.height, Rgba::TRANSPARENT, Some((text, units.points(FRAME_WIDTH))));
}

fn draw_colorbar(svg: &mut SvgEncoder, colorbar: &Colorbar, area: Rect, cell: Rect, tick_px: f32, text: Rgba) {
    let strip = Rect::new(area.right() + tick_px, area.y, cell.width * 0.04, area.height);
    let (lo, hi) = colorbar.scale.domain();
    let step_h = strip.height / COLORBAR_STEPS as f32;
    for k in 0..COLORBAR_STEPS {
        let t = (k as f32 + 0.5) / COLORBAR_STEPS as f32;
        let color = colorbar.scale.scale(lo + t * (hi - lo));
        let top = strip.bottom() - (k as f32 + 1.0) * step_h;
        svg.rect(strip.x, top, strip.width, step_h + 0.5, color, None);
    }
    let position = LinearScale::padded((lo, hi), (strip.bottom(), strip.y));
    for t in &colorbar.ticks {
        let py = position.scale(t.position);
        svg.text(strip.right() + tick_px * 0.4, py, &t.label, tick_px, text, TextAnchor::Start, 0.0);
    }
    svg.rect(strip.x, strip.y, strip.width, strip.height, Rgba::TRANSPARENT, Some((text, 1.0)));
}

fn draw_legend(svg: &mut SvgEncoder, legend: &Legend, rect: Rect, units: &Units, text: Rgba) {
    if legend.is_empty() {
        return;
    }
    let font = units.points(legend.font_size);
    let columns = legend.columns.max(1);
    let rows = legend.len().div_ceil(columns);
    let row_h = (rect.height / rows as f32).min(font * 2.0);
    let col_w = rect.width / columns as f32;
    let handle = font * 2.0;
    let top = rect.center().y - row_h * rows as f32 / 2.0;

    for (idx, entry) in legend.entries.iter().enumerate() {
        let (r, c) = (idx / columns, idx % columns);
        let cy = top + (r as f32 + 0.5) * row_h;
        let x = rect.x + c as f32 * col_w + font;
        svg.line(x, cy, x + handle, cy, entry.color, units.points(entry.line_width), false);
        svg.text(x + handle + font * 0.5, cy, &entry.text, font, text, TextAnchor::Start, 0.0);
    }
}

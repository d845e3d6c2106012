//! Scale functions, tick locators and tick formatters.
//!
//! Scales transform data values to visual properties (position, color).
//! Based on the Grammar of Graphics [Wilkinson 2005].

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain_min: f32,
    domain_max: f32,
    range_min: f32,
    range_max: f32,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns an error if domain_min equals domain_max.
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Result<Self> {
        if (domain.0 - domain.1).abs() < f32::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self { domain_min: domain.0, domain_max: domain.1, range_min: range.0, range_max: range.1 })
    }

    /// Create a scale, widening a degenerate domain by one unit on each side.
    #[must_use]
    pub fn padded(domain: (f32, f32), range: (f32, f32)) -> Self {
        let (lo, hi) = if (domain.0 - domain.1).abs() < f32::EPSILON {
            (domain.0 - 1.0, domain.1 + 1.0)
        } else {
            domain
        };
        Self { domain_min: lo, domain_max: hi, range_min: range.0, range_max: range.1 }
    }
}

impl Scale<f32, f32> for LinearScale {
    fn scale(&self, value: f32) -> f32 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f32, f32) {
        (self.range_min, self.range_max)
    }
}

/// Base-10 logarithmic scale.
#[derive(Debug, Clone, Copy)]
pub struct LogScale {
    log_min: f32,
    log_max: f32,
    range_min: f32,
    range_max: f32,
}

impl LogScale {
    /// Create a new logarithmic scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain contains non-positive values or is degenerate.
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Result<Self> {
        if domain.0 <= 0.0 || domain.1 <= 0.0 {
            return Err(Error::ScaleDomain("Log scale domain must be positive".to_string()));
        }
        let (log_min, log_max) = (domain.0.log10(), domain.1.log10());
        if (log_max - log_min).abs() < f32::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }
        Ok(Self { log_min, log_max, range_min: range.0, range_max: range.1 })
    }
}

impl Scale<f32, f32> for LogScale {
    fn scale(&self, value: f32) -> f32 {
        let log_val = value.max(f32::MIN_POSITIVE).log10();
        let t = (log_val - self.log_min) / (self.log_max - self.log_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f32, f32) {
        (10f32.powf(self.log_min), 10f32.powf(self.log_max))
    }

    fn range(&self) -> (f32, f32) {
        (self.range_min, self.range_max)
    }
}

/// Color scale for mapping values to colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    colors: Vec<Rgba>,
    domain_min: f32,
    domain_max: f32,
}

impl ColorScale {
    /// Create a new color scale.
    ///
    /// # Errors
    ///
    /// Returns an error if colors is empty or domain is invalid.
    pub fn new(colors: Vec<Rgba>, domain: (f32, f32)) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::ScaleDomain("Color scale requires at least one color".to_string()));
        }

        if (domain.0 - domain.1).abs() < f32::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self { colors, domain_min: domain.0, domain_max: domain.1 })
    }

    /// Create a viridis color scale (perceptually uniform).
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is degenerate.
    pub fn viridis(domain: (f32, f32)) -> Result<Self> {
        Self::new(
            vec![
                Rgba::rgb(68, 1, 84),
                Rgba::rgb(59, 82, 139),
                Rgba::rgb(33, 145, 140),
                Rgba::rgb(94, 201, 98),
                Rgba::rgb(253, 231, 37),
            ],
            domain,
        )
    }

    /// Color stops, low to high.
    #[must_use]
    pub fn stops(&self) -> &[Rgba] {
        &self.colors
    }
}

impl Scale<f32, Rgba> for ColorScale {
    fn scale(&self, value: f32) -> Rgba {
        let t = ((value - self.domain_min) / (self.domain_max - self.domain_min)).clamp(0.0, 1.0);

        if self.colors.len() == 1 {
            return self.colors[0];
        }

        let segment_count = self.colors.len() - 1;
        let segment = (t * segment_count as f32).floor() as usize;
        let segment = segment.min(segment_count - 1);

        let local_t = t * segment_count as f32 - segment as f32;

        self.colors[segment].lerp(self.colors[segment + 1], local_t)
    }

    fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (Rgba, Rgba) {
        (*self.colors.first().unwrap_or(&Rgba::BLACK), *self.colors.last().unwrap_or(&Rgba::WHITE))
    }
}

// ============================================================================
// Ticks
// ============================================================================

/// An axis tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Position in data coordinates.
    pub position: f32,
    /// Tick label (empty for unlabeled ticks).
    pub label: String,
    /// Major ticks carry labels and grid lines of full weight.
    pub major: bool,
}

impl Tick {
    /// A labeled major tick.
    #[must_use]
    pub fn major(position: f32, label: impl Into<String>) -> Self {
        Self { position, label: label.into(), major: true }
    }

    /// An unlabeled minor tick.
    #[must_use]
    pub fn minor(position: f32) -> Self {
        Self { position, label: String::new(), major: false }
    }
}

/// Decade ticks for a log axis spanning `[lo, hi]`.
///
/// At most `max_major` decades are labeled (as `10^k`); the remaining
/// multiples `2..=9` of each decade become minor ticks.
#[must_use]
pub fn log_ticks(lo: f32, hi: f32, max_major: usize) -> Vec<Tick> {
    if !(lo > 0.0 && hi > lo) {
        return Vec::new();
    }
    let first = order_of_magnitude(lo);
    let last = (hi.log10() - 1e-5).ceil() as i32;
    let decades = (last - first + 1) as usize;
    let stride = decades.div_ceil(max_major.max(1)).max(1);

    let mut ticks = Vec::new();
    for exp in first..=last {
        let base = 10f32.powi(exp);
        if (exp - first) as usize % stride == 0 && base >= lo * 0.999 && base <= hi * 1.001 {
            ticks.push(Tick::major(base, format!("10^{exp}")));
        } else if base >= lo && base <= hi {
            ticks.push(Tick::minor(base));
        }
        for mult in 2..=9 {
            let v = base * mult as f32;
            if v >= lo && v <= hi {
                ticks.push(Tick::minor(v));
            }
        }
    }
    ticks
}

/// Decimal order of magnitude, robust to `log10` rounding just below an integer.
fn order_of_magnitude(value: f32) -> i32 {
    (value.abs().log10() + 1e-5).floor() as i32
}

/// "Nice" tick positions (1, 2, 5 x 10^k steps) covering `[lo, hi]`.
#[must_use]
pub fn linear_ticks(lo: f32, hi: f32, target: usize) -> Vec<f32> {
    if !lo.is_finite() || !hi.is_finite() || target == 0 {
        return Vec::new();
    }
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    // Pad flat ranges relative to their magnitude; a fixed pad vanishes in f32 at large values.
    let (lo, hi) = if hi - lo <= hi.abs().max(lo.abs()) * f32::EPSILON {
        let pad = (lo.abs() * 1e-3).max(1.0);
        (lo - pad, hi + pad)
    } else {
        (lo, hi)
    };
    let raw = (hi - lo) / target as f32;
    if !raw.is_finite() || raw <= 0.0 {
        return Vec::new();
    }
    let magnitude = 10f32.powi(order_of_magnitude(raw));
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let start = (lo / step).ceil() as i64;
    let end = (hi / step).floor() as i64;
    (start..=end).map(|i| i as f32 * step).collect()
}

/// Linear tick labels with an optional shared power-of-ten exponent.
#[derive(Debug, Clone, PartialEq)]
pub struct TickLabels {
    /// One label per tick.
    pub labels: Vec<String>,
    /// Shared exponent shown once per axis (`x10^k`), if scientific.
    pub exponent: Option<i32>,
}

/// Format linear ticks, switching to scientific notation with a shared
/// exponent when the largest magnitude's order falls outside the open
/// interval `power_limits`.
#[must_use]
pub fn format_linear_ticks(values: &[f32], power_limits: (i32, i32)) -> TickLabels {
    let max_abs = values.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    let exponent = if max_abs > 0.0 {
        let oom = order_of_magnitude(max_abs);
        (oom <= power_limits.0 || oom >= power_limits.1).then_some(oom)
    } else {
        None
    };
    let divisor = 10f32.powi(exponent.unwrap_or(0));
    let scaled: Vec<f32> = values.iter().map(|v| v / divisor).collect();

    let step = scaled.windows(2).map(|w| (w[1] - w[0]).abs()).fold(f32::INFINITY, f32::min);
    let decimals = if step.is_finite() && step > 0.0 {
        (-step.log10().floor()).max(0.0) as usize
    } else {
        0
    };

    let labels = scaled
        .iter()
        .map(|v| {
            let v = if v.abs() < f32::EPSILON { 0.0 } else { *v };
            format!("{v:.decimals$}")
        })
        .collect();
    TickLabels { labels, exponent }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scale() {
        let scale = LinearScale::new((0.0, 100.0), (0.0, 1.0)).unwrap();
        assert!((scale.scale(0.0) - 0.0).abs() < 0.001);
        assert!((scale.scale(50.0) - 0.5).abs() < 0.001);
        assert!((scale.scale(100.0) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_linear_scale_padded_degenerate() {
        let scale = LinearScale::padded((3.0, 3.0), (0.0, 2.0));
        assert_eq!(scale.domain(), (2.0, 4.0));
        assert!((scale.scale(3.0) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_log_scale() {
        let scale = LogScale::new((1.0, 1000.0), (0.0, 3.0)).unwrap();
        assert!((scale.scale(1.0) - 0.0).abs() < 0.001);
        assert!((scale.scale(10.0) - 1.0).abs() < 0.001);
        assert!((scale.scale(1000.0) - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_log_scale_invalid_domain() {
        assert!(LogScale::new((-1.0, 100.0), (0.0, 1.0)).is_err());
        assert!(LogScale::new((0.0, 100.0), (0.0, 1.0)).is_err());
        assert!(LogScale::new((5.0, 5.0), (0.0, 1.0)).is_err());
    }

    #[test]
    fn test_viridis_endpoints() {
        let scale = ColorScale::viridis((-1.0, 1.0)).unwrap();
        assert_eq!(scale.scale(-1.0), Rgba::rgb(68, 1, 84));
        assert_eq!(scale.scale(1.0), Rgba::rgb(253, 231, 37));
        assert_eq!(scale.stops().len(), 5);
    }

    #[test]
    fn test_log_ticks_decades() {
        let ticks = log_ticks(0.001, 1.0, 3);
        let majors: Vec<&str> = ticks.iter().filter(|t| t.major).map(|t| t.label.as_str()).collect();
        assert!(majors.len() <= 3);
        assert!(majors.contains(&"10^-3"));
        assert!(ticks.iter().any(|t| !t.major && (t.position - 0.002).abs() < 1e-6));
    }

    #[test]
    fn test_log_ticks_invalid_range() {
        assert!(log_ticks(0.0, 1.0, 3).is_empty());
        assert!(log_ticks(2.0, 1.0, 3).is_empty());
    }

    #[test]
    fn test_linear_ticks_nice_steps() {
        let t = linear_ticks(0.0, 1.0, 5);
        assert_eq!(t.len(), 6);
        assert!((t[1] - 0.2).abs() < 1e-5);
        assert!((t[5] - 1.0).abs() < 1e-5);
        let t = linear_ticks(0.0, 10.0, 5);
        assert!(t[0].abs() < 1e-5);
        assert!((t[t.len() - 1] - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_linear_ticks_flat_range() {
        let small = linear_ticks(2.5, 2.5, 5);
        assert!(small.len() >= 3);
        assert!(small.iter().any(|&v| (v - 2.0).abs() < 1e-5));

        let large = linear_ticks(1e8, 1e8, 5);
        assert!(large.len() >= 3);
        assert!(large.iter().all(|&v| (v - 1e8).abs() <= 1e5 + 1.0));
        assert!(large.iter().any(|&v| (v - 1e8).abs() < 1.0));
    }

    #[test]
    fn test_format_plain_range() {
        let labels = format_linear_ticks(&[2.0, 4.0, 6.0], (-1, 1));
        assert_eq!(labels.exponent, None);
        assert_eq!(labels.labels, vec!["2", "4", "6"]);
    }

    #[test]
    fn test_format_scientific_large() {
        let labels = format_linear_ticks(&[0.0, 500.0, 1000.0], (-1, 1));
        assert_eq!(labels.exponent, Some(3));
        assert_eq!(labels.labels, vec!["0.0", "0.5", "1.0"]);
    }

    #[test]
    fn test_format_scientific_small() {
        let labels = format_linear_ticks(&[0.01, 0.02], (-1, 1));
        assert_eq!(labels.exponent, Some(-2));
    }
}

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Magnitude colour ramp
// ---------------------------------------------------------------------------

/// Hue at the weakest observed magnitude (amber).
const HUE_LOW: f32 = 40.0;
/// Hue at the strongest observed magnitude (red).
const HUE_HIGH: f32 = 0.0;

/// Maps magnitudes onto an amber → red ramp over the observed range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeRamp {
    min: f64,
    max: f64,
    alpha: u8,
}

impl MagnitudeRamp {
    pub fn new(range: (f64, f64), alpha: u8) -> Self {
        Self {
            min: range.0,
            max: range.1,
            alpha,
        }
    }

    /// Position of `magnitude` in the range, 0.0 ..= 1.0.
    fn position(&self, magnitude: f64) -> f32 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON || !magnitude.is_finite() {
            return 0.5;
        }
        ((magnitude - self.min) / span).clamp(0.0, 1.0) as f32
    }

    /// Colour for a marker; missing magnitudes sit at the low end.
    pub fn color_for(&self, magnitude: Option<f64>) -> Color32 {
        let t = magnitude.map_or(0.0, |m| self.position(m));
        let hue = HUE_LOW + (HUE_HIGH - HUE_LOW) * t;
        let hsl = Hsl::new(hue, 1.0, 0.5);
        let rgb: Srgb = hsl.into_color();
        Color32::from_rgba_unmultiplied(
            (rgb.red * 255.0) as u8,
            (rgb.green * 255.0) as u8,
            (rgb.blue * 255.0) as u8,
            self.alpha,
        )
    }
}

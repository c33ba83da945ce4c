// Model-space to device-space coordinate mapping.
use crate::executor::input::DevicePoint;

/// Converts between the resolution advertised to the model and the sandbox's pixels.
pub trait CoordinateScaler: Send + Sync {
    /// Maps a model-space point to device pixels.
    fn scale_to_original_space(&self, point: (f64, f64)) -> DevicePoint;

    /// Resolution the model is told about.
    fn scaled_resolution(&self) -> (u32, u32);
}

/// Linear scaler between a fixed model resolution and the device resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionScaler {
    original: (u32, u32),
    scaled: (u32, u32),
}

impl ResolutionScaler {
    pub fn new(original: (u32, u32), scaled: (u32, u32)) -> Self {
        Self {
            original: (original.0.max(1), original.1.max(1)),
            scaled: (scaled.0.max(1), scaled.1.max(1)),
        }
    }

    /// Model resolution no wider than `max_width`, keeping the device aspect ratio.
    /// Devices narrower than `max_width` are not upscaled.
    pub fn with_max_width(original: (u32, u32), max_width: u32) -> Self {
        let (w, h) = (original.0.max(1), original.1.max(1));
        if w <= max_width {
            return Self::new(original, original);
        }
        let ratio = max_width as f64 / w as f64;
        let scaled_h = (h as f64 * ratio).round().max(1.0) as u32;
        Self::new(original, (max_width, scaled_h))
    }

    fn factors(&self) -> (f64, f64) {
        (
            self.original.0 as f64 / self.scaled.0 as f64,
            self.original.1 as f64 / self.scaled.1 as f64,
        )
    }
}

impl CoordinateScaler for ResolutionScaler {
    fn scale_to_original_space(&self, point: (f64, f64)) -> DevicePoint {
        let (fx, fy) = self.factors();
        let max_x = self.original.0 as f64 - 1.0;
        let max_y = self.original.1 as f64 - 1.0;
        let x = (point.0 * fx).round().clamp(0.0, max_x) as i32;
        let y = (point.1 * fy).round().clamp(0.0, max_y) as i32;
        (x, y)
    }

    fn scaled_resolution(&self) -> (u32, u32) {
        self.scaled
    }
}

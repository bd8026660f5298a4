use crate::foundation::error::{FrameError, FrameResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Natural pixel dimensions of a decoded bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Create a validated size with both dimensions non-zero.
    pub fn new(width: u32, height: u32) -> FrameResult<Self> {
        if width == 0 || height == 0 {
            return Err(FrameError::validation(format!(
                "image size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// `width / height`.
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

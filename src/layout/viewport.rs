//! Viewport Sizer: container measurement to square canvas size.

use crate::config::EditorConfig;
use crate::foundation::error::{FrameError, FrameResult};

/// One reading of the hosting page: device viewport width plus the container's content width.
///
/// `container_width` is `None` (or zero) until the container has been laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContainerMeasurement {
    /// Device viewport width in CSS pixels; decides the device class.
    pub viewport_width: u32,
    /// Content width of the hosting container in CSS pixels.
    pub container_width: Option<u32>,
}

impl ContainerMeasurement {
    /// A measurement where the container spans the viewport.
    pub fn full_width(width: u32) -> Self {
        Self {
            viewport_width: width,
            container_width: Some(width),
        }
    }
}

/// Current on-screen canvas size. Always replaced wholesale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ViewportState {
    pixel_size: u32,
    is_compact_device: bool,
}

impl ViewportState {
    /// Edge length of the square canvas in device pixels. Always > 0.
    pub fn pixel_size(self) -> u32 {
        self.pixel_size
    }

    /// Whether the last measurement classified the device as compact.
    pub fn is_compact_device(self) -> bool {
        self.is_compact_device
    }

    /// `pixel_size / reference_canvas_size`.
    pub fn viewport_scale(self, reference_canvas_size: u32) -> f64 {
        f64::from(self.pixel_size) / f64::from(reference_canvas_size.max(1))
    }
}

/// Derives [`ViewportState`] from container measurements.
#[derive(Clone, Copy, Debug)]
pub struct ViewportSizer {
    compact_breakpoint: u32,
    compact_padding: u32,
    fallback_pixel_size: u32,
    reference_canvas_size: u32,
}

impl ViewportSizer {
    /// Build a sizer from the editor configuration.
    pub fn new(cfg: &EditorConfig) -> Self {
        Self {
            compact_breakpoint: cfg.compact_breakpoint,
            compact_padding: cfg.compact_padding,
            fallback_pixel_size: cfg.fallback_pixel_size.max(1),
            reference_canvas_size: cfg.reference_canvas_size.max(1),
        }
    }

    /// Compact devices are strictly narrower than the breakpoint.
    pub fn is_compact(&self, viewport_width: u32) -> bool {
        viewport_width < self.compact_breakpoint
    }

    /// Pure sizing rule. Same inputs always produce the same state.
    ///
    /// Fails with [`FrameError::MeasurementUnavailable`] when the container has no width yet.
    pub fn compute(&self, m: ContainerMeasurement) -> FrameResult<ViewportState> {
        let container = match m.container_width {
            Some(w) if w > 0 => w,
            _ => {
                return Err(FrameError::measurement_unavailable(
                    "container has not been laid out",
                ));
            }
        };

        let is_compact_device = self.is_compact(m.viewport_width);
        let pixel_size = if is_compact_device {
            match container.checked_sub(self.compact_padding) {
                Some(px) if px > 0 => px,
                _ => self.fallback_pixel_size,
            }
        } else {
            container.min(self.reference_canvas_size)
        };

        Ok(ViewportState {
            pixel_size,
            is_compact_device,
        })
    }

    /// Initial state on mount. An unmeasurable container yields the fallback size.
    pub fn mount(&self, m: ContainerMeasurement) -> ViewportState {
        self.compute(m).unwrap_or_else(|_| {
            tracing::debug!(
                fallback = self.fallback_pixel_size,
                "container not measurable on mount, using fallback size"
            );
            ViewportState {
                pixel_size: self.fallback_pixel_size,
                is_compact_device: self.is_compact(m.viewport_width),
            }
        })
    }

    /// Recompute after a resize event. Returns `true` when the state changed.
    ///
    /// An unmeasurable container is skipped and the previous state retained.
    pub fn on_resize(&self, state: &mut ViewportState, m: ContainerMeasurement) -> bool {
        match self.compute(m) {
            Ok(next) => {
                let changed = next != *state;
                *state = next;
                changed
            }
            Err(err) => {
                tracing::debug!(%err, "skipping viewport recomputation");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/viewport.rs"]
mod tests;

//! Pure geometry of the photo layer.
//!
//! The transform model never renders. It maps the photo's natural aspect ratio, the user scale
//! slider and the viewport scale onto the resting (centered) layer box. Interactive deltas are
//! owned by the manipulation handle and composed on top.

use crate::config::EditorConfig;
use crate::foundation::core::ImageSize;
use crate::foundation::error::{FrameError, FrameResult};

/// User-facing scale factor, guaranteed inside the configured slider range.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize)]
pub struct UserScale(f64);

impl UserScale {
    /// Neutral scale.
    pub const ONE: Self = Self(1.0);

    /// Raw factor.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for UserScale {
    fn default() -> Self {
        Self::ONE
    }
}

/// Slider range and granularity for [`UserScale`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBounds {
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
    /// Step granularity.
    pub step: f64,
}

impl ScaleBounds {
    /// Bounds from the editor configuration.
    pub fn from_config(cfg: &EditorConfig) -> Self {
        Self {
            min: cfg.min_user_scale,
            max: cfg.max_user_scale,
            step: cfg.user_scale_step,
        }
    }

    /// Accept `v` only if it already lies in range; snaps to the step grid.
    pub fn try_scale(&self, v: f64) -> FrameResult<UserScale> {
        if !v.is_finite() || v < self.min || v > self.max {
            return Err(FrameError::validation(format!(
                "user scale {v} outside [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(self.snap(v))
    }

    /// Clamp `v` into range and snap to the step grid. Non-finite values are rejected.
    pub fn clamp_scale(&self, v: f64) -> FrameResult<UserScale> {
        if !v.is_finite() {
            return Err(FrameError::validation(format!("user scale {v} is not finite")));
        }
        Ok(self.snap(v.clamp(self.min, self.max)))
    }

    fn snap(&self, v: f64) -> UserScale {
        let snapped = if self.step > 0.0 {
            (v / self.step).round() * self.step
        } else {
            v
        };
        UserScale(snapped.clamp(self.min, self.max))
    }
}

/// Displayed photo layer box in on-screen pixels, before manipulation deltas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LayerGeometry {
    /// Displayed width.
    pub width: f64,
    /// Displayed height.
    pub height: f64,
    /// Left edge of the centered resting position.
    pub x: f64,
    /// Top edge of the centered resting position.
    pub y: f64,
}

impl LayerGeometry {
    /// Geometry used when no photo is loaded. Nothing is rendered for it.
    pub const EMPTY: Self = Self {
        width: 0.0,
        height: 0.0,
        x: 0.0,
        y: 0.0,
    };

    /// Whether this is the neutral geometry.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Base geometry of the current photo at `userScaleFactor = 1` and `viewportScale = 1`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TransformState {
    /// Current slider value.
    pub user_scale: UserScale,
    /// `reference_layer_height * aspectRatio`.
    pub base_layer_width: f64,
    /// `reference_layer_height`.
    pub base_layer_height: f64,
}

/// Maps photo dimensions and scales to layer geometry.
#[derive(Clone, Copy, Debug)]
pub struct TransformModel {
    bounds: ScaleBounds,
    reference_canvas_size: f64,
    reference_layer_height: f64,
}

impl TransformModel {
    /// Build from the editor configuration.
    pub fn new(cfg: &EditorConfig) -> Self {
        Self {
            bounds: ScaleBounds::from_config(cfg),
            reference_canvas_size: f64::from(cfg.reference_canvas_size),
            reference_layer_height: cfg.reference_layer_height,
        }
    }

    /// Slider bounds enforced by this model.
    pub fn bounds(&self) -> ScaleBounds {
        self.bounds
    }

    /// Base geometry for a photo. The photo's own aspect ratio drives both axes.
    pub fn transform_state(&self, photo: ImageSize, user_scale: UserScale) -> TransformState {
        TransformState {
            user_scale,
            base_layer_width: self.reference_layer_height * photo.aspect_ratio(),
            base_layer_height: self.reference_layer_height,
        }
    }

    /// Centered layer box for `photo` at the given scales.
    ///
    /// `user_scale` is re-clamped here even though the slider already bounds it.
    pub fn layer_geometry(
        &self,
        photo: Option<ImageSize>,
        user_scale: UserScale,
        viewport_scale: f64,
    ) -> LayerGeometry {
        let Some(photo) = photo else {
            return LayerGeometry::EMPTY;
        };
        if !viewport_scale.is_finite() || viewport_scale <= 0.0 {
            return LayerGeometry::EMPTY;
        }
        let user_scale = UserScale(user_scale.0.clamp(self.bounds.min, self.bounds.max));
        let state = self.transform_state(photo, user_scale);
        let pixel_size = self.reference_canvas_size * viewport_scale;
        let factor = state.user_scale.0 * viewport_scale;
        let width = state.base_layer_width * factor;
        let height = state.base_layer_height * factor;
        LayerGeometry {
            width,
            height,
            x: (pixel_size - width) / 2.0,
            y: (pixel_size - height) / 2.0,
        }
    }
}

/// Free-function form of [`TransformModel::layer_geometry`] using the default configuration.
pub fn compute_layer_geometry(
    photo: Option<ImageSize>,
    user_scale: UserScale,
    viewport_scale: f64,
) -> LayerGeometry {
    TransformModel::new(&EditorConfig::default()).layer_geometry(photo, user_scale, viewport_scale)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/transform.rs"]
mod tests;

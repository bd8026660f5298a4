//! Editor configuration.
//!
//! Every tunable constant of the editor lives here so a session can be reproduced from a single
//! JSON document. Missing keys fall back to the defaults of the reference 512px design.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{FrameError, FrameResult};

/// Top-level editor configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Design-reference canvas edge in pixels; `viewportScale = pixelSize / reference_canvas_size`.
    pub reference_canvas_size: u32,
    /// Viewport widths strictly below this are compact devices.
    pub compact_breakpoint: u32,
    /// Horizontal padding subtracted from the container on compact devices.
    pub compact_padding: u32,
    /// Pixel size used when the compact computation is not positive or no measurement exists.
    pub fallback_pixel_size: u32,
    /// Design-reference photo layer height at `userScaleFactor = 1` and `viewportScale = 1`.
    pub reference_layer_height: f64,
    /// Lower bound of the scale slider.
    pub min_user_scale: f64,
    /// Upper bound of the scale slider.
    pub max_user_scale: f64,
    /// Slider step granularity.
    pub user_scale_step: f64,
    /// Minimum handle bound box edge at `viewportScale = 1`.
    pub min_bound_box: f64,
    /// Supersampling multiplier applied to exports.
    pub export_pixel_ratio: u32,
    /// Suggested download file name.
    pub export_file_name: String,
    /// Largest accepted photo edge; larger uploads are rejected as undecodable.
    pub max_photo_dimension: u32,
    /// Manipulation handle chrome.
    pub handle: HandleStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            reference_canvas_size: 512,
            compact_breakpoint: 769,
            compact_padding: 32,
            fallback_pixel_size: 300,
            reference_layer_height: 335.0,
            min_user_scale: 0.5,
            max_user_scale: 2.0,
            user_scale_step: 0.01,
            min_bound_box: 50.0,
            export_pixel_ratio: 2,
            export_file_name: "framed-image.png".to_string(),
            max_photo_dimension: 16_384,
            handle: HandleStyle::default(),
        }
    }
}

/// Visual parameters of the selection chrome, in on-screen pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandleStyle {
    /// Edge length of the square corner anchors.
    pub anchor_size: f64,
    /// Width of the selection border.
    pub border_width: f64,
    /// Distance of the rotate knob above the top edge.
    pub rotate_anchor_offset: f64,
    /// Border and anchor stroke color, straight RGBA8.
    pub stroke_rgba: [u8; 4],
    /// Anchor fill color, straight RGBA8.
    pub fill_rgba: [u8; 4],
}

impl Default for HandleStyle {
    fn default() -> Self {
        Self {
            anchor_size: 10.0,
            border_width: 1.0,
            rotate_anchor_offset: 50.0,
            stroke_rgba: [0, 161, 255, 255],
            fill_rgba: [255, 255, 255, 255],
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> FrameResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| FrameError::validation(format!("parse editor config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FrameResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FrameError::validation(format!("open editor config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject configurations the editor cannot honor.
    pub fn validate(&self) -> FrameResult<()> {
        if self.reference_canvas_size == 0 {
            return Err(FrameError::validation("reference_canvas_size must be > 0"));
        }
        if self.fallback_pixel_size == 0 {
            return Err(FrameError::validation("fallback_pixel_size must be > 0"));
        }
        if !self.reference_layer_height.is_finite() || self.reference_layer_height <= 0.0 {
            return Err(FrameError::validation(
                "reference_layer_height must be finite and > 0",
            ));
        }
        let scales = [self.min_user_scale, self.max_user_scale, self.user_scale_step];
        if scales.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(FrameError::validation(
                "user scale bounds and step must be finite and > 0",
            ));
        }
        if self.min_user_scale > self.max_user_scale {
            return Err(FrameError::validation(
                "min_user_scale must be <= max_user_scale",
            ));
        }
        if !self.min_bound_box.is_finite() || self.min_bound_box < 0.0 {
            return Err(FrameError::validation("min_bound_box must be finite and >= 0"));
        }
        if self.export_pixel_ratio == 0 {
            return Err(FrameError::validation("export_pixel_ratio must be >= 1"));
        }
        if self.export_file_name.trim().is_empty() {
            return Err(FrameError::validation("export_file_name must be non-empty"));
        }
        if self.max_photo_dimension == 0 {
            return Err(FrameError::validation("max_photo_dimension must be > 0"));
        }
        if self.handle.anchor_size <= 0.0 || self.handle.border_width <= 0.0 {
            return Err(FrameError::validation(
                "handle anchor_size and border_width must be > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

//! Derived state of the upload button, scale slider and export button.

use crate::scene::transform::{ScaleBounds, UserScale};

/// State of the scale slider.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SliderState {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Step granularity.
    pub step: f64,
    /// Current value.
    pub value: f64,
}

/// What the user-facing surface should show.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ControlsState {
    /// Upload button caption.
    pub upload_label: &'static str,
    /// Scale slider; hidden until a photo is loaded.
    pub slider: Option<SliderState>,
    /// Whether the export button is shown.
    pub export_visible: bool,
}

impl ControlsState {
    pub(crate) fn derive(has_photo: bool, bounds: ScaleBounds, scale: UserScale) -> Self {
        let slider = has_photo.then_some(SliderState {
            min: bounds.min,
            max: bounds.max,
            step: bounds.step,
            value: scale.get(),
        });
        Self {
            upload_label: if has_photo {
                "Change Image"
            } else {
                "Upload Image"
            },
            slider,
            export_visible: has_photo,
        }
    }
}

//! Photoframe composes a user photo behind a decorative frame inside a circular canvas.
//!
//! The public API is session-oriented:
//!
//! - Mount a [`SceneCompositor`] against a [`ContainerMeasurement`]
//! - Load a photo and a frame, then scale, drag, resize or rotate the photo
//! - Export the composite as PNG into an [`ExportSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod assets;
pub mod config;
pub(crate) mod effects;
pub mod encode;
pub mod layout;
pub mod render;
pub mod scene;

pub use crate::foundation::core::{Affine, ImageSize, Point, Rect, Vec2};
pub use crate::foundation::error::{FrameError, FrameResult};

pub use crate::assets::decode::SelectedFile;
pub use crate::assets::loader::{LoadCompletion, LoadRequest, LoadRequestId, PhotoLoader};
pub use crate::assets::store::{FrameAsset, PhotoAsset};
pub use crate::config::{EditorConfig, HandleStyle};
pub use crate::encode::png::encode_png;
pub use crate::encode::sink::{DirectorySink, ExportSink, InMemorySink};
pub use crate::layout::viewport::{ContainerMeasurement, ViewportSizer, ViewportState};
pub use crate::render::backend::{FrameRGBA, Rasterizer};
pub use crate::render::cpu::CpuRasterizer;
pub use crate::scene::compositor::{ExportReport, HitTarget, SceneCompositor};
pub use crate::scene::controls::{ControlsState, SliderState};
pub use crate::scene::handle::{Anchor, BoundBox, HandleState, LayerId, ResizeOutcome};
pub use crate::scene::transform::{LayerGeometry, UserScale, compute_layer_geometry};

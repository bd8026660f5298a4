//! Scene Compositor.
//!
//! [`SceneCompositor`] is the single owner of an editing session: viewport, slider value, photo
//! layer, frame overlay, manipulation handle and the rasterizer. Every mutation goes through its
//! methods so the invariants of each part are enforced at one boundary.
//!
//! Export is a transaction on the handle: detach and redraw, capture at the export pixel ratio,
//! hand the PNG to the sink, then re-attach to the same layer and redraw. The re-attach runs on
//! every path, including failed captures.

use crate::assets::decode::SelectedFile;
use crate::assets::loader::{LoadCompletion, LoadRequest, LoadVerdict, PhotoLoader};
use crate::assets::store::FrameAsset;
use crate::config::EditorConfig;
use crate::encode::png::encode_png;
use crate::encode::sink::ExportSink;
use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{FrameError, FrameResult};
use crate::foundation::math::approx_eq;
use crate::layout::viewport::{ContainerMeasurement, ViewportSizer, ViewportState};
use crate::render::backend::{FrameRGBA, Rasterizer};
use crate::render::cpu::CpuRasterizer;
use crate::scene::controls::ControlsState;
use crate::scene::graph::{
    ClipCircle, ClippedNode, FrameNode, HandleChrome, PhotoNode, SceneGraph,
};
use crate::scene::handle::{
    Anchor, BoundBox, HandleState, LayerId, ManipulationHandle, PhotoLayer, ResizeOutcome, Rest,
};
use crate::scene::transform::{LayerGeometry, TransformModel, UserScale};

/// What a pointer position resolves to. The frame overlay never appears here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum HitTarget {
    /// The rotate knob above the box.
    RotateKnob,
    /// One of the enabled resize anchors.
    Anchor(Anchor),
    /// The photo body.
    Photo,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
    Idle,
    Dragging { last: Point },
    Resizing { anchor: Anchor, last: Point },
    Rotating { center: Point, start_angle_deg: f64, start_rotation_deg: f64 },
}

/// Summary of a completed export.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ExportReport {
    /// File name passed to the sink.
    pub file_name: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Encoded PNG size in bytes.
    pub bytes: usize,
}

/// Owner of one editing session.
pub struct SceneCompositor<R: Rasterizer = CpuRasterizer> {
    cfg: EditorConfig,
    sizer: ViewportSizer,
    viewport: ViewportState,
    model: TransformModel,
    user_scale: UserScale,
    loader: PhotoLoader,
    photo: Option<PhotoLayer>,
    next_layer: u64,
    frame: Option<FrameNode>,
    frame_generation: u64,
    handle: ManipulationHandle,
    gesture: Gesture,
    rasterizer: R,
    redraws: u64,
}

impl SceneCompositor<CpuRasterizer> {
    /// Mount a session with the CPU rasterizer.
    pub fn new(cfg: EditorConfig, measurement: ContainerMeasurement) -> FrameResult<Self> {
        Self::with_rasterizer(cfg, measurement, CpuRasterizer::new())
    }
}

impl<R: Rasterizer> SceneCompositor<R> {
    /// Mount a session with a custom rasterizer.
    pub fn with_rasterizer(
        cfg: EditorConfig,
        measurement: ContainerMeasurement,
        rasterizer: R,
    ) -> FrameResult<Self> {
        cfg.validate()?;
        let sizer = ViewportSizer::new(&cfg);
        let viewport = sizer.mount(measurement);
        let model = TransformModel::new(&cfg);
        let vs = viewport.viewport_scale(cfg.reference_canvas_size);
        let handle = ManipulationHandle::new(cfg.min_bound_box * vs);
        let loader = PhotoLoader::new(cfg.max_photo_dimension);
        tracing::debug!(pixel_size = viewport.pixel_size(), "session mounted");
        Ok(Self {
            cfg,
            sizer,
            viewport,
            model,
            user_scale: UserScale::ONE,
            loader,
            photo: None,
            next_layer: 1,
            frame: None,
            frame_generation: 0,
            handle,
            gesture: Gesture::Idle,
            rasterizer,
            redraws: 0,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.cfg
    }

    /// Current viewport.
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    /// `pixelSize / referenceCanvasSize`.
    pub fn viewport_scale(&self) -> f64 {
        self.viewport
            .viewport_scale(self.cfg.reference_canvas_size)
    }

    /// Handle a resize event. Returns `true` when the canvas size changed.
    pub fn resize(&mut self, measurement: ContainerMeasurement) -> bool {
        let changed = self.sizer.on_resize(&mut self.viewport, measurement);
        if changed {
            self.handle
                .set_min_box_size(self.cfg.min_bound_box * self.viewport_scale());
            self.batch_draw();
        }
        changed
    }

    /// Current slider value.
    pub fn user_scale(&self) -> UserScale {
        self.user_scale
    }

    /// Set the slider value. Out-of-range values are clamped; non-finite values are rejected.
    pub fn set_user_scale(&mut self, value: f64) -> FrameResult<UserScale> {
        let bounds = self.model.bounds();
        let scale = bounds.clamp_scale(value)?;
        if !approx_eq(scale.get(), value, bounds.step / 2.0) {
            tracing::warn!(requested = value, applied = scale.get(), "user scale clamped");
        }
        if scale != self.user_scale {
            self.user_scale = scale;
            self.batch_draw();
        }
        Ok(scale)
    }

    /// Start a photo upload. See [`PhotoLoader::begin`].
    pub fn begin_photo_load(&mut self, file: Option<SelectedFile>) -> FrameResult<LoadRequest> {
        self.loader.begin(file)
    }

    /// Apply a finished decode.
    ///
    /// Returns `Ok(true)` when the photo was replaced, `Ok(false)` for a stale completion, and
    /// the decode error otherwise. Failures and stale completions leave the session untouched.
    ///
    /// Staleness is decided against the newest *settled* request, failed or not: once a newer
    /// upload has failed, an older upload finishing later is discarded as well.
    #[tracing::instrument(skip(self, completion), fields(id = completion.id.0))]
    pub fn complete_photo_load(&mut self, completion: LoadCompletion) -> FrameResult<bool> {
        match self.loader.settle(completion) {
            LoadVerdict::Apply(asset) => {
                let id = LayerId(self.next_layer);
                self.next_layer += 1;
                let natural = asset.natural_size();
                self.photo = Some(PhotoLayer::new(id, asset));
                self.gesture = Gesture::Idle;
                self.handle.attach(id);
                self.batch_draw();
                tracing::info!(
                    layer = id.0,
                    width = natural.width,
                    height = natural.height,
                    "photo loaded"
                );
                Ok(true)
            }
            LoadVerdict::Stale => Ok(false),
            LoadVerdict::Failed(err) => {
                tracing::warn!(%err, "photo load failed; keeping previous state");
                Err(err)
            }
        }
    }

    /// Upload and decode synchronously.
    pub fn load_photo(&mut self, file: SelectedFile) -> FrameResult<bool> {
        let request = self.begin_photo_load(Some(file))?;
        self.complete_photo_load(request.run())
    }

    /// Remove the photo: detach the handle, drop the layer, redraw.
    pub fn remove_photo(&mut self) {
        self.handle.detach();
        self.photo = None;
        self.gesture = Gesture::Idle;
        self.batch_draw();
    }

    /// Install the decorative frame.
    pub fn set_frame(&mut self, asset: FrameAsset) {
        self.frame_generation += 1;
        self.frame = Some(FrameNode {
            generation: self.frame_generation,
            asset,
        });
        self.batch_draw();
    }

    /// Decode and install the decorative frame. A failed decode keeps the previous frame.
    pub fn load_frame(&mut self, bytes: &[u8]) -> FrameResult<()> {
        let asset = FrameAsset::decode(bytes, self.cfg.max_photo_dimension)?;
        self.set_frame(asset);
        Ok(())
    }

    /// Whether a photo layer exists.
    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    /// Current photo layer.
    pub fn photo_layer(&self) -> Option<&PhotoLayer> {
        self.photo.as_ref()
    }

    /// Handle state.
    pub fn handle_state(&self) -> HandleState {
        self.handle.state()
    }

    /// The manipulation handle.
    pub fn handle(&self) -> &ManipulationHandle {
        &self.handle
    }

    /// Centered resting geometry of the current photo.
    pub fn layer_geometry(&self) -> LayerGeometry {
        let natural = self.photo.as_ref().map(|p| p.asset().natural_size());
        self.model
            .layer_geometry(natural, self.user_scale, self.viewport_scale())
    }

    fn rest(&self) -> Rest {
        Rest::new(self.layer_geometry(), self.viewport_scale())
    }

    /// Final on-canvas box of the photo, including manipulation.
    pub fn photo_bound_box(&self) -> Option<BoundBox> {
        let rest = self.rest();
        self.photo.as_ref().map(|p| p.bound_box(rest))
    }

    /// Move the photo by `delta` on-screen pixels.
    pub fn drag_photo(&mut self, delta: Vec2) -> FrameResult<BoundBox> {
        let rest = self.rest();
        let layer = self
            .photo
            .as_mut()
            .ok_or_else(|| FrameError::input_rejected("no photo to drag"))?;
        layer.drag_by(rest, delta);
        let b = layer.bound_box(rest);
        self.batch_draw();
        Ok(b)
    }

    /// Drag a resize anchor by `delta` on-screen pixels.
    pub fn resize_photo(&mut self, anchor: Anchor, delta: Vec2) -> FrameResult<ResizeOutcome> {
        let rest = self.rest();
        let layer = self
            .photo
            .as_mut()
            .ok_or_else(|| FrameError::input_rejected("no photo to resize"))?;
        let outcome = self.handle.resize_from_anchor(layer, rest, anchor, delta)?;
        if matches!(outcome, ResizeOutcome::Accepted(_)) {
            self.batch_draw();
        }
        Ok(outcome)
    }

    /// Propose an on-screen bound box for the photo; boxes under the floor are rejected.
    pub fn propose_bound_box(&mut self, proposed: BoundBox) -> FrameResult<ResizeOutcome> {
        let rest = self.rest();
        let layer = self
            .photo
            .as_mut()
            .ok_or_else(|| FrameError::input_rejected("no photo to resize"))?;
        let outcome = self.handle.propose_bound_box(layer, rest, proposed)?;
        if matches!(outcome, ResizeOutcome::Accepted(_)) {
            self.batch_draw();
        }
        Ok(outcome)
    }

    /// Rotate the photo to `rotation_deg` about its center.
    pub fn rotate_photo(&mut self, rotation_deg: f64) -> FrameResult<BoundBox> {
        let rest = self.rest();
        let layer = self
            .photo
            .as_mut()
            .ok_or_else(|| FrameError::input_rejected("no photo to rotate"))?;
        let b = self.handle.rotate_to(layer, rest, rotation_deg)?;
        self.batch_draw();
        Ok(b)
    }

    /// Resolve a pointer position. Only points inside the clip circle can hit anything.
    pub fn hit_test(&self, p: Point) -> Option<HitTarget> {
        let clip = ClipCircle::for_canvas(self.viewport.pixel_size());
        if !clip.contains(p) {
            return None;
        }
        let b = self.photo_bound_box()?;
        let local = b.canvas_to_local(p);
        let style = &self.cfg.handle;
        let reach = style.anchor_size / 2.0;

        if self.handle.is_attached() {
            if self.handle.rotate_enabled() {
                let knob = Point::new(b.width / 2.0, -style.rotate_anchor_offset);
                if (local - knob).hypot() <= reach {
                    return Some(HitTarget::RotateKnob);
                }
            }
            for &anchor in self.handle.enabled_anchors() {
                let a = anchor.local_position(b.width, b.height);
                if (local.x - a.x).abs() <= reach && (local.y - a.y).abs() <= reach {
                    return Some(HitTarget::Anchor(anchor));
                }
            }
        }

        b.contains(p).then_some(HitTarget::Photo)
    }

    /// Pointer pressed. Starts a drag, resize or rotate gesture when something was hit.
    pub fn pointer_down(&mut self, p: Point) -> Option<HitTarget> {
        let hit = self.hit_test(p);
        self.gesture = match hit {
            Some(HitTarget::Photo) => Gesture::Dragging { last: p },
            Some(HitTarget::Anchor(anchor)) => Gesture::Resizing { anchor, last: p },
            Some(HitTarget::RotateKnob) => match self.photo_bound_box() {
                Some(b) => {
                    let center = b.center();
                    Gesture::Rotating {
                        center,
                        start_angle_deg: pointer_angle_deg(center, p),
                        start_rotation_deg: b.rotation_deg,
                    }
                }
                None => Gesture::Idle,
            },
            None => Gesture::Idle,
        };
        hit
    }

    /// Pointer moved. Applies the active gesture.
    pub fn pointer_move(&mut self, p: Point) -> FrameResult<()> {
        match self.gesture {
            Gesture::Idle => Ok(()),
            Gesture::Dragging { last } => {
                self.drag_photo(p - last)?;
                self.gesture = Gesture::Dragging { last: p };
                Ok(())
            }
            Gesture::Resizing { anchor, last } => {
                // A rejected step keeps `last` so the pointer has to come back past the floor.
                if let ResizeOutcome::Accepted(_) = self.resize_photo(anchor, p - last)? {
                    self.gesture = Gesture::Resizing { anchor, last: p };
                }
                Ok(())
            }
            Gesture::Rotating {
                center,
                start_angle_deg,
                start_rotation_deg,
            } => {
                let angle = pointer_angle_deg(center, p);
                self.rotate_photo(start_rotation_deg + (angle - start_angle_deg))?;
                Ok(())
            }
        }
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Snapshot of the scene as currently displayed.
    pub fn scene_graph(&self) -> SceneGraph {
        let pixel_size = self.viewport.pixel_size();
        let mut clipped = Vec::new();
        if let Some(layer) = &self.photo {
            let bound_box = layer.bound_box(self.rest());
            clipped.push(ClippedNode::Photo(PhotoNode {
                layer: layer.id(),
                asset: layer.asset().clone(),
                bound_box,
            }));
            if self.handle.attached_layer() == Some(layer.id()) {
                clipped.push(ClippedNode::Handle(HandleChrome {
                    bound_box,
                    anchors: self.handle.enabled_anchors().to_vec(),
                    rotate_enabled: self.handle.rotate_enabled(),
                    style: self.cfg.handle.clone(),
                }));
            }
        }
        SceneGraph {
            pixel_size,
            clip: ClipCircle::for_canvas(pixel_size),
            clipped,
            frame: self.frame.clone(),
        }
    }

    /// Render what the user sees at 1x, handle chrome included.
    pub fn render_preview(&mut self) -> FrameResult<FrameRGBA> {
        let scene = self.scene_graph();
        self.rasterizer.rasterize(&scene, 1)
    }

    /// Number of forced redraws so far.
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    fn batch_draw(&mut self) {
        self.redraws += 1;
    }

    /// Export the composite as PNG into `sink`.
    ///
    /// The handle is detached for the capture and re-attached to the same layer afterwards,
    /// whether or not the capture succeeded.
    #[tracing::instrument(skip(self, sink))]
    pub fn export(&mut self, sink: &mut dyn ExportSink) -> FrameResult<ExportReport> {
        let attached = self.handle.detach();
        self.batch_draw();

        let result = self.capture(sink);

        if let Some(id) = attached
            && self.photo.as_ref().is_some_and(|p| p.id() == id)
        {
            self.handle.attach(id);
        }
        self.batch_draw();

        if let Err(err) = &result {
            tracing::warn!(%err, "export aborted");
        }
        result
    }

    fn capture(&mut self, sink: &mut dyn ExportSink) -> FrameResult<ExportReport> {
        let scene = self.scene_graph();
        let frame = self
            .rasterizer
            .rasterize(&scene, self.cfg.export_pixel_ratio)
            .map_err(into_export_error)?;
        let png = encode_png(&frame)?;
        sink.save(&self.cfg.export_file_name, &png)
            .map_err(into_export_error)?;
        Ok(ExportReport {
            file_name: self.cfg.export_file_name.clone(),
            width: frame.width,
            height: frame.height,
            bytes: png.len(),
        })
    }

    /// State of the upload button, slider and export button.
    pub fn controls(&self) -> ControlsState {
        ControlsState::derive(self.has_photo(), self.model.bounds(), self.user_scale)
    }
}

fn into_export_error(err: FrameError) -> FrameError {
    match err {
        FrameError::ExportUnavailable(_) => err,
        other => FrameError::export_unavailable(other.to_string()),
    }
}

fn pointer_angle_deg(center: Point, p: Point) -> f64 {
    let v = p - center;
    v.y.atan2(v.x).to_degrees()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/compositor.rs"]
mod tests;

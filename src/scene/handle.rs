//! Interactive manipulation handle bound to the photo layer.
//!
//! The handle is a two-state machine: [`HandleState::Detached`] or attached to exactly one
//! [`LayerId`]. Drag, corner-resize and rotate deltas are stored on the [`PhotoLayer`] node the
//! handle targets, so detaching and re-attaching to the same layer loses nothing.

use crate::assets::store::PhotoAsset;
use crate::foundation::core::{Affine, Point, Vec2};
use crate::foundation::error::{FrameError, FrameResult};
use crate::scene::transform::LayerGeometry;

/// Identity of one photo layer instance. A new upload creates a new layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct LayerId(pub u64);

/// Oriented box of the photo layer in on-screen pixels.
///
/// `(x, y)` is the layer origin (its unrotated top-left); rotation is applied about it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BoundBox {
    /// Origin x.
    pub x: f64,
    /// Origin y.
    pub y: f64,
    /// Width along the layer's local x axis.
    pub width: f64,
    /// Height along the layer's local y axis.
    pub height: f64,
    /// Clockwise rotation in degrees.
    pub rotation_deg: f64,
}

impl BoundBox {
    /// Unrotated box from resting geometry.
    pub fn from_geometry(g: LayerGeometry) -> Self {
        Self {
            x: g.x,
            y: g.y,
            width: g.width,
            height: g.height,
            rotation_deg: 0.0,
        }
    }

    /// Local-to-canvas transform (translate, then rotate).
    pub fn local_to_canvas(&self) -> Affine {
        Affine::translate((self.x, self.y)) * Affine::rotate(self.rotation_deg.to_radians())
    }

    /// Map a canvas point into the box's local frame.
    pub fn canvas_to_local(&self, p: Point) -> Point {
        self.local_to_canvas().inverse() * p
    }

    /// Box center on the canvas.
    pub fn center(&self) -> Point {
        self.local_to_canvas() * Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether `p` lies inside the oriented box.
    pub fn contains(&self, p: Point) -> bool {
        let l = self.canvas_to_local(p);
        l.x >= 0.0 && l.y >= 0.0 && l.x <= self.width && l.y <= self.height
    }

    /// Same box rotated to `rotation_deg` about its center.
    pub fn rotated_about_center(&self, rotation_deg: f64) -> Self {
        let center = self.center();
        let half = Vec2::new(self.width / 2.0, self.height / 2.0);
        let offset = Affine::rotate(rotation_deg.to_radians()) * half.to_point();
        Self {
            x: center.x - offset.x,
            y: center.y - offset.y,
            rotation_deg,
            ..*self
        }
    }
}

/// Resize anchors of the handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Top-left corner.
    TopLeft,
    /// Middle of the top edge.
    TopCenter,
    /// Top-right corner.
    TopRight,
    /// Middle of the right edge.
    MiddleRight,
    /// Bottom-right corner.
    BottomRight,
    /// Middle of the bottom edge.
    BottomCenter,
    /// Bottom-left corner.
    BottomLeft,
    /// Middle of the left edge.
    MiddleLeft,
}

impl Anchor {
    /// The four corner anchors, the only ones the editor enables.
    pub const CORNERS: [Anchor; 4] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomRight,
        Anchor::BottomLeft,
    ];

    /// Direction of growth along local x/y: -1, 0 or 1.
    fn signs(self) -> (f64, f64) {
        match self {
            Anchor::TopLeft => (-1.0, -1.0),
            Anchor::TopCenter => (0.0, -1.0),
            Anchor::TopRight => (1.0, -1.0),
            Anchor::MiddleRight => (1.0, 0.0),
            Anchor::BottomRight => (1.0, 1.0),
            Anchor::BottomCenter => (0.0, 1.0),
            Anchor::BottomLeft => (-1.0, 1.0),
            Anchor::MiddleLeft => (-1.0, 0.0),
        }
    }

    /// Anchor position in the local frame of a `width` x `height` box.
    pub fn local_position(self, width: f64, height: f64) -> Point {
        let (sx, sy) = self.signs();
        Point::new((1.0 + sx) / 2.0 * width, (1.0 + sy) / 2.0 * height)
    }
}

/// Resting layer geometry together with the viewport scale it was computed for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rest {
    /// Centered on-screen geometry from the transform model.
    pub geometry: LayerGeometry,
    /// `pixelSize / referenceCanvasSize` of the current viewport.
    pub viewport_scale: f64,
}

impl Rest {
    /// Rest at `viewport_scale`.
    pub fn new(geometry: LayerGeometry, viewport_scale: f64) -> Self {
        Self {
            geometry,
            viewport_scale,
        }
    }
}

/// Deltas applied on top of the resting geometry.
///
/// The origin is stored in reference-canvas units so a moved photo keeps its place across
/// viewport resizes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Manipulation {
    /// Origin (reference units) once the layer was moved; `None` keeps it centered.
    pub position: Option<Point>,
    /// Clockwise rotation in degrees.
    pub rotation_deg: f64,
    /// Per-axis multiplier of the resting width/height.
    pub resize: Vec2,
}

impl Default for Manipulation {
    fn default() -> Self {
        Self {
            position: None,
            rotation_deg: 0.0,
            resize: Vec2::new(1.0, 1.0),
        }
    }
}

impl Manipulation {
    /// Compose with the resting geometry.
    pub fn compose(&self, rest: Rest) -> BoundBox {
        let base = rest.geometry;
        let vs = rest.viewport_scale;
        let origin = self
            .position
            .map(|p| Point::new(p.x * vs, p.y * vs))
            .unwrap_or(Point::new(base.x, base.y));
        BoundBox {
            x: origin.x,
            y: origin.y,
            width: base.width * self.resize.x,
            height: base.height * self.resize.y,
            rotation_deg: self.rotation_deg,
        }
    }

    /// Store `b` (on-screen) as the new manipulated box relative to `rest`.
    fn set_box(&mut self, rest: Rest, b: BoundBox) {
        let base = rest.geometry;
        let vs = rest.viewport_scale;
        if vs > 0.0 {
            self.position = Some(Point::new(b.x / vs, b.y / vs));
        }
        self.rotation_deg = b.rotation_deg;
        if base.width > 0.0 && base.height > 0.0 {
            self.resize = Vec2::new(b.width / base.width, b.height / base.height);
        }
    }
}

/// The photo layer node: one decoded asset plus its manipulation deltas.
#[derive(Clone, Debug)]
pub struct PhotoLayer {
    id: LayerId,
    asset: PhotoAsset,
    manipulation: Manipulation,
}

impl PhotoLayer {
    /// New layer at rest.
    pub fn new(id: LayerId, asset: PhotoAsset) -> Self {
        Self {
            id,
            asset,
            manipulation: Manipulation::default(),
        }
    }

    /// Layer identity.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Photo drawn by this layer.
    pub fn asset(&self) -> &PhotoAsset {
        &self.asset
    }

    /// Current deltas.
    pub fn manipulation(&self) -> Manipulation {
        self.manipulation
    }

    /// Final on-canvas box for the given resting geometry.
    pub fn bound_box(&self, rest: Rest) -> BoundBox {
        self.manipulation.compose(rest)
    }

    /// Move the layer. The photo itself is draggable with or without the handle.
    pub fn drag_by(&mut self, rest: Rest, delta: Vec2) {
        let mut b = self.bound_box(rest);
        b.x += delta.x;
        b.y += delta.y;
        self.manipulation.set_box(rest, b);
    }
}

/// Attachment state of the handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum HandleState {
    /// No node bound; nothing is drawn.
    Detached,
    /// Bound to the given photo layer.
    Attached(LayerId),
}

/// Result of a resize proposal.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum ResizeOutcome {
    /// The proposal was applied.
    Accepted(BoundBox),
    /// The proposal fell under the size floor; the prior box is retained unchanged.
    Rejected(BoundBox),
}

impl ResizeOutcome {
    /// Box in effect after the proposal.
    pub fn bound_box(&self) -> BoundBox {
        match *self {
            ResizeOutcome::Accepted(b) | ResizeOutcome::Rejected(b) => b,
        }
    }
}

/// Transformer-style handle: corner anchors, rotation, and a minimum box size.
#[derive(Clone, Debug)]
pub struct ManipulationHandle {
    state: HandleState,
    enabled_anchors: Vec<Anchor>,
    rotate_enabled: bool,
    min_box_size: f64,
}

impl ManipulationHandle {
    /// Detached handle with corner anchors, rotation, and a `min_box_size` floor.
    pub fn new(min_box_size: f64) -> Self {
        Self {
            state: HandleState::Detached,
            enabled_anchors: Anchor::CORNERS.to_vec(),
            rotate_enabled: true,
            min_box_size,
        }
    }

    /// Current state.
    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Layer the handle is bound to, if any.
    pub fn attached_layer(&self) -> Option<LayerId> {
        match self.state {
            HandleState::Attached(id) => Some(id),
            HandleState::Detached => None,
        }
    }

    /// Whether the handle is attached.
    pub fn is_attached(&self) -> bool {
        self.attached_layer().is_some()
    }

    /// Bind to a layer.
    pub fn attach(&mut self, layer: LayerId) {
        self.state = HandleState::Attached(layer);
    }

    /// Clear the node list. Returns the layer that was attached.
    pub fn detach(&mut self) -> Option<LayerId> {
        let prev = self.attached_layer();
        self.state = HandleState::Detached;
        prev
    }

    /// Anchors that accept resize drags.
    pub fn enabled_anchors(&self) -> &[Anchor] {
        &self.enabled_anchors
    }

    /// Whether the rotate knob is active.
    pub fn rotate_enabled(&self) -> bool {
        self.rotate_enabled
    }

    /// Minimum box edge in device pixels.
    pub fn min_box_size(&self) -> f64 {
        self.min_box_size
    }

    /// Update the floor after a viewport change.
    pub fn set_min_box_size(&mut self, min_box_size: f64) {
        self.min_box_size = min_box_size;
    }

    /// Bound-box filter: proposals below the floor revert to `old` entirely.
    pub fn filter_bound_box(&self, old: BoundBox, new: BoundBox) -> ResizeOutcome {
        let finite = [new.x, new.y, new.width, new.height, new.rotation_deg]
            .iter()
            .all(|v| v.is_finite());
        if !finite || new.width < self.min_box_size || new.height < self.min_box_size {
            tracing::debug!(
                width = new.width,
                height = new.height,
                floor = self.min_box_size,
                "rejecting bound box below floor"
            );
            return ResizeOutcome::Rejected(old);
        }
        ResizeOutcome::Accepted(new)
    }

    fn ensure_target(&self, layer: &PhotoLayer) -> FrameResult<()> {
        match self.state {
            HandleState::Attached(id) if id == layer.id => Ok(()),
            HandleState::Attached(_) => Err(FrameError::validation(
                "handle is attached to a different layer",
            )),
            HandleState::Detached => Err(FrameError::validation("handle is detached")),
        }
    }

    /// Apply an arbitrary proposed box through the size floor.
    pub fn propose_bound_box(
        &self,
        layer: &mut PhotoLayer,
        rest: Rest,
        proposed: BoundBox,
    ) -> FrameResult<ResizeOutcome> {
        self.ensure_target(layer)?;
        let old = layer.bound_box(rest);
        let outcome = self.filter_bound_box(old, proposed);
        if let ResizeOutcome::Accepted(b) = outcome {
            layer.manipulation.set_box(rest, b);
        }
        Ok(outcome)
    }

    /// Drag `anchor` by `delta` canvas pixels.
    ///
    /// Corner drags keep the box's aspect ratio and pin the opposite corner.
    pub fn resize_from_anchor(
        &self,
        layer: &mut PhotoLayer,
        rest: Rest,
        anchor: Anchor,
        delta: Vec2,
    ) -> FrameResult<ResizeOutcome> {
        self.ensure_target(layer)?;
        if !self.enabled_anchors.contains(&anchor) {
            return Err(FrameError::input_rejected(format!(
                "anchor {anchor:?} is disabled"
            )));
        }

        let old = layer.bound_box(rest);
        let proposed = corner_resize(old, anchor, delta);
        self.propose_bound_box(layer, rest, proposed)
    }

    /// Rotate the layer to `rotation_deg` about its center.
    pub fn rotate_to(
        &self,
        layer: &mut PhotoLayer,
        rest: Rest,
        rotation_deg: f64,
    ) -> FrameResult<BoundBox> {
        self.ensure_target(layer)?;
        if !self.rotate_enabled {
            return Err(FrameError::input_rejected("rotation is disabled"));
        }
        if !rotation_deg.is_finite() {
            return Err(FrameError::validation("rotation must be finite"));
        }
        let b = layer.bound_box(rest).rotated_about_center(rotation_deg);
        layer.manipulation.set_box(rest, b);
        Ok(b)
    }
}

fn corner_resize(old: BoundBox, anchor: Anchor, delta: Vec2) -> BoundBox {
    let (sx, sy) = anchor.signs();
    let to_canvas = old.local_to_canvas();
    let local_delta = Affine::rotate(-old.rotation_deg.to_radians()) * delta.to_point();

    let diag = Vec2::new(sx * old.width, sy * old.height);
    let diag_len = diag.hypot();
    let k = if diag_len > 0.0 {
        (diag_len + local_delta.to_vec2().dot(diag) / diag_len) / diag_len
    } else {
        1.0
    };

    let width = old.width * k;
    let height = old.height * k;

    let pinned_local = Point::new((1.0 - sx) / 2.0 * old.width, (1.0 - sy) / 2.0 * old.height);
    let pinned = to_canvas * pinned_local;
    let pinned_new_local = Point::new((1.0 - sx) / 2.0 * width, (1.0 - sy) / 2.0 * height);
    let offset = Affine::rotate(old.rotation_deg.to_radians()) * pinned_new_local;

    BoundBox {
        x: pinned.x - offset.x,
        y: pinned.y - offset.y,
        width,
        height,
        rotation_deg: old.rotation_deg,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/handle.rs"]
mod tests;

//! Immutable scene snapshot handed to rasterizers.

use crate::assets::store::{FrameAsset, PhotoAsset};
use crate::config::HandleStyle;
use crate::foundation::core::Point;
use crate::scene::handle::{Anchor, BoundBox, LayerId};

/// Circular clip region of the photo group.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ClipCircle {
    /// Center in on-screen pixels.
    pub center: Point,
    /// Radius in on-screen pixels.
    pub radius: f64,
}

impl ClipCircle {
    /// Inscribed circle of a `pixel_size` square canvas.
    pub fn for_canvas(pixel_size: u32) -> Self {
        let half = f64::from(pixel_size) / 2.0;
        Self {
            center: Point::new(half, half),
            radius: half,
        }
    }

    /// Whether `p` lies inside (or on) the circle.
    pub fn contains(&self, p: Point) -> bool {
        (p - self.center).hypot() <= self.radius
    }
}

/// The photo as drawn this frame.
#[derive(Clone, Debug)]
pub struct PhotoNode {
    /// Layer identity (also the raster cache key).
    pub layer: LayerId,
    /// Decoded photo.
    pub asset: PhotoAsset,
    /// Final manipulated box.
    pub bound_box: BoundBox,
}

/// Selection chrome drawn around the photo while the handle is attached.
#[derive(Clone, Debug)]
pub struct HandleChrome {
    /// Box the chrome outlines.
    pub bound_box: BoundBox,
    /// Anchors to draw.
    pub anchors: Vec<Anchor>,
    /// Whether to draw the rotate knob.
    pub rotate_enabled: bool,
    /// Colors and sizes.
    pub style: HandleStyle,
}

/// Children of the clipped group, in paint order.
#[derive(Clone, Debug)]
pub enum ClippedNode {
    /// The user photo.
    Photo(PhotoNode),
    /// The manipulation handle decorations.
    Handle(HandleChrome),
}

/// Frame overlay node. Never clipped, never hit-tested.
#[derive(Clone, Debug)]
pub struct FrameNode {
    /// Increments whenever a different frame asset is installed.
    pub generation: u64,
    /// Decoded frame.
    pub asset: FrameAsset,
}

/// Immutable snapshot of everything a rasterizer needs.
///
/// Paint order: the clipped group (photo, then handle), then the frame on top.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    /// Canvas edge in on-screen pixels.
    pub pixel_size: u32,
    /// Clip applied to `clipped`.
    pub clip: ClipCircle,
    /// Clipped group children.
    pub clipped: Vec<ClippedNode>,
    /// Overlay frame, once decoded.
    pub frame: Option<FrameNode>,
}

impl SceneGraph {
    /// The photo node, if a photo is loaded.
    pub fn photo(&self) -> Option<&PhotoNode> {
        self.clipped.iter().find_map(|n| match n {
            ClippedNode::Photo(p) => Some(p),
            ClippedNode::Handle(_) => None,
        })
    }

    /// The handle chrome, if the handle is attached.
    pub fn handle(&self) -> Option<&HandleChrome> {
        self.clipped.iter().find_map(|n| match n {
            ClippedNode::Handle(h) => Some(h),
            ClippedNode::Photo(_) => None,
        })
    }

    /// Layer names in paint order, for diagnostics.
    pub fn paint_order(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = self
            .clipped
            .iter()
            .map(|n| match n {
                ClippedNode::Photo(_) => "photo",
                ClippedNode::Handle(_) => "handle",
            })
            .collect();
        if self.frame.is_some() {
            out.push("frame");
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;

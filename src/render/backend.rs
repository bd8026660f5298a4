use crate::foundation::error::FrameResult;
use crate::scene::graph::SceneGraph;

/// A rendered canvas as RGBA8 pixels.
///
/// Frames are **premultiplied alpha** by default; the flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)` as stored.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Turns a scene snapshot into pixels.
///
/// `pixel_ratio` multiplies every on-screen coordinate; the output is
/// `pixel_size * pixel_ratio` pixels square.
pub trait Rasterizer {
    /// Render `scene` at `pixel_ratio`.
    fn rasterize(&mut self, scene: &SceneGraph, pixel_ratio: u32) -> FrameResult<FrameRGBA>;
}

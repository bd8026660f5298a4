use std::io::Cursor;

use crate::foundation::error::{FrameError, FrameResult};
use crate::foundation::math::unpremul_u8;
use crate::render::backend::FrameRGBA;

/// Encode a frame as PNG with a straight-alpha RGBA8 payload.
///
/// Transparent pixels outside the clip circle stay fully transparent.
pub fn encode_png(frame: &FrameRGBA) -> FrameResult<Vec<u8>> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(FrameError::export_unavailable(format!(
            "frame byte length {} does not match {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let mut straight = frame.data.clone();
    if frame.premultiplied {
        for px in straight.chunks_exact_mut(4) {
            let a = px[3];
            if a == 255 {
                continue;
            }
            px[0] = unpremul_u8(px[0], a);
            px[1] = unpremul_u8(px[1], a);
            px[2] = unpremul_u8(px[2], a);
        }
    }

    let img = image::RgbaImage::from_raw(frame.width, frame.height, straight)
        .ok_or_else(|| FrameError::export_unavailable("frame buffer too small for image"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| FrameError::export_unavailable(format!("encode png: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;

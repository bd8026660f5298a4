use crate::foundation::error::{FrameError, FrameResult};

// Avoid pathological allocations for absurd export sizes.
const MAX_DIM: u32 = 16_384;

/// Rasterize an SVG tree stretched to exactly `width` x `height` pixels.
///
/// The output is premultiplied RGBA8, matching what `vello_cpu` pixmaps expect.
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> FrameResult<Vec<u8>> {
    if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
        return Err(FrameError::export_unavailable(format!(
            "svg raster size out of range: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    let size = tree.size();
    if !size.width().is_finite() || size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(FrameError::export_unavailable("svg has invalid width/height"));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| FrameError::export_unavailable("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;

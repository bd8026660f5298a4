//! CPU rasterizer built on `vello_cpu`.
//!
//! The clipped group is rendered into its own pixmap, multiplied by a circular mask, and the
//! frame overlay is composited on top.

use std::sync::Arc;

use vello_cpu::kurbo as cpu_kurbo;
use vello_cpu::kurbo::Shape as _;

use crate::assets::store::{FrameSource, PreparedImage};
use crate::assets::svg_raster::rasterize_svg_to_premul_rgba8;
use crate::effects::composite::{mask_alpha_in_place, over_in_place};
use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::{FrameError, FrameResult};
use crate::render::backend::{FrameRGBA, Rasterizer};
use crate::scene::graph::{ClipCircle, ClippedNode, FrameNode, HandleChrome, PhotoNode, SceneGraph};
use crate::scene::handle::LayerId;

/// CPU rasterizer. Keeps decoded paints cached across frames.
#[derive(Default)]
pub struct CpuRasterizer {
    photo_cache: Option<(LayerId, vello_cpu::Image)>,
    frame_bitmap_cache: Option<(u64, vello_cpu::Image)>,
    frame_svg_cache: Option<(u64, u16, Arc<Vec<u8>>)>,
}

impl CpuRasterizer {
    /// New rasterizer with empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    fn photo_paint(&mut self, node: &PhotoNode) -> FrameResult<vello_cpu::Image> {
        if let Some((id, paint)) = &self.photo_cache
            && *id == node.layer
        {
            return Ok(paint.clone());
        }
        let paint = image_paint(node.asset.image())?;
        self.photo_cache = Some((node.layer, paint.clone()));
        Ok(paint)
    }

    fn draw_photo(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        root: Affine,
        node: &PhotoNode,
    ) -> FrameResult<()> {
        let b = node.bound_box;
        if b.width <= 0.0 || b.height <= 0.0 {
            return Ok(());
        }
        let paint = self.photo_paint(node)?;
        let natural = node.asset.natural_size();
        let (nw, nh) = (f64::from(natural.width), f64::from(natural.height));
        let transform = root
            * b.local_to_canvas()
            * Affine::scale_non_uniform(b.width / nw, b.height / nh);

        ctx.set_paint_transform(cpu_kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(paint);
        ctx.fill_rect(&cpu_kurbo::Rect::new(0.0, 0.0, nw, nh));
        Ok(())
    }

    fn frame_overlay(
        &mut self,
        frame: &FrameNode,
        size: u16,
        pixel_size: u32,
        root: Affine,
    ) -> FrameResult<Arc<Vec<u8>>> {
        match frame.asset.source() {
            FrameSource::Svg(svg) => {
                if let Some((generation, cached_size, px)) = &self.frame_svg_cache
                    && *generation == frame.generation
                    && *cached_size == size
                {
                    return Ok(px.clone());
                }
                let px = Arc::new(rasterize_svg_to_premul_rgba8(
                    &svg.tree,
                    u32::from(size),
                    u32::from(size),
                )?);
                self.frame_svg_cache = Some((frame.generation, size, px.clone()));
                Ok(px)
            }
            FrameSource::Bitmap(img) => {
                let paint = match &self.frame_bitmap_cache {
                    Some((generation, paint)) if *generation == frame.generation => paint.clone(),
                    _ => {
                        let paint = image_paint(img)?;
                        self.frame_bitmap_cache = Some((frame.generation, paint.clone()));
                        paint
                    }
                };
                let (fw, fh) = (f64::from(img.width), f64::from(img.height));
                let edge = f64::from(pixel_size);
                let mut pixmap = vello_cpu::Pixmap::new(size, size);
                let mut ctx = vello_cpu::RenderContext::new(size, size);
                ctx.set_paint_transform(cpu_kurbo::Affine::IDENTITY);
                ctx.set_transform(affine_to_cpu(
                    root * Affine::scale_non_uniform(edge / fw, edge / fh),
                ));
                ctx.set_paint(paint);
                ctx.fill_rect(&cpu_kurbo::Rect::new(0.0, 0.0, fw, fh));
                ctx.flush();
                ctx.render_to_pixmap(&mut pixmap);
                Ok(Arc::new(pixmap.data_as_u8_slice().to_vec()))
            }
        }
    }
}

impl Rasterizer for CpuRasterizer {
    #[tracing::instrument(skip(self, scene), fields(pixel_size = scene.pixel_size))]
    fn rasterize(&mut self, scene: &SceneGraph, pixel_ratio: u32) -> FrameResult<FrameRGBA> {
        let size = scene
            .pixel_size
            .checked_mul(pixel_ratio)
            .filter(|s| *s > 0)
            .ok_or_else(|| FrameError::export_unavailable("raster size must be non-zero"))?;
        let size_u16: u16 = size
            .try_into()
            .map_err(|_| FrameError::export_unavailable("raster size exceeds u16"))?;
        let root = Affine::scale(f64::from(pixel_ratio));

        let mut group = vello_cpu::Pixmap::new(size_u16, size_u16);
        if !scene.clipped.is_empty() {
            let mut ctx = vello_cpu::RenderContext::new(size_u16, size_u16);
            for node in &scene.clipped {
                match node {
                    ClippedNode::Photo(p) => self.draw_photo(&mut ctx, root, p)?,
                    ClippedNode::Handle(h) => draw_handle(&mut ctx, root, h),
                }
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut group);

            let mask = render_clip_mask(size_u16, root, scene.clip);
            mask_alpha_in_place(group.data_as_u8_slice_mut(), mask.data_as_u8_slice())?;
        }

        let mut data = group.data_as_u8_slice().to_vec();
        if let Some(frame) = &scene.frame {
            let overlay = self.frame_overlay(frame, size_u16, scene.pixel_size, root)?;
            over_in_place(&mut data, overlay.as_slice())?;
        }

        Ok(FrameRGBA {
            width: size,
            height: size,
            data,
            premultiplied: true,
        })
    }
}

fn render_clip_mask(size: u16, root: Affine, clip: ClipCircle) -> vello_cpu::Pixmap {
    let mut mask = vello_cpu::Pixmap::new(size, size);
    let mut ctx = vello_cpu::RenderContext::new(size, size);
    ctx.set_transform(affine_to_cpu(root));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
    let circle = cpu_kurbo::Circle::new((clip.center.x, clip.center.y), clip.radius);
    ctx.fill_path(&circle.to_path(0.1));
    ctx.flush();
    ctx.render_to_pixmap(&mut mask);
    mask
}

fn draw_handle(ctx: &mut vello_cpu::RenderContext, root: Affine, chrome: &HandleChrome) {
    let b = chrome.bound_box;
    let style = &chrome.style;
    let (w, h) = (b.width, b.height);
    let hb = style.border_width / 2.0;
    let [sr, sg, sb, sa] = style.stroke_rgba;
    let [fr, fg, fb, fa] = style.fill_rgba;
    let stroke = vello_cpu::peniko::Color::from_rgba8(sr, sg, sb, sa);
    let fill = vello_cpu::peniko::Color::from_rgba8(fr, fg, fb, fa);

    ctx.set_paint_transform(cpu_kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(root * b.local_to_canvas()));

    ctx.set_paint(stroke);
    for edge in [
        Rect::new(-hb, -hb, w + hb, hb),
        Rect::new(-hb, h - hb, w + hb, h + hb),
        Rect::new(-hb, -hb, hb, h + hb),
        Rect::new(w - hb, -hb, w + hb, h + hb),
    ] {
        ctx.fill_rect(&rect_to_cpu(edge));
    }

    let s = style.anchor_size / 2.0;
    let inner = (s - style.border_width).max(0.0);
    for anchor in &chrome.anchors {
        let p = anchor.local_position(w, h);
        ctx.set_paint(stroke);
        ctx.fill_rect(&rect_to_cpu(Rect::new(p.x - s, p.y - s, p.x + s, p.y + s)));
        ctx.set_paint(fill);
        ctx.fill_rect(&rect_to_cpu(Rect::new(
            p.x - inner,
            p.y - inner,
            p.x + inner,
            p.y + inner,
        )));
    }

    if chrome.rotate_enabled {
        let knob = (w / 2.0, -style.rotate_anchor_offset);
        ctx.set_paint(stroke);
        ctx.fill_rect(&rect_to_cpu(Rect::new(w / 2.0 - hb, knob.1, w / 2.0 + hb, 0.0)));
        ctx.fill_path(&cpu_kurbo::Circle::new(knob, s).to_path(0.1));
        ctx.set_paint(fill);
        ctx.fill_path(&cpu_kurbo::Circle::new(knob, inner).to_path(0.1));
    }
}

fn affine_to_cpu(a: Affine) -> cpu_kurbo::Affine {
    cpu_kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> cpu_kurbo::Rect {
    cpu_kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn image_paint(img: &PreparedImage) -> FrameResult<vello_cpu::Image> {
    let pixmap = image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> FrameResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FrameError::export_unavailable("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FrameError::export_unavailable("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(FrameError::export_unavailable(
            "prepared image byte length mismatch",
        ));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

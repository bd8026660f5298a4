//! Decoded photo and frame assets.

use std::sync::Arc;

use crate::assets::decode::{decode_image, looks_like_svg, parse_svg};
use crate::foundation::core::ImageSize;
use crate::foundation::error::{FrameError, FrameResult};

/// Raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub(crate) struct PreparedImage {
    /// Width in pixels.
    pub(crate) width: u32,
    /// Height in pixels.
    pub(crate) height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub(crate) rgba8_premul: Arc<Vec<u8>>,
}

/// SVG document represented as a parsed `usvg` tree.
#[derive(Clone, Debug)]
pub(crate) struct PreparedSvg {
    /// Parsed SVG tree.
    pub(crate) tree: Arc<usvg::Tree>,
}

/// A decoded user photo. Immutable; replaced wholesale on re-upload.
#[derive(Clone, Debug)]
pub struct PhotoAsset {
    image: PreparedImage,
    natural: ImageSize,
}

impl PhotoAsset {
    /// Decode a photo from encoded bytes.
    pub fn decode(bytes: &[u8], max_dimension: u32) -> FrameResult<Self> {
        let image = decode_image(bytes, max_dimension)?;
        Self::from_prepared(image)
    }

    pub(crate) fn from_prepared(image: PreparedImage) -> FrameResult<Self> {
        let natural = ImageSize::new(image.width, image.height)
            .map_err(|e| FrameError::decode_failed(e.to_string()))?;
        Ok(Self { image, natural })
    }

    /// Natural pixel size.
    pub fn natural_size(&self) -> ImageSize {
        self.natural
    }

    /// `naturalWidth / naturalHeight`.
    pub fn aspect_ratio(&self) -> f64 {
        self.natural.aspect_ratio()
    }

    pub(crate) fn image(&self) -> &PreparedImage {
        &self.image
    }
}

#[derive(Clone, Debug)]
pub(crate) enum FrameSource {
    Bitmap(PreparedImage),
    Svg(PreparedSvg),
}

/// The fixed decorative overlay. Always drawn as a square covering the whole canvas.
#[derive(Clone, Debug)]
pub struct FrameAsset {
    source: FrameSource,
}

impl FrameAsset {
    /// Decode a bitmap or SVG frame from encoded bytes.
    pub fn decode(bytes: &[u8], max_dimension: u32) -> FrameResult<Self> {
        if looks_like_svg(bytes) {
            let svg = parse_svg(bytes)?;
            return Ok(Self {
                source: FrameSource::Svg(svg),
            });
        }

        let image = decode_image(bytes, max_dimension)?;
        if image.width != image.height {
            tracing::warn!(
                width = image.width,
                height = image.height,
                "frame is not square; it will be stretched to 1:1"
            );
        }
        Ok(Self {
            source: FrameSource::Bitmap(image),
        })
    }

    /// Whether the frame is vector artwork.
    pub fn is_vector(&self) -> bool {
        matches!(self.source, FrameSource::Svg(_))
    }

    pub(crate) fn source(&self) -> &FrameSource {
        &self.source
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;

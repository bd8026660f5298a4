//! MIME gating and decoding of picked files.

use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::store::{PreparedImage, PreparedSvg};
use crate::foundation::error::{FrameError, FrameResult};

/// A file picked through the upload control.
#[derive(Clone, Debug)]
pub struct SelectedFile {
    /// File name as reported by the picker.
    pub name: String,
    /// Declared MIME type, if the picker reported one.
    pub mime: Option<String>,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Build a selection with an explicit MIME type.
    pub fn new(name: impl Into<String>, mime: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(str::to_owned),
            bytes,
        }
    }

    /// Read a file from disk, inferring the MIME type from its extension.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> FrameResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read image file '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_from_name(&name);
        Ok(Self { name, mime, bytes })
    }
}

/// Best-effort MIME type from a file extension.
pub(crate) fn mime_from_name(name: &str) -> Option<String> {
    let ext = std::path::Path::new(name)
        .extension()?
        .to_string_lossy()
        .to_ascii_lowercase();
    if ext == "svg" {
        return Some("image/svg+xml".to_string());
    }
    image::ImageFormat::from_extension(&ext).map(|f| f.to_mime_type().to_string())
}

/// Reject selections that are not images before any decoding happens.
pub(crate) fn ensure_image_mime(file: &SelectedFile) -> FrameResult<()> {
    match file.mime.as_deref() {
        Some(m) if m.trim().to_ascii_lowercase().starts_with("image/") => Ok(()),
        Some(m) => Err(FrameError::input_rejected(format!(
            "'{}' has non-image type '{m}'",
            file.name
        ))),
        None => {
            if image::guess_format(&file.bytes).is_ok() {
                Ok(())
            } else {
                Err(FrameError::input_rejected(format!(
                    "'{}' has no image type",
                    file.name
                )))
            }
        }
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
///
/// Images with an edge longer than `max_dimension` are refused before pixel decode.
pub(crate) fn decode_image(bytes: &[u8], max_dimension: u32) -> FrameResult<PreparedImage> {
    let mut limits = image::Limits::default();
    limits.max_image_width = Some(max_dimension);
    limits.max_image_height = Some(max_dimension);

    let mut reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| FrameError::decode_failed(format!("sniff image format: {e}")))?;
    reader.limits(limits);
    let dyn_img = reader
        .decode()
        .map_err(|e| FrameError::decode_failed(format!("decode image: {e}")))?;

    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(FrameError::decode_failed("decoded image is empty"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a prepared `usvg` tree.
pub(crate) fn parse_svg(bytes: &[u8]) -> FrameResult<PreparedSvg> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| FrameError::decode_failed(format!("parse svg tree: {e}")))?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

/// Cheap sniff for SVG documents.
pub(crate) fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let t = text.trim_start();
    t.starts_with("<svg") || (t.starts_with("<?xml") && t.contains("<svg"))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;

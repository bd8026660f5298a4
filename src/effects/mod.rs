//! Pixel-level compositing on premultiplied RGBA8 buffers.

pub(crate) mod composite;

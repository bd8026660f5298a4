//! Photo and frame assets: MIME gating, decoding, and tagged asynchronous loads.

pub(crate) mod decode;
/// Request-id tagged photo loads.
pub mod loader;
/// Decoded asset types.
pub mod store;
pub(crate) mod svg_raster;

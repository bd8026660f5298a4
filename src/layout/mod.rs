//! Responsive sizing of the on-screen canvas.

/// Container measurement to canvas pixel size.
pub mod viewport;

//! Rasterization of a [`crate::scene::graph::SceneGraph`].

/// Rasterizer trait and frame type.
pub mod backend;
/// CPU rasterizer powered by `vello_cpu`.
pub mod cpu;

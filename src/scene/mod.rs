//! The editing scene: transform model, manipulation handle, scene graph and the compositor that
//! owns them.

/// Scene Compositor: the session owner.
pub mod compositor;
/// User-facing control surface state.
pub mod controls;
/// Render snapshot of the layered scene.
pub mod graph;
/// Manipulation handle state machine and photo layer node.
pub mod handle;
/// Pure layer geometry.
pub mod transform;

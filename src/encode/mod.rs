//! Export encoding and sinks.
//!
//! Exports are PNG (sRGB, straight alpha) handed to an [`sink::ExportSink`] together with a
//! suggested file name.

/// PNG encoding of rendered frames.
pub mod png;
/// Export sink trait and built-in sinks.
pub mod sink;

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{FrameError, FrameResult};

/// Destination for exported images.
///
/// Contract: `save` receives a complete PNG and the suggested file name; it has no return value
/// beyond success or failure.
pub trait ExportSink {
    /// Persist or hand off one encoded image.
    fn save(&mut self, file_name: &str, png: &[u8]) -> FrameResult<()>;
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySink {
    exports: Vec<(String, Vec<u8>)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured exports in save order.
    pub fn exports(&self) -> &[(String, Vec<u8>)] {
        &self.exports
    }

    /// Most recent export, if any.
    pub fn last(&self) -> Option<&(String, Vec<u8>)> {
        self.exports.last()
    }
}

impl ExportSink for InMemorySink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> FrameResult<()> {
        self.exports.push((file_name.to_string(), png.to_vec()));
        Ok(())
    }
}

/// Writes exports into a directory under their suggested name.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    overwrite: bool,
}

impl DirectorySink {
    /// Sink writing into `dir`, replacing existing files.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overwrite: true,
        }
    }

    /// Refuse to replace an existing file.
    pub fn no_overwrite(mut self) -> Self {
        self.overwrite = false;
        self
    }

    /// Path a given file name would be written to.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl ExportSink for DirectorySink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> FrameResult<()> {
        if Path::new(file_name).file_name().map(|n| n.len()) != Some(file_name.len()) {
            return Err(FrameError::export_unavailable(format!(
                "export file name '{file_name}' must not contain directories"
            )));
        }
        let path = self.path_for(file_name);
        if !self.overwrite && path.exists() {
            return Err(FrameError::export_unavailable(format!(
                "output file '{}' already exists",
                path.display()
            )));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))
            .map_err(|e| FrameError::export_unavailable(format!("{e:#}")))?;
        std::fs::write(&path, png)
            .with_context(|| format!("write png '{}'", path.display()))
            .map_err(|e| FrameError::export_unavailable(format!("{e:#}")))?;
        tracing::info!(path = %path.display(), bytes = png.len(), "export saved");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;

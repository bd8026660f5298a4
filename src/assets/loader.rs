//! Photo uploads as tagged request/result pairs.
//!
//! Decoding may finish in any order relative to later uploads. Every request carries a
//! monotonically increasing id, and the loader only lets a completion through when no newer
//! request has already settled. A completion is therefore either applied whole or dropped.

use crate::assets::decode::{SelectedFile, ensure_image_mime};
use crate::assets::store::PhotoAsset;
use crate::foundation::error::{FrameError, FrameResult};

/// Identifier of one upload attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct LoadRequestId(pub u64);

/// A pending decode. Owns its input and may be run on any thread.
#[derive(Debug)]
pub struct LoadRequest {
    id: LoadRequestId,
    file: SelectedFile,
    max_dimension: u32,
}

impl LoadRequest {
    /// Tag of this request.
    pub fn id(&self) -> LoadRequestId {
        self.id
    }

    /// Decode the selected file. The result is tagged with this request's id.
    pub fn run(self) -> LoadCompletion {
        let result = PhotoAsset::decode(&self.file.bytes, self.max_dimension);
        if let Err(err) = &result {
            tracing::debug!(id = self.id.0, file = %self.file.name, %err, "photo decode failed");
        }
        LoadCompletion {
            id: self.id,
            result,
        }
    }
}

/// Outcome of a [`LoadRequest`].
#[derive(Debug)]
pub struct LoadCompletion {
    /// Tag of the originating request.
    pub id: LoadRequestId,
    /// Decoded photo, or why decoding failed.
    pub result: FrameResult<PhotoAsset>,
}

/// What the loader decided about a completion.
#[derive(Debug)]
pub enum LoadVerdict {
    /// The completion is the newest settled request; apply it.
    Apply(PhotoAsset),
    /// A newer request already settled; the completion was discarded.
    Stale,
    /// Decoding failed; prior state must stay untouched.
    Failed(FrameError),
}

/// Issues request ids and filters out-of-order completions.
#[derive(Debug)]
pub struct PhotoLoader {
    next_id: u64,
    last_settled: Option<LoadRequestId>,
    max_dimension: u32,
}

impl PhotoLoader {
    /// New loader refusing photos with an edge above `max_dimension`.
    pub fn new(max_dimension: u32) -> Self {
        Self {
            next_id: 1,
            last_settled: None,
            max_dimension,
        }
    }

    /// Start an upload. Absent selections and non-image types are rejected before decoding.
    pub fn begin(&mut self, file: Option<SelectedFile>) -> FrameResult<LoadRequest> {
        let file = file.ok_or_else(|| FrameError::input_rejected("no file selected"))?;
        ensure_image_mime(&file)?;

        let id = LoadRequestId(self.next_id);
        self.next_id += 1;
        tracing::debug!(id = id.0, file = %file.name, "photo load issued");
        Ok(LoadRequest {
            id,
            file,
            max_dimension: self.max_dimension,
        })
    }

    /// Settle a completion.
    ///
    /// A completion older than (or equal to) the last settled request is stale, whether that
    /// request succeeded or failed.
    pub fn settle(&mut self, completion: LoadCompletion) -> LoadVerdict {
        if self.last_settled.is_some_and(|last| completion.id <= last) {
            tracing::debug!(id = completion.id.0, "discarding stale photo load");
            return LoadVerdict::Stale;
        }
        self.last_settled = Some(completion.id);
        match completion.result {
            Ok(photo) => LoadVerdict::Apply(photo),
            Err(err) => LoadVerdict::Failed(err),
        }
    }

    /// Id of the newest settled request.
    pub fn last_settled(&self) -> Option<LoadRequestId> {
        self.last_settled
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;

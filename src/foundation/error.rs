/// Convenience result type used across photoframe.
pub type FrameResult<T> = Result<T, FrameError>;

/// Error taxonomy for the editing session.
///
/// No variant is fatal: every failure path leaves the session usable for another attempt.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    /// The selected input is not an image, or nothing was selected.
    #[error("input rejected: {0}")]
    InputRejected(String),

    /// Image bytes could not be decoded.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// The hosting container has not been laid out yet.
    #[error("measurement unavailable: {0}")]
    MeasurementUnavailable(String),

    /// Rasterization or saving the exported image failed.
    #[error("export unavailable: {0}")]
    ExportUnavailable(String),

    /// Invalid configuration or out-of-band values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FrameError {
    /// Build a [`FrameError::InputRejected`] value.
    pub fn input_rejected(msg: impl Into<String>) -> Self {
        Self::InputRejected(msg.into())
    }

    /// Build a [`FrameError::DecodeFailed`] value.
    pub fn decode_failed(msg: impl Into<String>) -> Self {
        Self::DecodeFailed(msg.into())
    }

    /// Build a [`FrameError::MeasurementUnavailable`] value.
    pub fn measurement_unavailable(msg: impl Into<String>) -> Self {
        Self::MeasurementUnavailable(msg.into())
    }

    /// Build a [`FrameError::ExportUnavailable`] value.
    pub fn export_unavailable(msg: impl Into<String>) -> Self {
        Self::ExportUnavailable(msg.into())
    }

    /// Build a [`FrameError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

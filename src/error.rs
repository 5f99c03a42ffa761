//! Failure taxonomy for a single sweep step.
//!
//! Every variant is recoverable: a step error is logged and the loop
//! continues on the next tick. There is no fatal class — the only designed
//! stop is the sample-count bound.

use std::path::PathBuf;

use thiserror::Error;

/// What went wrong during one prediction step.
#[derive(Debug, Error)]
pub enum StepError {
    /// The prediction endpoint answered with a non-success status.
    /// The index is not advanced; the same sample is retried next tick.
    #[error("prediction request failed with status {status}")]
    RequestFailed { status: u16 },

    /// The endpoint could not be reached at all (connection refused, DNS,
    /// timeout). Handled exactly like a non-success status.
    #[error("prediction endpoint unreachable: {0}")]
    Transport(String),

    /// The response body did not decode as a prediction payload.
    #[error("failed to decode prediction response: {0}")]
    DecodeFailed(String),

    /// No chart surface is attached (stdout is not a terminal). The redraw
    /// is skipped; the step still completes and advances.
    #[error("chart surface is not available")]
    RenderSurfaceMissing,

    /// The gallery directory is gone. The image append is skipped and the
    /// step does not advance, mirroring the container check happening
    /// before the index increment.
    #[error("miss gallery directory missing: {}", .0.display())]
    ContainerMissing(PathBuf),
}

impl StepError {
    /// Short machine-readable label used in the JSONL step log.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RequestFailed { .. } => "request-failed",
            Self::Transport(_) => "unreachable",
            Self::DecodeFailed(_) => "decode-failed",
            Self::RenderSurfaceMissing => "render-surface-missing",
            Self::ContainerMissing(_) => "container-missing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(StepError::RequestFailed { status: 500 }.label(), "request-failed");
        assert_eq!(StepError::Transport("x".into()).label(), "unreachable");
        assert_eq!(StepError::DecodeFailed("x".into()).label(), "decode-failed");
        assert_eq!(StepError::RenderSurfaceMissing.label(), "render-surface-missing");
        assert_eq!(
            StepError::ContainerMissing(PathBuf::from("/tmp/misses")).label(),
            "container-missing"
        );
    }

    #[test]
    fn display_includes_status() {
        let err = StepError::RequestFailed { status: 400 };
        assert_eq!(err.to_string(), "prediction request failed with status 400");
    }
}

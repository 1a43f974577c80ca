//! Error types
//!
//! `MergeError` is the user-facing taxonomy of the merge pipeline: every variant is
//! reported as a notification and leaves the session usable. `ApiError` wraps it
//! together with the configuration and I/O failures of the surrounding tooling.

use thiserror::Error;

/// Failures of the merge pipeline, from precondition checks through delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("Editor not ready. Please wait a moment and try again.")]
    EditorNotReady,

    #[error("Please select a frame to merge videos from.")]
    NoFrameSelected,

    #[error("No path found for the selected frame.")]
    NoPathFound,

    #[error("Frame graph is inconsistent: {0}")]
    GraphInconsistent(String),

    #[error("No videos found in the path from root to selected frame.")]
    NoVideosInPath,

    #[error("At least 2 videos are required for merging.")]
    InsufficientVideos { found: usize },

    #[error("{0}")]
    ServerError(String),

    #[error("No video URL returned from server")]
    ServerResponseMalformed,

    #[error("Merge request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Merge request was cancelled")]
    Cancelled,

    #[error("Download failed: {0}")]
    DownloadFailed(String),
}

impl MergeError {
    /// Stable kind label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MergeError::EditorNotReady => "editor_not_ready",
            MergeError::NoFrameSelected => "no_frame_selected",
            MergeError::NoPathFound => "no_path_found",
            MergeError::GraphInconsistent(_) => "graph_inconsistent",
            MergeError::NoVideosInPath => "no_videos_in_path",
            MergeError::InsufficientVideos { .. } => "insufficient_videos",
            MergeError::ServerError(_) => "server_error",
            MergeError::ServerResponseMalformed => "server_response_malformed",
            MergeError::Timeout { .. } => "timeout",
            MergeError::Cancelled => "cancelled",
            MergeError::DownloadFailed(_) => "download_failed",
        }
    }

    /// Every merge failure is recoverable by a user-initiated retry.
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Whether the failure happened before anything was sent to the merge service.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            MergeError::EditorNotReady
                | MergeError::NoFrameSelected
                | MergeError::NoPathFound
                | MergeError::GraphInconsistent(_)
                | MergeError::NoVideosInPath
                | MergeError::InsufficientVideos { .. }
        )
    }
}

/// Crate-level error for configuration, logging, snapshots and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Snapshot error: {0}")]
    SnapshotError(String),

    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Merge failure already shown to the user through a notifier.
    #[error(transparent)]
    Reported(MergeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ApiError {
    /// Whether the user has already seen this error.
    pub fn is_reported(&self) -> bool {
        matches!(self, ApiError::Reported(_))
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

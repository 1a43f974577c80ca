//! Video Sequence Extractor
//!
//! Turns a resolved path into the ordered list of finished clips and validates
//! it into a [`MergeRequest`].

use crate::error::MergeError;
use crate::path::FramePath;
use serde::Serialize;

/// Minimum number of clips the merge service accepts.
pub const MIN_MERGE_VIDEOS: usize = 2;

/// Collect completed video URLs along `path`, root first.
///
/// The root contributes nothing. Steps whose arrow is missing, not of kind
/// `arrow`, not done, or without a URL are skipped.
pub fn extract_videos(path: &FramePath) -> Vec<String> {
    path.steps()
        .iter()
        .skip(1)
        .filter_map(|step| step.arrow.as_ref())
        .filter_map(|arrow| arrow.completed_video())
        .map(str::to_string)
        .collect()
}

/// Validated body of a merge request: at least two URLs in generation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeRequest {
    video_urls: Vec<String>,
}

impl MergeRequest {
    pub fn from_videos(video_urls: Vec<String>) -> Result<Self, MergeError> {
        match video_urls.len() {
            0 => Err(MergeError::NoVideosInPath),
            n if n < MIN_MERGE_VIDEOS => Err(MergeError::InsufficientVideos { found: n }),
            _ => Ok(Self { video_urls }),
        }
    }

    pub fn video_urls(&self) -> &[String] {
        &self.video_urls
    }

    pub fn len(&self) -> usize {
        self.video_urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.video_urls.is_empty()
    }
}

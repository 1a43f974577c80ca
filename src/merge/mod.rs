//! Video merge
//!
//! Contract with the external merge service and the orchestrator that drives a
//! single merge session against it.

pub mod client;
pub mod orchestrator;

pub use client::{interpret_response, HttpMergeClient, DEFAULT_MERGE_PATH};
pub use orchestrator::{
    MergeOrchestrator, MergeOutcome, MergeReceipt, MergeState, DEFAULT_MERGE_TIMEOUT,
};

use crate::error::MergeError;
use crate::sequence::MergeRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Successful merge: where the concatenated video can be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResponse {
    pub video_url: String,
}

/// External service that concatenates clips in the given order.
///
/// Async because it makes a network request.
#[async_trait]
pub trait MergeService: Send + Sync {
    async fn submit(&self, request: &MergeRequest) -> Result<MergeResponse, MergeError>;
}

//! Merge Orchestrator
//!
//! Drives one merge session through `Idle -> Submitting -> Success | Failed -> Idle`.
//! At most one merge is in flight per session: a trigger that arrives while the
//! session is busy is dropped, not queued. Every outcome ends back in `Idle`.

use super::{HttpMergeClient, MergeService};
use crate::config::StudioConfig;
use crate::delivery::{FileDelivery, ResultDelivery};
use crate::error::{ApiError, MergeError};
use crate::graph::GraphQuery;
use crate::notify::{Notification, Notifier};
use crate::path::resolve_path;
use crate::sequence::{extract_videos, MergeRequest};
use crate::types::ShapeId;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Notify};
use tracing::{debug, error, info, warn};

/// Default bound on a single merge submission (5 minutes).
pub const DEFAULT_MERGE_TIMEOUT: Duration = Duration::from_secs(300);

/// Session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeState {
    Idle,
    Submitting { target: ShapeId, video_count: usize },
    Success { video_url: String },
    Failed { error: MergeError },
}

impl MergeState {
    pub fn is_idle(&self) -> bool {
        matches!(self, MergeState::Idle)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, MergeState::Submitting { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            MergeState::Idle => "idle",
            MergeState::Submitting { .. } => "submitting",
            MergeState::Success { .. } => "success",
            MergeState::Failed { .. } => "failed",
        }
    }
}

/// Result of a merge that reached the service and succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReceipt {
    pub video_url: String,
    pub video_count: usize,
    /// Local delivery, independent of the merge itself.
    pub delivery: Result<PathBuf, MergeError>,
}

/// What a merge trigger amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Session was busy; nothing happened.
    Ignored,
    /// A precondition failed; nothing was sent.
    Rejected(MergeError),
    /// The service call failed, timed out or was cancelled.
    Failed(MergeError),
    Merged(MergeReceipt),
}

impl MergeOutcome {
    pub fn error(&self) -> Option<&MergeError> {
        match self {
            MergeOutcome::Rejected(err) | MergeOutcome::Failed(err) => Some(err),
            MergeOutcome::Ignored | MergeOutcome::Merged(_) => None,
        }
    }
}

/// Resets the session to `Idle` however the merge future ends.
struct SessionGuard<'a> {
    state: &'a watch::Sender<MergeState>,
    in_flight: &'a Mutex<Option<Arc<Notify>>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.lock().take();
        self.state.send_replace(MergeState::Idle);
    }
}

pub struct MergeOrchestrator {
    query: Arc<dyn GraphQuery>,
    service: Arc<dyn MergeService>,
    delivery: Arc<dyn ResultDelivery>,
    notifier: Arc<dyn Notifier>,
    timeout: Option<Duration>,
    state: watch::Sender<MergeState>,
    in_flight: Mutex<Option<Arc<Notify>>>,
}

impl MergeOrchestrator {
    pub fn new(
        query: Arc<dyn GraphQuery>,
        service: Arc<dyn MergeService>,
        delivery: Arc<dyn ResultDelivery>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(MergeState::Idle);
        Self {
            query,
            service,
            delivery,
            notifier,
            timeout: Some(DEFAULT_MERGE_TIMEOUT),
            state,
            in_flight: Mutex::new(None),
        }
    }

    /// Wire the HTTP merge client and file delivery from configuration.
    pub fn from_config(
        query: Arc<dyn GraphQuery>,
        config: &StudioConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let service = HttpMergeClient::from_config(&config.merge_service)?;
        let delivery = FileDelivery::from_config(&config.delivery)?;
        Ok(Self::new(query, Arc::new(service), Arc::new(delivery), notifier)
            .with_timeout(config.merge_service.timeout()))
    }

    /// Bound each submission; `None` waits for the transport.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> MergeState {
        self.state.borrow().clone()
    }

    /// Observe state transitions (e.g. to disable a merge button while busy).
    pub fn subscribe(&self) -> watch::Receiver<MergeState> {
        self.state.subscribe()
    }

    /// Abort the in-flight submission, if any. Returns whether one was cancelled.
    pub fn cancel(&self) -> bool {
        match self.in_flight.lock().as_ref() {
            Some(token) => {
                token.notify_one();
                info!("Merge cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Check the merge preconditions against the current canvas.
    ///
    /// Order: editor ready, aspect frame selected, path found, enough videos.
    pub fn prepare(&self) -> Result<(ShapeId, MergeRequest), MergeError> {
        if !self.query.is_ready() {
            return Err(MergeError::EditorNotReady);
        }

        let target = self
            .query
            .selected_frame()
            .ok_or(MergeError::NoFrameSelected)?;

        let path = resolve_path(self.query.as_ref(), &target.id)?;
        if path.is_empty() {
            return Err(MergeError::NoPathFound);
        }

        let videos = extract_videos(&path);
        debug!(
            target = %target.id,
            path_length = path.len(),
            videos = videos.len(),
            "Extracted video sequence"
        );
        let request = MergeRequest::from_videos(videos)?;
        Ok((target.id, request))
    }

    /// Run one user-initiated merge.
    pub async fn merge(&self) -> MergeOutcome {
        if !self.state.borrow().is_idle() {
            debug!(state = self.state.borrow().label(), "Merge already in progress, ignoring trigger");
            return MergeOutcome::Ignored;
        }

        let (target, request) = match self.prepare() {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "Merge precondition failed");
                self.notifier.notify(Notification::error(err.to_string()));
                return MergeOutcome::Rejected(err);
            }
        };

        let video_count = request.len();
        // Installed under the state lock: whoever observes `Submitting` can cancel.
        let cancel = Arc::new(Notify::new());
        let claimed = self.state.send_if_modified(|state| {
            if state.is_idle() {
                *self.in_flight.lock() = Some(Arc::clone(&cancel));
                *state = MergeState::Submitting {
                    target: target.clone(),
                    video_count,
                };
                true
            } else {
                false
            }
        });
        if !claimed {
            return MergeOutcome::Ignored;
        }

        let _guard = SessionGuard {
            state: &self.state,
            in_flight: &self.in_flight,
        };

        info!(target = %target, videos = video_count, "Submitting merge request");
        let start = Instant::now();
        let result = tokio::select! {
            result = self.submit(&request) => result,
            _ = cancel.notified() => Err(MergeError::Cancelled),
        };
        self.in_flight.lock().take();

        match result {
            Ok(response) => {
                info!(
                    target = %target,
                    video_url = %response.video_url,
                    duration_ms = start.elapsed().as_millis(),
                    "Merge completed"
                );
                self.state.send_replace(MergeState::Success {
                    video_url: response.video_url.clone(),
                });
                self.notifier.notify(Notification::success(format!(
                    "Successfully merged {} videos!",
                    video_count
                )));

                let delivery = self.deliver(&response.video_url).await;
                MergeOutcome::Merged(MergeReceipt {
                    video_url: response.video_url,
                    video_count,
                    delivery,
                })
            }
            Err(err) => {
                error!(
                    target = %target,
                    kind = err.kind(),
                    error = %err,
                    duration_ms = start.elapsed().as_millis(),
                    "Merge failed"
                );
                self.state.send_replace(MergeState::Failed { error: err.clone() });
                self.notifier
                    .notify(Notification::error(format!("Failed to merge videos: {}", err)));
                MergeOutcome::Failed(err)
            }
        }
    }

    async fn submit(&self, request: &MergeRequest) -> Result<super::MergeResponse, MergeError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.service.submit(request))
                .await
                .unwrap_or(Err(MergeError::Timeout {
                    secs: limit.as_secs(),
                })),
            None => self.service.submit(request).await,
        }
    }

    async fn deliver(&self, video_url: &str) -> Result<PathBuf, MergeError> {
        let result = self.delivery.deliver(video_url).await;
        match &result {
            Ok(path) => {
                debug!(path = %path.display(), "Delivered merged video");
                self.notifier
                    .notify(Notification::success("Video downloaded successfully!"));
            }
            Err(err) => {
                error!(video_url, error = %err, "Merged video could not be downloaded");
                self.notifier.notify(Notification::error(format!(
                    "Video merged but download failed. You can access it at {}",
                    video_url
                )));
            }
        }
        result
    }
}

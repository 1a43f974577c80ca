//! Frame Graph
//!
//! Read-only projection of the canvas: frames are nodes, generation arrows are
//! directed edges. The canvas itself belongs to the editor and is reached only
//! through the [`GraphQuery`] capability; nothing here mutates it.

pub mod snapshot;

pub use snapshot::{CanvasSnapshot, LiveCanvas};

use crate::error::MergeError;
use crate::types::{ShapeId, ARROW_KIND, ASPECT_FRAME_KIND};
use serde::{Deserialize, Serialize};

/// Job status of a generation arrow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowStatus {
    #[default]
    Pending,
    Running,
    Done,
    Failed,
}

/// Canvas frame (graph node)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: ShapeId,
    #[serde(default = "default_frame_kind")]
    pub kind: String,
    /// Arrow that produced this frame from its parent; absent for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming_arrow_id: Option<ShapeId>,
}

impl Frame {
    pub fn new(id: impl Into<ShapeId>) -> Self {
        Self {
            id: id.into(),
            kind: default_frame_kind(),
            incoming_arrow_id: None,
        }
    }

    pub fn with_incoming(mut self, arrow_id: impl Into<ShapeId>) -> Self {
        self.incoming_arrow_id = Some(arrow_id.into());
        self
    }

    pub fn is_aspect_frame(&self) -> bool {
        self.kind == ASPECT_FRAME_KIND
    }
}

/// Generation metadata carried by an arrow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowMeta {
    #[serde(default)]
    pub status: ArrowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// Generation arrow (graph edge) from `source` frame to `target` frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    pub id: ShapeId,
    #[serde(default = "default_arrow_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ShapeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ShapeId>,
    #[serde(default)]
    pub meta: ArrowMeta,
}

impl Arrow {
    pub fn new(
        id: impl Into<ShapeId>,
        source: impl Into<ShapeId>,
        target: impl Into<ShapeId>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: default_arrow_kind(),
            source: Some(source.into()),
            target: Some(target.into()),
            meta: ArrowMeta::default(),
        }
    }

    pub fn with_status(mut self, status: ArrowStatus) -> Self {
        self.meta.status = status;
        self
    }

    pub fn with_video(mut self, url: impl Into<String>) -> Self {
        self.meta.video_url = Some(url.into());
        self
    }

    /// The produced clip, if this arrow is a finished generation step.
    pub fn completed_video(&self) -> Option<&str> {
        if self.kind != ARROW_KIND || self.meta.status != ArrowStatus::Done {
            return None;
        }
        self.meta
            .video_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }
}

fn default_frame_kind() -> String {
    ASPECT_FRAME_KIND.to_string()
}

fn default_arrow_kind() -> String {
    ARROW_KIND.to_string()
}

/// A canvas shape as returned by the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Frame(Frame),
    Arrow(Arrow),
}

impl Shape {
    pub fn id(&self) -> &ShapeId {
        match self {
            Shape::Frame(frame) => &frame.id,
            Shape::Arrow(arrow) => &arrow.id,
        }
    }
}

/// Read-only capability supplied by the editor.
///
/// Queries are synchronous and side-effect free against the live canvas.
pub trait GraphQuery: Send + Sync {
    /// Ids of the currently selected shapes, in selection order.
    fn selected_shape_ids(&self) -> Vec<ShapeId>;

    /// Look up a shape by id.
    fn get_shape(&self, id: &ShapeId) -> Option<Shape>;

    /// Whether the editor is mounted and can answer queries.
    fn is_ready(&self) -> bool {
        true
    }

    /// First selected shape that is an aspect frame.
    fn selected_frame(&self) -> Option<Frame> {
        self.selected_shape_ids()
            .iter()
            .filter_map(|id| self.get_shape(id))
            .find_map(|shape| match shape {
                Shape::Frame(frame) if frame.is_aspect_frame() => Some(frame),
                _ => None,
            })
    }
}

/// Parent of a frame: the arrow that produced it and the frame it starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    pub arrow: Arrow,
    pub frame: Frame,
}

/// Frame Graph Model over an injected [`GraphQuery`].
///
/// Every call goes back to the query interface; no structure is cached.
pub struct FrameGraph<'q, Q: GraphQuery + ?Sized> {
    query: &'q Q,
}

impl<'q, Q: GraphQuery + ?Sized> FrameGraph<'q, Q> {
    pub fn new(query: &'q Q) -> Self {
        Self { query }
    }

    pub fn get_frame(&self, id: &ShapeId) -> Option<Frame> {
        match self.query.get_shape(id)? {
            Shape::Frame(frame) => Some(frame),
            Shape::Arrow(_) => None,
        }
    }

    pub fn get_arrow(&self, id: &ShapeId) -> Option<Arrow> {
        match self.query.get_shape(id)? {
            Shape::Arrow(arrow) => Some(arrow),
            Shape::Frame(_) => None,
        }
    }

    /// Resolve the arrow and frame one step towards the root.
    ///
    /// `Ok(None)` means `frame` is a root. A dangling back-reference is an error.
    pub fn parent_link(&self, frame: &Frame) -> Result<Option<ParentLink>, MergeError> {
        let Some(arrow_id) = frame.incoming_arrow_id.as_ref() else {
            return Ok(None);
        };

        let arrow = self.get_arrow(arrow_id).ok_or_else(|| {
            MergeError::GraphInconsistent(format!(
                "frame {} references missing arrow {}",
                frame.id, arrow_id
            ))
        })?;

        let source = arrow.source.as_ref().ok_or_else(|| {
            MergeError::GraphInconsistent(format!("arrow {} has no source frame", arrow.id))
        })?;

        let parent = self.get_frame(source).ok_or_else(|| {
            MergeError::GraphInconsistent(format!(
                "arrow {} starts at missing frame {}",
                arrow.id, source
            ))
        })?;

        Ok(Some(ParentLink {
            arrow,
            frame: parent,
        }))
    }

    /// Parent frame of `frame_id`, or `None` for a root.
    pub fn get_parent_frame(&self, frame_id: &ShapeId) -> Result<Option<Frame>, MergeError> {
        let frame = self.get_frame(frame_id).ok_or_else(|| {
            MergeError::GraphInconsistent(format!("unknown frame {}", frame_id))
        })?;
        Ok(self.parent_link(&frame)?.map(|link| link.frame))
    }
}

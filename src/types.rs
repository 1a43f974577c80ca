//! Core types shared by the frame graph and the merge pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape kind of frames that take part in path resolution.
pub const ASPECT_FRAME_KIND: &str = "aspect-frame";

/// Shape kind of arrows that carry generation metadata.
pub const ARROW_KIND: &str = "arrow";

/// ShapeId: opaque, stable identifier of a canvas shape (frame or arrow)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    pub fn new(id: impl Into<String>) -> Self {
        ShapeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShapeId {
    fn from(value: &str) -> Self {
        ShapeId(value.to_string())
    }
}

impl From<String> for ShapeId {
    fn from(value: String) -> Self {
        ShapeId(value)
    }
}

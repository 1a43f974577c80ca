//! Path Resolver
//!
//! Walks from a target frame back to the graph root and returns the path in
//! generation order (root first). Merge order follows that order, so the
//! traversal result is reversed before it is returned.

use crate::error::MergeError;
use crate::graph::{Arrow, Frame, FrameGraph, GraphQuery};
use crate::types::ShapeId;
use std::collections::HashSet;
use tracing::debug;

/// One element of a path: a frame and the arrow that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub frame: Frame,
    /// `None` only for the root element.
    pub arrow: Option<Arrow>,
}

/// Root-to-target sequence of frames
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FramePath {
    steps: Vec<PathStep>,
}

impl FramePath {
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn root(&self) -> Option<&Frame> {
        self.steps.first().map(|step| &step.frame)
    }

    pub fn target(&self) -> Option<&Frame> {
        self.steps.last().map(|step| &step.frame)
    }

    pub fn frame_ids(&self) -> Vec<ShapeId> {
        self.steps.iter().map(|step| step.frame.id.clone()).collect()
    }
}

impl IntoIterator for FramePath {
    type Item = PathStep;
    type IntoIter = std::vec::IntoIter<PathStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

/// Resolve the path from the graph root to `target`.
///
/// Returns an empty path when `target` is not an aspect frame on the canvas.
/// Fails with `GraphInconsistent` on a dangling back-reference or a cycle.
/// Pure for a fixed snapshot.
pub fn resolve_path<Q: GraphQuery + ?Sized>(
    query: &Q,
    target: &ShapeId,
) -> Result<FramePath, MergeError> {
    let graph = FrameGraph::new(query);

    let Some(target_frame) = graph.get_frame(target).filter(Frame::is_aspect_frame) else {
        debug!(target = %target, "Target is not an aspect frame");
        return Ok(FramePath::default());
    };

    let mut visited = HashSet::new();
    let mut reversed = Vec::new();
    let mut current = target_frame;

    loop {
        if !visited.insert(current.id.clone()) {
            return Err(MergeError::GraphInconsistent(format!(
                "cycle detected at frame {}",
                current.id
            )));
        }

        match graph.parent_link(&current)? {
            Some(link) => {
                reversed.push(PathStep {
                    frame: current,
                    arrow: Some(link.arrow),
                });
                current = link.frame;
            }
            None => {
                reversed.push(PathStep {
                    frame: current,
                    arrow: None,
                });
                break;
            }
        }
    }

    reversed.reverse();
    debug!(target = %target, length = reversed.len(), "Resolved frame path");
    Ok(FramePath { steps: reversed })
}

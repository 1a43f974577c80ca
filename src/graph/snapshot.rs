//! Canvas snapshots
//!
//! Arena of shapes indexed by [`ShapeId`]. Parent lookups go through the arena
//! instead of live references between frames and arrows.

use super::{GraphQuery, Shape};
use crate::error::ApiError;
use crate::types::ShapeId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// On-disk form of a snapshot as exported by the editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    selected: Vec<ShapeId>,
    #[serde(default)]
    shapes: Vec<Shape>,
}

/// Immutable-by-convention copy of the canvas
#[derive(Debug, Clone)]
pub struct CanvasSnapshot {
    shapes: HashMap<ShapeId, Shape>,
    selected: Vec<ShapeId>,
    ready: bool,
}

impl Default for CanvasSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasSnapshot {
    pub fn new() -> Self {
        Self {
            shapes: HashMap::new(),
            selected: Vec::new(),
            ready: true,
        }
    }

    /// Build a snapshot from a list of shapes.
    ///
    /// Frames without an explicit `incomingArrowId` get one from the arrow that
    /// targets them. Duplicate ids, or several arrows targeting one such frame,
    /// are rejected.
    pub fn from_shapes(shapes: Vec<Shape>) -> Result<Self, ApiError> {
        let mut snapshot = Self::new();
        for shape in shapes {
            let id = shape.id().clone();
            if snapshot.shapes.insert(id.clone(), shape).is_some() {
                return Err(ApiError::SnapshotError(format!("duplicate shape id {}", id)));
            }
        }
        snapshot.link_incoming_arrows()?;
        Ok(snapshot)
    }

    /// Parse the editor's JSON export: `{ "selected": [...], "shapes": [...] }`.
    pub fn from_json(json: &str) -> Result<Self, ApiError> {
        let document: SnapshotDocument = serde_json::from_str(json)
            .map_err(|e| ApiError::SnapshotError(format!("Failed to parse snapshot: {}", e)))?;
        let mut snapshot = Self::from_shapes(document.shapes)?;
        snapshot.selected = document.selected;
        Ok(snapshot)
    }

    /// Load a snapshot file.
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::SnapshotError(format!(
                "Failed to read snapshot file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    fn link_incoming_arrows(&mut self) -> Result<(), ApiError> {
        let mut incoming: HashMap<ShapeId, ShapeId> = HashMap::new();
        for shape in self.shapes.values() {
            let Shape::Arrow(arrow) = shape else { continue };
            let Some(target) = arrow.target.as_ref() else { continue };
            let needs_link = matches!(
                self.shapes.get(target),
                Some(Shape::Frame(frame)) if frame.incoming_arrow_id.is_none()
            );
            if !needs_link {
                continue;
            }
            if let Some(previous) = incoming.insert(target.clone(), arrow.id.clone()) {
                return Err(ApiError::SnapshotError(format!(
                    "frame {} is targeted by both {} and {}",
                    target, previous, arrow.id
                )));
            }
        }

        for (frame_id, arrow_id) in incoming {
            if let Some(Shape::Frame(frame)) = self.shapes.get_mut(&frame_id) {
                frame.incoming_arrow_id = Some(arrow_id);
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, shape: Shape) {
        self.shapes.insert(shape.id().clone(), shape);
    }

    pub fn remove(&mut self, id: &ShapeId) -> Option<Shape> {
        self.selected.retain(|selected| selected != id);
        self.shapes.remove(id)
    }

    pub fn select(&mut self, ids: Vec<ShapeId>) {
        self.selected = ids;
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl GraphQuery for CanvasSnapshot {
    fn selected_shape_ids(&self) -> Vec<ShapeId> {
        self.selected.clone()
    }

    fn get_shape(&self, id: &ShapeId) -> Option<Shape> {
        self.shapes.get(id).cloned()
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Canvas whose snapshot the editor may swap between merge attempts
#[derive(Debug, Default)]
pub struct LiveCanvas {
    inner: RwLock<CanvasSnapshot>,
}

impl LiveCanvas {
    pub fn new(snapshot: CanvasSnapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    pub fn replace(&self, snapshot: CanvasSnapshot) {
        *self.inner.write() = snapshot;
    }

    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut CanvasSnapshot),
    {
        f(&mut self.inner.write());
    }

    pub fn snapshot(&self) -> CanvasSnapshot {
        self.inner.read().clone()
    }
}

impl GraphQuery for LiveCanvas {
    fn selected_shape_ids(&self) -> Vec<ShapeId> {
        self.inner.read().selected_shape_ids()
    }

    fn get_shape(&self, id: &ShapeId) -> Option<Shape> {
        self.inner.read().get_shape(id)
    }

    fn is_ready(&self) -> bool {
        self.inner.read().is_ready()
    }
}

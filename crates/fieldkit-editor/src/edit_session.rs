//! Editing session for an existing field polygon.
//!
//! An [`EditSession`] owns a private copy of the field's vertices and its own
//! undo/redo history. Reshaping happens through three kinds of operation:
//!
//! - dragging a vertex marker (`begin_vertex_drag` / `drag_to` / `end_drag`)
//! - dragging an edge midpoint marker, which inserts a new vertex on the
//!   first move (`begin_edge_drag`)
//! - typing a length into an edge label (`set_edge_length`)
//!
//! A whole drag gesture produces a single undo entry holding the vertices as
//! they were when the gesture began.

use fieldkit_core::geometry;
use fieldkit_core::{parse_distance, shared, GeoPoint, GeometryError, ScreenPoint, Shared};

use crate::error::{EngineError, EngineResult};
use crate::history::UndoRedoStack;
use crate::host::Projection;
use crate::metrics::LiveMetrics;
use crate::model::FieldId;
use crate::vertex_store::{Snapshot, VertexStore};

/// Minimum vertex count of an edited field.
pub const MIN_FIELD_VERTICES: usize = 3;

/// What the user is doing with the selected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    /// Selected, no gesture.
    Selected,
    /// Dragging the vertex at this index.
    EditingVertex(usize),
    /// Dragging the midpoint of the edge starting at this index.
    EditingEdge(usize),
}

/// Marker found under the pointer by [`EditSession::hit_test`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerHit {
    Vertex(usize),
    /// Midpoint of the edge starting at this vertex index.
    Midpoint(usize),
}

/// Outcome of an edge length edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthEdit {
    /// The vertex at `moved` was relocated and an undo entry recorded.
    Applied { moved: usize },
    /// The edge had zero length; nothing changed.
    Unchanged,
}

#[derive(Debug)]
enum Gesture {
    Vertex { index: usize, before: Snapshot },
    Edge { edge: usize, before: Snapshot, inserted: bool },
}

impl Gesture {
    fn into_before(self) -> Snapshot {
        match self {
            Gesture::Vertex { before, .. } | Gesture::Edge { before, .. } => before,
        }
    }
}

/// Reshaping session bound to one field.
#[derive(Debug)]
pub struct EditSession {
    field_id: FieldId,
    original: Snapshot,
    store: VertexStore,
    history: UndoRedoStack<Snapshot>,
    gesture: Option<Gesture>,
    metrics: Shared<LiveMetrics>,
}

impl EditSession {
    /// Opens a session over a copy of `vertices`.
    pub fn new(field_id: FieldId, vertices: Vec<GeoPoint>, undo_depth: usize) -> Self {
        let metrics = shared(LiveMetrics::compute(&vertices, true));
        let sink = metrics.clone();
        let mut store = VertexStore::from_points(vertices.clone());
        store.subscribe(move |_, points| {
            *sink.borrow_mut() = LiveMetrics::compute(points, true);
        });

        tracing::info!("Editing field {} ({} vertices)", field_id, store.len());
        Self {
            field_id,
            original: vertices,
            store,
            history: UndoRedoStack::with_depth(undo_depth),
            gesture: None,
            metrics,
        }
    }

    pub fn field_id(&self) -> FieldId {
        self.field_id
    }

    /// Current vertices of the field being edited.
    pub fn vertices(&self) -> &[GeoPoint] {
        self.store.as_slice()
    }

    pub fn metrics(&self) -> LiveMetrics {
        self.metrics.borrow().clone()
    }

    pub fn interaction(&self) -> InteractionState {
        match &self.gesture {
            None => InteractionState::Selected,
            Some(Gesture::Vertex { index, .. }) => InteractionState::EditingVertex(*index),
            Some(Gesture::Edge { edge, .. }) => InteractionState::EditingEdge(*edge),
        }
    }

    /// True when the vertices differ from those the session started with.
    pub fn is_modified(&self) -> bool {
        self.store.as_slice() != self.original.as_slice()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Starts dragging the vertex at `index`.
    pub fn begin_vertex_drag(&mut self, index: usize) -> EngineResult<()> {
        self.ensure_no_gesture()?;
        self.check_vertex(index)?;
        self.gesture = Some(Gesture::Vertex {
            index,
            before: self.store.to_vec(),
        });
        tracing::debug!("Vertex drag started at {}", index);
        Ok(())
    }

    /// Starts dragging the midpoint of the edge `edge -> edge + 1`.
    ///
    /// No vertex exists until the first [`drag_to`](Self::drag_to).
    pub fn begin_edge_drag(&mut self, edge: usize) -> EngineResult<()> {
        self.ensure_no_gesture()?;
        self.check_edge(edge)?;
        self.gesture = Some(Gesture::Edge {
            edge,
            before: self.store.to_vec(),
            inserted: false,
        });
        tracing::debug!("Edge drag started on {}", edge);
        Ok(())
    }

    /// Moves the dragged vertex to `point`.
    pub fn drag_to(&mut self, point: GeoPoint) -> EngineResult<()> {
        match self.gesture.as_mut() {
            None => Err(EngineError::NoGesture),
            Some(Gesture::Vertex { index, .. }) => self.store.set_at(*index, point),
            Some(Gesture::Edge { edge, inserted, .. }) => {
                let at = *edge + 1;
                if *inserted {
                    self.store.set_at(at, point)
                } else {
                    *inserted = true;
                    self.store.insert_at(at, point)
                }
            }
        }
    }

    /// Ends the gesture, recording one undo entry if the vertices changed.
    ///
    /// Returns whether an entry was recorded.
    pub fn end_drag(&mut self) -> EngineResult<bool> {
        let before = self.gesture.take().ok_or(EngineError::NoGesture)?.into_before();
        if before.as_slice() == self.store.as_slice() {
            tracing::debug!("Drag ended without movement");
            return Ok(false);
        }
        self.history.record(before);
        tracing::debug!("Drag committed ({} vertices)", self.store.len());
        Ok(true)
    }

    /// Aborts the gesture and restores the vertices it started from.
    ///
    /// The undo history is not touched.
    pub fn cancel_drag(&mut self) -> EngineResult<()> {
        let before = self.gesture.take().ok_or(EngineError::NoGesture)?.into_before();
        if before.as_slice() != self.store.as_slice() {
            self.store.replace_all(before);
        }
        tracing::debug!("Drag cancelled");
        Ok(())
    }

    /// Sets the length of edge `edge` by moving its later endpoint along
    /// the edge direction. The vertex at `edge` stays fixed.
    pub fn set_edge_length(&mut self, edge: usize, length_m: f64) -> EngineResult<LengthEdit> {
        self.ensure_no_gesture()?;
        if !(length_m.is_finite() && length_m >= 0.0) {
            return Err(EngineError::InvalidLength(length_m.to_string()));
        }
        self.check_edge(edge)?;

        let n = self.store.len();
        let target = (edge + 1) % n;
        let (Some(anchor), Some(current)) = (self.store.get(edge), self.store.get(target)) else {
            return Err(EngineError::IndexOutOfRange { index: edge, len: n });
        };

        let moved = match geometry::try_extrapolate_to_distance(anchor, current, length_m) {
            Ok(p) => p,
            Err(GeometryError::DegenerateEdge) => {
                tracing::debug!("Edge {} has zero length, length edit ignored", edge);
                return Ok(LengthEdit::Unchanged);
            }
        };

        self.history.record(self.store.to_vec());
        self.store.set_at(target, moved)?;
        tracing::debug!("Edge {} set to {:.2} m", edge, length_m);
        Ok(LengthEdit::Applied { moved: target })
    }

    /// Parses label text such as `"120 m"` or `"1.5 km"` and applies it as
    /// an edge length.
    pub fn set_edge_length_text(&mut self, edge: usize, text: &str) -> EngineResult<LengthEdit> {
        let length_m = parse_distance(text)?;
        self.set_edge_length(edge, length_m)
    }

    /// Removes a vertex, keeping at least three.
    pub fn remove_vertex(&mut self, index: usize) -> EngineResult<GeoPoint> {
        self.ensure_no_gesture()?;
        self.check_vertex(index)?;
        let n = self.store.len();
        if n <= MIN_FIELD_VERTICES {
            return Err(EngineError::InsufficientVertices {
                required: MIN_FIELD_VERTICES,
                actual: n - 1,
            });
        }

        self.history.record(self.store.to_vec());
        self.store.remove_at(index)
    }

    pub fn undo(&mut self) -> EngineResult<()> {
        self.ensure_no_gesture()?;
        let previous = self.history.undo(self.store.to_vec())?;
        self.store.replace_all(previous);
        Ok(())
    }

    pub fn redo(&mut self) -> EngineResult<()> {
        self.ensure_no_gesture()?;
        let next = self.history.redo(self.store.to_vec())?;
        self.store.replace_all(next);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.gesture.is_none() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.gesture.is_none() && self.history.can_redo()
    }

    /// Number of recorded undo entries.
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Vertex marker positions, indexed by vertex.
    pub fn vertex_markers(&self) -> Vec<(usize, GeoPoint)> {
        self.store.as_slice().iter().copied().enumerate().collect()
    }

    /// Midpoint marker positions, indexed by the edge's first vertex.
    pub fn midpoint_markers(&self) -> Vec<(usize, GeoPoint)> {
        geometry::edges(self.store.as_slice(), true)
            .map(|(i, a, b)| (i, geometry::midpoint(a, b)))
            .collect()
    }

    /// Finds the marker under `screen` within `tolerance_px`.
    ///
    /// Vertex markers take precedence over midpoint markers; among markers
    /// of one kind the closest wins. Markers the projection cannot place are
    /// skipped.
    pub fn hit_test<P>(&self, screen: ScreenPoint, projection: &P, tolerance_px: f64) -> Option<MarkerHit>
    where
        P: Projection + ?Sized,
    {
        let nearest = |markers: Vec<(usize, GeoPoint)>| {
            markers
                .into_iter()
                .filter_map(|(i, p)| {
                    let d = projection.project_to_screen(p)?.distance_to(&screen);
                    (d <= tolerance_px).then_some((i, d))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i)
        };

        nearest(self.vertex_markers())
            .map(MarkerHit::Vertex)
            .or_else(|| nearest(self.midpoint_markers()).map(MarkerHit::Midpoint))
    }

    /// Ends the session and returns the edited vertices.
    ///
    /// A gesture still in progress is cancelled first.
    pub fn finish(mut self) -> Vec<GeoPoint> {
        if self.gesture.is_some() {
            tracing::warn!("Finishing edit of {} with a drag in progress", self.field_id);
            let _ = self.cancel_drag();
        }
        tracing::info!("Finished editing field {}", self.field_id);
        self.store.to_vec()
    }

    fn ensure_no_gesture(&self) -> EngineResult<()> {
        if self.gesture.is_some() {
            Err(EngineError::GestureInProgress)
        } else {
            Ok(())
        }
    }

    fn check_vertex(&self, index: usize) -> EngineResult<()> {
        let len = self.store.len();
        if index < len {
            Ok(())
        } else {
            Err(EngineError::IndexOutOfRange { index, len })
        }
    }

    fn check_edge(&self, edge: usize) -> EngineResult<()> {
        let len = self.store.len();
        if edge < geometry::edge_count(len, true) {
            Ok(())
        } else {
            Err(EngineError::IndexOutOfRange { index: edge, len })
        }
    }
}

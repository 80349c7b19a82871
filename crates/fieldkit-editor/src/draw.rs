//! Drawing state machine
//!
//! Collects clicked points into a fresh vertex store until the user closes
//! the shape. A field needs at least three vertices to close; a distance
//! path needs two. Every added point is recorded in the session's own
//! undo/redo history, so "undo" while drawing removes the last point.
//!
//! ```text
//! Idle --start--> Drawing --close--> Closed
//!                    |
//!                    +--cancel--> Idle
//! ```

use fieldkit_core::{shared, GeoPoint, Shared};

use crate::error::{EngineError, EngineResult};
use crate::history::UndoRedoStack;
use crate::metrics::LiveMetrics;
use crate::vertex_store::{Snapshot, VertexStore};

/// What a drawing session produces when closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionKind {
    /// A closed field polygon.
    #[default]
    Field,
    /// An open polyline measured for its length.
    DistancePath,
}

impl SessionKind {
    /// Minimum vertex count accepted by [`DrawStateMachine::close`].
    pub fn min_vertices(self) -> usize {
        match self {
            SessionKind::Field => 3,
            SessionKind::DistancePath => 2,
        }
    }

    /// Whether the shape has a wrap edge.
    pub fn is_closed(self) -> bool {
        matches!(self, SessionKind::Field)
    }

    /// Short name used in logs and error messages.
    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Field => "field drawing",
            SessionKind::DistancePath => "distance path",
        }
    }
}

/// Lifecycle state of a [`DrawStateMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawState {
    Idle,
    Drawing,
    Closed,
}

/// Point-by-point drawing session.
#[derive(Debug)]
pub struct DrawStateMachine {
    state: DrawState,
    kind: SessionKind,
    store: VertexStore,
    history: UndoRedoStack<Snapshot>,
    metrics: Shared<LiveMetrics>,
    undo_depth: usize,
}

impl DrawStateMachine {
    /// Creates an idle machine whose sessions keep `undo_depth` undo entries.
    pub fn new(undo_depth: usize) -> Self {
        Self {
            state: DrawState::Idle,
            kind: SessionKind::default(),
            store: VertexStore::new(),
            history: UndoRedoStack::with_depth(undo_depth),
            metrics: shared(LiveMetrics::default()),
            undo_depth,
        }
    }

    /// Starts a new session with an empty vertex store and history.
    pub fn start(&mut self, kind: SessionKind) -> EngineResult<()> {
        if self.state == DrawState::Drawing {
            return Err(EngineError::ConcurrentSessionConflict {
                active: self.kind.label(),
            });
        }

        let metrics = shared(LiveMetrics::compute(&[], kind.is_closed()));
        let sink = metrics.clone();
        let closed = kind.is_closed();
        let mut store = VertexStore::new();
        store.subscribe(move |_, points| {
            *sink.borrow_mut() = LiveMetrics::compute(points, closed);
        });

        self.store = store;
        self.metrics = metrics;
        self.history = UndoRedoStack::with_depth(self.undo_depth);
        self.kind = kind;
        self.state = DrawState::Drawing;
        tracing::info!("Started {} session", kind.label());
        Ok(())
    }

    /// Appends a point, recording the previous vertices for undo.
    pub fn add_point(&mut self, point: GeoPoint) -> EngineResult<()> {
        self.ensure_drawing()?;
        self.history.record(self.store.to_vec());
        self.store.append(point);
        tracing::debug!("Added vertex {} at {}", self.store.len() - 1, point);
        Ok(())
    }

    /// True when enough vertices exist to close the current session.
    pub fn can_close(&self) -> bool {
        self.state == DrawState::Drawing && self.store.len() >= self.kind.min_vertices()
    }

    /// Closes the session and hands back its vertices.
    ///
    /// Fails with [`EngineError::InsufficientVertices`] and stays in
    /// `Drawing` when too few points were placed.
    pub fn close(&mut self) -> EngineResult<Vec<GeoPoint>> {
        self.ensure_drawing()?;
        let required = self.kind.min_vertices();
        let actual = self.store.len();
        if actual < required {
            return Err(EngineError::InsufficientVertices { required, actual });
        }

        self.state = DrawState::Closed;
        self.history.clear();
        tracing::info!("Closed {} with {} vertices", self.kind.label(), actual);
        Ok(self.store.to_vec())
    }

    /// Abandons the session, discarding its vertices and history.
    pub fn cancel(&mut self) {
        if self.state == DrawState::Drawing {
            tracing::info!(
                "Cancelled {} with {} vertices",
                self.kind.label(),
                self.store.len()
            );
        }
        self.store.clear();
        self.history.clear();
        self.state = DrawState::Idle;
    }

    /// Removes the most recently added point.
    pub fn undo(&mut self) -> EngineResult<()> {
        self.ensure_drawing()?;
        let previous = self.history.undo(self.store.to_vec())?;
        self.store.replace_all(previous);
        Ok(())
    }

    /// Restores the most recently undone point.
    pub fn redo(&mut self) -> EngineResult<()> {
        self.ensure_drawing()?;
        let next = self.history.redo(self.store.to_vec())?;
        self.store.replace_all(next);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.state == DrawState::Drawing && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state == DrawState::Drawing && self.history.can_redo()
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Vertices placed so far.
    pub fn vertices(&self) -> &[GeoPoint] {
        self.store.as_slice()
    }

    /// Live metrics of the vertices placed so far.
    pub fn metrics(&self) -> LiveMetrics {
        self.metrics.borrow().clone()
    }

    fn ensure_drawing(&self) -> EngineResult<()> {
        if self.state == DrawState::Drawing {
            Ok(())
        } else {
            Err(EngineError::NoActiveSession { expected: "drawing" })
        }
    }
}

impl Default for DrawStateMachine {
    fn default() -> Self {
        Self::new(crate::history::DEFAULT_UNDO_DEPTH)
    }
}

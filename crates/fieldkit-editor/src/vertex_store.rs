//! Ordered, index-addressable vertex storage for one drawing or editing session.
//!
//! The index of a vertex is its identity for the lifetime of the session;
//! inserting or removing shifts every later index. Every successful mutation
//! synchronously notifies the subscribed listeners before returning, so a
//! caller always observes recomputed metrics and labels right after the call.

use fieldkit_core::GeoPoint;
use std::fmt;

use crate::error::{EngineError, EngineResult};

/// Full copy of a vertex sequence, used by the undo/redo history.
pub type Snapshot = Vec<GeoPoint>;

/// Describes the mutation that triggered a listener call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexChange {
    /// A vertex was appended at this index.
    Appended(usize),
    /// A vertex was inserted at this index.
    Inserted(usize),
    /// The vertex at this index was moved.
    Updated(usize),
    /// The vertex at this index was removed.
    Removed(usize),
    /// The whole sequence was replaced (snapshot restore).
    Replaced,
}

/// Handle returned by [`VertexStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type VertexListener = Box<dyn Fn(VertexChange, &[GeoPoint])>;

/// Ordered sequence of vertices with synchronous change notification.
#[derive(Default)]
pub struct VertexStore {
    points: Vec<GeoPoint>,
    listeners: Vec<(ListenerId, VertexListener)>,
    next_listener: u64,
}

impl VertexStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with existing vertices. No listener is notified.
    pub fn from_points(points: Vec<GeoPoint>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the store holds no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Vertex at `index`, if any.
    pub fn get(&self, index: usize) -> Option<GeoPoint> {
        self.points.get(index).copied()
    }

    /// Borrowed view of the vertices.
    pub fn as_slice(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Owned copy of the vertices.
    pub fn to_vec(&self) -> Snapshot {
        self.points.clone()
    }

    /// Appends a vertex at the end.
    pub fn append(&mut self, point: GeoPoint) {
        self.points.push(point);
        self.notify(VertexChange::Appended(self.points.len() - 1));
    }

    /// Inserts a vertex so that it ends up at `index`; `index == len` appends.
    pub fn insert_at(&mut self, index: usize, point: GeoPoint) -> EngineResult<()> {
        if index > self.points.len() {
            return Err(self.out_of_range(index));
        }
        self.points.insert(index, point);
        self.notify(VertexChange::Inserted(index));
        Ok(())
    }

    /// Moves the vertex at `index`.
    pub fn set_at(&mut self, index: usize, point: GeoPoint) -> EngineResult<()> {
        if index >= self.points.len() {
            return Err(self.out_of_range(index));
        }
        self.points[index] = point;
        self.notify(VertexChange::Updated(index));
        Ok(())
    }

    /// Removes and returns the vertex at `index`.
    pub fn remove_at(&mut self, index: usize) -> EngineResult<GeoPoint> {
        if index >= self.points.len() {
            return Err(self.out_of_range(index));
        }
        let removed = self.points.remove(index);
        self.notify(VertexChange::Removed(index));
        Ok(removed)
    }

    /// Replaces every vertex, e.g. when applying an undo snapshot.
    pub fn replace_all(&mut self, points: Snapshot) {
        self.points = points;
        self.notify(VertexChange::Replaced);
    }

    /// Removes every vertex.
    pub fn clear(&mut self) {
        if !self.points.is_empty() {
            self.replace_all(Vec::new());
        }
    }

    /// Registers a listener called after every successful mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(VertexChange, &[GeoPoint]) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn notify(&self, change: VertexChange) {
        for (_, listener) in &self.listeners {
            listener(change, &self.points);
        }
    }

    #[allow(clippy::assertions_on_constants)]
    fn out_of_range(&self, index: usize) -> EngineError {
        let len = self.points.len();
        tracing::error!("vertex index {} out of range (length {})", index, len);
        // Callers validate indices; reaching this is a wiring bug.
        debug_assert!(false, "vertex index {} out of range (length {})", index, len);
        EngineError::IndexOutOfRange { index, len }
    }
}

impl fmt::Debug for VertexStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexStore")
            .field("points", &self.points)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

//! # FieldKit Editor
//!
//! Interactive drawing and editing engine for field boundary polygons and
//! distance paths. Hosts feed it pointer events and camera updates; it keeps
//! the vertices, live area/perimeter/edge lengths, labels and undo history.
//!
//! ## Core Components
//!
//! - **VertexStore**: ordered vertices with synchronous change listeners
//! - **UndoRedoStack**: snapshot history, one per session
//! - **DrawStateMachine**: point-by-point drawing of fields and paths
//! - **EditSession**: vertex drags, edge insertion drags, typed edge lengths
//! - **OverlayLabelManager**: edge length and field title labels
//! - **PolygonRegistry**: all fields plus the single active session
//! - **FieldStore / PersistenceQueue**: background persistence
//!
//! ## Architecture
//!
//! ```text
//! pointer event
//!   └── PolygonRegistry::handle_pointer
//!         ├── DrawStateMachine (Drawing) ──┐
//!         └── EditSession (Editing) ───────┤
//!                                          ├── VertexStore ── LiveMetrics
//!                                          ├── UndoRedoStack
//!                                          └── OverlayLabelManager ── Projection
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use fieldkit_core::GeoPoint;
//! use fieldkit_editor::{DrawOutcome, PolygonRegistry, SessionKind};
//!
//! let mut registry = PolygonRegistry::default();
//! registry.start_drawing(SessionKind::Field).unwrap();
//! registry.add_point(GeoPoint::new(0.0, 0.0)).unwrap();
//! registry.add_point(GeoPoint::new(0.0, 0.001)).unwrap();
//! registry.add_point(GeoPoint::new(0.001, 0.001)).unwrap();
//!
//! if let DrawOutcome::Field(id) = registry.close_drawing().unwrap() {
//!     assert!(registry.field_area_m2(id).unwrap() > 0.0);
//! }
//! ```

pub mod draw;
pub mod edit_session;
pub mod error;
pub mod events;
pub mod history;
pub mod host;
pub mod labels;
pub mod metrics;
pub mod model;
pub mod registry;
pub mod store;
pub mod vertex_store;

pub use draw::{DrawState, DrawStateMachine, SessionKind};
pub use edit_session::{EditSession, InteractionState, LengthEdit, MarkerHit};
pub use error::{EngineError, EngineResult, HistoryError, StoreError, StoreResult};
pub use events::{EngineEvent, EventDispatcher, SessionTag};
pub use history::UndoRedoStack;
pub use host::{attach, MapSurface, PointerEvent, PointerKind, Projection};
pub use labels::{Label, LabelKey, LabelKind, LabelOwner, OverlayLabelManager};
pub use metrics::LiveMetrics;
pub use model::{FieldId, FieldPolygon, FieldStyle, MeasuredPath};
pub use registry::{
    DrawOutcome, EditorOptions, PolygonInteraction, PolygonRegistry, Session, SessionResolution,
};
pub use store::{
    FieldStore, JsonFileStore, MemoryFieldStore, PersistOp, PersistOutcome, PersistenceQueue,
};
pub use vertex_store::{ListenerId, Snapshot, VertexChange, VertexStore};

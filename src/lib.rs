//! # FieldKit
//!
//! Draw, edit and measure field boundary polygons on an interactive map,
//! with live area, perimeter and edge lengths and full undo/redo.
//!
//! ## Architecture
//!
//! FieldKit is organized as a workspace with multiple crates:
//!
//! 1. **fieldkit-core** - Geographic points, spherical geometry, unit formatting
//! 2. **fieldkit-editor** - Drawing/editing engine, labels, registry, persistence contracts
//! 3. **fieldkit-settings** - Editor configuration (JSON/TOML)
//! 4. **fieldkit** - Re-exports, logging setup and the `fieldkit` command line tool
//!
//! ## Features
//!
//! - **Drawing**: click-to-place fields and distance paths, undo while drawing
//! - **Editing**: vertex drags, midpoint insertion drags, typed edge lengths
//! - **Live Geometry**: signed spherical area, perimeter, per-edge lengths
//! - **Labels**: edge lengths and field titles positioned through a host projection
//! - **Persistence**: async store contract with memory and JSON file backends

pub mod cli;

pub use fieldkit_core::geometry;
pub use fieldkit_core::{
    format_area_hectares, format_distance, parse_distance, AreaReport, AreaUnit, GeoBounds,
    GeoPoint, GeometryError, LengthUnit, ScreenPoint, UnitsError,
};

pub use fieldkit_editor::{
    attach, DrawOutcome, DrawStateMachine, EditSession, EditorOptions, EngineError, EngineEvent,
    FieldId, FieldPolygon, FieldStore, FieldStyle, JsonFileStore, LabelOwner, LiveMetrics,
    MapSurface, MeasuredPath, MemoryFieldStore, OverlayLabelManager, PersistenceQueue,
    PointerEvent, PointerKind, PolygonRegistry, Projection, SessionKind, SessionResolution,
    StoreError, UndoRedoStack, VertexStore,
};

pub use fieldkit_settings::{Config, EditorSettings, LabelSettings, SettingsError, StyleSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty console output on stderr, leaving stdout to command output
/// - RUST_LOG environment variable support (default `info`)
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

//! # FieldKit Core
//!
//! Core types and pure functions shared by the FieldKit crates:
//! geographic points, spherical geometry (distance, area, perimeter,
//! reshaping helpers), label formatting and error types.

pub mod error;
pub mod geo;
pub mod geometry;
pub mod types;
pub mod units;

pub use error::{Error, GeometryError, Result, UnitsError};
pub use geo::{GeoBounds, GeoPoint, ScreenPoint};
pub use geometry::EARTH_RADIUS_M;
pub use units::{format_area_hectares, format_distance, parse_distance, AreaReport, AreaUnit, LengthUnit};

pub use types::{shared, thread_safe_rw_map, Shared, ThreadSafeRwMap, UiDataCallback};

//! Field polygon model.
//!
//! A [`FieldPolygon`] is the persisted result of a closed drawing session.
//! Its area and perimeter are always derived from the vertices and are never
//! stored as the source of truth.

use chrono::{DateTime, Utc};
use fieldkit_core::geometry;
use fieldkit_core::{AreaReport, GeoPoint};
use fieldkit_settings::StyleSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a field polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(Uuid);

impl FieldId {
    /// Generates a new random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID, e.g. one assigned by a remote store.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Stroke and fill styling of a field outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStyle {
    /// Outline colour as `#RRGGBB`
    pub stroke_color: String,
    /// Fill colour as `#RRGGBB`
    pub fill_color: String,
    /// Outline width in pixels
    pub stroke_weight: f64,
    /// Fill opacity in `0.0..=1.0`
    pub fill_opacity: f64,
}

impl Default for FieldStyle {
    fn default() -> Self {
        Self::from(&StyleSettings::default())
    }
}

impl From<&StyleSettings> for FieldStyle {
    fn from(settings: &StyleSettings) -> Self {
        Self {
            stroke_color: settings.stroke_color.clone(),
            fill_color: settings.fill_color.clone(),
            stroke_weight: settings.stroke_weight,
            fill_opacity: settings.fill_opacity,
        }
    }
}

impl FieldStyle {
    /// Copy of this style with opacity clamped into range and a positive weight.
    pub fn sanitized(mut self) -> Self {
        self.fill_opacity = if self.fill_opacity.is_finite() {
            self.fill_opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if !(self.stroke_weight.is_finite() && self.stroke_weight > 0.0) {
            self.stroke_weight = 1.0;
        }
        self
    }
}

/// A finalised, closed field outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPolygon {
    pub id: FieldId,
    pub name: String,
    pub vertices: Vec<GeoPoint>,
    pub style: FieldStyle,
    /// Creation sequence; higher values render above lower ones.
    #[serde(default)]
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl FieldPolygon {
    /// Creates a field from a closed vertex list.
    pub fn new(name: impl Into<String>, vertices: Vec<GeoPoint>, style: FieldStyle) -> Self {
        let now = Utc::now();
        Self {
            id: FieldId::new(),
            name: name.into(),
            vertices,
            style,
            sequence: 0,
            created_at: now,
            modified_at: now,
        }
    }

    /// Signed spherical area in square metres; sign follows winding.
    pub fn signed_area_m2(&self) -> f64 {
        geometry::polygon_area(&self.vertices)
    }

    /// Area in square metres as shown to the user.
    pub fn area_m2(&self) -> f64 {
        self.signed_area_m2().abs()
    }

    /// Closed perimeter in metres.
    pub fn perimeter_m(&self) -> f64 {
        geometry::perimeter(&self.vertices, true)
    }

    /// Length of every edge including the wrap edge.
    pub fn edge_lengths(&self) -> Vec<f64> {
        geometry::edge_lengths(&self.vertices, true)
    }

    /// Area in all report units.
    pub fn area_report(&self) -> AreaReport {
        AreaReport::from_square_meters(self.area_m2())
    }

    /// Vertex-mean centroid used to anchor the name label.
    pub fn centroid(&self) -> Option<GeoPoint> {
        geometry::centroid(&self.vertices)
    }

    /// Replaces the vertices and bumps the modification time.
    pub(crate) fn set_vertices(&mut self, vertices: Vec<GeoPoint>) {
        self.vertices = vertices;
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

/// An open distance path produced by closing a measurement session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredPath {
    pub vertices: Vec<GeoPoint>,
    /// Total length in metres (no wrap edge).
    pub length_m: f64,
}

impl MeasuredPath {
    /// Builds a path and computes its length.
    pub fn new(vertices: Vec<GeoPoint>) -> Self {
        let length_m = geometry::perimeter(&vertices, false);
        Self { vertices, length_m }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.001, 0.001),
            GeoPoint::new(0.001, 0.0),
        ]
    }

    #[test]
    fn test_derived_metrics() {
        let field = FieldPolygon::new("North paddock", square(), FieldStyle::default());
        assert!(field.area_m2() > 12_000.0 && field.area_m2() < 12_500.0);
        assert_eq!(field.edge_lengths().len(), 4);
        assert!((field.perimeter_m() - field.edge_lengths().iter().sum::<f64>()).abs() < 1e-9);
        assert_eq!(field.centroid(), Some(GeoPoint::new(0.0005, 0.0005)));
    }

    #[test]
    fn test_area_magnitude_ignores_winding() {
        let mut reversed = square();
        reversed.reverse();
        let a = FieldPolygon::new("a", square(), FieldStyle::default());
        let b = FieldPolygon::new("b", reversed, FieldStyle::default());
        assert!((a.area_m2() - b.area_m2()).abs() < 1e-6);
        assert!(a.signed_area_m2().signum() != b.signed_area_m2().signum());
    }

    #[test]
    fn test_style_sanitized() {
        let style = FieldStyle {
            fill_opacity: 3.0,
            stroke_weight: -1.0,
            ..FieldStyle::default()
        }
        .sanitized();
        assert_eq!(style.fill_opacity, 1.0);
        assert_eq!(style.stroke_weight, 1.0);
    }

    #[test]
    fn test_serde_round_trip_keeps_vertices() {
        let field = FieldPolygon::new("x", square(), FieldStyle::default());
        let json = serde_json::to_string(&field).unwrap();
        assert!(!json.contains("area"));
        let back: FieldPolygon = serde_json::from_str(&json).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn test_measured_path_length() {
        let path = MeasuredPath::new(square()[..2].to_vec());
        assert!((path.length_m - 111.319).abs() < 0.01);
    }
}

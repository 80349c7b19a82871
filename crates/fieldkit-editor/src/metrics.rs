//! Live geometry shown while a polygon or path is being drawn or edited.

use fieldkit_core::geometry;
use fieldkit_core::{format_area_hectares, format_distance, GeoPoint};
use std::fmt;

/// Area, perimeter and edge lengths of a vertex sequence.
///
/// Recomputed from scratch after every mutation; O(n) in the vertex count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveMetrics {
    pub vertex_count: usize,
    /// Signed spherical area in m²; 0 for open paths and fewer than 3 vertices.
    pub area_m2: f64,
    /// Perimeter (closed) or total length (open) in metres.
    pub perimeter_m: f64,
    pub edge_lengths: Vec<f64>,
    pub closed: bool,
}

impl LiveMetrics {
    /// Computes metrics for `vertices`, including the wrap edge when `closed`.
    pub fn compute(vertices: &[GeoPoint], closed: bool) -> Self {
        let edge_lengths = geometry::edge_lengths(vertices, closed);
        let perimeter_m = edge_lengths.iter().sum();
        let area_m2 = if closed {
            geometry::polygon_area(vertices)
        } else {
            0.0
        };

        Self {
            vertex_count: vertices.len(),
            area_m2,
            perimeter_m,
            edge_lengths,
            closed,
        }
    }

    /// Area magnitude as shown to the user.
    pub fn display_area_m2(&self) -> f64 {
        self.area_m2.abs()
    }
}

impl fmt::Display for LiveMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.closed {
            write!(
                f,
                "{} | {}",
                format_area_hectares(self.area_m2),
                format_distance(self.perimeter_m)
            )
        } else {
            write!(f, "{}", format_distance(self.perimeter_m))
        }
    }
}

//! Spherical geometry for field outlines.
//!
//! All functions are pure and allocation-free unless they return a collection.
//! The earth is modelled as a sphere of radius [`EARTH_RADIUS_M`], which is
//! accurate enough for cadastral plots from a few hundred square metres up to
//! a few hundred hectares.
//!
//! Areas are *signed*: the sign follows the winding order of the vertices.
//! Callers that present an area to the user take the absolute value
//! themselves so winding-aware features can still read the sign.

use std::f64::consts::PI;

use crate::error::GeometryError;
use crate::geo::{GeoBounds, GeoPoint};

/// Sphere radius used for every distance and area computation, in metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Edges shorter than this are treated as having no direction.
const DEGENERATE_EDGE_M: f64 = 1e-9;

/// Great-circle distance between two points in metres (haversine).
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat_rad();
    let lat2 = b.lat_rad();
    let dlat = lat2 - lat1;
    let dlng = b.lng_rad() - a.lng_rad();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Signed spherical area of the closed polygon in square metres.
///
/// The polygon is implicitly closed (the last vertex connects back to the
/// first). Fewer than three vertices yield `0.0`. Reversing the vertex order
/// negates the result; rotating it leaves the result unchanged.
pub fn polygon_area(vertices: &[GeoPoint]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }

    let Some(last) = vertices.last() else {
        return 0.0;
    };
    let mut prev_tan_lat = polar_tan(last);
    let mut prev_lng = last.lng_rad();
    let mut total = 0.0;

    for p in vertices {
        let tan_lat = polar_tan(p);
        let lng = p.lng_rad();
        total += polar_triangle_area(tan_lat, lng, prev_tan_lat, prev_lng);
        prev_tan_lat = tan_lat;
        prev_lng = lng;
    }

    total * EARTH_RADIUS_M * EARTH_RADIUS_M
}

fn polar_tan(p: &GeoPoint) -> f64 {
    ((PI / 2.0 - p.lat_rad()) / 2.0).tan()
}

/// Signed area of the triangle (pole, p1, p2) on the unit sphere.
fn polar_triangle_area(tan1: f64, lng1: f64, tan2: f64, lng2: f64) -> f64 {
    let delta_lng = lng1 - lng2;
    let t = tan1 * tan2;
    2.0 * (t * delta_lng.sin()).atan2(1.0 + t * delta_lng.cos())
}

/// Sum of edge lengths in metres. The wrap edge is included iff `closed`.
pub fn perimeter(vertices: &[GeoPoint], closed: bool) -> f64 {
    edges(vertices, closed).map(|(_, a, b)| distance(a, b)).sum()
}

/// Midpoint of two points as a plain lat/lng average.
///
/// Not the geodesic midpoint; the difference is negligible at plot scale.
pub fn midpoint(a: GeoPoint, b: GeoPoint) -> GeoPoint {
    GeoPoint::new((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0)
}

/// Moves along the ray `anchor -> target` to the requested distance from `anchor`.
///
/// The step is a linear ratio in raw lat/lng space, not a geodesic
/// destination. Fails with [`GeometryError::DegenerateEdge`] when the two
/// points coincide, since the ray has no direction.
pub fn try_extrapolate_to_distance(
    anchor: GeoPoint,
    target: GeoPoint,
    new_distance_m: f64,
) -> Result<GeoPoint, GeometryError> {
    let current = distance(anchor, target);
    if current < DEGENERATE_EDGE_M {
        return Err(GeometryError::DegenerateEdge);
    }

    let ratio = new_distance_m / current;
    Ok(GeoPoint::new(
        anchor.lat + (target.lat - anchor.lat) * ratio,
        anchor.lng + (target.lng - anchor.lng) * ratio,
    ))
}

/// Infallible form of [`try_extrapolate_to_distance`]: a degenerate edge
/// returns the anchor unchanged.
pub fn extrapolate_to_distance(anchor: GeoPoint, target: GeoPoint, new_distance_m: f64) -> GeoPoint {
    match try_extrapolate_to_distance(anchor, target, new_distance_m) {
        Ok(p) => p,
        Err(_) => {
            tracing::debug!("extrapolation on zero-length edge at {}", anchor);
            anchor
        }
    }
}

/// Iterates the edges of a vertex sequence as `(start_index, start, end)`.
///
/// A closed sequence of `n >= 2` vertices yields `n` edges (the last one wraps
/// to vertex 0); an open one yields `n - 1`.
pub fn edges(vertices: &[GeoPoint], closed: bool) -> impl Iterator<Item = (usize, GeoPoint, GeoPoint)> + '_ {
    let n = vertices.len();
    let count = edge_count(n, closed);
    (0..count).map(move |i| (i, vertices[i], vertices[(i + 1) % n]))
}

/// Number of edges for `n` vertices.
pub fn edge_count(n: usize, closed: bool) -> usize {
    match (n, closed) {
        (0 | 1, _) => 0,
        (n, true) => n,
        (n, false) => n - 1,
    }
}

/// Length of every edge, in edge order.
pub fn edge_lengths(vertices: &[GeoPoint], closed: bool) -> Vec<f64> {
    edges(vertices, closed).map(|(_, a, b)| distance(a, b)).collect()
}

/// Vertex-mean centroid; `None` for an empty sequence.
pub fn centroid(vertices: &[GeoPoint]) -> Option<GeoPoint> {
    if vertices.is_empty() {
        return None;
    }
    let n = vertices.len() as f64;
    let (lat, lng) = vertices
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Some(GeoPoint::new(lat / n, lng / n))
}

/// Bounding box of the vertices; `None` for an empty sequence.
pub fn bounds(vertices: &[GeoPoint]) -> Option<GeoBounds> {
    let first = vertices.first()?;
    let init = GeoBounds {
        south: first.lat,
        west: first.lng,
        north: first.lat,
        east: first.lng,
    };
    Some(vertices.iter().skip(1).fold(init, |b, p| GeoBounds {
        south: b.south.min(p.lat),
        west: b.west.min(p.lng),
        north: b.north.max(p.lat),
        east: b.east.max(p.lng),
    }))
}

//! # Ring Arithmetic
//!
//! Planar computations over lon/lat rings, treating degrees as Cartesian
//! units. That is adequate for the questions the validator asks
//! (orientation, rough size, whether edges cross) and keeps results
//! independent of any projection.

use crate::model::{Position, Ring};

/// Whether the ring's first and last positions are identical.
pub fn is_closed(ring: &[Position]) -> bool {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) => ring.len() > 1 && first == last,
        _ => false,
    }
}

/// Remove consecutive identical positions in place. Returns how many were
/// removed.
pub fn collapse_consecutive_duplicates(ring: &mut Ring) -> usize {
    let before = ring.len();
    ring.dedup();
    before - ring.len()
}

/// Number of vertices excluding the closing duplicate.
pub fn distinct_vertex_count(ring: &[Position]) -> usize {
    if is_closed(ring) {
        ring.len() - 1
    } else {
        ring.len()
    }
}

/// Shoelace signed area in square degrees. Positive means
/// counter-clockwise. Works on open or closed rings.
pub fn signed_area(ring: &[Position]) -> f64 {
    let n = distinct_vertex_count(ring);
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[(i + 1) % n];
        twice_area += a[0] * b[1] - b[0] * a[1];
    }
    twice_area / 2.0
}

/// Area of a polygon: exterior minus holes, never negative.
pub fn polygon_area(rings: &[Ring]) -> f64 {
    let mut rings = rings.iter();
    let Some(exterior) = rings.next() else {
        return 0.0;
    };
    let holes: f64 = rings.map(|r| signed_area(r).abs()).sum();
    (signed_area(exterior).abs() - holes).max(0.0)
}

/// A pair of non-adjacent edges that touch or cross.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfIntersection {
    /// Index of the first edge (from vertex `first_edge` to `first_edge + 1`).
    pub first_edge: usize,
    pub second_edge: usize,
}

/// First pair of non-adjacent edges of a closed ring that touch or cross.
///
/// Quadratic in the number of edges; callers cap the ring size.
pub fn find_self_intersection(ring: &[Position]) -> Option<SelfIntersection> {
    if !is_closed(ring) {
        return None;
    }
    let edges = ring.len() - 1;
    if edges < 4 {
        return None;
    }
    for i in 0..edges {
        for j in (i + 2)..edges {
            // The first and last edges share the closing vertex.
            if i == 0 && j == edges - 1 {
                continue;
            }
            if segments_intersect(&ring[i], &ring[i + 1], &ring[j], &ring[j + 1]) {
                return Some(SelfIntersection {
                    first_edge: i,
                    second_edge: j,
                });
            }
        }
    }
    None
}

fn orientation(p: &[f64], q: &[f64], r: &[f64]) -> f64 {
    (q[0] - p[0]) * (r[1] - p[1]) - (q[1] - p[1]) * (r[0] - p[0])
}

fn on_segment(p: &[f64], q: &[f64], r: &[f64]) -> bool {
    r[0] >= p[0].min(q[0])
        && r[0] <= p[0].max(q[0])
        && r[1] >= p[1].min(q[1])
        && r[1] <= p[1].max(q[1])
}

/// Whether closed segments `p1p2` and `q1q2` share at least one point.
fn segments_intersect(p1: &[f64], p2: &[f64], q1: &[f64], q2: &[f64]) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

/// Render a position for issue details, e.g. `[12.5, 41.9]`.
pub fn fmt_position(p: &[f64]) -> String {
    let parts: Vec<String> = p.iter().map(|c| c.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

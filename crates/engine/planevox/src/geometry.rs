//! Planar geometry primitives
//!
//! All routines work in the XY plane; Z is carried along but ignored.

use glam::Vec2;

/// Barycentric slack allowed when testing a point against a triangle
const BARYCENTRIC_TOLERANCE: f32 = -1e-5;

/// Below this `|denominator|` a triangle is treated as degenerate
const DEGENERATE_TRIANGLE: f32 = 1e-6;

/// Added to the edge span to keep ray casting finite on horizontal edges
const RAY_CAST_EPSILON: f32 = 1e-10;

/// Directional edges shorter than this have no direction
const MIN_EDGE_LENGTH: f32 = 1e-6;

/// Axis-alignment tolerance on |dx| or |dy|
const ALIGNED_TOLERANCE: f32 = 1e-4;

/// Barycentric weights `(wa, wb, wc)` of `p` when it lies inside the
/// triangle `(a, b, c)`.
///
/// A small tolerance lets points on shared edges belong to both neighbours.
/// Degenerate triangles contain nothing.
pub fn triangle_weights(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> Option<(f32, f32, f32)> {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;

    let d00 = v0.dot(v0);
    let d01 = v0.dot(v1);
    let d11 = v1.dot(v1);
    let d20 = v2.dot(v0);
    let d21 = v2.dot(v1);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < DEGENERATE_TRIANGLE {
        return None;
    }
    let wb = (d11 * d20 - d01 * d21) / denom;
    let wc = (d00 * d21 - d01 * d20) / denom;
    let wa = 1.0 - wb - wc;

    (wa >= BARYCENTRIC_TOLERANCE && wb >= BARYCENTRIC_TOLERANCE && wc >= BARYCENTRIC_TOLERANCE)
        .then_some((wa, wb, wc))
}

pub fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    triangle_weights(p, a, b, c).is_some()
}

/// Number of times a +X ray from `p` crosses the ring `ring` (closed implicitly)
pub fn ray_crossings(p: Vec2, ring: &[Vec2]) -> usize {
    let n = ring.len();
    if n < 3 {
        return 0;
    }
    let mut crossings = 0;
    for i in 0..n {
        let v1 = ring[i];
        let v2 = ring[(i + 1) % n];
        if (v1.y > p.y) != (v2.y > p.y)
            && p.x < (v2.x - v1.x) * (p.y - v1.y) / (v2.y - v1.y + RAY_CAST_EPSILON) + v1.x
        {
            crossings += 1;
        }
    }
    crossings
}

/// Even-odd point-in-polygon test over a single ring
pub fn point_in_polygon(p: Vec2, ring: &[Vec2]) -> bool {
    ray_crossings(p, ring) % 2 == 1
}

/// Even-odd test over several rings, so inner rings act as holes
pub fn point_in_rings(p: Vec2, rings: &[Vec<Vec2>]) -> bool {
    rings.iter().map(|r| ray_crossings(p, r)).sum::<usize>() % 2 == 1
}

/// Strict crossing test: both segments straddle each other's line.
///
/// Touching and collinear configurations do not count.
pub fn segments_cross(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    let d1 = (p4 - p3).perp_dot(p1 - p3);
    let d2 = (p4 - p3).perp_dot(p2 - p3);
    let d3 = (p2 - p1).perp_dot(p3 - p1);
    let d4 = (p2 - p1).perp_dot(p4 - p1);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Winding of a polygon given as an ordered vertex ring; true for CCW
pub fn is_ccw(ring: &[Vec2]) -> bool {
    let n = ring.len();
    let mut area = 0.0;
    for i in 0..n {
        let p0 = ring[i];
        let p1 = ring[(i + 1) % n];
        area += (p1.x - p0.x) * (p1.y + p0.y);
    }
    area < 0.0
}

/// Unit normal pointing away from the interior of a polygon with the given
/// winding, for an edge traversed `start -> end` along that winding.
pub fn outward_normal(start: Vec2, end: Vec2, ccw: bool) -> Vec2 {
    let d = end - start;
    let len = d.length();
    if len < MIN_EDGE_LENGTH {
        return Vec2::ZERO;
    }
    let d = d / len;
    if ccw {
        Vec2::new(d.y, -d.x)
    } else {
        Vec2::new(-d.y, d.x)
    }
}

/// Heading of an edge in degrees in `[0, 360)`, measured with Y flipped
/// into the target's Z-forward convention.
pub fn edge_angle_degrees(start: Vec2, end: Vec2) -> f32 {
    let d = end - start;
    let angle = (-d.y).atan2(d.x).to_degrees();
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// True when the edge runs parallel to the X or Y axis
pub fn is_axis_aligned(start: Vec2, end: Vec2) -> bool {
    let d = end - start;
    d.x.abs() < ALIGNED_TOLERANCE || d.y.abs() < ALIGNED_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_point_in_triangle() {
        let (a, b, c) = (Vec2::ZERO, Vec2::X, Vec2::Y);
        assert!(point_in_triangle(Vec2::new(0.25, 0.25), a, b, c));
        assert!(!point_in_triangle(Vec2::new(0.75, 0.75), a, b, c));
        // on the hypotenuse
        assert!(point_in_triangle(Vec2::new(0.5, 0.5), a, b, c));
    }

    #[test]
    fn test_degenerate_triangle_contains_nothing() {
        let a = Vec2::ZERO;
        assert!(!point_in_triangle(a, a, Vec2::X, Vec2::X * 2.0));
    }

    #[test]
    fn test_triangle_weights_sum_to_one() {
        let (a, b, c) = (Vec2::ZERO, Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0));
        let (wa, wb, wc) = triangle_weights(Vec2::new(0.5, 0.5), a, b, c).unwrap();
        assert!((wa + wb + wc - 1.0).abs() < 1e-6);
        assert!((wb - 0.25).abs() < 1e-6);
        assert!((wc - 0.25).abs() < 1e-6);
        let (_, wb, _) = triangle_weights(b, a, b, c).unwrap();
        assert!((wb - 1.0).abs() < 1e-6);
        assert!(triangle_weights(Vec2::new(3.0, 3.0), a, b, c).is_none());
    }

    #[test]
    fn test_point_in_polygon() {
        let ring = square();
        assert!(point_in_polygon(Vec2::new(0.5, 0.5), &ring));
        assert!(!point_in_polygon(Vec2::new(1.5, 0.5), &ring));
        assert!(!point_in_polygon(Vec2::new(-0.1, 0.5), &ring));
    }

    #[test]
    fn test_point_in_rings_with_hole() {
        let outer: Vec<Vec2> = square().into_iter().map(|v| v * 4.0).collect();
        let hole: Vec<Vec2> = square().into_iter().map(|v| v + Vec2::splat(1.5)).collect();
        let rings = vec![outer, hole];
        assert!(point_in_rings(Vec2::new(0.5, 0.5), &rings));
        assert!(!point_in_rings(Vec2::new(2.0, 2.0), &rings));
    }

    #[test]
    fn test_segments_cross() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 1.0);
        assert!(segments_cross(a, b, Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0)));
        // shared endpoint is not a crossing
        assert!(!segments_cross(a, b, b, Vec2::new(2.0, 0.0)));
        // parallel
        assert!(!segments_cross(a, b, Vec2::new(0.0, 1.0), Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn test_winding() {
        let mut ring = square();
        assert!(is_ccw(&ring));
        ring.reverse();
        assert!(!is_ccw(&ring));
    }

    #[test]
    fn test_outward_normal_points_away_from_interior() {
        // bottom edge of a CCW square
        let n = outward_normal(Vec2::ZERO, Vec2::X, true);
        assert!((n - Vec2::new(0.0, -1.0)).length() < 1e-6);
        // same edge traversed by a CW polygon lying below it
        let n = outward_normal(Vec2::X, Vec2::ZERO, false);
        assert!((n - Vec2::new(0.0, -1.0)).length() < 1e-6);
        assert_eq!(outward_normal(Vec2::X, Vec2::X, true), Vec2::ZERO);
    }

    #[test]
    fn test_edge_angle() {
        assert_eq!(edge_angle_degrees(Vec2::ZERO, Vec2::X), 0.0);
        assert!((edge_angle_degrees(Vec2::ZERO, Vec2::Y) - 270.0).abs() < 1e-4);
        assert!((edge_angle_degrees(Vec2::ZERO, -Vec2::Y) - 90.0).abs() < 1e-4);
        assert!((edge_angle_degrees(Vec2::ZERO, -Vec2::X) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_axis_aligned() {
        assert!(is_axis_aligned(Vec2::ZERO, Vec2::new(3.0, 0.00001)));
        assert!(is_axis_aligned(Vec2::ZERO, Vec2::new(0.0, 2.0)));
        assert!(!is_axis_aligned(Vec2::ZERO, Vec2::new(1.0, 1.0)));
    }
}

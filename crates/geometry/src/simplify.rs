//! Polyline simplification
//!
//! Douglas-Peucker reduction used after boolean erasing, where clipping
//! leaves many near-collinear vertices along disc arcs.

use crate::hit_test::point_segment_distance;
use crate::transform::Point;

/// Reduce a polyline, keeping every vertex that deviates more than
/// `tolerance` page units from the chord of its span. Endpoints are
/// always kept; inputs with fewer than 3 points come back unchanged.
pub fn simplify_polyline(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[points.len() - 1] = true;
    mark_kept(points, 0, points.len() - 1, tolerance, &mut kept);
    points
        .iter()
        .zip(&kept)
        .filter(|(_, keep)| **keep)
        .map(|(p, _)| *p)
        .collect()
}

fn mark_kept(points: &[Point], first: usize, last: usize, tolerance: f64, kept: &mut [bool]) {
    if last <= first + 1 {
        return;
    }
    let mut max_distance = 0.0;
    let mut index = first;
    for i in (first + 1)..last {
        let d = point_segment_distance(points[i], points[first], points[last]);
        if d > max_distance {
            max_distance = d;
            index = i;
        }
    }
    if max_distance > tolerance {
        kept[index] = true;
        mark_kept(points, first, index, tolerance, kept);
        mark_kept(points, index, last, tolerance, kept);
    }
}

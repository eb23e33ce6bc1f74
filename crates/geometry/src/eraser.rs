//! Eraser geometry
//!
//! Two erase strategies over freehand strokes, chosen by the caller:
//!
//! - [`boolean_erase_path`] converts the target stroke into a ribbon
//!   polygon, subtracts the union of eraser discs, and hands back path
//!   commands for a filled outline (holes as extra closed subpaths).
//!   For committed erases on stroked paths that will be re-rendered as
//!   filled regions.
//! - [`split_polylines_by_discs`] keeps polyline semantics, cutting
//!   segments where they cross disc boundaries. For live preview and
//!   callers that must stay in stroke space.

use crate::clip::{clip_polygons, signed_area, BooleanOp, Ring};
use crate::object::{VectorObject, VectorObjectKind};
use crate::path::{flatten_path, FlattenQuality, PathCommand};
use crate::simplify::simplify_polyline;
use crate::tolerances::{DEFAULT_SIMPLIFY_TOLERANCE, ERASER_DISC_SIDES};
use crate::transform::Point;

/// Result of a boolean erase against a stroked path
#[derive(Debug, Clone, PartialEq)]
pub struct EraseOutcome {
    /// Replacement commands in the same coordinate frame as the input
    /// path's commands. Empty when the stroke was fully consumed.
    pub commands: Vec<PathCommand>,
    /// The result is an area, not a line: the caller must switch the
    /// object from stroked rendering to filled even-odd rendering.
    pub converted_to_outline: bool,
}

/// Ribbon polygon around a polyline: each segment offset by width/2 on
/// both sides, left offsets followed by reversed right offsets.
///
/// No miter or round join refinement at vertices; self-intersecting
/// strokes lean on the boolean clipper's degenerate-input rejection
/// downstream. Returns an empty ring for polylines under 2 points.
pub fn stroke_outline(polyline: &[Point], width: f64) -> Ring {
    if polyline.len() < 2 {
        return Vec::new();
    }
    let half = width / 2.0;
    let mut left: Vec<Point> = Vec::new();
    let mut right: Vec<Point> = Vec::new();
    for seg in polyline.windows(2) {
        let (p, q) = (seg[0], seg[1]);
        let dx = q.x - p.x;
        let dy = q.y - p.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            continue;
        }
        let nx = -dy / len * half;
        let ny = dx / len * half;
        left.push(Point::new(p.x + nx, p.y + ny));
        left.push(Point::new(q.x + nx, q.y + ny));
        right.push(Point::new(p.x - nx, p.y - ny));
        right.push(Point::new(q.x - nx, q.y - ny));
    }
    right.reverse();
    left.extend(right);
    left
}

/// Regular polygon approximating an eraser disc, counter-clockwise
fn disc_ring(center: Point, radius: f64) -> Ring {
    (0..ERASER_DISC_SIDES)
        .map(|i| {
            let theta = std::f64::consts::TAU * i as f64 / ERASER_DISC_SIDES as f64;
            Point::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
            )
        })
        .collect()
}

/// Union all eraser sample discs into as few rings as possible.
///
/// Consecutive samples of one eraser stroke overlap, so the usual
/// result is a single blob; genuinely disjoint clusters stay separate
/// rings.
pub fn union_eraser_discs(centers: &[Point], radius: f64) -> Vec<Ring> {
    let mut rings: Vec<Ring> = Vec::new();
    for center in centers {
        let mut merged = disc_ring(*center, radius);
        let mut kept = Vec::with_capacity(rings.len());
        for ring in rings {
            match clip_polygons(&merged, &ring, BooleanOp::Union) {
                Ok(result) if result.len() == 1 => merged = result.into_iter().next().unwrap(),
                _ => kept.push(ring),
            }
        }
        kept.push(merged);
        rings = kept;
    }
    rings
}

/// Erase parts of a stroked path by boolean subtraction.
///
/// Returns None for objects this strategy cannot erase: non-path
/// kinds, zero-width strokes (filled-only shapes are out of scope for
/// the ribbon conversion), and empty eraser strokes. Eraser points
/// arrive in page space and are mapped into the path's command frame
/// through the object's inverse matrix; non-uniform scale is folded
/// into one effective radius by averaging the axis scales.
pub fn boolean_erase_path(
    object: &VectorObject,
    eraser_points: &[Point],
    eraser_radius: f64,
) -> Option<EraseOutcome> {
    let VectorObjectKind::Path {
        commands,
        path_offset,
    } = &object.kind
    else {
        return None;
    };
    let width = object.stroke.as_ref().map(|s| s.width).unwrap_or(0.0);
    if width <= 0.0 || eraser_points.is_empty() {
        return None;
    }

    let matrix = object.matrix();
    let local_centers: Vec<Point> = eraser_points
        .iter()
        .map(|p| {
            let local = matrix.invert_point(*p);
            Point::new(local.x + path_offset.x, local.y + path_offset.y)
        })
        .collect();
    let scale = matrix.average_scale();
    let radius = if scale > f64::EPSILON {
        eraser_radius / scale
    } else {
        eraser_radius
    };
    let discs = union_eraser_discs(&local_centers, radius);

    let mut material: Vec<Ring> = flatten_path(commands, FlattenQuality::OUTLINE)
        .iter()
        .map(|line| stroke_outline(line, width))
        .filter(|ring| ring.len() >= 3)
        .collect();
    let mut holes: Vec<Ring> = Vec::new();

    for disc in &discs {
        let mut next = Vec::with_capacity(material.len());
        for piece in material {
            match clip_polygons(&piece, disc, BooleanOp::Difference) {
                Ok(rings) => {
                    // Clip output orientation is contractual: outer
                    // pieces counter-clockwise, holes clockwise.
                    for ring in rings {
                        if signed_area(&ring) >= 0.0 {
                            next.push(ring);
                        } else {
                            holes.push(ring);
                        }
                    }
                }
                Err(err) => {
                    tracing::debug!(error = %err, "erase subtraction rejected; keeping piece");
                    next.push(piece);
                }
            }
        }
        material = next;
    }

    let mut out = Vec::new();
    for ring in material.iter().chain(holes.iter()) {
        if let Some(simplified) = simplify_ring(ring) {
            append_ring_commands(&mut out, &simplified);
        }
    }
    Some(EraseOutcome {
        commands: out,
        converted_to_outline: true,
    })
}

fn simplify_ring(ring: &[Point]) -> Option<Ring> {
    if ring.len() < 3 {
        return None;
    }
    let mut closed = ring.to_vec();
    closed.push(closed[0]);
    let mut simplified = simplify_polyline(&closed, DEFAULT_SIMPLIFY_TOLERANCE);
    simplified.pop();
    if simplified.len() < 3 {
        return None;
    }
    Some(simplified)
}

fn append_ring_commands(out: &mut Vec<PathCommand>, ring: &[Point]) {
    let mut points = ring.iter();
    if let Some(first) = points.next() {
        out.push(PathCommand::MoveTo {
            x: first.x,
            y: first.y,
        });
        for p in points {
            out.push(PathCommand::LineTo { x: p.x, y: p.y });
        }
        out.push(PathCommand::Close);
    }
}

/// Cut polylines where they pass through eraser discs, keeping the
/// surviving sub-segments as new polylines.
///
/// Each segment is intersected parametrically with each disc (quadratic
/// formula, roots clamped to [0, 1]); O(segments x discs), fine for
/// interactive strokes, not for batch work.
pub fn split_polylines_by_discs(
    polylines: &[Vec<Point>],
    centers: &[Point],
    radius: f64,
) -> Vec<Vec<Point>> {
    let mut out: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut flush = |current: &mut Vec<Point>, out: &mut Vec<Vec<Point>>| {
        if current.len() >= 2 {
            out.push(std::mem::take(current));
        } else {
            current.clear();
        }
    };

    for line in polylines {
        if line.len() < 2 {
            continue;
        }
        current.push(line[0]);
        for seg in line.windows(2) {
            let (a, b) = (seg[0], seg[1]);
            let erased = merged_erased_intervals(a, b, centers, radius);
            let mut cursor = 0.0;
            for (t0, t1) in erased {
                if t0 > cursor + 1e-9 {
                    if current.is_empty() {
                        current.push(lerp(a, b, cursor));
                    }
                    current.push(lerp(a, b, t0));
                }
                flush(&mut current, &mut out);
                cursor = t1;
            }
            if cursor < 1.0 - 1e-9 {
                if current.is_empty() {
                    current.push(lerp(a, b, cursor));
                }
                current.push(b);
            }
        }
        flush(&mut current, &mut out);
    }
    out
}

fn lerp(a: Point, b: Point, t: f64) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// Sorted, merged [t0, t1] spans of the segment a-b covered by discs
fn merged_erased_intervals(a: Point, b: Point, centers: &[Point], radius: f64) -> Vec<(f64, f64)> {
    let mut intervals: Vec<(f64, f64)> = centers
        .iter()
        .filter_map(|c| segment_disc_interval(a, b, *c, radius))
        .collect();
    intervals.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(std::cmp::Ordering::Equal));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(intervals.len());
    for (t0, t1) in intervals {
        match merged.last_mut() {
            Some(last) if t0 <= last.1 => last.1 = last.1.max(t1),
            _ => merged.push((t0, t1)),
        }
    }
    merged
}

fn segment_disc_interval(a: Point, b: Point, center: Point, radius: f64) -> Option<(f64, f64)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let fx = a.x - center.x;
    let fy = a.y - center.y;
    let qa = dx * dx + dy * dy;
    if qa == 0.0 {
        let inside = fx * fx + fy * fy <= radius * radius;
        return inside.then_some((0.0, 1.0));
    }
    let qb = 2.0 * (fx * dx + fy * dy);
    let qc = fx * fx + fy * fy - radius * radius;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }
    let sqrt = disc.sqrt();
    let t0 = ((-qb - sqrt) / (2.0 * qa)).max(0.0);
    let t1 = ((-qb + sqrt) / (2.0 * qa)).min(1.0);
    (t0 < t1).then_some((t0, t1))
}

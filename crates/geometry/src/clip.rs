//! Polygon boolean clipping primitive
//!
//! Greiner-Hormann style union/intersection/difference over simple
//! polygons. Inputs are closed rings; winding is normalized to
//! counter-clockwise internally. Output rings are oriented by role:
//! counter-clockwise rings are outer boundaries, clockwise rings are
//! holes.
//!
//! Degenerate configurations (touching vertices, collinear overlapping
//! edges) are retried with a nudged subject; configurations that stay
//! degenerate, and self-intersections that confuse the traversal,
//! surface as [`ClipError`] so call sites can degrade to an "unchanged"
//! result instead of producing garbage geometry.

use crate::bounds::Bounds;
use crate::tolerances::{AREA_EPSILON, CLIP_EPSILON};
use crate::transform::Point;

/// A closed polygon ring; the closing edge from last back to first
/// point is implicit.
pub type Ring = Vec<Point>;

/// Boolean operator over two rings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Intersection,
    /// Subject minus clip
    Difference,
}

/// Failures of the clipping primitive
#[derive(Debug, thiserror::Error)]
pub enum ClipError {
    #[error("polygon has fewer than 3 distinct vertices")]
    DegenerateInput,
    #[error("polygons touch at a vertex or share a collinear edge")]
    DegenerateIntersection,
    #[error("clip traversal failed to terminate")]
    TraversalStuck,
}

/// Twice-signed shoelace sum halved: positive for counter-clockwise
/// rings in a Y-down coordinate system where "counter-clockwise" means
/// mathematically positive traversal of (x, y) pairs.
pub fn signed_area(ring: &[Point]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let p = ring[i];
        let q = ring[(i + 1) % n];
        sum += p.x * q.y - q.x * p.y;
    }
    sum / 2.0
}

/// Normalize a ring to counter-clockwise (positive signed area).
pub fn ensure_ccw(ring: &mut Ring) {
    if signed_area(ring) < 0.0 {
        ring.reverse();
    }
}

/// Even-odd point containment against a single ring.
pub fn point_in_ring(point: Point, ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = ring[i];
        let pj = ring[j];
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Axis-aligned bounds of a ring
pub fn ring_bounds(ring: &[Point]) -> Option<Bounds> {
    Bounds::from_points(ring)
}

const NO_LINK: usize = usize::MAX;

struct Node {
    point: Point,
    next: usize,
    prev: usize,
    neighbor: usize,
    intersection: bool,
    entry: bool,
    visited: bool,
}

impl Node {
    fn vertex(point: Point) -> Self {
        Node {
            point,
            next: NO_LINK,
            prev: NO_LINK,
            neighbor: NO_LINK,
            intersection: false,
            entry: false,
            visited: false,
        }
    }
}

/// Drop duplicate consecutive points and an explicit closing point.
fn sanitize(ring: &[Point]) -> Result<Ring, ClipError> {
    let mut out: Ring = Vec::with_capacity(ring.len());
    for &p in ring {
        if out.last().map(|q| p.distance_to(q) < 1e-12) != Some(true) {
            out.push(p);
        }
    }
    if out.len() > 1 && out.first().map(|q| out.last().unwrap().distance_to(q) < 1e-12) == Some(true)
    {
        out.pop();
    }
    if out.len() < 3 || signed_area(&out).abs() < AREA_EPSILON {
        return Err(ClipError::DegenerateInput);
    }
    ensure_ccw(&mut out);
    Ok(out)
}

/// Intersection of two edges in parametric form.
///
/// Returns the parameters along each edge and the intersection point for
/// a proper crossing; `None` when the edges miss each other; an error
/// when they touch at an endpoint or overlap collinearly, which the
/// traversal cannot handle.
fn edge_intersection(
    p1: Point,
    p2: Point,
    q1: Point,
    q2: Point,
) -> Result<Option<(f64, f64, Point)>, ClipError> {
    let dpx = p2.x - p1.x;
    let dpy = p2.y - p1.y;
    let dqx = q2.x - q1.x;
    let dqy = q2.y - q1.y;
    let den = dpx * dqy - dpy * dqx;

    if den.abs() < 1e-12 {
        // Parallel: collinear overlap is degenerate, otherwise no hit.
        let cross = (q1.x - p1.x) * dpy - (q1.y - p1.y) * dpx;
        let len_sq = dpx * dpx + dpy * dpy;
        if cross.abs() < 1e-9 && len_sq > 0.0 {
            let t0 = ((q1.x - p1.x) * dpx + (q1.y - p1.y) * dpy) / len_sq;
            let t1 = ((q2.x - p1.x) * dpx + (q2.y - p1.y) * dpy) / len_sq;
            let lo = t0.min(t1);
            let hi = t0.max(t1);
            if lo < 1.0 - CLIP_EPSILON && hi > CLIP_EPSILON {
                return Err(ClipError::DegenerateIntersection);
            }
        }
        return Ok(None);
    }

    let t = ((q1.x - p1.x) * dqy - (q1.y - p1.y) * dqx) / den;
    let u = ((q1.x - p1.x) * dpy - (q1.y - p1.y) * dpx) / den;

    let interior = |v: f64| v > CLIP_EPSILON && v < 1.0 - CLIP_EPSILON;
    let touching = |v: f64| v >= -CLIP_EPSILON && v <= 1.0 + CLIP_EPSILON;

    if interior(t) && interior(u) {
        let point = Point::new(p1.x + t * dpx, p1.y + t * dpy);
        Ok(Some((t, u, point)))
    } else if touching(t) && touching(u) {
        // Both parameters are on their edges but at least one sits on an
        // endpoint: vertex-touching input.
        Err(ClipError::DegenerateIntersection)
    } else {
        Ok(None)
    }
}

/// Shrink-and-rotate nudges applied to the subject about its centroid
/// when a degenerate configuration is detected. Shrink factors only:
/// growing the subject could give merely-touching inputs an overlap
/// they never had.
const PERTURBATIONS: [(f64, f64); 3] = [
    (1.0 - 1e-9, 0.0),
    (1.0 - 1e-9, 1e-9),
    (1.0 - 3e-9, -2e-9),
];

/// Clip one polygon against another.
///
/// Both rings are treated as simple polygons. The result is a list of
/// rings: counter-clockwise rings are outer boundaries, clockwise rings
/// are holes inside the preceding geometry. Non-intersecting inputs are
/// resolved by containment tests.
///
/// Degenerate configurations (touching vertices, collinear overlapping
/// edges) are retried with the subject nudged inward by a relative
/// epsilon; axis-aligned shapes sharing an edge line are routine input,
/// not an error. The error surfaces only when every retry stays
/// degenerate.
pub fn clip_polygons(
    subject: &[Point],
    clip: &[Point],
    op: BooleanOp,
) -> Result<Vec<Ring>, ClipError> {
    match clip_rings(subject, clip, op) {
        Err(ClipError::DegenerateIntersection) => {}
        other => return other,
    }
    let center = centroid(subject);
    for (scale, angle) in PERTURBATIONS {
        let nudged = perturb(subject, center, scale, angle);
        match clip_rings(&nudged, clip, op) {
            Err(ClipError::DegenerateIntersection) => continue,
            other => return other,
        }
    }
    Err(ClipError::DegenerateIntersection)
}

fn centroid(ring: &[Point]) -> Point {
    let n = ring.len().max(1) as f64;
    let (sx, sy) = ring
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

fn perturb(ring: &[Point], center: Point, scale: f64, angle: f64) -> Ring {
    let (sin, cos) = angle.sin_cos();
    ring.iter()
        .map(|p| {
            let dx = (p.x - center.x) * scale;
            let dy = (p.y - center.y) * scale;
            Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
        })
        .collect()
}

fn clip_rings(subject: &[Point], clip: &[Point], op: BooleanOp) -> Result<Vec<Ring>, ClipError> {
    let subject = sanitize(subject)?;
    let clip = sanitize(clip)?;

    let mut nodes: Vec<Node> = Vec::with_capacity(subject.len() + clip.len() + 8);
    let subject_head = build_ring(&mut nodes, &subject);
    let clip_head = build_ring(&mut nodes, &clip);

    // Collect pairwise edge intersections, then splice them into both
    // rings ordered by their parameter along each edge.
    let mut subject_hits: Vec<(usize, f64, usize)> = Vec::new(); // (edge start node, alpha, node)
    let mut clip_hits: Vec<(usize, f64, usize)> = Vec::new();

    let subject_nodes = ring_nodes(&nodes, subject_head);
    let clip_nodes = ring_nodes(&nodes, clip_head);

    for (si, &s_node) in subject_nodes.iter().enumerate() {
        let s1 = nodes[s_node].point;
        let s2 = nodes[subject_nodes[(si + 1) % subject_nodes.len()]].point;
        for (ci, &c_node) in clip_nodes.iter().enumerate() {
            let c1 = nodes[c_node].point;
            let c2 = nodes[clip_nodes[(ci + 1) % clip_nodes.len()]].point;
            if let Some((t, u, point)) = edge_intersection(s1, s2, c1, c2)? {
                let s_new = nodes.len();
                nodes.push(Node {
                    intersection: true,
                    neighbor: s_new + 1,
                    ..Node::vertex(point)
                });
                nodes.push(Node {
                    intersection: true,
                    neighbor: s_new,
                    ..Node::vertex(point)
                });
                subject_hits.push((s_node, t, s_new));
                clip_hits.push((c_node, u, s_new + 1));
            }
        }
    }

    if subject_hits.is_empty() {
        return Ok(resolve_containment(&subject, &clip, op));
    }

    splice(&mut nodes, &mut subject_hits);
    splice(&mut nodes, &mut clip_hits);

    mark_entries(&mut nodes, subject_head, &clip);
    mark_entries(&mut nodes, clip_head, &subject);

    // Operator-specific flag inversion: union flips both sides,
    // difference flips the subject side only.
    match op {
        BooleanOp::Intersection => {}
        BooleanOp::Union => {
            flip_entries(&mut nodes, subject_head);
            flip_entries(&mut nodes, clip_head);
        }
        BooleanOp::Difference => {
            flip_entries(&mut nodes, subject_head);
        }
    }

    traverse(&mut nodes)
}

fn build_ring(nodes: &mut Vec<Node>, ring: &[Point]) -> usize {
    let base = nodes.len();
    let n = ring.len();
    for (i, &p) in ring.iter().enumerate() {
        let mut node = Node::vertex(p);
        node.next = base + (i + 1) % n;
        node.prev = base + (i + n - 1) % n;
        nodes.push(node);
    }
    base
}

fn ring_nodes(nodes: &[Node], head: usize) -> Vec<usize> {
    let mut out = vec![head];
    let mut current = nodes[head].next;
    while current != head {
        out.push(current);
        current = nodes[current].next;
    }
    out
}

/// Insert intersection nodes after their edge's start node, ordered by
/// parameter.
fn splice(nodes: &mut Vec<Node>, hits: &mut [(usize, f64, usize)]) {
    hits.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    });
    let mut i = 0;
    while i < hits.len() {
        let edge_start = hits[i].0;
        let mut insert_after = edge_start;
        while i < hits.len() && hits[i].0 == edge_start {
            let node = hits[i].2;
            let after_next = nodes[insert_after].next;
            nodes[node].prev = insert_after;
            nodes[node].next = after_next;
            nodes[insert_after].next = node;
            nodes[after_next].prev = node;
            insert_after = node;
            i += 1;
        }
    }
}

/// Walk a ring from its head, alternating entry/exit flags starting
/// from whether the head vertex lies inside the other polygon.
fn mark_entries(nodes: &mut [Node], head: usize, other: &[Point]) {
    let mut inside = point_in_ring(nodes[head].point, other);
    let mut current = nodes[head].next;
    loop {
        if nodes[current].intersection {
            nodes[current].entry = !inside;
            inside = !inside;
        }
        if current == head {
            break;
        }
        current = nodes[current].next;
    }
}

fn flip_entries(nodes: &mut [Node], head: usize) {
    let mut current = head;
    loop {
        if nodes[current].intersection {
            nodes[current].entry = !nodes[current].entry;
        }
        current = nodes[current].next;
        if current == head {
            break;
        }
    }
}

fn traverse(nodes: &mut [Node]) -> Result<Vec<Ring>, ClipError> {
    let limit = nodes.len() * 8 + 64;
    let mut rings: Vec<Ring> = Vec::new();

    loop {
        let Some(start) = nodes
            .iter()
            .position(|n| n.intersection && !n.visited)
        else {
            break;
        };
        let start_twin = nodes[start].neighbor;
        let mut ring: Ring = vec![nodes[start].point];
        let mut current = start;
        nodes[start].visited = true;
        nodes[start_twin].visited = true;

        let mut steps = 0;
        loop {
            steps += 1;
            if steps > limit {
                return Err(ClipError::TraversalStuck);
            }
            if nodes[current].entry {
                loop {
                    current = nodes[current].next;
                    ring.push(nodes[current].point);
                    if nodes[current].intersection {
                        break;
                    }
                }
            } else {
                loop {
                    current = nodes[current].prev;
                    ring.push(nodes[current].point);
                    if nodes[current].intersection {
                        break;
                    }
                }
            }
            nodes[current].visited = true;
            let twin = nodes[current].neighbor;
            nodes[twin].visited = true;
            current = twin;
            if current == start || current == start_twin {
                break;
            }
        }

        while ring.len() > 1
            && ring.first().map(|f| ring.last().unwrap().distance_to(f) < 1e-9) == Some(true)
        {
            ring.pop();
        }
        if signed_area(&ring).abs() > AREA_EPSILON {
            rings.push(ring);
        }
    }
    orient_rings(&mut rings);
    Ok(rings)
}

/// Enforce the output orientation contract: outer rings
/// counter-clockwise, holes clockwise. The traversal emits rings in
/// whatever direction the walk happened to run, so classify each ring
/// by its containment depth among the others and reorient.
fn orient_rings(rings: &mut [Ring]) {
    let depths: Vec<usize> = (0..rings.len())
        .map(|i| {
            let sample = rings[i][0];
            rings
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && point_in_ring(sample, other))
                .count()
        })
        .collect();
    for (ring, depth) in rings.iter_mut().zip(depths) {
        let ccw = signed_area(ring) >= 0.0;
        if (depth % 2 == 0) != ccw {
            ring.reverse();
        }
    }
}

/// Resolve a boolean over polygons with no edge crossings: one is
/// either inside the other or they are disjoint.
fn resolve_containment(subject: &Ring, clip: &Ring, op: BooleanOp) -> Vec<Ring> {
    let subject_in_clip = point_in_ring(subject[0], clip);
    let clip_in_subject = point_in_ring(clip[0], subject);
    match op {
        BooleanOp::Intersection => {
            if subject_in_clip {
                vec![subject.clone()]
            } else if clip_in_subject {
                vec![clip.clone()]
            } else {
                Vec::new()
            }
        }
        BooleanOp::Union => {
            if subject_in_clip {
                vec![clip.clone()]
            } else if clip_in_subject {
                vec![subject.clone()]
            } else {
                vec![subject.clone(), clip.clone()]
            }
        }
        BooleanOp::Difference => {
            if subject_in_clip {
                Vec::new()
            } else if clip_in_subject {
                // Clip punches a hole: emit it clockwise after the
                // outer ring.
                let mut hole = clip.clone();
                hole.reverse();
                vec![subject.clone(), hole]
            } else {
                vec![subject.clone()]
            }
        }
    }
}

//! Survey region algebra
//!
//! Regions are named, closed polygonal areas tagging part of a page.
//! Additive regions define coverage; subtractive regions carve holes
//! out of it. A region set always collapses to a minimal additive set
//! before containment queries or rendering; subtractive regions never
//! appear in resolved output, only their effect does.
//!
//! Regions are flat rings and cannot carry holes. Where a difference
//! produces a hole, the hole is stitched into its outer ring with a
//! keyhole bridge so the result stays representable.

use crate::bounds::Bounds;
use crate::clip::{clip_polygons, ensure_ccw, point_in_ring, ring_bounds, signed_area, BooleanOp, Ring};
use crate::tolerances::{AREA_EPSILON, MERGE_PASS_CAP};
use crate::transform::Point;

/// Unique identifier for a region
pub type RegionId = uuid::Uuid;

/// How a region was drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RegionShapeType {
    Rectangular,
    Polygon,
}

/// Whether a region adds to or subtracts from page coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RegionOperation {
    Add,
    Subtract,
}

/// A named, closed polygonal area in page-local units.
///
/// `coordinates` is a flat alternating x,y sequence, implicitly closed;
/// a repeated first point is tolerated on input and never produced on
/// output.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: Option<String>,
    pub shape_type: RegionShapeType,
    pub coordinates: Vec<f64>,
    pub operation: RegionOperation,
}

impl Region {
    /// Create a new region with a generated id
    pub fn new(
        shape_type: RegionShapeType,
        coordinates: Vec<f64>,
        operation: RegionOperation,
    ) -> Self {
        Self {
            id: RegionId::new_v4(),
            name: None,
            shape_type,
            coordinates,
            operation,
        }
    }

    /// Axis-aligned rectangular region between two corners
    pub fn rectangular(x1: f64, y1: f64, x2: f64, y2: f64, operation: RegionOperation) -> Self {
        let b = Bounds::new(x1, y1, x2, y2);
        Self::new(
            RegionShapeType::Rectangular,
            vec![
                b.min_x, b.min_y, b.max_x, b.min_y, b.max_x, b.max_y, b.min_x, b.max_y,
            ],
            operation,
        )
    }

    /// Closed ring normalized to counter-clockwise winding.
    ///
    /// Returns None for malformed coordinate lists (odd length or fewer
    /// than 3 distinct vertices) so callers can skip the region.
    pub fn ring(&self) -> Option<Ring> {
        if self.coordinates.len() % 2 != 0 {
            return None;
        }
        let mut ring: Ring = self
            .coordinates
            .chunks_exact(2)
            .map(|xy| Point::new(xy[0], xy[1]))
            .collect();
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return None;
        }
        ensure_ccw(&mut ring);
        Some(ring)
    }

    /// Rebuild a region from a ring, dropping a duplicated closing point
    fn from_ring(ring: &[Point], template: &Region) -> Region {
        let mut ring = ring.to_vec();
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        let mut coordinates = Vec::with_capacity(ring.len() * 2);
        for p in &ring {
            coordinates.push(p.x);
            coordinates.push(p.y);
        }
        Region {
            id: RegionId::new_v4(),
            name: template.name.clone(),
            shape_type: infer_shape_type(&ring),
            coordinates,
            operation: template.operation,
        }
    }

    /// Bounding box, None for malformed regions
    pub fn bounds(&self) -> Option<Bounds> {
        self.ring().and_then(|r| ring_bounds(&r))
    }

    /// Enclosed area in square page units
    pub fn area(&self) -> f64 {
        self.ring().map(|r| signed_area(&r).abs()).unwrap_or(0.0)
    }

    /// Even-odd point containment
    pub fn contains_point(&self, point: Point) -> bool {
        self.ring().map(|r| point_in_ring(point, &r)).unwrap_or(false)
    }
}

fn infer_shape_type(ring: &[Point]) -> RegionShapeType {
    if ring.len() == 4 {
        let axis_aligned = (0..4).all(|i| {
            let p = ring[i];
            let q = ring[(i + 1) % 4];
            p.x == q.x || p.y == q.y
        });
        if axis_aligned {
            return RegionShapeType::Rectangular;
        }
    }
    RegionShapeType::Polygon
}

/// Merge two regions into one when they overlap.
///
/// Only attempted for regions with the same operation tag. Returns None
/// when they do not geometrically overlap (bounding-box fast path
/// first), when the union does not collapse to exactly one ring
/// (disjoint or merely touching shapes stay separate), or when the
/// clipping primitive rejects the input.
pub fn merge_regions(a: &Region, b: &Region) -> Option<Region> {
    if a.operation != b.operation {
        return None;
    }
    let ring_a = a.ring()?;
    let ring_b = b.ring()?;
    let bounds_a = ring_bounds(&ring_a)?;
    let bounds_b = ring_bounds(&ring_b)?;
    if !bounds_a.intersects(&bounds_b) {
        return None;
    }
    let rings = match clip_polygons(&ring_a, &ring_b, BooleanOp::Union) {
        Ok(rings) => rings,
        Err(err) => {
            tracing::debug!(error = %err, "region union rejected; leaving regions separate");
            return None;
        }
    };
    if rings.len() != 1 {
        return None;
    }
    let mut merged = Region::from_ring(&rings[0], a);
    merged.id = a.id;
    if merged.name.is_none() {
        merged.name = b.name.clone();
    }
    Some(merged)
}

/// Subtract `cut` from `subject`.
///
/// Returns `[subject]` unchanged when there is no overlap or the
/// clipping primitive fails, `[]` when the subject is fully consumed,
/// and otherwise one region per resulting ring; a difference can split
/// one region into several disjoint pieces. Holes are keyhole-bridged
/// into their outer ring.
pub fn subtract_region(subject: &Region, cut: &Region) -> Vec<Region> {
    let unchanged = || vec![subject.clone()];

    let (Some(subject_ring), Some(cut_ring)) = (subject.ring(), cut.ring()) else {
        return unchanged();
    };
    let (Some(bounds_s), Some(bounds_c)) = (ring_bounds(&subject_ring), ring_bounds(&cut_ring))
    else {
        return unchanged();
    };
    if !bounds_s.intersects(&bounds_c) {
        return unchanged();
    }

    let rings = match clip_polygons(&subject_ring, &cut_ring, BooleanOp::Difference) {
        Ok(rings) => rings,
        Err(err) => {
            tracing::debug!(error = %err, "region subtraction rejected; leaving subject unchanged");
            return unchanged();
        }
    };
    if rings.is_empty() {
        return Vec::new();
    }
    let subject_area = signed_area(&subject_ring).abs();
    if rings.len() == 1 {
        // A lone result ring with the subject's area means the cut only
        // grazed it. Compared with a relative tolerance because a
        // degenerate-retry inside the clipper can shift coordinates by
        // a relative epsilon.
        let area = signed_area(&rings[0]).abs();
        if (area - subject_area).abs() <= subject_area * 1e-6 + AREA_EPSILON {
            return unchanged();
        }
    }

    let flattened = attach_holes(rings);
    let mut out: Vec<Region> = flattened
        .iter()
        .map(|ring| Region::from_ring(ring, subject))
        .collect();
    if let Some(first) = out.first_mut() {
        first.id = subject.id;
    }
    out
}

/// Stitch clockwise hole rings into the counter-clockwise outer ring
/// that contains them.
fn attach_holes(rings: Vec<Ring>) -> Vec<Ring> {
    let (outers, holes): (Vec<Ring>, Vec<Ring>) =
        rings.into_iter().partition(|r| signed_area(r) >= 0.0);
    let mut out = outers;
    for hole in holes {
        if let Some(probe) = hole.first() {
            if let Some(outer) = out.iter_mut().find(|o| point_in_ring(*probe, o)) {
                *outer = bridge_hole(outer, &hole);
            }
        }
    }
    out
}

/// Connect a hole to its outer ring with a zero-width keyhole bridge at
/// the hole's rightmost vertex, producing a single flat ring whose
/// even-odd interior matches outer-minus-hole.
fn bridge_hole(outer: &Ring, hole: &Ring) -> Ring {
    let mut hole = hole.to_vec();
    // The stitched hole loop must run opposite to the outer ring.
    if signed_area(&hole) > 0.0 {
        hole.reverse();
    }
    let m = hole.len();
    let k = hole
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.x.partial_cmp(&b.1.x).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let h = hole[k];

    // Nearest outer edge crossed by the rightward horizontal ray from h.
    let n = outer.len();
    let mut best: Option<(usize, Point)> = None;
    for i in 0..n {
        let a = outer[i];
        let b = outer[(i + 1) % n];
        if (a.y > h.y) != (b.y > h.y) {
            let x = a.x + (h.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if x >= h.x && best.map(|(_, p)| x < p.x) != Some(false) {
                best = Some((i, Point::new(x, h.y)));
            }
        }
    }
    let Some((edge, bridge)) = best else {
        return outer.clone();
    };

    let mut out: Ring = Vec::with_capacity(n + m + 4);
    out.extend_from_slice(&outer[..=edge]);
    out.push(bridge);
    for j in 0..m {
        out.push(hole[(k + j) % m]);
    }
    out.push(h);
    out.push(bridge);
    out.extend_from_slice(&outer[edge + 1..]);
    out
}

/// Collapse a region set to its minimal additive form.
///
/// Pairwise-merges additive regions until no pair merges, then applies
/// every subtractive region against the additive set, re-merging after
/// each subtraction since splitting can create new adjacencies. The
/// output contains only resolved additive regions.
pub fn merge_overlapping_regions(regions: &[Region]) -> Vec<Region> {
    let (additive, subtractive): (Vec<Region>, Vec<Region>) = regions
        .iter()
        .cloned()
        .partition(|r| r.operation == RegionOperation::Add);

    let mut resolved = merge_to_fixpoint(additive);
    for cut in &subtractive {
        resolved = resolved
            .iter()
            .flat_map(|subject| subtract_region(subject, cut))
            .collect();
        resolved = merge_to_fixpoint(resolved);
    }
    resolved
}

fn merge_to_fixpoint(mut regions: Vec<Region>) -> Vec<Region> {
    let mut passes = 0;
    loop {
        passes += 1;
        if passes > MERGE_PASS_CAP {
            tracing::warn!(
                passes,
                regions = regions.len(),
                "region merge pass cap reached; returning partially merged set"
            );
            break;
        }
        let mut merged_any = false;
        'scan: for i in 0..regions.len() {
            for j in (i + 1)..regions.len() {
                if let Some(merged) = merge_regions(&regions[i], &regions[j]) {
                    regions.swap_remove(j);
                    regions[i] = merged;
                    merged_any = true;
                    break 'scan;
                }
            }
        }
        if !merged_any {
            break;
        }
    }
    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_rect(x1: f64, y1: f64, x2: f64, y2: f64) -> Region {
        Region::rectangular(x1, y1, x2, y2, RegionOperation::Add)
    }

    #[test]
    fn test_ring_normalizes_winding() {
        // Clockwise coordinate order.
        let region = Region::new(
            RegionShapeType::Polygon,
            vec![0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0, 0.0],
            RegionOperation::Add,
        );
        let ring = region.ring().unwrap();
        assert!(signed_area(&ring) > 0.0);
    }

    #[test]
    fn test_winding_idempotent_through_round_trip() {
        let region = Region::new(
            RegionShapeType::Polygon,
            vec![0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0, 0.0],
            RegionOperation::Add,
        );
        let ring = region.ring().unwrap();
        let rebuilt = Region::from_ring(&ring, &region);
        let ring2 = rebuilt.ring().unwrap();
        assert_eq!(signed_area(&ring).signum(), signed_area(&ring2).signum());
        assert!((signed_area(&ring) - signed_area(&ring2)).abs() < 1e-9);
    }

    #[test]
    fn test_ring_drops_duplicated_closing_point() {
        let region = Region::new(
            RegionShapeType::Polygon,
            vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 0.0],
            RegionOperation::Add,
        );
        assert_eq!(region.ring().unwrap().len(), 3);
    }

    #[test]
    fn test_malformed_region_has_no_ring() {
        let odd = Region::new(
            RegionShapeType::Polygon,
            vec![0.0, 0.0, 10.0],
            RegionOperation::Add,
        );
        assert!(odd.ring().is_none());
        let two_points = Region::new(
            RegionShapeType::Polygon,
            vec![0.0, 0.0, 10.0, 0.0],
            RegionOperation::Add,
        );
        assert!(two_points.ring().is_none());
    }

    #[test]
    fn test_merge_overlapping() {
        let a = add_rect(0.0, 0.0, 10.0, 10.0);
        let b = add_rect(5.0, 5.0, 15.0, 15.0);
        let merged = merge_regions(&a, &b).unwrap();
        assert!((merged.area() - 175.0).abs() < 1e-9);
        assert_eq!(merged.operation, RegionOperation::Add);
        assert_eq!(merged.id, a.id);
    }

    #[test]
    fn test_merge_same_height_rects() {
        // Overlapping rects whose top and bottom edges are collinear.
        let a = add_rect(0.0, 0.0, 10.0, 10.0);
        let b = add_rect(5.0, 0.0, 15.0, 10.0);
        let merged = merge_regions(&a, &b).unwrap();
        assert!((merged.area() - 150.0).abs() < 1e-5);
        assert!(merged.contains_point(Point::new(12.0, 5.0)));
        assert!(merged.contains_point(Point::new(2.0, 5.0)));
    }

    #[test]
    fn test_merge_symmetry() {
        let a = add_rect(0.0, 0.0, 10.0, 10.0);
        let b = add_rect(5.0, 5.0, 15.0, 15.0);
        let ab = merge_regions(&a, &b).unwrap();
        let ba = merge_regions(&b, &a).unwrap();
        assert!((ab.area() - ba.area()).abs() < 1e-9);
        // Same containment over a sample grid.
        for x in 0..16 {
            for y in 0..16 {
                let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                assert_eq!(ab.contains_point(p), ba.contains_point(p));
            }
        }
    }

    #[test]
    fn test_merge_rejects_disjoint_and_mismatched() {
        let a = add_rect(0.0, 0.0, 10.0, 10.0);
        let far = add_rect(100.0, 100.0, 110.0, 110.0);
        assert!(merge_regions(&a, &far).is_none());

        let touching = add_rect(10.0, 0.0, 20.0, 10.0);
        assert!(merge_regions(&a, &touching).is_none());

        let cut = Region::rectangular(5.0, 5.0, 15.0, 15.0, RegionOperation::Subtract);
        assert!(merge_regions(&a, &cut).is_none());
    }

    #[test]
    fn test_subtract_no_overlap_unchanged() {
        let a = add_rect(0.0, 0.0, 10.0, 10.0);
        let cut = Region::rectangular(50.0, 50.0, 60.0, 60.0, RegionOperation::Subtract);
        let result = subtract_region(&a, &cut);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0], a);
    }

    #[test]
    fn test_subtract_full_consumption() {
        let a = add_rect(5.0, 5.0, 10.0, 10.0);
        let cut = Region::rectangular(0.0, 0.0, 20.0, 20.0, RegionOperation::Subtract);
        assert!(subtract_region(&a, &cut).is_empty());
    }

    #[test]
    fn test_subtract_splits_into_pieces() {
        let a = add_rect(0.0, 0.0, 30.0, 10.0);
        let cut = Region::rectangular(10.0, -5.0, 20.0, 15.0, RegionOperation::Subtract);
        let result = subtract_region(&a, &cut);
        assert_eq!(result.len(), 2);
        let total: f64 = result.iter().map(|r| r.area()).sum();
        assert!((total - 200.0).abs() < 1e-9);
        // First piece keeps the subject's identity.
        assert_eq!(result[0].id, a.id);
        assert_ne!(result[1].id, a.id);
    }

    #[test]
    fn test_subtract_contained_cut_keyholes() {
        let a = add_rect(0.0, 0.0, 20.0, 20.0);
        let cut = Region::rectangular(5.0, 5.0, 10.0, 10.0, RegionOperation::Subtract);
        let result = subtract_region(&a, &cut);
        assert_eq!(result.len(), 1);
        assert!((result[0].area() - 375.0).abs() < 1e-6);
        // Inside the carved hole: no longer contained.
        assert!(!result[0].contains_point(Point::new(7.0, 7.0)));
        // Material around the hole still contained.
        assert!(result[0].contains_point(Point::new(2.0, 2.0)));
        assert!(result[0].contains_point(Point::new(15.0, 15.0)));
    }

    #[test]
    fn test_subtract_union_covers_original() {
        let a = add_rect(0.0, 0.0, 20.0, 10.0);
        let cut = Region::rectangular(8.0, -2.0, 12.0, 12.0, RegionOperation::Subtract);
        let pieces = subtract_region(&a, &cut);
        // Every sample point of A is either in a remainder piece or in
        // the cut itself.
        for x in 0..40 {
            for y in 0..20 {
                let p = Point::new(x as f64 / 2.0 + 0.25, y as f64 / 2.0 + 0.25);
                if a.contains_point(p) {
                    let covered =
                        pieces.iter().any(|r| r.contains_point(p)) || cut.contains_point(p);
                    assert!(covered, "point {:?} lost by subtract", p);
                }
            }
        }
    }

    #[test]
    fn test_merge_overlapping_regions_resolves_additive_only() {
        let regions = vec![
            add_rect(0.0, 0.0, 10.0, 10.0),
            add_rect(5.0, 0.0, 15.0, 10.0),
            Region::rectangular(2.0, 2.0, 4.0, 4.0, RegionOperation::Subtract),
        ];
        let resolved = merge_overlapping_regions(&regions);
        assert_eq!(resolved.len(), 1);
        assert!(resolved
            .iter()
            .all(|r| r.operation == RegionOperation::Add));
        // Union area 150 minus the 4-unit cut.
        assert!((resolved[0].area() - 146.0).abs() < 1e-6);
        assert!(!resolved[0].contains_point(Point::new(3.0, 3.0)));
        assert!(resolved[0].contains_point(Point::new(12.0, 5.0)));
    }

    #[test]
    fn test_merge_overlapping_regions_chain() {
        // Three rects where the middle one bridges the outer two; one
        // pairwise pass is not enough, the fixpoint loop is.
        let regions = vec![
            add_rect(0.0, 0.0, 10.0, 10.0),
            add_rect(20.0, 0.0, 30.0, 10.0),
            add_rect(8.0, 0.0, 22.0, 10.0),
        ];
        let resolved = merge_overlapping_regions(&regions);
        assert_eq!(resolved.len(), 1);
        assert!((resolved[0].area() - 300.0).abs() < 1e-5);
    }

    #[test]
    fn test_rectangular_shape_type_inference() {
        let a = add_rect(0.0, 0.0, 10.0, 10.0);
        let b = add_rect(5.0, 5.0, 15.0, 15.0);
        let merged = merge_regions(&a, &b).unwrap();
        // An L-shaped union is no longer rectangular.
        assert_eq!(merged.shape_type, RegionShapeType::Polygon);
    }
}

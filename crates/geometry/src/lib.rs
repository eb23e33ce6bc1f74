//! Vector annotation geometry engine
//!
//! Affine transforms, path flattening, hit-testing, polygon boolean
//! algebra, region algebra, and eraser geometry for page-space vector
//! annotations. Everything here is synchronous, CPU-bound, and pure:
//! callers own the objects and replace geometry with function output.

pub mod bounds;
pub mod clip;
pub mod eraser;
pub mod handles;
pub mod object;
pub mod path;
pub mod region;
pub mod simplify;
pub mod tolerances;
pub mod transform;

pub use bounds::{object_bounds, Bounds};
pub use clip::{clip_polygons, signed_area, BooleanOp, ClipError, Ring};
pub use eraser::{
    boolean_erase_path, split_polylines_by_discs, stroke_outline, union_eraser_discs, EraseOutcome,
};
pub use handles::{generate_handles, HandleType, SelectionHandle};
pub use hit_test::{
    hit_test_point, is_point_on_object, object_fully_in_rect, rect_intersects_object,
    HitTestResult,
};
pub use object::{
    Color, ObjectTransform, Origin, Provenance, Stroke, VectorObject, VectorObjectCollection,
    VectorObjectId, VectorObjectKind,
};
pub use path::{flatten_path, path_endpoints, FlattenQuality, PathCommand};
pub use region::{
    merge_overlapping_regions, merge_regions, subtract_region, Region, RegionId, RegionOperation,
    RegionShapeType,
};
pub use simplify::simplify_polyline;
pub use transform::{Matrix, Point};

//! Named numeric tolerances shared across the geometry engine
//!
//! Every threshold used by more than one module lives here with its unit
//! documented, so tests can assert against the same constants the engine
//! uses instead of duplicating literals.

/// Below this absolute determinant a transform matrix is treated as
/// degenerate and point inversion falls back to the identity mapping.
/// Unitless (product of scale factors).
pub const DETERMINANT_EPSILON: f64 = 1e-10;

/// Default hit-test tolerance in page units (PDF points, 1/72 inch).
pub const DEFAULT_HIT_TOLERANCE: f64 = 3.0;

/// Stroke width assumed for objects with neither stroke nor fill, so
/// fully transparent objects remain selectable. Page units.
pub const MIN_ASSUMED_STROKE_WIDTH: f64 = 2.0;

/// Intersection parameters within this distance of a segment endpoint are
/// treated as degenerate by the polygon clipper. Unitless (parametric).
pub const CLIP_EPSILON: f64 = 1e-9;

/// Rings with absolute area below this are discarded as degenerate.
/// Square page units.
pub const AREA_EPSILON: f64 = 1e-7;

/// Number of sides used when approximating an eraser disc as a regular
/// polygon. Sixteen keeps the radial error under 2% of the radius.
pub const ERASER_DISC_SIDES: usize = 16;

/// Upper bound on fixpoint passes when merging overlapping regions.
/// Hitting the cap logs a warning and returns the partial result.
pub const MERGE_PASS_CAP: usize = 64;

/// Default Douglas-Peucker tolerance for polygons produced by boolean
/// operations. Page units.
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.25;

//! Selection handles
//!
//! Small control points rendered on a selected object for moving,
//! resizing, and rotating. Handle placement works off the object's
//! true page-space bounds, so rotated and curved shapes get handles
//! hugging their actual geometry.

use crate::bounds::object_bounds;
use crate::object::{VectorObject, VectorObjectId, VectorObjectKind};
use crate::transform::Point;

/// Distance of the rotation handle above the selection, page units
const ROTATE_HANDLE_OFFSET: f64 = 30.0;

/// Type of selection handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleType {
    /// Corner handles for resizing
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,

    /// Edge handles for resizing in one dimension
    Top,
    Bottom,
    Left,
    Right,

    /// Rotation handle above the selection
    Rotate,

    /// Move handle
    Move,
}

/// Selection handle with position and type
#[derive(Debug, Clone, Copy)]
pub struct SelectionHandle {
    pub handle_type: HandleType,

    /// Position in page space
    pub position: Point,

    /// Radius of the hit area in page units
    pub size: f64,

    /// Object this handle controls
    pub object_id: VectorObjectId,
}

impl SelectionHandle {
    pub fn new(
        handle_type: HandleType,
        position: Point,
        size: f64,
        object_id: VectorObjectId,
    ) -> Self {
        Self {
            handle_type,
            position,
            size,
            object_id,
        }
    }

    /// Radial hit test against the handle's center
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point.distance_to(&self.position) <= self.size + tolerance
    }
}

/// Generate selection handles for an object.
///
/// Lines get a handle at each endpoint; everything else gets the
/// 8-handle bounding-box arrangement plus a rotation handle. Objects
/// with no geometry produce no handles.
pub fn generate_handles(object: &VectorObject, handle_size: f64) -> Vec<SelectionHandle> {
    let mut handles = Vec::new();

    if let VectorObjectKind::Line { x1, y1, x2, y2 } = &object.kind {
        let matrix = object.matrix();
        let start = matrix.apply(Point::new(*x1, *y1));
        let end = matrix.apply(Point::new(*x2, *y2));
        handles.push(SelectionHandle::new(
            HandleType::TopLeft,
            start,
            handle_size,
            object.id,
        ));
        handles.push(SelectionHandle::new(
            HandleType::BottomRight,
            end,
            handle_size,
            object.id,
        ));
        return handles;
    }

    let Some(bounds) = object_bounds(object) else {
        return handles;
    };
    let center = bounds.center();

    handles.push(SelectionHandle::new(
        HandleType::TopLeft,
        Point::new(bounds.min_x, bounds.min_y),
        handle_size,
        object.id,
    ));
    handles.push(SelectionHandle::new(
        HandleType::TopRight,
        Point::new(bounds.max_x, bounds.min_y),
        handle_size,
        object.id,
    ));
    handles.push(SelectionHandle::new(
        HandleType::BottomLeft,
        Point::new(bounds.min_x, bounds.max_y),
        handle_size,
        object.id,
    ));
    handles.push(SelectionHandle::new(
        HandleType::BottomRight,
        Point::new(bounds.max_x, bounds.max_y),
        handle_size,
        object.id,
    ));

    handles.push(SelectionHandle::new(
        HandleType::Top,
        Point::new(center.x, bounds.min_y),
        handle_size,
        object.id,
    ));
    handles.push(SelectionHandle::new(
        HandleType::Bottom,
        Point::new(center.x, bounds.max_y),
        handle_size,
        object.id,
    ));
    handles.push(SelectionHandle::new(
        HandleType::Left,
        Point::new(bounds.min_x, center.y),
        handle_size,
        object.id,
    ));
    handles.push(SelectionHandle::new(
        HandleType::Right,
        Point::new(bounds.max_x, center.y),
        handle_size,
        object.id,
    ));

    handles.push(SelectionHandle::new(
        HandleType::Rotate,
        Point::new(center.x, bounds.min_y - ROTATE_HANDLE_OFFSET),
        handle_size,
        object.id,
    ));

    handles
}

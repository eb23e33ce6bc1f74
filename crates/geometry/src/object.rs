//! Vector object data model
//!
//! In-app representation of editable annotations. All geometry is stored
//! in an object-local coordinate frame; page-space coordinates are
//! obtained only by applying the object's transform. Page space uses a
//! top-left origin with Y increasing downward, units in PDF points.

use crate::path::{flatten_path, FlattenQuality, PathCommand};
use crate::transform::{Matrix, Point};

/// Unique identifier for a vector object
///
/// Stable across the document lifetime, persists in saved sessions.
pub type VectorObjectId = uuid::Uuid;

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const YELLOW: Color = Color { r: 255, g: 255, b: 0, a: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };

    /// Create a new color
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert to normalized RGBA values (0.0 to 1.0)
    pub fn to_normalized(&self) -> (f64, f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
            self.a as f64 / 255.0,
        )
    }

    /// Format as `#RRGGBB` (alpha is carried separately as opacity)
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parse `#RRGGBB` or `#RGB`; returns None on malformed input
    pub fn from_hex(hex: &str) -> Option<Color> {
        let digits = hex.strip_prefix('#')?;
        match digits.len() {
            6 => {
                let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
                let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
                let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
                Some(Color::rgb(r, g, b))
            }
            3 => {
                let r = u8::from_str_radix(&digits[0..1], 16).ok()?;
                let g = u8::from_str_radix(&digits[1..2], 16).ok()?;
                let b = u8::from_str_radix(&digits[2..3], 16).ok()?;
                Some(Color::rgb(r * 17, g * 17, b * 17))
            }
            _ => None,
        }
    }
}

/// Stroke styling
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stroke {
    pub color: Color,
    /// Stroke width in page units
    pub width: f64,
    /// When true the stroke width ignores the object's scale factors
    pub uniform: bool,
}

impl Stroke {
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            uniform: false,
        }
    }
}

/// Origin anchor for an object's transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Origin {
    /// (left, top) is the local frame's top-left corner
    TopLeft,
    /// (left, top) is the local geometry's center
    Center,
}

/// Position, scale, and rotation of an object
///
/// Composed into a single affine matrix for rendering and hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ObjectTransform {
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation in degrees, clockwise in screen space
    pub angle: f64,
    pub origin: Origin,
}

impl ObjectTransform {
    /// Identity transform positioned at (left, top)
    pub fn at(left: f64, top: f64) -> Self {
        Self {
            left,
            top,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            origin: Origin::TopLeft,
        }
    }
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self::at(0.0, 0.0)
    }
}

/// Where an object came from and how it relates to the PDF file
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Provenance {
    /// True when the object was built from a PDF-native annotation
    pub is_pdf_imported: bool,
    /// Identifier of the originating PDF annotation, if any
    pub pdf_annotation_id: Option<String>,
    /// PDF subtype name of the originating annotation
    pub pdf_subtype: Option<String>,
    /// Application-specific layer tag
    pub source_layer: Option<String>,
    /// App-internal module marker; marked objects are never exported
    pub module_id: Option<String>,
    /// App-internal search-highlight marker; never exported
    pub highlight_id: Option<String>,
}

impl Provenance {
    /// Objects carrying app-internal markers stay out of the PDF on save.
    pub fn is_app_internal(&self) -> bool {
        self.module_id.is_some() || self.highlight_id.is_some()
    }
}

/// Kind-specific geometry, all in the object's local frame
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum VectorObjectKind {
    /// Freehand or imported ink path.
    ///
    /// Command coordinates are offset by `path_offset`: the effective
    /// local point of a command coordinate (x, y) is
    /// (x - path_offset.x, y - path_offset.y).
    Path {
        commands: Vec<PathCommand>,
        path_offset: Point,
    },
    /// Axis-aligned rectangle spanning [0, width] x [0, height] locally
    Rect { width: f64, height: f64 },
    /// Ellipse with local bounding box [0, 2rx] x [0, 2ry]
    Ellipse { rx: f64, ry: f64 },
    /// Line segment between two local points
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Closed polygon over local points
    Polygon { points: Vec<Point> },
    /// Isosceles triangle inscribed in [0, width] x [0, height]
    Triangle { width: f64, height: f64 },
    /// Text container occupying [0, width] x [0, height] locally
    Textbox { width: f64, height: f64 },
    /// Ordered child objects, each with its own transform
    Group { children: Vec<VectorObject> },
}

impl VectorObjectKind {
    /// Local-frame sample points outlining the geometry.
    ///
    /// Curves are flattened at the given quality, so the samples track
    /// curve extrema rather than control points. Group geometry is not
    /// included here; groups are resolved by walking children with
    /// their composed matrices.
    pub fn local_outline(&self, quality: FlattenQuality) -> Vec<Vec<Point>> {
        match self {
            VectorObjectKind::Path {
                commands,
                path_offset,
            } => flatten_path(commands, quality)
                .into_iter()
                .map(|line| {
                    line.into_iter()
                        .map(|p| Point::new(p.x - path_offset.x, p.y - path_offset.y))
                        .collect()
                })
                .collect(),
            VectorObjectKind::Rect { width, height }
            | VectorObjectKind::Textbox { width, height } => {
                vec![vec![
                    Point::ZERO,
                    Point::new(*width, 0.0),
                    Point::new(*width, *height),
                    Point::new(0.0, *height),
                    Point::ZERO,
                ]]
            }
            VectorObjectKind::Ellipse { rx, ry } => {
                let n = 16;
                let mut ring = Vec::with_capacity(n + 1);
                for i in 0..=n {
                    let theta = std::f64::consts::TAU * i as f64 / n as f64;
                    ring.push(Point::new(rx + rx * theta.cos(), ry + ry * theta.sin()));
                }
                vec![ring]
            }
            VectorObjectKind::Line { x1, y1, x2, y2 } => {
                vec![vec![Point::new(*x1, *y1), Point::new(*x2, *y2)]]
            }
            VectorObjectKind::Polygon { points } => {
                if points.is_empty() {
                    return Vec::new();
                }
                let mut ring = points.clone();
                if ring.first() != ring.last() {
                    ring.push(ring[0]);
                }
                vec![ring]
            }
            VectorObjectKind::Triangle { width, height } => {
                vec![vec![
                    Point::new(width / 2.0, 0.0),
                    Point::new(*width, *height),
                    Point::new(0.0, *height),
                    Point::new(width / 2.0, 0.0),
                ]]
            }
            VectorObjectKind::Group { .. } => Vec::new(),
        }
    }

    /// Local-frame bounding box (min_x, min_y, max_x, max_y)
    pub fn local_bounds(&self) -> (f64, f64, f64, f64) {
        if let VectorObjectKind::Group { children } = self {
            let mut bounds: Option<(f64, f64, f64, f64)> = None;
            for child in children {
                // Bounds feed anchoring and export, so sample curves at
                // outline quality, not the coarser hit-test grid.
                for line in child.world_outline(FlattenQuality::OUTLINE, None) {
                    for p in line {
                        let b = bounds.get_or_insert((p.x, p.y, p.x, p.y));
                        b.0 = b.0.min(p.x);
                        b.1 = b.1.min(p.y);
                        b.2 = b.2.max(p.x);
                        b.3 = b.3.max(p.y);
                    }
                }
            }
            return bounds.unwrap_or((0.0, 0.0, 0.0, 0.0));
        }
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for line in self.local_outline(FlattenQuality::OUTLINE) {
            for p in line {
                let b = bounds.get_or_insert((p.x, p.y, p.x, p.y));
                b.0 = b.0.min(p.x);
                b.1 = b.1.min(p.y);
                b.2 = b.2.max(p.x);
                b.3 = b.3.max(p.y);
            }
        }
        bounds.unwrap_or((0.0, 0.0, 0.0, 0.0))
    }
}

/// A single editable annotation/shape
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VectorObject {
    /// Stable unique identifier
    pub id: VectorObjectId,
    /// Page index this object belongs to (0-based)
    pub page_index: u16,
    /// Kind-specific local geometry
    pub kind: VectorObjectKind,
    /// Position, scale, rotation
    pub transform: ObjectTransform,
    /// Stroke styling; None for unstroked shapes
    pub stroke: Option<Stroke>,
    /// Fill color; None for unfilled shapes
    pub fill: Option<Color>,
    /// Opacity (0.0 transparent, 1.0 opaque)
    pub opacity: f64,
    /// Origin and app-marker flags
    pub provenance: Provenance,
    /// Whether the object is drawn and hit-testable
    pub visible: bool,
    /// Render order within the page (higher draws on top)
    pub layer: u32,
}

impl VectorObject {
    /// Create a new object with a generated id
    pub fn new(page_index: u16, kind: VectorObjectKind) -> Self {
        Self {
            id: VectorObjectId::new_v4(),
            page_index,
            kind,
            transform: ObjectTransform::default(),
            stroke: Some(Stroke::new(Color::BLACK, 2.0)),
            fill: None,
            opacity: 1.0,
            provenance: Provenance::default(),
            visible: true,
            layer: 0,
        }
    }

    /// The object's local-to-page matrix.
    ///
    /// For a center origin the anchor point (left, top) maps to the
    /// local geometry's center rather than its top-left corner.
    pub fn matrix(&self) -> Matrix {
        let t = &self.transform;
        let composed = Matrix::compose(t.left, t.top, t.scale_x, t.scale_y, t.angle);
        match t.origin {
            Origin::TopLeft => composed,
            Origin::Center => {
                let (min_x, min_y, max_x, max_y) = self.kind.local_bounds();
                let cx = (min_x + max_x) / 2.0;
                let cy = (min_y + max_y) / 2.0;
                Matrix::multiply(&composed, &Matrix::translate(-cx, -cy))
            }
        }
    }

    /// Page-space outline polylines, composed with an optional parent
    /// matrix (used when walking group children).
    pub fn world_outline(
        &self,
        quality: FlattenQuality,
        parent: Option<&Matrix>,
    ) -> Vec<Vec<Point>> {
        let own = self.matrix();
        let matrix = match parent {
            Some(p) => Matrix::multiply(p, &own),
            None => own,
        };
        match &self.kind {
            VectorObjectKind::Group { children } => children
                .iter()
                .flat_map(|child| child.world_outline(quality, Some(&matrix)))
                .collect(),
            kind => kind
                .local_outline(quality)
                .into_iter()
                .map(|line| line.into_iter().map(|p| matrix.apply(p)).collect())
                .collect(),
        }
    }

    /// Effective stroke width for hit-testing.
    ///
    /// Objects with neither stroke nor fill still get a band of
    /// [`crate::tolerances::MIN_ASSUMED_STROKE_WIDTH`] so they remain
    /// selectable.
    pub fn effective_stroke_width(&self) -> f64 {
        match (&self.stroke, &self.fill) {
            (Some(stroke), _) if stroke.width > 0.0 => stroke.width,
            (None, None) => crate::tolerances::MIN_ASSUMED_STROKE_WIDTH,
            _ => 0.0,
        }
    }
}

/// Collection of vector objects for a document
///
/// Manages objects across all pages with layer-ordered retrieval.
#[derive(Debug, Default)]
pub struct VectorObjectCollection {
    objects: std::collections::HashMap<VectorObjectId, VectorObject>,
    by_page: std::collections::HashMap<u16, Vec<VectorObjectId>>,
}

impl VectorObjectCollection {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the collection
    pub fn add(&mut self, object: VectorObject) {
        let id = object.id;
        let page_index = object.page_index;
        self.objects.insert(id, object);
        self.by_page.entry(page_index).or_default().push(id);
    }

    /// Remove an object by id
    pub fn remove(&mut self, id: VectorObjectId) -> Option<VectorObject> {
        let object = self.objects.remove(&id)?;
        if let Some(page_objects) = self.by_page.get_mut(&object.page_index) {
            page_objects.retain(|&oid| oid != id);
            if page_objects.is_empty() {
                self.by_page.remove(&object.page_index);
            }
        }
        Some(object)
    }

    /// Get an object by id
    pub fn get(&self, id: VectorObjectId) -> Option<&VectorObject> {
        self.objects.get(&id)
    }

    /// Get a mutable reference to an object by id
    pub fn get_mut(&mut self, id: VectorObjectId) -> Option<&mut VectorObject> {
        self.objects.get_mut(&id)
    }

    /// All objects for a page, sorted by layer ascending (render order)
    pub fn page_objects(&self, page_index: u16) -> Vec<&VectorObject> {
        let mut objects: Vec<&VectorObject> = self
            .by_page
            .get(&page_index)
            .map(|ids| ids.iter().filter_map(|id| self.objects.get(id)).collect())
            .unwrap_or_default();
        objects.sort_by_key(|o| o.layer);
        objects
    }

    /// Number of objects in the collection
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects on a page hit by the given point, topmost first
    pub fn hit_test(
        &self,
        page_index: u16,
        point: Point,
        tolerance: f64,
    ) -> Vec<&VectorObject> {
        let mut hits: Vec<&VectorObject> = self
            .page_objects(page_index)
            .into_iter()
            .filter(|o| o.visible && crate::hit_test::is_point_on_object(o, point, tolerance))
            .collect();
        hits.sort_by_key(|o| std::cmp::Reverse(o.layer));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_round_trip() {
        let color = Color::rgb(255, 255, 0);
        assert_eq!(color.to_hex(), "#FFFF00");
        assert_eq!(Color::from_hex("#FFFF00"), Some(color));
        assert_eq!(Color::from_hex("#FF0"), Some(color));
        assert_eq!(Color::from_hex("FFFF00"), None);
        assert_eq!(Color::from_hex("#GGHHII"), None);
    }

    #[test]
    fn test_rect_local_bounds() {
        let kind = VectorObjectKind::Rect {
            width: 100.0,
            height: 50.0,
        };
        assert_eq!(kind.local_bounds(), (0.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_ellipse_outline_on_curve() {
        let kind = VectorObjectKind::Ellipse { rx: 10.0, ry: 5.0 };
        let outline = kind.local_outline(FlattenQuality::HIT_TEST);
        for p in &outline[0] {
            let dx = (p.x - 10.0) / 10.0;
            let dy = (p.y - 5.0) / 5.0;
            assert!((dx * dx + dy * dy - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_center_origin_matrix() {
        let mut object = VectorObject::new(
            0,
            VectorObjectKind::Rect {
                width: 100.0,
                height: 50.0,
            },
        );
        object.transform = ObjectTransform {
            left: 200.0,
            top: 100.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            origin: Origin::Center,
        };
        let matrix = object.matrix();
        // Local center maps to the anchor point.
        let world = matrix.apply(Point::new(50.0, 25.0));
        assert!((world.x - 200.0).abs() < 1e-9);
        assert!((world.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_group_bounds_sample_curves_at_outline_quality() {
        // Asymmetric cubic: the coarse hit-test sample grid and the
        // outline grid land on different extrema.
        let child = VectorObject::new(
            0,
            VectorObjectKind::Path {
                commands: vec![
                    PathCommand::MoveTo { x: 0.0, y: 0.0 },
                    PathCommand::CubicTo {
                        c1x: 0.0,
                        c1y: 60.0,
                        c2x: 50.0,
                        c2y: 0.0,
                        x: 100.0,
                        y: 0.0,
                    },
                ],
                path_offset: Point::ZERO,
            },
        );
        let mut expected_max_y = f64::NEG_INFINITY;
        for line in child.world_outline(FlattenQuality::OUTLINE, None) {
            for p in line {
                expected_max_y = expected_max_y.max(p.y);
            }
        }
        let group = VectorObjectKind::Group {
            children: vec![child],
        };
        let (_, _, _, max_y) = group.local_bounds();
        assert_eq!(max_y, expected_max_y);
    }

    #[test]
    fn test_effective_stroke_width_transparent_object() {
        let mut object = VectorObject::new(
            0,
            VectorObjectKind::Rect {
                width: 10.0,
                height: 10.0,
            },
        );
        object.stroke = None;
        object.fill = None;
        assert_eq!(
            object.effective_stroke_width(),
            crate::tolerances::MIN_ASSUMED_STROKE_WIDTH
        );
    }

    #[test]
    fn test_collection_add_remove() {
        let mut collection = VectorObjectCollection::new();
        let object = VectorObject::new(
            0,
            VectorObjectKind::Line {
                x1: 0.0,
                y1: 0.0,
                x2: 10.0,
                y2: 10.0,
            },
        );
        let id = object.id;
        collection.add(object);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.page_objects(0).len(), 1);
        collection.remove(id);
        assert!(collection.is_empty());
        assert!(collection.page_objects(0).is_empty());
    }

    #[test]
    fn test_collection_layer_sorting() {
        let mut collection = VectorObjectCollection::new();
        for layer in [2u32, 0, 1] {
            let mut object = VectorObject::new(
                0,
                VectorObjectKind::Rect {
                    width: 10.0,
                    height: 10.0,
                },
            );
            object.layer = layer;
            collection.add(object);
        }
        let layers: Vec<u32> = collection.page_objects(0).iter().map(|o| o.layer).collect();
        assert_eq!(layers, vec![0, 1, 2]);
    }

    #[test]
    fn test_serde_round_trip() {
        let object = VectorObject::new(
            3,
            VectorObjectKind::Path {
                commands: vec![
                    PathCommand::MoveTo { x: 0.0, y: 0.0 },
                    PathCommand::QuadTo {
                        cx: 5.0,
                        cy: 5.0,
                        x: 10.0,
                        y: 0.0,
                    },
                ],
                path_offset: Point::ZERO,
            },
        );
        let json = serde_json::to_string(&object).unwrap();
        let back: VectorObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back, object);
    }
}

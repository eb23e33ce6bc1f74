//! PDF annotation export
//!
//! Converts vector objects back into PDF-native records, flipping Y
//! into bottom-left-origin space. Every object without an app-internal
//! marker maps to exactly one record; marked objects (search
//! highlights, module overlays) never reach the file.

use pagemark_geometry::{
    object_bounds, path_endpoints, FlattenQuality, Point, VectorObject, VectorObjectKind,
};

use crate::color::components_from_color;
use crate::record::{PdfAnnotationRecord, PdfSubtype};

/// Export a page's objects as annotation records.
///
/// App-internal objects are skipped; objects with no exportable
/// geometry are dropped with a debug log.
pub fn export_objects(objects: &[VectorObject], page_height: f64) -> Vec<PdfAnnotationRecord> {
    objects
        .iter()
        .filter(|object| !object.provenance.is_app_internal())
        .filter_map(|object| {
            let record = convert_object(object, page_height);
            if record.is_none() {
                tracing::debug!(id = %object.id, "object has no exportable geometry");
            }
            record
        })
        .collect()
}

/// Convert one object into a PDF annotation record.
///
/// Rect objects imported from text markup round-trip to their original
/// subtype via provenance; everything else maps by kind. Curve
/// commands flatten to their endpoints when building ink lists, so
/// curves degrade to polylines on export (known limitation of the ink
/// list format).
pub fn convert_object(object: &VectorObject, page_height: f64) -> Option<PdfAnnotationRecord> {
    let bounds = object_bounds(object)?;
    let rect = [
        bounds.min_x,
        page_height - bounds.max_y,
        bounds.max_x,
        page_height - bounds.min_y,
    ];
    let matrix = object.matrix();

    let mut record = match &object.kind {
        VectorObjectKind::Path {
            commands,
            path_offset,
        } => {
            let ink_lists: Vec<Vec<f64>> = path_endpoints(commands)
                .iter()
                .map(|line| {
                    let mut flat = Vec::with_capacity(line.len() * 2);
                    for p in line {
                        let local = Point::new(p.x - path_offset.x, p.y - path_offset.y);
                        let world = matrix.apply(local);
                        flat.push(world.x);
                        flat.push(page_height - world.y);
                    }
                    flat
                })
                .filter(|flat| !flat.is_empty())
                .collect();
            if ink_lists.is_empty() {
                return None;
            }
            let mut record = PdfAnnotationRecord::new(PdfSubtype::Ink, rect);
            record.ink_lists = ink_lists;
            record
        }

        VectorObjectKind::Rect { .. } => rect_record(object, rect),

        VectorObjectKind::Textbox { .. } => PdfAnnotationRecord::new(PdfSubtype::FreeText, rect),

        VectorObjectKind::Ellipse { .. } => {
            let mut record = PdfAnnotationRecord::new(PdfSubtype::Circle, rect);
            record.interior_color = object.fill.map(components_from_color);
            record
        }

        VectorObjectKind::Line { x1, y1, x2, y2 } => {
            let p1 = matrix.apply(Point::new(*x1, *y1));
            let p2 = matrix.apply(Point::new(*x2, *y2));
            let mut record = PdfAnnotationRecord::new(PdfSubtype::Line, rect);
            record.line_coordinates =
                Some([p1.x, page_height - p1.y, p2.x, page_height - p2.y]);
            record
        }

        VectorObjectKind::Polygon { .. } | VectorObjectKind::Triangle { .. } => {
            let mut ring = object
                .world_outline(FlattenQuality::OUTLINE, None)
                .into_iter()
                .next()?;
            if ring.len() > 1 && ring.first() == ring.last() {
                ring.pop();
            }
            let mut record = PdfAnnotationRecord::new(PdfSubtype::Polygon, rect);
            record.vertices = ring
                .iter()
                .flat_map(|p| [p.x, page_height - p.y])
                .collect();
            record.interior_color = object.fill.map(components_from_color);
            record
        }

        // A group flattens into one Ink record, one list per child
        // polyline.
        VectorObjectKind::Group { .. } => {
            let ink_lists: Vec<Vec<f64>> = object
                .world_outline(FlattenQuality::OUTLINE, None)
                .iter()
                .map(|line| {
                    line.iter()
                        .flat_map(|p| [p.x, page_height - p.y])
                        .collect::<Vec<f64>>()
                })
                .filter(|flat| !flat.is_empty())
                .collect();
            if ink_lists.is_empty() {
                return None;
            }
            let mut record = PdfAnnotationRecord::new(PdfSubtype::Ink, rect);
            record.ink_lists = ink_lists;
            record
        }
    };

    if let Some(stroke) = &object.stroke {
        record.color = Some(components_from_color(stroke.color));
        record.border_width = Some(stroke.width);
    } else if record.color.is_none() {
        if let Some(fill) = object.fill {
            record.color = Some(components_from_color(fill));
        }
    }
    if object.opacity < 1.0 {
        record.opacity = Some(object.opacity);
    }
    record.id = object.provenance.pdf_annotation_id.clone();
    Some(record)
}

/// Rect objects carry their markup origin in provenance: a rect that
/// arrived as Highlight/Underline/StrikeOut goes back out as one.
fn rect_record(object: &VectorObject, rect: [f64; 4]) -> PdfAnnotationRecord {
    let subtype = match object.provenance.pdf_subtype.as_deref() {
        Some("Highlight") => PdfSubtype::Highlight,
        Some("Underline") => PdfSubtype::Underline,
        Some("StrikeOut") => PdfSubtype::StrikeOut,
        _ => PdfSubtype::Square,
    };
    let mut record = PdfAnnotationRecord::new(subtype.clone(), rect);
    match subtype {
        PdfSubtype::Highlight => {
            // One quad covering the rect: top edge pair then bottom
            // edge pair, in PDF space.
            let [x1, y1, x2, y2] = rect;
            record.quad_points = vec![x1, y2, x2, y2, x1, y1, x2, y1];
        }
        PdfSubtype::Square => {
            record.interior_color = object.fill.map(components_from_color);
        }
        _ => {}
    }
    record
}

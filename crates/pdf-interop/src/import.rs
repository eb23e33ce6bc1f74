//! PDF annotation import
//!
//! Converts PDF-native annotation records into editable vector
//! objects. PDF space has a bottom-left origin; every Y-carrying field
//! is flipped through `y' = page_height - y` on the way in.

use std::collections::{BTreeSet, HashMap};

use pagemark_geometry::{
    ObjectTransform, PathCommand, Point, Provenance, Stroke, VectorObject, VectorObjectKind,
};

use crate::color::color_from_components;
use crate::record::{PdfAnnotationRecord, PdfSubtype};

/// Height of the thin rect standing in for underline/strikeout marks
pub const MARKUP_RECT_HEIGHT: f64 = 2.0;

/// Default opacity for highlight fills when the record carries no CA
pub const HIGHLIGHT_OPACITY: f64 = 0.4;

/// Counters describing one import run
#[derive(Debug, Clone, Default)]
pub struct ImportStats {
    /// Total annotation records found on the page
    pub total_found: usize,
    /// Records converted into editable objects
    pub imported: usize,
    /// Interactive records (Link/Popup/Widget) skipped without report
    pub ignored: usize,
    /// Unsupported records left untouched in the file
    pub preserved: usize,
    /// Malformed records of supported subtypes
    pub skipped: usize,
    /// Count by subtype name
    pub by_subtype: HashMap<String, usize>,
}

/// Result of importing one page's annotations
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub objects: Vec<VectorObject>,
    pub stats: ImportStats,
    /// Subtype names the user should know exist but cannot edit
    pub unsupported_types: BTreeSet<String>,
}

/// Import every editable annotation on a page.
///
/// Unsupported records are never an error: interactive subtypes are
/// silently skipped, anything else unrecognized lands in
/// `unsupported_types` and stays byte-identical in the file on save.
/// Malformed records of supported subtypes are dropped per record, not
/// per page.
pub fn import_page_annotations(
    records: &[PdfAnnotationRecord],
    page_index: u16,
    page_height: f64,
) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();
    for record in records {
        outcome.stats.total_found += 1;
        *outcome
            .stats
            .by_subtype
            .entry(record.subtype.name().to_string())
            .or_insert(0) += 1;

        if record.subtype.is_silently_ignored() {
            outcome.stats.ignored += 1;
            continue;
        }
        if !is_editable_subtype(&record.subtype) {
            outcome.stats.preserved += 1;
            outcome
                .unsupported_types
                .insert(record.subtype.name().to_string());
            continue;
        }
        match convert_record(record, page_index, page_height) {
            Some(object) => {
                outcome.objects.push(object);
                outcome.stats.imported += 1;
            }
            None => {
                outcome.stats.skipped += 1;
                tracing::debug!(
                    subtype = record.subtype.name(),
                    id = record.id.as_deref().unwrap_or(""),
                    "skipping malformed annotation record"
                );
            }
        }
    }
    outcome
}

fn is_editable_subtype(subtype: &PdfSubtype) -> bool {
    matches!(
        subtype,
        PdfSubtype::Ink
            | PdfSubtype::Highlight
            | PdfSubtype::FreeText
            | PdfSubtype::Square
            | PdfSubtype::Circle
            | PdfSubtype::Line
            | PdfSubtype::Underline
            | PdfSubtype::StrikeOut
    )
}

/// Convert one record into a vector object.
///
/// Returns None for malformed geometry (empty ink lists, missing line
/// endpoints, zero-size rects); callers filter rather than fail.
pub fn convert_record(
    record: &PdfAnnotationRecord,
    page_index: u16,
    page_height: f64,
) -> Option<VectorObject> {
    let subtype = &record.subtype;
    let stroke_color = color_from_components(record.color.as_deref(), subtype);
    let border_width = record.border_width.unwrap_or(1.0);

    let mut opacity = record.opacity.unwrap_or(1.0);
    let mut stroke = Some(Stroke::new(stroke_color, border_width));
    let mut fill = None;

    let (kind, transform) = match subtype {
        PdfSubtype::Ink => import_ink(record, page_height)?,

        PdfSubtype::Highlight => {
            let (left, top, width, height) = highlight_box(record, page_height)?;
            stroke = None;
            fill = Some(stroke_color);
            opacity = record.opacity.unwrap_or(HIGHLIGHT_OPACITY);
            (
                VectorObjectKind::Rect { width, height },
                ObjectTransform::at(left, top),
            )
        }

        PdfSubtype::FreeText => {
            let (left, top, width, height) = app_box(&record.rect, page_height)?;
            stroke = None;
            (
                VectorObjectKind::Textbox { width, height },
                ObjectTransform::at(left, top),
            )
        }

        PdfSubtype::Square => {
            let (left, top, width, height) = app_box(&record.rect, page_height)?;
            fill = record
                .interior_color
                .as_deref()
                .map(|c| color_from_components(Some(c), subtype));
            (
                VectorObjectKind::Rect { width, height },
                ObjectTransform::at(left, top),
            )
        }

        PdfSubtype::Circle => {
            let (left, top, width, height) = app_box(&record.rect, page_height)?;
            fill = record
                .interior_color
                .as_deref()
                .map(|c| color_from_components(Some(c), subtype));
            (
                VectorObjectKind::Ellipse {
                    rx: width / 2.0,
                    ry: height / 2.0,
                },
                ObjectTransform::at(left, top),
            )
        }

        PdfSubtype::Line => {
            let [x1, y1, x2, y2] = record.line_coordinates?;
            let p1 = Point::new(x1, page_height - y1);
            let p2 = Point::new(x2, page_height - y2);
            let left = p1.x.min(p2.x);
            let top = p1.y.min(p2.y);
            (
                VectorObjectKind::Line {
                    x1: p1.x - left,
                    y1: p1.y - top,
                    x2: p2.x - left,
                    y2: p2.y - top,
                },
                ObjectTransform::at(left, top),
            )
        }

        // Thin filled rect at the text baseline.
        PdfSubtype::Underline => {
            let (left, top, width, height) = app_box(&record.rect, page_height)?;
            stroke = None;
            fill = Some(stroke_color);
            (
                VectorObjectKind::Rect {
                    width,
                    height: MARKUP_RECT_HEIGHT,
                },
                ObjectTransform::at(left, top + height - MARKUP_RECT_HEIGHT),
            )
        }

        // Thin filled rect through mid-height.
        PdfSubtype::StrikeOut => {
            let (left, top, width, height) = app_box(&record.rect, page_height)?;
            stroke = None;
            fill = Some(stroke_color);
            (
                VectorObjectKind::Rect {
                    width,
                    height: MARKUP_RECT_HEIGHT,
                },
                ObjectTransform::at(left, top + (height - MARKUP_RECT_HEIGHT) / 2.0),
            )
        }

        _ => return None,
    };

    let mut object = VectorObject::new(page_index, kind);
    object.transform = transform;
    object.stroke = stroke;
    object.fill = fill;
    object.opacity = opacity;
    object.provenance = Provenance {
        is_pdf_imported: true,
        pdf_annotation_id: record.id.clone(),
        pdf_subtype: Some(subtype.name().to_string()),
        ..Provenance::default()
    };
    Some(object)
}

/// Flip an ink record into a Path anchored at its point minimum, with
/// commands relative to that anchor.
fn import_ink(
    record: &PdfAnnotationRecord,
    page_height: f64,
) -> Option<(VectorObjectKind, ObjectTransform)> {
    let strokes: Vec<Vec<Point>> = record
        .ink_lists
        .iter()
        .map(|list| {
            list.chunks_exact(2)
                .map(|xy| Point::new(xy[0], page_height - xy[1]))
                .collect::<Vec<Point>>()
        })
        .filter(|points| !points.is_empty())
        .collect();
    if strokes.is_empty() {
        return None;
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    for p in strokes.iter().flatten() {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
    }

    let mut commands = Vec::new();
    for stroke in &strokes {
        for (i, p) in stroke.iter().enumerate() {
            let x = p.x - min_x;
            let y = p.y - min_y;
            if i == 0 {
                commands.push(PathCommand::MoveTo { x, y });
            } else {
                commands.push(PathCommand::LineTo { x, y });
            }
        }
    }
    Some((
        VectorObjectKind::Path {
            commands,
            path_offset: Point::ZERO,
        },
        ObjectTransform::at(min_x, min_y),
    ))
}

/// Highlight geometry comes from quad points when present, the rect
/// otherwise; quads track the covered text more tightly.
fn highlight_box(
    record: &PdfAnnotationRecord,
    page_height: f64,
) -> Option<(f64, f64, f64, f64)> {
    if record.quad_points.len() >= 8 {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for xy in record.quad_points.chunks_exact(2) {
            let x = xy[0];
            let y = page_height - xy[1];
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        return Some((min_x, min_y, max_x - min_x, max_y - min_y));
    }
    app_box(&record.rect, page_height)
}

/// PDF rect to app-space (left, top, width, height); None for
/// zero-size rects
fn app_box(rect: &[f64; 4], page_height: f64) -> Option<(f64, f64, f64, f64)> {
    let [x1, y1, x2, y2] = *rect;
    let width = (x2 - x1).abs();
    let height = (y2 - y1).abs();
    if width == 0.0 && height == 0.0 {
        return None;
    }
    let left = x1.min(x2);
    let top = page_height - y1.max(y2);
    Some((left, top, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagemark_geometry::{Color, FlattenQuality};

    fn ink_record(lists: Vec<Vec<f64>>) -> PdfAnnotationRecord {
        let mut record = PdfAnnotationRecord::new(PdfSubtype::Ink, [0.0, 0.0, 10.0, 10.0]);
        record.ink_lists = lists;
        record
    }

    #[test]
    fn test_ink_import_flips_y_and_anchors_at_min() {
        let record = ink_record(vec![vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0]]);
        let object = convert_record(&record, 0, 100.0).unwrap();
        assert_eq!(object.transform.left, 0.0);
        assert_eq!(object.transform.top, 90.0);

        let outline = object.world_outline(FlattenQuality::HIT_TEST, None);
        assert_eq!(outline.len(), 1);
        assert_eq!(
            outline[0],
            vec![
                Point::new(0.0, 100.0),
                Point::new(10.0, 100.0),
                Point::new(10.0, 90.0),
            ]
        );
        assert!(object.provenance.is_pdf_imported);
        assert_eq!(object.provenance.pdf_subtype.as_deref(), Some("Ink"));
    }

    #[test]
    fn test_empty_ink_lists_rejected() {
        assert!(convert_record(&ink_record(vec![]), 0, 100.0).is_none());
        assert!(convert_record(&ink_record(vec![vec![]]), 0, 100.0).is_none());
    }

    #[test]
    fn test_highlight_prefers_quad_points() {
        let mut record = PdfAnnotationRecord::new(PdfSubtype::Highlight, [0.0, 0.0, 200.0, 200.0]);
        record.quad_points = vec![10.0, 90.0, 50.0, 90.0, 10.0, 80.0, 50.0, 80.0];
        let object = convert_record(&record, 0, 100.0).unwrap();
        assert_eq!(object.transform.left, 10.0);
        assert_eq!(object.transform.top, 10.0);
        match object.kind {
            VectorObjectKind::Rect { width, height } => {
                assert_eq!(width, 40.0);
                assert_eq!(height, 10.0);
            }
            other => panic!("expected Rect, got {:?}", other),
        }
        assert_eq!(object.fill, Some(Color::YELLOW));
        assert!(object.stroke.is_none());
        assert_eq!(object.opacity, HIGHLIGHT_OPACITY);
    }

    #[test]
    fn test_underline_thin_rect_at_baseline() {
        let record = PdfAnnotationRecord::new(PdfSubtype::Underline, [10.0, 80.0, 60.0, 90.0]);
        let object = convert_record(&record, 0, 100.0).unwrap();
        // Box spans y [10, 20] in app space; baseline is the bottom.
        assert_eq!(
            object.transform.top,
            20.0 - MARKUP_RECT_HEIGHT
        );
        assert_eq!(object.fill, Some(Color::RED));
        match object.kind {
            VectorObjectKind::Rect { width, height } => {
                assert_eq!(width, 50.0);
                assert_eq!(height, MARKUP_RECT_HEIGHT);
            }
            other => panic!("expected Rect, got {:?}", other),
        }
    }

    #[test]
    fn test_strikeout_thin_rect_at_mid_height() {
        let record = PdfAnnotationRecord::new(PdfSubtype::StrikeOut, [10.0, 80.0, 60.0, 90.0]);
        let object = convert_record(&record, 0, 100.0).unwrap();
        assert_eq!(
            object.transform.top,
            10.0 + (10.0 - MARKUP_RECT_HEIGHT) / 2.0
        );
    }

    #[test]
    fn test_circle_import_dimensions() {
        let record = PdfAnnotationRecord::new(PdfSubtype::Circle, [10.0, 20.0, 50.0, 40.0]);
        let object = convert_record(&record, 0, 100.0).unwrap();
        assert_eq!(object.transform.left, 10.0);
        assert_eq!(object.transform.top, 60.0);
        match object.kind {
            VectorObjectKind::Ellipse { rx, ry } => {
                assert_eq!(rx, 20.0);
                assert_eq!(ry, 10.0);
            }
            other => panic!("expected Ellipse, got {:?}", other),
        }
    }

    #[test]
    fn test_line_without_endpoints_rejected() {
        let record = PdfAnnotationRecord::new(PdfSubtype::Line, [0.0, 0.0, 10.0, 10.0]);
        assert!(convert_record(&record, 0, 100.0).is_none());
    }

    #[test]
    fn test_line_import_flips_endpoints() {
        let mut record = PdfAnnotationRecord::new(PdfSubtype::Line, [0.0, 0.0, 30.0, 40.0]);
        record.line_coordinates = Some([0.0, 10.0, 30.0, 40.0]);
        let object = convert_record(&record, 0, 100.0).unwrap();
        assert_eq!(object.transform.left, 0.0);
        assert_eq!(object.transform.top, 60.0);
        match object.kind {
            VectorObjectKind::Line { x1, y1, x2, y2 } => {
                // (0, 90) and (30, 60) in app space, relative to (0, 60).
                assert_eq!((x1, y1), (0.0, 30.0));
                assert_eq!((x2, y2), (30.0, 0.0));
            }
            other => panic!("expected Line, got {:?}", other),
        }
    }

    #[test]
    fn test_page_import_statistics() {
        let records = vec![
            ink_record(vec![vec![0.0, 0.0, 10.0, 10.0]]),
            PdfAnnotationRecord::new(PdfSubtype::Link, [0.0, 0.0, 1.0, 1.0]),
            PdfAnnotationRecord::new(
                PdfSubtype::Unknown("Stamp".to_string()),
                [0.0, 0.0, 1.0, 1.0],
            ),
            ink_record(vec![]),
        ];
        let outcome = import_page_annotations(&records, 3, 100.0);
        assert_eq!(outcome.stats.total_found, 4);
        assert_eq!(outcome.stats.imported, 1);
        assert_eq!(outcome.stats.ignored, 1);
        assert_eq!(outcome.stats.preserved, 1);
        assert_eq!(outcome.stats.skipped, 1);
        assert_eq!(outcome.stats.by_subtype["Ink"], 2);
        assert!(outcome.unsupported_types.contains("Stamp"));
        // Link is not surfaced as unsupported.
        assert!(!outcome.unsupported_types.contains("Link"));
        assert_eq!(outcome.objects.len(), 1);
        assert_eq!(outcome.objects[0].page_index, 3);
    }
}

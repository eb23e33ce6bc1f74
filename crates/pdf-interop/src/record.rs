//! PDF-native annotation records
//!
//! The neutral exchange form between the PDF reader/writer layer and
//! the in-app object model. Field names and array layouts mirror the
//! PDF 1.7 annotation dictionary (`Rect`, `InkList`, `L`, `Vertices`,
//! `QuadPoints`, `C`, `IC`) because they are a byte-level
//! interoperability contract, not an internal choice. All coordinates
//! here are PDF-space: origin bottom-left, Y increasing upward.

/// PDF annotation subtype tag.
///
/// Subtypes outside the editable set are carried verbatim in
/// `Unknown`; their records are preserved untouched on save.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PdfSubtype {
    Ink,
    Highlight,
    FreeText,
    Square,
    Circle,
    Line,
    Polygon,
    Underline,
    StrikeOut,
    Link,
    Popup,
    Widget,
    Unknown(String),
}

impl PdfSubtype {
    /// Parse a PDF subtype name, case-sensitive per the PDF spec
    pub fn from_name(name: &str) -> Self {
        match name {
            "Ink" => PdfSubtype::Ink,
            "Highlight" => PdfSubtype::Highlight,
            "FreeText" => PdfSubtype::FreeText,
            "Square" => PdfSubtype::Square,
            "Circle" => PdfSubtype::Circle,
            "Line" => PdfSubtype::Line,
            "Polygon" => PdfSubtype::Polygon,
            "Underline" => PdfSubtype::Underline,
            "StrikeOut" => PdfSubtype::StrikeOut,
            "Link" => PdfSubtype::Link,
            "Popup" => PdfSubtype::Popup,
            "Widget" => PdfSubtype::Widget,
            other => PdfSubtype::Unknown(other.to_string()),
        }
    }

    /// The subtype's dictionary name
    pub fn name(&self) -> &str {
        match self {
            PdfSubtype::Ink => "Ink",
            PdfSubtype::Highlight => "Highlight",
            PdfSubtype::FreeText => "FreeText",
            PdfSubtype::Square => "Square",
            PdfSubtype::Circle => "Circle",
            PdfSubtype::Line => "Line",
            PdfSubtype::Polygon => "Polygon",
            PdfSubtype::Underline => "Underline",
            PdfSubtype::StrikeOut => "StrikeOut",
            PdfSubtype::Link => "Link",
            PdfSubtype::Popup => "Popup",
            PdfSubtype::Widget => "Widget",
            PdfSubtype::Unknown(name) => name,
        }
    }

    /// Interactive plumbing subtypes that imports skip without
    /// reporting to the user.
    pub fn is_silently_ignored(&self) -> bool {
        matches!(
            self,
            PdfSubtype::Link | PdfSubtype::Popup | PdfSubtype::Widget
        )
    }
}

impl From<String> for PdfSubtype {
    fn from(name: String) -> Self {
        PdfSubtype::from_name(&name)
    }
}

impl From<PdfSubtype> for String {
    fn from(subtype: PdfSubtype) -> Self {
        subtype.name().to_string()
    }
}

/// One annotation dictionary as read from (or written to) a page.
///
/// The reader layer fills in the fields the subtype uses and leaves the
/// rest empty; conversion functions validate what they need and return
/// None on malformed records.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PdfAnnotationRecord {
    /// Stable identifier assigned by the reader layer (object number or
    /// /NM entry), used to round-trip edits onto the original record
    #[serde(default)]
    pub id: Option<String>,

    #[serde(rename = "Subtype")]
    pub subtype: PdfSubtype,

    /// [x1, y1, x2, y2], bottom-left origin
    #[serde(rename = "Rect")]
    pub rect: [f64; 4],

    /// One flat x,y list per disjoint ink stroke
    #[serde(rename = "InkList", default)]
    pub ink_lists: Vec<Vec<f64>>,

    /// Line endpoints [x1, y1, x2, y2]
    #[serde(rename = "L", default)]
    pub line_coordinates: Option<[f64; 4]>,

    /// Flat polygon vertex list
    #[serde(rename = "Vertices", default)]
    pub vertices: Vec<f64>,

    /// Text-markup quadrilaterals, 8 numbers per quad
    #[serde(rename = "QuadPoints", default)]
    pub quad_points: Vec<f64>,

    /// Stroke color, 0-1 floats (length 1 grayscale, 3 RGB)
    #[serde(rename = "C", default)]
    pub color: Option<Vec<f64>>,

    /// Interior (fill) color
    #[serde(rename = "IC", default)]
    pub interior_color: Option<Vec<f64>>,

    /// Border width from the BS dictionary's W entry
    #[serde(rename = "BorderWidth", default)]
    pub border_width: Option<f64>,

    /// Constant opacity (CA), 0-1
    #[serde(rename = "CA", default)]
    pub opacity: Option<f64>,

    #[serde(rename = "Contents", default)]
    pub contents: Option<String>,
}

impl PdfAnnotationRecord {
    /// Empty record of a given subtype and rect
    pub fn new(subtype: PdfSubtype, rect: [f64; 4]) -> Self {
        Self {
            id: None,
            subtype,
            rect,
            ink_lists: Vec::new(),
            line_coordinates: None,
            vertices: Vec::new(),
            quad_points: Vec::new(),
            color: None,
            interior_color: None,
            border_width: None,
            opacity: None,
            contents: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtype_name_round_trip() {
        for name in [
            "Ink",
            "Highlight",
            "FreeText",
            "Square",
            "Circle",
            "Line",
            "Polygon",
            "Underline",
            "StrikeOut",
            "Link",
            "Popup",
            "Widget",
        ] {
            assert_eq!(PdfSubtype::from_name(name).name(), name);
        }
        let unknown = PdfSubtype::from_name("FileAttachment");
        assert_eq!(unknown, PdfSubtype::Unknown("FileAttachment".to_string()));
        assert_eq!(unknown.name(), "FileAttachment");
    }

    #[test]
    fn test_silently_ignored_subtypes() {
        assert!(PdfSubtype::Link.is_silently_ignored());
        assert!(PdfSubtype::Popup.is_silently_ignored());
        assert!(PdfSubtype::Widget.is_silently_ignored());
        assert!(!PdfSubtype::Ink.is_silently_ignored());
        assert!(!PdfSubtype::Unknown("Stamp".to_string()).is_silently_ignored());
    }

    #[test]
    fn test_record_serde_uses_pdf_field_names() {
        let mut record = PdfAnnotationRecord::new(PdfSubtype::Ink, [0.0, 0.0, 10.0, 10.0]);
        record.ink_lists = vec![vec![0.0, 0.0, 10.0, 10.0]];
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Subtype"], "Ink");
        assert!(json["Rect"].is_array());
        assert!(json["InkList"].is_array());
    }
}

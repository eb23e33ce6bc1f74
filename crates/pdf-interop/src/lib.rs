//! PDF annotation interop
//!
//! Bidirectional mapping between PDF-native annotation records
//! (bottom-left origin, ink lists, quad points) and the in-app vector
//! object model (top-left origin, typed shapes). Pure conversion: the
//! PDF reader/writer layer owns the file, this crate only translates
//! per-page record arrays.

pub mod color;
pub mod export;
pub mod import;
pub mod record;

pub use color::{color_from_components, components_from_color, default_color};
pub use export::{convert_object, export_objects};
pub use import::{
    convert_record, import_page_annotations, ImportOutcome, ImportStats, HIGHLIGHT_OPACITY,
    MARKUP_RECT_HEIGHT,
};
pub use record::{PdfAnnotationRecord, PdfSubtype};

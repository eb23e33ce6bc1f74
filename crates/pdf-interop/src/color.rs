//! PDF color array conversion
//!
//! PDF annotations store colors as arrays of 0-1 floats: length 1 is
//! grayscale, length 3 is RGB. The app model is 8-bit RGB. Each
//! channel rounds independently; a missing or malformed array falls
//! back to a subtype-specific default.

use pagemark_geometry::Color;

use crate::record::PdfSubtype;

/// Default color when the record carries no usable color array
pub fn default_color(subtype: &PdfSubtype) -> Color {
    match subtype {
        PdfSubtype::Highlight => Color::YELLOW,
        PdfSubtype::Underline | PdfSubtype::StrikeOut => Color::RED,
        _ => Color::BLACK,
    }
}

/// Convert a PDF color array into an app color
pub fn color_from_components(components: Option<&[f64]>, subtype: &PdfSubtype) -> Color {
    match components {
        Some([gray]) => {
            let v = channel(*gray);
            Color::rgb(v, v, v)
        }
        Some([r, g, b]) => Color::rgb(channel(*r), channel(*g), channel(*b)),
        _ => default_color(subtype),
    }
}

/// Convert an app color back to a 3-component PDF color array
pub fn components_from_color(color: Color) -> Vec<f64> {
    vec![
        color.r as f64 / 255.0,
        color.g as f64 / 255.0,
        color.b as f64 / 255.0,
    ]
}

fn channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

//! Font selection and text measurement for the report canvas.
//!
//! Reports use the two standard PDF Helvetica faces, so nothing has to be
//! embedded or located on disk. The width tables below are the Adobe font
//! metrics for the printable ASCII range, in thousandths of an em, and let the
//! layout align and fit text without a font file.

use printpdf::{BuiltinFont, IndirectFontRef, PdfDocumentReference};

use crate::error::ReportError;

/// Points to millimetres.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// Ellipsis appended to text shortened to fit its cell.
const ELLIPSIS: &str = "...";

/// Width used for characters outside the measured range.
const FALLBACK_WIDTH: u16 = 556;

/// The two weights a report is printed with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn glyph_width(ch: char, weight: FontWeight) -> u16 {
    let table = match weight {
        FontWeight::Regular => &HELVETICA_WIDTHS,
        FontWeight::Bold => &HELVETICA_BOLD_WIDTHS,
    };
    (ch as usize)
        .checked_sub(0x20)
        .and_then(|index| table.get(index))
        .copied()
        .unwrap_or(FALLBACK_WIDTH)
}

/// Width of `text` in millimetres when set at `size_pt`.
pub fn text_width(text: &str, weight: FontWeight, size_pt: f64) -> f64 {
    let units: u32 = text.chars().map(|ch| u32::from(glyph_width(ch, weight))).sum();
    f64::from(units) / 1000.0 * size_pt * MM_PER_PT
}

/// Shortens `text` with a trailing ellipsis until it fits into `max_width` mm.
pub fn fit_text(text: &str, weight: FontWeight, size_pt: f64, max_width: f64) -> String {
    if text_width(text, weight, size_pt) <= max_width {
        return text.to_owned();
    }

    let budget = max_width - text_width(ELLIPSIS, weight, size_pt);
    let mut fitted = String::new();
    let mut used = 0.0;
    for ch in text.chars() {
        let advance = f64::from(glyph_width(ch, weight)) / 1000.0 * size_pt * MM_PER_PT;
        if used + advance > budget {
            break;
        }
        used += advance;
        fitted.push(ch);
    }

    let trimmed = fitted.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}{ELLIPSIS}")
    }
}

/// Builtin font references registered with one PDF document.
pub struct FontPair {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl FontPair {
    /// Registers Helvetica and Helvetica-Bold with `document`.
    pub fn install(document: &PdfDocumentReference) -> Result<Self, ReportError> {
        let regular = document
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(ReportError::pdf)?;
        let bold = document
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(ReportError::pdf)?;
        Ok(Self { regular, bold })
    }

    /// Returns the font reference for `weight`.
    pub fn get(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_text_is_wider() {
        let regular = text_width("Room No", FontWeight::Regular, 12.0);
        let bold = text_width("Room No", FontWeight::Bold, 12.0);
        assert!(bold > regular);
    }

    #[test]
    fn width_scales_with_size() {
        let small = text_width("LOGO", FontWeight::Regular, 8.0);
        let large = text_width("LOGO", FontWeight::Regular, 16.0);
        assert!((large - 2.0 * small).abs() < 1e-9);
    }

    #[test]
    fn digits_use_tabular_width() {
        // 10 digits at 10pt: 10 * 0.556 * 10pt
        let width = text_width("0123456789", FontWeight::Regular, 10.0);
        assert!((width - 55.6 * MM_PER_PT).abs() < 1e-9);
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(fit_text("I BBA", FontWeight::Regular, 9.0, 50.0), "I BBA");
    }

    #[test]
    fn long_text_gets_an_ellipsis() {
        let name = "Venkata Lakshmi Narasimha Subramanian Iyer Ramachandran";
        let fitted = fit_text(name, FontWeight::Regular, 9.0, 40.0);
        assert!(fitted.ends_with("..."));
        assert!(text_width(&fitted, FontWeight::Regular, 9.0) <= 40.0);
    }
}

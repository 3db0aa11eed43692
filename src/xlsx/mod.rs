//! Minimal SpreadsheetML (.xlsx) writer.
//!
//! Covers what the availability workbook needs: string and formula cells
//! (with cached results), cell formats, column widths and visibility, list
//! data validation, `containsText` conditional formatting and hidden
//! gridlines, packaged as an OPC ZIP archive.
//!
//! All row and column arguments are 1-based, matching spreadsheet notation.
//!
//! # Example
//!
//! ```rust,no_run
//! use availability_matrix::xlsx::Workbook;
//!
//! let mut wb = Workbook::new();
//! let ws = wb.add_worksheet("Data");
//! ws.set_cell_value(1, 1, "Region");
//! ws.set_cell_formula(2, 1, "A1&\"|\"");
//! wb.save("out.xlsx")?;
//! # Ok::<(), availability_matrix::Error>(())
//! ```

pub mod format;
pub mod package;
pub mod sheet;
pub mod strings;
pub mod styles;
pub mod workbook;

pub use format::{
    CellAlignment, CellBorder, CellBorderLineStyle, CellBorderSide, CellFill, CellFont,
    CellFormat, ConditionalFormat, DataValidation, HorizontalAlignment,
};
pub use sheet::{CellValue, Worksheet};
pub use strings::SharedStrings;
pub use styles::StylesBuilder;
pub use workbook::{DocumentProperties, Workbook};

/// Escape XML special characters.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Convert a 1-based column number to letters (1 -> "A", 27 -> "AA").
pub fn column_letters(col: u32) -> String {
    let mut letters = String::new();
    let mut col = col;

    while col > 0 {
        col -= 1;
        let letter = ((col % 26) as u8 + b'A') as char;
        letters.insert(0, letter);
        col /= 26;
    }

    letters
}

/// A1-style reference for a 1-based (row, column) pair.
pub fn cell_ref(row: u32, col: u32) -> String {
    format!("{}{}", column_letters(col), row)
}

/// A1-style range such as `B8:E14`.
pub fn range_ref(first_row: u32, first_col: u32, last_row: u32, last_col: u32) -> String {
    format!(
        "{}:{}",
        cell_ref(first_row, first_col),
        cell_ref(last_row, last_col)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(5), "E");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(702), "ZZ");
    }

    #[test]
    fn test_refs() {
        assert_eq!(cell_ref(4, 3), "C4");
        assert_eq!(range_ref(8, 2, 14, 5), "B8:E14");
    }

    #[test]
    fn test_xml_escaping() {
        assert_eq!(
            escape_xml(r#"<a & "b">'"#),
            "&lt;a &amp; &quot;b&quot;&gt;&apos;"
        );
    }
}

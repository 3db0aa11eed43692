//! Formatting types shared by worksheets and the styles builder.

/// Cell format information.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFormat {
    pub font: Option<CellFont>,
    pub fill: Option<CellFill>,
    pub border: Option<CellBorder>,
    pub alignment: Option<CellAlignment>,
}

impl CellFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, font: CellFont) -> Self {
        self.font = Some(font);
        self
    }

    /// Solid background fill.
    pub fn with_fill(mut self, color: &str) -> Self {
        self.fill = Some(CellFill::solid(color));
        self
    }

    pub fn with_border(mut self, border: CellBorder) -> Self {
        self.border = Some(border);
        self
    }

    pub fn with_alignment(mut self, horizontal: HorizontalAlignment) -> Self {
        self.alignment = Some(CellAlignment { horizontal });
        self
    }
}

/// Font properties for a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFont {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    /// RGB or ARGB hex
    pub color: Option<String>,
}

impl CellFont {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

/// Fill properties for a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellFill {
    pub pattern_type: CellFillPatternType,
    pub fg_color: Option<String>,
    pub bg_color: Option<String>,
}

impl CellFill {
    pub fn solid(color: &str) -> Self {
        Self {
            pattern_type: CellFillPatternType::Solid,
            fg_color: Some(color.to_string()),
            bg_color: None,
        }
    }
}

/// Cell fill pattern types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFillPatternType {
    None,
    Solid,
    Gray125,
}

impl CellFillPatternType {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Solid => "solid",
            Self::Gray125 => "gray125",
        }
    }
}

/// Border properties for a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellBorder {
    pub left: Option<CellBorderSide>,
    pub right: Option<CellBorderSide>,
    pub top: Option<CellBorderSide>,
    pub bottom: Option<CellBorderSide>,
}

impl CellBorder {
    /// Same line on all four sides.
    pub fn all(style: CellBorderLineStyle) -> Self {
        let side = Some(CellBorderSide { style, color: None });
        Self {
            left: side.clone(),
            right: side.clone(),
            top: side.clone(),
            bottom: side,
        }
    }

    /// Bottom line only.
    pub fn bottom(style: CellBorderLineStyle) -> Self {
        Self {
            bottom: Some(CellBorderSide { style, color: None }),
            ..Default::default()
        }
    }
}

/// Border side properties.
#[derive(Debug, Clone, PartialEq)]
pub struct CellBorderSide {
    pub style: CellBorderLineStyle,
    pub color: Option<String>,
}

/// Border line styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellBorderLineStyle {
    Thin,
}

impl CellBorderLineStyle {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Thin => "thin",
        }
    }
}

/// Cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAlignment {
    pub horizontal: HorizontalAlignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlignment {
    Center,
}

impl HorizontalAlignment {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Center => "center",
        }
    }
}

/// Dropdown list validation over a cell range.
#[derive(Debug, Clone, PartialEq)]
pub struct DataValidation {
    /// Range (e.g., "C4")
    pub range: String,
    /// Allowed values, written as a literal comma-separated list
    pub values: Vec<String>,
    pub allow_blank: bool,
    pub show_error_alert: bool,
    pub error_title: Option<String>,
    pub error_message: Option<String>,
}

impl DataValidation {
    /// List validation that rejects blanks and anything off the list.
    pub fn list(range: &str, values: &[String]) -> Self {
        Self {
            range: range.to_string(),
            values: values.to_vec(),
            allow_blank: false,
            show_error_alert: true,
            error_title: None,
            error_message: None,
        }
    }
}

/// `containsText` conditional formatting rule.
///
/// Cells in `range` whose text contains `text` take `format`, which is
/// written as a differential format (dxf).
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalFormat {
    /// Range (e.g., "B8:E14")
    pub range: String,
    pub text: String,
    /// Priority (lower = higher priority)
    pub priority: u32,
    pub format: CellFormat,
}

/// Normalize an RGB hex color to the ARGB form SpreadsheetML expects.
pub(crate) fn argb(color: &str) -> String {
    let hex = color.trim_start_matches('#');
    if hex.len() == 6 {
        format!("FF{}", hex.to_ascii_uppercase())
    } else {
        hex.to_ascii_uppercase()
    }
}

//! Styles.xml generator.
//!
//! Collects the unique fonts, fills and borders used by cell formats,
//! assigns them indices and renders `xl/styles.xml`. Conditional formats
//! register differential formats (dxfs) here as well.

use crate::error::Result;
use crate::xlsx::escape_xml;
use crate::xlsx::format::{
    CellAlignment, CellBorder, CellBorderSide, CellFill, CellFillPatternType, CellFont,
    CellFormat, argb,
};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt::Write as FmtWrite;
use std::hash::{Hash, Hasher};

/// Cell format record (XF).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct XfRecord {
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    alignment: Option<CellAlignment>,
}

/// Builder for `xl/styles.xml`.
#[derive(Debug)]
pub struct StylesBuilder {
    fonts: Vec<CellFont>,
    font_map: HashMap<u64, usize>,
    fills: Vec<CellFill>,
    fill_map: HashMap<u64, usize>,
    borders: Vec<CellBorder>,
    border_map: HashMap<u64, usize>,
    cell_formats: Vec<XfRecord>,
    cell_format_map: HashMap<u64, usize>,
    /// Differential formats referenced by conditional formatting rules
    dxfs: Vec<CellFormat>,
    dxf_map: HashMap<u64, usize>,
}

impl StylesBuilder {
    /// Create a builder holding the records Excel requires at fixed indices.
    pub fn new() -> Self {
        let mut builder = Self {
            fonts: Vec::new(),
            font_map: HashMap::new(),
            fills: Vec::new(),
            fill_map: HashMap::new(),
            borders: Vec::new(),
            border_map: HashMap::new(),
            cell_formats: Vec::new(),
            cell_format_map: HashMap::new(),
            dxfs: Vec::new(),
            dxf_map: HashMap::new(),
        };

        builder.add_font(&CellFont::default());

        // Fills 0 and 1 are reserved: none, then gray125.
        for pattern_type in [CellFillPatternType::None, CellFillPatternType::Gray125] {
            builder.add_fill(&CellFill {
                pattern_type,
                fg_color: None,
                bg_color: None,
            });
        }

        builder.add_border(&CellBorder::default());

        let default_format = CellFormat::default();
        builder.cell_formats.push(XfRecord {
            font_id: 0,
            fill_id: 0,
            border_id: 0,
            alignment: None,
        });
        builder
            .cell_format_map
            .insert(Self::hash_cell_format(&default_format), 0);

        builder
    }

    /// Add a cell format and return its style index.
    ///
    /// If the format has already been added, returns the existing index.
    pub fn add_cell_format(&mut self, format: &CellFormat) -> usize {
        let format_hash = Self::hash_cell_format(format);
        if let Some(&index) = self.cell_format_map.get(&format_hash) {
            return index;
        }

        let font_id = format.font.as_ref().map_or(0, |font| self.add_font(font));
        let fill_id = format.fill.as_ref().map_or(0, |fill| self.add_fill(fill));
        let border_id = format
            .border
            .as_ref()
            .map_or(0, |border| self.add_border(border));

        let index = self.cell_formats.len();
        self.cell_formats.push(XfRecord {
            font_id,
            fill_id,
            border_id,
            alignment: format.alignment,
        });
        self.cell_format_map.insert(format_hash, index);

        index
    }

    /// Add a differential format and return its dxf index.
    pub fn add_dxf(&mut self, format: &CellFormat) -> usize {
        let hash = Self::hash_cell_format(format);
        if let Some(&index) = self.dxf_map.get(&hash) {
            return index;
        }

        let index = self.dxfs.len();
        self.dxfs.push(format.clone());
        self.dxf_map.insert(hash, index);
        index
    }

    fn add_font(&mut self, font: &CellFont) -> usize {
        let hash = Self::hash_font(font);
        if let Some(&index) = self.font_map.get(&hash) {
            return index;
        }

        let index = self.fonts.len();
        self.fonts.push(font.clone());
        self.font_map.insert(hash, index);
        index
    }

    fn add_fill(&mut self, fill: &CellFill) -> usize {
        let hash = Self::hash_fill(fill);
        if let Some(&index) = self.fill_map.get(&hash) {
            return index;
        }

        let index = self.fills.len();
        self.fills.push(fill.clone());
        self.fill_map.insert(hash, index);
        index
    }

    fn add_border(&mut self, border: &CellBorder) -> usize {
        let hash = Self::hash_border(border);
        if let Some(&index) = self.border_map.get(&hash) {
            return index;
        }

        let index = self.borders.len();
        self.borders.push(border.clone());
        self.border_map.insert(hash, index);
        index
    }

    /// Generate the complete styles.xml content.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        write!(xml, r#"<fonts count="{}">"#, self.fonts.len())?;
        for font in &self.fonts {
            write_font(&mut xml, font, true)?;
        }
        xml.push_str("</fonts>");

        write!(xml, r#"<fills count="{}">"#, self.fills.len())?;
        for fill in &self.fills {
            write_fill(&mut xml, fill)?;
        }
        xml.push_str("</fills>");

        write!(xml, r#"<borders count="{}">"#, self.borders.len())?;
        for border in &self.borders {
            write_border(&mut xml, border)?;
        }
        xml.push_str("</borders>");

        xml.push_str(r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#);

        write!(xml, r#"<cellXfs count="{}">"#, self.cell_formats.len())?;
        for xf in &self.cell_formats {
            write!(
                xml,
                r#"<xf numFmtId="0" fontId="{}" fillId="{}" borderId="{}" xfId="0""#,
                xf.font_id, xf.fill_id, xf.border_id
            )?;
            if xf.font_id != 0 {
                xml.push_str(r#" applyFont="1""#);
            }
            if xf.fill_id != 0 {
                xml.push_str(r#" applyFill="1""#);
            }
            if xf.border_id != 0 {
                xml.push_str(r#" applyBorder="1""#);
            }
            match xf.alignment {
                Some(alignment) => write!(
                    xml,
                    r#" applyAlignment="1"><alignment horizontal="{}"/></xf>"#,
                    alignment.horizontal.as_str()
                )?,
                None => xml.push_str("/>"),
            }
        }
        xml.push_str("</cellXfs>");

        xml.push_str(r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#);

        write!(xml, r#"<dxfs count="{}">"#, self.dxfs.len())?;
        for dxf in &self.dxfs {
            write_dxf(&mut xml, dxf)?;
        }
        xml.push_str("</dxfs>");

        xml.push_str("</styleSheet>");

        Ok(xml)
    }

    fn hash_font(font: &CellFont) -> u64 {
        let mut hasher = DefaultHasher::new();
        font.bold.hash(&mut hasher);
        font.italic.hash(&mut hasher);
        font.name.hash(&mut hasher);
        font.size.map(f64::to_bits).hash(&mut hasher);
        font.color.as_deref().map(argb).hash(&mut hasher);
        hasher.finish()
    }

    fn hash_fill(fill: &CellFill) -> u64 {
        let mut hasher = DefaultHasher::new();
        std::mem::discriminant(&fill.pattern_type).hash(&mut hasher);
        fill.fg_color.as_deref().map(argb).hash(&mut hasher);
        fill.bg_color.as_deref().map(argb).hash(&mut hasher);
        hasher.finish()
    }

    fn hash_border(border: &CellBorder) -> u64 {
        let mut hasher = DefaultHasher::new();
        for side in [&border.left, &border.right, &border.top, &border.bottom] {
            Self::hash_border_side(side, &mut hasher);
        }
        hasher.finish()
    }

    fn hash_border_side(side: &Option<CellBorderSide>, hasher: &mut impl Hasher) {
        match side {
            Some(s) => {
                1u8.hash(hasher);
                std::mem::discriminant(&s.style).hash(hasher);
                s.color.as_deref().map(argb).hash(hasher);
            },
            None => 0u8.hash(hasher),
        }
    }

    fn hash_cell_format(format: &CellFormat) -> u64 {
        let mut hasher = DefaultHasher::new();
        format.font.as_ref().map(Self::hash_font).hash(&mut hasher);
        format.fill.as_ref().map(Self::hash_fill).hash(&mut hasher);
        format.border.as_ref().map(Self::hash_border).hash(&mut hasher);
        format
            .alignment
            .map(|a| std::mem::discriminant(&a.horizontal))
            .hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for StylesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a font element. Cell fonts always carry size and name; dxf fonts
/// only carry what they override.
fn write_font(xml: &mut String, font: &CellFont, full: bool) -> Result<()> {
    xml.push_str("<font>");

    if font.bold {
        xml.push_str("<b/>");
    }
    if font.italic {
        xml.push_str("<i/>");
    }

    match font.size {
        Some(size) => write!(xml, r#"<sz val="{}"/>"#, size)?,
        None if full => xml.push_str(r#"<sz val="11"/>"#),
        None => {},
    }

    if let Some(ref color) = font.color {
        write!(xml, r#"<color rgb="{}"/>"#, escape_xml(&argb(color)))?;
    }

    match font.name {
        Some(ref name) => write!(xml, r#"<name val="{}"/>"#, escape_xml(name))?,
        None if full => xml.push_str(r#"<name val="Calibri"/>"#),
        None => {},
    }

    xml.push_str("</font>");
    Ok(())
}

fn write_fill(xml: &mut String, fill: &CellFill) -> Result<()> {
    write!(
        xml,
        r#"<fill><patternFill patternType="{}">"#,
        fill.pattern_type.as_str()
    )?;

    if let Some(ref fg_color) = fill.fg_color {
        write!(xml, r#"<fgColor rgb="{}"/>"#, escape_xml(&argb(fg_color)))?;
    }
    if let Some(ref bg_color) = fill.bg_color {
        write!(xml, r#"<bgColor rgb="{}"/>"#, escape_xml(&argb(bg_color)))?;
    }

    xml.push_str("</patternFill></fill>");
    Ok(())
}

fn write_border(xml: &mut String, border: &CellBorder) -> Result<()> {
    xml.push_str("<border>");

    write_border_side(xml, "left", border.left.as_ref())?;
    write_border_side(xml, "right", border.right.as_ref())?;
    write_border_side(xml, "top", border.top.as_ref())?;
    write_border_side(xml, "bottom", border.bottom.as_ref())?;
    xml.push_str("<diagonal/>");

    xml.push_str("</border>");
    Ok(())
}

fn write_border_side(
    xml: &mut String,
    side: &str,
    border_side: Option<&CellBorderSide>,
) -> Result<()> {
    match border_side {
        Some(bs) => {
            write!(xml, r#"<{} style="{}">"#, side, bs.style.as_str())?;
            if let Some(ref color) = bs.color {
                write!(xml, r#"<color rgb="{}"/>"#, escape_xml(&argb(color)))?;
            } else {
                xml.push_str(r#"<color auto="1"/>"#);
            }
            write!(xml, "</{}>", side)?;
        },
        None => write!(xml, "<{}/>", side)?,
    }
    Ok(())
}

/// Write a differential format. A dxf solid fill paints with `bgColor`.
fn write_dxf(xml: &mut String, format: &CellFormat) -> Result<()> {
    xml.push_str("<dxf>");

    if let Some(ref font) = format.font {
        write_font(xml, font, false)?;
    }
    if let Some(ref fill) = format.fill {
        let color = fill.fg_color.as_ref().or(fill.bg_color.as_ref());
        match color {
            Some(color) => write!(
                xml,
                r#"<fill><patternFill><bgColor rgb="{}"/></patternFill></fill>"#,
                escape_xml(&argb(color))
            )?,
            None => xml.push_str("<fill><patternFill/></fill>"),
        }
    }
    if let Some(ref border) = format.border {
        write_border(xml, border)?;
    }

    xml.push_str("</dxf>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::format::{CellBorderLineStyle, HorizontalAlignment};

    #[test]
    fn test_create_default_styles() {
        let builder = StylesBuilder::new();
        assert_eq!(builder.fonts.len(), 1);
        assert_eq!(builder.fills.len(), 2);
        assert_eq!(builder.borders.len(), 1);
        assert_eq!(builder.cell_formats.len(), 1);
        assert!(builder.dxfs.is_empty());
    }

    #[test]
    fn test_add_cell_format_deduplicates() {
        let mut builder = StylesBuilder::new();
        let format = CellFormat::new().with_font(CellFont::bold());

        let index = builder.add_cell_format(&format);
        assert_eq!(index, 1);
        assert_eq!(builder.add_cell_format(&format), index);

        // Same font, different alignment is a new XF sharing the font.
        let centered = format.clone().with_alignment(HorizontalAlignment::Center);
        assert_eq!(builder.add_cell_format(&centered), 2);
        assert_eq!(builder.fonts.len(), 2);
    }

    #[test]
    fn test_default_format_maps_to_zero() {
        let mut builder = StylesBuilder::new();
        assert_eq!(builder.add_cell_format(&CellFormat::default()), 0);
    }

    #[test]
    fn test_header_format_xml() {
        let mut builder = StylesBuilder::new();
        let header = CellFormat::new()
            .with_font(CellFont::bold().with_color("FFFFFF"))
            .with_fill("203764")
            .with_border(CellBorder::all(CellBorderLineStyle::Thin))
            .with_alignment(HorizontalAlignment::Center);
        builder.add_cell_format(&header);

        let xml = builder.to_xml().unwrap();
        assert!(xml.contains(r#"<fgColor rgb="FF203764"/>"#));
        assert!(xml.contains(r#"<color rgb="FFFFFFFF"/>"#));
        assert!(xml.contains(r#"<left style="thin">"#));
        assert!(xml.contains(r#"applyAlignment="1"><alignment horizontal="center"/></xf>"#));
        assert!(xml.contains(r#"<cellXfs count="2">"#));
    }

    #[test]
    fn test_dxf_xml() {
        let mut builder = StylesBuilder::new();
        let green = CellFormat::new()
            .with_font(CellFont::default().with_color("FFFFFF"))
            .with_fill("70AD47");
        let amber = CellFormat::new().with_fill("FFC000");

        assert_eq!(builder.add_dxf(&green), 0);
        assert_eq!(builder.add_dxf(&amber), 1);
        assert_eq!(builder.add_dxf(&green), 0);

        let xml = builder.to_xml().unwrap();
        assert!(xml.contains(r#"<dxfs count="2">"#));
        assert!(xml.contains(
            r#"<dxf><font><color rgb="FFFFFFFF"/></font><fill><patternFill><bgColor rgb="FF70AD47"/></patternFill></fill></dxf>"#
        ));
        assert!(xml.contains(
            r#"<dxf><fill><patternFill><bgColor rgb="FFFFC000"/></patternFill></fill></dxf>"#
        ));
    }
}

//! Availability workbook layout.
//!
//! Lays out three sheets: the fact table (`Service_Input`), a region-driven
//! service dashboard and a product dashboard whose formulas apply the
//! worst-wins rule inside the spreadsheet. Formula cells carry cached values
//! resolved here for the default region, the first one in the catalog.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::facts::FactTable;
use crate::formula::{self, HEADER_ROW, INPUT_SHEET};
use crate::resolver::{Grid, Resolver};
use crate::status::Status;
use crate::xlsx::{
    CellBorder, CellBorderLineStyle, CellFont, CellFormat, ConditionalFormat, DataValidation,
    HorizontalAlignment, Workbook, Worksheet, column_letters, range_ref,
};
use std::path::Path;
use tracing::{debug, info};

pub const SERVICE_DASHBOARD: &str = "Service_Dashboard";
pub const PRODUCT_DASHBOARD: &str = "Product_Dashboard";

const INPUT_HEADERS: [&str; 5] = ["Region", "Service", "Language", "Status", "Lookup_Key"];
const KEY_COLUMN: u32 = 5;
const FIRST_GRID_COLUMN: u32 = 2;
const LANGUAGE_COLUMN_WIDTH: f64 = 15.0;
const GRID_COLUMN_WIDTH: f64 = 20.0;

const DARK_BLUE: &str = "203764";
const MID_BLUE: &str = "2F5597";
const WHITE: &str = "FFFFFF";
const NOTE_GREY: &str = "555555";

/// Fill color of each status in the conditional formats, and whether the
/// font turns white on it.
fn status_style(status: Status) -> (&'static str, bool) {
    match status {
        Status::FullSupport => ("70AD47", true),
        Status::LimitedSupport => ("FFC000", false),
        Status::NotSupported => ("ED7D31", true),
    }
}

fn header_format(fill: &str) -> CellFormat {
    CellFormat::new()
        .with_font(CellFont::bold().with_color(WHITE))
        .with_fill(fill)
        .with_alignment(HorizontalAlignment::Center)
}

fn grid_cell_format() -> CellFormat {
    CellFormat::new()
        .with_border(CellBorder::all(CellBorderLineStyle::Thin))
        .with_alignment(HorizontalAlignment::Center)
}

/// Builds the availability workbook from a catalog and its facts.
pub struct MatrixBuilder<'a> {
    catalog: &'a Catalog,
    facts: &'a FactTable,
}

impl<'a> MatrixBuilder<'a> {
    pub fn new(catalog: &'a Catalog, facts: &'a FactTable) -> Self {
        Self { catalog, facts }
    }

    /// Region shown when the workbook opens.
    pub fn default_region(&self) -> Result<&'a str> {
        self.catalog
            .regions()
            .first()
            .map(String::as_str)
            .ok_or_else(|| Error::Config("catalog has no regions".to_string()))
    }

    /// Lay out all three sheets.
    ///
    /// Fails with [`Error::MissingFact`] before building anything if a
    /// catalog triple has no fact.
    pub fn build(&self) -> Result<Workbook> {
        self.facts.validate_against(self.catalog)?;

        let region = self.default_region()?;
        let resolver = Resolver::new(self.catalog, self.facts);
        let service_grid = resolver.service_grid(region)?;
        let product_grid = resolver.product_grid(region)?;

        let mut workbook = Workbook::new();
        workbook.properties_mut().title = Some("Smart Availability Matrix".to_string());

        self.write_input_sheet(workbook.add_worksheet(INPUT_SHEET));
        self.write_service_dashboard(workbook.add_worksheet(SERVICE_DASHBOARD), &service_grid)?;
        self.write_product_dashboard(workbook.add_worksheet(PRODUCT_DASHBOARD), &product_grid)?;

        Ok(workbook)
    }

    /// Build and save to `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.build()?.save(path)?;
        info!(path = %path.display(), facts = self.facts.len(), "availability matrix written");
        Ok(())
    }

    fn write_input_sheet(&self, ws: &mut Worksheet) {
        let header = CellFormat::new()
            .with_font(CellFont::bold().with_color(WHITE))
            .with_fill(DARK_BLUE);
        for (col, title) in (1..).zip(INPUT_HEADERS) {
            ws.set_cell_value(1, col, title);
            ws.set_cell_format(1, col, header.clone());
        }

        for (row, fact) in (2..).zip(self.facts.facts()) {
            ws.set_cell_value(row, 1, &fact.region);
            ws.set_cell_value(row, 2, &fact.service);
            ws.set_cell_value(row, 3, &fact.language);
            ws.set_cell_value(row, 4, fact.status.as_str());
            ws.set_cell_formula_with_cache(
                row,
                KEY_COLUMN,
                &formula::lookup_key(row),
                &fact.key_text(),
            );
        }
        ws.hide_column(KEY_COLUMN);

        debug!(rows = self.facts.len(), "laid out {}", INPUT_SHEET);
    }

    /// Title, region selector and dropdown shared by both dashboards.
    fn write_header(&self, ws: &mut Worksheet, title: &str, region: &str) {
        ws.set_show_grid_lines(false);

        ws.set_cell_value(2, 2, title);
        ws.set_cell_format(
            2,
            2,
            CellFormat::new().with_font(CellFont::bold().with_size(16.0).with_color(DARK_BLUE)),
        );

        ws.set_cell_value(4, 2, "Select Region:");
        ws.set_cell_value(4, 3, region);
        ws.set_cell_format(
            4,
            3,
            CellFormat::new()
                .with_font(CellFont::bold())
                .with_border(CellBorder::bottom(CellBorderLineStyle::Thin)),
        );
        let mut validation = DataValidation::list("C4", self.catalog.regions());
        validation.error_title = Some("Unknown region".to_string());
        validation.error_message = Some("Pick a region from the list.".to_string());
        ws.add_data_validation(validation);

        ws.set_cell_value(HEADER_ROW, 1, "Language");
        ws.set_cell_format(HEADER_ROW, 1, CellFormat::new().with_font(CellFont::bold()));
        ws.set_column_width(1, LANGUAGE_COLUMN_WIDTH);
    }

    /// Column headers, language rows and status coloring around a grid.
    /// `formula_for(col, header, row)` gives the formula of each grid cell.
    fn write_grid<F>(
        &self,
        ws: &mut Worksheet,
        grid: &Grid,
        header_fill: &str,
        formula_for: F,
    ) -> Result<()>
    where
        F: Fn(u32, &str, u32) -> Result<String>,
    {
        let header = header_format(header_fill);
        for (col, name) in (FIRST_GRID_COLUMN..).zip(&grid.columns) {
            ws.set_cell_value(HEADER_ROW, col, name);
            ws.set_cell_format(HEADER_ROW, col, header.clone());
            ws.set_column_width(col, GRID_COLUMN_WIDTH);
        }

        let cell_format = grid_cell_format();
        let label = CellFormat::new().with_font(CellFont::bold());
        for ((row, language), statuses) in (HEADER_ROW + 1..).zip(&grid.rows).zip(&grid.cells) {
            ws.set_cell_value(row, 1, language);
            ws.set_cell_format(row, 1, label.clone());

            for ((col, name), status) in (FIRST_GRID_COLUMN..).zip(&grid.columns).zip(statuses) {
                let formula = formula_for(col, name, row)?;
                ws.set_cell_formula_with_cache(row, col, &formula, status.as_str());
                ws.set_cell_format(row, col, cell_format.clone());
            }
        }

        if !grid.columns.is_empty() && !grid.rows.is_empty() {
            let range = range_ref(
                HEADER_ROW + 1,
                FIRST_GRID_COLUMN,
                HEADER_ROW + grid.rows.len() as u32,
                FIRST_GRID_COLUMN + grid.columns.len() as u32 - 1,
            );
            add_status_rules(ws, &range);
        }

        Ok(())
    }

    fn write_service_dashboard(&self, ws: &mut Worksheet, grid: &Grid) -> Result<()> {
        self.write_header(ws, "SERVICE AVAILABILITY MATRIX", &grid.region);
        // The service name is read back from the header cell.
        self.write_grid(ws, grid, MID_BLUE, |col, _service, row| {
            Ok(formula::service_lookup(&column_letters(col), row))
        })?;

        debug!(
            services = grid.columns.len(),
            languages = grid.rows.len(),
            "laid out {}",
            SERVICE_DASHBOARD
        );
        Ok(())
    }

    fn write_product_dashboard(&self, ws: &mut Worksheet, grid: &Grid) -> Result<()> {
        self.write_header(ws, "PRODUCT AVAILABILITY MATRIX (Auto-Calculated)", &grid.region);

        if let Some(note) = self.dependency_note() {
            ws.set_cell_value(4, 5, note);
            ws.set_cell_format(
                4,
                5,
                CellFormat::new().with_font(
                    CellFont::default()
                        .with_italic()
                        .with_size(9.0)
                        .with_color(NOTE_GREY),
                ),
            );
        }

        let catalog = self.catalog;
        self.write_grid(ws, grid, DARK_BLUE, |_col, product, row| {
            formula::product_formula(catalog.dependencies(product)?, row)
        })?;

        debug!(
            products = grid.columns.len(),
            languages = grid.rows.len(),
            "laid out {}",
            PRODUCT_DASHBOARD
        );
        Ok(())
    }

    /// Legend naming the first product's dependencies.
    fn dependency_note(&self) -> Option<String> {
        let product = self.catalog.products().first()?;
        Some(format!(
            "*Calculated based on dependencies (e.g. {} requires {})",
            product.name,
            product.depends_on.join(", ")
        ))
    }
}

/// Color grid cells by the status text they show.
fn add_status_rules(ws: &mut Worksheet, range: &str) {
    for (priority, status) in (1..).zip(Status::ALL) {
        let (fill, white_font) = status_style(status);
        let mut format = CellFormat::new().with_fill(fill);
        if white_font {
            format = format.with_font(CellFont::default().with_color(WHITE));
        }
        ws.add_conditional_format(ConditionalFormat {
            range: range.to_string(),
            text: status.as_str().to_string(),
            priority,
            format,
        });
    }
}

/// Build the workbook for `catalog` and `facts` and save it to `path`.
pub fn write_matrix<P: AsRef<Path>>(catalog: &Catalog, facts: &FactTable, path: P) -> Result<()> {
    MatrixBuilder::new(catalog, facts).write(path)
}

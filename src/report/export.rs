//! Spreadsheet export of the statistics table.

use rust_xlsxwriter::{Format, FormatAlign, Workbook, XlsxError};
use thiserror::Error;
use tracing::debug;

use crate::models::{StatsRow, WarWindow};

/// File name used when the spreadsheet is sent or saved.
pub const EXPORT_FILE_NAME: &str = "stats.xlsx";

const SHEET_NAME: &str = "Statistics";

/// Header row, in column order.
pub const COLUMNS: [&str; 9] = [
    "Date",
    "Player",
    "TH",
    "CW Attack 1",
    "CW Attack 2",
    "CWL Attack 1",
    "CWL Attack 2",
    "Average stars",
    "Total attacks",
];

const DATE_COLUMN: u16 = 0;
const DATE_COLUMN_WIDTH: f64 = 4.0;

/// Errors that can occur while rendering a spreadsheet.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),
}

/// A run of consecutive rows sharing one war window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateGroup {
    /// Index of the first row in the group
    pub first: usize,
    /// Index of the last row in the group (inclusive)
    pub last: usize,
    pub window: WarWindow,
}

impl DateGroup {
    /// Rows covered by the group.
    pub fn row_count(&self) -> usize {
        self.last - self.first + 1
    }
}

/// Split rows into runs of equal war windows.
///
/// A new group starts exactly where the window differs from the previous row.
pub fn date_groups(rows: &[StatsRow]) -> Vec<DateGroup> {
    let mut groups: Vec<DateGroup> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        match groups.last_mut() {
            Some(group) if group.window == row.window => group.last = i,
            _ => groups.push(DateGroup {
                first: i,
                last: i,
                window: row.window,
            }),
        }
    }

    groups
}

/// Cell text for every column except the date, used for sizing.
fn cell_texts(row: &StatsRow) -> [String; 8] {
    [
        row.name.clone(),
        row.level.to_string(),
        row.cw_attacks[0].to_string(),
        row.cw_attacks[1].to_string(),
        row.cwl_attacks[0].to_string(),
        row.cwl_attacks[1].to_string(),
        format!("{:.2}", row.average_stars),
        row.attack_count.to_string(),
    ]
}

/// Render the table as an `.xlsx` workbook.
///
/// Rows keep table order; each date group gets one merged, rotated label.
pub fn render_xlsx(rows: &[StatsRow]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    let header_format = Format::new().set_bold();
    let date_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_rotation(90)
        .set_font_size(14);
    let average_format = Format::new().set_num_format("0.00");

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, title) in COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &header_format)?;
        }

        let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.chars().count()).collect();

        for (i, row) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 1, row.name.as_str())?;
            sheet.write_number(r, 2, row.level)?;
            sheet.write_number(r, 3, row.cw_attacks[0])?;
            sheet.write_number(r, 4, row.cw_attacks[1])?;
            sheet.write_number(r, 5, row.cwl_attacks[0])?;
            sheet.write_number(r, 6, row.cwl_attacks[1])?;
            sheet.write_number_with_format(r, 7, row.average_stars, &average_format)?;
            sheet.write_number(r, 8, row.attack_count)?;

            for (offset, text) in cell_texts(row).iter().enumerate() {
                let width = &mut widths[offset + 1];
                *width = (*width).max(text.chars().count());
            }
        }

        for group in date_groups(rows) {
            let first = group.first as u32 + 1;
            let last = group.last as u32 + 1;
            let label = group.window.to_string();
            if group.row_count() == 1 {
                sheet.write_string_with_format(first, DATE_COLUMN, label.as_str(), &date_format)?;
            } else {
                sheet.merge_range(first, DATE_COLUMN, last, DATE_COLUMN, &label, &date_format)?;
            }
        }

        sheet.set_column_width(DATE_COLUMN, DATE_COLUMN_WIDTH)?;
        for (col, width) in widths.iter().enumerate().skip(1) {
            sheet.set_column_width(col as u16, (*width + 2) as f64)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    debug!("Rendered {} rows into {} bytes", rows.len(), bytes.len());
    Ok(bytes)
}

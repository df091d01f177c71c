//! Workbook I/O.
//!
//! Workbooks are read with calamine (xlsx, xls, ods) into a plain cell grid
//! and written back as xlsx with rust_xlsxwriter. Sheet names, order and
//! absolute cell positions survive the round trip.

use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;

use bioblock_common::{BioBlockError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, XlsxError};
use tracing::{debug, info, warn};

use crate::anonymizer::{RedactionReport, Redactor};

/// Extensions accepted for upload
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "ods"];

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Longest string an xlsx cell can hold, in characters
pub const MAX_CELL_CHARS: usize = 32_767;

const MAX_SHEET_NAME_CHARS: usize = 31;
const SHEET_NAME_FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Whether a file name carries a supported spreadsheet extension
pub fn is_supported_file(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Excel serial date
    DateTime(f64),
    /// Error literal such as `#DIV/0!`
    Error(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Display form used for identifiers
    pub fn to_plain_string(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) | Cell::Error(text) => text.clone(),
            Cell::Int(value) => value.to_string(),
            Cell::Float(value) | Cell::DateTime(value) => value.to_string(),
            Cell::Bool(value) => value.to_string(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
            Data::Error(e) => Cell::Error(e.to_string()),
        }
    }
}

/// One worksheet as a dense grid anchored at A1
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Set a cell, growing the grid as needed
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, Cell::default);
        }
        cells[col] = cell;
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(Cell::is_empty))
    }
}

/// An in-memory workbook
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

fn spreadsheet_error(context: &str, err: impl std::fmt::Display) -> BioBlockError {
    BioBlockError::spreadsheet(format!("{}: {}", context, err))
}

/// Writing happens after the upload parsed, so failures are ours
fn xlsx_error(err: XlsxError) -> BioBlockError {
    BioBlockError::redaction(format!("Failed to write workbook: {}", err))
}

/// Fit a sheet name read from xls/ods to the xlsx naming rules
fn xlsx_sheet_name(name: &str, index: usize) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if SHEET_NAME_FORBIDDEN.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_matches('\'');

    if cleaned.trim().is_empty() {
        format!("Sheet{}", index + 1)
    } else {
        cleaned.to_string()
    }
}

/// Cut `text` to at most `MAX_CELL_CHARS` characters. Returns whether it was cut.
fn clamp_cell_text(text: &mut String) -> bool {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((byte_index, _)) => {
            text.truncate(byte_index);
            true
        }
        None => false,
    }
}

impl Workbook {
    /// Parse xlsx, xls or ods bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mut reader = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| spreadsheet_error("Unreadable spreadsheet", e))?;

        let mut sheets = Vec::new();
        for name in reader.sheet_names() {
            let range = reader
                .worksheet_range(&name)
                .map_err(|e| spreadsheet_error(&format!("Unreadable sheet '{}'", name), e))?;

            let mut sheet = Sheet::new(name.clone());
            if let Some((start_row, start_col)) = range.start() {
                for (row, col, data) in range.used_cells() {
                    sheet.set(
                        start_row as usize + row,
                        start_col as usize + col,
                        Cell::from(data),
                    );
                }
            }
            debug!("Read sheet '{}' with {} rows", sheet.name, sheet.rows.len());
            sheets.push(sheet);
        }

        Ok(Self { sheets })
    }

    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    /// Serialize as xlsx
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = XlsxWorkbook::new();
        let date_format = Format::new().set_num_format(DATETIME_FORMAT);

        for (index, sheet) in self.sheets.iter().enumerate() {
            let name = xlsx_sheet_name(&sheet.name, index);
            if name != sheet.name {
                warn!("Sheet '{}' written as '{}'", sheet.name, name);
            }
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name.as_str()).map_err(xlsx_error)?;

            for (r, row) in sheet.rows.iter().enumerate() {
                let r = u32::try_from(r)
                    .map_err(|_| BioBlockError::redaction("Row index out of range"))?;
                for (c, cell) in row.iter().enumerate() {
                    let c = u16::try_from(c)
                        .map_err(|_| BioBlockError::redaction("Column index out of range"))?;
                    match cell {
                        Cell::Empty => {}
                        Cell::Text(text) | Cell::Error(text) => {
                            worksheet.write_string(r, c, text.as_str()).map_err(xlsx_error)?;
                        }
                        Cell::Int(value) => {
                            worksheet.write_number(r, c, *value as f64).map_err(xlsx_error)?;
                        }
                        Cell::Float(value) => {
                            worksheet.write_number(r, c, *value).map_err(xlsx_error)?;
                        }
                        Cell::Bool(value) => {
                            worksheet.write_boolean(r, c, *value).map_err(xlsx_error)?;
                        }
                        Cell::DateTime(serial) => {
                            worksheet
                                .write_number_with_format(r, c, *serial, &date_format)
                                .map_err(xlsx_error)?;
                        }
                    }
                }
            }
        }

        workbook.save_to_buffer().map_err(xlsx_error)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_xlsx_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Redact PII in every text cell. Non-text cells pass through.
    pub fn redact(&mut self, redactor: &Redactor) -> RedactionReport {
        let mut report = RedactionReport::default();

        for sheet in &mut self.sheets {
            for (r, row) in sheet.rows.iter_mut().enumerate() {
                for (c, cell) in row.iter_mut().enumerate() {
                    let Cell::Text(text) = cell else {
                        continue;
                    };
                    if text.is_empty() {
                        continue;
                    }
                    if let Cow::Owned(mut redacted) =
                        redactor.redact_counted(text.as_str(), &mut report)
                    {
                        if clamp_cell_text(&mut redacted) {
                            warn!(
                                "Redacted cell ({}, {}) on sheet '{}' truncated to {} characters",
                                r, c, sheet.name, MAX_CELL_CHARS
                            );
                        }
                        *text = redacted;
                    }
                }
            }
        }

        info!(
            "Redacted {} of {} text cells ({} entities)",
            report.cells_redacted,
            report.cells_scanned,
            report.total_entities()
        );
        report
    }
}

//! PHI column masking.
//!
//! Columns whose header names a protected health identifier are replaced with
//! a per-patient pseudonym `WID_<8 hex>`. When a sheet has a patient-id column
//! the pseudonym is derived from the normalized patient id, so the same
//! patient maps to the same pseudonym across rows and sheets. Otherwise every
//! non-empty row gets a fresh random pseudonym.

use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use crate::spreadsheet::{Cell, Sheet, Workbook};

/// Header fragments that mark a column as PHI
pub const PHI_KEYWORDS: [&str; 23] = [
    "dob",
    "date of birth",
    "address",
    "phone",
    "mobile",
    "email",
    "ssn",
    "social security",
    "mrn",
    "medical record",
    "health plan",
    "license",
    "account number",
    "ip address",
    "device id",
    "biometric",
    "photo",
    "facial",
    "fingerprint",
    "signature",
    "first name",
    "last name",
    "name",
];

const PSEUDONYM_PREFIX: &str = "WID_";

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Header matches a PHI keyword, ignoring case and inner whitespace
pub fn is_phi_header(header: &str) -> bool {
    let lower = header.to_lowercase();
    let compact = strip_whitespace(&lower);
    PHI_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword) || compact.contains(&strip_whitespace(keyword)))
}

pub fn is_patient_id_header(header: &str) -> bool {
    let lower = header.to_lowercase();
    lower.contains("patient") && lower.contains("id")
}

/// `WID_` followed by the first 8 hex chars of sha256(input)
pub fn pseudonym(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let hex = hex::encode(digest);
    format!("{}{}", PSEUDONYM_PREFIX, &hex[..8])
}

/// Outcome of masking one workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhiReport {
    pub sheets_masked: usize,
    pub columns_masked: usize,
    pub cells_masked: usize,
}

struct SheetPlan {
    header_row: usize,
    patient_id_col: Option<usize>,
    columns: Vec<usize>,
}

fn plan_sheet(sheet: &Sheet) -> Option<SheetPlan> {
    let header_row = sheet
        .rows
        .iter()
        .position(|row| row.iter().any(|cell| !cell.is_empty()))?;
    let headers = &sheet.rows[header_row];

    // Last matching header wins
    let patient_id_col = headers
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| cell.as_text().filter(|h| is_patient_id_header(h)).map(|_| i))
        .last();

    let columns = headers
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| {
            let header = cell.as_text().filter(|h| !h.is_empty())?;
            (Some(i) == patient_id_col || is_phi_header(header)).then_some(i)
        })
        .collect();

    Some(SheetPlan {
        header_row,
        patient_id_col,
        columns,
    })
}

fn mask_row(row: &mut [Cell], columns: &[usize], id: &str) -> usize {
    let mut masked = 0;
    for &col in columns {
        if let Some(cell) = row.get_mut(col) {
            if !cell.is_empty() {
                *cell = Cell::Text(id.to_string());
                masked += 1;
            }
        }
    }
    masked
}

/// Mask PHI columns in every sheet
pub fn anonymize_phi(workbook: &mut Workbook) -> PhiReport {
    let mut report = PhiReport::default();

    for sheet in &mut workbook.sheets {
        let Some(plan) = plan_sheet(sheet) else {
            continue;
        };
        if plan.columns.is_empty() {
            debug!("Sheet '{}' has no PHI columns", sheet.name);
            continue;
        }

        report.sheets_masked += 1;
        report.columns_masked += plan.columns.len();

        for row in sheet.rows.iter_mut().skip(plan.header_row + 1) {
            let id = match plan.patient_id_col {
                Some(col) => {
                    let patient_id = row
                        .get(col)
                        .map(|cell| cell.to_plain_string().trim().to_lowercase())
                        .unwrap_or_default();
                    if patient_id.is_empty() {
                        continue;
                    }
                    pseudonym(&patient_id)
                }
                None => {
                    if row.iter().all(Cell::is_empty) {
                        continue;
                    }
                    pseudonym(&Uuid::new_v4().to_string())
                }
            };
            report.cells_masked += mask_row(row, &plan.columns, &id);
        }

        debug!(
            "Sheet '{}': masked columns {:?} (patient id column {:?})",
            sheet.name, plan.columns, plan.patient_id_col
        );
    }

    info!(
        "Masked {} PHI cells in {} columns across {} sheets",
        report.cells_masked, report.columns_masked, report.sheets_masked
    );
    report
}

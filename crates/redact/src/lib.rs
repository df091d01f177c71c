pub mod analyzer;
pub mod anonymizer;
pub mod phi;
pub mod recognizers;
pub mod spreadsheet;

pub use analyzer::{EntityType, PiiAnalyzer, PiiSpan};
pub use anonymizer::{anonymize, RedactionReport, Redactor};
pub use phi::{anonymize_phi, is_phi_header, pseudonym, PhiReport, PHI_KEYWORDS};
pub use spreadsheet::{is_supported_file, Cell, Sheet, Workbook, SUPPORTED_EXTENSIONS};

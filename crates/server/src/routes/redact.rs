use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{post, web, HttpResponse};
use bioblock_common::BioBlockError;
use bioblock_redact::{anonymize_phi, is_supported_file, Workbook};
use chrono::Utc;
use futures_util::StreamExt;
use std::sync::Arc;
use tracing::info;

use crate::error::{failed, ApiError};
use crate::state::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Spreadsheet received in the `file` form field
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

fn malformed(err: impl std::fmt::Display) -> ApiError {
    ApiError::bad_request(format!("Malformed upload: {}", err))
}

async fn read_upload(mut payload: Multipart, limit: usize) -> Result<Upload, ApiError> {
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(malformed)?;

        let content_disposition = field.content_disposition();
        let is_file = content_disposition.get_name() == Some("file");
        let file_name = content_disposition
            .get_filename()
            .unwrap_or_default()
            .to_string();

        if !is_file {
            while let Some(chunk) = field.next().await {
                chunk.map_err(malformed)?;
            }
            continue;
        }

        if !is_supported_file(&file_name) {
            return Err(ApiError::bad_request(
                "Invalid file type. Please upload a spreadsheet (.xlsx, .xls or .ods).",
            ));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(malformed)?;
            if bytes.len() + chunk.len() > limit {
                return Err(ApiError::bad_request(format!(
                    "File too large. Maximum size is {} bytes.",
                    limit
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(Upload { file_name, bytes });
    }

    Err(ApiError::bad_request(
        "No file uploaded. Please upload a spreadsheet.",
    ))
}

fn xlsx_attachment(prefix: &str, bytes: Vec<u8>) -> HttpResponse {
    let file_name = format!("{}_{}.xlsx", prefix, Utc::now().timestamp_millis());
    HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ))
        .body(bytes)
}

/// Run a workbook transform off the async runtime
async fn transform<F>(context: &'static str, bytes: Vec<u8>, f: F) -> Result<Vec<u8>, ApiError>
where
    F: FnOnce(&mut Workbook) + Send + 'static,
{
    web::block(move || {
        let mut workbook = Workbook::from_bytes(bytes)?;
        f(&mut workbook);
        workbook.to_xlsx_bytes()
    })
    .await
    .map_err(|e| ApiError::from_domain(context, BioBlockError::internal(e.to_string())))?
    .map_err(failed(context))
}

/// Replace PII in every text cell
#[post("/redact")]
pub async fn redact(
    payload: Multipart,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let upload = read_upload(payload, state.config.max_upload_bytes).await?;
    info!("Redacting '{}' ({} bytes)", upload.file_name, upload.bytes.len());

    let redactor = state.redactor.clone();
    let output = transform("Failed to redact file", upload.bytes, move |workbook| {
        workbook.redact(&redactor);
    })
    .await?;

    Ok(xlsx_attachment("redacted", output))
}

/// Mask PHI columns with per-patient pseudonyms
#[post("/anonymize")]
pub async fn anonymize(
    payload: Multipart,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let upload = read_upload(payload, state.config.max_upload_bytes).await?;
    info!("Anonymizing '{}' ({} bytes)", upload.file_name, upload.bytes.len());

    let output = transform("Failed to anonymize file", upload.bytes, |workbook| {
        anonymize_phi(workbook);
    })
    .await?;

    Ok(xlsx_attachment("phi_anonymized", output))
}

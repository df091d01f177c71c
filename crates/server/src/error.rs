use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use bioblock_common::BioBlockError;
use std::fmt;
use tracing::error;

use crate::types::ErrorResponse;

/// Error returned by handlers, rendered as `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Client errors keep their message. Server faults are logged here and
    /// the client only sees `context`.
    pub fn from_domain(context: &str, err: BioBlockError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_client_error() {
            let message = match err {
                BioBlockError::InvalidInput(msg) | BioBlockError::Spreadsheet(msg) => msg,
                other => other.to_string(),
            };
            return Self { status, message };
        }

        error!("{}: {}", context, err);
        Self {
            status,
            message: context.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// `map_err` adapter: `.map_err(failed("Failed to store data"))`
pub fn failed(context: &'static str) -> impl Fn(BioBlockError) -> ApiError {
    move |err| ApiError::from_domain(context, err)
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(ErrorResponse {
            error: self.message.clone(),
        })
    }
}

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Failures talking to the range store or obtaining its credential
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("range store request failed: {0}")]
    Network(String),

    #[error("Google API Error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("range store response could not be decoded: {0}")]
    Decode(String),

    #[error("Auth Error: {0}")]
    Auth(String),
}

/// Everything that can abort a signup or a state read
#[derive(Debug, Error)]
pub enum SignupError {
    #[error("Invalid body: {0}")]
    Validation(String),

    #[error("Invalid Date {0}")]
    InvalidLabel(String),

    #[error("Invalid date: there is no slot at {date} {time}")]
    SlotNotFound { date: String, time: String },

    #[error("Sorry, this slot is no longer available.")]
    SlotFull { date: String, time: String },

    #[error("Sorry, {cell} was taken while your signup was in progress. Please try again.")]
    Conflict { cell: String },

    #[error("Bracket sheet is inconsistent: {0}")]
    BrokenProgression(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type SignupResult<T> = Result<T, SignupError>;

impl ResponseError for SignupError {
    fn status_code(&self) -> StatusCode {
        match self {
            SignupError::Validation(_) | SignupError::InvalidLabel(_) => StatusCode::BAD_REQUEST,
            SignupError::SlotNotFound { .. } => StatusCode::NOT_FOUND,
            SignupError::SlotFull { .. } | SignupError::Conflict { .. } => StatusCode::CONFLICT,
            SignupError::BrokenProgression(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SignupError::Store(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
        }))
    }
}

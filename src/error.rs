use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable error codes returned to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    MissingParameters,
    InvalidParameters,
    BadRequest,
    NotFound,
    Conflict,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            ErrorCode::MissingParameters => "MissingParameters",
            ErrorCode::InvalidParameters => "InvalidParameters",
            ErrorCode::BadRequest => "BadRequest",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::Conflict => "Conflict",
            ErrorCode::InternalError => "InternalError",
        };
        f.write_str(code)
    }
}

/// Pointer to the part of the request that caused an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSource {
    Field(String),
    Parameter(String),
    Header(String),
}

impl ErrorSource {
    pub fn field(pointer: impl Into<String>) -> Self {
        ErrorSource::Field(pointer.into())
    }

    pub fn header(name: impl Into<String>) -> Self {
        ErrorSource::Header(name.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
}

impl ErrorDetail {
    pub fn new(code: ErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: ErrorSource) -> Self {
        self.source = Some(source);
        self
    }
}

/// Body returned to callers for any failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorDetail>,
}

/// Errors surfaced by bundle and content item operations
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("{}", .0.description)]
    Validation(ErrorDetail),

    #[error("{}", .0.description)]
    Transition(ErrorDetail),

    #[error("{}", .0.description)]
    Conflict(ErrorDetail),

    #[error("{}", .0.description)]
    NotFound(ErrorDetail),

    #[error("{description}: {cause}")]
    Internal { description: String, cause: String },
}

pub type BundleResult<T> = Result<T, BundleError>;

impl BundleError {
    pub fn missing_field(pointer: &str) -> Self {
        BundleError::Validation(
            ErrorDetail::new(
                ErrorCode::MissingParameters,
                format!("missing required field: {pointer}"),
            )
            .with_source(ErrorSource::field(pointer)),
        )
    }

    pub fn invalid_field(pointer: &str, description: impl Into<String>) -> Self {
        BundleError::Validation(
            ErrorDetail::new(ErrorCode::InvalidParameters, description)
                .with_source(ErrorSource::field(pointer)),
        )
    }

    pub fn missing_header(header: &str) -> Self {
        BundleError::Validation(
            ErrorDetail::new(
                ErrorCode::MissingParameters,
                format!("missing precondition header: {header}"),
            )
            .with_source(ErrorSource::header(header)),
        )
    }

    pub fn transition(description: impl Into<String>) -> Self {
        BundleError::Transition(ErrorDetail::new(ErrorCode::BadRequest, description))
    }

    pub fn conflict(description: impl Into<String>) -> Self {
        BundleError::Conflict(ErrorDetail::new(ErrorCode::Conflict, description))
    }

    pub fn conflict_at(description: impl Into<String>, source: ErrorSource) -> Self {
        BundleError::Conflict(ErrorDetail::new(ErrorCode::Conflict, description).with_source(source))
    }

    pub fn not_found(description: impl Into<String>) -> Self {
        BundleError::NotFound(ErrorDetail::new(ErrorCode::NotFound, description))
    }

    pub fn not_found_at(description: impl Into<String>, source: ErrorSource) -> Self {
        BundleError::NotFound(ErrorDetail::new(ErrorCode::NotFound, description).with_source(source))
    }

    pub fn internal(description: impl Into<String>, cause: impl fmt::Display) -> Self {
        BundleError::Internal {
            description: description.into(),
            cause: cause.to_string(),
        }
    }

    /// HTTP status the transport layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            BundleError::Validation(_) | BundleError::Transition(_) => 400,
            BundleError::NotFound(_) => 404,
            BundleError::Conflict(_) => 409,
            BundleError::Internal { .. } => 500,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            BundleError::Validation(detail)
            | BundleError::Transition(detail)
            | BundleError::Conflict(detail)
            | BundleError::NotFound(detail) => detail.code,
            BundleError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    pub fn source_pointer(&self) -> Option<&ErrorSource> {
        match self {
            BundleError::Validation(detail)
            | BundleError::Transition(detail)
            | BundleError::Conflict(detail)
            | BundleError::NotFound(detail) => detail.source.as_ref(),
            BundleError::Internal { .. } => None,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let detail = match self {
            BundleError::Validation(detail)
            | BundleError::Transition(detail)
            | BundleError::Conflict(detail)
            | BundleError::NotFound(detail) => detail.clone(),
            // Causes stay in the logs, callers only get the description
            BundleError::Internal { description, .. } => {
                ErrorDetail::new(ErrorCode::InternalError, description.clone())
            }
        };
        ErrorResponse {
            errors: vec![detail],
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, BundleError::Internal { .. })
    }
}

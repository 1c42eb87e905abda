use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Which part of a shift a validation or persistence failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftErrorType {
    Date,
    Duration,
    Location,
    Availabilities,
    Saving,
}

impl ShiftErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftErrorType::Date => "date",
            ShiftErrorType::Duration => "duration",
            ShiftErrorType::Location => "location",
            ShiftErrorType::Availabilities => "availabilities",
            ShiftErrorType::Saving => "saving",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ShiftError {
    pub kind: ShiftErrorType,
    pub message: String,
}

impl ShiftError {
    pub fn new(kind: ShiftErrorType, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn saving(message: impl Into<String>) -> Self {
        Self::new(ShiftErrorType::Saving, message)
    }
}

/// Account and profile failures, each with a message fit for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ErrorType {
    #[error("The user ID is invalid.")]
    InvalidUserId,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please enter a valid phone number.")]
    InvalidPhoneNumber,
    #[error("The account data could not be encoded.")]
    EncodingError,
    #[error("The account could not be updated. Please try again.")]
    UpdateError,
    #[error("First name is required.")]
    RequiredFirstName,
    #[error("Last name is required.")]
    RequiredLastName,
    #[error("Email is required.")]
    RequiredEmail,
    #[error("Employee number is required.")]
    RequiredEmployeeNumber,
}

impl ErrorType {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorType::InvalidUserId => "invalidUserID",
            ErrorType::InvalidEmail => "invalidEmail",
            ErrorType::InvalidPhoneNumber => "invalidPhoneNumber",
            ErrorType::EncodingError => "encodingError",
            ErrorType::UpdateError => "updateError",
            ErrorType::RequiredFirstName => "requiredFirstName",
            ErrorType::RequiredLastName => "requiredLastName",
            ErrorType::RequiredEmail => "requiredEmail",
            ErrorType::RequiredEmployeeNumber => "requiredEmployeeNumber",
        }
    }
}

/// Title and message pair shown when responding to an offer fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{title}: {message}")]
pub struct ErrorAlert {
    pub title: String,
    pub message: String,
}

impl ErrorAlert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Shift(#[from] ShiftError),

    #[error("{0}")]
    Account(#[from] ErrorType),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, field) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            AppError::Shift(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.message, Some(e.kind.as_str())),
            AppError::Account(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string(), Some(e.code())),
        };

        let body = match field {
            Some(field) => Json(json!({
                "error": message,
                "field": field
            })),
            None => Json(json!({
                "error": message
            })),
        };

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    /// Form-level failure: the listed fields were missing or blank.
    /// No state is mutated when this is returned.
    #[error("{message}")]
    Validation {
        message: String,
        missing_fields: Vec<String>,
    },

    /// State-precondition failure: the request arrived out of order
    /// (empty cart, skipped checkout step, order not cancellable).
    /// `redirect_to` names the step the client should return to.
    #[error("{message}")]
    Precondition {
        message: String,
        redirect_to: &'static str,
    },

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn missing_fields(fields: Vec<String>) -> Self {
        let message = format!(
            "Please fill in the following fields: {}",
            fields.join(", ")
        );
        AppError::Validation {
            message,
            missing_fields: fields,
        }
    }

    pub fn precondition(message: impl Into<String>, redirect_to: &'static str) -> Self {
        AppError::Precondition {
            message: message.into(),
            redirect_to,
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_to: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Precondition { .. } => StatusCode::CONFLICT,
            AppError::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::OrmError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let (missing_fields, redirect_to) = match &self {
            AppError::Validation { missing_fields, .. } => (Some(missing_fields.clone()), None),
            AppError::Precondition { redirect_to, .. } => (None, Some(redirect_to.to_string())),
            _ => (None, None),
        };

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
                missing_fields,
                redirect_to,
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

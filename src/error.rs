use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::models::ValidationError;
use crate::store::StoreError;

pub const NOT_FOUND_MESSAGE: &str = "No jokes found in the database.";
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred.";

// JSON body for every error except 429
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadJson(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no jokes stored")]
    NotFound,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadJson(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::RateLimited => return status.into_response(),
            ApiError::NotFound => NOT_FOUND_MESSAGE.to_string(),
            // store details stay in the logs
            ApiError::Store(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        };
        (status, Json(MessageBody { message })).into_response()
    }
}

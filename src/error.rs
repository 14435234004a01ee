//! Error handling and custom error types
//!
//! Provides unified error handling across the gateway using thiserror. Each
//! variant knows which HTTP status it maps to and what may be shown to callers.

use axum::http::StatusCode;
use thiserror::Error;

/// Message returned to callers for any failure of the model capability.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to generate response from AI";

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedMediaType(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status the response normalizer reports for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MissingField(_) | Error::UnknownFeature(_) | Error::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::Http(_)
            | Error::AiProvider(_)
            | Error::Io(_)
            | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Validation errors are safe to echo; everything else is replaced with a
    /// generic message so provider details never reach the caller.
    pub fn public_message(&self) -> String {
        if self.is_validation() {
            self.to_string()
        } else {
            UPSTREAM_FAILURE_MESSAGE.to_string()
        }
    }

    pub fn is_validation(&self) -> bool {
        self.status().is_client_error()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

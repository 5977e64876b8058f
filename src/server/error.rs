use axum::{
    http::StatusCode,
    response::{IntoResponse, Response}
};
use anyhow;

use bankledger::LedgerError;

#[derive(Debug)]
pub(crate) enum ServerError {
    BadRequest(String),
    NotFound(String),
    Unprocessable(String),
    InternalError(anyhow::Error)
}

impl ServerError {
    /// Puts `prefix` in front of the message shown to the client.
    pub(crate) fn prefixed(self, prefix: &str) -> Self {
        match self {
            Self::BadRequest(msg) => Self::BadRequest(format!("{} {}", prefix, msg)),
            Self::NotFound(msg) => Self::NotFound(format!("{} {}", prefix, msg)),
            Self::Unprocessable(msg) => Self::Unprocessable(format!("{} {}", prefix, msg)),
            Self::InternalError(err) => Self::InternalError(err.context(prefix.to_owned()))
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) =>
                (StatusCode::BAD_REQUEST, msg).into_response(),
            Self::NotFound(msg) =>
                (StatusCode::NOT_FOUND, msg).into_response(),
            Self::Unprocessable(msg) =>
                (StatusCode::UNPROCESSABLE_ENTITY, msg).into_response(),
            Self::InternalError(err) =>
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {:#}", err)).into_response()
        }
    }
}

impl From<LedgerError> for ServerError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidAmount(..) | LedgerError::MalformedRecord(..) =>
                Self::BadRequest(err.to_string()),
            LedgerError::AccountNotFound(..) =>
                Self::NotFound(err.to_string()),
            LedgerError::InsufficientBalance { .. } =>
                Self::Unprocessable(err.to_string()),
            LedgerError::StorageUnavailable { .. } =>
                Self::InternalError(err.into())
        }
    }
}

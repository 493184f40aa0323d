use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("improperly configured: {0}")]
    Config(#[from] config::ConfigError),
    #[error("store unavailable: {0}")]
    Store(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl Error {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Error::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::Db(_) => "ERR-DB-000",
            Error::Migrate(_) => "ERR-DB-001",
            Error::Io(_) => "ERR-IO-000",
            Error::Config(_) => "ERR-CONF-000",
            Error::Store(_) => "ERR-STORE-000",
            Error::BadRequest(_) => "ERR-REQ-001",
            Error::NotFound(_) => "ERR-REQ-004",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "request failed: {}", &self);
        } else {
            tracing::debug!(code = self.code(), "request rejected: {}", &self);
        }
        (
            status,
            Json(json!({
                "code": self.code(),
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_status() {
        assert_eq!(Error::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::bad_request("x").code(), "ERR-REQ-001");
    }

    #[test]
    fn store_failures_are_internal() {
        let err = Error::Store("lock poisoned".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "store unavailable: lock poisoned");
    }

    #[test]
    fn sqlx_errors_convert() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert_eq!(err.code(), "ERR-DB-000");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

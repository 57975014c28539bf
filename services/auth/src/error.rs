use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
///
/// Credential and code failures deliberately carry no detail — the audit
/// trail records the specific reason, the caller only sees the class.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("invalid code")]
    InvalidCode,
    #[error("email already exists")]
    EmailAlreadyExists,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("entity not found")]
    NotFoundEntity,
    #[error("entity deleted")]
    EntityDeleted,
    #[error("entity already exists")]
    AlreadyExistEntity,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCode => "INVALID_CODE",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFoundEntity => "NOT_FOUND_ENTITY",
            Self::EntityDeleted => "ENTITY_DELETED",
            Self::AlreadyExistEntity => "ALREADY_EXIST_ENTITY",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidCode | Self::Unauthorized | Self::EntityDeleted => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFoundEntity => StatusCode::NOT_FOUND,
            Self::EmailAlreadyExists | Self::AlreadyExistEntity => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — the trace layer already records method/uri/status for
        // all requests. 4xx are expected client errors; logging them here would
        // be noise. Internal errors need the anyhow chain logged so the root
        // cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

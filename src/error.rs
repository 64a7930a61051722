use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Network failure or non-2xx status from the upstream catalog.
    #[error("upstream catalog unavailable ({status:?}): {body}")]
    UpstreamUnavailable { status: Option<u16>, body: String },

    /// Upstream payload is missing or has unparseable expected fields.
    #[error("malformed upstream record: {0}")]
    MalformedRecord(String),

    /// Referenced resource does not exist locally.
    #[error("{0}")]
    NotFound(&'static str),

    /// Rejected request input, scoped to a single field.
    #[error("{message}")]
    Validation { field: &'static str, message: &'static str },

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::UpstreamUnavailable { status, body } => {
                tracing::error!(status = ?status, body = %body, "upstream catalog unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({"detail": "Upstream catalog unavailable."}),
                )
            },
            AppError::MalformedRecord(reason) => {
                tracing::error!(reason = %reason, "malformed upstream record");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({"detail": "Upstream catalog returned malformed data."}),
                )
            },
            AppError::NotFound(detail) => (StatusCode::NOT_FOUND, json!({"detail": detail})),
            AppError::Validation { field, message } => {
                let mut body = serde_json::Map::new();
                body.insert(field.to_string(), json!([message]));
                (StatusCode::BAD_REQUEST, serde_json::Value::Object(body))
            },
            AppError::Db(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"detail": "Internal server error."}),
                )
            },
        };

        (status, Json(body)).into_response()
    }
}

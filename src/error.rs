use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("movie {0} is not in your collection")]
    NotFound(i32),

    #[error("{0}")]
    Conflict(String),

    #[error("movie database request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("movie database returned an unexpected payload: {0}")]
    UpstreamPayload(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) | AppError::UpstreamPayload(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                "A database error occurred".to_string()
            },
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                "An internal error occurred".to_string()
            },
            AppError::Upstream(_) | AppError::UpstreamPayload(_) => {
                tracing::error!(error = %self, "movie database error");
                self.to_string()
            },
            AppError::NotFound(_) | AppError::Conflict(_) => self.to_string(),
        };

        let body = crate::templates::error_page(status, &message);
        (status, Html(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

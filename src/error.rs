use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Unauthorized(UnauthorizedType),

    #[error("Access denied. You do not have permission.")]
    Forbidden,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Server error")]
    DatabaseError(#[from] mongodb::error::Error),

    #[error("Server error")]
    PasswordHashError(#[from] argon2::password_hash::Error),

    #[error("Server error")]
    JWTError(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum UnauthorizedType {
    #[error("Unauthorized")]
    MissingToken,

    #[error("Token is invalid or expired")]
    InvalidToken,

    #[error("Invalid credentials")]
    WrongCredentials,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorJson {
    success: bool,
    message: String,
}

impl From<Error> for ErrorJson {
    fn from(err: Error) -> Self {
        Self {
            success: false,
            message: err.to_string(),
        }
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(..) | Self::ValidationError(..) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(..) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(..) => StatusCode::NOT_FOUND,
            Self::DatabaseError(..)
            | Self::PasswordHashError(..)
            | Self::JWTError(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        // the Display impls of the 500 variants hide the source, so log it here
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("error: {:?}", self);
        }

        let error = ErrorJson::from(self);

        (status, Json(error)).into_response()
    }
}

use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{CategoryError, ErrorKind, UserError, VaultError};

use serde::Serialize;
pub use server::{ServerConfig, router, run_with_listener};
pub use validation::FieldErrors;

mod categories;
mod memberships;
mod server;
mod session;
mod token;
mod user;
mod validation;
mod vault;

pub mod types {
    pub mod user {
        pub use api_types::user::{Login, LoginToken, UserNew, UserView, UsersResponse};
    }

    pub mod vault {
        pub use api_types::vault::{VaultCreated, VaultNew, VaultView, VaultsResponse};
    }

    pub mod membership {
        pub use api_types::membership::{MemberAdd, MembershipRole};
    }

    pub mod category {
        pub use api_types::category::{
            CategoryStatus, ExpenseCategoriesResponse, ExpenseCategoryCreated,
            ExpenseCategoryNew, ExpenseCategoryUpdate, ExpenseCategoryView,
        };
    }
}

#[derive(Debug)]
pub enum ServerError {
    User(UserError),
    Vault(VaultError),
    Category(CategoryError),
    Validation(FieldErrors),
    Token(jsonwebtoken::errors::Error),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Status and client-facing message of a service error.
fn engine_response(kind: ErrorKind, err: &dyn std::error::Error) -> (StatusCode, String) {
    let status = status_for_kind(kind);
    if kind == ErrorKind::Unexpected {
        tracing::error!("unexpected error: {err}");
        return (status, "internal server error".to_string());
    }
    (status, err.to_string())
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::User(UserError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                UserError::InvalidCredentials.to_string(),
            ),
            ServerError::User(err) => engine_response(err.kind(), &err),
            ServerError::Vault(err) => engine_response(err.kind(), &err),
            ServerError::Category(err) => engine_response(err.kind(), &err),
            ServerError::Validation(errors) => {
                return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
            }
            ServerError::Token(err) => {
                tracing::error!("failed to issue token: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<jsonwebtoken::errors::Error> for ServerError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::Token(value)
    }
}

impl From<UserError> for ServerError {
    fn from(value: UserError) -> Self {
        Self::User(value)
    }
}

impl From<VaultError> for ServerError {
    fn from(value: VaultError) -> Self {
        Self::Vault(value)
    }
}

impl From<CategoryError> for ServerError {
    fn from(value: CategoryError) -> Self {
        Self::Category(value)
    }
}

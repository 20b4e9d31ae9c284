//! Unauthenticated endpoints: health check, registration and login.

use api_types::user::{Login, LoginToken, UserNew};
use axum::{Json, extract::State, http::StatusCode};
use engine::NewUser;

use crate::{ServerError, server::ServerState, validation::Validator};

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Handle registration. Only routed when registration is enabled.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<StatusCode, ServerError> {
    Validator::new()
        .name("first_name", &payload.first_name)
        .name("last_name", &payload.last_name)
        .email("email", &payload.email)
        .password("password", &payload.password)
        .finish()?;

    state
        .engine
        .users()
        .create_one(NewUser {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Check credentials and mint an access token for the user.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Login>,
) -> Result<Json<LoginToken>, ServerError> {
    Validator::new()
        .email("email", &payload.email)
        .required("password", &payload.password)
        .finish()?;

    let user = state
        .engine
        .users()
        .authenticate(&payload.email, &payload.password)
        .await?;

    Ok(Json(state.tokens.issue(&user.id)?))
}

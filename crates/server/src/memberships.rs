//! Membership management endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use api_types::membership::{MemberAdd, MembershipRole};
use engine::{User, VaultRole};

use crate::{ServerError, server::ServerState, validation::Validator};

/// Invite a user into a vault. Only the `editor` role can be granted here.
pub async fn add_user(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(vault_id): Path<String>,
    Json(payload): Json<MemberAdd>,
) -> Result<StatusCode, ServerError> {
    Validator::new()
        .required("user_id", &payload.user_id)
        .check(
            "role",
            payload.role == MembershipRole::Editor,
            "must be editor",
        )
        .finish()?;

    state
        .engine
        .vaults()
        .add_user(&user.id, &payload.user_id, &vault_id, VaultRole::Editor)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

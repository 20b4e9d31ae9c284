//! Vault API endpoints

use api_types::{
    membership::MembershipRole,
    vault::{VaultCreated, VaultNew, VaultView, VaultsResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{User, UserVault, VaultRole};

use crate::{ServerError, server::ServerState, validation::Validator};

fn membership_role(role: VaultRole) -> MembershipRole {
    match role {
        VaultRole::Owner => MembershipRole::Owner,
        VaultRole::Editor => MembershipRole::Editor,
    }
}

fn vault_view(vault: UserVault) -> VaultView {
    VaultView {
        id: vault.id,
        name: vault.name,
        role: membership_role(vault.role),
    }
}

/// Handle requests for creating new vaults. The caller becomes owner.
pub async fn vault_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<VaultNew>,
) -> Result<(StatusCode, Json<VaultCreated>), ServerError> {
    Validator::new().name("name", &payload.name).finish()?;

    let id = state
        .engine
        .vaults()
        .create_one(&user.id, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(VaultCreated { id })))
}

/// Handle requests for listing the caller's vaults
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<VaultsResponse>, ServerError> {
    let vaults = state
        .engine
        .vaults()
        .find_all(&user.id)
        .await?
        .into_iter()
        .map(vault_view)
        .collect();

    Ok(Json(VaultsResponse { vaults }))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(vault_id): Path<String>,
) -> Result<Json<VaultView>, ServerError> {
    let vault = state
        .engine
        .vaults()
        .find_one_by_id(&user.id, &vault_id)
        .await?;
    Ok(Json(vault_view(vault)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(vault_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .vaults()
        .delete_one_by_id(&user.id, &vault_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Switch the caller's active vault.
pub async fn set_active(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(vault_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .vaults()
        .set_active(&user.id, &vault_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

//! User endpoints

use api_types::user::{UserView, UsersResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::User;

use crate::{ServerError, server::ServerState};

pub(crate) fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        active_vault: user.active_vault,
        created_at: user.created_at,
    }
}

/// The authenticated user.
pub async fn current(Extension(user): Extension<User>) -> Json<UserView> {
    Json(user_view(user))
}

pub async fn list(
    Extension(_): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<UsersResponse>, ServerError> {
    let users = state
        .engine
        .users()
        .find_all()
        .await?
        .into_iter()
        .map(user_view)
        .collect();

    Ok(Json(UsersResponse { users }))
}

pub async fn get(
    Extension(_): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.users().find_one_by_id(&id).await?;
    Ok(Json(user_view(user)))
}

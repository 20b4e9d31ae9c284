//! Expense category endpoints

use api_types::category::{
    CategoryStatus, ExpenseCategoriesResponse, ExpenseCategoryCreated, ExpenseCategoryNew,
    ExpenseCategoryUpdate, ExpenseCategoryView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ExpenseCategory, User};

use crate::{FieldErrors, ServerError, server::ServerState, validation::Validator};

fn status_view(status: engine::CategoryStatus) -> CategoryStatus {
    match status {
        engine::CategoryStatus::Active => CategoryStatus::Active,
        engine::CategoryStatus::Inactive => CategoryStatus::Inactive,
    }
}

fn category_view(category: ExpenseCategory) -> ExpenseCategoryView {
    ExpenseCategoryView {
        id: category.id,
        name: category.name,
        status: status_view(category.status),
        priority: category.priority,
        vault_id: category.vault_id,
        created_by: category.created_by,
        created_at: category.created_at,
    }
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseCategoryNew>,
) -> Result<(StatusCode, Json<ExpenseCategoryCreated>), ServerError> {
    Validator::new()
        .required("vault_id", &payload.vault_id)
        .name("name", &payload.name)
        .finish()?;

    let id = state
        .engine
        .categories()
        .create_one(&payload.name, &user.id, &payload.vault_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ExpenseCategoryCreated { id })))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(vault_id): Path<String>,
) -> Result<Json<ExpenseCategoriesResponse>, ServerError> {
    let categories = state
        .engine
        .categories()
        .find_all(&user.id, &vault_id)
        .await?
        .into_iter()
        .map(category_view)
        .collect();

    Ok(Json(ExpenseCategoriesResponse { categories }))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ExpenseCategoryView>, ServerError> {
    let category = state
        .engine
        .categories()
        .find_one_by_id(&user.id, &id)
        .await?;
    Ok(Json(category_view(category)))
}

/// Change either status or priority. Each request is a single write.
pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ExpenseCategoryUpdate>,
) -> Result<Json<ExpenseCategoryView>, ServerError> {
    let categories = state.engine.categories();
    let category = match (payload.status, payload.priority) {
        (Some(status), None) => {
            let status = match status {
                CategoryStatus::Active => engine::CategoryStatus::Active,
                CategoryStatus::Inactive => engine::CategoryStatus::Inactive,
            };
            categories.set_status(&user.id, &id, status).await?
        }
        (None, Some(priority)) => categories.set_priority(&user.id, &id, priority).await?,
        _ => {
            let mut errors = FieldErrors::new();
            errors.insert(
                "status",
                "exactly one of status or priority is required".to_string(),
            );
            return Err(ServerError::Validation(errors));
        }
    };
    Ok(Json(category_view(category)))
}

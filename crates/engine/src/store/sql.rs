//! sea-orm implementation of the storage ports.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseConnection, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    error::{Entity, StoreError},
    expense_categories::{self, CategoryStatus, ExpenseCategory, NewExpenseCategory},
    users::{self, NewUserRecord, User},
    vault::{self, UserVault, VaultRole},
    vault_memberships,
};

use super::{CredentialStore, ExpenseCategoryStore, StoreResult, VaultStore};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

/// Relational store backed by a sea-orm connection.
#[derive(Clone, Debug)]
pub struct SqlStore {
    database: DatabaseConnection,
}

impl SqlStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

/// Classify a write failure into conflict / constraint / opaque.
fn classify(err: DbErr, entity: Entity, key: &str) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::conflict(entity, key),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => StoreError::constraint(entity, key),
        _ => StoreError::Database(err),
    }
}

fn membership_key(user_id: &str, vault_id: &str) -> String {
    format!("{user_id}/{vault_id}")
}

fn user_vaults(
    rows: Vec<(vault_memberships::Model, Option<vault::Model>)>,
) -> StoreResult<Vec<UserVault>> {
    rows.into_iter()
        .filter_map(|(membership, vault)| vault.map(|vault| (membership, vault)))
        .map(|(membership, vault)| {
            UserVault::from_models(vault, &membership).map_err(StoreError::from)
        })
        .collect()
}

impl SqlStore {
    async fn find_user(&self, column: users::Column, value: &str) -> StoreResult<users::Model> {
        users::Entity::find()
            .filter(column.eq(value.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| StoreError::not_found(Entity::User, value))
    }
}

#[async_trait]
impl CredentialStore for SqlStore {
    async fn create_one(&self, user: NewUserRecord) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let active = users::ActiveModel {
            id: ActiveValue::Set(id.clone()),
            first_name: ActiveValue::Set(user.first_name),
            last_name: ActiveValue::Set(user.last_name),
            email: ActiveValue::Set(user.email.clone()),
            active_vault: ActiveValue::Set(None),
            password_hash: ActiveValue::Set(user.password_hash),
            created_at: ActiveValue::Set(Utc::now()),
        };
        users::Entity::insert(active)
            .exec_without_returning(&self.database)
            .await
            .map_err(|err| classify(err, Entity::User, &user.email))?;
        Ok(id)
    }

    async fn find_all(&self) -> StoreResult<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    async fn find_one_by_id(&self, user_id: &str) -> StoreResult<User> {
        self.find_user(users::Column::Id, user_id)
            .await
            .map(User::from)
    }

    async fn find_one_by_email(&self, email: &str) -> StoreResult<User> {
        self.find_user(users::Column::Email, email)
            .await
            .map(User::from)
    }

    async fn find_password_hash_and_user_id_for_email(
        &self,
        email: &str,
    ) -> StoreResult<(String, String)> {
        let model = self.find_user(users::Column::Email, email).await?;
        Ok((model.password_hash, model.id))
    }

    async fn assign_active_vault(&self, user_id: &str, vault_id: &str) -> StoreResult<()> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::ActiveVault,
                Expr::value(Some(vault_id.to_string())),
            )
            .filter(users::Column::Id.eq(user_id.to_string()))
            .exec(&self.database)
            .await
            .map_err(|err| classify(err, Entity::Vault, vault_id))?;
        if result.rows_affected == 0 {
            return Err(StoreError::not_found(Entity::User, user_id));
        }
        Ok(())
    }
}

#[async_trait]
impl VaultStore for SqlStore {
    async fn create_one(
        &self,
        user_id: &str,
        role: VaultRole,
        name: &str,
    ) -> StoreResult<String> {
        let vault_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let vault_entry = vault::ActiveModel {
                id: ActiveValue::Set(vault_id.clone()),
                name: ActiveValue::Set(name.to_string()),
                created_at: ActiveValue::Set(now),
            };
            vault::Entity::insert(vault_entry)
                .exec_without_returning(&db_tx)
                .await?;

            let membership = vault_memberships::ActiveModel {
                user_id: ActiveValue::Set(user_id.to_string()),
                vault_id: ActiveValue::Set(vault_id.clone()),
                role: ActiveValue::Set(role.as_str().to_string()),
                created_at: ActiveValue::Set(now),
            };
            vault_memberships::Entity::insert(membership)
                .exec_without_returning(&db_tx)
                .await
                .map_err(|err| {
                    classify(err, Entity::Membership, &membership_key(user_id, &vault_id))
                })?;

            StoreResult::Ok(vault_id)
        })
    }

    async fn find_all(&self, user_id: &str) -> StoreResult<Vec<UserVault>> {
        let rows = vault_memberships::Entity::find()
            .filter(vault_memberships::Column::UserId.eq(user_id.to_string()))
            .find_also_related(vault::Entity)
            .all(&self.database)
            .await?;
        user_vaults(rows)
    }

    async fn find_one_by_id(&self, user_id: &str, vault_id: &str) -> StoreResult<UserVault> {
        let row = vault_memberships::Entity::find()
            .filter(vault_memberships::Column::UserId.eq(user_id.to_string()))
            .filter(vault_memberships::Column::VaultId.eq(vault_id.to_string()))
            .find_also_related(vault::Entity)
            .one(&self.database)
            .await?;
        user_vaults(row.into_iter().collect())?
            .pop()
            .ok_or_else(|| StoreError::not_found(Entity::Vault, vault_id))
    }

    async fn find_one_by_name(&self, user_id: &str, name: &str) -> StoreResult<UserVault> {
        let row = vault_memberships::Entity::find()
            .filter(vault_memberships::Column::UserId.eq(user_id.to_string()))
            .find_also_related(vault::Entity)
            .filter(vault::Column::Name.eq(name.to_string()))
            .one(&self.database)
            .await?;
        user_vaults(row.into_iter().collect())?
            .pop()
            .ok_or_else(|| StoreError::not_found(Entity::Vault, name))
    }

    async fn delete_one_by_id(&self, vault_id: &str) -> StoreResult<()> {
        with_tx!(self, |db_tx| {
            // Explicit cascade in dependency order. The schema declares the
            // same actions, this keeps the result independent of FK support.
            expense_categories::Entity::delete_many()
                .filter(expense_categories::Column::VaultId.eq(vault_id.to_string()))
                .exec(&db_tx)
                .await?;
            vault_memberships::Entity::delete_many()
                .filter(vault_memberships::Column::VaultId.eq(vault_id.to_string()))
                .exec(&db_tx)
                .await?;
            users::Entity::update_many()
                .col_expr(users::Column::ActiveVault, Expr::value(Option::<String>::None))
                .filter(users::Column::ActiveVault.eq(vault_id.to_string()))
                .exec(&db_tx)
                .await?;
            vault::Entity::delete_by_id(vault_id.to_string())
                .exec(&db_tx)
                .await?;
            StoreResult::Ok(())
        })
    }

    async fn add_user(&self, vault_id: &str, user_id: &str, role: VaultRole) -> StoreResult<()> {
        let membership = vault_memberships::ActiveModel {
            user_id: ActiveValue::Set(user_id.to_string()),
            vault_id: ActiveValue::Set(vault_id.to_string()),
            role: ActiveValue::Set(role.as_str().to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        };
        vault_memberships::Entity::insert(membership)
            .exec_without_returning(&self.database)
            .await
            .map_err(|err| classify(err, Entity::Membership, &membership_key(user_id, vault_id)))?;
        Ok(())
    }
}

#[async_trait]
impl ExpenseCategoryStore for SqlStore {
    async fn create_one(&self, category: NewExpenseCategory) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let active = expense_categories::ActiveModel {
            id: ActiveValue::Set(id.clone()),
            name: ActiveValue::Set(category.name.clone()),
            status: ActiveValue::Set(category.status.as_str().to_string()),
            priority: ActiveValue::Set(category.priority),
            vault_id: ActiveValue::Set(category.vault_id),
            created_by: ActiveValue::Set(category.created_by),
            created_at: ActiveValue::Set(Utc::now()),
        };
        expense_categories::Entity::insert(active)
            .exec_without_returning(&self.database)
            .await
            .map_err(|err| classify(err, Entity::ExpenseCategory, &category.name))?;
        Ok(id)
    }

    async fn find_all(&self, vault_id: &str) -> StoreResult<Vec<ExpenseCategory>> {
        let models = expense_categories::Entity::find()
            .filter(expense_categories::Column::VaultId.eq(vault_id.to_string()))
            .order_by_asc(expense_categories::Column::Priority)
            .order_by_asc(expense_categories::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models
            .into_iter()
            .map(|model| ExpenseCategory::try_from(model).map_err(StoreError::from))
            .collect()
    }

    async fn find_one_by_id(&self, category_id: &str) -> StoreResult<ExpenseCategory> {
        let model = expense_categories::Entity::find_by_id(category_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| StoreError::not_found(Entity::ExpenseCategory, category_id))?;
        Ok(ExpenseCategory::try_from(model)?)
    }

    async fn set_status(&self, category_id: &str, status: CategoryStatus) -> StoreResult<()> {
        let result = expense_categories::Entity::update_many()
            .col_expr(
                expense_categories::Column::Status,
                Expr::value(status.as_str()),
            )
            .filter(expense_categories::Column::Id.eq(category_id.to_string()))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::not_found(Entity::ExpenseCategory, category_id));
        }
        Ok(())
    }

    async fn set_priority(&self, category_id: &str, priority: i32) -> StoreResult<()> {
        let result = expense_categories::Entity::update_many()
            .col_expr(expense_categories::Column::Priority, Expr::value(priority))
            .filter(expense_categories::Column::Id.eq(category_id.to_string()))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::not_found(Entity::ExpenseCategory, category_id));
        }
        Ok(())
    }
}

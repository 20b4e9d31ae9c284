//! Storage ports consumed by the services.
//!
//! Stores never authorize: they answer exact-match lookups and perform
//! writes. Every permission decision lives in [`crate::ops`].

use async_trait::async_trait;

use crate::{
    error::StoreError,
    expense_categories::{CategoryStatus, ExpenseCategory, NewExpenseCategory},
    users::{NewUserRecord, User},
    vault::{UserVault, VaultRole},
};

mod memory;
mod sql;

pub use memory::MemoryStore;
pub use sql::SqlStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// User records and password hashes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a user and returns its id. `Conflict` if the email is taken.
    async fn create_one(&self, user: NewUserRecord) -> StoreResult<String>;

    async fn find_all(&self) -> StoreResult<Vec<User>>;

    async fn find_one_by_id(&self, user_id: &str) -> StoreResult<User>;

    async fn find_one_by_email(&self, email: &str) -> StoreResult<User>;

    /// Returns `(password_hash, user_id)`.
    async fn find_password_hash_and_user_id_for_email(
        &self,
        email: &str,
    ) -> StoreResult<(String, String)>;

    /// `Constraint` if `vault_id` does not reference an existing vault.
    async fn assign_active_vault(&self, user_id: &str, vault_id: &str) -> StoreResult<()>;
}

/// Vaults and the user ↔ vault membership join.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Atomically inserts the vault and the creator's membership, returning
    /// the vault id. Either both rows exist afterwards or neither does.
    async fn create_one(&self, user_id: &str, role: VaultRole, name: &str)
    -> StoreResult<String>;

    async fn find_all(&self, user_id: &str) -> StoreResult<Vec<UserVault>>;

    /// `NotFound` unless `user_id` holds a membership in `vault_id`.
    async fn find_one_by_id(&self, user_id: &str, vault_id: &str) -> StoreResult<UserVault>;

    /// `NotFound` unless `user_id` belongs to a vault named `name`.
    async fn find_one_by_name(&self, user_id: &str, name: &str) -> StoreResult<UserVault>;

    /// Deletes the vault with its memberships and categories, clearing any
    /// `active_vault` pointing at it. Deleting a missing vault is a no-op.
    async fn delete_one_by_id(&self, vault_id: &str) -> StoreResult<()>;

    /// `Conflict` on a duplicate `(user_id, vault_id)` pair.
    async fn add_user(&self, vault_id: &str, user_id: &str, role: VaultRole) -> StoreResult<()>;
}

/// Expense categories, keyed by id and grouped by vault.
#[async_trait]
pub trait ExpenseCategoryStore: Send + Sync {
    async fn create_one(&self, category: NewExpenseCategory) -> StoreResult<String>;

    /// Empty when the vault has no categories.
    async fn find_all(&self, vault_id: &str) -> StoreResult<Vec<ExpenseCategory>>;

    async fn find_one_by_id(&self, category_id: &str) -> StoreResult<ExpenseCategory>;

    async fn set_status(&self, category_id: &str, status: CategoryStatus) -> StoreResult<()>;

    async fn set_priority(&self, category_id: &str, priority: i32) -> StoreResult<()>;
}

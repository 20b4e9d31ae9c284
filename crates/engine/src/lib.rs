//! Core of the expense tracker: users, shared vaults, memberships and
//! vault-scoped expense categories.
//!
//! Authorization lives in the services under [`Engine`]. The stores only
//! persist.

pub use credentials::{Argon2Hasher, PasswordHasher};
pub use error::{
    CategoryError, CredentialError, Entity, ErrorKind, StoreError, UserError, VaultError,
};
pub use expense_categories::{CategoryStatus, ExpenseCategory, NewExpenseCategory};
pub use ops::{Engine, EngineBuilder, ExpenseCategoryService, UserService, VaultService};
pub use store::{
    CredentialStore, ExpenseCategoryStore, MemoryStore, SqlStore, StoreResult, VaultStore,
};
pub use users::{NewUser, NewUserRecord, User};
pub use vault::{UserVault, VaultRole};

mod credentials;
mod error;
mod ops;
mod store;

pub mod expense_categories;
pub mod users;
pub mod vault;
pub mod vault_memberships;

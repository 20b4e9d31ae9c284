//! The module contains the errors the engine can throw.
//!
//! Errors are split by layer:
//!
//! - [`StoreError`] is returned by the storage ports. It only knows about
//!   missing rows, violated constraints and raw database failures.
//! - [`UserError`], [`VaultError`] and [`CategoryError`] are returned by the
//!   services. Every store error crossing a service boundary is translated
//!   into one of these, either as a named kind or as `Unexpected` with the
//!   failing operation attached.
//!
//! Callers compare service errors through [`ErrorKind`], never through the
//! payload.

use std::fmt;

use sea_orm::DbErr;
use thiserror::Error;

/// Coarse classification shared by all service errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Forbidden,
    Unexpected,
}

/// Stored entity a [`StoreError`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    User,
    Vault,
    Membership,
    ExpenseCategory,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::User => "user",
            Entity::Vault => "vault",
            Entity::Membership => "membership",
            Entity::ExpenseCategory => "expense category",
        })
    }
}

/// Errors returned by the storage ports.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} \"{key}\" not found")]
    NotFound { entity: Entity, key: String },
    #[error("{entity} \"{key}\" already present")]
    Conflict { entity: Entity, key: String },
    #[error("{entity} \"{key}\" references a missing row")]
    Constraint { entity: Entity, key: String },
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl StoreError {
    pub(crate) fn not_found(entity: Entity, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub(crate) fn conflict(entity: Entity, key: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            key: key.into(),
        }
    }

    pub(crate) fn constraint(entity: Entity, key: impl Into<String>) -> Self {
        Self::Constraint {
            entity,
            key: key.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failures of the password hashing primitive.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialError {
    #[error("malformed password hash")]
    MalformedHash,
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// User service errors.
#[derive(Error, Debug)]
pub enum UserError {
    #[error("user \"{0}\" not found")]
    NotFound(String),
    #[error("user with email \"{0}\" already exists")]
    EmailAlreadyExists(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("failed to {op}: {source}")]
    Unexpected {
        op: &'static str,
        #[source]
        source: StoreError,
    },
}

impl UserError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::EmailAlreadyExists(_) => ErrorKind::Conflict,
            Self::InvalidCredentials => ErrorKind::Forbidden,
            Self::Credential(_) | Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }
}

/// Vault service errors.
///
/// `NotFound` is returned both when the vault does not exist and when the
/// caller is not a member of it.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("vault \"{vault}\" not found")]
    NotFound { vault: String },
    #[error("insufficient permissions to perform this operation on vault \"{vault_id}\"")]
    InsufficientPermissions { vault_id: String, user_id: String },
    #[error("user \"{user_id}\" is already assigned to vault \"{vault_id}\"")]
    UserAlreadyAssigned { user_id: String, vault_id: String },
    #[error(transparent)]
    User(#[from] UserError),
    #[error("failed to {op}: {source}")]
    Unexpected {
        op: &'static str,
        #[source]
        source: StoreError,
    },
}

impl VaultError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientPermissions { .. } => ErrorKind::Forbidden,
            Self::UserAlreadyAssigned { .. } => ErrorKind::Conflict,
            Self::User(err) => err.kind(),
            Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }
}

/// Expense category service errors.
#[derive(Error, Debug)]
pub enum CategoryError {
    #[error("vault \"{vault_id}\" not found")]
    VaultNotFound { vault_id: String },
    #[error("expense category \"{category_id}\" not found")]
    NotFound { category_id: String },
    #[error("user \"{user_id}\" is not owner of vault \"{vault_id}\"")]
    NotVaultOwner { user_id: String, vault_id: String },
    #[error("expense category \"{name}\" already exists in vault \"{vault_id}\"")]
    DuplicateName { name: String, vault_id: String },
    #[error(transparent)]
    Vault(VaultError),
    #[error("failed to {op}: {source}")]
    Unexpected {
        op: &'static str,
        #[source]
        source: StoreError,
    },
}

impl CategoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VaultNotFound { .. } | Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NotVaultOwner { .. } => ErrorKind::Forbidden,
            Self::DuplicateName { .. } => ErrorKind::Conflict,
            Self::Vault(err) => err.kind(),
            Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }
}

impl From<VaultError> for CategoryError {
    fn from(value: VaultError) -> Self {
        match value {
            VaultError::NotFound { vault } => Self::VaultNotFound { vault_id: vault },
            other => Self::Vault(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_message() {
        let err = StoreError::not_found(Entity::ExpenseCategory, "abc");
        assert_eq!(err.to_string(), "expense category \"abc\" not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn vault_not_found_becomes_category_vault_not_found() {
        let err = CategoryError::from(VaultError::NotFound {
            vault: "v1".to_string(),
        });
        assert!(matches!(err, CategoryError::VaultNotFound { ref vault_id } if vault_id == "v1"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn wrapped_errors_keep_their_kind() {
        let err = VaultError::from(UserError::NotFound("u1".to_string()));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = CategoryError::from(VaultError::InsufficientPermissions {
            vault_id: "v1".to_string(),
            user_id: "u1".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn unexpected_carries_operation() {
        let err = UserError::Unexpected {
            op: "find user by id",
            source: StoreError::Database(DbErr::Custom("boom".to_string())),
        };
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert!(err.to_string().starts_with("failed to find user by id"));
    }
}

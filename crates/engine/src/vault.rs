//! The `Vault` is a workspace shared by its members. Each member holds exactly
//! one [`VaultRole`] in it.

use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a user inside a vault.
///
/// - `owner`: full control (delete the vault, invite users, manage categories).
/// - `editor`: member without management rights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultRole {
    Owner,
    Editor,
}

impl VaultRole {
    /// Canonical role string stored in `user_vaults.role`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Editor => "editor",
        }
    }

    pub fn is_owner(self) -> bool {
        self == Self::Owner
    }
}

impl fmt::Display for VaultRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for VaultRole {
    type Error = DbErr;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "owner" => Ok(Self::Owner),
            "editor" => Ok(Self::Editor),
            other => Err(DbErr::Type(format!("invalid vault role: {other}"))),
        }
    }
}

/// A vault seen through one member: its identity plus that member's role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserVault {
    pub id: String,
    pub name: String,
    pub role: VaultRole,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vaults")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vault_memberships::Entity")]
    Memberships,
    #[sea_orm(has_many = "super::expense_categories::Entity")]
    ExpenseCategories,
}

impl Related<super::vault_memberships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::expense_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl UserVault {
    pub(crate) fn from_models(
        vault: Model,
        membership: &super::vault_memberships::Model,
    ) -> Result<Self, DbErr> {
        Ok(Self {
            id: vault.id,
            name: vault.name,
            role: VaultRole::try_from(membership.role.as_str())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_storage_string() {
        for role in [VaultRole::Owner, VaultRole::Editor] {
            assert_eq!(VaultRole::try_from(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    #[should_panic(expected = "invalid vault role: viewer")]
    fn fail_parse_unknown_role() {
        VaultRole::try_from("viewer").unwrap();
    }

    #[test]
    fn only_owner_is_owner() {
        assert!(VaultRole::Owner.is_owner());
        assert!(!VaultRole::Editor.is_owner());
    }
}

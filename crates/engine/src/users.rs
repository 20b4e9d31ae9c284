//! The module contains the `User` identity record.
//!
//! The password hash lives only in the storage model. [`User`] is what leaves
//! the engine and never carries secret material.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// A registered user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Vault selected by default. Cleared when that vault is deleted.
    pub active_vault: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Registration input, before hashing.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Row handed to [`crate::CredentialStore::create_one`].
#[derive(Clone, Debug)]
pub struct NewUserRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub active_vault: Option<String>,
    pub password_hash: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vault::Entity",
        from = "Column::ActiveVault",
        to = "super::vault::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    ActiveVault,
    #[sea_orm(has_many = "super::vault_memberships::Entity")]
    Memberships,
}

impl Related<super::vault_memberships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            active_vault: value.active_vault,
            created_at: value.created_at,
        }
    }
}

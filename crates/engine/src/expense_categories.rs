//! Expense categories, scoped to a vault.
//!
//! Names are unique inside a vault. The category service checks it before
//! writing and a unique `(vault_id, name)` index backs the check.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Default display priority of a new category.
pub const DEFAULT_PRIORITY: i32 = 0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    #[default]
    Active,
    Inactive,
}

impl CategoryStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CategoryStatus {
    type Error = DbErr;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(DbErr::Type(format!("invalid category status: {other}"))),
        }
    }
}

/// An expense category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpenseCategory {
    pub id: String,
    pub name: String,
    pub status: CategoryStatus,
    /// Display ordering hint. Not unique.
    pub priority: i32,
    pub vault_id: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Row handed to [`crate::ExpenseCategoryStore::create_one`].
#[derive(Clone, Debug)]
pub struct NewExpenseCategory {
    pub name: String,
    pub status: CategoryStatus,
    pub priority: i32,
    pub vault_id: String,
    pub created_by: String,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub status: String,
    pub priority: i32,
    pub vault_id: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vault::Entity",
        from = "Column::VaultId",
        to = "super::vault::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Vault,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Creator,
}

impl Related<super::vault::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vault.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ExpenseCategory {
    type Error = DbErr;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            status: CategoryStatus::try_from(value.status.as_str())?,
            id: value.id,
            name: value.name,
            priority: value.priority,
            vault_id: value.vault_id,
            created_by: value.created_by,
            created_at: value.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(status: &str) -> Model {
        Model {
            id: "c1".to_string(),
            name: "Groceries".to_string(),
            status: status.to_string(),
            priority: 3,
            vault_id: "v1".to_string(),
            created_by: "u1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn new_categories_default_to_active() {
        assert_eq!(CategoryStatus::default(), CategoryStatus::Active);
    }

    #[test]
    fn model_converts_to_category() {
        let category = ExpenseCategory::try_from(model("inactive")).unwrap();
        assert_eq!(category.status, CategoryStatus::Inactive);
        assert_eq!(category.priority, 3);
        assert_eq!(category.vault_id, "v1");
    }

    #[test]
    #[should_panic(expected = "invalid category status: archived")]
    fn fail_convert_unknown_status() {
        ExpenseCategory::try_from(model("archived")).unwrap();
    }
}

//! Initial schema.
//!
//! - `vaults`: shared workspaces
//! - `users`: identities, with an optional active vault
//! - `user_vaults`: memberships, one role per `(user, vault)`
//! - `expense_categories`: categories owned by a vault
//!
//! Deleting a vault removes its memberships and categories and clears any
//! `users.active_vault` pointing at it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Vaults {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    ActiveVault,
    PasswordHash,
    CreatedAt,
}

#[derive(Iden)]
enum UserVaults {
    Table,
    UserId,
    VaultId,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenseCategories {
    Table,
    Id,
    Name,
    Status,
    Priority,
    VaultId,
    CreatedBy,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vaults::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vaults::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Vaults::Name).string().not_null())
                    .col(
                        ColumnDef::new(Vaults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::ActiveVault).string().null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users-active_vault")
                            .from(Users::Table, Users::ActiveVault)
                            .to(Vaults::Table, Vaults::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserVaults::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserVaults::UserId).string().not_null())
                    .col(ColumnDef::new(UserVaults::VaultId).string().not_null())
                    .col(ColumnDef::new(UserVaults::Role).string().not_null())
                    .col(
                        ColumnDef::new(UserVaults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserVaults::UserId)
                            .col(UserVaults::VaultId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_vaults-user_id")
                            .from(UserVaults::Table, UserVaults::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_vaults-vault_id")
                            .from(UserVaults::Table, UserVaults::VaultId)
                            .to(Vaults::Table, Vaults::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-user_vaults-vault_id")
                    .table(UserVaults::Table)
                    .col(UserVaults::VaultId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseCategories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseCategories::Name).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseCategories::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(ExpenseCategories::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ExpenseCategories::VaultId).string().not_null())
                    .col(ColumnDef::new(ExpenseCategories::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseCategories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_categories-vault_id")
                            .from(ExpenseCategories::Table, ExpenseCategories::VaultId)
                            .to(Vaults::Table, Vaults::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_categories-created_by")
                            .from(ExpenseCategories::Table, ExpenseCategories::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Names are unique per vault, not globally.
        manager
            .create_index(
                Index::create()
                    .name("idx-expense_categories-vault_id-name")
                    .table(ExpenseCategories::Table)
                    .col(ExpenseCategories::VaultId)
                    .col(ExpenseCategories::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExpenseCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserVaults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vaults::Table).to_owned())
            .await?;
        Ok(())
    }
}

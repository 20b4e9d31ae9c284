use std::sync::Arc;

use tracing::{debug, info};

use crate::{StoreError, UserError, UserVault, VaultError, VaultRole, VaultStore};

use super::UserService;

fn unexpected(op: &'static str) -> impl FnOnce(StoreError) -> VaultError {
    move |source| VaultError::Unexpected { op, source }
}

/// Vault lifecycle and membership management.
///
/// Every lookup is scoped to the caller: a vault the caller does not belong to
/// is reported exactly like a vault that does not exist.
#[derive(Clone)]
pub struct VaultService {
    store: Arc<dyn VaultStore>,
    users: UserService,
}

impl VaultService {
    pub fn new(store: Arc<dyn VaultStore>, users: UserService) -> Self {
        Self { store, users }
    }

    /// Create a vault owned by `owner_id` and return its id.
    ///
    /// The new vault becomes the owner's active vault only if none is set.
    pub async fn create_one(&self, owner_id: &str, name: &str) -> Result<String, VaultError> {
        let owner = self.users.find_one_by_id(owner_id).await?;

        let vault_id = self
            .store
            .create_one(owner_id, VaultRole::Owner, name)
            .await
            .map_err(unexpected("create vault"))?;
        info!(%vault_id, %owner_id, "vault created");

        if owner.active_vault.is_none() {
            self.users.assign_active_vault(owner_id, &vault_id).await?;
        }
        Ok(vault_id)
    }

    /// Every vault `user_id` belongs to, with the user's role.
    pub async fn find_all(&self, user_id: &str) -> Result<Vec<UserVault>, VaultError> {
        self.store
            .find_all(user_id)
            .await
            .map_err(unexpected("list vaults"))
    }

    pub async fn find_one_by_id(
        &self,
        user_id: &str,
        vault_id: &str,
    ) -> Result<UserVault, VaultError> {
        self.store
            .find_one_by_id(user_id, vault_id)
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => VaultError::NotFound {
                    vault: vault_id.to_string(),
                },
                source => VaultError::Unexpected {
                    op: "find vault by id",
                    source,
                },
            })
    }

    pub async fn find_one_by_name(&self, user_id: &str, name: &str) -> Result<UserVault, VaultError> {
        self.store
            .find_one_by_name(user_id, name)
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => VaultError::NotFound {
                    vault: name.to_string(),
                },
                source => VaultError::Unexpected {
                    op: "find vault by name",
                    source,
                },
            })
    }

    /// Delete a vault. Only an owner may do it.
    pub async fn delete_one_by_id(&self, user_id: &str, vault_id: &str) -> Result<(), VaultError> {
        let vault = self.find_one_by_id(user_id, vault_id).await?;
        if !vault.role.is_owner() {
            return Err(VaultError::InsufficientPermissions {
                vault_id: vault_id.to_string(),
                user_id: user_id.to_string(),
            });
        }

        self.store
            .delete_one_by_id(vault_id)
            .await
            .map_err(unexpected("delete vault"))?;
        info!(%vault_id, %user_id, "vault deleted");
        Ok(())
    }

    /// Grant `invitee_id` a role in `vault_id` on behalf of `inviter_id`.
    ///
    /// An existing membership is reported before the inviter's permissions are
    /// checked. `role` is stored as given.
    pub async fn add_user(
        &self,
        inviter_id: &str,
        invitee_id: &str,
        vault_id: &str,
        role: VaultRole,
    ) -> Result<(), VaultError> {
        let already_assigned = || VaultError::UserAlreadyAssigned {
            user_id: invitee_id.to_string(),
            vault_id: vault_id.to_string(),
        };

        match self.store.find_one_by_id(invitee_id, vault_id).await {
            Ok(_) => return Err(already_assigned()),
            Err(err) if err.is_not_found() => {}
            Err(source) => {
                return Err(VaultError::Unexpected {
                    op: "check vault membership",
                    source,
                });
            }
        }

        let vault = self.find_one_by_id(inviter_id, vault_id).await?;
        if !vault.role.is_owner() {
            return Err(VaultError::InsufficientPermissions {
                vault_id: vault_id.to_string(),
                user_id: inviter_id.to_string(),
            });
        }

        self.store
            .add_user(vault_id, invitee_id, role)
            .await
            .map_err(|err| match err {
                StoreError::Conflict { .. } => already_assigned(),
                StoreError::Constraint { .. } => {
                    VaultError::User(UserError::NotFound(invitee_id.to_string()))
                }
                source => VaultError::Unexpected {
                    op: "add vault member",
                    source,
                },
            })?;
        info!(%vault_id, %invitee_id, %role, "member added");
        Ok(())
    }

    /// Switch the caller's active vault. Any role may do it.
    pub async fn set_active(&self, user_id: &str, vault_id: &str) -> Result<(), VaultError> {
        self.find_one_by_id(user_id, vault_id).await?;
        self.users.assign_active_vault(user_id, vault_id).await?;
        debug!(%user_id, %vault_id, "active vault switched");
        Ok(())
    }
}

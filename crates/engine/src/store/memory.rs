//! In-memory implementation of the storage ports.
//!
//! Mirrors the relational schema: unique email, one membership per
//! `(user, vault)`, foreign-key checks on insert, and the delete cascade of
//! a vault performed explicitly.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::{
    error::{Entity, StoreError},
    expense_categories::{self, CategoryStatus, ExpenseCategory, NewExpenseCategory},
    users::{self, NewUserRecord, User},
    vault::{self, UserVault, VaultRole},
    vault_memberships,
};

use super::{CredentialStore, ExpenseCategoryStore, StoreResult, VaultStore};

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<users::Model>,
    vaults: Vec<vault::Model>,
    memberships: Vec<vault_memberships::Model>,
    categories: Vec<expense_categories::Model>,
}

impl MemoryState {
    fn user_exists(&self, user_id: &str) -> bool {
        self.users.iter().any(|user| user.id == user_id)
    }

    fn vault(&self, vault_id: &str) -> Option<&vault::Model> {
        self.vaults.iter().find(|vault| vault.id == vault_id)
    }

    fn user_vault<P>(&self, user_id: &str, predicate: P) -> StoreResult<Option<UserVault>>
    where
        P: Fn(&vault::Model) -> bool,
    {
        for membership in self.memberships.iter().filter(|m| m.user_id == user_id) {
            if let Some(vault) = self.vault(&membership.vault_id)
                && predicate(vault)
            {
                return Ok(Some(UserVault::from_models(vault.clone(), membership)?));
            }
        }
        Ok(None)
    }

    fn category_mut(&mut self, category_id: &str) -> StoreResult<&mut expense_categories::Model> {
        self.categories
            .iter_mut()
            .find(|category| category.id == category_id)
            .ok_or_else(|| StoreError::not_found(Entity::ExpenseCategory, category_id))
    }
}

/// Process-local store, shared between clones.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_one(&self, user: NewUserRecord) -> StoreResult<String> {
        let mut state = self.state.lock();
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::conflict(Entity::User, user.email));
        }
        let id = Uuid::new_v4().to_string();
        state.users.push(users::Model {
            id: id.clone(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            active_vault: None,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find_all(&self) -> StoreResult<Vec<User>> {
        let state = self.state.lock();
        Ok(state.users.iter().cloned().map(User::from).collect())
    }

    async fn find_one_by_id(&self, user_id: &str) -> StoreResult<User> {
        let state = self.state.lock();
        state
            .users
            .iter()
            .find(|user| user.id == user_id)
            .cloned()
            .map(User::from)
            .ok_or_else(|| StoreError::not_found(Entity::User, user_id))
    }

    async fn find_one_by_email(&self, email: &str) -> StoreResult<User> {
        let state = self.state.lock();
        state
            .users
            .iter()
            .find(|user| user.email == email)
            .cloned()
            .map(User::from)
            .ok_or_else(|| StoreError::not_found(Entity::User, email))
    }

    async fn find_password_hash_and_user_id_for_email(
        &self,
        email: &str,
    ) -> StoreResult<(String, String)> {
        let state = self.state.lock();
        state
            .users
            .iter()
            .find(|user| user.email == email)
            .map(|user| (user.password_hash.clone(), user.id.clone()))
            .ok_or_else(|| StoreError::not_found(Entity::User, email))
    }

    async fn assign_active_vault(&self, user_id: &str, vault_id: &str) -> StoreResult<()> {
        let mut state = self.state.lock();
        if state.vault(vault_id).is_none() {
            return Err(StoreError::constraint(Entity::Vault, vault_id));
        }
        let user = state
            .users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| StoreError::not_found(Entity::User, user_id))?;
        user.active_vault = Some(vault_id.to_string());
        Ok(())
    }
}

#[async_trait]
impl VaultStore for MemoryStore {
    async fn create_one(
        &self,
        user_id: &str,
        role: VaultRole,
        name: &str,
    ) -> StoreResult<String> {
        let mut state = self.state.lock();
        let vault_id = Uuid::new_v4().to_string();
        // Checked before any write so a failed membership leaves nothing behind.
        if !state.user_exists(user_id) {
            return Err(StoreError::constraint(
                Entity::Membership,
                format!("{user_id}/{vault_id}"),
            ));
        }
        let now = Utc::now();
        state.vaults.push(vault::Model {
            id: vault_id.clone(),
            name: name.to_string(),
            created_at: now,
        });
        state.memberships.push(vault_memberships::Model {
            user_id: user_id.to_string(),
            vault_id: vault_id.clone(),
            role: role.as_str().to_string(),
            created_at: now,
        });
        Ok(vault_id)
    }

    async fn find_all(&self, user_id: &str) -> StoreResult<Vec<UserVault>> {
        let state = self.state.lock();
        state
            .memberships
            .iter()
            .filter(|membership| membership.user_id == user_id)
            .filter_map(|membership| {
                state
                    .vault(&membership.vault_id)
                    .map(|vault| UserVault::from_models(vault.clone(), membership))
            })
            .map(|res| res.map_err(StoreError::from))
            .collect()
    }

    async fn find_one_by_id(&self, user_id: &str, vault_id: &str) -> StoreResult<UserVault> {
        let state = self.state.lock();
        state
            .user_vault(user_id, |vault| vault.id == vault_id)?
            .ok_or_else(|| StoreError::not_found(Entity::Vault, vault_id))
    }

    async fn find_one_by_name(&self, user_id: &str, name: &str) -> StoreResult<UserVault> {
        let state = self.state.lock();
        state
            .user_vault(user_id, |vault| vault.name == name)?
            .ok_or_else(|| StoreError::not_found(Entity::Vault, name))
    }

    async fn delete_one_by_id(&self, vault_id: &str) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.categories.retain(|category| category.vault_id != vault_id);
        state
            .memberships
            .retain(|membership| membership.vault_id != vault_id);
        for user in state
            .users
            .iter_mut()
            .filter(|user| user.active_vault.as_deref() == Some(vault_id))
        {
            user.active_vault = None;
        }
        state.vaults.retain(|vault| vault.id != vault_id);
        Ok(())
    }

    async fn add_user(&self, vault_id: &str, user_id: &str, role: VaultRole) -> StoreResult<()> {
        let mut state = self.state.lock();
        let key = format!("{user_id}/{vault_id}");
        if state.vault(vault_id).is_none() || !state.user_exists(user_id) {
            return Err(StoreError::constraint(Entity::Membership, key));
        }
        if state
            .memberships
            .iter()
            .any(|m| m.user_id == user_id && m.vault_id == vault_id)
        {
            return Err(StoreError::conflict(Entity::Membership, key));
        }
        state.memberships.push(vault_memberships::Model {
            user_id: user_id.to_string(),
            vault_id: vault_id.to_string(),
            role: role.as_str().to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl ExpenseCategoryStore for MemoryStore {
    async fn create_one(&self, category: NewExpenseCategory) -> StoreResult<String> {
        let mut state = self.state.lock();
        if state.vault(&category.vault_id).is_none() || !state.user_exists(&category.created_by) {
            return Err(StoreError::constraint(
                Entity::ExpenseCategory,
                category.name,
            ));
        }
        if state
            .categories
            .iter()
            .any(|c| c.vault_id == category.vault_id && c.name == category.name)
        {
            return Err(StoreError::conflict(Entity::ExpenseCategory, category.name));
        }
        let id = Uuid::new_v4().to_string();
        state.categories.push(expense_categories::Model {
            id: id.clone(),
            name: category.name,
            status: category.status.as_str().to_string(),
            priority: category.priority,
            vault_id: category.vault_id,
            created_by: category.created_by,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find_all(&self, vault_id: &str) -> StoreResult<Vec<ExpenseCategory>> {
        let state = self.state.lock();
        let mut categories = state
            .categories
            .iter()
            .filter(|category| category.vault_id == vault_id)
            .cloned()
            .map(|model| ExpenseCategory::try_from(model).map_err(StoreError::from))
            .collect::<StoreResult<Vec<_>>>()?;
        categories.sort_by_key(|category| category.priority);
        Ok(categories)
    }

    async fn find_one_by_id(&self, category_id: &str) -> StoreResult<ExpenseCategory> {
        let state = self.state.lock();
        let model = state
            .categories
            .iter()
            .find(|category| category.id == category_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Entity::ExpenseCategory, category_id))?;
        Ok(ExpenseCategory::try_from(model)?)
    }

    async fn set_status(&self, category_id: &str, status: CategoryStatus) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.category_mut(category_id)?.status = status.as_str().to_string();
        Ok(())
    }

    async fn set_priority(&self, category_id: &str, priority: i32) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.category_mut(category_id)?.priority = priority;
        Ok(())
    }
}

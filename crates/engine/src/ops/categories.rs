use std::sync::Arc;

use tracing::info;

use crate::{
    CategoryError, CategoryStatus, ExpenseCategory, ExpenseCategoryStore, StoreError, UserVault,
    VaultError,
    expense_categories::{DEFAULT_PRIORITY, NewExpenseCategory},
};

use super::VaultService;

/// Expense categories, authorized through the caller's vault membership.
#[derive(Clone)]
pub struct ExpenseCategoryService {
    store: Arc<dyn ExpenseCategoryStore>,
    vaults: VaultService,
}

impl ExpenseCategoryService {
    pub fn new(store: Arc<dyn ExpenseCategoryStore>, vaults: VaultService) -> Self {
        Self { store, vaults }
    }

    /// Create an active category with default priority. Owner only.
    pub async fn create_one(
        &self,
        name: &str,
        user_id: &str,
        vault_id: &str,
    ) -> Result<String, CategoryError> {
        let vault = self.vaults.find_one_by_id(user_id, vault_id).await?;
        require_owner(&vault, user_id)?;

        let duplicate = || CategoryError::DuplicateName {
            name: name.to_string(),
            vault_id: vault_id.to_string(),
        };
        let existing = self
            .store
            .find_all(vault_id)
            .await
            .map_err(|source| CategoryError::Unexpected {
                op: "list expense categories",
                source,
            })?;
        if existing.iter().any(|category| category.name == name) {
            return Err(duplicate());
        }

        let category_id = self
            .store
            .create_one(NewExpenseCategory {
                name: name.to_string(),
                status: CategoryStatus::Active,
                priority: DEFAULT_PRIORITY,
                vault_id: vault_id.to_string(),
                created_by: user_id.to_string(),
            })
            .await
            .map_err(|err| match err {
                StoreError::Conflict { .. } => duplicate(),
                source => CategoryError::Unexpected {
                    op: "create expense category",
                    source,
                },
            })?;
        info!(%category_id, %vault_id, %user_id, "expense category created");
        Ok(category_id)
    }

    /// Categories of a vault the caller belongs to, by ascending priority.
    pub async fn find_all(
        &self,
        user_id: &str,
        vault_id: &str,
    ) -> Result<Vec<ExpenseCategory>, CategoryError> {
        self.vaults.find_one_by_id(user_id, vault_id).await?;
        self.store
            .find_all(vault_id)
            .await
            .map_err(|source| CategoryError::Unexpected {
                op: "list expense categories",
                source,
            })
    }

    /// A category whose vault the caller belongs to.
    pub async fn find_one_by_id(
        &self,
        user_id: &str,
        category_id: &str,
    ) -> Result<ExpenseCategory, CategoryError> {
        let (category, _) = self.resolve(user_id, category_id).await?;
        Ok(category)
    }

    /// Owner only. Returns the updated category.
    pub async fn set_status(
        &self,
        user_id: &str,
        category_id: &str,
        status: CategoryStatus,
    ) -> Result<ExpenseCategory, CategoryError> {
        let (mut category, vault) = self.resolve(user_id, category_id).await?;
        require_owner(&vault, user_id)?;

        self.store
            .set_status(category_id, status)
            .await
            .map_err(write_error("set expense category status", category_id))?;
        info!(%category_id, %status, "expense category status changed");
        category.status = status;
        Ok(category)
    }

    /// Owner only. Returns the updated category.
    pub async fn set_priority(
        &self,
        user_id: &str,
        category_id: &str,
        priority: i32,
    ) -> Result<ExpenseCategory, CategoryError> {
        let (mut category, vault) = self.resolve(user_id, category_id).await?;
        require_owner(&vault, user_id)?;

        self.store
            .set_priority(category_id, priority)
            .await
            .map_err(write_error("set expense category priority", category_id))?;
        info!(%category_id, priority, "expense category priority changed");
        category.priority = priority;
        Ok(category)
    }

    /// Load a category together with the caller's membership in its vault.
    ///
    /// A category in a vault the caller does not belong to is `NotFound`.
    async fn resolve(
        &self,
        user_id: &str,
        category_id: &str,
    ) -> Result<(ExpenseCategory, UserVault), CategoryError> {
        let not_found = || CategoryError::NotFound {
            category_id: category_id.to_string(),
        };
        let category = self
            .store
            .find_one_by_id(category_id)
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => not_found(),
                source => CategoryError::Unexpected {
                    op: "find expense category",
                    source,
                },
            })?;
        match self.vaults.find_one_by_id(user_id, &category.vault_id).await {
            Ok(vault) => Ok((category, vault)),
            Err(VaultError::NotFound { .. }) => Err(not_found()),
            Err(err) => Err(err.into()),
        }
    }
}

fn require_owner(vault: &UserVault, user_id: &str) -> Result<(), CategoryError> {
    if vault.role.is_owner() {
        return Ok(());
    }
    Err(CategoryError::NotVaultOwner {
        user_id: user_id.to_string(),
        vault_id: vault.id.clone(),
    })
}

fn write_error(op: &'static str, category_id: &str) -> impl FnOnce(StoreError) -> CategoryError {
    move |err| match err {
        StoreError::NotFound { .. } => CategoryError::NotFound {
            category_id: category_id.to_string(),
        },
        source => CategoryError::Unexpected { op, source },
    }
}

#[cfg(test)]
mod tests {
    use crate::{Argon2Hasher, CategoryError, CategoryStatus, Engine, ErrorKind, NewUser, VaultRole};

    fn engine() -> Engine {
        Engine::builder()
            .hasher(Argon2Hasher::with_cost(8, 1).unwrap())
            .build()
    }

    struct Fixture {
        engine: Engine,
        owner: String,
        editor: String,
        vault_id: String,
    }

    async fn register(engine: &Engine, email: &str) -> String {
        engine
            .users()
            .create_one(NewUser {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: email.to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap()
    }

    async fn fixture() -> Fixture {
        let engine = engine();
        let owner = register(&engine, "owner@b.eu").await;
        let editor = register(&engine, "editor@b.eu").await;
        let vault_id = engine.vaults().create_one(&owner, "Home").await.unwrap();
        engine
            .vaults()
            .add_user(&owner, &editor, &vault_id, VaultRole::Editor)
            .await
            .unwrap();
        Fixture {
            engine,
            owner,
            editor,
            vault_id,
        }
    }

    #[tokio::test]
    async fn owner_creates_active_category() {
        let f = fixture().await;
        let id = f
            .engine
            .categories()
            .create_one("Groceries", &f.owner, &f.vault_id)
            .await
            .unwrap();

        let category = f
            .engine
            .categories()
            .find_one_by_id(&f.editor, &id)
            .await
            .unwrap();
        assert_eq!(category.name, "Groceries");
        assert_eq!(category.status, CategoryStatus::Active);
        assert_eq!(category.priority, 0);
        assert_eq!(category.vault_id, f.vault_id);
        assert_eq!(category.created_by, f.owner);
    }

    #[tokio::test]
    async fn editor_cannot_create() {
        let f = fixture().await;
        let err = f
            .engine
            .categories()
            .create_one("Groceries", &f.editor, &f.vault_id)
            .await
            .unwrap_err();
        assert!(matches!(err, CategoryError::NotVaultOwner { .. }));
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn names_are_unique_per_vault() {
        let f = fixture().await;
        let other_vault = f.engine.vaults().create_one(&f.owner, "Work").await.unwrap();
        let categories = f.engine.categories();

        categories
            .create_one("Groceries", &f.owner, &f.vault_id)
            .await
            .unwrap();
        categories
            .create_one("Groceries", &f.owner, &other_vault)
            .await
            .unwrap();
        categories
            .create_one("groceries", &f.owner, &f.vault_id)
            .await
            .unwrap();

        let err = categories
            .create_one("Groceries", &f.owner, &f.vault_id)
            .await
            .unwrap_err();
        assert!(matches!(err, CategoryError::DuplicateName { .. }));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn stranger_sees_vault_not_found() {
        let f = fixture().await;
        let stranger = register(&f.engine, "stranger@b.eu").await;

        let err = f
            .engine
            .categories()
            .create_one("Rent", &stranger, &f.vault_id)
            .await
            .unwrap_err();
        assert!(matches!(err, CategoryError::VaultNotFound { .. }));

        let err = f
            .engine
            .categories()
            .find_all(&stranger, &f.vault_id)
            .await
            .unwrap_err();
        assert!(matches!(err, CategoryError::VaultNotFound { .. }));
    }

    #[tokio::test]
    async fn members_list_categories() {
        let f = fixture().await;
        let categories = f.engine.categories();
        assert!(
            categories
                .find_all(&f.editor, &f.vault_id)
                .await
                .unwrap()
                .is_empty()
        );

        categories
            .create_one("Rent", &f.owner, &f.vault_id)
            .await
            .unwrap();
        let food = categories
            .create_one("Food", &f.owner, &f.vault_id)
            .await
            .unwrap();
        categories
            .set_priority(&f.owner, &food, -1)
            .await
            .unwrap();

        let names: Vec<String> = categories
            .find_all(&f.editor, &f.vault_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Food", "Rent"]);
    }

    #[tokio::test]
    async fn foreign_category_is_not_found() {
        let f = fixture().await;
        let stranger = register(&f.engine, "stranger@b.eu").await;
        let id = f
            .engine
            .categories()
            .create_one("Rent", &f.owner, &f.vault_id)
            .await
            .unwrap();

        let foreign = f
            .engine
            .categories()
            .find_one_by_id(&stranger, &id)
            .await
            .unwrap_err();
        let missing = f
            .engine
            .categories()
            .find_one_by_id(&stranger, "missing")
            .await
            .unwrap_err();
        assert!(matches!(foreign, CategoryError::NotFound { .. }));
        assert!(matches!(missing, CategoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn only_owner_updates() {
        let f = fixture().await;
        let categories = f.engine.categories();
        let id = categories
            .create_one("Rent", &f.owner, &f.vault_id)
            .await
            .unwrap();

        let err = categories
            .set_status(&f.editor, &id, CategoryStatus::Inactive)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let updated = categories
            .set_status(&f.owner, &id, CategoryStatus::Inactive)
            .await
            .unwrap();
        assert_eq!(updated.status, CategoryStatus::Inactive);
        let stored = categories.find_one_by_id(&f.owner, &id).await.unwrap();
        assert_eq!(stored.status, CategoryStatus::Inactive);
    }
}

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    Argon2Hasher, CredentialStore, ExpenseCategoryStore, MemoryStore, PasswordHasher, SqlStore,
    VaultStore,
};

mod categories;
mod users;
mod vaults;

pub use categories::ExpenseCategoryService;
pub use users::UserService;
pub use vaults::VaultService;

/// The three services wired over one store.
#[derive(Clone)]
pub struct Engine {
    users: UserService,
    vaults: VaultService,
    categories: ExpenseCategoryService,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn with_store<S>(store: S, hasher: Arc<dyn PasswordHasher>) -> Self
    where
        S: CredentialStore + VaultStore + ExpenseCategoryStore + 'static,
    {
        let store = Arc::new(store);
        let users = UserService::new(store.clone(), hasher);
        let vaults = VaultService::new(store.clone(), users.clone());
        let categories = ExpenseCategoryService::new(store, vaults.clone());
        Self {
            users,
            vaults,
            categories,
        }
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn vaults(&self) -> &VaultService {
        &self.vaults
    }

    pub fn categories(&self) -> &ExpenseCategoryService {
        &self.categories
    }
}

/// The builder for `Engine`. Without a database the engine runs in memory.
#[derive(Default)]
pub struct EngineBuilder {
    database: Option<DatabaseConnection>,
    hasher: Option<Arc<dyn PasswordHasher>>,
}

impl EngineBuilder {
    /// Pass the database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = Some(db);
        self
    }

    /// Override the password hasher
    pub fn hasher(mut self, hasher: impl PasswordHasher + 'static) -> EngineBuilder {
        self.hasher = Some(Arc::new(hasher));
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        let hasher = self
            .hasher
            .unwrap_or_else(|| Arc::new(Argon2Hasher::default()));
        match self.database {
            Some(database) => Engine::with_store(SqlStore::new(database), hasher),
            None => Engine::with_store(MemoryStore::new(), hasher),
        }
    }
}

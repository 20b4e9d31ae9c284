use std::sync::{Arc, OnceLock};

use tracing::{debug, info};

use crate::{
    CredentialStore, PasswordHasher, StoreError, User, UserError,
    users::{NewUser, NewUserRecord},
};

/// Translate a store failure, mapping a missing row to `UserError::NotFound`.
fn user_error(op: &'static str, key: &str) -> impl FnOnce(StoreError) -> UserError {
    move |err| match err {
        StoreError::NotFound { .. } => UserError::NotFound(key.to_string()),
        source => UserError::Unexpected { op, source },
    }
}

const DUMMY_PASSWORD: &str = "dummy password for unknown accounts";

/// Registration, lookups and credential checks.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    /// Verified against when the email is unknown, so both paths pay one hash.
    dummy_hash: Arc<OnceLock<String>>,
}

impl UserService {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            store,
            hasher,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Register a user and return its id.
    pub async fn create_one(&self, user: NewUser) -> Result<String, UserError> {
        let password_hash = self.hasher.hash(&user.password)?;

        match self.store.find_one_by_email(&user.email).await {
            Ok(_) => return Err(UserError::EmailAlreadyExists(user.email)),
            Err(err) if err.is_not_found() => {}
            Err(source) => {
                return Err(UserError::Unexpected {
                    op: "find user by email",
                    source,
                });
            }
        }

        let email = user.email.clone();
        let user_id = self
            .store
            .create_one(NewUserRecord {
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                password_hash,
            })
            .await
            .map_err(|err| match err {
                // Lost a race with a concurrent registration.
                StoreError::Conflict { .. } => UserError::EmailAlreadyExists(email.clone()),
                source => UserError::Unexpected {
                    op: "create user",
                    source,
                },
            })?;
        info!(%user_id, "user registered");
        Ok(user_id)
    }

    pub async fn find_all(&self) -> Result<Vec<User>, UserError> {
        self.store
            .find_all()
            .await
            .map_err(|source| UserError::Unexpected {
                op: "list users",
                source,
            })
    }

    pub async fn find_one_by_id(&self, user_id: &str) -> Result<User, UserError> {
        self.store
            .find_one_by_id(user_id)
            .await
            .map_err(user_error("find user by id", user_id))
    }

    pub async fn find_one_by_email(&self, email: &str) -> Result<User, UserError> {
        self.store
            .find_one_by_email(email)
            .await
            .map_err(user_error("find user by email", email))
    }

    /// Returns `(password_hash, user_id)`.
    pub async fn find_password_hash_and_user_id_for_email(
        &self,
        email: &str,
    ) -> Result<(String, String), UserError> {
        self.store
            .find_password_hash_and_user_id_for_email(email)
            .await
            .map_err(user_error("find password hash", email))
    }

    /// Point the user's active vault at `vault_id`. No membership check.
    pub async fn assign_active_vault(&self, user_id: &str, vault_id: &str) -> Result<(), UserError> {
        self.store
            .assign_active_vault(user_id, vault_id)
            .await
            .map_err(user_error("assign active vault", user_id))?;
        debug!(%user_id, %vault_id, "active vault assigned");
        Ok(())
    }

    /// Resolve a user from an email and a clear-text password.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`
    /// after one password verification.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserError> {
        let (hash, user_id) = match self.find_password_hash_and_user_id_for_email(email).await {
            Ok(found) => found,
            Err(UserError::NotFound(_)) => {
                let dummy = self
                    .dummy_hash
                    .get_or_init(|| self.hasher.hash(DUMMY_PASSWORD).unwrap_or_default());
                let _ = self.hasher.verify(password, dummy);
                return Err(UserError::InvalidCredentials);
            }
            Err(err) => return Err(err),
        };
        if !self.hasher.verify(password, &hash)? {
            debug!(%user_id, "password mismatch");
            return Err(UserError::InvalidCredentials);
        }
        self.find_one_by_id(&user_id).await
    }
}

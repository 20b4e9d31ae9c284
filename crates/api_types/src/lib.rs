use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod user {
    use super::*;

    /// Registration request.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    /// Successful login. `expires_in` is the expiry as a unix timestamp.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LoginToken {
        pub token: String,
        pub expires_in: u64,
        pub token_type: String,
    }

    /// A user as exposed over the API. Never carries the password hash.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: String,
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub active_vault: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsersResponse {
        pub users: Vec<UserView>,
    }
}

pub mod membership {
    use super::*;

    /// Role of a user in a vault.
    ///
    /// The server treats roles as:
    /// - `owner`: full access, can invite members and manage categories.
    /// - `editor`: member without management rights.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MembershipRole {
        Owner,
        Editor,
    }

    impl MembershipRole {
        /// Returns the canonical role string used by the engine/database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Owner => "owner",
                Self::Editor => "editor",
            }
        }
    }

    /// Request body for adding a member to a vault.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberAdd {
        pub user_id: String,
        pub role: MembershipRole,
    }
}

pub mod vault {
    use super::*;
    use crate::membership::MembershipRole;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VaultNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VaultCreated {
        pub id: String,
    }

    /// A vault seen by one member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct VaultView {
        pub id: String,
        pub name: String,
        pub role: MembershipRole,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VaultsResponse {
        pub vaults: Vec<VaultView>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryStatus {
        Active,
        Inactive,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCategoryNew {
        pub vault_id: String,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCategoryCreated {
        pub id: String,
    }

    /// Exactly one of the fields must be set.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseCategoryUpdate {
        pub status: Option<CategoryStatus>,
        pub priority: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCategoryView {
        pub id: String,
        pub name: String,
        pub status: CategoryStatus,
        pub priority: i32,
        pub vault_id: String,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCategoriesResponse {
        pub categories: Vec<ExpenseCategoryView>,
    }
}

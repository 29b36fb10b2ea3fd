//! Account and admin user-management endpoints.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use storefront_api_models::{ApiResult, Credentials, Registration, TokenResponse, UserProfile};
use storefront_session::ProfileSource;

use crate::client::ApiClient;

/// `/users` and `/admin/users` operations.
#[derive(Clone, Copy, Debug)]
pub struct Users<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    /// User and account operations.
    #[must_use]
    pub const fn users(&self) -> Users<'_> {
        Users { client: self }
    }
}

impl Users<'_> {
    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Registration failed`).
    pub async fn register(&self, registration: &Registration) -> ApiResult<Value> {
        self.client
            .send_json(
                Method::POST,
                &["users", "register"],
                registration,
                "Registration failed",
            )
            .await
    }

    /// Exchange credentials for a bearer token. Does not touch the session;
    /// hand the token to `CredentialStore::login`.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Login failed`).
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<TokenResponse> {
        self.client
            .send_json(Method::POST, &["users", "login"], credentials, "Login failed")
            .await
    }

    /// Profile of the user owning the current credential.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Failed to fetch user info`).
    pub async fn me(&self) -> ApiResult<UserProfile> {
        self.client
            .get(&["users", "me"], "Failed to fetch user info")
            .await
    }

    /// Update the current user's profile.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Failed to update profile`).
    pub async fn update_profile(&self, changes: &Value) -> ApiResult<UserProfile> {
        self.client
            .send_json(
                Method::PUT,
                &["users", "me"],
                changes,
                "Failed to update profile",
            )
            .await
    }

    /// List users (admin).
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Failed to fetch users`).
    pub async fn list(&self, query: &[(String, String)]) -> ApiResult<Value> {
        self.client
            .get_with_query(&["admin", "users"], query, "Failed to fetch users")
            .await
    }

    /// Create a user (admin).
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Failed to create user`).
    pub async fn create(&self, user: &Value) -> ApiResult<Value> {
        self.client
            .send_json(Method::POST, &["admin", "users"], user, "Failed to create user")
            .await
    }

    /// Update a user (admin).
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Failed to update user`).
    pub async fn update(&self, user_id: &str, changes: &Value) -> ApiResult<Value> {
        self.client
            .send_json(
                Method::PUT,
                &["admin", "users", user_id],
                changes,
                "Failed to update user",
            )
            .await
    }

    /// Delete a user (admin).
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Failed to delete user`).
    pub async fn delete(&self, user_id: &str) -> ApiResult<Value> {
        self.client
            .delete(&["admin", "users", user_id], "Failed to delete user")
            .await
    }
}

#[async_trait]
impl ProfileSource for ApiClient {
    async fn fetch_profile(&self) -> ApiResult<UserProfile> {
        self.users().me().await
    }
}

//! User service for the simulated login.
//!
//! There is no authentication: logging in only remembers the e-mail so the
//! profile survives a restart. The password is checked for presence and
//! then dropped.

use super::model::{DEFAULT_USER_EMAIL, UserProfile};
use crate::error::{EchoryaError, Result};
use crate::state::{KeyValueStore, USER_EMAIL_KEY};
use std::sync::Arc;
use tracing::info;

/// Service for managing user identity.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Returns the remembered e-mail, or the default one.
    async fn current_email(&self) -> Result<String>;

    /// Returns the profile derived from [`current_email`](Self::current_email).
    async fn profile(&self) -> Result<UserProfile> {
        Ok(UserProfile::from_email(&self.current_email().await?))
    }

    /// Records `email` as the signed-in user.
    ///
    /// Both fields must be non-empty after trimming.
    async fn login(&self, email: &str, password: &str) -> Result<UserProfile>;

    /// Forgets the remembered e-mail.
    async fn logout(&self) -> Result<()>;
}

/// [`UserService`] backed by a [`KeyValueStore`].
#[derive(Clone)]
pub struct StoredUserService {
    store: Arc<dyn KeyValueStore>,
}

impl StoredUserService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl UserService for StoredUserService {
    async fn current_email(&self) -> Result<String> {
        Ok(self
            .store
            .get(USER_EMAIL_KEY)
            .await?
            .unwrap_or_else(|| DEFAULT_USER_EMAIL.to_string()))
    }

    async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let email = email.trim();
        if email.is_empty() || password.trim().is_empty() {
            return Err(EchoryaError::invalid_input(
                "e-mail and password are both required",
            ));
        }

        self.store.set(USER_EMAIL_KEY, email.to_string()).await?;
        info!(email = %email, "user logged in");
        Ok(UserProfile::from_email(email))
    }

    async fn logout(&self) -> Result<()> {
        self.store.remove(USER_EMAIL_KEY).await
    }
}

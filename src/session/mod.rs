//! Authentication session state
//!
//! The original client kept three entries in the device key-value store:
//! the logged-in flag, the role and the bearer token. [`SessionManager`]
//! holds the in-memory copy and drives an injected [`SessionStore`] for
//! persistence, so the contract stays testable without touching disk.

mod store;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

use crate::models::Role;
use std::path::PathBuf;

/// Persisted entry names, carried over from the original client
pub const KEY_LOGGED_IN: &str = "isLoggedIn";
pub const KEY_ROLE: &str = "role";
pub const KEY_TOKEN: &str = "token";

/// Errors from session persistence
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to access session file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Session file {path:?} is not valid JSON")]
    Corrupt { path: PathBuf },
}

/// In-memory session plus its persistence seam
///
/// Contract: `login` and `logout` mutate memory first, then persist, so the
/// process-local view is never behind the store. `restore` runs once at
/// startup; corrupt or absent persisted state defaults to logged-out and is
/// never an error.
pub struct SessionManager {
    store: Box<dyn SessionStore>,
    logged_in: bool,
    role: Option<Role>,
    token: Option<String>,
}

impl SessionManager {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self {
            store,
            logged_in: false,
            role: None,
            token: None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Mark the session as authenticated and persist it
    pub async fn login(&mut self, role: Role, token: String) -> Result<(), SessionError> {
        self.logged_in = true;
        self.role = Some(role);
        self.token = Some(token.clone());

        self.store.set(KEY_LOGGED_IN, "true").await?;
        self.store.set(KEY_ROLE, &role.to_string()).await?;
        self.store.set(KEY_TOKEN, &token).await?;

        tracing::info!(%role, "Session opened");
        Ok(())
    }

    /// Clear the session; in-memory state is gone before persistence resolves
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        self.logged_in = false;
        self.role = None;
        self.token = None;

        self.store.clear().await?;
        tracing::info!("Session closed");
        Ok(())
    }

    /// Restore persisted state; runs once at process start
    pub async fn restore(&mut self) {
        let logged_in = match self.store.get(KEY_LOGGED_IN).await {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!("Could not read persisted session, starting logged out: {}", e);
                return;
            }
        };

        if !logged_in {
            return;
        }

        let role = self
            .store
            .get(KEY_ROLE)
            .await
            .ok()
            .flatten()
            .and_then(|r| r.parse::<Role>().ok());
        let token = self.store.get(KEY_TOKEN).await.ok().flatten();

        // A logged-in flag without role or token is unusable state.
        match (role, token) {
            (Some(role), Some(token)) => {
                self.logged_in = true;
                self.role = Some(role);
                self.token = Some(token);
                tracing::debug!(%role, "Session restored");
            }
            _ => {
                tracing::warn!("Persisted session is incomplete, starting logged out");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_persists_all_three_entries() {
        let store = MemorySessionStore::default();
        let mut session = SessionManager::new(Box::new(store));

        session
            .login(Role::Admin, "tok-123".to_string())
            .await
            .unwrap();

        assert!(session.is_logged_in());
        assert_eq!(session.role(), Some(Role::Admin));
        assert_eq!(session.token(), Some("tok-123"));

        assert_eq!(
            session.store.get(KEY_LOGGED_IN).await.unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(
            session.store.get(KEY_ROLE).await.unwrap().as_deref(),
            Some("admin")
        );
        assert_eq!(
            session.store.get(KEY_TOKEN).await.unwrap().as_deref(),
            Some("tok-123")
        );
    }

    #[tokio::test]
    async fn test_logout_clears_memory_and_store() {
        let store = MemorySessionStore::default();
        let mut session = SessionManager::new(Box::new(store));

        session.login(Role::User, "tok".to_string()).await.unwrap();
        session.logout().await.unwrap();

        assert!(!session.is_logged_in());
        assert_eq!(session.role(), None);
        assert_eq!(session.token(), None);
        assert_eq!(session.store.get(KEY_LOGGED_IN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_round_trip() {
        let store = MemorySessionStore::default();
        store.set(KEY_LOGGED_IN, "true").await.unwrap();
        store.set(KEY_ROLE, "usuario").await.unwrap();
        store.set(KEY_TOKEN, "tok").await.unwrap();

        let mut session = SessionManager::new(Box::new(store));
        session.restore().await;

        assert!(session.is_logged_in());
        assert_eq!(session.role(), Some(Role::User));
        assert_eq!(session.token(), Some("tok"));
    }

    #[tokio::test]
    async fn test_restore_incomplete_state_defaults_to_logged_out() {
        let store = MemorySessionStore::default();
        store.set(KEY_LOGGED_IN, "true").await.unwrap();
        // role and token missing

        let mut session = SessionManager::new(Box::new(store));
        session.restore().await;

        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn test_restore_absent_state_defaults_to_logged_out() {
        let store = MemorySessionStore::default();
        let mut session = SessionManager::new(Box::new(store));
        session.restore().await;
        assert!(!session.is_logged_in());
    }
}

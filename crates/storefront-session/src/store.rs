//! Credential store: the single owner of the session token and user profile.
//!
//! # Design
//! - The persisted token is the durable copy; the store keeps a write-through
//!   mirror loaded once at construction.
//! - `is_authenticated` is derived from the mirror and never stored separately.
//! - `fetch_user` is fail-closed: any failure logs the session out.
//! - Profile fetches are serialized, and a fetch that overlaps a login/logout
//!   is discarded instead of applied.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use storefront_api_models::{ApiError, ApiResult, UserProfile};
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::storage::{KeyValueStorage, MemoryStorage, TOKEN_KEY};

/// Backend operation that resolves the current credential into a profile.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch the profile of the user the current credential belongs to.
    async fn fetch_profile(&self) -> ApiResult<UserProfile>;
}

/// Observable session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No credential held.
    Anonymous,
    /// Credential held, profile not loaded yet.
    Unverified,
    /// Credential held and profile loaded.
    Verified,
}

impl SessionState {
    /// Whether a credential is held in this state.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        !matches!(self, Self::Anonymous)
    }
}

/// Result of [`CredentialStore::fetch_user`].
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    /// Nothing to verify; no request was made.
    Anonymous,
    /// Profile loaded and stored.
    Loaded(UserProfile),
    /// The request failed and the session was logged out.
    Invalidated(ApiError),
    /// A login or logout happened while the request was in flight; its result
    /// was discarded.
    Superseded,
}

#[derive(Default)]
struct SessionSlots {
    token: Option<String>,
    user: Option<UserProfile>,
    epoch: u64,
}

/// Session context shared (via `Arc`) by the HTTP client and its callers.
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStorage>,
    slots: Mutex<SessionSlots>,
    refresh: tokio::sync::Mutex<()>,
}

impl CredentialStore {
    /// Build a store over `storage`, seeding state from the persisted token.
    ///
    /// A blank persisted token counts as absent, and so does an unparseable
    /// storage file: the store starts anonymous and the next `login` or
    /// `logout` rewrites it.
    ///
    /// # Errors
    ///
    /// Returns an error when the storage cannot be read.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> SessionResult<Self> {
        let token = match storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|token| !token.trim().is_empty()),
            Err(err @ SessionError::Json { .. }) => {
                warn!(error = %err, "persisted session unreadable; starting anonymous");
                None
            }
            Err(err) => return Err(err),
        };
        debug!(authenticated = token.is_some(), "session store initialised");
        Ok(Self::with_slots(
            storage,
            SessionSlots {
                token,
                ..SessionSlots::default()
            },
        ))
    }

    /// Anonymous store over non-durable storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_slots(Arc::new(MemoryStorage::new()), SessionSlots::default())
    }

    fn with_slots(storage: Arc<dyn KeyValueStorage>, slots: SessionSlots) -> Self {
        Self {
            storage,
            slots: Mutex::new(slots),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, SessionSlots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current credential, if any. Read by the request credential hook.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.slots().token.clone()
    }

    /// Whether a credential is held. Says nothing about its validity.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.slots().token.is_some()
    }

    /// Cached profile from the last successful [`Self::fetch_user`].
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.slots().user.clone()
    }

    /// Snapshot of the session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        let slots = self.slots();
        match (&slots.token, &slots.user) {
            (None, _) => SessionState::Anonymous,
            (Some(_), None) => SessionState::Unverified,
            (Some(_), Some(_)) => SessionState::Verified,
        }
    }

    /// Persist `token` and enter the authenticated state. No network call.
    ///
    /// A profile cached for a different token is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyToken`] for a blank token, or the storage
    /// error when persisting fails; the in-memory state is unchanged then.
    pub fn login(&self, token: impl Into<String>) -> SessionResult<()> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }

        let mut slots = self.slots();
        self.storage.set(TOKEN_KEY, &token)?;
        if slots.token.as_deref() != Some(token.as_str()) {
            slots.user = None;
            slots.epoch = slots.epoch.wrapping_add(1);
            slots.token = Some(token);
        }
        info!("session credential stored");
        Ok(())
    }

    /// Drop the profile and credential, and remove the persisted token.
    /// Calling it while anonymous is a no-op with the same end state.
    ///
    /// # Errors
    ///
    /// Returns the storage error when the persisted token cannot be removed.
    /// The in-memory state is cleared regardless.
    pub fn logout(&self) -> SessionResult<()> {
        let mut slots = self.slots();
        self.clear(&mut slots)
    }

    fn clear(&self, slots: &mut SessionSlots) -> SessionResult<()> {
        slots.user = None;
        if slots.token.take().is_some() {
            slots.epoch = slots.epoch.wrapping_add(1);
            info!("session cleared");
        }
        self.storage.remove(TOKEN_KEY).inspect_err(|err| {
            warn!(error = %err, "failed to remove persisted credential");
        })
    }

    /// Verify the held credential by loading the user profile from `source`.
    ///
    /// Anonymous sessions skip the request. Any failure, whether a rejected
    /// credential or an unreachable backend, logs the session out.
    pub async fn fetch_user<S>(&self, source: &S) -> FetchOutcome
    where
        S: ProfileSource + ?Sized,
    {
        let _in_flight = self.refresh.lock().await;

        let epoch = {
            let slots = self.slots();
            if slots.token.is_none() {
                debug!("profile fetch skipped for anonymous session");
                return FetchOutcome::Anonymous;
            }
            slots.epoch
        };

        let result = source.fetch_profile().await;

        let mut slots = self.slots();
        if slots.epoch != epoch {
            debug!("profile fetch superseded by a session change");
            return FetchOutcome::Superseded;
        }
        match result {
            Ok(profile) => {
                slots.user = Some(profile.clone());
                debug!("user profile loaded");
                FetchOutcome::Loaded(profile)
            }
            Err(error) => {
                warn!(
                    error = %error,
                    status = ?error.status(),
                    "profile fetch failed; logging out"
                );
                if let Err(err) = self.clear(&mut slots) {
                    debug!(error = %err, "credential purge failed during invalidation");
                }
                FetchOutcome::Invalidated(error)
            }
        }
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CredentialStore")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

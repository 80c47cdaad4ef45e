//! Session/profile store: the local mirror of authentication and profile fields.
//!
//! ```text
//!                 login / register
//! Unauthenticated ────────────────▶ Authenticated
//!        ▲                               │
//!        └───────────────────────────────┘
//!          logout, or any 401/403 reply
//!          (every field is cleared)
//! ```
//!
//! The store is the only state shared between screens. Writes to the same
//! field are last-write-wins; [`SessionStore::clear_all`] is atomic.

mod store;

pub use store::*;

use std::path::Path;
use std::sync::Mutex;

use crate::db::Database;
use crate::error::{ClientError, ClientResult};
use crate::models::{AuthUser, Role, UserProfile};

/// Named fields held by the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionField {
    Token,
    Role,
    LastName,
    FirstName,
    Email,
    Phone,
    Address,
    BirthDate,
}

impl SessionField {
    pub const ALL: [SessionField; 8] = [
        SessionField::Token,
        SessionField::Role,
        SessionField::LastName,
        SessionField::FirstName,
        SessionField::Email,
        SessionField::Phone,
        SessionField::Address,
        SessionField::BirthDate,
    ];

    /// Storage key.
    pub fn key(&self) -> &'static str {
        match self {
            SessionField::Token => "token",
            SessionField::Role => "role",
            SessionField::LastName => "last_name",
            SessionField::FirstName => "first_name",
            SessionField::Email => "email",
            SessionField::Phone => "phone",
            SessionField::Address => "address",
            SessionField::BirthDate => "birth_date",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// A token is present. The role is `None` when missing or unrecognised.
    Authenticated { role: Option<Role> },
}

/// Thread-safe wrapper over a [`KeyValueStore`].
pub struct SessionStore {
    store: Mutex<Box<dyn KeyValueStore>>,
}

impl SessionStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Mutex::new(Box::new(store)),
        }
    }

    /// Session that survives restarts, stored in SQLite at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> ClientResult<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    /// Session that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    // =========================================================================
    // Field access
    // =========================================================================

    pub fn set_field(&self, field: SessionField, value: &str) -> ClientResult<()> {
        let store = self.store.lock()?;
        store.set(field.key(), value)?;
        Ok(())
    }

    /// `None` when the field was never set (or was cleared).
    pub fn get_field(&self, field: SessionField) -> ClientResult<Option<String>> {
        let store = self.store.lock()?;
        Ok(store.get(field.key())?)
    }

    /// Remove every field at once.
    pub fn clear_all(&self) -> ClientResult<()> {
        let store = self.store.lock()?;
        store.clear()?;
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn token(&self) -> ClientResult<Option<String>> {
        Ok(self
            .get_field(SessionField::Token)?
            .filter(|t| !t.trim().is_empty()))
    }

    /// Token for an authenticated call, or `Unauthorized` if there is none.
    pub fn require_token(&self) -> ClientResult<String> {
        self.token()?
            .ok_or_else(|| ClientError::Unauthorized("Missing session token".into()))
    }

    pub fn state(&self) -> ClientResult<SessionState> {
        let store = self.store.lock()?;
        let token = store.get(SessionField::Token.key())?;
        if token.map_or(true, |t| t.trim().is_empty()) {
            return Ok(SessionState::Unauthenticated);
        }
        let role = store
            .get(SessionField::Role.key())?
            .as_deref()
            .and_then(Role::parse);
        Ok(SessionState::Authenticated { role })
    }

    pub fn is_authenticated(&self) -> ClientResult<bool> {
        Ok(matches!(self.state()?, SessionState::Authenticated { .. }))
    }

    /// Start a fresh session after login or sign-up.
    ///
    /// Replaces whatever a previous session left behind.
    pub fn begin(&self, token: &str, user: &AuthUser) -> ClientResult<()> {
        let mut entries: Vec<(&str, &str)> = vec![(SessionField::Token.key(), token)];
        let optional = [
            (SessionField::Role, &user.role),
            (SessionField::LastName, &user.last_name),
            (SessionField::FirstName, &user.first_name),
            (SessionField::Email, &user.email),
            (SessionField::Phone, &user.phone),
            (SessionField::Address, &user.address),
            (SessionField::BirthDate, &user.birth_date),
        ];
        for (field, value) in &optional {
            if let Some(value) = value.as_deref() {
                entries.push((field.key(), value));
            }
        }

        let store = self.store.lock()?;
        store.replace_all(&entries)?;
        tracing::info!(
            role = user.role.as_deref().unwrap_or("unknown"),
            "Session started"
        );
        Ok(())
    }

    /// Drop the session (logout or rejected token).
    pub fn end(&self) -> ClientResult<()> {
        self.clear_all()?;
        tracing::info!("Session cleared");
        Ok(())
    }

    /// Clear the session if `result` is an authorization failure, then pass it through.
    pub fn guard<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(ClientError::Unauthorized(reason)) = &result {
            tracing::warn!(%reason, "Authorization rejected, ending session");
            if let Err(e) = self.end() {
                tracing::error!(error = %e, "Failed to clear session after rejection");
            }
        }
        result
    }

    // =========================================================================
    // Cached profile
    // =========================================================================

    /// Mirror the profile fields locally.
    pub fn cache_profile(&self, profile: &UserProfile) -> ClientResult<()> {
        let store = self.store.lock()?;
        for (field, value) in profile_fields(profile) {
            store.set(field.key(), value)?;
        }
        Ok(())
    }

    /// Last known profile; missing fields read as empty.
    pub fn cached_profile(&self) -> ClientResult<UserProfile> {
        let store = self.store.lock()?;
        let read = |field: SessionField| -> ClientResult<String> {
            Ok(store.get(field.key())?.unwrap_or_default())
        };
        Ok(UserProfile {
            last_name: read(SessionField::LastName)?,
            first_name: read(SessionField::FirstName)?,
            email: read(SessionField::Email)?,
            phone: read(SessionField::Phone)?,
            address: read(SessionField::Address)?,
            birth_date: read(SessionField::BirthDate)?,
        })
    }
}

fn profile_fields(profile: &UserProfile) -> [(SessionField, &str); 6] {
    [
        (SessionField::LastName, profile.last_name.as_str()),
        (SessionField::FirstName, profile.first_name.as_str()),
        (SessionField::Email, profile.email.as_str()),
        (SessionField::Phone, profile.phone.as_str()),
        (SessionField::Address, profile.address.as_str()),
        (SessionField::BirthDate, profile.birth_date.as_str()),
    ]
}

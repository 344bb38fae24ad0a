//! Explicit session object.
//!
//! Nothing here touches storage directly. `begin_hydrate` names the keys the
//! shell should read, `apply_loaded` folds each answer in, `establish` and
//! `clear` change the in-memory session and the caller persists the result.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::{RequiredField, ValidationError};
use crate::model::{FetchTicket, TicketCounter, UserId};

pub const LOGIN_FAILED: &str = "Login failed";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionKey {
    AccessToken,
    RefreshToken,
    UserEmail,
}

impl SessionKey {
    pub const ALL: [SessionKey; 3] = [Self::AccessToken, Self::RefreshToken, Self::UserEmail];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
            Self::UserEmail => "user_email",
        }
    }
}

/// Password as typed by the user. Redacted in `Debug`, never stored in the model.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// What a successful sign-in hands back.
#[derive(Debug)]
pub struct SignInOutcome {
    pub user_id: UserId,
    pub email: String,
    pub access_token: SecretString,
    pub refresh_token: SecretString,
}

#[derive(Debug, Default)]
pub struct Session {
    access_token: Option<SecretString>,
    refresh_token: Option<SecretString>,
    email: Option<String>,
    user_id: Option<UserId>,
    awaiting: Vec<SessionKey>,
}

impl Session {
    /// Forgets any in-memory state and returns the keys to read back.
    pub fn begin_hydrate(&mut self) -> [SessionKey; 3] {
        *self = Self {
            awaiting: SessionKey::ALL.to_vec(),
            ..Self::default()
        };
        SessionKey::ALL
    }

    #[must_use]
    pub fn is_hydrating(&self) -> bool {
        !self.awaiting.is_empty()
    }

    /// Folds one stored value in. Returns true once the last awaited key has
    /// answered. Blank values count as absent.
    pub fn apply_loaded(&mut self, key: SessionKey, value: Option<String>) -> bool {
        let Some(pos) = self.awaiting.iter().position(|k| *k == key) else {
            debug!(key = key.name(), "ignoring session value outside hydration");
            return false;
        };
        self.awaiting.swap_remove(pos);

        let value = value.filter(|v| !v.trim().is_empty());
        match key {
            SessionKey::AccessToken => self.access_token = value.map(SecretString::new),
            SessionKey::RefreshToken => self.refresh_token = value.map(SecretString::new),
            SessionKey::UserEmail => self.email = value,
        }

        if self.awaiting.is_empty() {
            info!(
                authenticated = self.is_authenticated(),
                "session hydrated"
            );
            true
        } else {
            false
        }
    }

    pub fn establish(&mut self, outcome: SignInOutcome) {
        info!(user_id = %outcome.user_id, "session established");
        self.awaiting.clear();
        self.access_token = Some(outcome.access_token);
        self.refresh_token = Some(outcome.refresh_token);
        self.email = Some(outcome.email).filter(|e| !e.is_empty());
        self.user_id = Some(outcome.user_id);
    }

    /// Teardown. Returns the keys whose stored values must be removed.
    pub fn clear(&mut self) -> [SessionKey; 3] {
        if self.is_authenticated() {
            info!("session cleared");
        } else {
            warn!("clearing a session that was not authenticated");
        }
        *self = Self::default();
        SessionKey::ALL
    }

    /// Values to persist, keyed by storage key. Only keys with a value appear.
    #[must_use]
    pub fn entries(&self) -> Vec<(SessionKey, &str)> {
        let mut out = Vec::with_capacity(3);
        if let Some(token) = &self.access_token {
            out.push((SessionKey::AccessToken, token.expose_secret().as_str()));
        }
        if let Some(token) = &self.refresh_token {
            out.push((SessionKey::RefreshToken, token.expose_secret().as_str()));
        }
        if let Some(email) = &self.email {
            out.push((SessionKey::UserEmail, email.as_str()));
        }
        out
    }

    /// Presence of an access token is the only authentication signal.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    #[must_use]
    pub fn bearer_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.email().unwrap_or("User")
    }
}

#[derive(Debug, Default)]
pub struct LoginState {
    pending: Option<FetchTicket>,
    error: Option<String>,
    tickets: TicketCounter,
}

impl LoginState {
    /// Validates a submission and returns the ticket for the sign-in request.
    /// `Ok(None)` means a request is already in flight.
    pub fn submit(
        &mut self,
        phone_number: &str,
        password: &Password,
    ) -> Result<Option<FetchTicket>, ValidationError> {
        if self.pending.is_some() {
            debug!("sign-in already pending, ignoring submit");
            return Ok(None);
        }
        if phone_number.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: RequiredField::LoginPhoneNumber,
            });
        }
        if password.is_blank() {
            return Err(ValidationError::MissingField {
                field: RequiredField::Password,
            });
        }
        self.error = None;
        let ticket = self.tickets.issue();
        self.pending = Some(ticket);
        Ok(Some(ticket))
    }

    pub fn reject(&mut self, error: &ValidationError) {
        self.error = Some(error.to_string());
    }

    /// Completes the pending request. Returns false for a stale ticket.
    pub fn finish(&mut self, ticket: FetchTicket, succeeded: bool) -> bool {
        if self.pending != Some(ticket) {
            warn!(ticket = ticket.value(), "discarding stale sign-in result");
            return false;
        }
        self.pending = None;
        self.error = (!succeeded).then(|| LOGIN_FAILED.to_string());
        true
    }

    pub fn reset(&mut self) {
        self.pending = None;
        self.error = None;
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn pending(&self) -> Option<FetchTicket> {
        self.pending
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

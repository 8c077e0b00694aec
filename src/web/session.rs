//! Typed access to the server-side session.
//!
//! The cookie only carries a signed session id; everything below lives in
//! the session store under three keys: the identity, the flash queue and
//! the CSRF token.

use axum::{extract::FromRequestParts, http::request::Parts, response::Response};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::warn;

use super::{WebError, redirect};
use crate::db::Store;
use crate::domain::paths;

pub const SESSION_COOKIE_NAME: &str = "feedback_session";

const IDENTITY_KEY: &str = "identity";
const FLASHES_KEY: &str = "flashes";
const CSRF_KEY: &str = "csrf_token";

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login first!";
pub const FORBIDDEN_MESSAGE: &str = "You don't have permission to do that!";

/// At most one authenticated user per session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Primary,
    Info,
    Danger,
}

impl FlashCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Primary => "primary",
            Self::Info => "info",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        self.category.as_str()
    }
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    session: Session,
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(Self { session })
    }
}

impl AuthSession {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn identity(&self) -> Result<SessionIdentity, WebError> {
        Ok(self
            .session
            .get::<SessionIdentity>(IDENTITY_KEY)
            .await?
            .unwrap_or_default())
    }

    /// The username the session claims, without checking the store.
    pub async fn current_username(&self) -> Result<Option<String>, WebError> {
        Ok(self.identity().await?.username)
    }

    /// The logged-in username, confirmed against the store.
    ///
    /// An identity whose account has since been deleted (from another
    /// browser or the CLI) is logged out and reported as anonymous.
    pub async fn current_user(&self, store: &Store) -> Result<Option<String>, WebError> {
        let Some(username) = self.current_username().await? else {
            return Ok(None);
        };

        if store.find_user_by_username(&username).await?.is_some() {
            return Ok(Some(username));
        }

        warn!(username, "Session identity refers to a deleted account");
        self.logout().await?;
        Ok(None)
    }

    /// Binds `username` to the session under a fresh session id.
    pub async fn login(&self, username: &str) -> Result<(), WebError> {
        self.session.cycle_id().await?;
        self.session
            .insert(
                IDENTITY_KEY,
                SessionIdentity {
                    username: Some(username.to_string()),
                },
            )
            .await?;
        self.session.remove::<String>(CSRF_KEY).await?;
        Ok(())
    }

    /// Clears the identity. Pending flashes survive so the next page can
    /// still show them.
    pub async fn logout(&self) -> Result<(), WebError> {
        self.session
            .insert(IDENTITY_KEY, SessionIdentity::default())
            .await?;
        self.session.remove::<String>(CSRF_KEY).await?;
        self.session.cycle_id().await?;
        Ok(())
    }

    pub async fn flash(
        &self,
        category: FlashCategory,
        message: impl Into<String>,
    ) -> Result<(), WebError> {
        let mut flashes = self
            .session
            .get::<Vec<Flash>>(FLASHES_KEY)
            .await?
            .unwrap_or_default();
        flashes.push(Flash {
            category,
            message: message.into(),
        });
        self.session.insert(FLASHES_KEY, flashes).await?;
        Ok(())
    }

    /// Drains the queue; each flash is shown exactly once.
    pub async fn take_flashes(&self) -> Result<Vec<Flash>, WebError> {
        Ok(self
            .session
            .remove::<Vec<Flash>>(FLASHES_KEY)
            .await?
            .unwrap_or_default())
    }

    /// The session's CSRF token, created on first use.
    pub async fn csrf_token(&self) -> Result<String, WebError> {
        if let Some(token) = self.session.get::<String>(CSRF_KEY).await? {
            return Ok(token);
        }

        let token = generate_token();
        self.session.insert(CSRF_KEY, token.clone()).await?;
        Ok(token)
    }

    pub async fn verify_csrf(&self, submitted: Option<&str>) -> Result<bool, WebError> {
        let Some(submitted) = submitted else {
            return Ok(false);
        };
        let stored = self.session.get::<String>(CSRF_KEY).await?;
        Ok(stored.is_some_and(|expected| tokens_match(&expected, submitted)))
    }

    /// Flash "please login" and send the visitor home.
    pub async fn require_login(&self) -> Result<Response, WebError> {
        self.flash(FlashCategory::Danger, LOGIN_REQUIRED_MESSAGE)
            .await?;
        Ok(redirect(paths::HOME))
    }

    pub async fn reject_forbidden(&self) -> Result<Response, WebError> {
        self.flash(FlashCategory::Danger, FORBIDDEN_MESSAGE).await?;
        Ok(redirect(paths::HOME))
    }
}

/// 64 hex characters from 32 random bytes.
fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// Compares without short-circuiting on the first differing byte.
fn tokens_match(expected: &str, submitted: &str) -> bool {
    if expected.len() != submitted.len() {
        return false;
    }
    expected
        .bytes()
        .zip(submitted.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

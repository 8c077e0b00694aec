//! Domain primitives shared by the persistence, service and web layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a feedback row.
///
/// Wrapping the raw `i32` keeps feedback ids from being mixed up with other
/// integers flowing through handlers (counts, limits, status codes).
///
/// ```rust
/// use feedback::domain::FeedbackId;
///
/// let id = FeedbackId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackId(i32);

impl FeedbackId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }

    /// Parses a path segment. Only plain non-negative decimal integers are
    /// accepted, so `/feedback/+5/update` or `/feedback/abc/update` do not
    /// resolve to a row.
    #[must_use]
    pub fn parse(segment: &str) -> Option<Self> {
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        segment.parse::<i32>().ok().map(Self)
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<FeedbackId> for i32 {
    fn from(id: FeedbackId) -> Self {
        id.0
    }
}

impl From<i32> for FeedbackId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

/// Canonical URLs. Usernames are percent-encoded so that any stored value
/// round-trips through the router.
pub mod paths {
    use super::FeedbackId;

    pub const HOME: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const LOGOUT: &str = "/logout";

    #[must_use]
    pub fn user(username: &str) -> String {
        format!("/users/{}", urlencoding::encode(username))
    }

    #[must_use]
    pub fn delete_user(username: &str) -> String {
        format!("/users/{}/delete", urlencoding::encode(username))
    }

    #[must_use]
    pub fn add_feedback(username: &str) -> String {
        format!("/users/{}/feedback/add", urlencoding::encode(username))
    }

    #[must_use]
    pub fn update_feedback(id: FeedbackId) -> String {
        format!("/feedback/{id}/update")
    }

    #[must_use]
    pub fn delete_feedback(id: FeedbackId) -> String {
        format!("/feedback/{id}/delete")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_id_conversions() {
        let id = FeedbackId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(FeedbackId::from(42), id);
    }

    #[test]
    fn feedback_id_parse_accepts_only_digits() {
        assert_eq!(FeedbackId::parse("5"), Some(FeedbackId::new(5)));
        assert_eq!(FeedbackId::parse("007"), Some(FeedbackId::new(7)));
        assert_eq!(FeedbackId::parse(""), None);
        assert_eq!(FeedbackId::parse("abc"), None);
        assert_eq!(FeedbackId::parse("-1"), None);
        assert_eq!(FeedbackId::parse("+1"), None);
        assert_eq!(FeedbackId::parse("99999999999"), None);
    }

    #[test]
    fn paths_encode_usernames() {
        assert_eq!(paths::user("alice"), "/users/alice");
        assert_eq!(paths::user("a b/c"), "/users/a%20b%2Fc");
        assert_eq!(paths::add_feedback("bob"), "/users/bob/feedback/add");
        assert_eq!(
            paths::update_feedback(FeedbackId::new(3)),
            "/feedback/3/update"
        );
    }
}

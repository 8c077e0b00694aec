use askama::Template;
use axum::response::{Html, IntoResponse, Response};

use super::{AppState, WebError, session::AuthSession, session::Flash};
use crate::db::FeedbackEntry;
use crate::domain::paths;
use crate::forms::FormView;

/// What the shared layout needs on every page.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub flashes: Vec<Flash>,
    pub current_user: Option<String>,
    /// Empty when nobody is logged in.
    pub profile_url: String,
    /// Empty when CSRF protection is disabled.
    pub csrf_token: String,
}

impl PageContext {
    /// Drains pending flashes, so call it only for a page that is rendered.
    pub async fn load(state: &AppState, session: &AuthSession) -> Result<Self, WebError> {
        let current_user = session.current_user(state.store()).await?;
        let flashes = session.take_flashes().await?;
        let csrf_token = if state.config().security.csrf_enabled {
            session.csrf_token().await?
        } else {
            String::new()
        };

        Ok(Self {
            flashes,
            profile_url: current_user.as_deref().map(paths::user).unwrap_or_default(),
            current_user,
            csrf_token,
        })
    }
}

pub fn render<T: Template>(page: &T) -> Result<Response, WebError> {
    Ok(Html(page.render()?).into_response())
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub ctx: PageContext,
    pub form: FormView,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub ctx: PageContext,
    pub form: FormView,
}

pub struct FeedbackCard {
    pub title: String,
    pub content: String,
    pub edit_url: String,
    pub delete_url: String,
}

impl From<FeedbackEntry> for FeedbackCard {
    fn from(entry: FeedbackEntry) -> Self {
        Self {
            edit_url: paths::update_feedback(entry.id),
            delete_url: paths::delete_feedback(entry.id),
            title: entry.title,
            content: entry.content,
        }
    }
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfilePage {
    pub ctx: PageContext,
    pub username: String,
    /// RFC 3339 creation timestamp, formatted by the `date` filter.
    pub member_since: String,
    /// Read-only account details.
    pub form: FormView,
    pub feedback: Vec<FeedbackCard>,
    pub add_feedback_url: String,
    pub delete_account_url: String,
}

mod filters {
    /// Calendar date of an RFC 3339 timestamp; unparseable input is shown as is.
    pub(crate) fn date(ts: &str) -> ::askama::Result<String> {
        Ok(chrono::DateTime::parse_from_rfc3339(ts)
            .map_or_else(|_| ts.to_string(), |dt| dt.format("%B %-d, %Y").to_string()))
    }
}

/// Shared by the add and edit screens.
#[derive(Template)]
#[template(path = "feedback_form.html")]
pub struct FeedbackFormPage {
    pub ctx: PageContext,
    pub heading: String,
    pub action: String,
    pub submit_label: &'static str,
    pub cancel_url: String,
    pub form: FormView,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub ctx: PageContext,
    pub status: u16,
    pub reason: &'static str,
    pub message: String,
}

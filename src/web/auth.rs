use axum::{Form, extract::State, response::Response};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::pages::{LoginPage, PageContext, RegisterPage, render};
use super::{AppState, AuthSession, FlashCategory, WebError, redirect, validate_submission};
use crate::domain::paths;
use crate::forms::{LOGIN_FORM, REGISTER_FORM, ValidationResult};
use crate::services::{AuthError, Registration};

pub const USERNAME_TAKEN: &str = "Username taken. Please pick another username";
pub const EMAIL_TAKEN: &str = "Email already registered. Please use another email";
pub const INVALID_CREDENTIALS: &str = "Invalid username/password";

pub async fn register_form(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
) -> Result<Response, WebError> {
    render_register(&state, &session, &REGISTER_FORM.blank()).await
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Form(input): Form<HashMap<String, String>>,
) -> Result<Response, WebError> {
    let result = validate_submission(&state, &session, &REGISTER_FORM, &input).await?;
    if !result.is_ok() {
        return render_register(&state, &session, &result).await;
    }

    let registration = Registration {
        username: result.value("username").to_string(),
        password: result.value("password").to_string(),
        email: result.value("email").to_string(),
        first_name: result.value("first_name").to_string(),
        last_name: result.value("last_name").to_string(),
    };

    match state.auth_service().register(registration).await {
        Ok(user) => {
            session.login(&user.username).await?;
            session
                .flash(
                    FlashCategory::Success,
                    "Welcome! Successfully Created Your Account!",
                )
                .await?;
            Ok(redirect(&paths::user(&user.username)))
        }
        Err(AuthError::UsernameTaken) => {
            let result = result.with_error("username", USERNAME_TAKEN);
            render_register(&state, &session, &result).await
        }
        Err(AuthError::EmailTaken) => {
            let result = result.with_error("email", EMAIL_TAKEN);
            render_register(&state, &session, &result).await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login_form(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
) -> Result<Response, WebError> {
    render_login(&state, &session, &LOGIN_FORM.blank()).await
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Form(input): Form<HashMap<String, String>>,
) -> Result<Response, WebError> {
    let result = validate_submission(&state, &session, &LOGIN_FORM, &input).await?;
    if !result.is_ok() {
        return render_login(&state, &session, &result).await;
    }

    match state
        .auth_service()
        .authenticate(result.value("username"), result.value("password"))
        .await
    {
        Ok(user) => {
            session.login(&user.username).await?;
            session
                .flash(
                    FlashCategory::Primary,
                    format!("Welcome Back, {}!", user.username),
                )
                .await?;
            Ok(redirect(&paths::user(&user.username)))
        }
        Err(AuthError::InvalidCredentials) => {
            let result = result.with_error("username", INVALID_CREDENTIALS);
            render_login(&state, &session, &result).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Works whether or not anyone is logged in.
pub async fn logout(session: AuthSession) -> Result<Response, WebError> {
    if let Some(username) = session.current_username().await? {
        info!(user = %username, "User logged out");
    }
    session.logout().await?;
    session.flash(FlashCategory::Info, "Goodbye!").await?;
    Ok(redirect(paths::HOME))
}

async fn render_register(
    state: &AppState,
    session: &AuthSession,
    result: &ValidationResult,
) -> Result<Response, WebError> {
    let ctx = PageContext::load(state, session).await?;
    render(&RegisterPage {
        ctx,
        form: REGISTER_FORM.view(result),
    })
}

async fn render_login(
    state: &AppState,
    session: &AuthSession,
    result: &ValidationResult,
) -> Result<Response, WebError> {
    let ctx = PageContext::load(state, session).await?;
    render(&LoginPage {
        ctx,
        form: LOGIN_FORM.view(result),
    })
}

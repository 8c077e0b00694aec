use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::pages::{FeedbackCard, PageContext, ProfilePage, render};
use super::{AppState, AuthSession, FlashCategory, WebError, csrf_rejected, redirect};
use crate::domain::paths;
use crate::forms::{CSRF_MESSAGE, PROFILE_FORM};
use crate::services::AccountError;

pub async fn show_user(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(username): Path<String>,
) -> Result<Response, WebError> {
    let Some(actor) = session.current_user(state.store()).await? else {
        return session.require_login().await;
    };

    let profile = match state.account_service().profile(&actor, &username).await {
        Ok(profile) => profile,
        Err(AccountError::Forbidden) => return session.reject_forbidden().await,
        Err(e) => return Err(e.into()),
    };

    let user = profile.user;
    let form = PROFILE_FORM.view(&PROFILE_FORM.prefill([
        ("username", user.username.clone()),
        ("email", user.email),
        ("first_name", user.first_name),
        ("last_name", user.last_name),
    ]));

    let ctx = PageContext::load(&state, &session).await?;
    render(&ProfilePage {
        ctx,
        add_feedback_url: paths::add_feedback(&user.username),
        delete_account_url: paths::delete_user(&user.username),
        member_since: user.created_at,
        form,
        feedback: profile.feedback.into_iter().map(FeedbackCard::from).collect(),
        username: user.username,
    })
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(username): Path<String>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Response, WebError> {
    let Some(actor) = session.current_user(state.store()).await? else {
        return session.require_login().await;
    };

    let input = form.map(|Form(input)| input).unwrap_or_default();
    if csrf_rejected(&state, &session, &input).await? {
        session.flash(FlashCategory::Danger, CSRF_MESSAGE).await?;
        return Ok(redirect(paths::HOME));
    }

    match state.account_service().delete_account(&actor, &username).await {
        Ok(()) => {
            session.logout().await?;
            session
                .flash(
                    FlashCategory::Danger,
                    "The user and their feedback have been deleted!",
                )
                .await?;
            Ok(redirect(paths::LOGIN))
        }
        Err(AccountError::Forbidden) => session.reject_forbidden().await,
        Err(e) => Err(e.into()),
    }
}

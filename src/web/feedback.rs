use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::pages::{FeedbackFormPage, PageContext, render};
use super::{
    AppState, AuthSession, FlashCategory, WebError, csrf_rejected, redirect, validate_submission,
};
use crate::domain::{FeedbackId, paths};
use crate::forms::{CSRF_MESSAGE, FEEDBACK_FORM, ValidationResult};
use crate::services::{FeedbackDraft, FeedbackError};

/// Unparseable ids are reported like missing rows.
fn parse_id(segment: &str) -> Result<FeedbackId, WebError> {
    FeedbackId::parse(segment).ok_or_else(|| WebError::not_found("Feedback", segment))
}

fn draft_from(result: &ValidationResult) -> FeedbackDraft {
    FeedbackDraft {
        title: result.value("title").to_string(),
        content: result.value("content").to_string(),
    }
}

pub async fn add_feedback_form(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(username): Path<String>,
) -> Result<Response, WebError> {
    let Some(actor) = session.current_user(state.store()).await? else {
        return session.require_login().await;
    };
    if actor != username {
        return session.reject_forbidden().await;
    }

    render_add(&state, &session, &username, &FEEDBACK_FORM.blank()).await
}

pub async fn add_feedback(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(username): Path<String>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Response, WebError> {
    let Some(actor) = session.current_user(state.store()).await? else {
        return session.require_login().await;
    };
    if actor != username {
        return session.reject_forbidden().await;
    }

    let input = form.map(|Form(input)| input).unwrap_or_default();
    let result = validate_submission(&state, &session, &FEEDBACK_FORM, &input).await?;
    if !result.is_ok() {
        return render_add(&state, &session, &username, &result).await;
    }

    match state
        .feedback_service()
        .create(&actor, &username, draft_from(&result))
        .await
    {
        Ok(entry) => {
            session
                .flash(FlashCategory::Success, "New feedback has been added!")
                .await?;
            Ok(redirect(&paths::user(&entry.username)))
        }
        Err(FeedbackError::Forbidden) => session.reject_forbidden().await,
        Err(e) => Err(e.into()),
    }
}

pub async fn edit_feedback_form(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let Some(actor) = session.current_user(state.store()).await? else {
        return session.require_login().await;
    };
    let id = parse_id(&id)?;

    let entry = match state.feedback_service().get_owned(&actor, id).await {
        Ok(entry) => entry,
        Err(FeedbackError::Forbidden) => return session.reject_forbidden().await,
        Err(e) => return Err(e.into()),
    };

    let result = FEEDBACK_FORM.prefill([("title", entry.title), ("content", entry.content)]);
    render_edit(&state, &session, id, &entry.username, &result).await
}

pub async fn update_feedback(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<String>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Response, WebError> {
    let Some(actor) = session.current_user(state.store()).await? else {
        return session.require_login().await;
    };
    let id = parse_id(&id)?;

    let entry = match state.feedback_service().get_owned(&actor, id).await {
        Ok(entry) => entry,
        Err(FeedbackError::Forbidden) => return session.reject_forbidden().await,
        Err(e) => return Err(e.into()),
    };

    let input = form.map(|Form(input)| input).unwrap_or_default();
    let result = validate_submission(&state, &session, &FEEDBACK_FORM, &input).await?;
    if !result.is_ok() {
        return render_edit(&state, &session, id, &entry.username, &result).await;
    }

    match state
        .feedback_service()
        .update(&actor, id, draft_from(&result))
        .await
    {
        Ok(updated) => {
            session
                .flash(FlashCategory::Success, "Feedback updated!")
                .await?;
            Ok(redirect(&paths::user(&updated.username)))
        }
        Err(FeedbackError::Forbidden) => session.reject_forbidden().await,
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_feedback(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<String>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Response, WebError> {
    let Some(actor) = session.current_user(state.store()).await? else {
        return session.require_login().await;
    };
    let id = parse_id(&id)?;

    match state.feedback_service().get_owned(&actor, id).await {
        Ok(_) => {}
        Err(FeedbackError::Forbidden) => return session.reject_forbidden().await,
        Err(e) => return Err(e.into()),
    }

    let input = form.map(|Form(input)| input).unwrap_or_default();
    if csrf_rejected(&state, &session, &input).await? {
        session.flash(FlashCategory::Danger, CSRF_MESSAGE).await?;
        return Ok(redirect(paths::HOME));
    }

    match state.feedback_service().delete(&actor, id).await {
        Ok(removed) => {
            session
                .flash(FlashCategory::Success, "Feedback deleted!")
                .await?;
            Ok(redirect(&paths::user(&removed.username)))
        }
        Err(FeedbackError::Forbidden) => session.reject_forbidden().await,
        Err(e) => Err(e.into()),
    }
}

async fn render_add(
    state: &AppState,
    session: &AuthSession,
    username: &str,
    result: &ValidationResult,
) -> Result<Response, WebError> {
    let ctx = PageContext::load(state, session).await?;
    render(&FeedbackFormPage {
        ctx,
        heading: "Add Feedback".to_string(),
        action: paths::add_feedback(username),
        submit_label: "Add",
        cancel_url: paths::user(username),
        form: FEEDBACK_FORM.view(result),
    })
}

async fn render_edit(
    state: &AppState,
    session: &AuthSession,
    id: FeedbackId,
    owner: &str,
    result: &ValidationResult,
) -> Result<Response, WebError> {
    let ctx = PageContext::load(state, session).await?;
    render(&FeedbackFormPage {
        ctx,
        heading: "Edit Feedback".to_string(),
        action: paths::update_feedback(id),
        submit_label: "Update",
        cancel_url: paths::user(owner),
        form: FEEDBACK_FORM.view(result),
    })
}

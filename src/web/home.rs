use axum::{extract::State, response::Response};
use std::sync::Arc;

use super::pages::{IndexPage, PageContext, render};
use super::{AppState, AuthSession, WebError};

pub async fn index(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
) -> Result<Response, WebError> {
    let ctx = PageContext::load(&state, &session).await?;
    render(&IndexPage { ctx })
}

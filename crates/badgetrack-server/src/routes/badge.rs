use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use chrono::Utc;
use serde::Deserialize;

use badgetrack_core::keys::Scope;
use badgetrack_render::badge;

use crate::{error::AppError, state::AppState};

use super::{badge_colors, svg_response};

#[derive(Debug, Deserialize)]
pub struct BadgeParams {
    pub repo: Option<String>,
    pub label: Option<String>,
    pub color: Option<String>,
    pub label_color: Option<String>,
}

/// `GET /badge/{metric}/{user}` — read-only badge, no visit recorded.
///
/// `metric` is one of the scalar scopes; `?repo=` switches to the repo
/// counter family.
#[tracing::instrument(skip(state, params))]
pub async fn badge(
    State(state): State<Arc<AppState>>,
    Path((metric, user)): Path<(String, String)>,
    Query(params): Query<BadgeParams>,
) -> Result<Response, AppError> {
    let scope = Scope::parse(&metric)
        .ok_or_else(|| AppError::BadRequest(format!("unknown badge metric: {metric}")))?;

    let now = Utc::now();
    let count = match params.repo.as_deref().filter(|r| !r.is_empty()) {
        Some(repo) => state.stats.repo_scalar(&user, repo, scope, now).await?,
        None => state.stats.user_scalar(&user, scope, now).await?,
    };

    let label = params.label.as_deref().unwrap_or("visitors");
    let colors = badge_colors(params.color, params.label_color);
    Ok(svg_response(badge::render(label, &count.to_string(), &colors)))
}

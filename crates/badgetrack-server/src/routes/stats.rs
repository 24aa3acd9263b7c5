use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use badgetrack_core::{
    error::QueryError,
    keys::Scope,
    stats::{ListDimension, RECENT_QUERY_MAX},
};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub repo: Option<String>,
    /// Scalar scope for the `repo` dimension, default `total`.
    pub scope: Option<String>,
    /// Row limit for the `recent` dimension; clamped to 100.
    pub limit: Option<usize>,
}

/// `GET /stats/{dimension}/{user}` — JSON stats.
///
/// Dimensions: the five user-scope scalars (`total`, `daily`, `weekly`,
/// `monthly`, `yearly`), `repo` (scalar, requires `?repo=`), the ranked
/// listings (`repos`, `referrers`, `countries`, `browsers`, `ips`, `uas`),
/// and `recent`.
#[tracing::instrument(skip(state, params))]
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Path((dimension, user)): Path<(String, String)>,
    Query(params): Query<StatsParams>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();

    if let Some(scope) = Scope::parse(&dimension) {
        // `?repo=` switches any scalar dimension to the repo counter family.
        if let Some(repo) = params.repo.as_deref().filter(|r| !r.is_empty()) {
            let count = state.stats.repo_scalar(&user, repo, scope, now).await?;
            return Ok(Json(json!({
                "user": user,
                "repo": repo,
                "scope": scope.as_str(),
                "count": count
            })));
        }
        let count = state.stats.user_scalar(&user, scope, now).await?;
        return Ok(Json(json!({
            "user": user,
            "scope": scope.as_str(),
            "count": count
        })));
    }

    if dimension == "repo" {
        let repo = params
            .repo
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or(QueryError::RepoRequired)?;
        let scope = match params.scope.as_deref() {
            None | Some("") => Scope::Total,
            Some(raw) => Scope::parse(raw).ok_or_else(|| {
                AppError::BadRequest(format!("unknown scope: {raw}"))
            })?,
        };
        let count = state.stats.repo_scalar(&user, repo, scope, now).await?;
        return Ok(Json(json!({
            "user": user,
            "repo": repo,
            "scope": scope.as_str(),
            "count": count
        })));
    }

    if dimension == "recent" {
        let limit = params
            .limit
            .unwrap_or(state.config.recent_default_limit)
            .min(RECENT_QUERY_MAX);
        let visits = state.stats.recent(&user, limit).await?;
        return Ok(Json(json!({
            "user": user,
            "visits": visits
        })));
    }

    let dim = ListDimension::parse(&dimension)
        .ok_or_else(|| QueryError::UnknownDimension(dimension.clone()))?;
    let rows = state.stats.listing(&user, dim).await?;
    Ok(Json(json!({
        "user": user,
        "dimension": dimension,
        "rows": rows
    })))
}

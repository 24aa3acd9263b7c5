use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;

use badgetrack_core::stats::ListDimension;
use badgetrack_render::graph::{self, GraphColors};

use crate::{error::AppError, state::AppState};

use super::svg_response;

#[derive(Debug, Deserialize)]
pub struct GraphParams {
    pub title: Option<String>,
    pub color: Option<String>,
    pub background: Option<String>,
}

/// `GET /graph/{dimension}/{user}` — ranked bar chart for a listing
/// dimension.
#[tracing::instrument(skip(state, params))]
pub async fn graph(
    State(state): State<Arc<AppState>>,
    Path((dimension, user)): Path<(String, String)>,
    Query(params): Query<GraphParams>,
) -> Result<Response, AppError> {
    let dim = ListDimension::parse(&dimension)
        .ok_or_else(|| AppError::BadRequest(format!("unknown graph dimension: {dimension}")))?;

    let rows = state.stats.listing(&user, dim).await?;

    let mut colors = GraphColors::default();
    if let Some(color) = params.color.filter(|c| !c.is_empty()) {
        colors.bar = color;
    }
    if let Some(background) = params.background.filter(|c| !c.is_empty()) {
        colors.background = background;
    }
    let title = params.title.as_deref().unwrap_or_else(|| dim.title());

    Ok(svg_response(graph::render(title, &rows, &colors)))
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;

use badgetrack_core::event::VisitEvent;
use badgetrack_render::badge;

use crate::state::AppState;

use super::{badge_colors, client_ip, header_string, svg_response};

#[derive(Debug, Deserialize)]
pub struct VisitQuery {
    pub repo: Option<String>,
    pub label: Option<String>,
    pub color: Option<String>,
    pub label_color: Option<String>,
}

/// `GET /visit/{user}` — the public tracking endpoint.
///
/// Records one visit (best-effort fan-out) and answers with the count badge.
/// A store failure mid-fan-out is logged and the badge is still served with
/// a `?` value: embedding pages must never see a broken image because one
/// counter write failed.
#[tracing::instrument(skip(state, headers, query))]
pub async fn visit(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Query(query): Query<VisitQuery>,
    headers: HeaderMap,
) -> Response {
    let raw_headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        });

    let country = {
        let c = header_string(&headers, "cf-ipcountry");
        if c.is_empty() {
            "XX".to_string()
        } else {
            c
        }
    };

    let event = VisitEvent {
        user,
        repo: query.repo.clone().filter(|r| !r.is_empty()),
        ip: client_ip(&headers),
        country,
        referer: header_string(&headers, "referer"),
        user_agent: header_string(&headers, "user-agent"),
        headers: VisitEvent::filter_headers(raw_headers),
    };

    let value = match state.recorder.record(&event).await {
        Ok(total) => total.to_string(),
        Err(e) => {
            tracing::error!(user = %event.user, error = %e, "visit fan-out failed, serving placeholder badge");
            "?".to_string()
        }
    };

    let label = query.label.as_deref().unwrap_or("visitors");
    let colors = badge_colors(query.color, query.label_color);
    svg_response(badge::render(label, &value, &colors))
}

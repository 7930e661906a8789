use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::load_catalog;
use crate::data_models::SearchCriteria;
use crate::query_engine::search_items;
use crate::report::summarize_items;

use super::models::{ErrorResponse, HealthResponse, SearchHit};
use super::{AppState, HTTP_MAX_ITEMS};

/// Errors surfaced to HTTP callers. Internal detail is logged, never returned.
#[derive(Debug)]
pub enum ApiError {
    MissingQuery,
    Internal(anyhow::Error),
}

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(e: E) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingQuery => (StatusCode::BAD_REQUEST, "Query parameter is required"),
            ApiError::Internal(e) => {
                tracing::error!("error during search: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred during the search.",
                )
            }
        };
        let body = ErrorResponse {
            error: message.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let start = Instant::now();

    // A repeated `query` uses its first value.
    let query = match params.into_iter().find(|(key, _)| key == "query") {
        Some((_, q)) if !q.is_empty() => q,
        _ => return Err(ApiError::MissingQuery),
    };

    let catalog = load_catalog(&state.catalog_source)?;
    let outcome = search_items(&catalog, &query, None);
    if let Some(note) = &outcome.note {
        tracing::warn!("{}", note);
    }

    if outcome.matches.is_empty() {
        tracing::info!("no matches for {:?}", query);
        return Ok(Json(Vec::new()));
    }

    let criteria = SearchCriteria {
        query,
        field: outcome.effective_field.clone(),
    };
    let report =
        summarize_items(&outcome.matches, HTTP_MAX_ITEMS, &criteria, &state.summarizer).await;

    let results: Vec<SearchHit> = report
        .structured
        .map(|result| {
            result
                .items
                .into_iter()
                .map(|item| SearchHit {
                    title: item.title,
                    summary: item.summary,
                    link: item.source,
                })
                .collect()
        })
        .unwrap_or_default();

    tracing::info!(
        "search {:?}: {} matches, {} summarized in {}ms",
        criteria.query,
        outcome.matches.len(),
        results.len(),
        start.elapsed().as_millis()
    );

    Ok(Json(results))
}

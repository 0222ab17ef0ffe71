//! Catalog searches on behalf of a session's dropdowns.
//!
//! Results are cached into the session so a later `product_selected` or
//! `party_selected` event can resolve them. Catalog failures never fail the
//! request: the caller gets an empty list and a notice.

use crate::models::{PartyKind, PartyRecord, ProductRecord, RowId};
use crate::services::SearchKind;
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;

use super::sessions::session_not_found;

#[derive(Debug, Deserialize)]
pub struct ProductSearchParams {
    #[serde(default)]
    pub q: String,
    pub row: Option<RowId>,
}

#[derive(Debug, Deserialize)]
pub struct PartySearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default, rename = "type")]
    pub kind: PartyKind,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse<T> {
    pub results: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    /// A newer search already answered, or the row is gone.
    pub stale: bool,
}

impl<T> SearchResponse<T> {
    fn rendered(results: Option<Vec<T>>) -> Self {
        match results {
            Some(results) => Self {
                results,
                notice: None,
                stale: false,
            },
            None => Self {
                results: Vec::new(),
                notice: None,
                stale: true,
            },
        }
    }

    fn unavailable(notice: String) -> Self {
        Self {
            results: Vec::new(),
            notice: Some(notice),
            stale: false,
        }
    }
}

pub async fn search_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ProductSearchParams>,
) -> Result<Json<SearchResponse<ProductRecord>>, AppError> {
    let ticket = state
        .sessions
        .with_session(id, |session| {
            session.begin_search(SearchKind::Products, params.row)
        })
        .ok_or_else(|| session_not_found(id))??;

    let records = match state.catalog.search_products(&params.q).await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(session_id = %id, query = %params.q, error = %e, "Product search failed");
            return Ok(Json(SearchResponse::unavailable(format!(
                "Product search unavailable: {}",
                e
            ))));
        }
    };

    let results = state
        .sessions
        .with_session(id, |session| session.complete_product_search(ticket, records))
        .ok_or_else(|| session_not_found(id))?;

    Ok(Json(SearchResponse::rendered(results)))
}

pub async fn search_parties(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PartySearchParams>,
) -> Result<Json<SearchResponse<PartyRecord>>, AppError> {
    let ticket = state
        .sessions
        .with_session(id, |session| session.begin_search(SearchKind::Parties, None))
        .ok_or_else(|| session_not_found(id))??;

    let records = match state.catalog.search_parties(&params.q, params.kind).await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(session_id = %id, query = %params.q, error = %e, "Party search failed");
            return Ok(Json(SearchResponse::unavailable(format!(
                "Party search unavailable: {}",
                e
            ))));
        }
    };

    let results = state
        .sessions
        .with_session(id, |session| session.complete_party_search(ticket, records))
        .ok_or_else(|| session_not_found(id))?;

    Ok(Json(SearchResponse::rendered(results)))
}

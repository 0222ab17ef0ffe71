//! Stateless totals calculation.

use crate::models::{FormattedTotals, InvoiceTotals, LineItem, TaxMode};
use crate::services::{calculator, metrics};
use crate::utils::number;
use axum::Json;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct TotalsRequest {
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub mode: TaxMode,
}

#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    pub totals: InvoiceTotals,
    pub display: FormattedTotals,
    pub amount_in_words: String,
}

/// Compute invoice totals for a list of line items.
pub async fn compute_totals(
    Json(payload): Json<TotalsRequest>,
) -> Result<Json<TotalsResponse>, AppError> {
    let result = calculator::compute(&payload.items, payload.mode);
    metrics::record_totals("api", result.is_ok());

    let totals = result.map_err(|e| {
        tracing::info!(error = %e, items = payload.items.len(), "Rejected totals request");
        e
    })?;

    tracing::debug!(
        items = payload.items.len(),
        grand_total = %totals.grand_total,
        inter_state = payload.mode.inter_state,
        "Computed invoice totals"
    );

    Ok(Json(TotalsResponse {
        display: totals.formatted(),
        amount_in_words: number::amount_in_words(totals.grand_total),
        totals,
    }))
}

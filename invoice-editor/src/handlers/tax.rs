//! Tax helpers: reverse GST calculation and GSTIN checks.

use crate::models::TaxInclusiveSplit;
use crate::services::calculator;
use crate::utils::gstin;
use axum::{extract::Path, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct TaxInclusiveRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub gst_percent: Decimal,
}

/// Split a GST-inclusive amount into taxable value and tax.
pub async fn split_inclusive(
    Json(payload): Json<TaxInclusiveRequest>,
) -> Result<Json<TaxInclusiveSplit>, AppError> {
    let split = calculator::split_tax_inclusive(payload.amount, payload.gst_percent)?;
    Ok(Json(split))
}

#[derive(Debug, Serialize)]
pub struct GstinResponse {
    pub gstin: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    pub message: String,
}

/// Format check for a GSTIN. Always 200; validity is in the body.
pub async fn check_gstin(Path(raw): Path<String>) -> Json<GstinResponse> {
    let normalized = raw.trim().to_ascii_uppercase();

    let response = match gstin::validate(&normalized) {
        Ok(()) => GstinResponse {
            state_code: gstin::state_code(&normalized).map(str::to_string),
            gstin: normalized,
            valid: true,
            message: "Valid GSTIN".to_string(),
        },
        Err(e) => GstinResponse {
            gstin: normalized,
            valid: false,
            state_code: None,
            message: e.to_string(),
        },
    };

    Json(response)
}

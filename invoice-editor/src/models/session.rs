//! Session-facing views and policies.

use super::{FormattedTotals, InvoiceTotals, LineItem, PartyRecord, RowId, TaxMode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// What to do with an out-of-range field edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditPolicy {
    /// Refuse the edit; the row keeps its previous value.
    #[default]
    Reject,
    /// Store the nearest in-range value.
    Clamp,
}

impl EditPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditPolicy::Reject => "reject",
            EditPolicy::Clamp => "clamp",
        }
    }
}

impl FromStr for EditPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(EditPolicy::Reject),
            "clamp" => Ok(EditPolicy::Clamp),
            other => Err(format!("unknown edit policy '{}'", other)),
        }
    }
}

/// One row as shown in the line-item table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowView {
    pub row: RowId,
    pub product_id: Option<i64>,
    pub description: Option<String>,
    pub hsn_code: Option<String>,
    #[serde(flatten)]
    pub item: LineItem,
    /// Taxable amount with two fraction digits.
    pub amount: String,
    pub cgst: String,
    pub sgst: String,
    pub igst: String,
    /// Row GST under the session's tax mode.
    pub tax: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub edit_policy: EditPolicy,
    pub mode: TaxMode,
    pub party: Option<PartyRecord>,
    pub rows: Vec<RowView>,
    pub totals: InvoiceTotals,
    pub display: FormattedTotals,
    pub amount_in_words: String,
}

//! Typed user actions applied to an invoice session.

use super::{LineItemField, TaxMode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an invoice row within one session. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u32);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvoiceEvent {
    ItemAdded,
    ItemRemoved {
        row: RowId,
    },
    FieldChanged {
        row: RowId,
        field: LineItemField,
        value: Decimal,
    },
    ProductSelected {
        row: RowId,
        product_id: i64,
    },
    TaxModeChanged {
        #[serde(default)]
        gst_applicable: Option<bool>,
        #[serde(default)]
        inter_state: Option<bool>,
    },
    PartySelected {
        party_id: i64,
    },
}

impl InvoiceEvent {
    /// Metric / log label.
    pub fn kind(&self) -> &'static str {
        match self {
            InvoiceEvent::ItemAdded => "item_added",
            InvoiceEvent::ItemRemoved { .. } => "item_removed",
            InvoiceEvent::FieldChanged { .. } => "field_changed",
            InvoiceEvent::ProductSelected { .. } => "product_selected",
            InvoiceEvent::TaxModeChanged { .. } => "tax_mode_changed",
            InvoiceEvent::PartySelected { .. } => "party_selected",
        }
    }
}

/// What an applied event changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventOutcome {
    RowAdded {
        row: RowId,
    },
    RowRemoved {
        row: RowId,
    },
    /// `value` is what was stored, which differs from the input when clamped.
    FieldUpdated {
        row: RowId,
        field: LineItemField,
        value: Decimal,
    },
    ProductApplied {
        row: RowId,
        product_id: i64,
    },
    TaxModeUpdated {
        mode: TaxMode,
    },
    PartyApplied {
        party_id: i64,
        inter_state: bool,
    },
}

//! Computed invoice amounts.

use crate::utils::number::{format_inr, to_fixed_2};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice totals as computed, before presentation rounding.
///
/// `grand_total` is always integral and `round_off = grand_total - total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub total: Decimal,
    pub round_off: Decimal,
    pub grand_total: Decimal,
}

impl InvoiceTotals {
    pub fn tax_total(&self) -> Decimal {
        self.cgst + self.sgst + self.igst
    }

    /// Display values with exactly two fraction digits.
    pub fn formatted(&self) -> FormattedTotals {
        FormattedTotals {
            subtotal: to_fixed_2(self.subtotal),
            cgst: to_fixed_2(self.cgst),
            sgst: to_fixed_2(self.sgst),
            igst: to_fixed_2(self.igst),
            round_off: to_fixed_2(self.round_off),
            grand_total: to_fixed_2(self.grand_total),
            grand_total_inr: format_inr(self.grand_total),
        }
    }
}

/// The six totals cells shown under the line-item table, plus the grand
/// total as printed on the invoice (`₹1,18,000.00`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedTotals {
    pub subtotal: String,
    pub cgst: String,
    pub sgst: String,
    pub igst: String,
    pub round_off: String,
    pub grand_total: String,
    pub grand_total_inr: String,
}

/// Tax breakdown of a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineTax {
    pub taxable_amount: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
}

impl LineTax {
    pub fn tax(&self) -> Decimal {
        self.cgst + self.sgst + self.igst
    }
}

/// Result of backing GST out of a tax-inclusive amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxInclusiveSplit {
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

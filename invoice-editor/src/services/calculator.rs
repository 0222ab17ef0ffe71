//! Invoice totals: subtotal, GST routing (CGST/SGST or IGST) and round-off.
//!
//! Everything here is pure. Amounts stay unrounded; only the grand total is
//! rounded (to the nearest rupee, half away from zero) and the difference is
//! carried as round-off.

use crate::models::{
    InvoiceTotals, LineItem, LineItemField, LineTax, TaxInclusiveSplit, TaxMode, ValidationError,
    MAX_FIELD_VALUE,
};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TotalsError {
    #[error("line item {index}: {source}")]
    InvalidLineItem {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("invoice amounts exceed the supported range")]
    Overflow,
}

/// Compute invoice totals for `items` under `mode`.
pub fn compute(items: &[LineItem], mode: TaxMode) -> Result<InvoiceTotals, TotalsError> {
    let mut subtotal = Decimal::ZERO;
    let mut cgst = Decimal::ZERO;
    let mut sgst = Decimal::ZERO;
    let mut igst = Decimal::ZERO;

    for (index, item) in items.iter().enumerate() {
        item.validate()
            .map_err(|source| TotalsError::InvalidLineItem { index, source })?;

        let line = line_tax(item, mode)?;
        subtotal = checked_sum(subtotal, line.taxable_amount)?;
        cgst = checked_sum(cgst, line.cgst)?;
        sgst = checked_sum(sgst, line.sgst)?;
        igst = checked_sum(igst, line.igst)?;
    }

    let total = checked_sum(checked_sum(checked_sum(subtotal, cgst)?, sgst)?, igst)?;
    let grand_total = round_to_rupee(total);

    Ok(InvoiceTotals {
        subtotal,
        cgst,
        sgst,
        igst,
        total,
        round_off: grand_total - total,
        grand_total,
    })
}

/// Taxable amount and GST of a single row. Rows with no GST rate, or any
/// row when GST is off, carry no tax.
///
/// Does not validate `item`; an unvalidated item whose amounts leave
/// `Decimal` range is `TotalsError::Overflow`.
pub fn line_tax(item: &LineItem, mode: TaxMode) -> Result<LineTax, TotalsError> {
    let taxable_amount = item.taxable_amount().ok_or(TotalsError::Overflow)?;
    let mut line = LineTax {
        taxable_amount,
        ..LineTax::default()
    };

    if !mode.gst_applicable || item.gst_percent <= Decimal::ZERO {
        return Ok(line);
    }

    let tax = taxable_amount
        .checked_mul(item.gst_percent)
        .ok_or(TotalsError::Overflow)?
        / Decimal::ONE_HUNDRED;
    if mode.charges_igst() {
        line.igst = tax;
    } else {
        let half = tax / Decimal::TWO;
        line.cgst = half;
        line.sgst = half;
    }
    Ok(line)
}

/// Back GST out of a tax-inclusive amount. The taxable part is rounded to
/// paise (half up); the tax is whatever remains.
pub fn split_tax_inclusive(
    amount_with_tax: Decimal,
    gst_percent: Decimal,
) -> Result<TaxInclusiveSplit, ValidationError> {
    if amount_with_tax < Decimal::ZERO {
        return Err(ValidationError::Negative {
            field: "amount",
            value: amount_with_tax,
        });
    }

    if amount_with_tax > MAX_FIELD_VALUE {
        return Err(ValidationError::TooLarge {
            field: "amount",
            value: amount_with_tax,
            max: MAX_FIELD_VALUE,
        });
    }

    if gst_percent <= Decimal::ZERO {
        return Ok(TaxInclusiveSplit {
            taxable_amount: amount_with_tax,
            tax_amount: Decimal::ZERO,
            total_amount: amount_with_tax,
        });
    }

    LineItem::validate_field(LineItemField::GstPercent, gst_percent)?;

    let taxable_amount = (amount_with_tax * Decimal::ONE_HUNDRED
        / (Decimal::ONE_HUNDRED + gst_percent))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Ok(TaxInclusiveSplit {
        taxable_amount,
        tax_amount: amount_with_tax - taxable_amount,
        total_amount: amount_with_tax,
    })
}

/// Nearest whole rupee, ties away from zero.
pub fn round_to_rupee(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

fn checked_sum(a: Decimal, b: Decimal) -> Result<Decimal, TotalsError> {
    a.checked_add(b).ok_or(TotalsError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(quantity: &str, rate: &str, discount: &str, gst: &str) -> LineItem {
        LineItem::new(d(quantity), d(rate), d(discount), d(gst))
    }

    fn mixed_items() -> Vec<LineItem> {
        vec![
            item("2", "100", "0", "18"),
            item("1", "99.5", "10", "12"),
            item("3.5", "12.25", "5", "5"),
            item("10", "7", "0", "0"),
            item("0.333", "30", "2.5", "28"),
        ]
    }

    #[test]
    fn intra_state_splits_gst_evenly() {
        let totals = compute(&[item("2", "100", "0", "18")], TaxMode::intra_state()).unwrap();

        assert_eq!(totals.subtotal, d("200"));
        assert_eq!(totals.cgst, d("18"));
        assert_eq!(totals.sgst, d("18"));
        assert_eq!(totals.igst, Decimal::ZERO);
        assert_eq!(totals.total, d("236"));
        assert_eq!(totals.grand_total, d("236"));
        assert_eq!(totals.round_off, Decimal::ZERO);

        let display = totals.formatted();
        assert_eq!(display.subtotal, "200.00");
        assert_eq!(display.cgst, "18.00");
        assert_eq!(display.sgst, "18.00");
        assert_eq!(display.igst, "0.00");
        assert_eq!(display.round_off, "0.00");
        assert_eq!(display.grand_total, "236.00");
    }

    #[test]
    fn inter_state_charges_igst_only() {
        let totals = compute(&[item("2", "100", "0", "18")], TaxMode::inter_state()).unwrap();

        assert_eq!(totals.igst, d("36"));
        assert_eq!(totals.cgst, Decimal::ZERO);
        assert_eq!(totals.sgst, Decimal::ZERO);
        assert_eq!(totals.grand_total, d("236"));
        assert_eq!(totals.formatted().igst, "36.00");
    }

    #[test]
    fn gst_off_charges_no_tax() {
        let totals = compute(&[item("2", "100", "0", "18")], TaxMode::without_gst()).unwrap();

        assert_eq!(totals.tax_total(), Decimal::ZERO);
        assert_eq!(totals.grand_total, d("200"));

        let display = totals.formatted();
        assert_eq!(display.cgst, "0.00");
        assert_eq!(display.sgst, "0.00");
        assert_eq!(display.igst, "0.00");
    }

    #[test]
    fn discounted_item_rounds_down_with_negative_round_off() {
        let items = [item("1", "99.5", "10", "12")];
        let totals = compute(&items, TaxMode::intra_state()).unwrap();

        assert_eq!(totals.subtotal, d("89.55"));
        assert_eq!(totals.tax_total(), d("10.746"));
        assert_eq!(totals.cgst, d("5.373"));
        assert_eq!(totals.sgst, d("5.373"));
        assert_eq!(totals.total, d("100.296"));
        assert_eq!(totals.grand_total, d("100"));
        assert_eq!(totals.round_off, d("-0.296"));
        assert_eq!(totals.formatted().round_off, "-0.30");
    }

    #[test]
    fn empty_invoice_is_all_zero() {
        let totals = compute(&[], TaxMode::default()).unwrap();

        assert_eq!(totals, InvoiceTotals::default());
        let display = totals.formatted();
        assert_eq!(display.subtotal, "0.00");
        assert_eq!(display.grand_total, "0.00");
        assert_eq!(display.round_off, "0.00");
    }

    #[test]
    fn zero_rates_never_produce_tax() {
        let items = [item("4", "25", "0", "0"), item("1", "10", "50", "0")];
        for mode in [
            TaxMode::intra_state(),
            TaxMode::inter_state(),
            TaxMode::without_gst(),
        ] {
            assert_eq!(compute(&items, mode).unwrap().tax_total(), Decimal::ZERO);
        }
    }

    #[test]
    fn inter_state_flag_is_ignored_without_gst() {
        let items = mixed_items();
        let off = TaxMode::without_gst();
        let off_inter = TaxMode {
            gst_applicable: false,
            inter_state: true,
        };
        assert_eq!(compute(&items, off).unwrap(), compute(&items, off_inter).unwrap());
    }

    #[test]
    fn subtotal_is_sum_of_taxable_amounts() {
        let items = mixed_items();
        let expected: Decimal = items.iter().map(|i| i.taxable_amount().unwrap()).sum();

        for mode in [TaxMode::intra_state(), TaxMode::inter_state()] {
            assert_eq!(compute(&items, mode).unwrap().subtotal, expected);
        }
    }

    #[test]
    fn tax_routing_is_mutually_exclusive() {
        let items = mixed_items();
        let expected_tax: Decimal = items
            .iter()
            .map(|i| i.taxable_amount().unwrap() * i.gst_percent / Decimal::ONE_HUNDRED)
            .sum();

        let inter = compute(&items, TaxMode::inter_state()).unwrap();
        assert_eq!(inter.cgst + inter.sgst, Decimal::ZERO);
        assert_eq!(inter.igst, expected_tax);

        let intra = compute(&items, TaxMode::intra_state()).unwrap();
        assert_eq!(intra.igst, Decimal::ZERO);
        assert_eq!(intra.cgst, intra.sgst);
        assert_eq!(intra.cgst + intra.sgst, expected_tax);
    }

    #[test]
    fn grand_total_is_integral_and_reconciles() {
        let items = mixed_items();
        for mode in [
            TaxMode::intra_state(),
            TaxMode::inter_state(),
            TaxMode::without_gst(),
        ] {
            let totals = compute(&items, mode).unwrap();
            assert_eq!(totals.grand_total, totals.grand_total.trunc());
            assert_eq!(
                totals.round_off,
                totals.grand_total - (totals.subtotal + totals.cgst + totals.sgst + totals.igst)
            );
            assert!(totals.round_off.abs() <= d("0.5"));
        }
    }

    #[test]
    fn compute_is_idempotent_and_order_independent() {
        let items = mixed_items();
        let first = compute(&items, TaxMode::intra_state()).unwrap();
        assert_eq!(first, compute(&items, TaxMode::intra_state()).unwrap());

        let mut reversed = items.clone();
        reversed.reverse();
        assert_eq!(first, compute(&reversed, TaxMode::intra_state()).unwrap());
    }

    #[test]
    fn half_rupee_rounds_up() {
        let totals = compute(&[item("1", "10.5", "0", "0")], TaxMode::default()).unwrap();
        assert_eq!(totals.grand_total, d("11"));
        assert_eq!(totals.round_off, d("0.5"));
        assert_eq!(round_to_rupee(d("-10.5")), d("-11"));
    }

    #[test]
    fn reports_index_of_invalid_item() {
        let items = [item("1", "10", "0", "5"), item("1", "10", "120", "5")];
        let err = compute(&items, TaxMode::default()).unwrap_err();

        assert_eq!(
            err,
            TotalsError::InvalidLineItem {
                index: 1,
                source: ValidationError::DiscountOutOfRange { value: d("120") },
            }
        );
    }

    #[test]
    fn largest_accepted_item_does_not_overflow() {
        let max = LineItem::new(MAX_FIELD_VALUE, MAX_FIELD_VALUE, Decimal::ZERO, d("28"));
        let totals = compute(&[max, max], TaxMode::inter_state()).unwrap();
        assert_eq!(totals.subtotal, d("2000000000000000000000000"));
    }

    #[test]
    fn largest_accepted_item_keeps_exact_igst() {
        let max = LineItem::new(MAX_FIELD_VALUE, MAX_FIELD_VALUE, Decimal::ZERO, d("100"));
        let totals = compute(&[max], TaxMode::inter_state()).unwrap();
        assert_eq!(totals.igst, d("1000000000000000000000000"));
        assert_eq!(totals.grand_total, d("2000000000000000000000000"));
    }

    #[test]
    fn extreme_gst_rate_is_rejected_not_capped() {
        let extreme = LineItem::new(MAX_FIELD_VALUE, MAX_FIELD_VALUE, Decimal::ZERO, MAX_FIELD_VALUE);
        let err = compute(&[extreme], TaxMode::inter_state()).unwrap_err();
        assert_eq!(
            err,
            TotalsError::InvalidLineItem {
                index: 0,
                source: ValidationError::GstOutOfRange {
                    value: MAX_FIELD_VALUE
                },
            }
        );

        // Unvalidated, the same row overflows instead of saturating.
        assert_eq!(
            line_tax(&extreme, TaxMode::inter_state()),
            Err(TotalsError::Overflow)
        );
    }

    #[test]
    fn too_many_maximal_items_overflow() {
        let max = LineItem::new(MAX_FIELD_VALUE, MAX_FIELD_VALUE, Decimal::ZERO, d("100"));
        let items = vec![max; 80_000];
        assert_eq!(
            compute(&items, TaxMode::inter_state()),
            Err(TotalsError::Overflow)
        );
    }

    #[test]
    fn splits_tax_inclusive_amount() {
        let split = split_tax_inclusive(d("118"), d("18")).unwrap();
        assert_eq!(split.taxable_amount, d("100"));
        assert_eq!(split.tax_amount, d("18"));

        let split = split_tax_inclusive(d("100"), d("12")).unwrap();
        assert_eq!(split.taxable_amount, d("89.29"));
        assert_eq!(split.tax_amount, d("10.71"));
        assert_eq!(split.total_amount, d("100"));
    }

    #[test]
    fn tax_inclusive_without_rate_is_all_taxable() {
        let split = split_tax_inclusive(d("50"), Decimal::ZERO).unwrap();
        assert_eq!(split.taxable_amount, d("50"));
        assert_eq!(split.tax_amount, Decimal::ZERO);
        assert!(split_tax_inclusive(d("-1"), d("5")).is_err());
    }

    #[test]
    fn tax_inclusive_amount_beyond_max_is_rejected() {
        let amount = MAX_FIELD_VALUE + Decimal::ONE;
        assert_eq!(
            split_tax_inclusive(amount, d("18")),
            Err(ValidationError::TooLarge {
                field: "amount",
                value: amount,
                max: MAX_FIELD_VALUE,
            })
        );
        assert!(split_tax_inclusive(MAX_FIELD_VALUE, d("18")).is_ok());
    }
}

//! Line item model for invoice-editor.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Upper bound accepted for quantity and rate (10^12).
///
/// With percentages capped at 100, one row's taxable amount plus tax stays
/// below 2 * 10^24, well inside `Decimal` range (about 7.9 * 10^28).
pub const MAX_FIELD_VALUE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Upper bound for `discount_percent` and `gst_percent`.
pub const MAX_PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// Editable numeric field of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemField {
    Quantity,
    Rate,
    DiscountPercent,
    GstPercent,
}

impl LineItemField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineItemField::Quantity => "quantity",
            LineItemField::Rate => "rate",
            LineItemField::DiscountPercent => "discount_percent",
            LineItemField::GstPercent => "gst_percent",
        }
    }
}

impl fmt::Display for LineItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric field outside its accepted range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("discount_percent must be between 0 and 100, got {value}")]
    DiscountOutOfRange { value: Decimal },

    #[error("gst_percent must be between 0 and 100, got {value}")]
    GstOutOfRange { value: Decimal },

    #[error("{field} must not exceed {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },
}

/// One invoice row's numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub rate: Decimal,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub gst_percent: Decimal,
}

impl LineItem {
    pub fn new(
        quantity: Decimal,
        rate: Decimal,
        discount_percent: Decimal,
        gst_percent: Decimal,
    ) -> Self {
        Self {
            quantity,
            rate,
            discount_percent,
            gst_percent,
        }
    }

    pub fn get(&self, field: LineItemField) -> Decimal {
        match field {
            LineItemField::Quantity => self.quantity,
            LineItemField::Rate => self.rate,
            LineItemField::DiscountPercent => self.discount_percent,
            LineItemField::GstPercent => self.gst_percent,
        }
    }

    pub fn set(&mut self, field: LineItemField, value: Decimal) {
        match field {
            LineItemField::Quantity => self.quantity = value,
            LineItemField::Rate => self.rate = value,
            LineItemField::DiscountPercent => self.discount_percent = value,
            LineItemField::GstPercent => self.gst_percent = value,
        }
    }

    /// `quantity * rate`, or `None` past `Decimal` range.
    pub fn gross_amount(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.rate)
    }

    /// Gross amount after the percentage discount, or `None` past `Decimal`
    /// range. Never `None` for a validated item.
    pub fn taxable_amount(&self) -> Option<Decimal> {
        self.gross_amount()?
            .checked_mul(Decimal::ONE_HUNDRED.checked_sub(self.discount_percent)?)?
            .checked_div(Decimal::ONE_HUNDRED)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for field in [
            LineItemField::Quantity,
            LineItemField::Rate,
            LineItemField::DiscountPercent,
            LineItemField::GstPercent,
        ] {
            Self::validate_field(field, self.get(field))?;
        }
        Ok(())
    }

    /// Check a single value against the range of `field`.
    pub fn validate_field(field: LineItemField, value: Decimal) -> Result<(), ValidationError> {
        if value < Decimal::ZERO {
            return Err(ValidationError::Negative {
                field: field.as_str(),
                value,
            });
        }
        match field {
            LineItemField::DiscountPercent if value > MAX_PERCENT => {
                return Err(ValidationError::DiscountOutOfRange { value });
            }
            LineItemField::GstPercent if value > MAX_PERCENT => {
                return Err(ValidationError::GstOutOfRange { value });
            }
            _ => {}
        }
        if value > MAX_FIELD_VALUE {
            return Err(ValidationError::TooLarge {
                field: field.as_str(),
                value,
                max: MAX_FIELD_VALUE,
            });
        }
        Ok(())
    }

    /// Pull `value` into the accepted range of `field`.
    pub fn clamp_field(field: LineItemField, value: Decimal) -> Decimal {
        let max = match field {
            LineItemField::DiscountPercent | LineItemField::GstPercent => MAX_PERCENT,
            LineItemField::Quantity | LineItemField::Rate => MAX_FIELD_VALUE,
        };
        value.max(Decimal::ZERO).min(max)
    }

    pub fn clamped(&self) -> Self {
        Self {
            quantity: Self::clamp_field(LineItemField::Quantity, self.quantity),
            rate: Self::clamp_field(LineItemField::Rate, self.rate),
            discount_percent: Self::clamp_field(
                LineItemField::DiscountPercent,
                self.discount_percent,
            ),
            gst_percent: Self::clamp_field(LineItemField::GstPercent, self.gst_percent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn max_field_value_is_one_trillion() {
        assert_eq!(MAX_FIELD_VALUE, d("1000000000000"));
    }

    #[test]
    fn taxable_amount_applies_discount() {
        let item = LineItem::new(d("1"), d("99.5"), d("10"), d("12"));
        assert_eq!(item.gross_amount(), Some(d("99.5")));
        assert_eq!(item.taxable_amount(), Some(d("89.55")));
    }

    #[test]
    fn full_discount_leaves_nothing_taxable() {
        let item = LineItem::new(d("3"), d("40"), d("100"), d("18"));
        assert_eq!(item.taxable_amount(), Some(Decimal::ZERO));
    }

    #[test]
    fn rejects_negative_quantity() {
        let item = LineItem::new(d("-1"), d("10"), d("0"), d("0"));
        assert_eq!(
            item.validate(),
            Err(ValidationError::Negative {
                field: "quantity",
                value: d("-1"),
            })
        );
    }

    #[test]
    fn rejects_discount_above_hundred() {
        let err = LineItem::validate_field(LineItemField::DiscountPercent, d("100.01"))
            .unwrap_err();
        assert_eq!(err, ValidationError::DiscountOutOfRange { value: d("100.01") });
        assert!(LineItem::validate_field(LineItemField::DiscountPercent, d("100")).is_ok());
    }

    #[test]
    fn rejects_gst_rate_above_hundred() {
        let err = LineItem::validate_field(LineItemField::GstPercent, d("1000")).unwrap_err();
        assert_eq!(err, ValidationError::GstOutOfRange { value: d("1000") });
        assert!(LineItem::validate_field(LineItemField::GstPercent, d("100")).is_ok());
        assert_eq!(
            LineItem::clamp_field(LineItemField::GstPercent, MAX_FIELD_VALUE),
            d("100")
        );
    }

    #[test]
    fn out_of_range_product_is_none_not_saturated() {
        let huge = LineItem::new(Decimal::MAX, d("2"), Decimal::ZERO, Decimal::ZERO);
        assert_eq!(huge.gross_amount(), None);
        assert_eq!(huge.taxable_amount(), None);
    }

    #[test]
    fn rejects_values_beyond_max() {
        let err = LineItem::validate_field(LineItemField::Rate, d("1000000000000.01")).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { field: "rate", .. }));
    }

    #[test]
    fn negative_zero_is_accepted() {
        assert!(LineItem::validate_field(LineItemField::Quantity, d("-0")).is_ok());
    }

    #[test]
    fn clamped_pulls_fields_into_range() {
        let item = LineItem::new(d("-2"), d("5"), d("150"), d("-18")).clamped();
        assert_eq!(item, LineItem::new(d("0"), d("5"), d("100"), d("0")));
        let item = LineItem::new(d("1"), d("5"), d("0"), d("400")).clamped();
        assert_eq!(item.gst_percent, d("100"));
        assert!(item.validate().is_ok());
    }

    #[test]
    fn field_names_are_snake_case() {
        let field: LineItemField = serde_json::from_str("\"discount_percent\"").unwrap();
        assert_eq!(field, LineItemField::DiscountPercent);
        assert_eq!(field.to_string(), "discount_percent");
    }
}

//! Number formatting for invoices: fixed decimals, Indian digit grouping and
//! amounts in words (lakh/crore system).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const THOUSAND: u128 = 1_000;
const LAKH: u128 = 100_000;
const CRORE: u128 = 10_000_000;

/// Round half away from zero to `dp` places and always print `dp` digits.
/// Never yields a negative zero.
pub fn to_fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    // Padded by the formatter: `rescale` cannot add digits past 28.
    format!("{:.*}", dp as usize, rounded)
}

pub fn to_fixed_2(value: Decimal) -> String {
    to_fixed(value, 2)
}

/// `1234567.8` → `12,34,567.80`
pub fn format_indian(value: Decimal) -> String {
    let fixed = to_fixed_2(value);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

    format!("{}{}.{}", sign, group_indian(integer), fraction)
}

/// Rupee amount as the invoice form shows it, e.g. `₹12,34,567.80`.
pub fn format_inr(value: Decimal) -> String {
    let formatted = format_indian(value);
    match formatted.strip_prefix('-') {
        Some(rest) => format!("-₹{}", rest),
        None => format!("₹{}", formatted),
    }
}

fn group_indian(integer: &str) -> String {
    if integer.len() <= 3 {
        return integer.to_string();
    }

    let (mut rest, last_three) = integer.split_at(integer.len() - 3);
    let mut groups = Vec::new();
    while rest.len() > 2 {
        let (head, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = head;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();

    format!("{},{}", groups.join(","), last_three)
}

/// Amount in words for the printed invoice, e.g.
/// `236` → `Two Hundred and Thirty Six Rupees Only`.
pub fn amount_in_words(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        return "Zero Rupees Only".to_string();
    }

    let magnitude = rounded.abs();
    let whole = magnitude.trunc();
    let rupees = whole.to_u128().unwrap_or(0);
    let paise = ((magnitude - whole) * Decimal::ONE_HUNDRED)
        .to_u128()
        .unwrap_or(0);

    let mut words = String::new();
    if rupees > 0 {
        words.push_str(&indian_words(rupees));
        words.push_str(" Rupees");
    }
    if paise > 0 {
        if !words.is_empty() {
            words.push_str(" and ");
        }
        words.push_str(&two_digits(paise));
        words.push_str(" Paise");
    }
    if rounded < Decimal::ZERO {
        words.insert_str(0, "Minus ");
    }
    words.push_str(" Only");
    words
}

fn two_digits(n: u128) -> String {
    let n = n as usize;
    if n < 20 {
        ONES[n].to_string()
    } else if n % 10 == 0 {
        TENS[n / 10].to_string()
    } else {
        format!("{} {}", TENS[n / 10], ONES[n % 10])
    }
}

fn three_digits(n: u128) -> String {
    if n < 100 {
        return two_digits(n);
    }
    let hundreds = format!("{} Hundred", ONES[(n / 100) as usize]);
    match n % 100 {
        0 => hundreds,
        rest => format!("{} and {}", hundreds, two_digits(rest)),
    }
}

fn with_remainder(head: String, rest: u128, tail: impl Fn(u128) -> String) -> String {
    if rest == 0 {
        head
    } else {
        format!("{} {}", head, tail(rest))
    }
}

fn indian_words(n: u128) -> String {
    if n < THOUSAND {
        three_digits(n)
    } else if n < LAKH {
        with_remainder(
            format!("{} Thousand", two_digits(n / THOUSAND)),
            n % THOUSAND,
            three_digits,
        )
    } else if n < CRORE {
        with_remainder(
            format!("{} Lakh", two_digits(n / LAKH)),
            n % LAKH,
            indian_words,
        )
    } else {
        with_remainder(
            format!("{} Crore", indian_words(n / CRORE)),
            n % CRORE,
            indian_words,
        )
    }
}

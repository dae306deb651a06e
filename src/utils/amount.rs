use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Amount;

pub const THOUSAND: Amount = 1_000;
pub const LAKH: Amount = 100_000;
pub const CRORE: Amount = 10_000_000;

/// Which unit names to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountStyle {
    /// "Thousand" / "Lakh" / "Crore", amounts under 1,000 printed raw
    #[default]
    Long,
    /// "K" / "Lakh" / "CR", everything under a lakh printed in K
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AmountUnit {
    Raw,
    Thousand,
    Lakh,
    Crore,
}

impl AmountUnit {
    pub fn for_amount(amount: Amount, style: AmountStyle) -> Self {
        match amount {
            a if a >= CRORE => AmountUnit::Crore,
            a if a >= LAKH => AmountUnit::Lakh,
            a if a >= THOUSAND || style == AmountStyle::Compact => AmountUnit::Thousand,
            _ => AmountUnit::Raw,
        }
    }

    /// Unit the backend expects next to a new player's base price
    pub fn for_base_price(amount: Amount) -> Self {
        Self::for_amount(amount, AmountStyle::Compact)
    }

    pub fn divisor(self) -> Amount {
        match self {
            AmountUnit::Raw => 1,
            AmountUnit::Thousand => THOUSAND,
            AmountUnit::Lakh => LAKH,
            AmountUnit::Crore => CRORE,
        }
    }

    pub fn label(self, style: AmountStyle) -> &'static str {
        match (self, style) {
            (AmountUnit::Raw, _) => "",
            (AmountUnit::Thousand, AmountStyle::Long) => "Thousand",
            (AmountUnit::Thousand, AmountStyle::Compact) => "K",
            (AmountUnit::Lakh, _) => "Lakh",
            (AmountUnit::Crore, AmountStyle::Long) => "Crore",
            (AmountUnit::Crore, AmountStyle::Compact) => "CR",
        }
    }
}

/// Format with the canonical long unit names
pub fn format_amount(amount: Amount) -> String {
    format_amount_with(amount, AmountStyle::Long)
}

pub fn format_amount_with(amount: Amount, style: AmountStyle) -> String {
    let unit = AmountUnit::for_amount(amount, style);
    if unit == AmountUnit::Raw {
        return amount.to_string();
    }
    format!("{} {}", two_decimals(amount, unit.divisor()), unit.label(style))
}

/// Purse screens always show crores: "₹12.50 Cr"
pub fn format_crore(amount: Amount) -> String {
    format!("₹{} Cr", two_decimals(amount, CRORE))
}

/// Full amount with Indian digit grouping: "₹10,00,000"
pub fn format_rupees(amount: Amount) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return format!("₹{}", digits);
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("₹{},{}", groups.join(","), tail)
}

fn two_decimals(amount: Amount, divisor: Amount) -> String {
    let divisor = divisor as u128;
    let hundredths = (amount as u128 * 100 + divisor / 2) / divisor;
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("Please enter a bid amount.")]
    Empty,
    #[error("'{0}' is not a valid amount.")]
    Malformed(String),
    #[error("Please enter an amount greater than zero.")]
    Zero,
    #[error("Amounts must be whole rupees.")]
    Fractional,
    #[error("Amount is too large.")]
    Overflow,
}

static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:₹|rs\.?)?\s*([0-9][0-9,]*)(?:\.([0-9]+))?\s*(k|thousand|l|lac|lakh|lakhs|cr|crore|crores)?\s*$",
    )
    .expect("amount regex is valid")
});

/// Parse console input such as `9000000`, `90,00,000`, `90 lakh` or `1.5cr`
pub fn parse_amount(input: &str) -> Result<Amount, AmountParseError> {
    if input.trim().is_empty() {
        return Err(AmountParseError::Empty);
    }

    let caps = AMOUNT_RE
        .captures(input)
        .ok_or_else(|| AmountParseError::Malformed(input.trim().to_string()))?;

    let multiplier: u128 = match caps.get(3).map(|m| m.as_str().to_lowercase()).as_deref() {
        None => 1,
        Some("k") | Some("thousand") => THOUSAND as u128,
        Some("cr") | Some("crore") | Some("crores") => CRORE as u128,
        Some(_) => LAKH as u128,
    };

    let whole: u128 = caps[1]
        .replace(',', "")
        .parse()
        .map_err(|_| AmountParseError::Overflow)?;

    let mut total = whole
        .checked_mul(multiplier)
        .ok_or(AmountParseError::Overflow)?;

    if let Some(frac) = caps.get(2).map(|m| m.as_str()) {
        let scale = 10u128
            .checked_pow(frac.len() as u32)
            .ok_or(AmountParseError::Overflow)?;
        let numerator: u128 = frac.parse().map_err(|_| AmountParseError::Overflow)?;
        let scaled = numerator
            .checked_mul(multiplier)
            .ok_or(AmountParseError::Overflow)?;
        if scaled % scale != 0 {
            return Err(AmountParseError::Fractional);
        }
        total = total
            .checked_add(scaled / scale)
            .ok_or(AmountParseError::Overflow)?;
    }

    let amount = Amount::try_from(total).map_err(|_| AmountParseError::Overflow)?;
    if amount == 0 {
        return Err(AmountParseError::Zero);
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_golden_values() {
        assert_eq!(format_amount(125_000_000), "12.50 Crore");
        assert_eq!(format_amount(75_000), "75.00 Thousand");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(1_000), "1.00 Thousand");
        assert_eq!(format_amount(100_000), "1.00 Lakh");
        assert_eq!(format_amount(9_000_000), "90.00 Lakh");
        assert_eq!(format_amount(10_000_000), "1.00 Crore");
    }

    #[test]
    fn test_format_rounds_half_up() {
        assert_eq!(format_amount(12_345), "12.35 Thousand");
        assert_eq!(format_amount(12_344), "12.34 Thousand");
        assert_eq!(format_amount(99_999), "100.00 Thousand");
        assert_eq!(format_amount(15_550_000), "1.56 Crore");
    }

    #[test]
    fn test_compact_boundary_has_no_raw_tier() {
        assert_eq!(format_amount_with(500, AmountStyle::Compact), "0.50 K");
        assert_eq!(format_amount_with(75_000, AmountStyle::Compact), "75.00 K");
        assert_eq!(format_amount_with(125_000_000, AmountStyle::Compact), "12.50 CR");
        assert_eq!(format_amount_with(500, AmountStyle::Long), "500");
    }

    #[test]
    fn test_base_price_unit() {
        assert_eq!(AmountUnit::for_base_price(50_000).label(AmountStyle::Compact), "K");
        assert_eq!(AmountUnit::for_base_price(800).label(AmountStyle::Compact), "K");
        assert_eq!(AmountUnit::for_base_price(8_000_000).label(AmountStyle::Compact), "Lakh");
        assert_eq!(AmountUnit::for_base_price(20_000_000).label(AmountStyle::Compact), "CR");
    }

    #[test]
    fn test_format_is_idempotent_and_monotonic() {
        let samples: Vec<Amount> = (0..40).map(|i| 3u64.pow(i / 2) * (1 + i as u64 % 2)).collect();
        let mut last_unit = AmountUnit::Raw;
        let mut sorted = samples.clone();
        sorted.sort_unstable();
        for amount in sorted {
            assert_eq!(format_amount(amount), format_amount(amount));
            let unit = AmountUnit::for_amount(amount, AmountStyle::Long);
            assert!(unit >= last_unit, "unit went down at {}", amount);
            last_unit = unit;
        }
    }

    #[test]
    fn test_crore_and_rupees() {
        assert_eq!(format_crore(1_000_000_000), "₹100.00 Cr");
        assert_eq!(format_crore(125_000_000), "₹12.50 Cr");
        assert_eq!(format_rupees(1_000_000), "₹10,00,000");
        assert_eq!(format_rupees(123_456_789), "₹12,34,56,789");
        assert_eq!(format_rupees(999), "₹999");
        assert_eq!(format_rupees(1_000), "₹1,000");
    }

    #[test]
    fn test_parse_amount_inputs() {
        assert_eq!(parse_amount("9000000"), Ok(9_000_000));
        assert_eq!(parse_amount("90,00,000"), Ok(9_000_000));
        assert_eq!(parse_amount("90 lakh"), Ok(9_000_000));
        assert_eq!(parse_amount("1.5cr"), Ok(15_000_000));
        assert_eq!(parse_amount("₹ 75k"), Ok(75_000));
        assert_eq!(parse_amount("12.5 Crore"), Ok(125_000_000));
    }

    #[test]
    fn test_parse_amount_rejects() {
        assert_eq!(parse_amount("  "), Err(AmountParseError::Empty));
        assert_eq!(parse_amount("0"), Err(AmountParseError::Zero));
        assert_eq!(parse_amount("-5"), Err(AmountParseError::Malformed("-5".to_string())));
        assert_eq!(parse_amount("ten lakh"), Err(AmountParseError::Malformed("ten lakh".to_string())));
        assert_eq!(parse_amount("10.5"), Err(AmountParseError::Fractional));
        assert_eq!(parse_amount("99999999999999999999999"), Err(AmountParseError::Overflow));
    }
}

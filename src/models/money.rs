//! Currency amounts: parsing user input and rupiah display.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{AppError, Result};

/// Parse a user-entered amount into a non-negative decimal.
///
/// Accepts plain numbers (`500000`, `125000.50`). Rejected input never
/// reaches the backend.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Amount is required"));
    }

    let amount = Decimal::from_str(trimmed)
        .map_err(|_| AppError::validation(format!("Amount '{trimmed}' is not a number")))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AppError::validation("Amount cannot be negative"));
    }

    Ok(amount)
}

/// Format an amount as Indonesian rupiah without decimals, e.g. `Rp 1.500.000`.
pub fn format_rupiah(amount: Decimal) -> String {
    let negative = amount.is_sign_negative() && !amount.round().is_zero();
    let digits = amount.abs().round().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}

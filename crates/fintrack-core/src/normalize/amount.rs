//! Monetary amount normalization
//!
//! Accepts the decorations bank exports put on amounts: `$`, thousands
//! separators, accounting parentheses, Unicode minus signs and trailing
//! minus signs. The result is an exact [`Decimal`].

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::error::{Error, Result};

/// Minus-sign look-alikes seen in PDF text and spreadsheet exports
const MINUS_VARIANTS: [char; 7] = [
    '\u{2212}', // minus sign
    '\u{2012}', // figure dash
    '\u{2013}', // en dash
    '\u{2014}', // em dash
    '\u{2015}', // horizontal bar
    '\u{FE63}', // small hyphen-minus
    '\u{FF0D}', // fullwidth hyphen-minus
];

/// Parse a free-form amount string into a signed decimal
pub fn normalize(raw: &str) -> Result<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .map(|c| if MINUS_VARIANTS.contains(&c) { '-' } else { c })
        .collect();

    if cleaned.is_empty() {
        return Err(Error::Parse("empty amount".to_string()));
    }
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(Error::Parse(format!("Unable to parse amount: {}", raw)));
    }

    // Accounting convention: (45.00) is negative
    let mut s = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => format!("-{}", inner),
        None => cleaned,
    };

    // Some statements print the sign after the number: 28.00-
    if let Some(body) = s.strip_suffix('-') {
        if !body.starts_with('-') {
            s = format!("-{}", body);
        }
    }

    // "-$-5" collapses to "--5"; a doubled sign is still negative
    if let Some(rest) = s.strip_prefix("--") {
        s = format!("-{}", rest);
    }

    if let Ok(value) = Decimal::from_str(&s) {
        return Ok(value);
    }

    // Last resort: float parse (scientific notation and the like)
    let float: f64 = s
        .parse()
        .map_err(|_| Error::Parse(format!("Unable to parse amount: {}", raw)))?;
    let value = Decimal::from_f64(float)
        .ok_or_else(|| Error::Parse(format!("Unable to parse amount: {}", raw)))?;
    warn!(raw, %value, "Amount parsed via float fallback; input may be malformed");
    Ok(value)
}

/// Scale an amount to exactly 2 fractional digits for storage and key comparison
pub fn to_storage_scale(amount: Decimal) -> Decimal {
    let mut scaled = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    scaled.rescale(2);
    scaled
}

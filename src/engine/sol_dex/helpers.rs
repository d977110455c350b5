// Solana DEX — Helpers
// format_units, amount_to_lamports, short

use crate::atoms::error::{EngineError, EngineResult};

/// Render base units as a decimal string (9 decimals: 1_500_000_000 → "1.5").
/// Precision past what a u64 can hold just means the whole part is zero.
pub fn format_units(base_units: u64, decimals: u8) -> String {
    if decimals == 0 {
        return base_units.to_string();
    }
    let (whole, frac) = match 10u64.checked_pow(decimals as u32) {
        Some(scale) => (base_units / scale, base_units % scale),
        None => (0, base_units),
    };
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0>width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Parse an amount string (e.g. "1.5") to smallest units given decimals.
pub fn amount_to_lamports(amount_str: &str, decimals: u8) -> EngineResult<u64> {
    let amount_str = amount_str.trim();
    let scale = 10u64.checked_pow(decimals as u32)
        .ok_or_else(|| EngineError::invalid(format!("Unsupported decimals: {}", decimals)))?;
    let overflow = || EngineError::invalid(format!("Amount out of range: {}", amount_str));

    let (whole_str, frac_str) = match amount_str.find('.') {
        Some(dot_pos) => (&amount_str[..dot_pos], &amount_str[dot_pos + 1..]),
        None => (amount_str, ""),
    };
    let whole: u64 = if whole_str.is_empty() && !frac_str.is_empty() {
        0
    } else {
        whole_str.parse().map_err(|e| EngineError::invalid(format!("Invalid amount: {}", e)))?
    };
    let whole_units = whole.checked_mul(scale).ok_or_else(overflow)?;
    if frac_str.is_empty() {
        return Ok(whole_units);
    }

    let frac_len = frac_str.len();
    if frac_len > decimals as usize {
        return Err(EngineError::invalid(format!("Too many decimal places (max {})", decimals)));
    }
    let frac: u64 = frac_str.parse().map_err(|e| EngineError::invalid(format!("Invalid fractional: {}", e)))?;
    let multiplier = 10u64.pow((decimals as u32) - frac_len as u32);
    whole_units.checked_add(frac * multiplier).ok_or_else(overflow)
}

/// First eight characters of an address, for log lines.
pub(crate) fn short(addr: &str) -> &str {
    &addr[..8.min(addr.len())]
}

//! Address normalization.
//!
//! Every address that enters the crate as text goes through [`normalize_address`]
//! before it is compared or looked up. Once parsed into [`Address`] equality is
//! byte-wise, so `0xABC…` and `0xabc…` compare equal; raw strings are never
//! compared directly.

use alloy::primitives::Address;

/// Parse a hex address, with or without the `0x` prefix, in any letter case.
///
/// Mixed-case input is accepted here even if the checksum is wrong; use
/// [`is_valid_address`] for strict user-input validation.
pub fn normalize_address(raw: &str) -> Option<Address> {
    raw.trim().parse::<Address>().ok()
}

/// Strict validation of user-entered addresses.
///
/// Accepts 40 hex digits with an optional `0x` prefix. All-lowercase and
/// all-uppercase input is accepted as-is; mixed-case input must carry a valid
/// EIP-55 checksum.
pub fn is_valid_address(raw: &str) -> bool {
    let Ok(address) = raw.parse::<Address>() else {
        return false;
    };

    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }

    address.to_checksum(None).strip_prefix("0x") == Some(digits)
}

/// EIP-55 checksum rendering used for display.
pub fn checksum(address: &Address) -> String {
    address.to_checksum(None)
}

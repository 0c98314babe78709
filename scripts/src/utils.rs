//! Utilities for the deploy & admin scripts.

use std::{
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use alloy_primitives::{utils::parse_units, Address, U256};

use crate::{deployments::DeploymentRecord, errors::ScriptError};

/// `10^exp` as a [`U256`]
pub fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// Render a fixed-point value with `keep_decimals` fractional digits
///
/// The value is integer-divided down to `keep_decimals` digits of precision
/// and a decimal point is inserted that many digits from the right. A
/// `keep_decimals` above `decimals` is clamped, and `0` renders the integer only.
pub fn format_fixed(value: U256, decimals: u8, keep_decimals: u8) -> String {
    let keep = keep_decimals.min(decimals);
    let digits = (value / pow10(decimals - keep)).to_string();
    if keep == 0 {
        return digits;
    }

    let keep = usize::from(keep);
    let padded = format!("{digits:0>keep$}");
    let (int_part, frac_part) = padded.split_at(padded.len() - keep);
    let int_part = if int_part.is_empty() { "0" } else { int_part };

    format!("{int_part}.{frac_part}")
}

/// Drop the fractional part of a token amount
pub fn remove_decimals(value: U256, decimals: u8) -> U256 {
    value / pow10(decimals)
}

/// Parse a decimal string (e.g. `1000` or `0.25`) into a fixed-point value with `decimals` decimals
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, ScriptError> {
    parse_units(amount, decimals)
        .map(Into::into)
        .map_err(|e| ScriptError::CalldataConstruction(format!("invalid amount {amount}: {e}")))
}

/// Split a `TOKEN=VALUE` argument
pub fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected TOKEN=VALUE, got `{arg}`"))?;
    if key.is_empty() || value.is_empty() {
        return Err(format!("expected TOKEN=VALUE, got `{arg}`"));
    }

    Ok((key.to_string(), value.to_string()))
}

/// Resolve a hex address or a deployment record key to an address
pub fn resolve_address(record: &DeploymentRecord, token: &str) -> Result<Address, ScriptError> {
    if token.starts_with("0x") {
        return Address::from_str(token)
            .map_err(|e| ScriptError::CalldataConstruction(format!("{token}: {e}")));
    }

    record.require(token)
}

/// Parse a hex address given on the command line
pub fn parse_address(address: &str) -> Result<Address, ScriptError> {
    Address::from_str(address)
        .map_err(|e| ScriptError::CalldataConstruction(format!("{address}: {e}")))
}

/// The current unix time in seconds
pub fn unix_now() -> Result<u64, ScriptError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| ScriptError::Clock(e.to_string()))
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(U256::from(123456u64), 6, 2), "1234.56");
        assert_eq!(format_fixed(U256::from(5u64), 4, 4), "0.0005");
        assert_eq!(format_fixed(U256::from(1234u64), 4, 4), "0.1234");
        assert_eq!(format_fixed(U256::ZERO, 18, 4), "0.0000");
    }

    #[test]
    fn test_format_fixed_truncates() {
        // 150.5% collateral ratio in 1e18 scale, rendered as a percentage
        let ratio = U256::from(1_505_678_900_000_000_000u128);
        assert_eq!(format_fixed(ratio, 16, 4), "150.5678");
        assert_eq!(format_fixed(ratio, 16, 0), "150");
    }

    #[test]
    fn test_format_fixed_clamps_precision() {
        assert_eq!(format_fixed(U256::from(5u64), 2, 4), "0.05");
    }

    #[test]
    fn test_remove_decimals() {
        let amount = U256::from(1_234_567_890u64);
        assert_eq!(remove_decimals(amount, 8), U256::from(12u64));
        assert_eq!(remove_decimals(amount, 0), amount);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1000", 8).unwrap(), U256::from(100_000_000_000u64));
        assert_eq!(
            parse_amount("0.2", 18).unwrap(),
            U256::from(200_000_000_000_000_000u128)
        );
        assert!(parse_amount("ten", 18).is_err());
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("wbtcAddress=0.2").unwrap(),
            ("wbtcAddress".to_string(), "0.2".to_string())
        );
        assert!(parse_assignment("wbtcAddress").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn test_resolve_address() {
        let wbtc = address!("00000000000000000000000000000000000000b1");
        let mut record = DeploymentRecord::default();
        record.record("wbtcAddress", wbtc).unwrap();

        assert_eq!(resolve_address(&record, "wbtcAddress").unwrap(), wbtc);
        assert_eq!(
            resolve_address(&record, "0x00000000000000000000000000000000000000b1").unwrap(),
            wbtc
        );
        assert!(matches!(
            resolve_address(&record, "daiAddress"),
            Err(ScriptError::MissingConfig(_))
        ));
    }
}

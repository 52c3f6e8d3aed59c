//! Decoding helpers for EIP-1193 responses.

use alloy::primitives::{utils::format_ether, Address, Bytes, B256, U256};
use serde_json::Value;

use crate::ports::PortError;

pub fn parse_accounts(value: &Value) -> Result<Vec<Address>, PortError> {
    let arr = value
        .as_array()
        .ok_or_else(|| PortError::Transport("accounts result must be array".to_owned()))?;
    let mut accounts = Vec::with_capacity(arr.len());
    for item in arr {
        let raw = item
            .as_str()
            .ok_or_else(|| PortError::Transport("account item must be string".to_owned()))?;
        let parsed: Address = raw
            .parse()
            .map_err(|e| PortError::Validation(format!("invalid account address: {e}")))?;
        accounts.push(parsed);
    }
    Ok(accounts)
}

/// Accepts hex (`"0x..."`) or decimal quantity strings, or a JSON integer.
pub fn parse_quantity(value: &Value) -> Result<U256, PortError> {
    if let Some(n) = value.as_u64() {
        return Ok(U256::from(n));
    }
    let raw = value
        .as_str()
        .ok_or_else(|| PortError::Validation("quantity must be string or number".to_owned()))?;
    raw.parse()
        .map_err(|e| PortError::Validation(format!("invalid quantity {raw}: {e}")))
}

pub fn parse_chain_id(raw: &str) -> Result<u64, PortError> {
    if raw.starts_with("0x") || raw.starts_with("0X") {
        u64::from_str_radix(&raw[2..], 16)
            .map_err(|e| PortError::Validation(format!("invalid hex chain id: {e}")))
    } else {
        raw.parse()
            .map_err(|e| PortError::Validation(format!("invalid chain id: {e}")))
    }
}

pub fn json_chain_id(value: &Value) -> Result<String, PortError> {
    if let Some(n) = value.as_u64() {
        return Ok(format!("0x{n:x}"));
    }
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| PortError::Validation("chain id must be string or number".to_owned()))
}

pub fn parse_signature(value: &Value) -> Result<Bytes, PortError> {
    let raw = value
        .as_str()
        .ok_or_else(|| PortError::Transport("signature response must be hex string".to_owned()))?;
    raw.parse()
        .map_err(|e| PortError::Validation(format!("invalid signature hex: {e}")))
}

pub fn parse_tx_hash(value: &Value) -> Result<B256, PortError> {
    let raw = value
        .as_str()
        .ok_or_else(|| PortError::Transport("eth_sendTransaction must return tx hash".to_owned()))?;
    raw.parse()
        .map_err(|e| PortError::Validation(format!("invalid tx hash: {e}")))
}

/// Wei rendered in ether with trailing zeros trimmed, keeping one fractional digit.
pub fn format_balance(wei: U256) -> String {
    let formatted = format_ether(wei);
    if !formatted.contains('.') {
        return format!("{formatted}.0");
    }
    let trimmed = formatted.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_formatting_trims_like_ethers() {
        assert_eq!(format_balance(U256::from(1_000_000_000_000_000_000u64)), "1.0");
        assert_eq!(format_balance(U256::ZERO), "0.0");
        assert_eq!(format_balance(U256::from(1_500_000_000_000_000_000u64)), "1.5");
        assert_eq!(format_balance(U256::from(100_000_000_000_000u64)), "0.0001");
        assert_eq!(format_balance(U256::from(1u64)), "0.000000000000000001");
    }

    #[test]
    fn quantity_accepts_hex_decimal_and_numbers() {
        let one_ether = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(
            parse_quantity(&Value::from("0xde0b6b3a7640000")).expect("hex"),
            one_ether
        );
        assert_eq!(
            parse_quantity(&Value::from("1000000000000000000")).expect("decimal"),
            one_ether
        );
        assert_eq!(parse_quantity(&Value::from(7u64)).expect("number"), U256::from(7u64));
        assert!(parse_quantity(&Value::Null).is_err());
    }

    #[test]
    fn chain_ids_parse_hex_and_decimal() {
        assert_eq!(parse_chain_id("0x89").expect("hex"), 137);
        assert_eq!(parse_chain_id("137").expect("decimal"), 137);
        assert!(parse_chain_id("0xzz").is_err());
        assert_eq!(json_chain_id(&Value::from(137u64)).expect("num"), "0x89");
    }

    #[test]
    fn accounts_reject_non_string_items() {
        let ok = parse_accounts(&serde_json::json!([
            "0x1000000000000000000000000000000000000001"
        ]))
        .expect("accounts");
        assert_eq!(ok.len(), 1);
        assert!(parse_accounts(&serde_json::json!([1])).is_err());
        assert!(parse_accounts(&serde_json::json!("0x1")).is_err());
    }
}

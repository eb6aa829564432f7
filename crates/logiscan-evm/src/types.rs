//! JSON-RPC wire types for blocks, transactions, receipts, and logs.
//!
//! Quantities stay hex strings as returned by the node; accessors parse them.

use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use logiscan_abi::LogInput;
use logiscan_core::error::IndexerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub number: String,
    pub hash: String,
    pub parent_hash: String,
    pub timestamp: String,
}

impl BlockHeader {
    pub fn number_u64(&self) -> Result<u64, IndexerError> {
        parse_quantity(&self.number)
    }
}

/// A block fetched with full transaction objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub number: String,
    pub hash: String,
    pub parent_hash: String,
    pub timestamp: String,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn number_u64(&self) -> Result<u64, IndexerError> {
        parse_quantity(&self.number)
    }

    pub fn timestamp_i64(&self) -> Result<i64, IndexerError> {
        let ts = parse_quantity(&self.timestamp)?;
        i64::try_from(ts).map_err(|_| IndexerError::Decode(format!("timestamp out of range: {ts}")))
    }

    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            number: self.number.clone(),
            hash: self.hash.clone(),
            parent_hash: self.parent_hash.clone(),
            timestamp: self.timestamp.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    /// `None` for contract deployments.
    pub to: Option<String>,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub gas: String,
    #[serde(default)]
    pub gas_price: Option<String>,
    #[serde(default)]
    pub nonce: String,
}

impl Transaction {
    /// Returns `true` if the transaction carries calldata (or init code).
    pub fn has_input(&self) -> bool {
        let hex = self.input.strip_prefix("0x").unwrap_or(&self.input);
        !hex.is_empty()
    }

    pub fn is_deploy(&self) -> bool {
        self.to.is_none()
    }

    pub fn input_bytes(&self) -> Result<Vec<u8>, IndexerError> {
        decode_hex(&self.input)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: String,
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    pub gas_used: String,
    #[serde(default)]
    pub effective_gas_price: Option<String>,
    /// `0x1` success, `0x0` failure. Absent before Byzantium.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<RawLog>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status.as_deref().map(|s| parse_hex_u64(s) == 1).unwrap_or(true)
    }

    pub fn log_inputs(&self) -> Result<Vec<LogInput>, IndexerError> {
        self.logs.iter().map(RawLog::to_input).collect()
    }
}

/// A raw EVM log as embedded in a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    #[serde(default)]
    pub log_index: Option<String>,
    #[serde(default)]
    pub removed: Option<bool>,
}

impl RawLog {
    pub fn to_input(&self) -> Result<LogInput, IndexerError> {
        let address = parse_address(&self.address)?;
        let topics = self
            .topics
            .iter()
            .map(|t| {
                B256::from_str(t).map_err(|e| IndexerError::Decode(format!("bad topic '{t}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LogInput {
            address,
            topics,
            data: decode_hex(&self.data)?,
            log_index: self.log_index.as_deref().map(parse_hex_u64).unwrap_or(0),
        })
    }
}

// ─── Hex helpers ──────────────────────────────────────────────────────────────

/// Parse a hex-encoded quantity (with or without `0x`) to u64.
///
/// Block numbers and heads must go through here: a malformed number is an
/// error, never block 0.
pub fn parse_quantity(s: &str) -> Result<u64, IndexerError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16)
        .map_err(|e| IndexerError::Decode(format!("bad quantity '{s}': {e}")))
}

/// Lenient variant for informational fields (gas, nonce, status); malformed input is 0.
pub fn parse_hex_u64(s: &str) -> u64 {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).unwrap_or(0)
}

/// Parse a hex-encoded quantity to U256; malformed or empty input is 0.
pub fn parse_hex_u256(s: &str) -> U256 {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return U256::ZERO;
    }
    U256::from_str_radix(s, 16).unwrap_or(U256::ZERO)
}

pub fn decode_hex(s: &str) -> Result<Vec<u8>, IndexerError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| IndexerError::Decode(format!("invalid hex: {e}")))
}

pub fn parse_address(s: &str) -> Result<Address, IndexerError> {
    Address::from_str(s).map_err(|e| IndexerError::Decode(format!("bad address '{s}': {e}")))
}

/// Format a block number as a JSON-RPC quantity.
pub fn to_hex_quantity(n: u64) -> String {
    format!("0x{n:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_hex_quantities() {
        assert_eq!(parse_hex_u64("0x1"), 1);
        assert_eq!(parse_hex_u64("0xff"), 255);
        assert_eq!(parse_hex_u64("zz"), 0);
        assert_eq!(parse_quantity("0x10").unwrap(), 16);
        assert!(matches!(parse_quantity("zz"), Err(IndexerError::Decode(_))));
        assert!(parse_quantity("0x").is_err());
        assert_eq!(parse_hex_u256("0xde0b6b3a7640000"), U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(parse_hex_u256("0x"), U256::ZERO);
        assert_eq!(to_hex_quantity(255), "0xff");
    }

    #[test]
    fn block_from_node_json() {
        let block: Block = serde_json::from_value(json!({
            "number": "0x10",
            "hash": "0xaa",
            "parentHash": "0x99",
            "timestamp": "0x5f5e100",
            "miner": "0x0000000000000000000000000000000000000000",
            "transactions": [{
                "hash": "0x01",
                "from": "0xAbC0000000000000000000000000000000000001",
                "to": null,
                "input": "0x6080",
                "value": "0x0",
                "gas": "0x5208",
                "gasPrice": "0x3b9aca00",
                "nonce": "0x2"
            }]
        }))
        .unwrap();
        assert_eq!(block.number_u64().unwrap(), 16);
        assert_eq!(block.timestamp_i64().unwrap(), 100_000_000);
        assert_eq!(block.header().number_u64().unwrap(), 16);

        let bad = BlockHeader { number: "latest".into(), ..block.header() };
        assert!(bad.number_u64().is_err());
        let tx = &block.transactions[0];
        assert!(tx.is_deploy());
        assert!(tx.has_input());
        assert_eq!(tx.input_bytes().unwrap(), vec![0x60, 0x80]);
    }

    #[test]
    fn empty_input() {
        let tx = Transaction {
            hash: "0x01".into(),
            from: "0x02".into(),
            to: Some("0x03".into()),
            input: "0x".into(),
            value: "0x0".into(),
            gas: "0x0".into(),
            gas_price: None,
            nonce: "0x0".into(),
        };
        assert!(!tx.has_input());
    }

    #[test]
    fn receipt_status() {
        let mut receipt: Receipt = serde_json::from_value(json!({
            "transactionHash": "0x01",
            "from": "0x02",
            "gasUsed": "0x5208",
            "status": "0x1",
            "logs": []
        }))
        .unwrap();
        assert!(receipt.succeeded());
        receipt.status = Some("0x0".into());
        assert!(!receipt.succeeded());
        receipt.status = None;
        assert!(receipt.succeeded());
    }

    #[test]
    fn raw_log_to_input() {
        let log = RawLog {
            address: "0x00000000000000000000000000000000000000Ee".into(),
            topics: vec![format!("0x{}", "11".repeat(32))],
            data: "0x".into(),
            log_index: Some("0x4".into()),
            removed: None,
        };
        let input = log.to_input().unwrap();
        assert_eq!(input.log_index, 4);
        assert_eq!(input.topics[0], B256::repeat_byte(0x11));
        assert!(input.data.is_empty());

        let bad = RawLog { topics: vec!["0x12".into()], ..log };
        assert!(bad.to_input().is_err());
    }
}

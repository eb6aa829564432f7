//! Receipt log decoding against an [`EventTable`].
//!
//! # EVM ABI indexed-parameter encoding rules
//! - **Value types** (uint, int, bool, address, bytes1–bytes32) are padded to
//!   32 bytes in their topic and decode back to the value.
//! - **Reference types** (string, bytes, arrays, tuples) are stored as the
//!   keccak256 of their encoding. The original value is unrecoverable, so the
//!   raw 32-byte topic is returned as `bytes32`.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_dyn_abi::Specifier;
use alloy_json_abi::EventParam;
use alloy_primitives::{Address, B256, U256};
use logiscan_core::records::{EventLogRecord, EventParamSlot};

use crate::error::AbiError;
use crate::normalizer;
use crate::signature::{EventSignature, EventTable};

/// A receipt log in decoded-bytes form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogInput {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Vec<u8>,
    pub log_index: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedArg {
    pub name: String,
    /// Canonical ABI type, e.g. `uint256`.
    pub ty: String,
    pub indexed: bool,
    pub value: DynSolValue,
}

/// One log matched and decoded against a table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EventOccurrence {
    pub name: String,
    pub address: Address,
    pub log_index: u64,
    /// Arguments in declaration order.
    pub args: Vec<DecodedArg>,
}

impl EventOccurrence {
    pub fn arg(&self, name: &str) -> Option<&DynSolValue> {
        self.args.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    pub fn address_arg(&self, name: &str) -> Option<String> {
        self.arg(name).and_then(normalizer::as_address)
    }

    pub fn uint_arg(&self, name: &str) -> Option<U256> {
        self.arg(name).and_then(normalizer::as_uint)
    }

    pub fn string_arg(&self, name: &str) -> Option<String> {
        self.arg(name).and_then(normalizer::as_string)
    }

    /// Rendered value of the argument at `index`.
    pub fn rendered(&self, index: usize) -> Option<String> {
        self.args.get(index).map(|a| normalizer::render(&a.value))
    }

    /// Flatten into a storable record; slots beyond the fourth are dropped.
    pub fn to_record(&self, tx_hash: &str, block_number: u64) -> EventLogRecord {
        let params = self
            .args
            .iter()
            .map(|a| EventParamSlot {
                name: a.name.clone(),
                ty: a.ty.clone(),
                data: normalizer::render(&a.value),
            })
            .collect();
        EventLogRecord::new(tx_hash, block_number, self.log_index, &self.name, params)
    }
}

/// Decode one log against every table entry whose topic matches `topics[0]`.
pub fn decode_log(log: &LogInput, table: &EventTable) -> Vec<EventOccurrence> {
    let Some(topic0) = log.topics.first() else {
        return Vec::new();
    };

    table
        .by_topic(topic0)
        .filter_map(|entry| match decode_with(log, entry) {
            Ok(occurrence) => Some(occurrence),
            Err(e) => {
                tracing::debug!(
                    event = %entry.name,
                    log_index = log.log_index,
                    error = %e,
                    "log does not decode against matching signature"
                );
                None
            }
        })
        .collect()
}

/// Decode every log of a receipt, preserving log order.
pub fn decode_logs(logs: &[LogInput], table: &EventTable) -> Vec<EventOccurrence> {
    logs.iter().flat_map(|log| decode_log(log, table)).collect()
}

fn resolve(param: &EventParam) -> Result<DynSolType, AbiError> {
    param.resolve().map_err(|e| AbiError::UnsupportedType {
        name: param.name.clone(),
        ty: param.ty.clone(),
        reason: e.to_string(),
    })
}

fn is_reference_type(ty: &DynSolType) -> bool {
    matches!(
        ty,
        DynSolType::String
            | DynSolType::Bytes
            | DynSolType::Array(_)
            | DynSolType::FixedArray(..)
            | DynSolType::Tuple(_)
    )
}

fn decode_topic(topic: &B256, ty: &DynSolType) -> Result<DynSolValue, AbiError> {
    if is_reference_type(ty) {
        return Ok(DynSolValue::FixedBytes(*topic, 32));
    }
    ty.abi_decode(topic.as_slice())
        .map_err(|e| AbiError::Decode(format!("topic decode: {e}")))
}

fn decode_with(log: &LogInput, entry: &EventSignature) -> Result<EventOccurrence, AbiError> {
    let indexed_count = entry.inputs.iter().filter(|p| p.indexed).count();
    if log.topics.len() != indexed_count + 1 {
        return Err(AbiError::Decode(format!(
            "expected {} topics, log has {}",
            indexed_count + 1,
            log.topics.len()
        )));
    }

    let data_types = entry
        .inputs
        .iter()
        .filter(|p| !p.indexed)
        .map(resolve)
        .collect::<Result<Vec<_>, _>>()?;

    let data_values = if data_types.is_empty() {
        Vec::new()
    } else {
        match DynSolType::Tuple(data_types).abi_decode_params(&log.data) {
            Ok(DynSolValue::Tuple(values)) => values,
            Ok(other) => vec![other],
            Err(e) => return Err(AbiError::Decode(format!("data decode: {e}"))),
        }
    };

    let mut topics = log.topics.iter().skip(1);
    let mut data = data_values.into_iter();
    let mut args = Vec::with_capacity(entry.inputs.len());

    for param in &entry.inputs {
        let ty = resolve(param)?;
        let value = if param.indexed {
            let topic = topics
                .next()
                .ok_or_else(|| AbiError::Decode(format!("missing topic for '{}'", param.name)))?;
            decode_topic(topic, &ty)?
        } else {
            data.next()
                .ok_or_else(|| AbiError::Decode(format!("missing data for '{}'", param.name)))?
        };
        args.push(DecodedArg {
            name: param.name.clone(),
            ty: param.selector_type().into_owned(),
            indexed: param.indexed,
            value,
        });
    }

    Ok(EventOccurrence {
        name: entry.name.clone(),
        address: log.address,
        log_index: log.log_index,
        args,
    })
}

//! Converts alloy-core `DynSolValue` → the string forms stored in records.

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};

/// Lowercase `0x`-hex form of an address.
pub fn address_hex(addr: &Address) -> String {
    format!("0x{}", hex::encode(addr.as_slice()))
}

/// Render a decoded value for storage.
///
/// Addresses lowercase hex, integers decimal, byte strings `0x`-hex, arrays
/// and tuples as `[a,b,...]`.
pub fn render(val: &DynSolValue) -> String {
    match val {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
        DynSolValue::Bytes(b) => format!("0x{}", hex::encode(b)),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Address(a) => address_hex(a),
        DynSolValue::Function(f) => format!("0x{}", hex::encode(f.as_slice())),
        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) | DynSolValue::Tuple(vals) => {
            let parts: Vec<String> = vals.iter().map(render).collect();
            format!("[{}]", parts.join(","))
        }
    }
}

pub fn as_address(val: &DynSolValue) -> Option<String> {
    match val {
        DynSolValue::Address(a) => Some(address_hex(a)),
        _ => None,
    }
}

pub fn as_uint(val: &DynSolValue) -> Option<U256> {
    match val {
        DynSolValue::Uint(u, _) => Some(*u),
        _ => None,
    }
}

pub fn as_bool(val: &DynSolValue) -> Option<bool> {
    match val {
        DynSolValue::Bool(b) => Some(*b),
        _ => None,
    }
}

pub fn as_string(val: &DynSolValue) -> Option<String> {
    match val {
        DynSolValue::String(s) => Some(s.clone()),
        _ => None,
    }
}

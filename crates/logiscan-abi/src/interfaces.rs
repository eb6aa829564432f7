//! Contract interface descriptions.
//!
//! Each contract family ships a standard Ethereum ABI JSON file embedded at
//! compile time. A directory of `<kind>.json` files can override any of them
//! at runtime.
//!
//! Events are kept in declaration order. `JsonAbi` stores events in a sorted
//! map, so the event list is read straight from the JSON array instead.

use std::path::Path;

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_dyn_abi::Specifier;
use alloy_json_abi::{Event, Function, JsonAbi, Param};
use serde_json::Value;

use crate::calldata::Selector;
use crate::error::AbiError;

/// The interfaces the scanner knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    /// ERC-165 `supportsInterface` plus the family-tag accessor.
    Probe,
    Service,
    Company,
    Order,
    Token,
}

impl InterfaceKind {
    pub const ALL: [InterfaceKind; 5] = [
        Self::Probe,
        Self::Service,
        Self::Company,
        Self::Order,
        Self::Token,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Probe => "probe",
            Self::Service => "service",
            Self::Company => "company",
            Self::Order => "order",
            Self::Token => "token",
        }
    }

    fn embedded_json(&self) -> &'static str {
        match self {
            Self::Probe => include_str!("../abi/probe.json"),
            Self::Service => include_str!("../abi/service.json"),
            Self::Company => include_str!("../abi/company.json"),
            Self::Order => include_str!("../abi/order.json"),
            Self::Token => include_str!("../abi/token.json"),
        }
    }
}

/// A parsed contract interface.
#[derive(Debug, Clone)]
pub struct ContractInterface {
    kind: InterfaceKind,
    abi: JsonAbi,
    events: Vec<Event>,
}

impl ContractInterface {
    /// Parse a standard Ethereum ABI JSON array.
    pub fn from_json(kind: InterfaceKind, json: &str) -> Result<Self, AbiError> {
        let invalid = |reason: String| AbiError::InvalidJson {
            interface: kind.as_str().to_string(),
            reason,
        };

        let abi: JsonAbi = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;

        let items: Vec<Value> = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;
        let events = items
            .into_iter()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("event"))
            .map(|item| serde_json::from_value::<Event>(item).map_err(|e| invalid(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { kind, abi, events })
    }

    /// The interface compiled into the binary.
    pub fn embedded(kind: InterfaceKind) -> Result<Self, AbiError> {
        Self::from_json(kind, kind.embedded_json())
    }

    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    /// Events in declaration order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// First overload of the named function.
    pub fn function(&self, name: &str) -> Result<&Function, AbiError> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| AbiError::UnknownFunction(name.to_string()))
    }

    pub fn selector(&self, name: &str) -> Result<Selector, AbiError> {
        Ok(self.function(name)?.selector().0)
    }

    /// Selector followed by the ABI-encoded arguments.
    pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> Result<Vec<u8>, AbiError> {
        let func = self.function(name)?;
        if func.inputs.len() != args.len() {
            return Err(AbiError::Decode(format!(
                "'{name}' takes {} arguments, {} given",
                func.inputs.len(),
                args.len()
            )));
        }
        let mut out = func.selector().to_vec();
        out.extend(DynSolValue::Tuple(args.to_vec()).abi_encode_params());
        Ok(out)
    }

    /// Decode the return data of a call to `name`.
    pub fn decode_output(&self, name: &str, data: &[u8]) -> Result<Vec<DynSolValue>, AbiError> {
        let func = self.function(name)?;
        let types = resolve_params(&func.outputs)?;
        match DynSolType::Tuple(types).abi_decode_params(data) {
            Ok(DynSolValue::Tuple(values)) => Ok(values),
            Ok(other) => Ok(vec![other]),
            Err(e) => Err(AbiError::Decode(format!("{name} output: {e}"))),
        }
    }
}

fn resolve_params(params: &[Param]) -> Result<Vec<DynSolType>, AbiError> {
    params
        .iter()
        .map(|p| {
            p.resolve().map_err(|e| AbiError::UnsupportedType {
                name: p.name.clone(),
                ty: p.ty.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// The full set of interfaces used by a scanner.
#[derive(Debug, Clone)]
pub struct Interfaces {
    pub probe: ContractInterface,
    pub service: ContractInterface,
    pub company: ContractInterface,
    pub order: ContractInterface,
    pub token: ContractInterface,
}

impl Interfaces {
    /// All embedded interfaces.
    pub fn embedded() -> Result<Self, AbiError> {
        Ok(Self {
            probe: ContractInterface::embedded(InterfaceKind::Probe)?,
            service: ContractInterface::embedded(InterfaceKind::Service)?,
            company: ContractInterface::embedded(InterfaceKind::Company)?,
            order: ContractInterface::embedded(InterfaceKind::Order)?,
            token: ContractInterface::embedded(InterfaceKind::Token)?,
        })
    }

    /// Embedded interfaces, each replaced by `<dir>/<kind>.json` when present.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, AbiError> {
        let dir = dir.as_ref();
        let load = |kind: InterfaceKind| -> Result<ContractInterface, AbiError> {
            let path = dir.join(format!("{}.json", kind.as_str()));
            if !path.exists() {
                return ContractInterface::embedded(kind);
            }
            let json = std::fs::read_to_string(&path).map_err(|e| AbiError::Io {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            tracing::info!(interface = kind.as_str(), path = %path.display(), "loaded ABI override");
            ContractInterface::from_json(kind, &json)
        };

        Ok(Self {
            probe: load(InterfaceKind::Probe)?,
            service: load(InterfaceKind::Service)?,
            company: load(InterfaceKind::Company)?,
            order: load(InterfaceKind::Order)?,
            token: load(InterfaceKind::Token)?,
        })
    }

    pub fn get(&self, kind: InterfaceKind) -> &ContractInterface {
        match kind {
            InterfaceKind::Probe => &self.probe,
            InterfaceKind::Service => &self.service,
            InterfaceKind::Company => &self.company,
            InterfaceKind::Order => &self.order,
            InterfaceKind::Token => &self.token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};

    #[test]
    fn all_embedded_interfaces_parse() {
        for kind in InterfaceKind::ALL {
            let iface = ContractInterface::embedded(kind).unwrap();
            assert_eq!(iface.kind(), kind);
        }
    }

    #[test]
    fn events_keep_declaration_order() {
        let company = ContractInterface::embedded(InterfaceKind::Company).unwrap();
        let names: Vec<_> = company.events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "OrderLaunched",
                "OrderCodeUpdated",
                "OperatorAdded",
                "OperatorRemoved",
                "NameSet",
                "UrlSet",
                "RecipientSet"
            ]
        );
    }

    #[test]
    fn well_known_selectors() {
        let token = ContractInterface::embedded(InterfaceKind::Token).unwrap();
        assert_eq!(hex::encode(token.selector("transfer").unwrap()), "a9059cbb");
        assert_eq!(hex::encode(token.selector("transferFrom").unwrap()), "23b872dd");
        assert_eq!(hex::encode(token.selector("approve").unwrap()), "095ea7b3");
        assert_eq!(hex::encode(token.selector("burn").unwrap()), "42966c68");

        let probe = ContractInterface::embedded(InterfaceKind::Probe).unwrap();
        assert_eq!(hex::encode(probe.selector("supportsInterface").unwrap()), "01ffc9a7");
    }

    #[test]
    fn unknown_function_is_error() {
        let order = ContractInterface::embedded(InterfaceKind::Order).unwrap();
        assert!(matches!(order.function("nope"), Err(AbiError::UnknownFunction(_))));
    }

    #[test]
    fn encode_call_and_decode_output() {
        let order = ContractInterface::embedded(InterfaceKind::Order).unwrap();
        let data = order
            .encode_call("tracking", &[DynSolValue::Uint(U256::from(2u64), 256)])
            .unwrap();
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &order.selector("tracking").unwrap());

        let company = Address::repeat_byte(0x11);
        let ret = DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(0u64), 256),
            DynSolValue::Address(company),
            DynSolValue::Uint(U256::from(77u64), 256),
            DynSolValue::Uint(U256::from(5u64), 256),
        ])
        .abi_encode_params();
        let values = order.decode_output("tracking", &ret).unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(values[1], DynSolValue::Address(company));
        assert_eq!(values[2], DynSolValue::Uint(U256::from(77u64), 256));
    }

    #[test]
    fn decode_string_output() {
        let company = ContractInterface::embedded(InterfaceKind::Company).unwrap();
        let ret = DynSolValue::Tuple(vec![DynSolValue::String("Acme Freight".into())])
            .abi_encode_params();
        let values = company.decode_output("name", &ret).unwrap();
        assert_eq!(values, vec![DynSolValue::String("Acme Freight".into())]);
    }

    #[test]
    fn empty_output_fails_to_decode() {
        let probe = ContractInterface::embedded(InterfaceKind::Probe).unwrap();
        assert!(probe.decode_output("supportsInterface", &[]).is_err());
    }

    #[test]
    fn wrong_arity_rejected() {
        let company = ContractInterface::embedded(InterfaceKind::Company).unwrap();
        assert!(company.encode_call("name", &[DynSolValue::Bool(true)]).is_err());
    }
}

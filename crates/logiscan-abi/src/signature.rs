//! Event signature table.
//!
//! The topic of an EVM event is the keccak256 hash of its canonical signature
//! string, e.g.:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
//!
//! The table is a flat list merged across interfaces in declaration order.
//! It holds a few dozen entries, so lookups are linear scans.

use alloy_json_abi::{Event, EventParam};
use alloy_primitives::B256;
use tiny_keccak::{Hasher, Keccak};

use crate::interfaces::ContractInterface;

/// Compute keccak256 of arbitrary bytes.
pub fn keccak256(bytes: &[u8]) -> B256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(bytes);
    hasher.finalize(&mut output);
    B256::from(output)
}

/// `Name(type1,type2,...)` with tuple parameters expanded to `(t1,t2)`.
pub fn canonical_signature(event: &Event) -> String {
    let types: Vec<String> = event
        .inputs
        .iter()
        .map(|p| p.selector_type().into_owned())
        .collect();
    format!("{}({})", event.name, types.join(","))
}

/// One row of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSignature {
    pub name: String,
    pub inputs: Vec<EventParam>,
    pub signature: String,
    pub topic: B256,
}

impl EventSignature {
    pub fn from_event(event: &Event) -> Self {
        let signature = canonical_signature(event);
        Self {
            name: event.name.clone(),
            inputs: event.inputs.clone(),
            topic: keccak256(signature.as_bytes()),
            signature,
        }
    }

    /// `0x`-prefixed lowercase topic.
    pub fn topic_hex(&self) -> String {
        format!("0x{}", hex::encode(self.topic))
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventTable {
    entries: Vec<EventSignature>,
}

impl EventTable {
    /// Build the table from interfaces in the order given.
    ///
    /// Anonymous events have no topic 0 and are left out.
    pub fn build<'a>(interfaces: impl IntoIterator<Item = &'a ContractInterface>) -> Self {
        let entries = interfaces
            .into_iter()
            .flat_map(|iface| iface.events().iter())
            .filter(|event| !event.anonymous)
            .map(EventSignature::from_event)
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[EventSignature] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry with the given event name.
    pub fn by_name(&self, name: &str) -> Option<&EventSignature> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Every entry whose topic equals `topic`.
    pub fn by_topic<'a>(&'a self, topic: &'a B256) -> impl Iterator<Item = &'a EventSignature> {
        self.entries.iter().filter(move |e| &e.topic == topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{InterfaceKind, Interfaces};

    #[test]
    fn erc20_transfer_topic() {
        let token = ContractInterface::embedded(InterfaceKind::Token).unwrap();
        let table = EventTable::build([&token]);
        let transfer = table.by_name("Transfer").unwrap();
        assert_eq!(transfer.signature, "Transfer(address,address,uint256)");
        assert_eq!(
            transfer.topic_hex(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn topics_agree_with_alloy() {
        let all = Interfaces::embedded().unwrap();
        for kind in InterfaceKind::ALL {
            for event in all.get(kind).events() {
                assert_eq!(
                    EventSignature::from_event(event).topic,
                    event.selector(),
                    "{}",
                    event.name
                );
            }
        }
    }

    #[test]
    fn build_is_deterministic() {
        let all = Interfaces::embedded().unwrap();
        let a = EventTable::build([&all.service, &all.company, &all.order]);
        let b = EventTable::build([&all.service, &all.company, &all.order]);
        assert_eq!(a.entries(), b.entries());
        assert_eq!(
            a.len(),
            all.service.events().len() + all.company.events().len() + all.order.events().len()
        );
        assert_eq!(a.entries()[0].name, "CompanyRegistered");
    }

    #[test]
    fn lookup_by_topic() {
        let all = Interfaces::embedded().unwrap();
        let table = EventTable::build([&all.company]);
        let url_set = table.by_name("UrlSet").unwrap().clone();
        let hits: Vec<_> = table.by_topic(&url_set.topic).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].signature, "UrlSet(string,string)");
        assert_eq!(table.by_topic(&B256::ZERO).count(), 0);
    }

    #[test]
    fn tuple_params_expand() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "type": "event",
            "name": "Shipped",
            "anonymous": false,
            "inputs": [
                { "name": "id", "type": "uint256", "indexed": true },
                {
                    "name": "leg", "type": "tuple", "indexed": false,
                    "components": [
                        { "name": "company", "type": "address" },
                        { "name": "code", "type": "uint64" }
                    ]
                }
            ]
        }))
        .unwrap();
        assert_eq!(canonical_signature(&event), "Shipped(uint256,(address,uint64))");
    }
}

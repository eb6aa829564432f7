//! In-process chain used by the integration tests.
//!
//! Contracts answer `eth_call` from a fixed description: every contract with a
//! family tag passes both interface probes, orders expose their tracking list
//! and companies their name. Any other address behaves like an EOA and returns
//! empty data.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use logiscan_abi::{keccak256, Interfaces};
use logiscan_core::error::IndexerError;
use logiscan_evm::types::to_hex_quantity;
use logiscan_evm::{Block, BlockHeader, BlockId, ChainClient, RawLog, Receipt, Transaction};
use tokio::sync::mpsc;

pub const DEPLOYER: &str = "0x00000000000000000000000000000000000000d0";
pub const USER: &str = "0x00000000000000000000000000000000000000e0";

// ─── Contracts ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MockContract {
    /// Family tag returned by the tag accessor; `None` fails both probes.
    pub tag: Option<String>,
    pub name: String,
    pub order_id: u64,
    /// `(company, code, incentives)` per transport id.
    pub tracking: Vec<(String, u64, u64)>,
    pub complete: bool,
}

impl MockContract {
    pub fn tagged(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            ..Default::default()
        }
    }

    pub fn company(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::tagged("company")
        }
    }

    pub fn order(order_id: u64, tracking: Vec<(String, u64, u64)>) -> Self {
        Self {
            order_id,
            tracking,
            ..Self::tagged("order")
        }
    }
}

// ─── Chain ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ChainState {
    canonical: BTreeMap<u64, Block>,
    by_hash: HashMap<String, Block>,
    receipts: HashMap<String, Receipt>,
    contracts: HashMap<String, MockContract>,
    queued_heads: Vec<BlockHeader>,
    calls: usize,
}

pub struct MockChain {
    interfaces: Interfaces,
    state: Mutex<ChainState>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            interfaces: Interfaces::embedded().unwrap(),
            state: Mutex::new(ChainState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn interfaces(&self) -> &Interfaces {
        &self.interfaces
    }

    pub fn add_contract(&self, address: &str, contract: MockContract) {
        self.state()
            .contracts
            .insert(address.to_ascii_lowercase(), contract);
    }

    pub fn set_complete(&self, order: &str, complete: bool) {
        if let Some(c) = self.state().contracts.get_mut(&order.to_ascii_lowercase()) {
            c.complete = complete;
        }
    }

    /// Make `number` canonical with the given transactions. A second call for
    /// the same number with a different `salt` produces a replacement block.
    pub fn add_block(&self, number: u64, salt: u8, txs: Vec<(Transaction, Receipt)>) -> Block {
        let block = Block {
            number: to_hex_quantity(number),
            hash: block_hash(number, salt),
            parent_hash: block_hash(number.saturating_sub(1), 0),
            timestamp: to_hex_quantity(1_600_000_000 + number * 12),
            transactions: txs.iter().map(|(tx, _)| tx.clone()).collect(),
        };
        let mut state = self.state();
        for (tx, receipt) in txs {
            state.receipts.insert(tx.hash.clone(), receipt);
        }
        state.canonical.insert(number, block.clone());
        state.by_hash.insert(block.hash.clone(), block.clone());
        block
    }

    /// Headers delivered, in order, by the next new-heads subscription.
    pub fn queue_head(&self, header: BlockHeader) {
        self.state().queued_heads.push(header);
    }

    /// Number of `eth_call`s served.
    pub fn calls(&self) -> usize {
        self.state().calls
    }

    fn answer(&self, contract: &MockContract, data: &[u8]) -> Result<Vec<u8>, IndexerError> {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| IndexerError::Rpc("execution reverted".into()))?;
        let is = |iface: &logiscan_abi::ContractInterface, name: &str| {
            iface.selector(name).map(|s| s == selector).unwrap_or(false)
        };
        let word_arg = || U256::from_be_slice(data.get(4..36).unwrap_or(&[0u8; 32][..]));

        let i = &self.interfaces;
        let values = if is(&i.probe, "supportsInterface") {
            vec![DynSolValue::Bool(contract.tag.is_some())]
        } else if is(&i.probe, "getDkargoPrefix") {
            let tag = contract
                .tag
                .clone()
                .ok_or_else(|| IndexerError::Rpc("execution reverted".into()))?;
            vec![DynSolValue::String(tag)]
        } else if is(&i.company, "name") {
            vec![DynSolValue::String(contract.name.clone())]
        } else if is(&i.order, "orderid") {
            vec![uint(contract.order_id)]
        } else if is(&i.order, "trackingCount") {
            vec![uint(contract.tracking.len() as u64)]
        } else if is(&i.order, "isComplete") {
            vec![DynSolValue::Bool(contract.complete)]
        } else if is(&i.order, "tracking") {
            let index = word_arg();
            let (company, code, incentives) = usize::try_from(index)
                .ok()
                .and_then(|i| contract.tracking.get(i))
                .ok_or_else(|| IndexerError::Rpc("execution reverted".into()))?;
            vec![
                DynSolValue::Uint(index, 256),
                DynSolValue::Address(address(company)),
                uint(*code),
                uint(*incentives),
            ]
        } else {
            return Err(IndexerError::Rpc("execution reverted".into()));
        };
        Ok(DynSolValue::Tuple(values).abi_encode_params())
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn block_number(&self) -> Result<u64, IndexerError> {
        Ok(self
            .state()
            .canonical
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0))
    }

    async fn block(&self, id: BlockId, full: bool) -> Result<Option<Block>, IndexerError> {
        let state = self.state();
        let found = match id {
            BlockId::Number(n) => state.canonical.get(&n).cloned(),
            BlockId::Hash(h) => state.by_hash.get(&h).cloned(),
        };
        Ok(found.map(|mut b| {
            if !full {
                b.transactions.clear();
            }
            b
        }))
    }

    async fn receipt(&self, tx_hash: &str) -> Result<Option<Receipt>, IndexerError> {
        Ok(self.state().receipts.get(tx_hash).cloned())
    }

    async fn call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, IndexerError> {
        let contract = {
            let mut state = self.state();
            state.calls += 1;
            state.contracts.get(&to.to_ascii_lowercase()).cloned()
        };
        match contract {
            Some(contract) => self.answer(&contract, data),
            None => Ok(Vec::new()),
        }
    }

    async fn subscribe_new_heads(
        &self,
    ) -> Result<mpsc::UnboundedReceiver<BlockHeader>, IndexerError> {
        let (tx, rx) = mpsc::unbounded_channel();
        for header in std::mem::take(&mut self.state().queued_heads) {
            let _ = tx.send(header);
        }
        Ok(rx)
    }
}

// ─── Builders ────────────────────────────────────────────────────────────────

pub fn addr(n: u8) -> String {
    format!("0x{n:040x}")
}

pub fn hash(n: u32) -> String {
    format!("0x{n:064x}")
}

pub fn block_hash(number: u64, salt: u8) -> String {
    format!("0x{salt:02x}{number:062x}")
}

pub fn address(s: &str) -> Address {
    Address::from_str(s).unwrap()
}

pub fn uint(n: u64) -> DynSolValue {
    DynSolValue::Uint(U256::from(n), 256)
}

fn receipt(tx: &Transaction, contract_address: Option<&str>, logs: Vec<RawLog>) -> Receipt {
    Receipt {
        transaction_hash: tx.hash.clone(),
        from: tx.from.clone(),
        to: tx.to.clone(),
        contract_address: contract_address.map(str::to_string),
        gas_used: "0x5208".into(),
        effective_gas_price: None,
        status: Some("0x1".into()),
        logs,
    }
}

/// A contract creation by [`DEPLOYER`].
pub fn deploy_tx(tx_hash: &str, contract: &str) -> (Transaction, Receipt) {
    let tx = Transaction {
        hash: tx_hash.to_string(),
        from: DEPLOYER.to_string(),
        to: None,
        input: "0x6080604052".into(),
        value: "0x0".into(),
        gas: "0x2dc6c0".into(),
        gas_price: Some("0x3b9aca00".into()),
        nonce: "0x1".into(),
    };
    let receipt = receipt(&tx, Some(contract), Vec::new());
    (tx, receipt)
}

/// A call from `from` to `to` with the given calldata and receipt logs.
pub fn call_tx(
    tx_hash: &str,
    from: &str,
    to: &str,
    input: Vec<u8>,
    logs: Vec<RawLog>,
) -> (Transaction, Receipt) {
    let tx = Transaction {
        hash: tx_hash.to_string(),
        from: from.to_string(),
        to: Some(to.to_string()),
        input: format!("0x{}", hex::encode(input)),
        value: "0x0".into(),
        gas: "0x30d40".into(),
        gas_price: Some("0x3b9aca00".into()),
        nonce: "0x2".into(),
    };
    let receipt = receipt(&tx, None, logs);
    (tx, receipt)
}

pub fn reverted((tx, mut receipt): (Transaction, Receipt)) -> (Transaction, Receipt) {
    receipt.status = Some("0x0".into());
    receipt.logs.clear();
    (tx, receipt)
}

pub fn address_topic(s: &str) -> B256 {
    address(s).into_word()
}

/// A log of the event with canonical `signature`, emitted by `emitter`.
pub fn event_log(
    emitter: &str,
    signature: &str,
    indexed: Vec<B256>,
    data: Vec<DynSolValue>,
    log_index: u64,
) -> RawLog {
    let mut topics = vec![keccak256(signature.as_bytes())];
    topics.extend(indexed);
    let data = if data.is_empty() {
        Vec::new()
    } else {
        DynSolValue::Tuple(data).abi_encode_params()
    };
    RawLog {
        address: emitter.to_string(),
        topics: topics.iter().map(|t| format!("0x{}", hex::encode(t))).collect(),
        data: format!("0x{}", hex::encode(data)),
        log_index: Some(to_hex_quantity(log_index)),
        removed: Some(false),
    }
}

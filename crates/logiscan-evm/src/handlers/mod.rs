//! Per-family transaction handlers.
//!
//! Each handler turns one transaction against a contract of its family into a
//! [`WriteSet`](logiscan_core::records::WriteSet), or `None` when the
//! transaction produces no record. Handlers only read from the chain and the
//! store; the scanner commits what they return.

pub mod company;
pub mod order;
pub mod service;
pub mod token;

use alloy_primitives::U256;
use logiscan_abi::{AbiError, EventOccurrence, Interfaces, SelectorMap};
use logiscan_core::records::TxCommon;

use crate::types::{parse_hex_u256, parse_hex_u64, Receipt, Transaction};
use crate::units::{fee_ether, format_ether};

/// Everything a handler needs to know about one transaction.
pub struct TxContext<'a> {
    pub tx: &'a Transaction,
    pub receipt: &'a Receipt,
    pub input: &'a [u8],
    /// Called contract, or the created contract for deploys. Lowercase.
    pub target: String,
    pub block_number: u64,
    pub timestamp: i64,
    /// Receipt logs decoded against the flavor's event table.
    pub events: Vec<EventOccurrence>,
}

impl TxContext<'_> {
    /// Fields shared by every transaction record.
    pub fn common(&self, creator: impl Into<String>) -> TxCommon {
        let gas_price = self
            .tx
            .gas_price
            .as_deref()
            .or(self.receipt.effective_gas_price.as_deref())
            .map(parse_hex_u256)
            .unwrap_or(U256::ZERO);
        let gas_used = parse_hex_u64(&self.receipt.gas_used);
        TxCommon {
            hash: self.tx.hash.to_ascii_lowercase(),
            from: self.tx.from.to_ascii_lowercase(),
            to: self.tx.to.as_deref().map(str::to_ascii_lowercase),
            block_number: self.block_number,
            gas: parse_hex_u64(&self.tx.gas),
            gas_used,
            gas_price: gas_price.to_string(),
            nonce: parse_hex_u64(&self.tx.nonce),
            status: self.receipt.succeeded(),
            timestamp: self.timestamp,
            value: format_ether(parse_hex_u256(&self.tx.value)),
            tx_fee: fee_ether(gas_price, gas_used),
            creator: creator.into(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.receipt.succeeded()
    }

    /// The sender, lowercase.
    pub fn sender(&self) -> String {
        self.tx.from.to_ascii_lowercase()
    }

    /// The account that paid for a deployment, lowercase.
    pub fn deployer(&self) -> String {
        self.receipt.from.to_ascii_lowercase()
    }

    /// First occurrence of `name` in the receipt.
    pub fn event(&self, name: &str) -> Option<&EventOccurrence> {
        let found = self.events.iter().find(|e| e.name == name);
        if found.is_none() {
            tracing::debug!(tx = %self.tx.hash, event = name, "expected event not emitted");
        }
        found
    }
}

// ─── Call tables ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCall {
    Register,
    Unregister,
    MarkOrderPayed,
    Settle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyCall {
    Launch,
    UpdateOrderCode,
    AddOperator,
    RemoveOperator,
    SetName,
    SetUrl,
    SetRecipient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderCall {
    SubmitOrderCreate,
    SetUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCall {
    Transfer,
    TransferFrom,
    Burn,
    Approve,
}

/// Selectors of every handled function, resolved once per interface.
#[derive(Debug, Clone)]
pub struct CallTables {
    pub service: SelectorMap<ServiceCall>,
    pub company: SelectorMap<CompanyCall>,
    pub order: SelectorMap<OrderCall>,
    pub token: SelectorMap<TokenCall>,
}

impl CallTables {
    pub fn build(interfaces: &Interfaces) -> Result<Self, AbiError> {
        Ok(Self {
            service: SelectorMap::build(
                &interfaces.service,
                &[
                    ("register", ServiceCall::Register),
                    ("unregister", ServiceCall::Unregister),
                    ("markOrderPayed", ServiceCall::MarkOrderPayed),
                    ("settle", ServiceCall::Settle),
                ],
            )?,
            company: SelectorMap::build(
                &interfaces.company,
                &[
                    ("launch", CompanyCall::Launch),
                    ("updateOrderCode", CompanyCall::UpdateOrderCode),
                    ("addOperator", CompanyCall::AddOperator),
                    ("removeOperator", CompanyCall::RemoveOperator),
                    ("setName", CompanyCall::SetName),
                    ("setUrl", CompanyCall::SetUrl),
                    ("setRecipient", CompanyCall::SetRecipient),
                ],
            )?,
            order: SelectorMap::build(
                &interfaces.order,
                &[
                    ("submitOrderCreate", OrderCall::SubmitOrderCreate),
                    ("setUrl", OrderCall::SetUrl),
                ],
            )?,
            token: SelectorMap::build(
                &interfaces.token,
                &[
                    ("transfer", TokenCall::Transfer),
                    ("transferFrom", TokenCall::TransferFrom),
                    ("burn", TokenCall::Burn),
                    ("approve", TokenCall::Approve),
                ],
            )?,
        })
    }
}

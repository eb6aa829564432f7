//! Derived records produced by the classifier.
//!
//! Transaction records are append-only. Tracking legs are created in bulk and
//! only ever have their `tx_hash` filled in later. Event log records mirror the
//! decoded logs of a recorded transaction.

use serde::{Deserialize, Serialize};

use crate::types::Flavor;

/// Number of parameter slots an [`EventLogRecord`] keeps.
pub const MAX_EVENT_PARAMS: usize = 4;

// ─── Transaction records ──────────────────────────────────────────────────────

/// Fields shared by both transaction record shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxCommon {
    pub hash: String,
    pub from: String,
    /// `None` for contract deployments.
    pub to: Option<String>,
    pub block_number: u64,
    pub gas: u64,
    pub gas_used: u64,
    /// Gas price in wei, decimal.
    pub gas_price: String,
    pub nonce: u64,
    pub status: bool,
    /// Block timestamp, unix seconds.
    pub timestamp: i64,
    /// Transferred value in ether.
    pub value: String,
    /// `gas_price * gas_used` in ether, 4 decimal places.
    pub tx_fee: String,
    /// Deploying EOA, target contract, or submitting sender depending on the operation.
    pub creator: String,
}

/// Whether a transaction type is a primary operation or contract housekeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxCategory {
    Operation,
    Management,
}

impl TxCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operation => "OPERATION",
            Self::Management => "MANAGEMENT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogisticsTxType {
    #[serde(rename = "DEPLOY")]
    Deploy,
    #[serde(rename = "REGISTER")]
    Register,
    #[serde(rename = "UNREGISTER")]
    Unregister,
    #[serde(rename = "PAYCHECK")]
    Paycheck,
    #[serde(rename = "SETTLEMENT")]
    Settlement,
    #[serde(rename = "ORDER-LAUNCH")]
    OrderLaunch,
    #[serde(rename = "ORDER-UPDATE")]
    OrderUpdate,
    #[serde(rename = "SUBMIT")]
    Submit,
    #[serde(rename = "addOperator")]
    AddOperator,
    #[serde(rename = "removeOperator")]
    RemoveOperator,
    #[serde(rename = "setName")]
    SetName,
    #[serde(rename = "setUrl")]
    SetUrl,
    #[serde(rename = "setRecipient")]
    SetRecipient,
    #[serde(rename = "set-order-url")]
    SetOrderUrl,
}

impl LogisticsTxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deploy => "DEPLOY",
            Self::Register => "REGISTER",
            Self::Unregister => "UNREGISTER",
            Self::Paycheck => "PAYCHECK",
            Self::Settlement => "SETTLEMENT",
            Self::OrderLaunch => "ORDER-LAUNCH",
            Self::OrderUpdate => "ORDER-UPDATE",
            Self::Submit => "SUBMIT",
            Self::AddOperator => "addOperator",
            Self::RemoveOperator => "removeOperator",
            Self::SetName => "setName",
            Self::SetUrl => "setUrl",
            Self::SetRecipient => "setRecipient",
            Self::SetOrderUrl => "set-order-url",
        }
    }

    pub fn category(&self) -> TxCategory {
        match self {
            Self::AddOperator
            | Self::RemoveOperator
            | Self::SetName
            | Self::SetUrl
            | Self::SetRecipient
            | Self::SetOrderUrl => TxCategory::Management,
            _ => TxCategory::Operation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenTxType {
    Deploy,
    Transfer,
    Burn,
    Approve,
}

impl TokenTxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deploy => "DEPLOY",
            Self::Transfer => "TRANSFER",
            Self::Burn => "BURN",
            Self::Approve => "APPROVE",
        }
    }
}

/// A transaction against a service, company, or order contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogisticsTx {
    #[serde(flatten)]
    pub common: TxCommon,
    pub tx_type: LogisticsTxType,
    pub order_addr: Option<String>,
    pub order_id: Option<String>,
    pub company_addr: Option<String>,
    pub company_name: Option<String>,
    pub service_addr: Option<String>,
    pub transport_id: Option<String>,
    pub code: Option<String>,
    pub deployed_type: Option<String>,
    pub deployed_addr: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub recipient: Option<String>,
    pub payment: Option<String>,
    pub rest: Option<String>,
}

impl LogisticsTx {
    pub fn new(common: TxCommon, tx_type: LogisticsTxType) -> Self {
        Self {
            common,
            tx_type,
            order_addr: None,
            order_id: None,
            company_addr: None,
            company_name: None,
            service_addr: None,
            transport_id: None,
            code: None,
            deployed_type: None,
            deployed_addr: None,
            old_value: None,
            new_value: None,
            recipient: None,
            payment: None,
            rest: None,
        }
    }
}

/// A transaction against a token contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTx {
    #[serde(flatten)]
    pub common: TxCommon,
    pub tx_type: TokenTxType,
    pub origin: Option<String>,
    pub dest: Option<String>,
    pub amount: Option<String>,
    pub deployed_type: Option<String>,
    pub deployed_addr: Option<String>,
}

impl TokenTx {
    pub fn new(common: TxCommon, tx_type: TokenTxType) -> Self {
        Self {
            common,
            tx_type,
            origin: None,
            dest: None,
            amount: None,
            deployed_type: None,
            deployed_addr: None,
        }
    }
}

/// Either transaction record shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flavor", rename_all = "lowercase")]
pub enum TxRecord {
    Logistics(LogisticsTx),
    Token(TokenTx),
}

impl TxRecord {
    pub fn common(&self) -> &TxCommon {
        match self {
            Self::Logistics(tx) => &tx.common,
            Self::Token(tx) => &tx.common,
        }
    }

    pub fn flavor(&self) -> Flavor {
        match self {
            Self::Logistics(_) => Flavor::Logistics,
            Self::Token(_) => Flavor::Token,
        }
    }

    pub fn hash(&self) -> &str {
        &self.common().hash
    }

    pub fn block_number(&self) -> u64 {
        self.common().block_number
    }

    pub fn tx_type(&self) -> &'static str {
        match self {
            Self::Logistics(tx) => tx.tx_type.as_str(),
            Self::Token(tx) => tx.tx_type.as_str(),
        }
    }

    pub fn category(&self) -> TxCategory {
        match self {
            Self::Logistics(tx) => tx.tx_type.category(),
            Self::Token(_) => TxCategory::Operation,
        }
    }

    pub fn as_logistics(&self) -> Option<&LogisticsTx> {
        match self {
            Self::Logistics(tx) => Some(tx),
            Self::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&TokenTx> {
        match self {
            Self::Token(tx) => Some(tx),
            Self::Logistics(_) => None,
        }
    }
}

// ─── Order tracking legs ──────────────────────────────────────────────────────

/// One leg of an order's delivery route. Unique on `(order_addr, transport_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingLeg {
    pub order_addr: String,
    pub order_id: String,
    pub transport_id: String,
    pub company_addr: String,
    pub company_name: Option<String>,
    pub code: String,
    pub incentives: String,
    /// Block the leg was materialized in.
    pub block_number: u64,
    /// Hash of the transaction that completed (or created) this leg.
    pub tx_hash: Option<String>,
}

/// Sets `tx_hash` on the leg of `order_addr` whose delivery code is `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegTxHashUpdate {
    pub order_addr: String,
    pub code: String,
    pub tx_hash: String,
}

// ─── Event logs ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParamSlot {
    pub name: String,
    pub ty: String,
    pub data: String,
}

/// A decoded event flattened to at most [`MAX_EVENT_PARAMS`] parameter slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogRecord {
    pub tx_hash: String,
    pub block_number: u64,
    pub log_index: u64,
    pub event_name: String,
    /// Full parameter count of the event, including dropped slots.
    pub param_count: usize,
    pub params: Vec<EventParamSlot>,
}

impl EventLogRecord {
    /// Build a record, keeping the first [`MAX_EVENT_PARAMS`] parameters.
    pub fn new(
        tx_hash: impl Into<String>,
        block_number: u64,
        log_index: u64,
        event_name: impl Into<String>,
        mut params: Vec<EventParamSlot>,
    ) -> Self {
        let param_count = params.len();
        params.truncate(MAX_EVENT_PARAMS);
        Self {
            tx_hash: tx_hash.into(),
            block_number,
            log_index,
            event_name: event_name.into(),
            param_count,
            params,
        }
    }
}

// ─── Write sets ───────────────────────────────────────────────────────────────

/// Everything one classified transaction wants persisted.
///
/// Backends apply a write set all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSet {
    pub transaction: TxRecord,
    pub new_legs: Vec<TrackingLeg>,
    pub leg_updates: Vec<LegTxHashUpdate>,
    pub event_logs: Vec<EventLogRecord>,
}

impl WriteSet {
    pub fn new(transaction: TxRecord) -> Self {
        Self {
            transaction,
            new_legs: Vec::new(),
            leg_updates: Vec::new(),
            event_logs: Vec::new(),
        }
    }

    pub fn with_event_logs(mut self, logs: Vec<EventLogRecord>) -> Self {
        self.event_logs = logs;
        self
    }

    pub fn flavor(&self) -> Flavor {
        self.transaction.flavor()
    }

    pub fn block_number(&self) -> u64 {
        self.transaction.block_number()
    }
}

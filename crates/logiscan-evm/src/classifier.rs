//! Transaction classification.
//!
//! A transaction is recorded only when all of the following hold:
//! - it carries input
//! - its target (callee, or the created contract) is a recognized contract
//!   whose family belongs to the scanner's flavor
//! - it is a successful deploy, or its selector maps to a handled call of
//!   that family
//! - the event the handler depends on, if any, was emitted
//!
//! Reverted calls emit no events, so only the calldata-driven branches
//! (payment, launch, code update, submit) record them, with `status` false.
//! Such records never carry legs or leg txhash updates.

use std::sync::Arc;

use logiscan_abi::{decode_logs, EventTable, Interfaces};
use logiscan_core::error::IndexerError;
use logiscan_core::records::WriteSet;
use logiscan_core::store::RecordStore;
use logiscan_core::types::{ContractFamily, Flavor};

use crate::client::ChainClient;
use crate::contract::ContractReader;
use crate::handlers::{self, CallTables, TxContext};
use crate::prober::CapabilityProber;
use crate::types::Transaction;

pub struct Classifier<C: ?Sized> {
    flavor: Flavor,
    client: Arc<C>,
    prober: CapabilityProber<C>,
    reader: ContractReader<C>,
    table: EventTable,
    calls: CallTables,
}

impl<C: ChainClient + ?Sized> Classifier<C> {
    pub fn new(
        flavor: Flavor,
        client: Arc<C>,
        interfaces: Arc<Interfaces>,
    ) -> Result<Self, IndexerError> {
        let reader = ContractReader::new(Arc::clone(&client), Arc::clone(&interfaces));
        let table = match flavor {
            Flavor::Logistics => {
                EventTable::build([&interfaces.service, &interfaces.company, &interfaces.order])
            }
            Flavor::Token => EventTable::build([&interfaces.token]),
        };
        let calls = CallTables::build(&interfaces)?;
        tracing::debug!(flavor = %flavor, events = table.len(), "event table built");
        Ok(Self {
            flavor,
            client,
            prober: CapabilityProber::new(reader.clone()),
            reader,
            table,
            calls,
        })
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn prober(&self) -> &CapabilityProber<C> {
        &self.prober
    }

    pub fn table(&self) -> &EventTable {
        &self.table
    }

    /// Classify one transaction of block `block_number`.
    ///
    /// `Ok(None)` means the transaction is not ours or produces no record.
    /// The store is only read (to check for existing legs).
    pub async fn classify<R: RecordStore + ?Sized>(
        &self,
        tx: &Transaction,
        block_number: u64,
        timestamp: i64,
        store: &R,
    ) -> Result<Option<WriteSet>, IndexerError> {
        if !tx.has_input() {
            return Ok(None);
        }

        let receipt = self
            .client
            .receipt(&tx.hash)
            .await?
            .ok_or_else(|| IndexerError::Rpc(format!("no receipt for {}", tx.hash)))?;
        let succeeded = receipt.succeeded();
        if !succeeded && tx.is_deploy() {
            tracing::debug!(tx = %tx.hash, "reverted deployment skipped");
            return Ok(None);
        }

        let Some(target) = tx.to.as_ref().or(receipt.contract_address.as_ref()) else {
            return Ok(None);
        };
        let target = target.to_ascii_lowercase();

        let Some(family) = self.prober.probe(&target).await else {
            return Ok(None);
        };
        if !self.flavor.accepts(family) {
            return Ok(None);
        }

        let input = tx.input_bytes()?;
        let events = decode_logs(&receipt.log_inputs()?, &self.table);
        let ctx = TxContext {
            tx,
            receipt: &receipt,
            input: &input,
            target,
            block_number,
            timestamp,
            events,
        };

        let writes = if tx.is_deploy() {
            self.deploy(family, &ctx).await.map(Some)
        } else {
            self.call(family, &ctx, store).await
        }
        .map_err(|e| IndexerError::handler(family.as_str(), e.to_string()))?;

        let Some(mut writes) = writes else {
            return Ok(None);
        };
        if !succeeded {
            writes.new_legs.clear();
            writes.leg_updates.clear();
        }
        let hash = writes.transaction.hash().to_string();
        let logs = ctx.events.iter().map(|e| e.to_record(&hash, block_number)).collect();
        let writes = writes.with_event_logs(logs);

        tracing::debug!(
            tx = %hash,
            block = block_number,
            family = %family,
            tx_type = writes.transaction.tx_type(),
            legs = writes.new_legs.len(),
            "transaction classified"
        );
        Ok(Some(writes))
    }

    async fn deploy(
        &self,
        family: ContractFamily,
        ctx: &TxContext<'_>,
    ) -> Result<WriteSet, IndexerError> {
        Ok(match family {
            ContractFamily::Service => handlers::service::deploy(ctx),
            ContractFamily::Company => handlers::company::deploy(ctx),
            ContractFamily::Order => handlers::order::deploy(ctx, &self.reader).await?,
            ContractFamily::Token => handlers::token::deploy(ctx),
        })
    }

    async fn call<R: RecordStore + ?Sized>(
        &self,
        family: ContractFamily,
        ctx: &TxContext<'_>,
        store: &R,
    ) -> Result<Option<WriteSet>, IndexerError> {
        match family {
            ContractFamily::Service => match self.calls.service.lookup(ctx.input) {
                Some(call) => handlers::service::handle(call, ctx, &self.reader).await,
                None => Ok(None),
            },
            ContractFamily::Company => match self.calls.company.lookup(ctx.input) {
                Some(call) => handlers::company::handle(call, ctx, &self.reader).await,
                None => Ok(None),
            },
            ContractFamily::Order => match self.calls.order.lookup(ctx.input) {
                Some(call) => handlers::order::handle(call, ctx, &self.reader, store).await,
                None => Ok(None),
            },
            ContractFamily::Token => Ok(self
                .calls
                .token
                .lookup(ctx.input)
                .and_then(|call| handlers::token::handle(call, ctx))),
        }
    }
}

//! Order contract: deployment and submission materialize the tracking legs.

use logiscan_core::error::IndexerError;
use logiscan_core::records::{LogisticsTx, LogisticsTxType, TrackingLeg, TxRecord, WriteSet};
use logiscan_core::store::RecordStore;
use logiscan_core::types::ContractFamily;

use super::{OrderCall, TxContext};
use crate::client::ChainClient;
use crate::contract::ContractReader;

pub async fn deploy<C: ChainClient + ?Sized>(
    ctx: &TxContext<'_>,
    reader: &ContractReader<C>,
) -> Result<WriteSet, IndexerError> {
    let order = ctx.target.clone();
    let (order_id, legs) = materialize_legs(ctx, reader, &order).await?;

    let mut tx = LogisticsTx::new(ctx.common(ctx.deployer()), LogisticsTxType::Deploy);
    tx.deployed_type = Some(ContractFamily::Order.to_string());
    tx.deployed_addr = Some(order.clone());
    tx.order_addr = Some(order);
    tx.order_id = Some(order_id);

    let mut writes = WriteSet::new(TxRecord::Logistics(tx));
    writes.new_legs = legs;
    Ok(writes)
}

pub async fn handle<C, R>(
    call: OrderCall,
    ctx: &TxContext<'_>,
    reader: &ContractReader<C>,
    store: &R,
) -> Result<Option<WriteSet>, IndexerError>
where
    C: ChainClient + ?Sized,
    R: RecordStore + ?Sized,
{
    let order = ctx.target.clone();
    match call {
        OrderCall::SubmitOrderCreate => {
            let mut tx = LogisticsTx::new(ctx.common(ctx.sender()), LogisticsTxType::Submit);
            let legs = if !ctx.succeeded() || store.has_legs(&order).await? {
                tx.order_id = Some(reader.order_id(&order).await?);
                Vec::new()
            } else {
                let (order_id, legs) = materialize_legs(ctx, reader, &order).await?;
                tx.order_id = Some(order_id);
                legs
            };
            tx.order_addr = Some(order);
            let mut writes = WriteSet::new(TxRecord::Logistics(tx));
            writes.new_legs = legs;
            Ok(Some(writes))
        }
        OrderCall::SetUrl => {
            let Some(event) = ctx.event("OrderUrlSet") else {
                return Ok(None);
            };
            let mut tx = LogisticsTx::new(ctx.common(ctx.sender()), LogisticsTxType::SetOrderUrl);
            tx.old_value = event.string_arg("oldUrl");
            tx.new_value = event.string_arg("newUrl");
            tx.order_addr = Some(order);
            Ok(Some(WriteSet::new(TxRecord::Logistics(tx))))
        }
    }
}

/// Read the order's tracking list into legs.
///
/// The terminal entry is left out once the order is complete. Leg 0 is the
/// shipper's own entry: it carries this transaction's hash and no company
/// name. Later legs get their `tx_hash` from the matching code update.
async fn materialize_legs<C: ChainClient + ?Sized>(
    ctx: &TxContext<'_>,
    reader: &ContractReader<C>,
    order: &str,
) -> Result<(String, Vec<TrackingLeg>), IndexerError> {
    let order_id = reader.order_id(order).await?;
    let mut count = reader.tracking_count(order).await?;
    if reader.is_complete(order).await? {
        count = count.saturating_sub(1);
    }

    let hash = ctx.tx.hash.to_ascii_lowercase();
    let mut legs = Vec::with_capacity(count as usize);
    for idx in 0..count {
        let entry = reader.tracking(order, idx).await?;
        let company_name = if idx > 0 {
            Some(reader.company_name(&entry.company).await?)
        } else {
            None
        };
        legs.push(TrackingLeg {
            order_addr: order.to_string(),
            order_id: order_id.clone(),
            transport_id: idx.to_string(),
            company_addr: entry.company,
            company_name,
            code: entry.code,
            incentives: entry.incentives,
            block_number: ctx.block_number,
            tx_hash: (idx == 0).then(|| hash.clone()),
        });
    }
    tracing::debug!(order, legs = legs.len(), "tracking legs materialized");
    Ok((order_id, legs))
}

//! Company contract: order launch and delivery-code updates, plus the
//! management calls (operators, name, url, recipient).

use logiscan_abi::{normalizer, CallArgs, EventOccurrence};
use logiscan_core::error::IndexerError;
use logiscan_core::records::{LegTxHashUpdate, LogisticsTx, LogisticsTxType, TxRecord, WriteSet};
use logiscan_core::types::ContractFamily;

use super::{CompanyCall, TxContext};
use crate::client::ChainClient;
use crate::contract::ContractReader;

pub fn deploy(ctx: &TxContext<'_>) -> WriteSet {
    let mut tx = LogisticsTx::new(ctx.common(ctx.deployer()), LogisticsTxType::Deploy);
    tx.deployed_type = Some(ContractFamily::Company.to_string());
    tx.deployed_addr = Some(ctx.target.clone());
    tx.company_addr = Some(ctx.target.clone());
    WriteSet::new(TxRecord::Logistics(tx))
}

pub async fn handle<C: ChainClient + ?Sized>(
    call: CompanyCall,
    ctx: &TxContext<'_>,
    reader: &ContractReader<C>,
) -> Result<Option<WriteSet>, IndexerError> {
    match call {
        CompanyCall::Launch => order_call(ctx, reader, false).await.map(Some),
        CompanyCall::UpdateOrderCode => order_call(ctx, reader, true).await.map(Some),
        CompanyCall::AddOperator => {
            Ok(management(ctx, "OperatorAdded", LogisticsTxType::AddOperator, |e, tx| {
                tx.new_value = e.address_arg("operator");
            }))
        }
        CompanyCall::RemoveOperator => {
            Ok(management(ctx, "OperatorRemoved", LogisticsTxType::RemoveOperator, |e, tx| {
                tx.old_value = e.address_arg("operator");
            }))
        }
        CompanyCall::SetName => Ok(management(ctx, "NameSet", LogisticsTxType::SetName, |e, tx| {
            tx.old_value = e.string_arg("oldName");
            tx.new_value = e.string_arg("newName");
        })),
        CompanyCall::SetUrl => Ok(management(ctx, "UrlSet", LogisticsTxType::SetUrl, |e, tx| {
            tx.old_value = e.string_arg("oldUrl");
            tx.new_value = e.string_arg("newUrl");
        })),
        CompanyCall::SetRecipient => {
            Ok(management(ctx, "RecipientSet", LogisticsTxType::SetRecipient, |e, tx| {
                tx.old_value = e.address_arg("oldRecipient");
                tx.new_value = e.address_arg("newRecipient");
            }))
        }
    }
}

/// `launch(order, transportId)` and `updateOrderCode(order, transportId, code)`.
async fn order_call<C: ChainClient + ?Sized>(
    ctx: &TxContext<'_>,
    reader: &ContractReader<C>,
    with_code: bool,
) -> Result<WriteSet, IndexerError> {
    let args = CallArgs::parse(ctx.input, if with_code { 3 } else { 2 })?;
    let order = normalizer::address_hex(&args.address(0)?);
    let transport_id = args.uint(1)?.to_string();

    let tx_type = if with_code {
        LogisticsTxType::OrderUpdate
    } else {
        LogisticsTxType::OrderLaunch
    };
    let mut tx = LogisticsTx::new(ctx.common(ctx.target.clone()), tx_type);
    tx.order_id = Some(reader.order_id(&order).await?);
    tx.company_name = Some(reader.company_name(&ctx.target).await?);
    tx.company_addr = Some(ctx.target.clone());
    tx.transport_id = Some(transport_id);

    let mut leg_updates = Vec::new();
    if with_code {
        let code = args.uint(2)?.to_string();
        leg_updates.push(LegTxHashUpdate {
            order_addr: order.clone(),
            code: code.clone(),
            tx_hash: tx.common.hash.clone(),
        });
        tx.code = Some(code);
    }
    tx.order_addr = Some(order);

    let mut writes = WriteSet::new(TxRecord::Logistics(tx));
    writes.leg_updates = leg_updates;
    Ok(writes)
}

/// A management call whose old/new values come from one event.
fn management(
    ctx: &TxContext<'_>,
    event: &str,
    tx_type: LogisticsTxType,
    fill: impl FnOnce(&EventOccurrence, &mut LogisticsTx),
) -> Option<WriteSet> {
    let occurrence = ctx.event(event)?;
    let mut tx = LogisticsTx::new(ctx.common(ctx.target.clone()), tx_type);
    tx.company_addr = Some(ctx.target.clone());
    fill(occurrence, &mut tx);
    Some(WriteSet::new(TxRecord::Logistics(tx)))
}

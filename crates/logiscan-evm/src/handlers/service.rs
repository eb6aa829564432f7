//! Service contract: company registration, order payment, settlement.

use logiscan_abi::{normalizer, CallArgs};
use logiscan_core::error::IndexerError;
use logiscan_core::records::{LogisticsTx, LogisticsTxType, TxRecord, WriteSet};
use logiscan_core::types::ContractFamily;

use super::{ServiceCall, TxContext};
use crate::client::ChainClient;
use crate::contract::ContractReader;

pub fn deploy(ctx: &TxContext<'_>) -> WriteSet {
    let mut tx = LogisticsTx::new(ctx.common(ctx.deployer()), LogisticsTxType::Deploy);
    tx.deployed_type = Some(ContractFamily::Service.to_string());
    tx.deployed_addr = Some(ctx.target.clone());
    tx.service_addr = Some(ctx.target.clone());
    WriteSet::new(TxRecord::Logistics(tx))
}

pub async fn handle<C: ChainClient + ?Sized>(
    call: ServiceCall,
    ctx: &TxContext<'_>,
    reader: &ContractReader<C>,
) -> Result<Option<WriteSet>, IndexerError> {
    let creator = ctx.target.clone();
    let tx = match call {
        ServiceCall::Register | ServiceCall::Unregister => {
            let (event, tx_type) = if call == ServiceCall::Register {
                ("CompanyRegistered", LogisticsTxType::Register)
            } else {
                ("CompanyUnregistered", LogisticsTxType::Unregister)
            };
            let Some(company) = ctx.event(event).and_then(|e| e.address_arg("company")) else {
                return Ok(None);
            };
            let mut tx = LogisticsTx::new(ctx.common(creator), tx_type);
            tx.company_name = Some(reader.company_name(&company).await?);
            tx.company_addr = Some(company);
            tx
        }
        ServiceCall::MarkOrderPayed => {
            let args = CallArgs::parse(ctx.input, 1)?;
            let order = normalizer::address_hex(&args.address(0)?);
            let mut tx = LogisticsTx::new(ctx.common(creator), LogisticsTxType::Paycheck);
            tx.order_id = Some(reader.order_id(&order).await?);
            tx.order_addr = Some(order);
            tx
        }
        ServiceCall::Settle => {
            let args = CallArgs::parse(ctx.input, 1)?;
            let Some(settled) = ctx.event("Settled") else {
                return Ok(None);
            };
            let mut tx = LogisticsTx::new(ctx.common(creator), LogisticsTxType::Settlement);
            tx.company_addr = Some(normalizer::address_hex(&args.address(0)?));
            tx.recipient = settled.address_arg("recipient");
            tx.payment = settled.uint_arg("payment").map(|v| v.to_string());
            tx.rest = settled.uint_arg("rest").map(|v| v.to_string());
            tx
        }
    };
    Ok(Some(WriteSet::new(TxRecord::Logistics(tx))))
}

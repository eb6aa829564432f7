//! Token contract: ERC-20 transfers, burns and approvals.

use logiscan_core::records::{TokenTx, TokenTxType, TxRecord, WriteSet};
use logiscan_core::types::ContractFamily;

use super::{TokenCall, TxContext};

pub fn deploy(ctx: &TxContext<'_>) -> WriteSet {
    let mut tx = TokenTx::new(ctx.common(ctx.deployer()), TokenTxType::Deploy);
    tx.deployed_type = Some(ContractFamily::Token.to_string());
    tx.deployed_addr = Some(ctx.target.clone());
    WriteSet::new(TxRecord::Token(tx))
}

/// Amounts are raw token units as decimal strings.
pub fn handle(call: TokenCall, ctx: &TxContext<'_>) -> Option<WriteSet> {
    let tx = match call {
        TokenCall::Transfer | TokenCall::TransferFrom => {
            let e = ctx.event("Transfer")?;
            let mut tx = TokenTx::new(ctx.common(ctx.sender()), TokenTxType::Transfer);
            tx.origin = e.address_arg("from");
            tx.dest = e.address_arg("to");
            tx.amount = e.uint_arg("value").map(|v| v.to_string());
            tx
        }
        TokenCall::Burn => {
            let e = ctx.event("Transfer")?;
            let mut tx = TokenTx::new(ctx.common(ctx.sender()), TokenTxType::Burn);
            tx.origin = e.address_arg("from");
            tx.amount = e.uint_arg("value").map(|v| v.to_string());
            tx
        }
        TokenCall::Approve => {
            let e = ctx.event("Approval")?;
            let mut tx = TokenTx::new(ctx.common(ctx.sender()), TokenTxType::Approve);
            tx.origin = e.address_arg("owner");
            tx.dest = e.address_arg("spender");
            tx.amount = e.uint_arg("value").map(|v| v.to_string());
            tx
        }
    };
    Some(WriteSet::new(TxRecord::Token(tx)))
}

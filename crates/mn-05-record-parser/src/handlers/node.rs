//! Consensus node lifecycle and staking.
//!
//! A node stake update also restakes the address book: the stage derives a
//! successor snapshot with the new weights, effective right after the
//! update.

use super::{key_patch, HandlerContext, TransactionHandler};
use crate::domain::entities::Node;
use crate::domain::errors::ParserError;
use crate::domain::records::{NodeStake, TransactionRow};
use mn_03_stream_files::proto::transaction_body::Data;
use mn_03_stream_files::{RecordItem, TransactionType};
use shared_types::Patch;
use std::collections::HashMap;
use tracing::debug;

fn node_id(id: u64) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}

pub struct NodeCreateHandler;

impl TransactionHandler for NodeCreateHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::NodeCreate
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let (Some(Data::NodeCreate(body)), Some(receipt)) =
            (item.body().data.as_ref(), item.receipt())
        else {
            return Ok(());
        };
        let mut node = Node::new(node_id(receipt.node_id), transaction.consensus_timestamp);
        node.account_id = Patch::Set(ctx.account(item, body.account_id.as_ref())?);
        node.description = Patch::Set(body.description.clone());
        node.admin_key = key_patch(body.admin_key.as_ref());
        node.created_timestamp = Patch::Set(transaction.consensus_timestamp);
        node.deleted = Patch::Set(false);
        ctx.add(node);
        Ok(())
    }
}

/// Nodes that predate node transactions are migrated through updates with a
/// non-zero nonce; those updates also set the creation time.
pub struct NodeUpdateHandler;

impl TransactionHandler for NodeUpdateHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::NodeUpdate
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::NodeUpdate(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        let mut node = Node::new(node_id(body.node_id), transaction.consensus_timestamp);
        node.admin_key = key_patch(body.admin_key.as_ref());
        node.description = Patch::from_option(body.description.clone());
        if body.account_id.is_some() {
            node.account_id = Patch::Set(ctx.account(item, body.account_id.as_ref())?);
        }
        if item.nonce() > 0 {
            node.created_timestamp = Patch::Set(transaction.consensus_timestamp);
        }
        node.deleted = Patch::Set(false);
        ctx.add(node);
        Ok(())
    }
}

pub struct NodeDeleteHandler;

impl TransactionHandler for NodeDeleteHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::NodeDelete
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::NodeDelete(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        let mut node = Node::new(node_id(body.node_id), transaction.consensus_timestamp);
        node.deleted = Patch::Set(true);
        ctx.add(node);
        Ok(())
    }
}

pub struct NodeStakeUpdateHandler;

impl TransactionHandler for NodeStakeUpdateHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::NodeStakeUpdate
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::NodeStakeUpdate(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        let consensus_timestamp = transaction.consensus_timestamp;
        let end_stake_period = body
            .end_of_staking_period
            .as_ref()
            .map_or(consensus_timestamp, |ts| ts.to_nanos());

        let mut stakes = HashMap::with_capacity(body.node_stake.len());
        for stake in &body.node_stake {
            stakes.insert(stake.node_id, u64::try_from(stake.stake).unwrap_or(0));
            ctx.add(NodeStake {
                consensus_timestamp,
                end_stake_period,
                node_id: stake.node_id,
                stake: stake.stake,
                reward_rate: stake.reward_rate,
                stake_rewarded: stake.stake_rewarded,
                stake_not_rewarded: stake.stake_not_rewarded,
                staking_period_minutes: body.staking_period,
            });
        }

        let Some(result) = ctx.stage_mut().map(|stage| {
            stage
                .on_node_stakes(consensus_timestamp, &stakes)
                .map(|book| book.total_stake())
        }) else {
            return Ok(());
        };
        match result {
            Ok(total_stake) => {
                debug!(consensus_timestamp, total_stake, "Staged node stake update");
                Ok(())
            }
            Err(e) => ctx.recoverable(item, &ParserError::AddressBook(e)),
        }
    }
}

//! Token service transactions.

use super::{
    duration_patch, key_patch, receipt_or_body, text_patch, timestamp_patch, EntityOperation,
    HandlerContext, TransactionHandler,
};
use crate::domain::entities::{
    AirdropState, Entity, EntityType, Nft, Token, TokenAccount, TokenAirdrop, TokenType,
};
use crate::domain::errors::ParserError;
use crate::domain::records::TransactionRow;
use crate::service::entity_id::EntityIdService;
use mn_03_stream_files::proto::transaction_body::Data;
use mn_03_stream_files::proto::{PendingAirdropId, TokenId};
use mn_03_stream_files::{RecordItem, TransactionType};
use shared_types::{EntityId, Patch, TimestampRange};

/// The token a body names, for kinds whose receipt carries none.
fn body_token(item: &RecordItem) -> Option<&TokenId> {
    match item.body().data.as_ref()? {
        Data::TokenFreeze(body)
        | Data::TokenUnfreeze(body)
        | Data::TokenGrantKyc(body)
        | Data::TokenRevokeKyc(body) => body.token.as_ref(),
        Data::TokenDeletion(body) | Data::TokenPause(body) | Data::TokenUnpause(body) => {
            body.token.as_ref()
        }
        Data::TokenUpdate(body) => body.token.as_ref(),
        Data::TokenMint(body) => body.token.as_ref(),
        Data::TokenBurn(body) => body.token.as_ref(),
        Data::TokenWipe(body) => body.token.as_ref(),
        Data::TokenFeeScheduleUpdate(body) => body.token_id.as_ref(),
        Data::TokenUpdateNfts(body) => body.token.as_ref(),
        _ => None,
    }
}

fn token_entity_id(item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
    receipt_or_body(
        ids,
        item.receipt().and_then(|r| r.token_id.as_ref()),
        body_token(item),
    )
}

/// Supply after the transaction, as reported by the receipt.
fn total_supply(item: &RecordItem) -> Patch<i64> {
    match item.receipt() {
        Some(receipt) => Patch::Set(i64::try_from(receipt.new_total_supply).unwrap_or(i64::MAX)),
        None => Patch::Unset,
    }
}

// =============================================================================
// TOKEN LIFECYCLE
// =============================================================================

pub struct TokenCreateHandler;

impl TransactionHandler for TokenCreateHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::TokenCreation
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Create
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        receipt_or_body(ids, item.receipt().and_then(|r| r.token_id.as_ref()), None)
    }

    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::TokenCreation(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        entity.entity_type = Patch::Set(EntityType::Token);
        entity.memo = Patch::Set(body.memo.clone());
        entity.key = key_patch(body.admin_key.as_ref());
        entity.expiration_timestamp = timestamp_patch(body.expiry.as_ref());
        entity.auto_renew_period = duration_patch(body.auto_renew_period.as_ref());
        if body.auto_renew_account.is_some() {
            let account = ctx.account(item, body.auto_renew_account.as_ref())?;
            entity.auto_renew_account_id = Patch::Set(account);
        }
        Ok(())
    }

    /// The treasury is associated with the new token.
    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::TokenCreation(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        let consensus_timestamp = transaction.consensus_timestamp;
        let token_id = transaction.entity_id;
        let treasury = ctx.account(item, body.treasury.as_ref())?;

        let mut token = Token::new(token_id, consensus_timestamp);
        token.name = Patch::Set(body.name.clone());
        token.symbol = Patch::Set(body.symbol.clone());
        token.decimals = Patch::Set(body.decimals);
        token.token_type = Patch::Set(TokenType::from_code(body.token_type));
        token.total_supply = match total_supply(item) {
            Patch::Set(supply) if supply > 0 => Patch::Set(supply),
            _ => Patch::Set(i64::try_from(body.initial_supply).unwrap_or(i64::MAX)),
        };
        token.max_supply = Patch::Set(body.max_supply);
        token.treasury_account_id = Patch::Set(treasury);
        token.freeze_default = Patch::Set(body.freeze_default);
        token.paused = Patch::Set(false);
        token.metadata = Patch::Set(body.metadata.clone());
        token.created_timestamp = Patch::Set(consensus_timestamp);
        ctx.add(token);

        if !treasury.is_empty() {
            let mut association = TokenAccount::new(treasury, token_id, consensus_timestamp);
            association.associated = Patch::Set(true);
            association.created_timestamp = Patch::Set(consensus_timestamp);
            association.frozen = Patch::Set(false);
            association.kyc_granted = Patch::Set(body.kyc_key.is_some());
            ctx.add(association);
        }
        Ok(())
    }
}

pub struct TokenUpdateHandler;

impl TransactionHandler for TokenUpdateHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::TokenUpdate
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Update
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        token_entity_id(item, ids)
    }

    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::TokenUpdate(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        entity.memo = Patch::from_option(body.memo.clone());
        entity.key = key_patch(body.admin_key.as_ref());
        entity.expiration_timestamp = timestamp_patch(body.expiry.as_ref());
        entity.auto_renew_period = duration_patch(body.auto_renew_period.as_ref());
        if body.auto_renew_account.is_some() {
            let account = ctx.account(item, body.auto_renew_account.as_ref())?;
            entity.auto_renew_account_id = Patch::Set(account);
        }
        Ok(())
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::TokenUpdate(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        let mut token = Token::new(transaction.entity_id, transaction.consensus_timestamp);
        token.name = text_patch(&body.name);
        token.symbol = text_patch(&body.symbol);
        token.metadata = Patch::from_option(body.metadata.clone());
        if body.treasury.is_some() {
            token.treasury_account_id = Patch::Set(ctx.account(item, body.treasury.as_ref())?);
        }
        ctx.add(token);
        Ok(())
    }
}

pub struct TokenDeleteHandler;

impl TransactionHandler for TokenDeleteHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::TokenDeletion
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Delete
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        token_entity_id(item, ids)
    }
}

// =============================================================================
// SUPPLY
// =============================================================================

/// Mint, burn and wipe. All three report the new supply in the receipt.
pub struct TokenSupplyHandler(pub TransactionType);

impl TransactionHandler for TokenSupplyHandler {
    fn transaction_type(&self) -> TransactionType {
        self.0
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        token_entity_id(item, ids)
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let consensus_timestamp = transaction.consensus_timestamp;
        let token_id = transaction.entity_id;
        let mut token = Token::new(token_id, consensus_timestamp);
        token.total_supply = total_supply(item);
        ctx.add(token);

        match item.body().data.as_ref() {
            Some(Data::TokenMint(body)) => {
                let serials = item.receipt().map(|r| r.serial_numbers.as_slice()).unwrap_or(&[]);
                for (serial_number, metadata) in serials.iter().zip(body.metadata.iter()) {
                    let mut nft = Nft::new(token_id, *serial_number, consensus_timestamp);
                    nft.metadata = Patch::Set(metadata.clone());
                    nft.created_timestamp = Patch::Set(consensus_timestamp);
                    nft.deleted = Patch::Set(false);
                    ctx.add(nft);
                }
            }
            Some(Data::TokenBurn(body)) => {
                delete_nfts(ctx, token_id, &body.serial_numbers, consensus_timestamp)
            }
            Some(Data::TokenWipe(body)) => {
                ctx.account(item, body.account.as_ref())?;
                delete_nfts(ctx, token_id, &body.serial_numbers, consensus_timestamp)
            }
            _ => {}
        }
        Ok(())
    }
}

fn delete_nfts(
    ctx: &mut HandlerContext<'_>,
    token_id: EntityId,
    serial_numbers: &[i64],
    consensus_timestamp: i64,
) {
    for serial_number in serial_numbers {
        let mut nft = Nft::new(token_id, *serial_number, consensus_timestamp);
        nft.account_id = Patch::Null;
        nft.spender = Patch::Null;
        nft.deleted = Patch::Set(true);
        ctx.add(nft);
    }
}

// =============================================================================
// ACCOUNT RELATIONSHIPS
// =============================================================================

pub struct TokenAssociationHandler(pub TransactionType);

impl TransactionHandler for TokenAssociationHandler {
    fn transaction_type(&self) -> TransactionType {
        self.0
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        match item.body().data.as_ref() {
            Some(Data::TokenAssociate(body)) | Some(Data::TokenDissociate(body)) => {
                match body.account.as_ref() {
                    Some(account) => ids.lookup_account(account),
                    None => Ok(EntityId::EMPTY),
                }
            }
            _ => Ok(EntityId::EMPTY),
        }
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let (Some(Data::TokenAssociate(body)) | Some(Data::TokenDissociate(body))) =
            item.body().data.as_ref()
        else {
            return Ok(());
        };
        let associate = self.0 == TransactionType::TokenAssociate;
        let account_id = transaction.entity_id;
        for token in &body.tokens {
            let token_id = ctx.id(item, Some(token))?;
            let mut relationship =
                TokenAccount::new(account_id, token_id, transaction.consensus_timestamp);
            relationship.associated = Patch::Set(associate);
            if associate {
                relationship.created_timestamp = Patch::Set(transaction.consensus_timestamp);
            }
            ctx.add(relationship);
        }
        Ok(())
    }
}

/// Freeze, unfreeze, KYC grant and KYC revoke.
pub struct TokenAccountStatusHandler(pub TransactionType);

impl TransactionHandler for TokenAccountStatusHandler {
    fn transaction_type(&self) -> TransactionType {
        self.0
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        token_entity_id(item, ids)
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let account = match item.body().data.as_ref() {
            Some(Data::TokenFreeze(body))
            | Some(Data::TokenUnfreeze(body))
            | Some(Data::TokenGrantKyc(body))
            | Some(Data::TokenRevokeKyc(body)) => body.account.as_ref(),
            _ => return Ok(()),
        };
        let account_id = ctx.account(item, account)?;
        let mut relationship =
            TokenAccount::new(account_id, transaction.entity_id, transaction.consensus_timestamp);
        match self.0 {
            TransactionType::TokenFreeze => relationship.frozen = Patch::Set(true),
            TransactionType::TokenUnfreeze => relationship.frozen = Patch::Set(false),
            TransactionType::TokenGrantKyc => relationship.kyc_granted = Patch::Set(true),
            TransactionType::TokenRevokeKyc => relationship.kyc_granted = Patch::Set(false),
            _ => return Ok(()),
        }
        ctx.add(relationship);
        Ok(())
    }
}

// =============================================================================
// TOKEN PROPERTIES
// =============================================================================

/// Pause, unpause and fee schedule updates.
pub struct TokenPropertyHandler(pub TransactionType);

impl TransactionHandler for TokenPropertyHandler {
    fn transaction_type(&self) -> TransactionType {
        self.0
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        token_entity_id(item, ids)
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let mut token = Token::new(transaction.entity_id, transaction.consensus_timestamp);
        match item.body().data.as_ref() {
            Some(Data::TokenPause(_)) => token.paused = Patch::Set(true),
            Some(Data::TokenUnpause(_)) => token.paused = Patch::Set(false),
            Some(Data::TokenFeeScheduleUpdate(body)) => {
                token.fee_schedule = Patch::Set(body.custom_fees.clone())
            }
            _ => return Ok(()),
        }
        ctx.add(token);
        Ok(())
    }
}

pub struct TokenUpdateNftsHandler;

impl TransactionHandler for TokenUpdateNftsHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::TokenUpdateNfts
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        token_entity_id(item, ids)
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::TokenUpdateNfts(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        let Some(metadata) = body.metadata.as_ref() else {
            return Ok(());
        };
        for serial_number in &body.serial_numbers {
            let mut nft = Nft::new(
                transaction.entity_id,
                *serial_number,
                transaction.consensus_timestamp,
            );
            nft.metadata = Patch::Set(metadata.clone());
            ctx.add(nft);
        }
        Ok(())
    }
}

// =============================================================================
// AIRDROPS
// =============================================================================

/// Natural key of a pending airdrop: sender, receiver, token and serial.
type AirdropKey = (EntityId, EntityId, EntityId, i64);

fn airdrop_key(
    ctx: &mut HandlerContext<'_>,
    item: &RecordItem,
    id: &PendingAirdropId,
) -> Result<Option<AirdropKey>, ParserError> {
    let sender = ctx.account(item, id.sender_id.as_ref())?;
    let receiver = ctx.account(item, id.receiver_id.as_ref())?;
    let (token, serial_number) = match (&id.fungible_token_type, &id.non_fungible_token) {
        (Some(token), _) => (ctx.id(item, Some(token))?, 0),
        (None, Some(nft)) => (ctx.id(item, nft.token_id.as_ref())?, nft.serial_number),
        (None, None) => return Ok(None),
    };
    if sender.is_empty() || receiver.is_empty() || token.is_empty() {
        return Ok(None);
    }
    Ok(Some((sender, receiver, token, serial_number)))
}

/// Opens a pending airdrop for every transfer the receiver has not yet
/// accepted.
pub struct TokenAirdropHandler;

impl TransactionHandler for TokenAirdropHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::TokenAirdrop
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        for pending in &item.record().new_pending_airdrops {
            let Some(id) = pending.pending_airdrop_id.as_ref() else {
                continue;
            };
            let Some((sender, receiver, token_id, serial_number)) = airdrop_key(ctx, item, id)?
            else {
                continue;
            };
            let amount = match (&id.fungible_token_type, &pending.pending_airdrop_value) {
                (Some(_), Some(value)) => {
                    Patch::Set(i64::try_from(value.amount).unwrap_or(i64::MAX))
                }
                (Some(_), None) => Patch::Set(0),
                (None, _) => Patch::Unset,
            };
            ctx.add(TokenAirdrop {
                sender_account_id: sender,
                receiver_account_id: receiver,
                token_id,
                serial_number,
                state: AirdropState::Pending,
                amount,
                timestamp_range: TimestampRange::at_least(transaction.consensus_timestamp),
            });
        }
        Ok(())
    }
}

/// Cancel and claim: both close the pending airdrops they name.
pub struct TokenAirdropResolutionHandler(pub TransactionType);

impl TransactionHandler for TokenAirdropResolutionHandler {
    fn transaction_type(&self) -> TransactionType {
        self.0
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let (Some(Data::TokenCancelAirdrop(body)) | Some(Data::TokenClaimAirdrop(body))) =
            item.body().data.as_ref()
        else {
            return Ok(());
        };
        let state = if self.0 == TransactionType::TokenClaimAirdrop {
            AirdropState::Claimed
        } else {
            AirdropState::Cancelled
        };
        for id in &body.pending_airdrops {
            let Some((sender, receiver, token_id, serial_number)) = airdrop_key(ctx, item, id)?
            else {
                continue;
            };
            ctx.add(TokenAirdrop {
                sender_account_id: sender,
                receiver_account_id: receiver,
                token_id,
                serial_number,
                state,
                amount: Patch::Unset,
                timestamp_range: TimestampRange::at_least(transaction.consensus_timestamp),
            });
        }
        Ok(())
    }
}

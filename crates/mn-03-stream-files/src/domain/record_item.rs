//! # Record Items
//!
//! One consensus transaction paired with its record, as read from a record
//! file. Everything except the referenced entity set is fixed at
//! construction; handlers append referenced ids while the item is dispatched.

use crate::domain::errors::StreamFileError;
use crate::domain::response_code::ResponseCode;
use crate::domain::transaction_type::TransactionType;
use crate::proto::{
    SignedTransaction, Transaction, TransactionBody, TransactionRecord, TransactionReceipt,
};
use prost::Message;
use shared_types::{ConsensusTimestamp, EntityId};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordItem {
    index: usize,
    consensus_timestamp: ConsensusTimestamp,
    parent_consensus_timestamp: Option<ConsensusTimestamp>,
    transaction_type: TransactionType,
    transaction_bytes: Vec<u8>,
    transaction: Transaction,
    body: TransactionBody,
    record: TransactionRecord,
    status: ResponseCode,
    payer: Option<EntityId>,
    entity_ids: BTreeSet<EntityId>,
}

impl RecordItem {
    /// Decodes the serialized transaction and record of the item at `index`.
    pub fn decode(
        index: usize,
        transaction_bytes: &[u8],
        record_bytes: &[u8],
    ) -> Result<Self, StreamFileError> {
        let invalid = |reason: String| StreamFileError::InvalidItem { index, reason };

        let transaction = Transaction::decode(transaction_bytes)
            .map_err(|e| invalid(format!("transaction: {e}")))?;
        let body = decode_body(&transaction).map_err(|e| invalid(format!("body: {e}")))?;
        let record = TransactionRecord::decode(record_bytes)
            .map_err(|e| invalid(format!("record: {e}")))?;

        let consensus_timestamp = record
            .consensus_timestamp
            .as_ref()
            .map(|ts| ts.to_nanos())
            .ok_or_else(|| invalid("record has no consensus timestamp".to_string()))?;
        let parent_consensus_timestamp = record
            .parent_consensus_timestamp
            .as_ref()
            .map(|ts| ts.to_nanos());
        let status = record
            .receipt
            .as_ref()
            .map_or(ResponseCode::OK, |r| ResponseCode(r.status));
        let payer = body
            .transaction_id
            .as_ref()
            .and_then(|id| id.account_id.as_ref())
            .map(|account| account.to_entity_id())
            .transpose()?
            .flatten();

        let mut entity_ids = BTreeSet::new();
        if let Some(payer) = payer {
            entity_ids.insert(payer);
        }

        Ok(Self {
            index,
            consensus_timestamp,
            parent_consensus_timestamp,
            transaction_type: TransactionType::of(body.data.as_ref()),
            transaction_bytes: transaction_bytes.to_vec(),
            transaction,
            body,
            record,
            status,
            payer,
            entity_ids,
        })
    }

    /// Builds an item from already decoded messages, wrapping the body in a
    /// signed transaction.
    pub fn from_parts(
        index: usize,
        body: &TransactionBody,
        record: &TransactionRecord,
    ) -> Result<Self, StreamFileError> {
        let transaction = transaction_from_body(body);
        Self::decode(index, &transaction.encode_to_vec(), &record.encode_to_vec())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn consensus_timestamp(&self) -> ConsensusTimestamp {
        self.consensus_timestamp
    }

    /// Set for child transactions.
    pub fn parent_consensus_timestamp(&self) -> Option<ConsensusTimestamp> {
        self.parent_consensus_timestamp
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    /// The raw transaction as it appeared in the stream.
    pub fn transaction_bytes(&self) -> &[u8] {
        &self.transaction_bytes
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    pub fn record(&self) -> &TransactionRecord {
        &self.record
    }

    pub fn receipt(&self) -> Option<&TransactionReceipt> {
        self.record.receipt.as_ref()
    }

    pub fn status(&self) -> ResponseCode {
        self.status
    }

    pub fn is_successful(&self) -> bool {
        self.status.is_successful()
    }

    pub fn payer(&self) -> Option<EntityId> {
        self.payer
    }

    /// Nonce of the transaction id; non-zero for child transactions.
    pub fn nonce(&self) -> i32 {
        self.body.transaction_id.as_ref().map_or(0, |id| id.nonce)
    }

    pub fn is_child(&self) -> bool {
        self.parent_consensus_timestamp.is_some()
    }

    /// Ids referenced by this item, used for reverse lookups.
    pub fn entity_ids(&self) -> &BTreeSet<EntityId> {
        &self.entity_ids
    }

    /// Records a referenced entity. Empty ids are ignored.
    pub fn add_entity_id(&mut self, id: EntityId) {
        if !id.is_empty() {
            self.entity_ids.insert(id);
        }
    }
}

/// Wraps a body in a [`Transaction`] using the signed transaction layout.
pub fn transaction_from_body(body: &TransactionBody) -> Transaction {
    let signed = SignedTransaction {
        body_bytes: body.encode_to_vec(),
        sig_map: None,
    };
    Transaction {
        sig_map: None,
        body_bytes: Vec::new(),
        signed_transaction_bytes: signed.encode_to_vec(),
    }
}

fn decode_body(transaction: &Transaction) -> Result<TransactionBody, prost::DecodeError> {
    if transaction.signed_transaction_bytes.is_empty() {
        return TransactionBody::decode(transaction.body_bytes.as_slice());
    }
    let signed = SignedTransaction::decode(transaction.signed_transaction_bytes.as_slice())?;
    TransactionBody::decode(signed.body_bytes.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{
        transaction_body::Data, AccountId, CryptoTransferBody, Timestamp, TransactionId,
    };

    fn body(payer: i64) -> TransactionBody {
        TransactionBody {
            transaction_id: Some(TransactionId {
                transaction_valid_start: Some(Timestamp { seconds: 1, nanos: 0 }),
                account_id: Some(AccountId {
                    account_num: payer,
                    ..Default::default()
                }),
                ..Default::default()
            }),
            memo: "hello".to_string(),
            data: Some(Data::CryptoTransfer(CryptoTransferBody::default())),
            ..Default::default()
        }
    }

    fn record(status: i32, seconds: i64) -> TransactionRecord {
        TransactionRecord {
            receipt: Some(TransactionReceipt {
                status,
                ..Default::default()
            }),
            consensus_timestamp: Some(Timestamp { seconds, nanos: 7 }),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_signed_transaction() {
        let item = RecordItem::from_parts(3, &body(1001), &record(22, 100)).unwrap();

        assert_eq!(item.index(), 3);
        assert_eq!(item.consensus_timestamp(), 100_000_000_007);
        assert_eq!(item.transaction_type(), TransactionType::CryptoTransfer);
        assert!(item.is_successful());
        assert_eq!(item.payer(), Some(EntityId::encode(0, 0, 1001).unwrap()));
        assert_eq!(item.body().memo, "hello");
        assert_eq!(item.entity_ids().len(), 1);
    }

    #[test]
    fn test_decode_legacy_body_bytes() {
        let transaction = Transaction {
            body_bytes: body(2).encode_to_vec(),
            ..Default::default()
        };
        let item = RecordItem::decode(
            0,
            &transaction.encode_to_vec(),
            &record(10, 5).encode_to_vec(),
        )
        .unwrap();

        assert_eq!(item.transaction_type(), TransactionType::CryptoTransfer);
        assert!(!item.is_successful());
        assert_eq!(item.status(), ResponseCode::INSUFFICIENT_PAYER_BALANCE);
    }

    #[test]
    fn test_missing_consensus_timestamp_is_rejected() {
        let mut rec = record(22, 1);
        rec.consensus_timestamp = None;
        let err = RecordItem::from_parts(4, &body(1), &rec).unwrap_err();
        assert!(matches!(err, StreamFileError::InvalidItem { index: 4, .. }));
    }

    #[test]
    fn test_garbage_transaction_is_rejected() {
        let err = RecordItem::decode(0, &[0xff, 0xff, 0xff], &record(22, 1).encode_to_vec())
            .unwrap_err();
        assert!(matches!(err, StreamFileError::InvalidItem { .. }));
    }

    #[test]
    fn test_add_entity_id_ignores_empty() {
        let mut item = RecordItem::from_parts(0, &body(1001), &record(22, 1)).unwrap();
        item.add_entity_id(EntityId::EMPTY);
        item.add_entity_id(EntityId::encode(0, 0, 98).unwrap());
        assert_eq!(item.entity_ids().len(), 2);
    }
}

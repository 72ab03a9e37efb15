//! # Parser Context
//!
//! Accumulates every mutation produced while one stream file is parsed. The
//! persistence layer receives the context as a whole and commits it in one
//! batch.

use crate::domain::entities::{
    CryptoAllowance, Entity, Nft, NftAllowance, Node, Schedule, Token, TokenAccount, TokenAirdrop,
    TokenAllowance,
};
use crate::domain::records::{
    AccountBalance, ContractResult, CryptoTransfer, EntityTransaction, FileData, NodeStake,
    TokenBalance, TokenTransfer, TopicMessage, TopicMessageLookup, TransactionRow,
};
use crate::domain::row::{Row, RowSet};
use mn_01_address_book::AddressBookStage;
use shared_types::ConsensusTimestamp;

/// Access to the row set of one table.
pub trait TableOf<R: Row> {
    fn rows(&self) -> &RowSet<R>;
    fn rows_mut(&mut self) -> &mut RowSet<R>;
}

/// Walks every table of a [`Tables`] value in declaration order.
pub trait TableVisitor {
    type Error;

    fn visit<R: Row>(&mut self, rows: &RowSet<R>) -> Result<(), Self::Error>;
}

macro_rules! parser_tables {
    ($($field:ident: $row:ty,)*) => {
        /// One row set per table.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Tables {
            $(pub $field: RowSet<$row>,)*
        }

        $(
            impl TableOf<$row> for Tables {
                fn rows(&self) -> &RowSet<$row> {
                    &self.$field
                }

                fn rows_mut(&mut self) -> &mut RowSet<$row> {
                    &mut self.$field
                }
            }
        )*

        impl Tables {
            pub fn visit<V: TableVisitor>(&self, visitor: &mut V) -> Result<(), V::Error> {
                $(visitor.visit(&self.$field)?;)*
                Ok(())
            }

            /// Mutations across all tables.
            pub fn mutations(&self) -> usize {
                0 $(+ self.$field.mutations())*
            }
        }
    };
}

// Entity first: later tables may reference entities created in the same file.
parser_tables! {
    entities: Entity,
    tokens: Token,
    token_accounts: TokenAccount,
    token_airdrops: TokenAirdrop,
    nfts: Nft,
    crypto_allowances: CryptoAllowance,
    token_allowances: TokenAllowance,
    nft_allowances: NftAllowance,
    nodes: Node,
    schedules: Schedule,
    transactions: TransactionRow,
    entity_transactions: EntityTransaction,
    crypto_transfers: CryptoTransfer,
    token_transfers: TokenTransfer,
    topic_messages: TopicMessage,
    topic_message_lookups: TopicMessageLookup,
    contract_results: ContractResult,
    file_data: FileData,
    node_stakes: NodeStake,
    account_balances: AccountBalance,
    token_balances: TokenBalance,
}

/// Everything one parsed file wants persisted.
#[derive(Debug, Clone, Default)]
pub struct ParserContext {
    tables: Tables,
    stage: Option<AddressBookStage>,
    items: usize,
    recoverable_errors: usize,
    last_consensus_timestamp: Option<ConsensusTimestamp>,
}

impl ParserContext {
    pub fn new(stage: Option<AddressBookStage>) -> Self {
        Self {
            stage,
            ..Self::default()
        }
    }

    pub fn add<R: Row>(&mut self, row: R)
    where
        Tables: TableOf<R>,
    {
        self.tables.rows_mut().add(row);
    }

    pub fn rows<R: Row>(&self) -> &RowSet<R>
    where
        Tables: TableOf<R>,
    {
        self.tables.rows()
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn stage(&self) -> Option<&AddressBookStage> {
        self.stage.as_ref()
    }

    pub fn stage_mut(&mut self) -> Option<&mut AddressBookStage> {
        self.stage.as_mut()
    }

    pub(crate) fn record_item(&mut self, consensus_timestamp: ConsensusTimestamp) {
        self.items += 1;
        self.last_consensus_timestamp = Some(consensus_timestamp);
    }

    pub(crate) fn record_recoverable(&mut self) {
        self.recoverable_errors += 1;
    }

    pub fn last_consensus_timestamp(&self) -> Option<ConsensusTimestamp> {
        self.last_consensus_timestamp
    }

    /// Items dispatched into this context.
    pub fn items(&self) -> usize {
        self.items
    }

    pub fn recoverable_errors(&self) -> usize {
        self.recoverable_errors
    }

    pub fn mutations(&self) -> usize {
        self.tables.mutations()
    }

    pub fn into_parts(self) -> (Tables, Option<AddressBookStage>) {
        (self.tables, self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::row::Table;
    use shared_types::{EntityId, Patch};

    struct Names(Vec<Table>);

    impl TableVisitor for Names {
        type Error = ();

        fn visit<R: Row>(&mut self, rows: &RowSet<R>) -> Result<(), ()> {
            if !rows.is_empty() {
                self.0.push(R::TABLE);
            }
            Ok(())
        }
    }

    #[test]
    fn test_rows_land_in_their_table() {
        let id = EntityId::encode(0, 0, 1001).unwrap();
        let mut context = ParserContext::default();
        let mut entity = Entity::new(id, 10);
        entity.memo = Patch::Set("m".to_string());
        context.add(entity);
        context.add(FileData {
            consensus_timestamp: 10,
            entity_id: id,
            transaction_type: mn_03_stream_files::TransactionType::FileCreate,
            file_data: vec![1],
        });

        assert_eq!(context.rows::<Entity>().len(), 1);
        assert_eq!(context.rows::<FileData>().len(), 1);
        assert!(context.rows::<Token>().is_empty());
        assert_eq!(context.mutations(), 2);

        let mut names = Names(vec![]);
        context.tables().visit(&mut names).unwrap();
        assert_eq!(names.0, vec![Table::Entity, Table::FileData]);
    }

    #[test]
    fn test_visit_covers_every_table() {
        struct All(Vec<Table>);
        impl TableVisitor for All {
            type Error = ();
            fn visit<R: Row>(&mut self, _rows: &RowSet<R>) -> Result<(), ()> {
                self.0.push(R::TABLE);
                Ok(())
            }
        }
        let mut all = All(vec![]);
        Tables::default().visit(&mut all).unwrap();
        let mut expected = Table::ALL.to_vec();
        expected.sort();
        all.0.sort();
        assert_eq!(all.0, expected);
    }
}

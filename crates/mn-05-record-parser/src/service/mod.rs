//! # Record Parser Service
//!
//! Implements [`RecordParserApi`]: every item of a record file is routed to
//! the handler of its kind and the resulting rows are folded into one
//! [`ParserContext`].

mod dispatch;
pub mod entity_id;


use crate::domain::config::ParserConfig;
use crate::domain::context::ParserContext;
use crate::domain::errors::ParserError;
use crate::domain::records::{AccountBalance, TokenBalance};
use crate::handlers::{HandlerContext, HandlerRegistry};
use crate::ports::inbound::RecordParserApi;
use crate::ports::outbound::EntityLookup;
use entity_id::EntityIdService;
use mirror_telemetry::metrics::{self, ParseTimer};
use mn_01_address_book::AddressBookStage;
use mn_03_stream_files::{AccountBalanceFile, RecordFile};
use std::sync::Arc;
use tracing::{debug, info};

pub struct RecordFileParser {
    registry: HandlerRegistry,
    entity_ids: EntityIdService,
    config: ParserConfig,
}

impl RecordFileParser {
    pub fn new(config: ParserConfig, lookup: Arc<dyn EntityLookup>) -> Result<Self, ParserError> {
        Ok(Self {
            registry: HandlerRegistry::new()?,
            entity_ids: EntityIdService::new(lookup, config.entity_id_cache_size),
            config,
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn entity_ids(&self) -> &EntityIdService {
        &self.entity_ids
    }
}

impl RecordParserApi for RecordFileParser {
    fn parse_record_file(
        &self,
        file: &RecordFile,
        stage: Option<AddressBookStage>,
    ) -> Result<ParserContext, ParserError> {
        let _timer = ParseTimer::start("record");
        let mut context = ParserContext::new(stage);

        for item in &file.items {
            let consensus_timestamp = item.consensus_timestamp();
            if let Some(previous) = context.last_consensus_timestamp() {
                if consensus_timestamp <= previous {
                    return Err(ParserError::NonMonotonic {
                        previous,
                        consensus_timestamp,
                    });
                }
            }

            let transaction_type = item.transaction_type();
            let handler = self.registry.get(transaction_type);
            let mut item = item.clone();
            {
                let mut ctx = HandlerContext::new(&self.entity_ids, &mut context, &self.config);
                dispatch::dispatch(handler, &mut item, &mut ctx)?;
            }
            context.record_item(consensus_timestamp);
            metrics::record_item_parsed(&transaction_type.to_string());
            debug!(
                consensus_timestamp,
                transaction_type = %transaction_type,
                entities = item.entity_ids().len(),
                "Dispatched record item"
            );
        }

        info!(
            file = %file.name,
            items = context.items(),
            mutations = context.mutations(),
            recoverable_errors = context.recoverable_errors(),
            "Parsed record file"
        );
        Ok(context)
    }

    fn parse_balance_file(&self, file: &AccountBalanceFile) -> Result<ParserContext, ParserError> {
        let _timer = ParseTimer::start("balance");
        let consensus_timestamp = file.consensus_timestamp;
        let mut context = ParserContext::default();

        for balance in &file.balances {
            context.add(AccountBalance {
                consensus_timestamp,
                account_id: balance.account_id,
                balance: balance.balance,
            });
            for token in &balance.token_balances {
                context.add(TokenBalance {
                    consensus_timestamp,
                    account_id: balance.account_id,
                    token_id: token.token_id,
                    balance: token.balance,
                });
            }
        }

        info!(
            file = %file.name,
            accounts = file.balances.len(),
            mutations = context.mutations(),
            "Parsed balance file"
        );
        Ok(context)
    }
}

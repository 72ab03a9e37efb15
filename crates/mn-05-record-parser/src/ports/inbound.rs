//! # Inbound Ports (Driving Ports)

use crate::domain::context::ParserContext;
use crate::domain::errors::ParserError;
use mn_01_address_book::AddressBookStage;
use mn_03_stream_files::{AccountBalanceFile, RecordFile};

pub trait RecordParserApi: Send + Sync {
    /// Dispatches every item of `file` in order.
    ///
    /// Address book file updates are applied to `stage`, which comes back
    /// inside the returned context. Nothing is persisted here.
    fn parse_record_file(
        &self,
        file: &RecordFile,
        stage: Option<AddressBookStage>,
    ) -> Result<ParserContext, ParserError>;

    /// Maps a balance snapshot to balance rows.
    fn parse_balance_file(&self, file: &AccountBalanceFile) -> Result<ParserContext, ParserError>;
}

//! Domain layer: typed stream files, record items and transaction kinds.

pub mod errors;
pub mod record_item;
pub mod response_code;
pub mod stream_file;
pub mod transaction_type;

//! Receipt status codes.
//!
//! Only the codes the importer branches on are named. Any other status is
//! carried through as its raw `i32`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponseCode(pub i32);

impl ResponseCode {
    pub const OK: ResponseCode = ResponseCode(0);
    pub const INVALID_TRANSACTION: ResponseCode = ResponseCode(1);
    pub const INVALID_SIGNATURE: ResponseCode = ResponseCode(7);
    pub const INSUFFICIENT_PAYER_BALANCE: ResponseCode = ResponseCode(10);
    pub const INVALID_ACCOUNT_ID: ResponseCode = ResponseCode(15);
    pub const SUCCESS: ResponseCode = ResponseCode(22);
    pub const FEE_SCHEDULE_FILE_PART_UPLOADED: ResponseCode = ResponseCode(104);
    pub const SUCCESS_BUT_MISSING_EXPECTED_OPERATION: ResponseCode = ResponseCode(220);

    /// Whether the transaction's effects were applied to ledger state.
    pub fn is_successful(&self) -> bool {
        matches!(
            *self,
            ResponseCode::SUCCESS
                | ResponseCode::FEE_SCHEDULE_FILE_PART_UPLOADED
                | ResponseCode::SUCCESS_BUT_MISSING_EXPECTED_OPERATION
        )
    }

    pub fn code(&self) -> i32 {
        self.0
    }
}

impl From<i32> for ResponseCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_codes() {
        assert!(ResponseCode::SUCCESS.is_successful());
        assert!(ResponseCode::from(104).is_successful());
        assert!(ResponseCode::from(220).is_successful());
        assert!(!ResponseCode::INSUFFICIENT_PAYER_BALANCE.is_successful());
        assert!(!ResponseCode::OK.is_successful());
    }
}

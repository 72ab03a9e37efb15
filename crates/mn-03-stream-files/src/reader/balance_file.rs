//! Account balance files: `u32 version (= 1)` then `AllAccountBalances`.

use super::{malformed, split_version, StreamFileReader};
use crate::domain::errors::StreamFileError;
use crate::domain::stream_file::{
    AccountBalance, AccountBalanceFile, StreamFileData, TokenBalance,
};
use crate::proto::{AllAccountBalances, SingleAccountBalances};
use prost::Message;
use tracing::debug;

pub const BALANCE_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceFileReader;

impl StreamFileReader for BalanceFileReader {
    type File = AccountBalanceFile;

    fn read(&self, data: &StreamFileData) -> Result<AccountBalanceFile, StreamFileError> {
        let filename = data.name();
        let (version, body) = split_version(&filename, data.bytes())?;
        if version != BALANCE_FILE_VERSION {
            return Err(StreamFileError::UnsupportedVersion { filename, version });
        }

        let decoded = AllAccountBalances::decode(body).map_err(|e| malformed(&filename, e))?;
        let consensus_timestamp = decoded
            .consensus_timestamp
            .as_ref()
            .map(|ts| ts.to_nanos())
            .ok_or_else(|| malformed(&filename, "missing consensus timestamp"))?;
        let balances = decoded
            .all_accounts
            .iter()
            .map(|account| account_balance(&filename, account))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(filename = %filename, count = balances.len(), "Read balance file");

        Ok(AccountBalanceFile {
            name: filename,
            version,
            consensus_timestamp,
            file_hash: data.hash(),
            size: data.len(),
            node: None,
            balances,
        })
    }
}

fn account_balance(
    filename: &str,
    account: &SingleAccountBalances,
) -> Result<AccountBalance, StreamFileError> {
    let account_id = account
        .account_id
        .as_ref()
        .ok_or_else(|| malformed(filename, "balance without account id"))?
        .to_entity_id()?
        .ok_or_else(|| malformed(filename, "balance keyed by alias"))?;
    let balance = to_signed(filename, account.hbar_balance)?;
    let token_balances = account
        .token_unit_balances
        .iter()
        .map(|token| -> Result<TokenBalance, StreamFileError> {
            let token_id = token
                .token_id
                .as_ref()
                .ok_or_else(|| malformed(filename, "token balance without token id"))?
                .to_entity_id()?;
            Ok(TokenBalance {
                token_id,
                balance: to_signed(filename, token.balance)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AccountBalance {
        account_id,
        balance,
        token_balances,
    })
}

fn to_signed(filename: &str, value: u64) -> Result<i64, StreamFileError> {
    i64::try_from(value).map_err(|_| malformed(filename, format!("balance {value} overflows")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stream_file::StreamFile;
    use crate::reader::BalanceFileWriter;
    use shared_types::{sha384, EntityId, StreamFilename, StreamType};

    fn data(bytes: Vec<u8>) -> StreamFileData {
        StreamFileData::new(StreamFilename::data(StreamType::Balance, 0), bytes).unwrap()
    }

    #[test]
    fn test_read_balances() {
        let account = EntityId::encode(0, 0, 2).unwrap();
        let token = EntityId::encode(0, 0, 1000).unwrap();
        let bytes = BalanceFileWriter::new(1_700_000_000_000_000_000)
            .account(account, 500, &[(token, 7)])
            .build();

        let file = BalanceFileReader.read(&data(bytes.clone())).unwrap();
        assert_eq!(file.consensus_timestamp, 1_700_000_000_000_000_000);
        assert_eq!(file.count(), 1);
        assert_eq!(file.balances[0].account_id, account);
        assert_eq!(file.balances[0].balance, 500);
        assert_eq!(
            file.balances[0].token_balances,
            vec![TokenBalance {
                token_id: token,
                balance: 7
            }]
        );
        assert_eq!(file.file_hash(), sha384(&[&bytes]));
    }

    #[test]
    fn test_wrong_version_rejected() {
        let mut bytes = BalanceFileWriter::new(1).build();
        bytes[3] = 6;
        assert!(matches!(
            BalanceFileReader.read(&data(bytes)),
            Err(StreamFileError::UnsupportedVersion { version: 6, .. })
        ));
    }

    #[test]
    fn test_overflowing_balance_rejected() {
        let bytes = BalanceFileWriter::new(1)
            .account(EntityId::encode(0, 0, 2).unwrap(), u64::MAX, &[])
            .build();
        assert!(matches!(
            BalanceFileReader.read(&data(bytes)),
            Err(StreamFileError::Malformed { .. })
        ));
    }
}

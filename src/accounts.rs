use std::path::Path;
use std::str::FromStr;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use eyre::{Result, WrapErr};

use crate::error::InputError;

#[derive(Debug, Clone)]
pub struct Account {
    /// 1-based position in the key file, used in every log line.
    pub index: usize,
    pub signer: PrivateKeySigner,
}

impl Account {
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// 0-based slot for proxy assignment.
    pub fn slot(&self) -> usize {
        self.index - 1
    }
}

/// Keys read from the key file, split into usable accounts and the lines that
/// were rejected. Rejected lines keep their index so numbering stays stable.
#[derive(Debug, Default)]
pub struct AccountBatch {
    pub accounts: Vec<Account>,
    pub rejected: Vec<(usize, InputError)>,
}

impl AccountBatch {
    pub fn total(&self) -> usize {
        self.accounts.len() + self.rejected.len()
    }
}

/// Non-empty lines of a text file, trimmed.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn load_accounts<P: AsRef<Path>>(path: P) -> Result<AccountBatch> {
    Ok(parse_accounts(&read_lines(path)?))
}

pub fn parse_accounts(lines: &[String]) -> AccountBatch {
    let mut batch = AccountBatch::default();
    for (i, line) in lines.iter().enumerate() {
        let index = i + 1;
        match parse_key(line) {
            Ok(signer) => batch.accounts.push(Account { index, signer }),
            Err(e) => batch.rejected.push((index, e)),
        }
    }
    batch
}

pub fn parse_key(raw: &str) -> Result<PrivateKeySigner, InputError> {
    let key = raw.trim();
    let well_formed = key.len() == 64 || (key.len() == 66 && key.starts_with("0x"));
    if !well_formed {
        return Err(InputError::InvalidKeyLength(key.len()));
    }
    PrivateKeySigner::from_str(key).map_err(|e| InputError::InvalidKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Anvil's first dev account.
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn accepts_bare_and_prefixed_keys() {
        let expected = Address::from_str(DEV_ADDRESS).unwrap();
        assert_eq!(parse_key(DEV_KEY).unwrap().address(), expected);
        assert_eq!(parse_key(&format!("0x{DEV_KEY}")).unwrap().address(), expected);
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(parse_key("abc").unwrap_err(), InputError::InvalidKeyLength(3));
        // 66 chars without the 0x prefix
        let padded = format!("zz{DEV_KEY}");
        assert_eq!(parse_key(&padded).unwrap_err(), InputError::InvalidKeyLength(66));
    }

    #[test]
    fn rejects_non_hex_key() {
        let bad = "g".repeat(64);
        assert!(matches!(parse_key(&bad), Err(InputError::InvalidKey(_))));
    }

    #[test]
    fn rejected_lines_keep_numbering() {
        let lines = vec!["short".to_string(), DEV_KEY.to_string()];
        let batch = parse_accounts(&lines);
        assert_eq!(batch.total(), 2);
        assert_eq!(batch.rejected[0].0, 1);
        assert_eq!(batch.accounts[0].index, 2);
        assert_eq!(batch.accounts[0].slot(), 1);
    }
}

use alloy::primitives::{TxHash, U256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid answer {answer:?}. Expected one of: {expected}")]
    InvalidChoice { answer: String, expected: String },

    #[error("Invalid choice(s) {0:?}. Enter menu numbers such as 1,3,5 or 'all'")]
    InvalidSelection(String),

    #[error("Invalid private key length: {0} characters")]
    InvalidKeyLength(usize),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Proxy list is empty. Add proxies to the proxy file and try again")]
    EmptyProxyList,

    #[error("Not enough proxies for {keys} accounts, only {proxies} available")]
    NotEnoughProxies { keys: usize, proxies: usize },

    #[error("Invalid proxy {proxy}: {message}")]
    InvalidProxy { proxy: String, message: String },
}

#[derive(Error, Debug)]
pub enum TxError {
    #[error("Transaction reverted. Hash: {0}")]
    Reverted(TxHash),

    #[error(
        "Borrow transaction {hash} was mined, but balance did not increase \
         ({before} -> {after}). Check collateral requirements"
    )]
    BalanceNotIncreased {
        hash: TxHash,
        before: U256,
        after: U256,
    },
}

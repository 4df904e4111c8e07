//! In-memory chain used by the action and runner tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use alloy::primitives::{Address, TxHash, U256, address};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use eyre::{Result, eyre};

use crate::client::Chain;
use crate::config::Config;

pub const OWNER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// A transaction handed to [`FakeChain::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub to: Option<Address>,
    /// `None` for plain value transfers.
    pub selector: Option<[u8; 4]>,
    pub value: Option<U256>,
}

#[derive(Debug)]
pub struct FakeState {
    pub token_balance: U256,
    /// Added to the token balance after every read.
    pub balance_step: U256,
    pub balance_reads: usize,
    pub allowance: U256,
    /// `None` makes the liquidity lookup fail.
    pub liquidity: Option<U256>,
    /// Scripted outcomes per selector, `false` meaning failure. Selectors
    /// without a script (or with an exhausted one) always succeed.
    pub outcomes: HashMap<[u8; 4], VecDeque<bool>>,
    pub sent: Vec<Sent>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            token_balance: U256::from(10_000_000u64),
            balance_step: U256::ZERO,
            balance_reads: 0,
            allowance: U256::MAX,
            liquidity: Some(U256::from(1u64)),
            outcomes: HashMap::new(),
            sent: Vec::new(),
        }
    }
}

pub struct FakeChain {
    address: Address,
    pub state: Mutex<FakeState>,
}

impl FakeChain {
    pub fn new(state: FakeState) -> Self {
        Self::with_address(OWNER, state)
    }

    pub fn with_address(address: Address, state: FakeState) -> Self {
        Self {
            address,
            state: Mutex::new(state),
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn selectors(&self) -> Vec<Option<[u8; 4]>> {
        self.sent().into_iter().map(|sent| sent.selector).collect()
    }

    pub fn balance_reads(&self) -> usize {
        self.state.lock().unwrap().balance_reads
    }
}

/// Outcome script for [`FakeState::outcomes`].
pub fn script(outcomes: &[bool]) -> VecDeque<bool> {
    outcomes.iter().copied().collect()
}

/// Config with every pause set to zero.
pub fn quick_config() -> Config {
    Config {
        retry_delay_ms: 0,
        settle_delay_ms: 0,
        ..Config::default()
    }
}

#[async_trait]
impl Chain for FakeChain {
    fn address(&self) -> Address {
        self.address
    }

    async fn native_balance(&self) -> Result<U256> {
        Ok(U256::from(10u64.pow(18)))
    }

    async fn token_balance(&self, _token: Address) -> Result<U256> {
        let mut state = self.state.lock().unwrap();
        state.balance_reads += 1;
        let balance = state.token_balance;
        state.token_balance = balance + state.balance_step;
        Ok(balance)
    }

    async fn allowance(&self, _token: Address, _spender: Address) -> Result<U256> {
        Ok(self.state.lock().unwrap().allowance)
    }

    async fn account_liquidity(&self) -> Result<U256> {
        self.state
            .lock()
            .unwrap()
            .liquidity
            .ok_or_else(|| eyre!("comptroller unavailable"))
    }

    async fn send(&self, tx: TransactionRequest) -> Result<TxHash> {
        let selector = tx
            .input
            .input()
            .filter(|data| data.len() >= 4)
            .map(|data| [data[0], data[1], data[2], data[3]]);
        let to = tx.to.and_then(|kind| kind.to().copied());

        let mut state = self.state.lock().unwrap();
        state.sent.push(Sent {
            to,
            selector,
            value: tx.value,
        });
        let succeeded = selector
            .and_then(|selector| state.outcomes.get_mut(&selector))
            .and_then(VecDeque::pop_front)
            .unwrap_or(true);
        if succeeded {
            Ok(TxHash::with_last_byte(state.sent.len() as u8))
        } else {
            Err(eyre!("execution reverted"))
        }
    }
}

use std::time::Duration;

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use reqwest::Url;

use crate::accounts::Account;
use crate::contracts::{COMPTROLLER_ADDRESS, IComptroller, IERC20};
use crate::error::TxError;

/// What the actions need from the chain for one account.
#[async_trait]
pub trait Chain: Send + Sync {
    fn address(&self) -> Address;

    async fn native_balance(&self) -> Result<U256>;

    async fn token_balance(&self, token: Address) -> Result<U256>;

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256>;

    /// Liquidity the comptroller reports for this account.
    async fn account_liquidity(&self) -> Result<U256>;

    /// Submit `tx` from this account and wait for it to be mined. A reverted
    /// receipt is an error carrying the hash.
    async fn send(&self, tx: TransactionRequest) -> Result<TxHash>;
}

/// One account's view of the chain: its signer wired into a filling provider.
pub struct ChainClient {
    provider: DynProvider,
    account: Account,
    receipt_timeout: Duration,
}

impl ChainClient {
    /// Gas, nonce and chain id are filled per transaction, so every retry
    /// picks up a fresh nonce and estimate.
    pub fn connect(rpc_url: &Url, account: Account, receipt_timeout: Duration) -> Self {
        let wallet = EthereumWallet::from(account.signer.clone());
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .with_gas_estimation()
            .with_simple_nonce_management()
            .fetch_chain_id()
            .wallet(wallet)
            .connect_http(rpc_url.clone())
            .erased();
        Self {
            provider,
            account,
            receipt_timeout,
        }
    }
}

#[async_trait]
impl Chain for ChainClient {
    fn address(&self) -> Address {
        self.account.address()
    }

    async fn native_balance(&self) -> Result<U256> {
        Ok(self.provider.get_balance(self.address()).await?)
    }

    async fn token_balance(&self, token: Address) -> Result<U256> {
        let erc20 = IERC20::new(token, &self.provider);
        erc20
            .balanceOf(self.address())
            .call()
            .await
            .wrap_err_with(|| format!("failed to read balance of {token}"))
    }

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256> {
        let erc20 = IERC20::new(token, &self.provider);
        erc20
            .allowance(self.address(), spender)
            .call()
            .await
            .wrap_err_with(|| format!("failed to read allowance of {token} for {spender}"))
    }

    async fn account_liquidity(&self) -> Result<U256> {
        let comptroller = IComptroller::new(COMPTROLLER_ADDRESS, &self.provider);
        let liquidity = comptroller
            .getAccountLiquidity(self.address())
            .call()
            .await
            .wrap_err("failed to read account liquidity")?;
        Ok(liquidity.liquidity)
    }

    async fn send(&self, tx: TransactionRequest) -> Result<TxHash> {
        let tx = tx.with_from(self.address());
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .wrap_err("failed to submit transaction")?;
        let hash = *pending.tx_hash();
        let receipt = pending
            .with_timeout(Some(self.receipt_timeout))
            .get_receipt()
            .await
            .wrap_err_with(|| {
                format!(
                    "no receipt for {hash} within {}s",
                    self.receipt_timeout.as_secs()
                )
            })?;
        if !receipt.status() {
            return Err(TxError::Reverted(receipt.transaction_hash).into());
        }
        Ok(receipt.transaction_hash)
    }
}

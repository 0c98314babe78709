//! Administrative calls against an already deployed factory & pool
//!
//! These calls are idempotent setters; they are re-issued on every invocation.

use alloy_primitives::{Address, U256};
use itertools::Itertools;
use tracing::{info, warn};

use crate::{
    client::ChainClient,
    constants::{FACTORY_KEY, ORACLE_KEY, POOL_KEY, POOL_TEMPLATE_KEY},
    deploy::Deployer,
    errors::ScriptError,
    solidity::{
        ID3MMFactory::{
            _D3_LOGIC_Call, _ORACLE_Call, addLiquidatorCall, setD3LogicCall, setOracleCall,
        },
        IERC20Mock::{decimalsCall, mintCall},
        ID3MM::{
            executeEpochUpdateCall, getTokenListCall, lpDepositCall, ownerDepositCall,
            ownerWithdrawCall, setMaxDepositCall, setNextEpochCall,
        },
    },
    types::EpochRates,
};

impl<C: ChainClient> Deployer<C> {
    /// Point the factory at the recorded pool template
    pub async fn set_pool_template(&self) -> Result<(), ScriptError> {
        let template = self.record().require(POOL_TEMPLATE_KEY)?;
        let factory = self.contract(FACTORY_KEY)?;

        let current = factory.read(_D3_LOGIC_Call {}).await?;
        info!(%current, new = %template, "replacing pool template");

        factory.send(setD3LogicCall { logic: template }).await?;
        Ok(())
    }

    /// Point the factory at the recorded oracle
    pub async fn set_factory_oracle(&self) -> Result<(), ScriptError> {
        let oracle = self.record().require(ORACLE_KEY)?;
        let factory = self.contract(FACTORY_KEY)?;

        let current = factory.read(_ORACLE_Call {}).await?;
        info!(%current, new = %oracle, "replacing factory oracle");

        factory.send(setOracleCall { oracle }).await?;
        Ok(())
    }

    /// Whitelist a liquidator on the factory
    pub async fn add_liquidator(&self, account: Address) -> Result<(), ScriptError> {
        self.contract(FACTORY_KEY)?
            .send(addLiquidatorCall { account })
            .await?;
        Ok(())
    }

    /// Set the interest rates the pool applies from its next epoch
    ///
    /// Pool tokens left out of `rates` keep their current rate; they are
    /// reported but not rejected.
    pub async fn set_interest_rates(&self, rates: EpochRates) -> Result<(), ScriptError> {
        let pool = self.contract(POOL_KEY)?;

        let pool_tokens = pool.read(getTokenListCall {}).await?;
        let missing = rates.missing_from(&pool_tokens);
        if !missing.is_empty() {
            warn!(
                missing = %missing.iter().map(|t| format!("{t:#x}")).join(", "),
                "pool tokens without a new interest rate"
            );
        }

        pool.send(setNextEpochCall::from(rates)).await?;
        Ok(())
    }

    /// Roll the pool into its next epoch
    pub async fn execute_epoch_update(&self) -> Result<(), ScriptError> {
        self.contract(POOL_KEY)?
            .send(executeEpochUpdateCall {})
            .await?;
        Ok(())
    }

    /// Set the maximum deposit of each token, one transaction per token
    pub async fn set_max_deposits(&self, limits: &[(Address, U256)]) -> Result<(), ScriptError> {
        let pool = self.contract(POOL_KEY)?;
        for (token, max_deposit) in limits {
            info!(token = %token, %max_deposit, "setting max deposit");
            pool.send(setMaxDepositCall {
                token: *token,
                maxDeposit: *max_deposit,
            })
            .await?;
        }

        Ok(())
    }

    /// Mint `amount` of a mock token straight to the pool & book it as an owner deposit
    pub async fn owner_deposit(&self, token: Address, amount: U256) -> Result<(), ScriptError> {
        let pool = self.contract(POOL_KEY)?;
        self.mint(token, pool.address(), amount).await?;

        pool.send(ownerDepositCall { token }).await?;
        Ok(())
    }

    /// Mint `amount` of a mock token straight to the pool & book it as a deposit of `lp`
    pub async fn lp_deposit(
        &self,
        lp: Address,
        token: Address,
        amount: U256,
    ) -> Result<(), ScriptError> {
        let pool = self.contract(POOL_KEY)?;
        self.mint(token, pool.address(), amount).await?;

        pool.send(lpDepositCall { lp, token }).await?;
        Ok(())
    }

    /// Withdraw the owner's funds from the pool to `to`
    pub async fn owner_withdraw(
        &self,
        to: Address,
        token: Address,
        amount: U256,
    ) -> Result<(), ScriptError> {
        self.contract(POOL_KEY)?
            .send(ownerWithdrawCall { to, token, amount })
            .await?;
        Ok(())
    }

    /// The on-chain decimals of a token
    pub async fn token_decimals(&self, token: Address) -> Result<u8, ScriptError> {
        self.handle("ERC20", token).read(decimalsCall {}).await
    }

    /// Mint a mock token
    async fn mint(&self, token: Address, to: Address, amount: U256) -> Result<(), ScriptError> {
        self.handle("MockERC20", token)
            .send(mintCall { to, amount })
            .await?;
        Ok(())
    }
}

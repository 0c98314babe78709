//! A read-only report of a pool's state

use std::fmt::{self, Display};

use alloy_primitives::{Address, U256};
use tracing::warn;

use crate::{
    client::{ChainClient, ContractHandle},
    constants::{FIXED_POINT_DECIMALS, ORACLE_KEY, POOL_KEY},
    errors::ScriptError,
    solidity::{
        ID3Oracle::getPriceCall,
        IERC20Mock::{balanceOfCall, decimalsCall, symbolCall, totalSupplyCall},
        ID3MM::{
            getAssetInfoCall, getCollateralRatioCall, getD3MMInfoCall, getInterestRateCall,
            getStatusCall, getTokenListCall, getTokenReserveCall, getTotalAssetsValueCall,
            getTotalDebtValueCall,
        },
    },
    utils::{format_fixed, pow10, remove_decimals},
};

/// The pool-level figures of the report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolReport {
    /// The pool's address
    pub pool: Address,
    /// The pool's status code
    pub status: u8,
    /// Collateral ratio, 1e18 scale
    pub collateral_ratio: U256,
    /// Total asset value, 1e18 scale
    pub total_assets: U256,
    /// Total debt value, 1e18 scale
    pub total_debt: U256,
    /// One section per pool token
    pub tokens: Vec<TokenReport>,
}

/// The per-token figures of the report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenReport {
    /// The token's symbol
    pub symbol: String,
    /// The token's address
    pub address: Address,
    /// The token's decimals
    pub decimals: u8,
    /// The pool's internal reserve of the token
    pub reserve: U256,
    /// The pool's actual balance of the token
    pub balance: U256,
    /// The token's pool share token
    pub d3_token: Address,
    /// The pool share token's symbol
    pub d3_token_symbol: String,
    /// The reserve as booked in the asset info
    pub asset_reserve: U256,
    /// The max deposit
    pub max_deposit: U256,
    /// The accrued interest index, 1e18 scale
    pub accrued_interest: U256,
    /// The pool share token's total supply
    pub d3_token_supply: U256,
    /// The current interest rate, 1e18 scale
    pub interest_rate: U256,
    /// The oracle price, scaled to 36 - decimals
    pub price: U256,
}

impl TokenReport {
    /// The amount of the underlying token the outstanding shares are worth
    pub fn worth_origin_amount(&self) -> U256 {
        let one = pow10(FIXED_POINT_DECIMALS);
        self.d3_token_supply.saturating_mul(self.accrued_interest) / one / one
    }

    /// The oracle price normalized to 18 decimals, 4 fractional digits shown
    fn display_price(&self) -> String {
        let correction = pow10(FIXED_POINT_DECIMALS.saturating_sub(self.decimals));
        format_fixed(self.price / correction, FIXED_POINT_DECIMALS, 4)
    }
}

/// The oracle the pool prices its tokens with
///
/// Falls back to `recorded` when the pool's info can't be read.
pub async fn pool_oracle<C: ChainClient>(
    client: &C,
    pool: Address,
    recorded: Option<Address>,
) -> Result<Address, ScriptError> {
    let pool_handle = ContractHandle::new(client, POOL_KEY, pool);
    match pool_handle.read(getD3MMInfoCall {}).await {
        Ok(info) => Ok(info.oracle),
        Err(e) => match recorded {
            Some(oracle) => {
                warn!(error = %e, %oracle, "could not read the pool's oracle, using the recorded one");
                Ok(oracle)
            }
            None => Err(e),
        },
    }
}

/// Read the recorded pool's state through `client`
pub async fn pool_report<C: ChainClient>(
    client: &C,
    pool: Address,
    oracle: Address,
) -> Result<PoolReport, ScriptError> {
    let pool_handle = ContractHandle::new(client, POOL_KEY, pool);
    let oracle_handle = ContractHandle::new(client, ORACLE_KEY, oracle);

    let status = pool_handle.read(getStatusCall {}).await?;
    let collateral_ratio = pool_handle.read(getCollateralRatioCall {}).await?;
    let total_assets = pool_handle.read(getTotalAssetsValueCall {}).await?;
    let total_debt = pool_handle.read(getTotalDebtValueCall {}).await?;

    let mut tokens = Vec::new();
    for token in pool_handle.read(getTokenListCall {}).await? {
        let erc20 = ContractHandle::new(client, "ERC20", token);
        let info = pool_handle.read(getAssetInfoCall { token }).await?;
        let d3_token = ContractHandle::new(client, "D3Token", info.d3Token);

        tokens.push(TokenReport {
            symbol: erc20.read(symbolCall {}).await?,
            address: token,
            decimals: erc20.read(decimalsCall {}).await?,
            reserve: pool_handle.read(getTokenReserveCall { token }).await?,
            balance: erc20.read(balanceOfCall { account: pool }).await?,
            d3_token: info.d3Token,
            d3_token_symbol: d3_token.read(symbolCall {}).await?,
            asset_reserve: info.reserve,
            max_deposit: info.maxDepositAmount,
            accrued_interest: info.accruedInterest,
            d3_token_supply: d3_token.read(totalSupplyCall {}).await?,
            interest_rate: pool_handle.read(getInterestRateCall { token }).await?,
            price: oracle_handle.read(getPriceCall { token }).await?,
        });
    }

    Ok(PoolReport {
        pool,
        status,
        collateral_ratio,
        total_assets,
        total_debt,
        tokens,
    })
}

impl Display for PoolReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pool: {:#x}", self.pool)?;
        writeln!(f, "pool status: {}", self.status)?;
        writeln!(f)?;
        // Ratio is 1e18 scale, so 16 decimals renders it as a percentage
        writeln!(f, "collateral ratio: {}%", format_fixed(self.collateral_ratio, 16, 4))?;
        writeln!(
            f,
            "total asset value: {}",
            remove_decimals(self.total_assets, FIXED_POINT_DECIMALS)
        )?;
        writeln!(
            f,
            "total debt value: {}",
            remove_decimals(self.total_debt, FIXED_POINT_DECIMALS)
        )?;

        for token in &self.tokens {
            writeln!(f)?;
            write!(f, "{token}")?;
        }

        Ok(())
    }
}

impl Display for TokenReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = &self.symbol;

        writeln!(f, "========== {symbol} ==========")?;
        writeln!(f)?;
        writeln!(f, "{symbol}: {:#x}", self.address)?;
        writeln!(f, "decimals: {}", self.decimals)?;
        writeln!(f, "{symbol} reserve: {}", remove_decimals(self.reserve, self.decimals))?;
        writeln!(f, "{symbol} balance: {}", remove_decimals(self.balance, self.decimals))?;
        writeln!(f)?;
        writeln!(f, "[Asset Info]")?;
        writeln!(f, "D3Token: {:#x}", self.d3_token)?;
        writeln!(f, "reserve: {}", remove_decimals(self.asset_reserve, self.decimals))?;
        writeln!(f, "maxDeposit: {}", remove_decimals(self.max_deposit, self.decimals))?;
        writeln!(f, "accruedInterest: {}%", format_fixed(self.accrued_interest, 16, 2))?;
        writeln!(f)?;
        writeln!(f, "[D3Token Info]")?;
        writeln!(f, "{}", self.d3_token_symbol)?;
        writeln!(
            f,
            "total supply: {}",
            remove_decimals(self.d3_token_supply, self.decimals)
        )?;
        writeln!(f, "worth origin amount: {}", self.worth_origin_amount())?;
        writeln!(f)?;
        writeln!(f, "interest rate: {}%", format_fixed(self.interest_rate, 16, 2))?;
        writeln!(f, "price: {}", self.display_price())
    }
}

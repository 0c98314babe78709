//! Implementations of the deploy & admin scripts' commands

use alloy_primitives::{Address, U256};

use crate::{
    cli::{
        AddLiquidatorArgs, AddTokenArgs, DeployArgs, DepositArgs, LpDepositArgs,
        OwnerWithdrawArgs, SetInterestRatesArgs, SetMaxDepositArgs,
    },
    client::ChainClient,
    constants::{FIXED_POINT_DECIMALS, ORACLE_KEY, POOL_KEY, PRICE_DECIMALS},
    deploy::Deployer,
    errors::ScriptError,
    inspect::{pool_oracle, pool_report},
    types::{DeployStep, EpochRates, NewTokenParams},
    utils::{parse_address, parse_amount, resolve_address},
};

/// Run the requested deployment steps, all of them by default
pub async fn deploy<C: ChainClient>(
    args: DeployArgs,
    deployer: &mut Deployer<C>,
) -> Result<(), ScriptError> {
    let liquidators = [args.liquidator1, args.liquidator2]
        .iter()
        .flatten()
        .map(|liquidator| parse_address(liquidator))
        .collect::<Result<Vec<_>, _>>()?;
    deployer.set_liquidators(liquidators);

    let steps = if args.steps.is_empty() {
        DeployStep::all()
    } else {
        args.steps
    };

    deployer.run(&steps).await
}

/// Deploy a token & its price feed and add the token to the pool
pub async fn add_token<C: ChainClient>(
    args: AddTokenArgs,
    deployer: &mut Deployer<C>,
) -> Result<(), ScriptError> {
    let params = NewTokenParams {
        interest_rate: parse_amount(&args.interest_rate, FIXED_POINT_DECIMALS)?,
        max_deposit: parse_amount(&args.max_deposit, args.decimals)?,
        key: args.key,
        name: args.name,
        symbol: args.symbol,
        decimals: args.decimals,
        feed_key: args.feed_key,
        feed_description: args.feed_description,
        feed_decimals: PRICE_DECIMALS,
    };

    deployer.add_token(&params).await.map(drop)
}

/// Whitelist a liquidator
pub async fn add_liquidator<C: ChainClient>(
    args: AddLiquidatorArgs,
    deployer: &Deployer<C>,
) -> Result<(), ScriptError> {
    let account = parse_address(&args.account)?;
    deployer.add_liquidator(account).await
}

/// Set next epoch's interest rates, given as decimal fractions
pub async fn set_interest_rates<C: ChainClient>(
    args: SetInterestRatesArgs,
    deployer: &Deployer<C>,
) -> Result<(), ScriptError> {
    let rates = args
        .rates
        .iter()
        .map(|(token, rate)| {
            Ok((
                resolve_address(deployer.record(), token)?,
                parse_amount(rate, FIXED_POINT_DECIMALS)?,
            ))
        })
        .collect::<Result<Vec<_>, ScriptError>>()?;

    deployer.set_interest_rates(EpochRates(rates)).await
}

/// Set max deposits, given in whole tokens
pub async fn set_max_deposit<C: ChainClient>(
    args: SetMaxDepositArgs,
    deployer: &Deployer<C>,
) -> Result<(), ScriptError> {
    let mut limits = Vec::with_capacity(args.limits.len());
    for (token, amount) in &args.limits {
        limits.push(token_amount(deployer, token, amount).await?);
    }

    deployer.set_max_deposits(&limits).await
}

/// Mint & deposit on behalf of the pool owner, one token at a time
pub async fn owner_deposit<C: ChainClient>(
    args: DepositArgs,
    deployer: &Deployer<C>,
) -> Result<(), ScriptError> {
    for (token, amount) in &args.amounts {
        let (token, amount) = token_amount(deployer, token, amount).await?;
        deployer.owner_deposit(token, amount).await?;
    }

    Ok(())
}

/// Mint & deposit on behalf of a liquidity provider, one token at a time
pub async fn lp_deposit<C: ChainClient>(
    args: LpDepositArgs,
    deployer: &Deployer<C>,
) -> Result<(), ScriptError> {
    let lp = parse_address(&args.lp)?;
    for (token, amount) in &args.deposit.amounts {
        let (token, amount) = token_amount(deployer, token, amount).await?;
        deployer.lp_deposit(lp, token, amount).await?;
    }

    Ok(())
}

/// Withdraw owner funds
pub async fn owner_withdraw<C: ChainClient>(
    args: OwnerWithdrawArgs,
    deployer: &Deployer<C>,
) -> Result<(), ScriptError> {
    let to = parse_address(&args.to)?;
    let (token, amount) = token_amount(deployer, &args.token, &args.amount).await?;

    deployer.owner_withdraw(to, token, amount).await
}

/// Print the recorded pool's report
pub async fn inspect<C: ChainClient>(deployer: &Deployer<C>) -> Result<(), ScriptError> {
    let pool = deployer.record().require(POOL_KEY)?;
    let oracle = pool_oracle(deployer.client(), pool, deployer.record().get(ORACLE_KEY)).await?;

    let report = pool_report(deployer.client(), pool, oracle).await?;
    println!("{report}");

    Ok(())
}

/// Resolve a token argument & scale a whole-token amount by its on-chain decimals
async fn token_amount<C: ChainClient>(
    deployer: &Deployer<C>,
    token: &str,
    amount: &str,
) -> Result<(Address, U256), ScriptError> {
    let token = resolve_address(deployer.record(), token)?;
    let decimals = deployer.token_decimals(token).await?;

    Ok((token, parse_amount(amount, decimals)?))
}

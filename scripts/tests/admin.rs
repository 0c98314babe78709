mod common;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{SolCall, SolValue};
use common::{setup_deployer, test_config, MOCK_POOL};
use eyre::Result;
use scripts::{
    constants::{FACTORY_KEY, ORACLE_KEY, POOL_KEY, POOL_TEMPLATE_KEY},
    deployments::NetworkConfig,
    inspect::{pool_oracle, pool_report},
    solidity::{
        ID3MMFactory::{_D3_LOGIC_Call, _ORACLE_Call, setD3LogicCall, setOracleCall},
        ID3Oracle::getPriceCall,
        IERC20Mock::{balanceOfCall, decimalsCall, mintCall, symbolCall, totalSupplyCall},
        ID3MM::{
            executeEpochUpdateCall, getAssetInfoCall, getCollateralRatioCall, getD3MMInfoCall,
            getInterestRateCall, getStatusCall, getTokenListCall, getTokenReserveCall,
            getTotalAssetsValueCall, getTotalDebtValueCall, lpDepositCall, ownerDepositCall,
            ownerWithdrawCall, setMaxDepositCall, setNextEpochCall,
        },
    },
    types::EpochRates,
    utils::pow10,
};

const WBTC: Address = Address::repeat_byte(0xb1);
const DAI: Address = Address::repeat_byte(0xb3);
const D3_WBTC: Address = Address::repeat_byte(0xd1);
const ORACLE: Address = Address::repeat_byte(0x0a);

/// A config with a bred pool & its oracle recorded
fn pool_config() -> Result<NetworkConfig> {
    let mut config = test_config();
    config.deployed_address.record(POOL_KEY, MOCK_POOL)?;
    config.deployed_address.record(ORACLE_KEY, ORACLE)?;

    Ok(config)
}

// --------------------
// | EPOCH TESTS |
// --------------------

#[tokio::test]
async fn test_partial_interest_rates_are_sent() -> Result<()> {
    let (deployer, chain, _) = setup_deployer(pool_config()?);
    chain.respond(MOCK_POOL, getTokenListCall::SELECTOR, vec![WBTC, DAI]);

    let rate = U256::from(2u64) * pow10(17);
    deployer.set_interest_rates(EpochRates(vec![(DAI, rate)])).await?;

    let sent = chain.sent(setNextEpochCall::SELECTOR);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, MOCK_POOL);

    let call = setNextEpochCall::abi_decode(&sent[0].calldata)?;
    assert_eq!(call.tokenList, vec![DAI]);
    assert_eq!(call.interestRates, vec![rate]);

    Ok(())
}

#[tokio::test]
async fn test_max_deposit_per_token() -> Result<()> {
    let (deployer, chain, _) = setup_deployer(pool_config()?);
    let limits = [(WBTC, U256::from(100u64) * pow10(8)), (DAI, U256::from(5u64) * pow10(18))];

    deployer.set_max_deposits(&limits).await?;

    let sent = chain.sent(setMaxDepositCall::SELECTOR);
    assert_eq!(sent.len(), 2);
    for (tx, (token, limit)) in sent.iter().zip(limits) {
        let call = setMaxDepositCall::abi_decode(&tx.calldata)?;
        assert_eq!((call.token, call.maxDeposit), (token, limit));
    }

    Ok(())
}

#[tokio::test]
async fn test_execute_epoch_update() -> Result<()> {
    let (deployer, chain, _) = setup_deployer(pool_config()?);

    deployer.execute_epoch_update().await?;

    let txs = chain.transactions();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].to, MOCK_POOL);
    assert_eq!(txs[0].selector(), executeEpochUpdateCall::SELECTOR);

    Ok(())
}

// --------------------
// | FUNDING TESTS |
// --------------------

#[tokio::test]
async fn test_owner_deposit_mints_first() -> Result<()> {
    let (deployer, chain, _) = setup_deployer(pool_config()?);
    let amount = U256::from(10u64) * pow10(8);

    deployer.owner_deposit(WBTC, amount).await?;

    let txs = chain.transactions();
    assert_eq!(txs.len(), 2);

    assert_eq!(txs[0].to, WBTC);
    let mint = mintCall::abi_decode(&txs[0].calldata)?;
    assert_eq!((mint.to, mint.amount), (MOCK_POOL, amount));

    assert_eq!(txs[1].to, MOCK_POOL);
    assert_eq!(ownerDepositCall::abi_decode(&txs[1].calldata)?.token, WBTC);

    Ok(())
}

#[tokio::test]
async fn test_lp_deposit_mints_first() -> Result<()> {
    let (deployer, chain, _) = setup_deployer(pool_config()?);
    let lp = Address::repeat_byte(0x1f);
    let amount = U256::from(250u64) * pow10(18);

    deployer.lp_deposit(lp, DAI, amount).await?;

    let txs = chain.transactions();
    assert_eq!(txs.len(), 2);

    assert_eq!(txs[0].to, DAI);
    let mint = mintCall::abi_decode(&txs[0].calldata)?;
    assert_eq!((mint.to, mint.amount), (MOCK_POOL, amount));

    assert_eq!(txs[1].to, MOCK_POOL);
    let deposit = lpDepositCall::abi_decode(&txs[1].calldata)?;
    assert_eq!((deposit.lp, deposit.token), (lp, DAI));

    Ok(())
}

#[tokio::test]
async fn test_owner_withdraw() -> Result<()> {
    let (deployer, chain, _) = setup_deployer(pool_config()?);
    let to = Address::repeat_byte(0x70);
    let amount = U256::from(3u64) * pow10(8);

    deployer.owner_withdraw(to, WBTC, amount).await?;

    let sent = chain.sent(ownerWithdrawCall::SELECTOR);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, MOCK_POOL);

    let call = ownerWithdrawCall::abi_decode(&sent[0].calldata)?;
    assert_eq!((call.to, call.token, call.amount), (to, WBTC, amount));
    // Nothing is minted for a withdrawal
    assert_eq!(chain.transactions().len(), 1);

    Ok(())
}

// -------------------------
// | FACTORY ADMIN TESTS |
// -------------------------

#[tokio::test]
async fn test_set_template() -> Result<()> {
    let mut config = test_config();
    let factory = Address::repeat_byte(0xfa);
    let template = Address::repeat_byte(0x77);
    config.deployed_address.record(FACTORY_KEY, factory)?;
    config.deployed_address.record(POOL_TEMPLATE_KEY, template)?;

    let (deployer, chain, _) = setup_deployer(config);
    chain.respond(factory, _D3_LOGIC_Call::SELECTOR, Address::repeat_byte(0x66));

    deployer.set_pool_template().await?;

    let sent = chain.sent(setD3LogicCall::SELECTOR);
    assert_eq!(sent.len(), 1);
    assert_eq!(setD3LogicCall::abi_decode(&sent[0].calldata)?.logic, template);

    Ok(())
}

#[tokio::test]
async fn test_set_factory_oracle() -> Result<()> {
    let mut config = test_config();
    let factory = Address::repeat_byte(0xfa);
    config.deployed_address.record(FACTORY_KEY, factory)?;
    config.deployed_address.record(ORACLE_KEY, ORACLE)?;

    let (deployer, chain, _) = setup_deployer(config);
    chain.respond(factory, _ORACLE_Call::SELECTOR, Address::repeat_byte(0x0b));

    deployer.set_factory_oracle().await?;

    let sent = chain.sent(setOracleCall::SELECTOR);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, factory);
    assert_eq!(setOracleCall::abi_decode(&sent[0].calldata)?.oracle, ORACLE);

    Ok(())
}

// ------------------
// | REPORT TESTS |
// ------------------

#[tokio::test]
async fn test_report_prices_with_the_pools_oracle() -> Result<()> {
    let (deployer, chain, _) = setup_deployer(pool_config()?);
    let pool_oracle_address = Address::repeat_byte(0x0c);
    chain.respond_raw(
        MOCK_POOL,
        getD3MMInfoCall::SELECTOR,
        (Address::repeat_byte(0xc0), pool_oracle_address).abi_encode_params(),
    );

    let oracle = pool_oracle(deployer.client(), MOCK_POOL, Some(ORACLE)).await?;
    assert_eq!(oracle, pool_oracle_address);

    Ok(())
}

#[tokio::test]
async fn test_report_falls_back_to_the_recorded_oracle() -> Result<()> {
    let (deployer, _, _) = setup_deployer(pool_config()?);

    let oracle = pool_oracle(deployer.client(), MOCK_POOL, Some(ORACLE)).await?;
    assert_eq!(oracle, ORACLE);

    assert!(pool_oracle(deployer.client(), MOCK_POOL, None).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_pool_report() -> Result<()> {
    let (deployer, chain, _) = setup_deployer(pool_config()?);

    chain.respond(MOCK_POOL, getStatusCall::SELECTOR, U256::ZERO);
    chain.respond(
        MOCK_POOL,
        getCollateralRatioCall::SELECTOR,
        U256::from(1_505_678_900_000_000_000u128),
    );
    chain.respond(MOCK_POOL, getTotalAssetsValueCall::SELECTOR, U256::from(1234u64) * pow10(18));
    chain.respond(MOCK_POOL, getTotalDebtValueCall::SELECTOR, U256::from(56u64) * pow10(18));
    chain.respond(MOCK_POOL, getTokenListCall::SELECTOR, vec![WBTC]);
    chain.respond(MOCK_POOL, getTokenReserveCall::SELECTOR, U256::from(10u64) * pow10(8));
    chain.respond(MOCK_POOL, getInterestRateCall::SELECTOR, U256::from(2u64) * pow10(17));
    chain.respond_raw(
        MOCK_POOL,
        getAssetInfoCall::SELECTOR,
        (
            D3_WBTC,
            U256::from(10u64) * pow10(8),
            U256::from(1000u64) * pow10(8),
            pow10(18),
        )
            .abi_encode_params(),
    );

    chain.respond(WBTC, symbolCall::SELECTOR, "WBTC".to_string());
    chain.respond(WBTC, decimalsCall::SELECTOR, U256::from(8u8));
    chain.respond(WBTC, balanceOfCall::SELECTOR, U256::from(12u64) * pow10(8));
    chain.respond(D3_WBTC, symbolCall::SELECTOR, "d3WBTC".to_string());
    chain.respond(D3_WBTC, totalSupplyCall::SELECTOR, U256::from(5u64) * pow10(8));
    chain.respond(ORACLE, getPriceCall::SELECTOR, U256::from(30_000u64) * pow10(28));

    let report = pool_report(deployer.client(), MOCK_POOL, ORACLE).await?;

    assert_eq!(report.tokens.len(), 1);
    let wbtc = &report.tokens[0];
    assert_eq!(wbtc.symbol, "WBTC");
    assert_eq!(wbtc.d3_token, D3_WBTC);
    assert_eq!(wbtc.d3_token_symbol, "d3WBTC");
    assert_eq!(wbtc.max_deposit, U256::from(1000u64) * pow10(8));

    let rendered = report.to_string();
    assert!(rendered.contains("collateral ratio: 150.5678%\n"));
    assert!(rendered.contains("total asset value: 1234\n"));
    assert!(rendered.contains("========== WBTC =========="));
    assert!(rendered.contains("WBTC balance: 12\n"));
    assert!(rendered.contains("d3WBTC\n"));
    assert!(rendered.contains("price: 30000.0000\n"));

    Ok(())
}

//! Type definitions used throughout the scripts

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use alloy::dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use clap::ValueEnum;

use crate::{
    constants::{
        COLLATERAL_CONSTANT, DAI_KEY, DODO_KEY, EPOCH_DURATION_SECS, EPOCH_START_OFFSET_SECS,
        LIQUIDATION_DISCOUNT, MOCK_ERC20_ARTIFACT, NEW_TOKEN_INTEREST_RATE, NEW_TOKEN_MAX_DEPOSIT,
        PRICE_DECIMALS, PRICE_TOLERANCE, WBTC_KEY, WETH_ARTIFACT, WETH_KEY,
    },
    solidity::{ID3MMFactory::breedDODOCall, ID3MM::setNextEpochCall, PriceSource},
};

/// Everything needed to deploy one contract: its artifact, its constructor
/// arguments in declaration order, and the addresses of the libraries it links against
#[derive(Clone, Debug, PartialEq)]
pub struct ContractSpec {
    /// The name of the Hardhat artifact
    pub artifact: String,
    /// The constructor arguments, in declaration order
    pub constructor_args: Vec<DynSolValue>,
    /// Library name -> deployed library address
    pub libraries: BTreeMap<String, Address>,
}

impl ContractSpec {
    /// A spec for a contract with no constructor arguments and no libraries
    pub fn new(artifact: &str) -> Self {
        Self {
            artifact: artifact.to_string(),
            constructor_args: Vec::new(),
            libraries: BTreeMap::new(),
        }
    }

    /// Set the constructor arguments
    pub fn with_args(mut self, args: Vec<DynSolValue>) -> Self {
        self.constructor_args = args;
        self
    }

    /// Link a library at the given address
    pub fn with_library(mut self, name: &str, address: Address) -> Self {
        self.libraries.insert(name.to_string(), address);
        self
    }

    /// The ABI encoding of the constructor arguments, as appended to the creation code
    pub fn encoded_args(&self) -> Vec<u8> {
        if self.constructor_args.is_empty() {
            return Vec::new();
        }

        DynSolValue::Tuple(self.constructor_args.clone()).abi_encode_params()
    }
}

/// The configuration of a token's oracle price source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceSourceConfig {
    /// The Chainlink-compatible feed
    pub feed: Address,
    /// Whether the token may be traded at all
    pub whitelisted: bool,
    /// Allowed price deviation, in 1e18 scale
    pub tolerance: U256,
    /// Decimals of the feed's answer
    pub price_decimals: u8,
    /// Decimals of the token itself; must match the token's on-chain `decimals()`
    pub token_decimals: u8,
}

impl PriceSourceConfig {
    /// A whitelisted source with the default tolerance and 8-decimal USD feed
    pub fn usd_feed(feed: Address, token_decimals: u8) -> Self {
        Self {
            feed,
            whitelisted: true,
            tolerance: U256::from(PRICE_TOLERANCE),
            price_decimals: PRICE_DECIMALS,
            token_decimals,
        }
    }
}

impl From<PriceSourceConfig> for PriceSource {
    fn from(config: PriceSourceConfig) -> Self {
        PriceSource {
            oracle: config.feed,
            isWhitelisted: config.whitelisted,
            priceTolerance: config.tolerance,
            priceDecimal: config.price_decimals,
            tokenDecimal: config.token_decimals,
        }
    }
}

/// The interest rates to apply at the next epoch, sent together in one call
///
/// The on-chain pool only updates the tokens listed here; completeness is not enforced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EpochRates(pub Vec<(Address, U256)>);

impl EpochRates {
    /// The tokens receiving a rate
    pub fn tokens(&self) -> Vec<Address> {
        self.0.iter().map(|(token, _)| *token).collect()
    }

    /// The pool tokens that receive no rate in this update
    pub fn missing_from(&self, pool_tokens: &[Address]) -> Vec<Address> {
        let tokens = self.tokens();
        pool_tokens.iter().filter(|t| !tokens.contains(t)).copied().collect()
    }
}

impl From<EpochRates> for setNextEpochCall {
    fn from(rates: EpochRates) -> Self {
        let (tokens, rates) = rates.0.into_iter().unzip();
        setNextEpochCall {
            tokenList: tokens,
            interestRates: rates,
        }
    }
}

/// A token deployed as part of the base token set
#[derive(Clone, Copy, Debug)]
pub struct BaseToken {
    /// The deployment record key
    pub key: &'static str,
    /// The artifact to deploy
    pub artifact: &'static str,
    /// The ERC20 name, `None` for artifacts without constructor arguments
    pub name: Option<&'static str>,
    /// The ERC20 symbol
    pub symbol: &'static str,
    /// The ERC20 decimals
    pub decimals: u8,
    /// The `chainlinkPriceFeed` key of the token's USD feed
    pub feed_key: &'static str,
}

impl BaseToken {
    /// The contract spec for deploying this token
    pub fn spec(&self) -> ContractSpec {
        let spec = ContractSpec::new(self.artifact);
        match self.name {
            Some(name) => spec.with_args(erc20_args(name, self.symbol, self.decimals)),
            None => spec,
        }
    }
}

/// The tokens every pool is bred with, in pool order
pub const BASE_TOKENS: [BaseToken; 4] = [
    BaseToken {
        key: WBTC_KEY,
        artifact: MOCK_ERC20_ARTIFACT,
        name: Some("Wrapped BTC"),
        symbol: "WBTC",
        decimals: 8,
        feed_key: "BTCUSD",
    },
    BaseToken {
        key: WETH_KEY,
        artifact: WETH_ARTIFACT,
        name: None,
        symbol: "WETH",
        decimals: 18,
        feed_key: "ETHUSD",
    },
    BaseToken {
        key: DAI_KEY,
        artifact: MOCK_ERC20_ARTIFACT,
        name: Some("Dai Stablecoin"),
        symbol: "DAI",
        decimals: 18,
        feed_key: "DAIUSD",
    },
    BaseToken {
        key: DODO_KEY,
        artifact: MOCK_ERC20_ARTIFACT,
        name: Some("DODO bird"),
        symbol: "DODO",
        decimals: 18,
        feed_key: "DODOUSD",
    },
];

/// Constructor arguments of `MockERC20(name, symbol, decimals)`
pub fn erc20_args(name: &str, symbol: &str, decimals: u8) -> Vec<DynSolValue> {
    vec![
        DynSolValue::String(name.to_string()),
        DynSolValue::String(symbol.to_string()),
        DynSolValue::Uint(U256::from(decimals), 8),
    ]
}

/// Constructor arguments of the mock Chainlink feeds, `(description, decimals)`
pub fn feed_args(description: &str, decimals: u8) -> Vec<DynSolValue> {
    vec![
        DynSolValue::String(description.to_string()),
        DynSolValue::Uint(U256::from(decimals), 8),
    ]
}

/// The parameters of the factory's `breedDODO` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreedParams {
    /// The owner of the new pool
    pub owner: Address,
    /// The pool's tokens, in order
    pub tokens: Vec<Address>,
    /// Start of the first epoch, unix seconds
    pub epoch_start: u64,
    /// Epoch length in seconds
    pub epoch_duration: u64,
    /// Collateral constant, 1e18 scale
    pub collateral_constant: U256,
    /// Liquidation discount constant, 1e18 scale
    pub liquidation_discount: U256,
}

impl BreedParams {
    /// The standard pool parameters, with the first epoch starting 11 hours before `now`
    pub fn new(owner: Address, tokens: Vec<Address>, now: u64) -> Self {
        Self {
            owner,
            tokens,
            epoch_start: now.saturating_sub(EPOCH_START_OFFSET_SECS),
            epoch_duration: EPOCH_DURATION_SECS,
            collateral_constant: U256::from(COLLATERAL_CONSTANT),
            liquidation_discount: U256::from(LIQUIDATION_DISCOUNT),
        }
    }
}

impl From<BreedParams> for breedDODOCall {
    fn from(params: BreedParams) -> Self {
        breedDODOCall {
            owner: params.owner,
            tokenList: params.tokens,
            epochStartTime: U256::from(params.epoch_start),
            epochDuration: U256::from(params.epoch_duration),
            collateralConstant: params.collateral_constant,
            liquidationDiscount: params.liquidation_discount,
        }
    }
}

/// The parameters for adding a freshly deployed token to an existing pool
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTokenParams {
    /// The token's deployment record key
    pub key: String,
    /// The ERC20 name
    pub name: String,
    /// The ERC20 symbol
    pub symbol: String,
    /// The ERC20 decimals
    pub decimals: u8,
    /// The price feed's deployment record key
    pub feed_key: String,
    /// The price feed's description, e.g. `DODO/USD`
    pub feed_description: String,
    /// The price feed's decimals
    pub feed_decimals: u8,
    /// The token's initial interest rate, 1e18 scale
    pub interest_rate: U256,
    /// The token's initial max deposit, in token units
    pub max_deposit: U256,
}

impl Default for NewTokenParams {
    fn default() -> Self {
        Self {
            key: DODO_KEY.to_string(),
            name: "DODO bird".to_string(),
            symbol: "DODO".to_string(),
            decimals: 18,
            feed_key: "dodoPriceFeed".to_string(),
            feed_description: "DODO/USD".to_string(),
            feed_decimals: PRICE_DECIMALS,
            interest_rate: U256::from(NEW_TOKEN_INTEREST_RATE),
            max_deposit: U256::from(NEW_TOKEN_MAX_DEPOSIT),
        }
    }
}

/// The steps of the deployment sequence, in the order they always execute
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeployStep {
    /// Deploy the base tokens
    Tokens,
    /// Deploy the oracle & register a price source per base token
    Oracle,
    /// Deploy the mock router bound to the oracle
    Router,
    /// Deploy the liquidation router
    LiquidationRouter,
    /// Deploy the libraries & the pool template linked against them
    PoolTemplate,
    /// Deploy the pool share token template
    TokenTemplate,
    /// Deploy the clone factory
    CloneFactory,
    /// Deploy & configure the pool factory
    Factory,
    /// Breed a pool from the factory
    Pool,
}

impl DeployStep {
    /// Every step, in canonical order
    pub fn all() -> Vec<DeployStep> {
        DeployStep::value_variants().to_vec()
    }
}

impl Display for DeployStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployStep::Tokens => write!(f, "tokens"),
            DeployStep::Oracle => write!(f, "oracle"),
            DeployStep::Router => write!(f, "router"),
            DeployStep::LiquidationRouter => write!(f, "liquidation-router"),
            DeployStep::PoolTemplate => write!(f, "pool-template"),
            DeployStep::TokenTemplate => write!(f, "token-template"),
            DeployStep::CloneFactory => write!(f, "clone-factory"),
            DeployStep::Factory => write!(f, "factory"),
            DeployStep::Pool => write!(f, "pool"),
        }
    }
}

//! Constants used in the deploy & admin scripts

// ------------------------
// | Deployment record keys |
// ------------------------

/// The WBTC mock token key in the `deployedAddress` record
pub const WBTC_KEY: &str = "wbtcAddress";

/// The WETH token key in the `deployedAddress` record
pub const WETH_KEY: &str = "wethAddress";

/// The DAI mock token key in the `deployedAddress` record
pub const DAI_KEY: &str = "daiAddress";

/// The DODO mock token key in the `deployedAddress` record
pub const DODO_KEY: &str = "dodoAddress";

/// The oracle contract key in the `deployedAddress` record
pub const ORACLE_KEY: &str = "D3Oracle";

/// The mock router contract key in the `deployedAddress` record
pub const ROUTER_KEY: &str = "MockRouter";

/// The liquidation router contract key in the `deployedAddress` record
pub const LIQUIDATION_ROUTER_KEY: &str = "D3MMLiquidationRouter";

/// The funding library key in the `deployedAddress` record
pub const FUNDING_LIBRARY_KEY: &str = "FundingLibrary";

/// The liquidation library key in the `deployedAddress` record
pub const LIQUIDATION_LIBRARY_KEY: &str = "LiquidationLibrary";

/// The range-order library key in the `deployedAddress` record
pub const RANGE_ORDER_LIBRARY_KEY: &str = "PMMRangeOrderLibrary";

/// The trading library key in the `deployedAddress` record
pub const TRADING_LIBRARY_KEY: &str = "TradingLibrary";

/// The pool template key in the `deployedAddress` record
pub const POOL_TEMPLATE_KEY: &str = "D3MMTemplate";

/// The pool share token template key in the `deployedAddress` record
pub const TOKEN_TEMPLATE_KEY: &str = "D3TokenTemplate";

/// The clone factory key in the `deployedAddress` record
pub const CLONE_FACTORY_KEY: &str = "CloneFactory";

/// The maintainer key in the `deployedAddress` record, never deployed by these scripts
pub const MAINTAINER_KEY: &str = "Maintainer";

/// The fee rate model key in the `deployedAddress` record, never deployed by these scripts
pub const FEE_RATE_MODEL_KEY: &str = "FeeRateModel";

/// The pool factory key in the `deployedAddress` record
pub const FACTORY_KEY: &str = "D3MMFactory";

/// The bred pool instance key in the `deployedAddress` record
pub const POOL_KEY: &str = "D3MM";

/// The user quota contract key in the `deployedAddress` record
pub const USER_QUOTA_KEY: &str = "UserQuotaV3";

/// The proxy contract key in the `deployedAddress` record
pub const PROXY_KEY: &str = "D3Proxy";

/// The approve proxy key in the `defaultAddress` record
pub const APPROVE_PROXY_KEY: &str = "DODOApproveProxy";

// ------------------
// | Artifact names |
// ------------------

/// The mintable mock ERC20 artifact
pub const MOCK_ERC20_ARTIFACT: &str = "MockERC20";

/// The wrapped ether artifact
pub const WETH_ARTIFACT: &str = "WETH9";

/// The oracle artifact
pub const ORACLE_ARTIFACT: &str = "D3Oracle";

/// The mock router artifact
pub const ROUTER_ARTIFACT: &str = "MockRouter";

/// The liquidation router artifact
pub const LIQUIDATION_ROUTER_ARTIFACT: &str = "D3MMLiquidationRouter";

/// The funding library artifact
pub const FUNDING_LIBRARY_ARTIFACT: &str = "FundingLibrary";

/// The liquidation library artifact
pub const LIQUIDATION_LIBRARY_ARTIFACT: &str = "LiquidationLibrary";

/// The range-order library artifact
pub const RANGE_ORDER_LIBRARY_ARTIFACT: &str = "PMMRangeOrder";

/// The trading library artifact
pub const TRADING_LIBRARY_ARTIFACT: &str = "TradingLibrary";

/// The pool artifact, deployed once as the clone template
pub const POOL_ARTIFACT: &str = "D3MM";

/// The pool share token artifact
pub const TOKEN_TEMPLATE_ARTIFACT: &str = "D3Token";

/// The clone factory artifact
pub const CLONE_FACTORY_ARTIFACT: &str = "CloneFactory";

/// The pool factory artifact
pub const FACTORY_ARTIFACT: &str = "D3MMFactory";

/// The user quota artifact
pub const USER_QUOTA_ARTIFACT: &str = "UserQuotaV3";

/// The proxy artifact
pub const PROXY_ARTIFACT: &str = "D3Proxy";

/// The mock price feed whose answer drifts over time
pub const DRIFTING_FEED_ARTIFACT: &str = "MockChainlinkPriceFeed2";

/// The owner-settable mock price feed
pub const OWNED_FEED_ARTIFACT: &str = "MockChainlinkPriceFeed3";

// ----------------------
// | Protocol constants |
// ----------------------

/// The price deviation tolerance of every registered price source, 0.9 in 1e18 scale
pub const PRICE_TOLERANCE: u128 = 900_000_000_000_000_000;

/// The number of decimals in the Chainlink USD feeds
pub const PRICE_DECIMALS: u8 = 8;

/// How far in the past a freshly bred pool's first epoch starts
pub const EPOCH_START_OFFSET_SECS: u64 = 11 * 3600;

/// The epoch duration of a freshly bred pool, one day
pub const EPOCH_DURATION_SECS: u64 = 86400;

/// The collateral constant of a freshly bred pool, 0.4 in 1e18 scale
pub const COLLATERAL_CONSTANT: u128 = 400_000_000_000_000_000;

/// The liquidation discount constant of a freshly bred pool, 0.38 in 1e18 scale
pub const LIQUIDATION_DISCOUNT: u128 = 380_000_000_000_000_000;

/// The initial interest rate of a token added to an existing pool, 0.2 in 1e18 scale
pub const NEW_TOKEN_INTEREST_RATE: u128 = 200_000_000_000_000_000;

/// The initial max deposit of a token added to an existing pool, 1000 tokens of 18 decimals
pub const NEW_TOKEN_MAX_DEPOSIT: u128 = 1_000_000_000_000_000_000_000;

/// The number of decimals in the fixed-point values the pool and oracle report
pub const FIXED_POINT_DECIMALS: u8 = 18;

// -----------------
// | Verification |
// -----------------

/// The reason the verification service gives when a contract is submitted twice
pub const ALREADY_VERIFIED_MESSAGE: &str = "Contract source code already verified";

/// The default Etherscan (multichain) API endpoint
pub const ETHERSCAN_API_URL: &str = "https://api.etherscan.io/v2/api";

/// The Etherscan status message of a verification still in the queue
pub const VERIFICATION_PENDING: &str = "Pending in queue";

/// The Etherscan status message of a successful verification
pub const VERIFICATION_PASSED: &str = "Pass - Verified";

/// The Etherscan status message of a contract verified by an earlier submission
pub const VERIFICATION_ALREADY_PASSED: &str = "Already Verified";

/// The number of times to poll Etherscan for a verification result
pub const VERIFICATION_POLL_ATTEMPTS: usize = 10;

/// The number of seconds between verification status polls
pub const VERIFICATION_POLL_INTERVAL_SECS: u64 = 3;

// ---------
// | Files |
// ---------

/// The `deployedAddress` key in the network config file
pub const DEPLOYED_ADDRESS_KEY: &str = "deployedAddress";

/// The default Hardhat artifacts directory
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The name of the Hardhat build-info directory, skipped when searching for artifacts
pub const BUILD_INFO_DIR: &str = "build-info";

/// The suffix of Hardhat debug files, which point to the build info
pub const DEBUG_ARTIFACT_SUFFIX: &str = ".dbg.json";

/// The extension of Hardhat artifact files
pub const ARTIFACT_EXTENSION: &str = "json";

/// The number of hex characters in an address
pub const NUM_HEX_CHARS_ADDRESS: usize = 40;

/// The default number of confirmations to wait for on every transaction
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

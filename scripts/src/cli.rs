//! Definitions of CLI arguments and commands for the deploy & admin scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    client::ChainClient,
    commands::{
        add_liquidator, add_token, deploy, inspect, lp_deposit, owner_deposit, owner_withdraw,
        set_interest_rates, set_max_deposit,
    },
    constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIRMATIONS, ETHERSCAN_API_URL},
    deploy::Deployer,
    errors::ScriptError,
    types::DeployStep,
    utils::parse_assignment,
};

/// Deploy & administer the D3MM contracts on one network
#[derive(Parser)]
pub struct Cli {
    /// Private key of the deployer
    #[arg(short, long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: String,

    /// Path to the network's JSON config file, updated with every new deployment
    #[arg(short, long)]
    pub config: PathBuf,

    /// Path to the Hardhat artifacts directory
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// Etherscan API key; verification is skipped if absent
    #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    pub etherscan_api_key: Option<String>,

    /// Etherscan-compatible verification API endpoint
    #[arg(long, default_value = ETHERSCAN_API_URL)]
    pub verifier_url: String,

    /// Number of confirmations to wait for on every transaction
    #[arg(long, default_value_t = DEFAULT_CONFIRMATIONS)]
    pub confirmations: u64,

    /// Extra seconds to wait after every deployment & transaction
    #[arg(long, default_value_t = 0)]
    pub tx_delay_secs: u64,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The available scripts
#[derive(Subcommand)]
pub enum Command {
    /// Run the deployment sequence
    Deploy(DeployArgs),
    /// Deploy a new token & price feed and add the token to the pool
    AddToken(AddTokenArgs),
    /// Point the factory at the recorded pool template
    SetTemplate,
    /// Point the factory at the recorded oracle
    SetOracle,
    /// Whitelist a liquidator on the factory
    AddLiquidator(AddLiquidatorArgs),
    /// Verify the recorded factory
    VerifyFactory,
    /// Deploy the owner-settable mock price feeds
    DeployPriceFeeds,
    /// Deploy the user-facing proxy
    DeployProxy,
    /// Deploy the user quota contract
    DeployUserQuota,
    /// Set the pool's interest rates for the next epoch
    SetInterestRates(SetInterestRatesArgs),
    /// Roll the pool into its next epoch
    ExecuteEpochUpdate,
    /// Set the pool's max deposit per token
    SetMaxDeposit(SetMaxDepositArgs),
    /// Mint tokens to the pool & book them as an owner deposit
    OwnerDeposit(DepositArgs),
    /// Mint tokens to the pool & book them as a liquidity provider's deposit
    LpDeposit(LpDepositArgs),
    /// Withdraw owner funds from the pool
    OwnerWithdraw(OwnerWithdrawArgs),
    /// Print the pool's state
    Inspect,
}

impl Command {
    /// Run the command against the given deployer
    pub async fn run<C: ChainClient>(
        self,
        deployer: &mut Deployer<C>,
    ) -> Result<(), ScriptError> {
        match self {
            Command::Deploy(args) => deploy(args, deployer).await,
            Command::AddToken(args) => add_token(args, deployer).await,
            Command::SetTemplate => deployer.set_pool_template().await,
            Command::SetOracle => deployer.set_factory_oracle().await,
            Command::AddLiquidator(args) => add_liquidator(args, deployer).await,
            Command::VerifyFactory => deployer.verify_factory().await,
            Command::DeployPriceFeeds => deployer.deploy_owned_price_feeds().await.map(drop),
            Command::DeployProxy => deployer.deploy_proxy().await.map(drop),
            Command::DeployUserQuota => deployer.deploy_user_quota().await.map(drop),
            Command::SetInterestRates(args) => set_interest_rates(args, deployer).await,
            Command::ExecuteEpochUpdate => deployer.execute_epoch_update().await,
            Command::SetMaxDeposit(args) => set_max_deposit(args, deployer).await,
            Command::OwnerDeposit(args) => owner_deposit(args, deployer).await,
            Command::LpDeposit(args) => lp_deposit(args, deployer).await,
            Command::OwnerWithdraw(args) => owner_withdraw(args, deployer).await,
            Command::Inspect => inspect(deployer).await,
        }
    }
}

/// Deploy the protocol's contracts & breed a pool.
///
/// Contracts already recorded in the config file are skipped, so an
/// interrupted deployment resumes where it stopped. Steps run in their
/// fixed order no matter the order they are given in.
#[derive(Args)]
pub struct DeployArgs {
    /// The steps to run, all of them if omitted
    #[arg(long, value_enum, value_delimiter = ',')]
    pub steps: Vec<DeployStep>,

    /// First liquidator to whitelist on the factory
    #[arg(long, env = "liquidator1")]
    pub liquidator1: Option<String>,

    /// Second liquidator to whitelist on the factory
    #[arg(long, env = "liquidator2")]
    pub liquidator2: Option<String>,
}

/// Deploy a new mock token with a mock price feed, register it with the
/// oracle and add it to the recorded pool
#[derive(Args)]
pub struct AddTokenArgs {
    /// The token's key in the deployment record
    #[arg(long, default_value = "dodoAddress")]
    pub key: String,

    /// The token's name
    #[arg(long, default_value = "DODO bird")]
    pub name: String,

    /// The token's symbol
    #[arg(long, default_value = "DODO")]
    pub symbol: String,

    /// The token's decimals
    #[arg(long, default_value_t = 18)]
    pub decimals: u8,

    /// The price feed's key in the deployment record
    #[arg(long, default_value = "dodoPriceFeed")]
    pub feed_key: String,

    /// The price feed's description
    #[arg(long, default_value = "DODO/USD")]
    pub feed_description: String,

    /// The initial interest rate, as a decimal fraction
    #[arg(long, default_value = "0.2")]
    pub interest_rate: String,

    /// The initial max deposit, in whole tokens
    #[arg(long, default_value = "1000")]
    pub max_deposit: String,
}

/// Whitelist a liquidator on the factory
#[derive(Args)]
pub struct AddLiquidatorArgs {
    /// The liquidator's address in hex
    #[arg(short, long)]
    pub account: String,
}

/// Set the interest rates the pool applies from its next epoch
#[derive(Args)]
pub struct SetInterestRatesArgs {
    /// `TOKEN=RATE` pairs; TOKEN is a record key or a hex address, RATE a decimal fraction
    #[arg(long = "rate", value_parser = parse_assignment, required = true)]
    pub rates: Vec<(String, String)>,
}

/// Set the pool's max deposit per token
#[derive(Args)]
pub struct SetMaxDepositArgs {
    /// `TOKEN=AMOUNT` pairs; AMOUNT is in whole tokens
    #[arg(long = "limit", value_parser = parse_assignment, required = true)]
    pub limits: Vec<(String, String)>,
}

/// Mint tokens to the pool & book them as an owner deposit
#[derive(Args)]
pub struct DepositArgs {
    /// `TOKEN=AMOUNT` pairs; TOKEN is a record key or a hex address, AMOUNT is in whole tokens
    #[arg(long = "amount", value_parser = parse_assignment, required = true)]
    pub amounts: Vec<(String, String)>,
}

/// Mint tokens to the pool & book them as a liquidity provider's deposit
#[derive(Args)]
pub struct LpDepositArgs {
    /// The liquidity provider's address in hex
    #[arg(long)]
    pub lp: String,

    /// The tokens & amounts to deposit
    #[command(flatten)]
    pub deposit: DepositArgs,
}

/// Withdraw owner funds from the pool
#[derive(Args)]
pub struct OwnerWithdrawArgs {
    /// The recipient's address in hex
    #[arg(long)]
    pub to: String,

    /// The token, as a record key or a hex address
    #[arg(short, long)]
    pub token: String,

    /// The amount, in whole tokens
    #[arg(short, long)]
    pub amount: String,
}

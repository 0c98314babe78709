//! The deployment orchestrator: idempotent deployments & the fixed deployment sequence

use std::{path::PathBuf, time::Duration};

use alloy::dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use itertools::Itertools;
use tracing::info;

use crate::{
    artifacts::ArtifactStore,
    client::{ChainClient, ContractHandle},
    constants::{
        APPROVE_PROXY_KEY, CLONE_FACTORY_ARTIFACT, CLONE_FACTORY_KEY, DRIFTING_FEED_ARTIFACT,
        FACTORY_ARTIFACT, FACTORY_KEY, FEE_RATE_MODEL_KEY, FUNDING_LIBRARY_ARTIFACT,
        FUNDING_LIBRARY_KEY, LIQUIDATION_LIBRARY_ARTIFACT, LIQUIDATION_LIBRARY_KEY,
        LIQUIDATION_ROUTER_ARTIFACT, LIQUIDATION_ROUTER_KEY, MAINTAINER_KEY, MOCK_ERC20_ARTIFACT,
        ORACLE_ARTIFACT, ORACLE_KEY, OWNED_FEED_ARTIFACT, POOL_ARTIFACT, POOL_KEY,
        POOL_TEMPLATE_KEY, PRICE_DECIMALS, PRICE_TOLERANCE, PROXY_ARTIFACT, PROXY_KEY,
        RANGE_ORDER_LIBRARY_ARTIFACT, RANGE_ORDER_LIBRARY_KEY, ROUTER_ARTIFACT, ROUTER_KEY,
        TOKEN_TEMPLATE_ARTIFACT, TOKEN_TEMPLATE_KEY, TRADING_LIBRARY_ARTIFACT, TRADING_LIBRARY_KEY,
        USER_QUOTA_ARTIFACT, USER_QUOTA_KEY, WETH_KEY,
    },
    deployments::{write_deployed_address, DeploymentRecord, NetworkConfig},
    errors::ScriptError,
    solidity::{
        ID3MMFactory::{addLiquidatorCall, addRouterCall, breedDODOCall, setOracleCall},
        ID3Oracle::setPriceSourceCall,
        ID3MM::addNewTokenCall,
    },
    types::{
        erc20_args, feed_args, BreedParams, ContractSpec, DeployStep, NewTokenParams,
        PriceSourceConfig, BASE_TOKENS,
    },
    utils::unix_now,
    verify::{verify_contract, SourceVerifier, Verification, VerificationRequest},
};

/// The owner-settable mock feeds: deployment record key & feed description
const OWNED_PRICE_FEEDS: [(&str, &str); 3] = [
    ("dodoPriceFeedWithOwner", "DODO/USD"),
    ("wbtcPriceFeedWithOwner", "WBTC/USD"),
    ("daiPriceFeedWithOwner", "DAI/USD"),
];

/// Deploys & configures the protocol's contracts on one network
///
/// All state the scripts accumulate lives in the [`NetworkConfig`] owned
/// here; every newly deployed address is recorded in it (and, when a config
/// path is set, written back to the config file) before the next step runs.
pub struct Deployer<C> {
    /// The chain the contracts are deployed to
    client: C,
    /// The source verification service
    verifier: Box<dyn SourceVerifier>,
    /// The compiled contracts
    artifacts: ArtifactStore,
    /// The network's configuration & deployment record
    config: NetworkConfig,
    /// Where to persist newly recorded addresses
    config_path: Option<PathBuf>,
    /// The liquidators to whitelist on the factory besides the deployer
    liquidators: Vec<Address>,
    /// Extra delay after every transaction
    pacing: Duration,
}

impl<C: ChainClient> Deployer<C> {
    /// Create a deployer that keeps its record in memory only
    pub fn new(
        client: C,
        verifier: Box<dyn SourceVerifier>,
        artifacts: ArtifactStore,
        config: NetworkConfig,
    ) -> Self {
        Self {
            client,
            verifier,
            artifacts,
            config,
            config_path: None,
            liquidators: Vec::new(),
            pacing: Duration::ZERO,
        }
    }

    /// Persist every newly recorded address to the config file at `path`
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Pause for `pacing` after every deployment & transaction
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Set the liquidator accounts to whitelist when configuring the factory
    pub fn set_liquidators(&mut self, liquidators: Vec<Address>) {
        self.liquidators = liquidators;
    }

    /// The chain client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The network configuration
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// The addresses recorded so far
    pub fn record(&self) -> &DeploymentRecord {
        &self.config.deployed_address
    }

    /// A handle to the contract at `address`, labelled `name` in logs
    pub fn handle<'a>(&'a self, name: &'a str, address: Address) -> ContractHandle<'a, C> {
        ContractHandle::new(&self.client, name, address).with_pacing(self.pacing)
    }

    /// A handle to the recorded contract `name`
    pub fn contract<'a>(&'a self, name: &'a str) -> Result<ContractHandle<'a, C>, ScriptError> {
        let address = self.record().require(name)?;
        Ok(self.handle(name, address))
    }

    // --------------------------
    // | Deployment primitives |
    // --------------------------

    /// Return the recorded address of `name`, deploying it from `spec` first if there is none
    ///
    /// A recorded name never causes a transaction, so re-running a sequence
    /// after a failure resumes where it stopped.
    pub async fn ensure_deployed(
        &mut self,
        name: &str,
        spec: &ContractSpec,
    ) -> Result<Address, ScriptError> {
        if let Some(address) = self.record().get(name) {
            info!(contract = name, %address, "already deployed, skipping");
            return Ok(address);
        }

        let artifact = self.artifacts.artifact(&spec.artifact)?;
        let mut init_code = artifact.link(&spec.libraries)?;
        init_code.extend(spec.encoded_args());

        let address = self.client.deploy(name, init_code.into()).await?;
        info!(contract = name, artifact = %spec.artifact, %address, "deployed");
        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }

        self.save(name, address)?;
        Ok(address)
    }

    /// Verify the source of the contract at `address`, deployed from `spec`
    pub async fn verify(
        &self,
        address: Address,
        spec: &ContractSpec,
    ) -> Result<Verification, ScriptError> {
        let request = VerificationRequest {
            address,
            artifact: spec.artifact.clone(),
            constructor_args: spec.encoded_args(),
            libraries: spec.libraries.clone(),
        };

        verify_contract(self.verifier.as_ref(), &request).await
    }

    /// [`Self::ensure_deployed`] followed by [`Self::verify`]
    async fn ensure_verified(
        &mut self,
        name: &str,
        spec: &ContractSpec,
    ) -> Result<Address, ScriptError> {
        let address = self.ensure_deployed(name, spec).await?;
        self.verify(address, spec).await?;
        Ok(address)
    }

    /// Record `address` under `name`, persisting it when a config path is set
    fn save(&mut self, name: &str, address: Address) -> Result<(), ScriptError> {
        self.config.deployed_address.record(name, address)?;
        if let Some(path) = &self.config_path {
            write_deployed_address(path, name, address)?;
        }

        Ok(())
    }

    // -----------------------
    // | Deployment sequence |
    // -----------------------

    /// Run the given steps of the deployment sequence, always in canonical order
    pub async fn run(&mut self, steps: &[DeployStep]) -> Result<(), ScriptError> {
        let steps: Vec<DeployStep> = steps.iter().copied().sorted().dedup().collect();
        info!(steps = %steps.iter().join(","), "running deployment");

        for step in steps {
            info!(%step, "deployment step");
            match step {
                DeployStep::Tokens => {
                    self.deploy_tokens().await?;
                }
                DeployStep::Oracle => {
                    self.deploy_oracle().await?;
                }
                DeployStep::Router => {
                    self.deploy_router().await?;
                }
                DeployStep::LiquidationRouter => {
                    self.deploy_liquidation_router().await?;
                }
                DeployStep::PoolTemplate => {
                    self.deploy_pool_template().await?;
                }
                DeployStep::TokenTemplate => {
                    self.deploy_token_template().await?;
                }
                DeployStep::CloneFactory => {
                    self.deploy_clone_factory().await?;
                }
                DeployStep::Factory => {
                    self.deploy_factory().await?;
                }
                DeployStep::Pool => {
                    self.breed_pool(unix_now()?).await?;
                }
            }
        }

        Ok(())
    }

    /// Deploy the base tokens, returning their addresses in pool order
    pub async fn deploy_tokens(&mut self) -> Result<Vec<Address>, ScriptError> {
        let mut addresses = Vec::with_capacity(BASE_TOKENS.len());
        for token in BASE_TOKENS {
            addresses.push(self.ensure_deployed(token.key, &token.spec()).await?);
        }

        Ok(addresses)
    }

    /// Deploy the oracle & register a USD price source for every base token
    pub async fn deploy_oracle(&mut self) -> Result<Address, ScriptError> {
        let oracle = self
            .ensure_verified(ORACLE_KEY, &ContractSpec::new(ORACLE_ARTIFACT))
            .await?;

        for token in BASE_TOKENS {
            let token_address = self.record().require(token.key)?;
            let feed = self.config.price_feed(token.feed_key)?;

            info!(token = token.symbol, %feed, "setting price source");
            let source = PriceSourceConfig::usd_feed(feed, token.decimals);
            self.set_price_source(oracle, token_address, source).await?;
        }

        Ok(oracle)
    }

    /// Register a token's price source with the oracle
    pub async fn set_price_source(
        &self,
        oracle: Address,
        token: Address,
        source: PriceSourceConfig,
    ) -> Result<(), ScriptError> {
        self.handle(ORACLE_KEY, oracle)
            .send(setPriceSourceCall {
                token,
                source: source.into(),
            })
            .await?;

        Ok(())
    }

    /// Deploy the mock router bound to the oracle
    pub async fn deploy_router(&mut self) -> Result<Address, ScriptError> {
        let oracle = self.record().require(ORACLE_KEY)?;
        let spec = ContractSpec::new(ROUTER_ARTIFACT).with_args(vec![DynSolValue::Address(oracle)]);

        self.ensure_verified(ROUTER_KEY, &spec).await
    }

    /// Deploy the liquidation router
    pub async fn deploy_liquidation_router(&mut self) -> Result<Address, ScriptError> {
        let spec = ContractSpec::new(LIQUIDATION_ROUTER_ARTIFACT);
        self.ensure_deployed(LIQUIDATION_ROUTER_KEY, &spec).await
    }

    /// Deploy the pool's libraries, then the pool template linked against them
    pub async fn deploy_pool_template(&mut self) -> Result<Address, ScriptError> {
        let libraries = [
            (FUNDING_LIBRARY_KEY, FUNDING_LIBRARY_ARTIFACT),
            (LIQUIDATION_LIBRARY_KEY, LIQUIDATION_LIBRARY_ARTIFACT),
            (RANGE_ORDER_LIBRARY_KEY, RANGE_ORDER_LIBRARY_ARTIFACT),
            (TRADING_LIBRARY_KEY, TRADING_LIBRARY_ARTIFACT),
        ];

        let mut spec = ContractSpec::new(POOL_ARTIFACT);
        for (key, artifact) in libraries {
            let address = self.ensure_deployed(key, &ContractSpec::new(artifact)).await?;
            spec = spec.with_library(artifact, address);
        }

        let trading = self.record().require(TRADING_LIBRARY_KEY)?;
        self.verify(trading, &ContractSpec::new(TRADING_LIBRARY_ARTIFACT))
            .await?;

        self.ensure_verified(POOL_TEMPLATE_KEY, &spec).await
    }

    /// Deploy the pool share token template
    pub async fn deploy_token_template(&mut self) -> Result<Address, ScriptError> {
        let spec = ContractSpec::new(TOKEN_TEMPLATE_ARTIFACT);
        self.ensure_deployed(TOKEN_TEMPLATE_KEY, &spec).await
    }

    /// Deploy the clone factory
    pub async fn deploy_clone_factory(&mut self) -> Result<Address, ScriptError> {
        let spec = ContractSpec::new(CLONE_FACTORY_ARTIFACT);
        self.ensure_deployed(CLONE_FACTORY_KEY, &spec).await
    }

    /// The factory's contract spec; every constructor argument must already be recorded
    pub fn factory_spec(&self) -> Result<ContractSpec, ScriptError> {
        let args = [
            POOL_TEMPLATE_KEY,
            TOKEN_TEMPLATE_KEY,
            CLONE_FACTORY_KEY,
            MAINTAINER_KEY,
            FEE_RATE_MODEL_KEY,
        ]
        .into_iter()
        .map(|key| self.record().require(key).map(DynSolValue::Address))
        .collect::<Result<Vec<_>, _>>()?;

        Ok(ContractSpec::new(FACTORY_ARTIFACT).with_args(args))
    }

    /// Deploy the factory, then whitelist the liquidators & the liquidation
    /// router and point it at the oracle
    pub async fn deploy_factory(&mut self) -> Result<Address, ScriptError> {
        let liquidators = self.liquidator_accounts()?;
        let spec = self.factory_spec()?;
        let factory = self.ensure_deployed(FACTORY_KEY, &spec).await?;
        self.configure_factory(factory, &liquidators).await?;

        Ok(factory)
    }

    /// The deployer followed by the configured liquidators
    fn liquidator_accounts(&self) -> Result<Vec<Address>, ScriptError> {
        if self.liquidators.is_empty() {
            return Err(ScriptError::MissingConfig(
                "liquidator accounts (liquidator1, liquidator2)".to_string(),
            ));
        }

        Ok(std::iter::once(self.client.sender())
            .chain(self.liquidators.iter().copied())
            .collect())
    }

    /// Whitelist the liquidators, add the liquidation router and set the oracle
    pub async fn configure_factory(
        &self,
        factory: Address,
        liquidators: &[Address],
    ) -> Result<(), ScriptError> {
        let router = self.record().require(LIQUIDATION_ROUTER_KEY)?;
        let oracle = self.record().require(ORACLE_KEY)?;

        let handle = self.handle(FACTORY_KEY, factory);
        for account in liquidators.iter().copied() {
            info!(%account, "adding liquidator");
            handle.send(addLiquidatorCall { account }).await?;
        }
        handle.send(addRouterCall { router }).await?;
        handle.send(setOracleCall { oracle }).await?;

        Ok(())
    }

    /// Breed a pool from the factory with the base tokens, owned by the deployer
    ///
    /// The pool's address is read by simulating the call before sending it.
    /// Skipped if a pool is already recorded.
    pub async fn breed_pool(&mut self, now: u64) -> Result<Address, ScriptError> {
        if let Some(pool) = self.record().get(POOL_KEY) {
            info!(contract = POOL_KEY, address = %pool, "already bred, skipping");
            return Ok(pool);
        }

        let tokens = BASE_TOKENS
            .iter()
            .map(|token| self.record().require(token.key))
            .collect::<Result<Vec<_>, _>>()?;
        let call: breedDODOCall = BreedParams::new(self.client.sender(), tokens, now).into();

        let pool = {
            let factory = self.contract(FACTORY_KEY)?;
            let pool = factory.read(call.clone()).await?;
            factory.send(call).await?;
            pool
        };
        info!(%pool, "bred new pool");

        self.save(POOL_KEY, pool)?;
        Ok(pool)
    }

    // ----------------------------
    // | Auxiliary deployments |
    // ----------------------------

    /// Deploy a new token with a drifting mock price feed, register it with
    /// the oracle and add it to the recorded pool
    pub async fn add_token(&mut self, params: &NewTokenParams) -> Result<Address, ScriptError> {
        let token_spec = ContractSpec::new(MOCK_ERC20_ARTIFACT).with_args(erc20_args(
            &params.name,
            &params.symbol,
            params.decimals,
        ));
        let token = self.ensure_deployed(&params.key, &token_spec).await?;

        let feed_spec = ContractSpec::new(DRIFTING_FEED_ARTIFACT)
            .with_args(feed_args(&params.feed_description, params.feed_decimals));
        let feed = self.ensure_verified(&params.feed_key, &feed_spec).await?;

        let oracle = self.record().require(ORACLE_KEY)?;
        let source = PriceSourceConfig {
            feed,
            whitelisted: true,
            tolerance: U256::from(PRICE_TOLERANCE),
            price_decimals: params.feed_decimals,
            token_decimals: params.decimals,
        };
        self.set_price_source(oracle, token, source).await?;
        info!(token = %params.symbol, "price source set");

        self.contract(POOL_KEY)?
            .send(addNewTokenCall {
                token,
                interestRate: params.interest_rate,
                maxDepositAmount: params.max_deposit,
            })
            .await?;
        info!(token = %params.symbol, address = %token, "added new token");

        Ok(token)
    }

    /// Deploy & verify the owner-settable mock price feeds
    pub async fn deploy_owned_price_feeds(&mut self) -> Result<Vec<Address>, ScriptError> {
        let mut feeds = Vec::with_capacity(OWNED_PRICE_FEEDS.len());
        for (key, description) in OWNED_PRICE_FEEDS {
            let spec = ContractSpec::new(OWNED_FEED_ARTIFACT)
                .with_args(feed_args(description, PRICE_DECIMALS));
            feeds.push(self.ensure_verified(key, &spec).await?);
        }

        Ok(feeds)
    }

    /// The proxy's contract spec
    fn proxy_spec(&self) -> Result<ContractSpec, ScriptError> {
        let args = vec![
            DynSolValue::Address(self.config.default_address(APPROVE_PROXY_KEY)?),
            DynSolValue::Address(self.config.default_address(WETH_KEY)?),
            DynSolValue::Address(self.record().require(FACTORY_KEY)?),
        ];

        Ok(ContractSpec::new(PROXY_ARTIFACT).with_args(args))
    }

    /// Deploy & verify the user-facing proxy
    pub async fn deploy_proxy(&mut self) -> Result<Address, ScriptError> {
        let spec = self.proxy_spec()?;
        self.ensure_verified(PROXY_KEY, &spec).await
    }

    /// Deploy the user quota contract
    pub async fn deploy_user_quota(&mut self) -> Result<Address, ScriptError> {
        let spec = ContractSpec::new(USER_QUOTA_ARTIFACT);
        self.ensure_deployed(USER_QUOTA_KEY, &spec).await
    }

    /// Verify the recorded factory with its constructor arguments
    pub async fn verify_factory(&self) -> Result<(), ScriptError> {
        let factory = self.record().require(FACTORY_KEY)?;
        let spec = self.factory_spec()?;
        self.verify(factory, &spec).await.map(drop)
    }
}

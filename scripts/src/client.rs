//! The blockchain RPC boundary the scripts are written against, and its alloy implementation

use std::{str::FromStr, time::Duration};

use alloy::{
    network::{Ethereum, TransactionBuilder},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::errors::ScriptError;

/// The capabilities the scripts need from a chain
///
/// Every method resolves only once the chain has acknowledged the effect:
/// deployments and transactions once their receipt is available.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The account that signs every transaction
    fn sender(&self) -> Address;

    /// Submit a contract creation transaction & return the new contract's address
    async fn deploy(&self, contract: &str, init_code: Bytes) -> Result<Address, ScriptError>;

    /// Submit a transaction calling `to` & wait for it to be included
    async fn send(&self, contract: &str, to: Address, calldata: Bytes)
        -> Result<TxHash, ScriptError>;

    /// Execute a read-only call against the latest state
    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ScriptError>;
}

/// The provider type used against live networks
pub type Wallet = DynProvider<Ethereum>;

/// A [`ChainClient`] backed by an alloy HTTP provider with a local signer
#[derive(Clone)]
pub struct RpcClient {
    /// The signing provider
    provider: Wallet,
    /// The signer's address
    sender: Address,
    /// Confirmations to wait for on every transaction
    confirmations: u64,
}

impl RpcClient {
    /// The underlying provider
    pub fn provider(&self) -> &Wallet {
        &self.provider
    }

    /// The chain ID of the connected network
    pub async fn chain_id(&self) -> Result<u64, ScriptError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
    }

    /// Submit a transaction & wait for the configured number of confirmations
    async fn submit(&self, tx: TransactionRequest) -> Result<TransactionReceipt, ScriptError> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        debug!(tx_hash = %pending.tx_hash(), "transaction submitted");

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        if !receipt.status() {
            return Err(ScriptError::TransactionReverted(format!(
                "{:#x}",
                receipt.transaction_hash
            )));
        }

        Ok(receipt)
    }
}

/// Sets up a signing client for the given network, reading the signer from a hex private key
pub fn setup_client(
    priv_key: &str,
    rpc_url: &str,
    confirmations: u64,
) -> Result<RpcClient, ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let sender = signer.address();
    let provider = ProviderBuilder::new()
        .wallet(signer)
        .with_simple_nonce_management()
        .connect_http(url);

    Ok(RpcClient {
        provider: DynProvider::new(provider),
        sender,
        confirmations,
    })
}

#[async_trait]
impl ChainClient for RpcClient {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn deploy(&self, contract: &str, init_code: Bytes) -> Result<Address, ScriptError> {
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_deploy_code(init_code);

        let receipt = self
            .submit(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{contract}: {e}")))?;

        receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!("{contract}: receipt has no contract address"))
        })
    }

    async fn send(
        &self,
        contract: &str,
        to: Address,
        calldata: Bytes,
    ) -> Result<TxHash, ScriptError> {
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_to(to)
            .with_input(calldata);

        let receipt = self.submit(tx).await.map_err(|e| match e {
            ScriptError::ContractInteraction(msg) => {
                ScriptError::ContractInteraction(format!("{contract}: {msg}"))
            }
            other => other,
        })?;

        Ok(receipt.transaction_hash)
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ScriptError> {
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_to(to)
            .with_input(calldata);

        self.provider
            .call(tx)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }
}

/// A typed handle to a deployed contract
pub struct ContractHandle<'a, C> {
    /// The client to reach the contract through
    client: &'a C,
    /// The contract's logical name, used in logs
    name: &'a str,
    /// The contract's address
    address: Address,
    /// Extra delay after every transaction
    pacing: Duration,
}

impl<'a, C: ChainClient> ContractHandle<'a, C> {
    /// Get a handle to the contract `name` deployed at `address`
    pub fn new(client: &'a C, name: &'a str, address: Address) -> Self {
        Self {
            client,
            name,
            address,
            pacing: Duration::ZERO,
        }
    }

    /// Pause for `pacing` after every transaction sent through this handle
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// The contract's address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Send a transaction calling `call` & wait for it to be included
    pub async fn send<Call: SolCall>(&self, call: Call) -> Result<TxHash, ScriptError> {
        let tx_hash = self
            .client
            .send(self.name, self.address, call.abi_encode().into())
            .await?;
        info!(contract = self.name, method = Call::SIGNATURE, %tx_hash, "transaction confirmed");

        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }

        Ok(tx_hash)
    }

    /// Execute `call` without sending a transaction & decode its return value
    pub async fn read<Call: SolCall>(&self, call: Call) -> Result<Call::Return, ScriptError> {
        let data = self
            .client
            .call(self.address, call.abi_encode().into())
            .await?;

        Call::abi_decode_returns(&data).map_err(|e| {
            ScriptError::Decoding(format!("{}.{}: {e}", self.name, Call::SIGNATURE))
        })
    }
}

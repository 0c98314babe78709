//! Shared fixtures for the script tests: an in-memory chain, artifacts & configs
#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use alloy_primitives::{address, Address, Bytes, TxHash, B256};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use scripts::{
    artifacts::{Artifact, ArtifactStore, LinkOffset},
    client::ChainClient,
    constants::{
        CLONE_FACTORY_ARTIFACT, DRIFTING_FEED_ARTIFACT, FACTORY_ARTIFACT, FUNDING_LIBRARY_ARTIFACT,
        LIQUIDATION_LIBRARY_ARTIFACT, LIQUIDATION_ROUTER_ARTIFACT, MOCK_ERC20_ARTIFACT,
        ORACLE_ARTIFACT, OWNED_FEED_ARTIFACT, POOL_ARTIFACT, PROXY_ARTIFACT,
        RANGE_ORDER_LIBRARY_ARTIFACT, ROUTER_ARTIFACT, TOKEN_TEMPLATE_ARTIFACT,
        TRADING_LIBRARY_ARTIFACT, USER_QUOTA_ARTIFACT, WETH_ARTIFACT,
    },
    deploy::Deployer,
    deployments::NetworkConfig,
    errors::ScriptError,
    verify::{SourceVerifier, VerificationRequest, VerifyError},
};

/// The account signing every mock transaction
pub const MOCK_DEPLOYER: Address = address!("00000000000000000000000000000000000000d0");

/// The pool address the mock factory answers `breedDODO` with
pub const MOCK_POOL: Address = address!("0000000000000000000000000000000000000d3f");

/// The liquidators whitelisted alongside the deployer
pub const LIQUIDATORS: [Address; 2] = [
    address!("00000000000000000000000000000000000000e1"),
    address!("00000000000000000000000000000000000000e2"),
];

/// The creation code of every artifact without libraries
pub const PLAIN_BYTECODE: [u8; 4] = [0x60, 0x80, 0x60, 0x40];

/// The libraries the pool links against, in placeholder order
pub const POOL_LIBRARIES: [&str; 4] = [
    FUNDING_LIBRARY_ARTIFACT,
    LIQUIDATION_LIBRARY_ARTIFACT,
    RANGE_ORDER_LIBRARY_ARTIFACT,
    TRADING_LIBRARY_ARTIFACT,
];

// --------------
// | MOCK CHAIN |
// --------------

/// A contract creation seen by the mock chain
#[derive(Clone, Debug)]
pub struct Deployment {
    pub contract: String,
    pub address: Address,
    pub init_code: Bytes,
}

/// A transaction seen by the mock chain
#[derive(Clone, Debug)]
pub struct SentTx {
    pub contract: String,
    pub to: Address,
    pub calldata: Bytes,
}

impl SentTx {
    pub fn selector(&self) -> [u8; 4] {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&self.calldata[..4]);
        selector
    }
}

#[derive(Default)]
struct ChainState {
    nonce: u64,
    deployments: Vec<Deployment>,
    transactions: Vec<SentTx>,
    /// (address, selector) -> return data; `Address::ZERO` matches any address
    responses: HashMap<(Address, [u8; 4]), Bytes>,
}

/// An in-memory chain recording every deployment & transaction
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer calls with `selector` to `to` with `value`, encoded as a single return value
    pub fn respond<T: SolValue>(&self, to: Address, selector: [u8; 4], value: T) {
        self.respond_raw(to, selector, (value,).abi_encode_params());
    }

    /// Answer calls with `selector` to `to` with raw return data
    pub fn respond_raw(&self, to: Address, selector: [u8; 4], data: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert((to, selector), data.into());
    }

    pub fn deployments(&self) -> Vec<Deployment> {
        self.state.lock().unwrap().deployments.clone()
    }

    pub fn deployment(&self, contract: &str) -> Option<Deployment> {
        self.deployments()
            .into_iter()
            .find(|deployment| deployment.contract == contract)
    }

    pub fn transactions(&self) -> Vec<SentTx> {
        self.state.lock().unwrap().transactions.clone()
    }

    /// The transactions calling the function with `selector`, in order
    pub fn sent(&self, selector: [u8; 4]) -> Vec<SentTx> {
        self.transactions()
            .into_iter()
            .filter(|tx| tx.selector() == selector)
            .collect()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn sender(&self) -> Address {
        MOCK_DEPLOYER
    }

    async fn deploy(&self, contract: &str, init_code: Bytes) -> Result<Address, ScriptError> {
        let mut state = self.state.lock().unwrap();
        let address = MOCK_DEPLOYER.create(state.nonce);
        state.nonce += 1;
        state.deployments.push(Deployment {
            contract: contract.to_string(),
            address,
            init_code,
        });

        Ok(address)
    }

    async fn send(
        &self,
        contract: &str,
        to: Address,
        calldata: Bytes,
    ) -> Result<TxHash, ScriptError> {
        let mut state = self.state.lock().unwrap();
        state.nonce += 1;
        state.transactions.push(SentTx {
            contract: contract.to_string(),
            to,
            calldata,
        });

        Ok(B256::with_last_byte(state.transactions.len() as u8))
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ScriptError> {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&calldata[..4]);

        let state = self.state.lock().unwrap();
        state
            .responses
            .get(&(to, selector))
            .or_else(|| state.responses.get(&(Address::ZERO, selector)))
            .cloned()
            .ok_or_else(|| {
                ScriptError::ContractInteraction(format!(
                    "no response for 0x{} on {to:#x}",
                    hex::encode(selector)
                ))
            })
    }
}

// ------------
// | VERIFIER |
// ------------

/// A verifier accepting & recording every submission
#[derive(Clone, Default)]
pub struct RecordingVerifier {
    submissions: Arc<Mutex<Vec<VerificationRequest>>>,
}

impl RecordingVerifier {
    pub fn submissions(&self) -> Vec<VerificationRequest> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn verified(&self, address: Address) -> bool {
        self.submissions().iter().any(|request| request.address == address)
    }
}

#[async_trait]
impl SourceVerifier for RecordingVerifier {
    async fn submit(&self, request: &VerificationRequest) -> Result<(), VerifyError> {
        self.submissions.lock().unwrap().push(request.clone());
        Ok(())
    }
}

// ------------
// | FIXTURES |
// ------------

/// One artifact per contract the scripts deploy; the pool links against its four libraries
pub fn test_artifacts() -> ArtifactStore {
    let plain = [
        MOCK_ERC20_ARTIFACT,
        WETH_ARTIFACT,
        ORACLE_ARTIFACT,
        ROUTER_ARTIFACT,
        LIQUIDATION_ROUTER_ARTIFACT,
        FUNDING_LIBRARY_ARTIFACT,
        LIQUIDATION_LIBRARY_ARTIFACT,
        RANGE_ORDER_LIBRARY_ARTIFACT,
        TRADING_LIBRARY_ARTIFACT,
        TOKEN_TEMPLATE_ARTIFACT,
        CLONE_FACTORY_ARTIFACT,
        FACTORY_ARTIFACT,
        USER_QUOTA_ARTIFACT,
        PROXY_ARTIFACT,
        DRIFTING_FEED_ARTIFACT,
        OWNED_FEED_ARTIFACT,
    ]
    .into_iter()
    .map(|name| Artifact {
        contract_name: name.to_string(),
        source_name: format!("contracts/{name}.sol"),
        bytecode: format!("0x{}", hex::encode(PLAIN_BYTECODE)),
        link_references: BTreeMap::new(),
    });

    ArtifactStore::in_memory(plain.chain(std::iter::once(pool_artifact())))
}

/// The pool artifact: `0x6080`, one placeholder per library, then `0x00`
pub fn pool_artifact() -> Artifact {
    let mut bytecode = "0x6080".to_string();
    let mut link_references = BTreeMap::new();
    for (i, library) in POOL_LIBRARIES.iter().enumerate() {
        bytecode.push_str(&format!("__${:0>34}$__", i));
        link_references.insert(
            format!("contracts/lib/{library}.sol"),
            BTreeMap::from([(
                library.to_string(),
                vec![LinkOffset {
                    start: 2 + 20 * i,
                    length: 20,
                }],
            )]),
        );
    }
    bytecode.push_str("00");

    Artifact {
        contract_name: POOL_ARTIFACT.to_string(),
        source_name: "contracts/DODOV3MM/D3Pool/D3MM.sol".to_string(),
        bytecode,
        link_references,
    }
}

/// A network config with the price feeds & externally owned contracts filled in
pub fn test_config() -> NetworkConfig {
    serde_json::from_value(test_config_json()).unwrap()
}

/// The JSON document [`test_config`] is parsed from
pub fn test_config_json() -> serde_json::Value {
    serde_json::json!({
        "deployedAddress": {
            "Maintainer": "0x00000000000000000000000000000000000000c1",
            "FeeRateModel": "0x00000000000000000000000000000000000000c2",
            "D3MM": ""
        },
        "chainlinkPriceFeed": {
            "BTCUSD": "0x00000000000000000000000000000000000000f1",
            "ETHUSD": "0x00000000000000000000000000000000000000f2",
            "DAIUSD": "0x00000000000000000000000000000000000000f3",
            "DODOUSD": "0x00000000000000000000000000000000000000f4"
        },
        "defaultAddress": {
            "DODOApproveProxy": "0x00000000000000000000000000000000000000a1",
            "wethAddress": "0x00000000000000000000000000000000000000a2"
        }
    })
}

/// A deployer over a fresh mock chain, with a recording verifier & both liquidators set
pub fn setup_deployer(
    config: NetworkConfig,
) -> (Deployer<MockChain>, MockChain, RecordingVerifier) {
    let chain = MockChain::new();
    let verifier = RecordingVerifier::default();

    let mut deployer = Deployer::new(
        chain.clone(),
        Box::new(verifier.clone()),
        test_artifacts(),
        config,
    );
    deployer.set_liquidators(LIQUIDATORS.to_vec());

    (deployer, chain, verifier)
}

//! Source-code verification of deployed contracts

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    time::Duration,
};

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    artifacts::ArtifactStore,
    constants::{
        ALREADY_VERIFIED_MESSAGE, VERIFICATION_ALREADY_PASSED, VERIFICATION_PASSED,
        VERIFICATION_PENDING, VERIFICATION_POLL_ATTEMPTS, VERIFICATION_POLL_INTERVAL_SECS,
    },
    errors::ScriptError,
};

/// A request to verify one deployed contract
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationRequest {
    /// The deployed contract
    pub address: Address,
    /// The artifact the contract was deployed from
    pub artifact: String,
    /// The ABI-encoded constructor arguments
    pub constructor_args: Vec<u8>,
    /// The libraries the contract was linked against
    pub libraries: BTreeMap<String, Address>,
}

/// The ways a verification submission can fail
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyError {
    /// The service reports the contract as verified by an earlier submission
    AlreadyVerified,
    /// The service rejected the submission with the given reason
    Rejected(String),
    /// The service could not be reached or answered garbage
    Transport(String),
}

impl Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::AlreadyVerified => write!(f, "{}", ALREADY_VERIFIED_MESSAGE),
            VerifyError::Rejected(reason) => write!(f, "{}", reason),
            VerifyError::Transport(msg) => write!(f, "verification service error: {}", msg),
        }
    }
}

/// What became of a verification attempt that did not fail
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verification {
    /// The service accepted the submission
    Verified,
    /// The contract was verified by an earlier submission
    AlreadyVerified,
    /// No verification service is configured
    Skipped,
}

/// A source verification service
#[async_trait]
pub trait SourceVerifier: Send + Sync {
    /// Whether submissions reach a verification service at all
    fn is_enabled(&self) -> bool {
        true
    }

    /// Submit a contract & wait for the service's verdict
    async fn submit(&self, request: &VerificationRequest) -> Result<(), VerifyError>;
}

/// Verify a contract, treating an already-verified contract as success
///
/// The service's typed [`VerifyError::AlreadyVerified`] is preferred; a plain
/// rejection is only swallowed when its reason is exactly the service's
/// "already verified" text. Every other failure is returned with its message intact.
pub async fn verify_contract(
    verifier: &dyn SourceVerifier,
    request: &VerificationRequest,
) -> Result<Verification, ScriptError> {
    if !verifier.is_enabled() {
        warn!(
            contract = %request.artifact,
            address = %request.address,
            "no verification service configured, skipping verification"
        );
        return Ok(Verification::Skipped);
    }

    match verifier.submit(request).await {
        Ok(()) => {
            info!(contract = %request.artifact, address = %request.address, "verified");
            Ok(Verification::Verified)
        }
        Err(VerifyError::AlreadyVerified) => {
            info!(address = %request.address, "{}", ALREADY_VERIFIED_MESSAGE);
            Ok(Verification::AlreadyVerified)
        }
        Err(VerifyError::Rejected(reason)) if reason == ALREADY_VERIFIED_MESSAGE => {
            info!(address = %request.address, "{}", reason);
            Ok(Verification::AlreadyVerified)
        }
        Err(e) => Err(ScriptError::ContractVerification(e.to_string())),
    }
}

/// A verifier used when no verification service is configured
#[derive(Clone, Copy, Debug, Default)]
pub struct SkipVerification;

#[async_trait]
impl SourceVerifier for SkipVerification {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn submit(&self, _request: &VerificationRequest) -> Result<(), VerifyError> {
        Ok(())
    }
}

/// The envelope of every Etherscan API response
#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    /// `"1"` on success, `"0"` on failure
    status: String,
    /// A short status message
    #[serde(default)]
    message: String,
    /// The payload: a GUID, a status line, or a failure reason
    result: String,
}

/// A [`SourceVerifier`] submitting standard-JSON input to an Etherscan-compatible API
pub struct EtherscanVerifier {
    /// The HTTP client
    http: reqwest::Client,
    /// The API endpoint
    api_url: String,
    /// The API key
    api_key: String,
    /// The chain the contracts live on
    chain_id: u64,
    /// Where to find each contract's compiler input
    artifacts: ArtifactStore,
}

impl EtherscanVerifier {
    /// Create a verifier for the given chain
    pub fn new(api_url: &str, api_key: &str, chain_id: u64, artifacts: ArtifactStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            chain_id,
            artifacts,
        }
    }

    /// Build the form fields of a `verifysourcecode` submission
    fn submission_form(
        &self,
        request: &VerificationRequest,
    ) -> Result<Vec<(&'static str, String)>, VerifyError> {
        let artifact = self
            .artifacts
            .artifact(&request.artifact)
            .map_err(|e| VerifyError::Transport(e.to_string()))?;
        let build_info = self
            .artifacts
            .build_info(&request.artifact)
            .map_err(|e| VerifyError::Transport(e.to_string()))?;

        let mut input = build_info.input;
        if !request.libraries.is_empty() {
            let libraries = serde_json::to_value(artifact.library_settings(&request.libraries))
                .map_err(|e| VerifyError::Transport(e.to_string()))?;
            if let Some(settings) = input.get_mut("settings").and_then(Value::as_object_mut) {
                settings.insert("libraries".to_string(), libraries);
            }
        }

        Ok(vec![
            ("module", "contract".to_string()),
            ("action", "verifysourcecode".to_string()),
            ("contractaddress", format!("{:#x}", request.address)),
            ("sourceCode", input.to_string()),
            ("codeformat", "solidity-standard-json-input".to_string()),
            (
                "contractname",
                format!("{}:{}", artifact.source_name, artifact.contract_name),
            ),
            ("compilerversion", format!("v{}", build_info.solc_long_version)),
            // Etherscan's spelling
            ("constructorArguements", hex::encode(&request.constructor_args)),
        ])
    }

    /// Poll the verification status of a submission until it leaves the queue
    async fn poll_status(&self, guid: &str) -> Result<(), VerifyError> {
        for _ in 0..VERIFICATION_POLL_ATTEMPTS {
            tokio::time::sleep(Duration::from_secs(VERIFICATION_POLL_INTERVAL_SECS)).await;

            let response: EtherscanResponse = self
                .http
                .get(&self.api_url)
                .query(&[
                    ("chainid", self.chain_id.to_string()),
                    ("apikey", self.api_key.clone()),
                    ("module", "contract".to_string()),
                    ("action", "checkverifystatus".to_string()),
                    ("guid", guid.to_string()),
                ])
                .send()
                .await
                .map_err(|e| VerifyError::Transport(e.to_string()))?
                .json()
                .await
                .map_err(|e| VerifyError::Transport(e.to_string()))?;
            debug!(guid, status = %response.result, "verification status");

            match response.result.as_str() {
                VERIFICATION_PENDING => continue,
                VERIFICATION_PASSED => return Ok(()),
                VERIFICATION_ALREADY_PASSED => return Err(VerifyError::AlreadyVerified),
                reason => return Err(VerifyError::Rejected(reason.to_string())),
            }
        }

        Err(VerifyError::Transport(format!(
            "verification {guid} still pending after {VERIFICATION_POLL_ATTEMPTS} polls"
        )))
    }
}

#[async_trait]
impl SourceVerifier for EtherscanVerifier {
    async fn submit(&self, request: &VerificationRequest) -> Result<(), VerifyError> {
        let form = self.submission_form(request)?;

        let response: EtherscanResponse = self
            .http
            .post(&self.api_url)
            .query(&[
                ("chainid", self.chain_id.to_string()),
                ("apikey", self.api_key.clone()),
            ])
            .form(&form)
            .send()
            .await
            .map_err(|e| VerifyError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| VerifyError::Transport(e.to_string()))?;

        if response.status != "1" {
            debug!(message = %response.message, "verification submission rejected");
            return Err(VerifyError::Rejected(response.result));
        }

        self.poll_status(&response.result).await
    }
}

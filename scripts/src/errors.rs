//! Definitions of errors that can occur during the execution of the deploy & admin scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy & admin scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading the network config file
    ReadDeployments(String),
    /// Error writing the network config file
    WriteDeployments(String),
    /// Error reading or parsing a Hardhat compilation artifact
    ArtifactParsing(String),
    /// Error linking library addresses into a contract's bytecode
    Linking(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// A transaction was included but reverted
    TransactionReverted(String),
    /// Error decoding the return data of a contract call
    Decoding(String),
    /// Error verifying a contract's source code
    ContractVerification(String),
    /// A value the script needs is absent from the network config or CLI
    MissingConfig(String),
    /// A logical name already records a different address
    RecordConflict(String),
    /// Error reading the system clock
    Clock(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::Linking(s) => write!(f, "error linking libraries: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::TransactionReverted(s) => write!(f, "transaction reverted: {}", s),
            ScriptError::Decoding(s) => write!(f, "error decoding return data: {}", s),
            // Verification messages are surfaced verbatim
            ScriptError::ContractVerification(s) => write!(f, "{}", s),
            ScriptError::MissingConfig(s) => write!(f, "missing configuration: {}", s),
            ScriptError::RecordConflict(s) => write!(f, "deployment record conflict: {}", s),
            ScriptError::Clock(s) => write!(f, "error reading system clock: {}", s),
        }
    }
}

impl Error for ScriptError {}

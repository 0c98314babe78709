//! Scripts for deploying, administering & inspecting the D3MM contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod admin;
pub mod artifacts;
pub mod cli;
mod commands;
pub mod client;
pub mod constants;
pub mod deploy;
pub mod deployments;
pub mod errors;
pub mod inspect;
pub mod solidity;
pub mod types;
pub mod utils;
pub mod verify;

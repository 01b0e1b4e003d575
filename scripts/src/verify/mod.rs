//! Best-effort source verification on a block explorer

use std::time::Duration;

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    config::NetworkConfig, constants::ALREADY_VERIFIED_MARKER, deploy::artifact::ContractArtifact,
    errors::ScriptError, types::VerificationOutcome,
};

pub mod etherscan;

use etherscan::EtherscanVerifier;

/// Everything an explorer needs to match deployed bytecode with its source
#[derive(Clone, Debug)]
pub struct VerificationRequest {
    /// Address of the deployed contract
    pub address: Address,
    /// `<source>:<name>` of the contract
    pub contract_name: String,
    /// Full solc version, without the leading `v`
    pub compiler_version: Option<String>,
    /// Standard JSON input the contract was compiled from
    pub standard_json_input: Option<Value>,
    /// ABI-encoded constructor arguments
    pub constructor_args: Bytes,
}

impl VerificationRequest {
    /// The request for a contract deployed from `artifact` at `address`
    pub fn for_artifact(
        artifact: &ContractArtifact,
        address: Address,
        constructor_args: Bytes,
    ) -> Self {
        let build_info = artifact.build_info.as_ref();
        VerificationRequest {
            address,
            contract_name: artifact.fully_qualified_name(),
            compiler_version: build_info.map(|info| info.solc_long_version.clone()),
            standard_json_input: build_info.map(|info| info.input.clone()),
            constructor_args,
        }
    }
}

/// A block explorer able to verify contract sources
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Submits the request, returning once the explorer accepted or rejected it
    async fn verify(&self, request: &VerificationRequest) -> Result<(), ScriptError>;
}

/// The verifier a network is configured with
pub enum ConfiguredVerifier {
    /// The network has an Etherscan-compatible explorer
    Etherscan(EtherscanVerifier),
    /// Verification is impossible on this network, for the given reason
    Unavailable(String),
}

impl ConfiguredVerifier {
    /// Picks the verifier matching the network's explorer settings
    pub fn for_network(network: &NetworkConfig, poll_interval: Duration) -> Self {
        let Some(explorer) = &network.explorer else {
            return ConfiguredVerifier::Unavailable(format!(
                "no block explorer configured for network `{}`",
                network.name
            ));
        };

        match EtherscanVerifier::new(explorer, poll_interval) {
            Ok(verifier) => ConfiguredVerifier::Etherscan(verifier),
            Err(e) => ConfiguredVerifier::Unavailable(e.to_string()),
        }
    }
}

#[async_trait]
impl Verifier for ConfiguredVerifier {
    async fn verify(&self, request: &VerificationRequest) -> Result<(), ScriptError> {
        match self {
            ConfiguredVerifier::Etherscan(verifier) => verifier.verify(request).await,
            ConfiguredVerifier::Unavailable(reason) => {
                Err(ScriptError::Verification(reason.clone()))
            }
        }
    }
}

impl VerificationOutcome {
    /// Classifies a verification error message
    pub fn from_error_message(message: &str) -> Self {
        if message.to_lowercase().contains(ALREADY_VERIFIED_MARKER) {
            VerificationOutcome::AlreadyVerified
        } else {
            VerificationOutcome::Failed(message.to_string())
        }
    }
}

/// Runs one verification attempt, reducing any error to an outcome
pub async fn verify_contract(
    verifier: &impl Verifier,
    request: &VerificationRequest,
) -> VerificationOutcome {
    info!("Verifying contract...");

    let outcome = match verifier.verify(request).await {
        Ok(()) => VerificationOutcome::Verified,
        Err(e) => VerificationOutcome::from_error_message(&e.to_string()),
    };

    match &outcome {
        VerificationOutcome::Verified => info!("Verified {:#x}", request.address),
        VerificationOutcome::AlreadyVerified => info!("Already Verified!"),
        VerificationOutcome::Failed(reason) => {
            warn!("Verification of {:#x} failed: {}", request.address, reason)
        }
    }

    outcome
}

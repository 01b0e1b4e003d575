//! Type definitions used throughout the scripts

use std::{
    convert::Infallible,
    fmt::{self, Display},
    str::FromStr,
};

use alloy::primitives::{Address, TxHash};

/// A single constructor argument, as given on the command line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstructorArg {
    /// A string, addresses included
    Str(String),
    /// A decimal integer, kept as typed
    Number(String),
    /// A boolean
    Bool(bool),
}

impl FromStr for ConstructorArg {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "true" => ConstructorArg::Bool(true),
            "false" => ConstructorArg::Bool(false),
            _ if s.parse::<i128>().is_ok() => ConstructorArg::Number(s.to_string()),
            _ => ConstructorArg::Str(s.to_string()),
        })
    }
}

impl Display for ConstructorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructorArg::Str(s) => write!(f, "{}", s),
            ConstructorArg::Number(n) => write!(f, "{}", n),
            ConstructorArg::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<Address> for ConstructorArg {
    fn from(address: Address) -> Self {
        ConstructorArg::Str(address.to_checksum(None))
    }
}

/// A request to deploy one contract
#[derive(Clone, Debug)]
pub struct DeploymentRequest {
    /// Name of the contract, as found in the artifacts
    pub contract_name: String,
    /// Label written next to the address in the address book
    pub label: String,
    /// Ordered constructor arguments
    pub constructor_args: Vec<ConstructorArg>,
    /// Name of the network deployed to
    pub network_name: String,
}

/// The on-chain result of a deployment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentResult {
    /// Address of the deployed contract
    pub contract_address: Address,
    /// Hash of the contract creation transaction
    pub transaction_hash: TxHash,
    /// Block the creation transaction was mined in
    pub block_number: u64,
    /// Confirmations observed before moving on
    pub confirmed_block_depth: u64,
}

/// Outcome of a best-effort verification attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The explorer accepted the source
    Verified,
    /// The explorer already knew the source
    AlreadyVerified,
    /// Verification failed for the given reason
    Failed(String),
}

impl Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationOutcome::Verified => write!(f, "verified"),
            VerificationOutcome::AlreadyVerified => write!(f, "already verified"),
            VerificationOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Everything a deployment run produced
#[derive(Clone, Debug)]
pub struct DeploymentReport {
    /// The on-chain result
    pub result: DeploymentResult,
    /// The verification outcome, `None` when verification was disabled
    pub verification: Option<VerificationOutcome>,
    /// Whether the address book entry was written
    pub recorded: bool,
}

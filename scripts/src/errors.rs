//! Definitions of errors that can occur during the execution of the deployment scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deployment scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error assembling the deployment configuration
    Configuration(String),
    /// Error reading or parsing a compilation artifact
    ArtifactParsing(String),
    /// Error ABI-encoding the constructor arguments
    ArgumentEncoding(String),
    /// Error when creating the client
    ClientInitialization(String),
    /// No signing account is available on the configured network
    NoSigner,
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error while waiting for block confirmations
    Confirmation(String),
    /// Error verifying a contract on the block explorer
    Verification(String),
    /// Error appending to the address book
    AddressBook(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Configuration(s) => write!(f, "invalid configuration: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ArgumentEncoding(s) => {
                write!(f, "error encoding constructor arguments: {}", s)
            }
            ScriptError::ClientInitialization(s) => write!(f, "error during client init: {}", s),
            ScriptError::NoSigner => write!(f, "no signing account available on the network"),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::Confirmation(s) => {
                write!(f, "error waiting for block confirmations: {}", s)
            }
            ScriptError::Verification(s) => write!(f, "{}", s),
            ScriptError::AddressBook(s) => write!(f, "error writing address book: {}", s),
        }
    }
}

impl Error for ScriptError {}

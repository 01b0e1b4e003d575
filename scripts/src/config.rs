//! Assembly of the deployment configuration.
//!
//! Everything the workflow needs from the environment is resolved here, once,
//! into a [`DeployConfig`] that is then passed around explicitly.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    constants::{ALCHEMY_KEY_ENV_VAR, LOCAL_RPC},
    errors::ScriptError,
};

/// Connection details of the block explorer used for verification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// Base url of the Etherscan-compatible API
    pub api_url: String,
    /// API key, verification fails without one
    pub api_key: Option<String>,
}

/// A network the scripts can deploy to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Name written to the address book
    pub name: String,
    /// Expected chain id, checked against the node when set
    pub chain_id: Option<u64>,
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Block explorer, if the network has one
    pub explorer: Option<ExplorerConfig>,
}

/// Overrides given on the command line, on top of the network presets
#[derive(Clone, Debug, Default)]
pub struct NetworkOverrides {
    /// RPC url to use instead of the preset one
    pub rpc_url: Option<String>,
    /// Chain id to expect instead of the preset one
    pub chain_id: Option<u64>,
    /// Explorer API url to use instead of the preset one
    pub explorer_api_url: Option<String>,
    /// Explorer API key
    pub explorer_api_key: Option<String>,
    /// Alchemy key, used to build the goerli RPC url
    pub alchemy_key: Option<String>,
}

impl NetworkConfig {
    /// Resolves a network by name, applying the given overrides
    pub fn resolve(name: &str, overrides: NetworkOverrides) -> Result<Self, ScriptError> {
        let (chain_id, rpc_url, explorer_api_url) = match name {
            "hardhat" => (Some(1337), Some(LOCAL_RPC.to_string()), None),
            "localhost" => (Some(31337), Some(LOCAL_RPC.to_string()), None),
            "bsc" => (
                Some(56),
                Some("https://bsc-dataseed1.binance.org/".to_string()),
                Some("https://api.bscscan.com/api"),
            ),
            "goerli" => (
                Some(5),
                overrides
                    .alchemy_key
                    .as_ref()
                    .map(|key| format!("https://eth-goerli.g.alchemy.com/v2/{}", key)),
                Some("https://api-goerli.etherscan.io/api"),
            ),
            _ => (None, None, None),
        };

        let rpc_url = overrides.rpc_url.or(rpc_url).ok_or_else(|| {
            ScriptError::Configuration(match name {
                "goerli" => format!("goerli needs either --rpc-url or {}", ALCHEMY_KEY_ENV_VAR),
                _ => format!("unknown network `{}`, an --rpc-url is required", name),
            })
        })?;

        let explorer = overrides
            .explorer_api_url
            .or(explorer_api_url.map(str::to_string))
            .map(|api_url| ExplorerConfig {
                api_url,
                api_key: overrides.explorer_api_key,
            });

        Ok(NetworkConfig {
            name: name.to_string(),
            chain_id: overrides.chain_id.or(chain_id),
            rpc_url,
            explorer,
        })
    }
}

/// Knobs of the deploy-and-record workflow
#[derive(Clone, Debug)]
pub struct WorkflowOptions {
    /// Confirmations to wait for after the deployment is mined
    pub confirmations: u64,
    /// Whether to verify the contract on the block explorer
    pub verify: bool,
    /// Upper bound on the confirmation wait, unbounded when `None`
    pub confirmation_timeout: Option<Duration>,
    /// Interval between two polls of the node
    pub poll_interval: Duration,
}

/// The full configuration of one script run
#[derive(Clone, Debug)]
pub struct DeployConfig {
    /// Network to deploy to
    pub network: NetworkConfig,
    /// Deployer private key, node accounts are used when absent
    pub private_key: Option<String>,
    /// Directory holding the Hardhat artifacts
    pub artifacts_dir: PathBuf,
    /// Path of the address book
    pub address_book: PathBuf,
    /// Workflow knobs
    pub workflow: WorkflowOptions,
}

/// Picks the private key from the flag, falling back to the key file when it exists
pub fn load_private_key(
    priv_key: Option<String>,
    priv_key_file: &Path,
) -> Result<Option<String>, ScriptError> {
    if let Some(key) = priv_key {
        return Ok(Some(key.trim().to_string()));
    }

    if !priv_key_file.exists() {
        return Ok(None);
    }

    let key = fs::read_to_string(priv_key_file)
        .map_err(|e| ScriptError::Configuration(e.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Ok(None);
    }

    Ok(Some(key.to_string()))
}

//! Definitions of CLI arguments and commands for deploy scripts

use std::{path::PathBuf, time::Duration};

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::{
    commands::{deploy_admin, deploy_any, deploy_staking, deploy_token, verify_deployed},
    config::{load_private_key, DeployConfig, NetworkConfig, NetworkOverrides, WorkflowOptions},
    constants::{
        ALCHEMY_KEY_ENV_VAR, DEFAULT_ADDRESS_BOOK, DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIRMATIONS,
        DEFAULT_POLL_INTERVAL_MS, DEFAULT_PRIV_KEY_FILE,
    },
    errors::ScriptError,
    types::{ConstructorArg, DeploymentReport},
};

/// Scripts for deploying, verifying & recording the Greenlers contracts
#[derive(Parser)]
pub struct Cli {
    /// Name of the target network (hardhat, localhost, bsc, goerli, or any name with --rpc-url)
    #[arg(short, long, env = "NETWORK", default_value = "hardhat")]
    pub network: String,

    /// Network RPC URL, overriding the network preset
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Expected chain id, overriding the network preset
    #[arg(long)]
    pub chain_id: Option<u64>,

    /// Private key of the deployer
    #[arg(short, long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub priv_key: Option<String>,

    /// File holding the deployer's private key, read when no key is given
    #[arg(long, default_value = DEFAULT_PRIV_KEY_FILE)]
    pub priv_key_file: PathBuf,

    /// API key of the block explorer
    #[arg(long, env = "BSCSCAN_API_KEY", hide_env_values = true)]
    pub etherscan_api_key: Option<String>,

    /// Url of the block explorer API, overriding the network preset
    #[arg(long)]
    pub explorer_api_url: Option<String>,

    /// Alchemy key used to build the goerli RPC URL
    #[arg(long, env = ALCHEMY_KEY_ENV_VAR, hide_env_values = true)]
    pub alchemy_key: Option<String>,

    /// Number of block confirmations to wait for before verifying
    #[arg(long, default_value_t = DEFAULT_CONFIRMATIONS)]
    pub confirmations: u64,

    /// Skip source verification
    #[arg(long)]
    pub no_verify: bool,

    /// Give up waiting for confirmations after this many seconds
    #[arg(long)]
    pub confirmation_timeout_secs: Option<u64>,

    /// Interval between two chain polls, in milliseconds
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    /// Directory of the compiled contract artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// File deployed addresses are appended to
    #[arg(long, default_value = DEFAULT_ADDRESS_BOOK)]
    pub address_book: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Resolves the network, the deployer key and the workflow options
    pub fn deploy_config(&self) -> Result<DeployConfig, ScriptError> {
        let network = NetworkConfig::resolve(
            &self.network,
            NetworkOverrides {
                rpc_url: self.rpc_url.clone(),
                chain_id: self.chain_id,
                explorer_api_url: self.explorer_api_url.clone(),
                explorer_api_key: self.etherscan_api_key.clone(),
                alchemy_key: self.alchemy_key.clone(),
            },
        )?;

        let private_key = load_private_key(self.priv_key.clone(), &self.priv_key_file)?;

        Ok(DeployConfig {
            network,
            private_key,
            artifacts_dir: self.artifacts.clone(),
            address_book: self.address_book.clone(),
            workflow: WorkflowOptions {
                confirmations: self.confirmations,
                verify: !self.no_verify,
                confirmation_timeout: self.confirmation_timeout_secs.map(Duration::from_secs),
                poll_interval: Duration::from_millis(self.poll_interval_ms),
            },
        })
    }
}

/// The possible CLI commands
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the Greenlers token
    DeployToken,
    /// Deploy the staking contract
    DeployStaking(DeployStakingArgs),
    /// Deploy the admin / presale contract
    DeployAdmin(DeployAdminArgs),
    /// Deploy any compiled contract
    Deploy(DeployArgs),
    /// Verify an already deployed contract
    Verify(VerifyArgs),
}

impl Command {
    /// Run the command
    pub async fn run(self, config: DeployConfig) -> Result<(), ScriptError> {
        let report = match self {
            Command::DeployToken => {
                info!("Deploying token...");
                deploy_token(config).await?
            }
            Command::DeployStaking(args) => {
                info!("Deploying staking...");
                deploy_staking(args, config).await?
            }
            Command::DeployAdmin(args) => {
                info!("Deploying admin...");
                deploy_admin(args, config).await?
            }
            Command::Deploy(args) => {
                info!("Deploying {}...", args.contract);
                deploy_any(args, config).await?
            }
            Command::Verify(args) => {
                verify_deployed(args, config).await?;
                return Ok(());
            }
        };

        log_report(&report);
        Ok(())
    }
}

/// Summarizes a finished deployment
fn log_report(report: &DeploymentReport) {
    info!(
        "Deployed at {:#x} (tx {}, block {}, {} confirmations)",
        report.result.contract_address,
        report.result.transaction_hash,
        report.result.block_number,
        report.result.confirmed_block_depth
    );
    match &report.verification {
        Some(outcome) => info!("Verification: {}", outcome),
        None => info!("Verification skipped"),
    }
}

/// Deploy the staking contract
#[derive(Args)]
pub struct DeployStakingArgs {
    /// Address of the deployed token
    #[arg(short, long)]
    pub token: Address,
}

/// Deploy the admin / presale contract
#[derive(Args)]
pub struct DeployAdminArgs {
    /// Address of the deployed token
    #[arg(short, long)]
    pub token: Address,
    /// Address of the stable token the presale is paid in
    #[arg(short, long)]
    pub stable_token: Address,
}

/// Deploy any compiled contract
#[derive(Args)]
pub struct DeployArgs {
    /// Name of the contract in the artifacts
    #[arg(short, long)]
    pub contract: String,
    /// Label of the address book entry, defaults to the upper-cased contract name
    #[arg(short, long)]
    pub label: Option<String>,
    /// Constructor arguments, in order
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<ConstructorArg>,
}

/// Verify an already deployed contract
#[derive(Args)]
pub struct VerifyArgs {
    /// Name of the contract in the artifacts
    #[arg(short, long)]
    pub contract: String,
    /// Address the contract is deployed at
    #[arg(short, long)]
    pub address: Address,
    /// Constructor arguments it was deployed with, in order
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<ConstructorArg>,
}

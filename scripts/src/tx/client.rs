//! A [`ChainClient`] over JSON-RPC, and the trait the deploy workflow is written against

use std::{str::FromStr, time::Duration};

use alloy::{
    network::{EthereumWallet, ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::eth::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use reqwest::Url;
use tracing::info;

use crate::{config::NetworkConfig, errors::ScriptError};

/// What the chain reports once a contract creation transaction is mined
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentReceipt {
    /// Hash of the creation transaction
    pub transaction_hash: TxHash,
    /// Address the contract was created at
    pub contract_address: Address,
    /// Block the transaction was mined in
    pub block_number: u64,
}

/// The subset of a chain connection the deployment workflow relies on
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The account deployments are sent from
    async fn signer(&self) -> Result<Address, ScriptError>;

    /// Submits a contract creation transaction, returning its hash
    async fn send_deployment(&self, from: Address, init_code: Bytes)
        -> Result<TxHash, ScriptError>;

    /// Suspends until the given creation transaction is mined
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<DeploymentReceipt, ScriptError>;

    /// The current head block number
    async fn block_number(&self) -> Result<u64, ScriptError>;
}

/// A [`ChainClient`] talking JSON-RPC over HTTP.
///
/// Transactions are signed locally when a private key is configured,
/// otherwise the node is expected to hold an unlocked account.
pub struct RpcChainClient {
    /// The underlying provider, with a wallet filler when signing locally
    provider: DynProvider,
    /// Address of the local signer, if any
    local_signer: Option<Address>,
    /// Interval between two receipt polls
    poll_interval: Duration,
}

impl RpcChainClient {
    /// Connects to the network, checking the node's chain id against the configured one
    pub async fn connect(
        network: &NetworkConfig,
        private_key: Option<&str>,
        poll_interval: Duration,
    ) -> Result<Self, ScriptError> {
        let url = network
            .rpc_url
            .parse::<Url>()
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

        let (provider, local_signer) = match private_key {
            Some(key) => {
                let signer = PrivateKeySigner::from_str(key)
                    .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
                let address = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(url)
                    .erased();
                (provider, Some(address))
            }
            None => (ProviderBuilder::new().connect_http(url).erased(), None),
        };

        // Fetch chain id
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        check_chain_id(network, chain_id)?;

        info!("Built client on chain ID: {}", chain_id);

        Ok(RpcChainClient {
            provider,
            local_signer,
            poll_interval,
        })
    }
}

/// Fails when the node is not on the chain the network is configured for
pub fn check_chain_id(network: &NetworkConfig, reported: u64) -> Result<(), ScriptError> {
    match network.chain_id {
        Some(expected) if expected != reported => Err(ScriptError::ClientInitialization(format!(
            "network `{}` expects chain id {} but the node reports {}",
            network.name, expected, reported
        ))),
        _ => Ok(()),
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn signer(&self) -> Result<Address, ScriptError> {
        if let Some(address) = self.local_signer {
            return Ok(address);
        }

        let accounts = self
            .provider
            .get_accounts()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        accounts.first().copied().ok_or(ScriptError::NoSigner)
    }

    async fn send_deployment(
        &self,
        from: Address,
        init_code: Bytes,
    ) -> Result<TxHash, ScriptError> {
        let tx_request = TransactionRequest::default()
            .with_from(from)
            .with_deploy_code(init_code);

        let pending_tx = self
            .provider
            .send_transaction(tx_request)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        Ok(*pending_tx.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<DeploymentReceipt, ScriptError> {
        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

            let Some(receipt) = receipt else {
                tokio::time::sleep(self.poll_interval).await;
                continue;
            };

            if !ReceiptResponse::status(&receipt) {
                return Err(ScriptError::ContractDeployment(format!(
                    "creation transaction {} reverted",
                    tx_hash
                )));
            }

            let contract_address = ReceiptResponse::contract_address(&receipt).ok_or_else(|| {
                ScriptError::ContractDeployment(format!(
                    "receipt of {} carries no contract address",
                    tx_hash
                ))
            })?;
            let block_number = ReceiptResponse::block_number(&receipt).ok_or_else(|| {
                ScriptError::ContractDeployment(format!(
                    "receipt of {} carries no block number",
                    tx_hash
                ))
            })?;

            return Ok(DeploymentReceipt {
                transaction_hash: tx_hash,
                contract_address,
                block_number,
            });
        }
    }

    async fn block_number(&self) -> Result<u64, ScriptError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ScriptError::Confirmation(e.to_string()))
    }
}

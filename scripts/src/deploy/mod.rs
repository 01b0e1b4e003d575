//! The deploy-and-record workflow shared by every deploy command

use std::time::Duration;

use tracing::{error, info};

use crate::{
    config::WorkflowOptions,
    errors::ScriptError,
    output_writer::{AddressBook, AddressBookEntry},
    tx::client::ChainClient,
    types::{DeploymentReport, DeploymentRequest, DeploymentResult},
    verify::{verify_contract, VerificationRequest, Verifier},
};

pub mod artifact;

use artifact::ContractArtifact;

/// Deploys a contract, waits for confirmations, verifies it and records its address.
///
/// Only the deployment itself (signer, submission, mining, confirmations) can fail
/// the run. Verification and the address book write are best-effort and their
/// outcome is reported in the returned [`DeploymentReport`].
pub async fn deploy_and_record(
    client: &impl ChainClient,
    verifier: &impl Verifier,
    address_book: &AddressBook,
    options: &WorkflowOptions,
    request: &DeploymentRequest,
    artifact: &ContractArtifact,
) -> Result<DeploymentReport, ScriptError> {
    // Encode the constructor arguments before touching the chain
    let constructor_args = artifact.encode_constructor_args(&request.constructor_args)?;

    let deployer = client.signer().await?;
    info!("Deploying {} with the account: {:#x}", request.contract_name, deployer);

    let tx_hash = client
        .send_deployment(deployer, artifact.init_code(&constructor_args))
        .await?;
    info!("Pending deployment transaction... {}", tx_hash);

    let receipt = client.wait_for_receipt(tx_hash).await?;
    info!(
        "{} deployed at {:#x} in block {}",
        request.contract_name, receipt.contract_address, receipt.block_number
    );

    let confirmed_block_depth = match options.confirmation_timeout {
        Some(timeout) => tokio::time::timeout(
            timeout,
            wait_for_confirmations(
                client,
                receipt.block_number,
                options.confirmations,
                options.poll_interval,
            ),
        )
        .await
        .map_err(|_| {
            ScriptError::Confirmation(format!(
                "no {} confirmations after {:?}",
                options.confirmations, timeout
            ))
        })??,
        None => {
            wait_for_confirmations(
                client,
                receipt.block_number,
                options.confirmations,
                options.poll_interval,
            )
            .await?
        }
    };

    let result = DeploymentResult {
        contract_address: receipt.contract_address,
        transaction_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        confirmed_block_depth,
    };

    let verification = if options.verify {
        let verification_request =
            VerificationRequest::for_artifact(artifact, result.contract_address, constructor_args);
        Some(verify_contract(verifier, &verification_request).await)
    } else {
        None
    };

    info!(
        "{} DEPLOYED TO: {:#x}",
        request.label,
        result.contract_address
    );

    let entry = AddressBookEntry {
        network: request.network_name.clone(),
        label: request.label.clone(),
        address: result.contract_address,
    };
    let recorded = match address_book.append(&entry) {
        Ok(()) => {
            info!("Recorded address in {}", address_book.path().display());
            true
        }
        Err(e) => {
            error!("{}, {:#x} is deployed but unrecorded", e, result.contract_address);
            false
        }
    };

    Ok(DeploymentReport {
        result,
        verification,
        recorded,
    })
}

/// Polls the head block until `required` confirmations of `mined_in` are observed.
///
/// The block the transaction was mined in counts as the first confirmation.
/// Returns the number of confirmations observed.
pub async fn wait_for_confirmations(
    client: &impl ChainClient,
    mined_in: u64,
    required: u64,
    poll_interval: Duration,
) -> Result<u64, ScriptError> {
    loop {
        let head = client.block_number().await?;
        let confirmations = head.saturating_add(1).saturating_sub(mined_in);
        if confirmations >= required {
            info!("{} block confirmations observed", confirmations);
            return Ok(confirmations);
        }

        tokio::time::sleep(poll_interval).await;
    }
}

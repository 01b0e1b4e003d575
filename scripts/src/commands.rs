//! Implementations of the deploy and verify commands

use tracing::info;

use crate::{
    cli::{DeployAdminArgs, DeployArgs, DeployStakingArgs, VerifyArgs},
    config::DeployConfig,
    constants::{
        ADMIN_CONTRACT, ADMIN_LABEL, STAKING_CONTRACT, STAKING_LABEL, TOKEN_CONTRACT, TOKEN_LABEL,
    },
    deploy::{artifact::ContractArtifact, deploy_and_record},
    errors::ScriptError,
    output_writer::AddressBook,
    tx::client::RpcChainClient,
    types::{ConstructorArg, DeploymentReport, DeploymentRequest, VerificationOutcome},
    verify::{verify_contract, ConfiguredVerifier, VerificationRequest},
};

/// Deploy the Greenlers token
pub async fn deploy_token(config: DeployConfig) -> Result<DeploymentReport, ScriptError> {
    deploy_contract(config, TOKEN_CONTRACT, TOKEN_LABEL, vec![]).await
}

/// Deploy the staking contract, staking the given token
pub async fn deploy_staking(
    args: DeployStakingArgs,
    config: DeployConfig,
) -> Result<DeploymentReport, ScriptError> {
    deploy_contract(
        config,
        STAKING_CONTRACT,
        STAKING_LABEL,
        vec![args.token.into()],
    )
    .await
}

/// Deploy the admin / presale contract
pub async fn deploy_admin(
    args: DeployAdminArgs,
    config: DeployConfig,
) -> Result<DeploymentReport, ScriptError> {
    deploy_contract(
        config,
        ADMIN_CONTRACT,
        ADMIN_LABEL,
        vec![args.token.into(), args.stable_token.into()],
    )
    .await
}

/// Deploy any contract found in the artifacts
pub async fn deploy_any(
    args: DeployArgs,
    config: DeployConfig,
) -> Result<DeploymentReport, ScriptError> {
    let label = args
        .label
        .unwrap_or_else(|| args.contract.to_uppercase());
    deploy_contract(config, &args.contract, &label, args.args).await
}

/// Runs the deploy-and-record workflow against the configured network
async fn deploy_contract(
    config: DeployConfig,
    contract_name: &str,
    label: &str,
    constructor_args: Vec<ConstructorArg>,
) -> Result<DeploymentReport, ScriptError> {
    let artifact = ContractArtifact::load(&config.artifacts_dir, contract_name)?;

    let client = RpcChainClient::connect(
        &config.network,
        config.private_key.as_deref(),
        config.workflow.poll_interval,
    )
    .await?;
    let verifier = ConfiguredVerifier::for_network(&config.network, config.workflow.poll_interval);
    let address_book = AddressBook::new(&config.address_book);

    let request = DeploymentRequest {
        contract_name: contract_name.to_string(),
        label: label.to_string(),
        constructor_args,
        network_name: config.network.name.clone(),
    };

    deploy_and_record(
        &client,
        &verifier,
        &address_book,
        &config.workflow,
        &request,
        &artifact,
    )
    .await
}

/// Verify an already deployed contract.
///
/// Verification is best-effort, a failure is reported but does not fail the command.
pub async fn verify_deployed(
    args: VerifyArgs,
    config: DeployConfig,
) -> Result<VerificationOutcome, ScriptError> {
    let artifact = ContractArtifact::load(&config.artifacts_dir, &args.contract)?;
    let constructor_args = artifact.encode_constructor_args(&args.args)?;

    let verifier = ConfiguredVerifier::for_network(&config.network, config.workflow.poll_interval);
    let request = VerificationRequest::for_artifact(&artifact, args.address, constructor_args);

    let outcome = verify_contract(&verifier, &request).await;
    info!("Verification of {:#x}: {}", args.address, outcome);

    Ok(outcome)
}

//! Runs the deploy-and-record workflow against an in-memory chain and explorer

use std::{
    fs,
    path::Path,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use alloy::primitives::{address, b256, Address, Bytes, TxHash};
use async_trait::async_trait;
use scripts::{
    config::WorkflowOptions,
    deploy::{artifact::ContractArtifact, deploy_and_record},
    errors::ScriptError,
    output_writer::AddressBook,
    tx::client::{ChainClient, DeploymentReceipt},
    types::{ConstructorArg, DeploymentRequest, VerificationOutcome},
    verify::{VerificationRequest, Verifier},
};

const DEPLOYER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
const DEPLOYED_AT: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
const TX_HASH: TxHash = b256!("1111111111111111111111111111111111111111111111111111111111111111");
const MINED_IN: u64 = 10;

/// A chain whose head advances by one block every time it is queried
struct FakeChain {
    head: Arc<AtomicU64>,
    advance: bool,
    fail_deployment: bool,
    deployed_code: Mutex<Option<Bytes>>,
}

impl FakeChain {
    fn new(head: Arc<AtomicU64>) -> Self {
        Self {
            head,
            advance: true,
            fail_deployment: false,
            deployed_code: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn signer(&self) -> Result<Address, ScriptError> {
        Ok(DEPLOYER)
    }

    async fn send_deployment(
        &self,
        from: Address,
        init_code: Bytes,
    ) -> Result<TxHash, ScriptError> {
        assert_eq!(from, DEPLOYER);
        if self.fail_deployment {
            return Err(ScriptError::ContractDeployment("insufficient funds".to_string()));
        }

        *self.deployed_code.lock().unwrap() = Some(init_code);
        Ok(TX_HASH)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<DeploymentReceipt, ScriptError> {
        self.head.store(MINED_IN, Ordering::SeqCst);
        Ok(DeploymentReceipt {
            transaction_hash: tx_hash,
            contract_address: DEPLOYED_AT,
            block_number: MINED_IN,
        })
    }

    async fn block_number(&self) -> Result<u64, ScriptError> {
        if self.advance {
            Ok(self.head.fetch_add(1, Ordering::SeqCst))
        } else {
            Ok(self.head.load(Ordering::SeqCst))
        }
    }
}

/// An explorer recording the head block each verification was requested at
struct FakeExplorer {
    head: Arc<AtomicU64>,
    answer: Result<(), String>,
    calls: Mutex<Vec<(u64, VerificationRequest)>>,
}

impl FakeExplorer {
    fn new(head: Arc<AtomicU64>, answer: Result<(), String>) -> Self {
        Self {
            head,
            answer,
            calls: Mutex::new(vec![]),
        }
    }

    fn calls(&self) -> Vec<(u64, VerificationRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Verifier for FakeExplorer {
    async fn verify(&self, request: &VerificationRequest) -> Result<(), ScriptError> {
        let head = self.head.load(Ordering::SeqCst);
        self.calls.lock().unwrap().push((head, request.clone()));
        self.answer.clone().map_err(ScriptError::Verification)
    }
}

fn example_token() -> ContractArtifact {
    ContractArtifact {
        contract_name: "ExampleToken".to_string(),
        source_name: "contracts/ExampleToken.sol".to_string(),
        abi: serde_json::from_str(
            r#"[{
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [{ "name": "supply", "type": "uint256", "internalType": "uint256" }]
            }]"#,
        )
        .unwrap(),
        bytecode: Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]),
        build_info: None,
    }
}

fn request(label: &str) -> DeploymentRequest {
    DeploymentRequest {
        contract_name: "ExampleToken".to_string(),
        label: label.to_string(),
        constructor_args: vec![ConstructorArg::Number("1000".to_string())],
        network_name: "hardhat".to_string(),
    }
}

fn options(confirmations: u64) -> WorkflowOptions {
    WorkflowOptions {
        confirmations,
        verify: true,
        confirmation_timeout: None,
        poll_interval: Duration::ZERO,
    }
}

fn read_book(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn verifies_after_the_confirmations_and_records_the_address() {
    let dir = tempfile::tempdir().unwrap();
    let book = AddressBook::new(dir.path().join("contracts").join("addressBook.md"));
    let head = Arc::new(AtomicU64::new(0));
    let chain = FakeChain::new(head.clone());
    let explorer = FakeExplorer::new(head.clone(), Ok(()));

    let report = deploy_and_record(
        &chain,
        &explorer,
        &book,
        &options(6),
        &request("GREENLERS TOKEN"),
        &example_token(),
    )
    .await
    .unwrap();

    assert_eq!(report.result.contract_address, DEPLOYED_AT);
    assert_eq!(report.result.transaction_hash, TX_HASH);
    assert_eq!(report.result.block_number, MINED_IN);
    assert!(report.result.confirmed_block_depth >= 6);
    assert_eq!(report.verification, Some(VerificationOutcome::Verified));
    assert!(report.recorded);

    // The init code is the bytecode followed by the encoded supply
    let init_code = chain.deployed_code.lock().unwrap().clone().unwrap();
    assert_eq!(&init_code[..4], &[0x60, 0x80, 0x60, 0x40]);
    assert_eq!(init_code.len(), 4 + 32);
    assert_eq!(init_code[init_code.len() - 2..], [0x03, 0xe8]);

    let calls = explorer.calls();
    assert_eq!(calls.len(), 1);
    let (verified_at_head, verification) = &calls[0];
    assert!(verified_at_head + 1 - MINED_IN >= 6);
    assert_eq!(verification.address, DEPLOYED_AT);
    assert_eq!(verification.contract_name, "contracts/ExampleToken.sol:ExampleToken");
    assert_eq!(verification.constructor_args.len(), 32);

    let contents = read_book(book.path());
    assert_eq!(contents.matches("NETWORK => hardhat").count(), 1);
    assert_eq!(
        contents
            .matches("GREENLERS TOKEN 0x5FbDB2315678afecb367f032d93F642f64180aa3")
            .count(),
        1
    );
}

#[tokio::test]
async fn already_verified_contracts_still_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let book = AddressBook::new(dir.path().join("addressBook.md"));
    let head = Arc::new(AtomicU64::new(0));
    let chain = FakeChain::new(head.clone());
    let explorer = FakeExplorer::new(head, Err("Already Verified".to_string()));

    let report = deploy_and_record(
        &chain,
        &explorer,
        &book,
        &options(1),
        &request("test"),
        &example_token(),
    )
    .await
    .unwrap();

    assert_eq!(report.verification, Some(VerificationOutcome::AlreadyVerified));
    assert!(report.recorded);
    assert!(read_book(book.path()).contains("test 0x5FbDB2315678afecb367f032d93F642f64180aa3"));
}

#[tokio::test]
async fn argumentless_contract_on_a_custom_network_is_recorded_once() {
    let dir = tempfile::tempdir().unwrap();
    let book = AddressBook::new(dir.path().join("addressBook.md"));
    let head = Arc::new(AtomicU64::new(0));
    let chain = FakeChain::new(head.clone());
    let explorer = FakeExplorer::new(head, Err("Already Verified".to_string()));

    let mut artifact = example_token();
    artifact.abi = serde_json::from_str("[]").unwrap();
    let request = DeploymentRequest {
        contract_name: "ExampleToken".to_string(),
        label: "EXAMPLE TOKEN".to_string(),
        constructor_args: vec![],
        network_name: "test".to_string(),
    };

    let report = deploy_and_record(&chain, &explorer, &book, &options(1), &request, &artifact)
        .await
        .unwrap();

    assert_eq!(report.result.contract_address, DEPLOYED_AT);
    assert_eq!(report.verification, Some(VerificationOutcome::AlreadyVerified));
    assert!(report.recorded);

    // No constructor, so the init code is the bare bytecode
    let init_code = chain.deployed_code.lock().unwrap().clone().unwrap();
    assert_eq!(init_code, artifact.bytecode);

    let contents = read_book(book.path());
    assert_eq!(contents.matches("NETWORK => ").count(), 1);
    assert_eq!(contents.matches("NETWORK => test").count(), 1);
    assert_eq!(
        contents
            .matches("0x5FbDB2315678afecb367f032d93F642f64180aa3")
            .count(),
        1
    );
}

#[tokio::test]
async fn failed_verification_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let book = AddressBook::new(dir.path().join("addressBook.md"));
    let head = Arc::new(AtomicU64::new(0));
    let chain = FakeChain::new(head.clone());
    let explorer = FakeExplorer::new(head, Err("Fail - Unable to verify".to_string()));

    let report = deploy_and_record(
        &chain,
        &explorer,
        &book,
        &options(2),
        &request("GREENLERS STAKING"),
        &example_token(),
    )
    .await
    .unwrap();

    assert_eq!(
        report.verification,
        Some(VerificationOutcome::Failed("Fail - Unable to verify".to_string()))
    );
    assert!(read_book(book.path()).contains("GREENLERS STAKING"));
}

#[tokio::test]
async fn failed_deployment_records_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let book = AddressBook::new(dir.path().join("addressBook.md"));
    let head = Arc::new(AtomicU64::new(0));
    let mut chain = FakeChain::new(head.clone());
    chain.fail_deployment = true;
    let explorer = FakeExplorer::new(head, Ok(()));

    let err = deploy_and_record(
        &chain,
        &explorer,
        &book,
        &options(6),
        &request("GREENLERS TOKEN"),
        &example_token(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ScriptError::ContractDeployment(_)));
    assert!(!book.path().exists());
    assert!(explorer.calls().is_empty());
}

#[tokio::test]
async fn bad_constructor_args_never_reach_the_chain() {
    let dir = tempfile::tempdir().unwrap();
    let book = AddressBook::new(dir.path().join("addressBook.md"));
    let head = Arc::new(AtomicU64::new(0));
    let chain = FakeChain::new(head.clone());
    let explorer = FakeExplorer::new(head, Ok(()));

    let mut request = request("GREENLERS TOKEN");
    request.constructor_args = vec![ConstructorArg::Str("not a number".to_string())];

    let err = deploy_and_record(
        &chain,
        &explorer,
        &book,
        &options(1),
        &request,
        &example_token(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ScriptError::ArgumentEncoding(_)));
    assert!(chain.deployed_code.lock().unwrap().is_none());
    assert!(!book.path().exists());
}

#[tokio::test]
async fn verification_can_be_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let book = AddressBook::new(dir.path().join("addressBook.md"));
    let head = Arc::new(AtomicU64::new(0));
    let chain = FakeChain::new(head.clone());
    let explorer = FakeExplorer::new(head, Ok(()));

    let mut options = options(1);
    options.verify = false;

    let report = deploy_and_record(
        &chain,
        &explorer,
        &book,
        &options,
        &request("GREENLERS ADMIN"),
        &example_token(),
    )
    .await
    .unwrap();

    assert_eq!(report.verification, None);
    assert!(explorer.calls().is_empty());
    assert!(report.recorded);
}

#[tokio::test]
async fn unwritable_address_book_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened for appending
    let book = AddressBook::new(dir.path());
    let head = Arc::new(AtomicU64::new(0));
    let chain = FakeChain::new(head.clone());
    let explorer = FakeExplorer::new(head, Ok(()));

    let report = deploy_and_record(
        &chain,
        &explorer,
        &book,
        &options(1),
        &request("GREENLERS TOKEN"),
        &example_token(),
    )
    .await
    .unwrap();

    assert_eq!(report.result.contract_address, DEPLOYED_AT);
    assert!(!report.recorded);
}

#[tokio::test]
async fn stalled_chain_hits_the_confirmation_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let book = AddressBook::new(dir.path().join("addressBook.md"));
    let head = Arc::new(AtomicU64::new(0));
    let mut chain = FakeChain::new(head.clone());
    chain.advance = false;
    let explorer = FakeExplorer::new(head, Ok(()));

    let mut options = options(6);
    options.confirmation_timeout = Some(Duration::from_millis(50));
    options.poll_interval = Duration::from_millis(5);

    let err = deploy_and_record(
        &chain,
        &explorer,
        &book,
        &options,
        &request("GREENLERS TOKEN"),
        &example_token(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ScriptError::Confirmation(_)));
    assert!(explorer.calls().is_empty());
    assert!(!book.path().exists());
}

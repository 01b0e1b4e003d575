//! Constants used in the deploy scripts

/// Default RPC endpoint of a local development node
pub const LOCAL_RPC: &str = "http://127.0.0.1:8545";

/// Default number of confirmations to wait for before verifying
pub const DEFAULT_CONFIRMATIONS: u64 = 6;

/// Default interval between two polls of the node, in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Default directory holding the Hardhat compilation artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Default path of the address book
pub const DEFAULT_ADDRESS_BOOK: &str = "contracts/addressBook.md";

/// Default path of the file holding the deployer private key
pub const DEFAULT_PRIV_KEY_FILE: &str = "private/.secret";

/// Env var holding the Alchemy key used to build the goerli RPC url
pub const ALCHEMY_KEY_ENV_VAR: &str = "MAINNET_RPC";

/// Substring identifying an "already verified" answer from the explorer
pub const ALREADY_VERIFIED_MARKER: &str = "already verified";

/// Message used when the explorer already holds the contract source
pub const ALREADY_VERIFIED_MESSAGE: &str = "Contract source code already verified";

/// `checkverifystatus` result while the explorer is still processing
pub const VERIFICATION_PENDING: &str = "Pending in queue";

/// `checkverifystatus` result on success
pub const VERIFICATION_PASSED: &str = "Pass - Verified";

/// Code format used when submitting a standard JSON input
pub const STANDARD_JSON_CODE_FORMAT: &str = "solidity-standard-json-input";

/// Delimiter of an unlinked library placeholder in Hardhat bytecode
pub const LIBRARY_PLACEHOLDER: &str = "__$";

/// Width of the separator lines in the address book
pub const ADDRESS_BOOK_RULE_WIDTH: usize = 69;

/// Name of the token contract
pub const TOKEN_CONTRACT: &str = "Greenlers";

/// Name of the staking contract
pub const STAKING_CONTRACT: &str = "GreenlersStaking";

/// Name of the admin / presale contract
pub const ADMIN_CONTRACT: &str = "GreenlersAdmin";

/// Address book label of the token contract
pub const TOKEN_LABEL: &str = "GREENLERS TOKEN";

/// Address book label of the staking contract
pub const STAKING_LABEL: &str = "GREENLERS STAKING";

/// Address book label of the admin / presale contract
pub const ADMIN_LABEL: &str = "GREENLERS PRESALE";

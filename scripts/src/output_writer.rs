//! The address book: an append-only markdown log of deployed contracts

use std::{
    fmt::{self, Display},
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use alloy::primitives::Address;

use crate::{constants::ADDRESS_BOOK_RULE_WIDTH, errors::ScriptError};

/// One block of the address book
#[derive(Clone, Debug)]
pub struct AddressBookEntry {
    /// Name of the network the contract lives on
    pub network: String,
    /// Human label of the contract
    pub label: String,
    /// Deployed address
    pub address: Address,
}

impl Display for AddressBookEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(ADDRESS_BOOK_RULE_WIDTH);
        write!(
            f,
            "\n  NETWORK => {}\n\n  {rule}\n\n  {} {}\n\n  {rule}\n\n  ",
            self.network,
            self.label,
            self.address.to_checksum(None),
        )
    }
}

/// Handle on the address book file
#[derive(Clone, Debug)]
pub struct AddressBook {
    /// Path of the markdown file
    path: PathBuf,
}

impl AddressBook {
    /// Address book stored at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry, creating the file and its parents when missing
    pub fn append(&self, entry: &AddressBookEntry) -> Result<(), ScriptError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ScriptError::AddressBook(e.to_string()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ScriptError::AddressBook(e.to_string()))?;

        file.write_all(entry.to_string().as_bytes())
            .map_err(|e| ScriptError::AddressBook(e.to_string()))
    }
}

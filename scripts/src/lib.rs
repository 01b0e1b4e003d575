//! Scripts for deploying, verifying and recording the Greenlers contracts.

#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Our deploy utils
pub mod deploy;

// Our output utils
pub mod output_writer;

pub mod tx;
pub mod verify;

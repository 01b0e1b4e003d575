//! Access to the chain the contracts are deployed to

pub mod client;

//! This crate implements a minimal smart-account engine: contract-controlled
//! accounts that validate owner-signed operations (caller check, signature,
//! replay nonce, prefund) and then execute the requested call.
//! It includes modules for data types, the ledger the accounts run against,
//! validation, execution routing, both account variants, the entry point that
//! drives them, persistence, the JSON-RPC API and configuration.

pub mod types; // Operations, account state, validation results and error types.
pub mod ledger; // Native balances, value transfers and deployed contracts.
pub mod signature; // Operation digests and owner signature verification.
pub mod validation; // Validation state machine, nonce manager and prefund settlement.
pub mod execution; // Routes an operation's call from the account to its target.
pub mod account; // The two smart account variants behind one trait.
pub mod entry; // Trusted infrastructure caller driving validate/execute.
pub mod registry; // Persists account records.
pub mod api; // JSON-RPC server.
pub mod config; // Defines and loads configuration.

#[cfg(test)]
mod test_utils;

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use entry::EntryPoint;

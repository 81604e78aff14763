//! Ledger Module
//!
//! This module provides the balance and call primitive that smart accounts
//! run against: native balances, value transfers and deployed contracts.

mod contract;
mod ledger;


pub use contract::{CallContext, Contract, Revert};
pub use ledger::Ledger;

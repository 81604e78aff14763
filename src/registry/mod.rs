//! Account Registry Module
//!
//! This module provides a database registry for persisting account records.

mod database;
pub use database::Registry;

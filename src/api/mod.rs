//! API Module
//!
//! This module handles the JSON-RPC API for account management and user
//! operation submission.

mod server;
pub use server::Server;

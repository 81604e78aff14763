//! Operation Validation Module
//!
//! This module validates user operations before they may execute.
//! Performs caller checks, signature verification, nonce checking and
//! prefund settlement.

pub mod nonce;
pub mod prefund;
mod validator;


pub use validator::{NoncePolicy, Validator};

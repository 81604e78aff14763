//! Signature Module
//!
//! Operation digest computation and owner signature verification.

mod digest;
mod verifier;


pub use digest::{OperationHasher, TypedOperationHasher};
pub use verifier::{recover_signer, verify};

use ethers::types::{Address, H256, Signature};
use tracing::debug;

/// Recover the address that produced `signature` over `digest`.
///
/// Returns `None` for malformed signatures or failed recovery.
pub fn recover_signer(digest: H256, signature: &[u8]) -> Option<Address> {
    let signature = match Signature::try_from(signature) {
        Ok(signature) => signature,
        Err(e) => {
            debug!("Malformed signature: {}", e);
            return None;
        }
    };

    match signature.recover(digest) {
        Ok(address) => Some(address),
        Err(e) => {
            debug!("Signature recovery failed: {}", e);
            None
        }
    }
}

/// Check that `signature` over `digest` was produced by `expected_signer`.
///
/// Verification failure is a normal outcome, never an error.
pub fn verify(digest: H256, signature: &[u8], expected_signer: Address) -> bool {
    recover_signer(digest, signature) == Some(expected_signer)
}

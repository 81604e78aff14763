use crate::{AccountState, NonceError};
use ethers::types::U256;
use tracing::warn;

/// Check `claimed` against the account's nonce and advance it by one.
///
/// Operations with stale or future nonces are rejected, never queued.
pub fn check_and_advance(account: &mut AccountState, claimed: U256) -> Result<(), NonceError> {
    if claimed != account.nonce {
        warn!(
            "Nonce check failed for {:?}: expected {}, got {}",
            account.address, account.nonce, claimed
        );
        return Err(NonceError::Mismatch {
            expected: account.nonce,
            got: claimed,
        });
    }

    account.nonce = account
        .nonce
        .checked_add(U256::one())
        .ok_or(NonceError::Overflow)?;
    Ok(())
}

use crate::{SettlementError, ledger::Ledger};
use ethers::types::{Address, U256};
use tracing::{debug, warn};

/// Pay `amount_owed` from `account`'s balance to `payee`.
///
/// Zero is a no-op. Any failure here must stop the operation before execution.
pub fn settle(
    ledger: &mut Ledger,
    account: Address,
    amount_owed: U256,
    payee: Address,
) -> Result<(), SettlementError> {
    if amount_owed.is_zero() {
        return Ok(());
    }

    match ledger.transfer(account, payee, amount_owed) {
        Ok(()) => {
            debug!("Settled prefund of {} from {:?} to {:?}", amount_owed, account, payee);
            Ok(())
        }
        Err(e) => {
            warn!("Prefund settlement for {:?} failed: {}", account, e);
            Err(e)
        }
    }
}

use crate::{AccountState, ExecutionError, UserOperation, ledger::Ledger};
use ethers::types::{Address, Bytes};
use tracing::{debug, info, warn};

/// Performs an operation's call on behalf of an account.
///
/// Only the account owner and the trusted infrastructure caller may ask for
/// execution. Calls aimed at the reserved system address, when one is
/// configured, go out as system calls.
pub struct ExecutionRouter {
    trusted_caller: Address,
    system_contract: Option<Address>,
}

impl ExecutionRouter {
    pub fn new(trusted_caller: Address, system_contract: Option<Address>) -> Self {
        Self {
            trusted_caller,
            system_contract,
        }
    }

    /// Execute `op` for `account` if `caller` is allowed to.
    ///
    /// # Returns
    /// * `Ok(Bytes)` with the callee's return data
    /// * `Err(Unauthorized)` when the caller is neither owner nor trusted caller;
    ///   no call is attempted
    /// * `Err(CallReverted)` when the callee fails
    pub fn execute(
        &self,
        ledger: &mut Ledger,
        caller: Address,
        account: &AccountState,
        op: &UserOperation,
    ) -> Result<Bytes, ExecutionError> {
        if caller != account.owner && caller != self.trusted_caller {
            warn!("Refusing execution for {:?}: caller {:?} not allowed", account.address, caller);
            return Err(ExecutionError::Unauthorized { caller });
        }

        self.dispatch(ledger, account, op)
    }

    /// Perform the call without the caller gate.
    ///
    /// Used by the account itself once it has validated an operation in the
    /// same call.
    pub fn dispatch(
        &self,
        ledger: &mut Ledger,
        account: &AccountState,
        op: &UserOperation,
    ) -> Result<Bytes, ExecutionError> {
        let outcome = if self.system_contract == Some(op.target) {
            debug!("Routing call from {:?} through the system dispatcher", account.address);
            ledger.system_call(account.address, op.target, op.value, &op.call_data)
        } else {
            ledger.call(account.address, op.target, op.value, &op.call_data)
        };

        match outcome {
            Ok(output) => {
                info!("Call from {:?} to {:?} succeeded", account.address, op.target);
                Ok(output)
            }
            Err(revert) => {
                warn!("Call from {:?} to {:?} reverted: {}", account.address, op.target, revert.0);
                Err(ExecutionError::CallReverted { reason: revert.0 })
            }
        }
    }
}

use super::SmartAccount;
use crate::{
    AccountState, AccountVariant, ExecutionError, UserOperation, ValidationResult,
    execution::ExecutionRouter,
    ledger::Ledger,
    validation::{NoncePolicy, Validator},
};
use ethers::types::{Address, Bytes, H256};

/// Account driven by an entry point contract.
///
/// The nonce only advances once the owner's signature has been checked, so
/// a badly signed operation leaves the account untouched.
pub struct EvmAccount {
    state: AccountState,
    validator: Validator,
    router: ExecutionRouter,
}

impl EvmAccount {
    pub fn new(state: AccountState, entry_point: Address) -> Self {
        Self {
            state,
            validator: Validator::new(entry_point, NoncePolicy::AfterSignature),
            router: ExecutionRouter::new(entry_point, None),
        }
    }
}

impl SmartAccount for EvmAccount {
    fn variant(&self) -> AccountVariant {
        AccountVariant::Evm
    }

    fn state(&self) -> &AccountState {
        &self.state
    }

    fn validate(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        op: &UserOperation,
        digest: H256,
    ) -> ValidationResult {
        self.validator.validate(ledger, &mut self.state, caller, op, digest)
    }

    fn execute(
        &self,
        ledger: &mut Ledger,
        caller: Address,
        op: &UserOperation,
    ) -> Result<Bytes, ExecutionError> {
        self.router.execute(ledger, caller, &self.state, op)
    }
}

use super::SmartAccount;
use crate::{
    AccountState, AccountVariant, EntryPointError, ExecutionError, UserOperation,
    ValidationResult,
    execution::ExecutionRouter,
    ledger::Ledger,
    validation::{NoncePolicy, Validator},
};
use ethers::types::{Address, Bytes, H160, H256};
use tracing::info;

/// Reserved address of the system contract deployer
pub const DEPLOYER_SYSTEM_CONTRACT: Address = H160([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x80, 0x06,
]);

/// Account driven by a protocol-level bootloader.
///
/// The nonce is checked and advanced before the signature, and the advance
/// sticks even if the signature or prefund step then fails. Calls to the
/// deployer system contract are routed as system calls.
pub struct ZkAccount {
    state: AccountState,
    validator: Validator,
    router: ExecutionRouter,
}

impl ZkAccount {
    pub fn new(state: AccountState, bootloader: Address, system_deployer: Address) -> Self {
        Self {
            state,
            validator: Validator::new(bootloader, NoncePolicy::BeforeSignature),
            router: ExecutionRouter::new(bootloader, Some(system_deployer)),
        }
    }

    /// Validate and execute a signed operation submitted by anyone.
    ///
    /// The account checks the signature and nonce itself, settles no prefund,
    /// and performs the call in the same unit of work.
    pub fn execute_from_outside(
        &mut self,
        ledger: &mut Ledger,
        op: &UserOperation,
        digest: H256,
    ) -> Result<Bytes, EntryPointError> {
        if let ValidationResult::Rejected { stage, reason } =
            self.validator.validate_from_outside(&mut self.state, op, digest)
        {
            return Err(EntryPointError::Rejected { stage, reason });
        }

        info!("Executing outside operation {} for {:?}", op.nonce, self.state.address);
        Ok(self.router.dispatch(ledger, &self.state, op)?)
    }
}

impl SmartAccount for ZkAccount {
    fn variant(&self) -> AccountVariant {
        AccountVariant::Zksync
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

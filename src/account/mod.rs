//! Smart Account Module
//!
//! This module defines the two account variants that share one
//! validate/execute protocol:
//! - **Evm**: entry-point driven; nonce advances only after a valid signature
//! - **Zksync**: bootloader driven; nonce advances before the signature check,
//!   and deployer calls are routed as system calls
//!
//! Both are selected at construction through [`build_account`].

mod evm;
mod zksync;

#[cfg(test)]
mod tests;

pub use evm::EvmAccount;
pub use zksync::{DEPLOYER_SYSTEM_CONTRACT, ZkAccount};

use crate::{
    AccountRecord, AccountState, AccountVariant, ExecutionError, UserOperation,
    ValidationResult, config::AccountConfig, ledger::Ledger,
};
use ethers::types::{Address, Bytes, H256};

/// Capability set every smart account exposes
pub trait SmartAccount: Send + Sync {
    fn variant(&self) -> AccountVariant;

    fn state(&self) -> &AccountState;

    /// Run the validation protocol for `op` as invoked by `caller`
    fn validate(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        op: &UserOperation,
        digest: H256,
    ) -> ValidationResult;

    /// Run the execution protocol for `op` as invoked by `caller`
    fn execute(
        &self,
        ledger: &mut Ledger,
        caller: Address,
        op: &UserOperation,
    ) -> Result<Bytes, ExecutionError>;

    fn record(&self) -> AccountRecord {
        let state = self.state();
        AccountRecord {
            address: state.address,
            owner: state.owner,
            nonce: state.nonce,
            variant: self.variant(),
        }
    }
}

/// Create an account of the given variant
///
/// The trusted infrastructure caller comes from `config.entry_point`.
///
/// # Example
/// ```
/// use ethers::types::Address;
/// use minimal_account::{AccountState, AccountVariant, config::AccountConfig};
/// use minimal_account::account::{SmartAccount, build_account};
///
/// let config = AccountConfig::default();
/// let state = AccountState::new(Address::repeat_byte(1), Address::repeat_byte(2));
/// let account = build_account(AccountVariant::Zksync, state, &config);
/// assert_eq!(account.variant(), AccountVariant::Zksync);
/// ```
pub fn build_account(
    variant: AccountVariant,
    state: AccountState,
    config: &AccountConfig,
) -> Box<dyn SmartAccount> {
    match variant {
        AccountVariant::Evm => Box::new(EvmAccount::new(state, config.entry_point)),
        AccountVariant::Zksync => Box::new(ZkAccount::new(
            state,
            config.entry_point,
            config.system_deployer,
        )),
    }
}

use super::contract::{CallContext, Contract, Revert};
use crate::SettlementError;
use ethers::types::{Address, Bytes, U256};
use std::collections::HashMap;
use tracing::{debug, warn};

/// In-memory world state: native balances and deployed contracts.
///
/// Every value movement and every call made on behalf of an account goes
/// through here, so a unit of work holding `&mut Ledger` sees no concurrent
/// mutation.
#[derive(Default)]
pub struct Ledger {
    balances: HashMap<Address, U256>,
    contracts: HashMap<Address, Box<dyn Contract>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy `contract` at `address`, replacing any code already there
    pub fn deploy(&mut self, address: Address, contract: Box<dyn Contract>) {
        debug!("Deploying contract at {:?}", address);
        self.contracts.insert(address, contract);
    }

    pub fn balance_of(&self, address: &Address) -> U256 {
        self.balances.get(address).copied().unwrap_or_default()
    }

    /// Mint native balance to `address`
    ///
    /// # Errors
    /// * `BalanceOverflow` if the new balance does not fit; nothing is minted
    pub fn credit(&mut self, address: Address, amount: U256) -> Result<(), SettlementError> {
        let balance = self.balance_of(&address);
        let updated = balance
            .checked_add(amount)
            .ok_or(SettlementError::BalanceOverflow { account: address })?;
        self.balances.insert(address, updated);
        Ok(())
    }

    /// Move `amount` of native balance from `from` to `to`.
    ///
    /// # Errors
    /// * `InsufficientBalance` if `from` cannot cover the amount
    /// * `TransferFailed` if `to` is a contract that refuses value
    /// * `BalanceOverflow` if `to` cannot hold the amount
    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), SettlementError> {
        self.move_value(from, to, amount, true)
    }

    /// Both balances are checked before either is written, so a failed move
    /// leaves the ledger untouched.
    fn move_value(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
        check_receive: bool,
    ) -> Result<(), SettlementError> {
        if amount.is_zero() {
            return Ok(());
        }

        let available = self.balance_of(&from);
        if available < amount {
            return Err(SettlementError::InsufficientBalance {
                required: amount,
                available,
            });
        }

        if check_receive {
            if let Some(contract) = self.contracts.get(&to) {
                if !contract.accepts_value() {
                    warn!("Payee {:?} refused a transfer of {}", to, amount);
                    return Err(SettlementError::TransferFailed { payee: to });
                }
            }
        }

        if from == to {
            return Ok(());
        }

        let received = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(SettlementError::BalanceOverflow { account: to })?;

        self.balances.insert(from, available - amount);
        self.balances.insert(to, received);
        Ok(())
    }

    /// Perform a regular call from `caller` to `target`
    pub fn call(&mut self, caller: Address, target: Address, value: U256, data: &[u8]) -> Result<Bytes, Revert> {
        self.dispatch(caller, target, value, data, false)
    }

    /// Perform a call flagged as coming from the system dispatcher
    pub fn system_call(&mut self, caller: Address, target: Address, value: U256, data: &[u8]) -> Result<Bytes, Revert> {
        self.dispatch(caller, target, value, data, true)
    }

    fn dispatch(
        &mut self,
        caller: Address,
        target: Address,
        value: U256,
        data: &[u8],
        is_system: bool,
    ) -> Result<Bytes, Revert> {
        // Value sent with calldata goes to the contract's code, which decides
        // for itself; only bare transfers consult `accepts_value`
        self.move_value(caller, target, value, data.is_empty())
            .map_err(|e| Revert::new(e.to_string()))?;

        // Calls to addresses without code behave like plain transfers
        let Some(contract) = self.contracts.get_mut(&target) else {
            return Ok(Bytes::new());
        };

        let ctx = CallContext {
            caller,
            this: target,
            value,
            is_system,
        };

        match contract.call(&ctx, data) {
            Ok(output) => Ok(output),
            Err(revert) => {
                // Return the value the callee received with this call
                if let Err(e) = self.move_value(target, caller, value, false) {
                    warn!("Could not return value from {:?} to {:?}: {}", target, caller, e);
                }
                Err(revert)
            }
        }
    }
}

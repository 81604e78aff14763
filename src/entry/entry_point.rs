//! Entry Point Module
//!
//! The trusted infrastructure caller. It owns the ledger and the accounts it
//! serves, and drives operations through the validate and execute protocols.

use crate::{
    AccountRecord, AccountState, EntryPointError, ExecutionError, ExecutionStatus,
    OperationReceipt, SettlementError, UserOperation, ValidationResult,
    account::{SmartAccount, build_account},
    config::AccountConfig,
    ledger::Ledger,
    signature::{OperationHasher, TypedOperationHasher},
};
use ethers::abi::{Token, encode};
use ethers::types::{Address, Bytes, U256};
use ethers::utils::keccak256;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub struct EntryPoint {
    config: AccountConfig,
    hasher: Arc<dyn OperationHasher>,
    ledger: Ledger,
    accounts: HashMap<Address, Box<dyn SmartAccount>>,
}

impl EntryPoint {
    /// Creates an entry point using the default operation hasher for the
    /// configured chain
    pub fn new(config: AccountConfig) -> Self {
        let hasher = Arc::new(TypedOperationHasher::new(config.chain_id, config.entry_point));
        Self::with_hasher(config, hasher)
    }

    pub fn with_hasher(config: AccountConfig, hasher: Arc<dyn OperationHasher>) -> Self {
        Self {
            config,
            hasher,
            ledger: Ledger::new(),
            accounts: HashMap::new(),
        }
    }

    /// Address of this entry point, the trusted caller of its accounts
    pub fn address(&self) -> Address {
        self.config.entry_point
    }

    pub fn hasher(&self) -> &dyn OperationHasher {
        self.hasher.as_ref()
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Deterministic address of the account for `(owner, salt)`
    pub fn account_address(&self, owner: Address, salt: U256) -> Address {
        let hash = keccak256(encode(&[
            Token::Address(self.address()),
            Token::Address(owner),
            Token::Uint(salt),
        ]));
        Address::from_slice(&hash[12..])
    }

    /// Create a new account of the configured variant owned by `owner`
    pub fn create_account(&mut self, owner: Address, salt: U256) -> Result<Address, EntryPointError> {
        let address = self.account_address(owner, salt);
        if self.accounts.contains_key(&address) {
            return Err(EntryPointError::AccountExists(address));
        }

        let account = build_account(
            self.config.variant,
            AccountState::new(address, owner),
            &self.config,
        );
        self.accounts.insert(address, account);
        info!("Created {} account {:?} for owner {:?}", self.config.variant, address, owner);
        Ok(address)
    }

    /// Re-instantiate an account from its persisted record
    pub fn restore_account(&mut self, record: AccountRecord) {
        let state = AccountState {
            address: record.address,
            owner: record.owner,
            nonce: record.nonce,
        };
        let account = build_account(record.variant, state, &self.config);
        self.accounts.insert(record.address, account);
    }

    /// Credit native balance to `account`
    pub fn deposit(&mut self, account: Address, amount: U256) -> Result<(), SettlementError> {
        self.ledger.credit(account, amount)
    }

    pub fn balance_of(&self, address: &Address) -> U256 {
        self.ledger.balance_of(address)
    }

    pub fn nonce_of(&self, account: &Address) -> Option<U256> {
        self.accounts.get(account).map(|a| a.state().nonce)
    }

    pub fn record_of(&self, account: &Address) -> Option<AccountRecord> {
        self.accounts.get(account).map(|a| a.record())
    }

    /// Run only the validation protocol for `op`
    pub fn validate_op(&mut self, op: &UserOperation) -> Result<ValidationResult, EntryPointError> {
        let digest = self.hasher.digest(op);
        let caller = self.address();
        let account = self
            .accounts
            .get_mut(&op.sender)
            .ok_or(EntryPointError::UnknownAccount(op.sender))?;

        Ok(account.validate(&mut self.ledger, caller, op, digest))
    }

    /// Run only the execution protocol for `op` as invoked by `caller`
    ///
    /// This is the direct path for the account owner. The entry point itself
    /// only executes an operation it has just authorized, from
    /// [`EntryPoint::handle_op`], so its own address is refused here.
    pub fn execute_op(&mut self, caller: Address, op: &UserOperation) -> Result<Bytes, EntryPointError> {
        if caller == self.address() {
            warn!("Refusing direct execution of {:?} as the entry point", op.sender);
            return Err(ExecutionError::Unauthorized { caller }.into());
        }
        self.execute_as(caller, op)
    }

    fn execute_as(&mut self, caller: Address, op: &UserOperation) -> Result<Bytes, EntryPointError> {
        let account = self
            .accounts
            .get(&op.sender)
            .ok_or(EntryPointError::UnknownAccount(op.sender))?;

        Ok(account.execute(&mut self.ledger, caller, op)?)
    }

    /// Validate `op` and, if authorized, execute it as the trusted caller
    ///
    /// # Returns
    /// * `Ok(OperationReceipt)` once validation passed; the receipt reports
    ///   whether the call itself succeeded or reverted
    /// * `Err(Rejected)` if validation failed; nothing was executed
    pub fn handle_op(&mut self, op: &UserOperation) -> Result<OperationReceipt, EntryPointError> {
        let op_hash = self.hasher.digest(op);

        if let ValidationResult::Rejected { stage, reason } = self.validate_op(op)? {
            return Err(EntryPointError::Rejected { stage, reason });
        }

        // Validation is committed at this point; a reverted call does not undo it
        let caller = self.address();
        let status = match self.execute_as(caller, op) {
            Ok(return_data) => ExecutionStatus::Success { return_data },
            Err(EntryPointError::Execution(e)) => {
                warn!("Operation {:?} executed with failure: {}", op_hash, e);
                ExecutionStatus::Reverted { reason: e.to_string() }
            }
            Err(e) => return Err(e),
        };

        Ok(OperationReceipt {
            op_hash,
            sender: op.sender,
            nonce: op.nonce,
            status,
            timestamp: chrono::Utc::now().timestamp() as u64,
        })
    }
}

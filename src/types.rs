use ethers::types::{Address, Bytes, H256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Signed request to act on behalf of a smart account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    pub nonce: U256,
    pub target: Address,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub call_data: Bytes,
    #[serde(default)]
    pub signature: Bytes,
    /// Amount the account owes the calling infrastructure for this operation
    #[serde(default)]
    pub prefund: U256,
}

/// Durable state of a smart account: its owner and replay counter.
/// The account's native balance lives in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub address: Address,
    pub owner: Address,
    pub nonce: U256,
}

impl AccountState {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            nonce: U256::zero(),
        }
    }
}

/// Which validation/execution policy an account follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountVariant {
    /// Entry-point driven account; nonce advances only after a valid signature
    Evm,
    /// Bootloader driven account; nonce advances before the signature check
    Zksync,
}

impl AccountVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountVariant::Evm => "evm",
            AccountVariant::Zksync => "zksync",
        }
    }
}

impl fmt::Display for AccountVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "evm" => Ok(AccountVariant::Evm),
            "zksync" => Ok(AccountVariant::Zksync),
            other => Err(anyhow::anyhow!("unknown account variant: {}", other)),
        }
    }
}

/// Persisted account record (registry row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub address: Address,
    pub owner: Address,
    pub nonce: U256,
    pub variant: AccountVariant,
}

/// Stages of the validation state machine, in the order the EVM policy visits them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStage {
    Received,
    CallerChecked,
    SignatureChecked,
    NonceAdvanced,
    PrefundSettled,
    Authorized,
}

/// Outcome of validating an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Authorized,
    /// `stage` is the last stage the operation reached before failing
    Rejected {
        stage: ValidationStage,
        reason: ValidationError,
    },
}

impl ValidationResult {
    pub fn is_authorized(&self) -> bool {
        matches!(self, ValidationResult::Authorized)
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationResult::Authorized => Ok(()),
            ValidationResult::Rejected { reason, .. } => Err(reason),
        }
    }
}

/// Replay-protection failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NonceError {
    #[error("nonce mismatch: expected {expected}, got {got}")]
    Mismatch { expected: U256, got: U256 },
    #[error("nonce overflow")]
    Overflow,
}

/// Prefund settlement failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: U256, available: U256 },
    #[error("transfer to {payee:?} failed")]
    TransferFailed { payee: Address },
    #[error("balance of {account:?} would overflow")]
    BalanceOverflow { account: Address },
}

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("caller {caller:?} is not allowed to validate")]
    Unauthorized { caller: Address },
    #[error("invalid operation signature")]
    InvalidSignature,
    #[error(transparent)]
    Nonce(#[from] NonceError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
}

/// Execution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("caller {caller:?} is not allowed to execute")]
    Unauthorized { caller: Address },
    #[error("call reverted: {reason}")]
    CallReverted { reason: String },
}

/// Errors surfaced by the entry point to its clients
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryPointError {
    #[error("unknown account {0:?}")]
    UnknownAccount(Address),
    #[error("account {0:?} already exists")]
    AccountExists(Address),
    #[error("operation rejected at {stage:?}: {reason}")]
    Rejected {
        stage: ValidationStage,
        reason: ValidationError,
    },
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Result of running an operation through the entry point
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationReceipt {
    pub op_hash: H256,
    pub sender: Address,
    pub nonce: U256,
    pub status: ExecutionStatus,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Success { return_data: Bytes },
    Reverted { reason: String },
    Rejected { reason: String },
}

use super::{nonce, prefund};
use crate::{
    AccountState, UserOperation, ValidationError, ValidationResult, ValidationStage,
    ledger::Ledger, signature,
};
use ethers::types::{Address, H256};
use tracing::{debug, warn};

/// When the nonce advance happens relative to the signature check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoncePolicy {
    /// Signature first; a bad signature leaves the nonce untouched
    AfterSignature,
    /// Nonce first; once the nonce check passes the advance is committed,
    /// whatever the later steps decide
    BeforeSignature,
}

/// Validation state machine shared by both account variants.
///
/// Drives an operation through
/// `Received -> CallerChecked -> SignatureChecked -> NonceAdvanced -> PrefundSettled -> Authorized`
/// (nonce and signature swap places under [`NoncePolicy::BeforeSignature`])
/// and stops at the first failing stage. Nothing about rejected operations is
/// remembered.
pub struct Validator {
    trusted_caller: Address,
    nonce_policy: NoncePolicy,
}

impl Validator {
    pub fn new(trusted_caller: Address, nonce_policy: NoncePolicy) -> Self {
        Self {
            trusted_caller,
            nonce_policy,
        }
    }

    /// Validate `op` on behalf of `caller`, settling its prefund to the
    /// trusted caller on success.
    ///
    /// `digest` is the operation digest the owner is expected to have signed.
    pub fn validate(
        &self,
        ledger: &mut Ledger,
        account: &mut AccountState,
        caller: Address,
        op: &UserOperation,
        digest: H256,
    ) -> ValidationResult {
        debug!("Validating operation {} for {:?}", op.nonce, account.address);
        self.finish(account.address, |stage| {
            if caller != self.trusted_caller {
                return Err(ValidationError::Unauthorized { caller });
            }
            *stage = ValidationStage::CallerChecked;

            self.authorize(account, op, digest, stage)?;

            prefund::settle(ledger, account.address, op.prefund, self.trusted_caller)?;
            *stage = ValidationStage::PrefundSettled;
            Ok(())
        })
    }

    /// Validate `op` submitted directly to the account by an arbitrary caller.
    ///
    /// No infrastructure is involved, so the caller rule does not apply and
    /// no prefund is settled.
    pub fn validate_from_outside(
        &self,
        account: &mut AccountState,
        op: &UserOperation,
        digest: H256,
    ) -> ValidationResult {
        debug!("Validating outside operation {} for {:?}", op.nonce, account.address);
        self.finish(account.address, |stage| {
            *stage = ValidationStage::CallerChecked;
            self.authorize(account, op, digest, stage)?;
            *stage = ValidationStage::PrefundSettled;
            Ok(())
        })
    }

    fn finish<F>(&self, address: Address, steps: F) -> ValidationResult
    where
        F: FnOnce(&mut ValidationStage) -> Result<(), ValidationError>,
    {
        let mut stage = ValidationStage::Received;
        match steps(&mut stage) {
            Ok(()) => {
                debug!("Operation for {:?} authorized", address);
                ValidationResult::Authorized
            }
            Err(reason) => {
                warn!("Operation for {:?} rejected after {:?}: {}", address, stage, reason);
                ValidationResult::Rejected { stage, reason }
            }
        }
    }

    /// Signature and nonce steps, in the order the policy dictates
    fn authorize(
        &self,
        account: &mut AccountState,
        op: &UserOperation,
        digest: H256,
        stage: &mut ValidationStage,
    ) -> Result<(), ValidationError> {
        match self.nonce_policy {
            NoncePolicy::AfterSignature => {
                check_signature(account, op, digest)?;
                *stage = ValidationStage::SignatureChecked;
                nonce::check_and_advance(account, op.nonce)?;
                *stage = ValidationStage::NonceAdvanced;
            }
            NoncePolicy::BeforeSignature => {
                nonce::check_and_advance(account, op.nonce)?;
                *stage = ValidationStage::NonceAdvanced;
                check_signature(account, op, digest)?;
                *stage = ValidationStage::SignatureChecked;
            }
        }
        Ok(())
    }
}

fn check_signature(account: &AccountState, op: &UserOperation, digest: H256) -> Result<(), ValidationError> {
    if !signature::verify(digest, &op.signature, account.owner) {
        warn!("Signature verification failed for {:?}: signer mismatch", account.address);
        return Err(ValidationError::InvalidSignature);
    }
    Ok(())
}

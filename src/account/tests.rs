//! Tests for the account variants
//!
//! Runs the mint scenario end to end for both variants and checks where
//! their policies diverge.

#[cfg(test)]
mod tests {
    use crate::{
        AccountState, AccountVariant, EntryPointError, ExecutionError, NonceError,
        UserOperation, ValidationError, ValidationResult,
        account::{DEPLOYER_SYSTEM_CONTRACT, SmartAccount, ZkAccount, build_account},
        config::AccountConfig,
        ledger::Ledger,
        signature::{OperationHasher, TypedOperationHasher},
        test_utils::{
            MockDeployer, MockToken, balance_of_call, decode_uint, mint_call, operation,
            owner_wallet, sign_digest, stranger_wallet,
        },
    };
    use ethers::signers::{LocalWallet, Signer};
    use ethers::types::{Address, Bytes, H256, U256};

    struct Fixture {
        ledger: Ledger,
        config: AccountConfig,
        hasher: TypedOperationHasher,
        account: Address,
        token: Address,
    }

    fn fixture() -> Fixture {
        let config = AccountConfig::default();
        let hasher = TypedOperationHasher::new(config.chain_id, config.entry_point);
        let mut ledger = Ledger::new();
        let token = Address::repeat_byte(0x70);
        ledger.deploy(token, Box::new(MockToken::default()));

        Fixture {
            ledger,
            config,
            hasher,
            account: Address::repeat_byte(0xac),
            token,
        }
    }

    impl Fixture {
        fn build(&self, variant: AccountVariant) -> Box<dyn SmartAccount> {
            let state = AccountState::new(self.account, owner_wallet().address());
            build_account(variant, state, &self.config)
        }

        fn mint_op(&self, wallet: &LocalWallet, nonce: u64) -> (UserOperation, H256) {
            let mut op = operation(self.account, nonce, self.token, mint_call(self.account, 100));
            let digest = self.hasher.digest(&op);
            op.signature = sign_digest(wallet, digest);
            (op, digest)
        }

        fn token_balance(&mut self) -> U256 {
            let output = self
                .ledger
                .call(self.account, self.token, U256::zero(), &balance_of_call(self.account))
                .unwrap();
            decode_uint(&output)
        }
    }

    #[test]
    fn test_mint_scenario_for_both_variants() {
        for variant in [AccountVariant::Evm, AccountVariant::Zksync] {
            let mut f = fixture();
            let mut account = f.build(variant);
            let entry_point = f.config.entry_point;

            let (op, digest) = f.mint_op(&owner_wallet(), 0);

            let result = account.validate(&mut f.ledger, entry_point, &op, digest);
            assert_eq!(result, ValidationResult::Authorized);
            assert_eq!(account.state().nonce, U256::one());

            account.execute(&mut f.ledger, entry_point, &op).unwrap();
            assert_eq!(f.token_balance(), U256::from(100));

            // Resubmission is stale and never executes again
            let result = account.validate(&mut f.ledger, entry_point, &op, digest);
            assert_eq!(
                result.into_result(),
                Err(ValidationError::Nonce(NonceError::Mismatch {
                    expected: U256::one(),
                    got: U256::zero(),
                }))
            );
            assert_eq!(f.token_balance(), U256::from(100));
        }
    }

    #[test]
    fn test_wrong_key_nonce_policy_per_variant() {
        let expected = [
            (AccountVariant::Evm, U256::zero()),
            (AccountVariant::Zksync, U256::one()),
        ];

        for (variant, nonce_after) in expected {
            let mut f = fixture();
            let mut account = f.build(variant);
            let entry_point = f.config.entry_point;

            let (op, digest) = f.mint_op(&stranger_wallet(), 0);
            let result = account.validate(&mut f.ledger, entry_point, &op, digest);

            assert_eq!(result.into_result(), Err(ValidationError::InvalidSignature));
            assert_eq!(account.state().nonce, nonce_after, "variant {}", variant);
        }
    }

    #[test]
    fn test_owner_may_execute_directly() {
        let mut f = fixture();
        let account = f.build(AccountVariant::Evm);
        let owner = owner_wallet().address();

        let op = operation(f.account, 0, f.token, mint_call(f.account, 100));
        account.execute(&mut f.ledger, owner, &op).unwrap();

        assert_eq!(f.token_balance(), U256::from(100));
    }

    #[test]
    fn test_stranger_may_not_execute() {
        for variant in [AccountVariant::Evm, AccountVariant::Zksync] {
            let mut f = fixture();
            let account = f.build(variant);
            let stranger = stranger_wallet().address();

            let op = operation(f.account, 0, f.token, mint_call(f.account, 100));
            let err = account.execute(&mut f.ledger, stranger, &op).unwrap_err();

            assert_eq!(err, ExecutionError::Unauthorized { caller: stranger });
            assert_eq!(f.token_balance(), U256::zero());
        }
    }

    #[test]
    fn test_only_zksync_routes_deployer_calls_as_system_calls() {
        let mut f = fixture();
        f.ledger.deploy(DEPLOYER_SYSTEM_CONTRACT, Box::new(MockDeployer));
        let op = operation(f.account, 0, DEPLOYER_SYSTEM_CONTRACT, Bytes::new());
        let entry_point = f.config.entry_point;

        let zk = f.build(AccountVariant::Zksync);
        assert!(zk.execute(&mut f.ledger, entry_point, &op).is_ok());

        let evm = f.build(AccountVariant::Evm);
        assert!(matches!(
            evm.execute(&mut f.ledger, entry_point, &op),
            Err(ExecutionError::CallReverted { .. })
        ));
    }

    #[test]
    fn test_record_reflects_state() {
        let f = fixture();
        let account = f.build(AccountVariant::Zksync);
        let record = account.record();

        assert_eq!(record.address, f.account);
        assert_eq!(record.owner, owner_wallet().address());
        assert_eq!(record.nonce, U256::zero());
        assert_eq!(record.variant, AccountVariant::Zksync);
    }

    #[test]
    fn test_execute_from_outside() {
        let mut f = fixture();
        let state = AccountState::new(f.account, owner_wallet().address());
        let mut account = ZkAccount::new(state, f.config.entry_point, f.config.system_deployer);

        let (op, digest) = f.mint_op(&owner_wallet(), 0);
        account.execute_from_outside(&mut f.ledger, &op, digest).unwrap();

        assert_eq!(account.state().nonce, U256::one());
        assert_eq!(f.token_balance(), U256::from(100));

        // A replay of the same signed operation is rejected
        let err = account.execute_from_outside(&mut f.ledger, &op, digest).unwrap_err();
        assert!(matches!(
            err,
            EntryPointError::Rejected {
                reason: ValidationError::Nonce(NonceError::Mismatch { .. }),
                ..
            }
        ));
        assert_eq!(f.token_balance(), U256::from(100));
    }

    #[test]
    fn test_execute_from_outside_bad_signature() {
        let mut f = fixture();
        let state = AccountState::new(f.account, owner_wallet().address());
        let mut account = ZkAccount::new(state, f.config.entry_point, f.config.system_deployer);

        let (op, digest) = f.mint_op(&stranger_wallet(), 0);
        let err = account.execute_from_outside(&mut f.ledger, &op, digest).unwrap_err();

        assert!(matches!(
            err,
            EntryPointError::Rejected {
                reason: ValidationError::InvalidSignature,
                ..
            }
        ));
        assert_eq!(f.token_balance(), U256::zero());
        // Non-atomic policy: the nonce check passed, so the advance stands
        assert_eq!(account.state().nonce, U256::one());
    }
}

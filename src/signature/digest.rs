use crate::UserOperation;
use ethers::abi::{Token, encode};
use ethers::types::{Address, H256, U256};
use ethers::utils::{hash_message, keccak256};

/// Canonicalizes an operation into the digest its owner signs
pub trait OperationHasher: Send + Sync {
    fn digest(&self, op: &UserOperation) -> H256;
}

/// Default operation hashing scheme.
///
/// The operation fields (minus the signature) are ABI encoded and hashed,
/// bound to a `(chain_id, entry_point)` domain, and finally wrapped in the
/// EIP-191 personal message prefix so regular wallets can sign it.
#[derive(Debug, Clone)]
pub struct TypedOperationHasher {
    domain: H256,
}

impl TypedOperationHasher {
    pub fn new(chain_id: u64, entry_point: Address) -> Self {
        let domain = keccak256(encode(&[
            Token::Uint(U256::from(chain_id)),
            Token::Address(entry_point),
        ]));
        Self {
            domain: H256::from(domain),
        }
    }

    /// Hash of the operation bound to the domain, before the EIP-191 prefix
    pub fn operation_hash(&self, op: &UserOperation) -> H256 {
        let fields = keccak256(encode(&[
            Token::Address(op.sender),
            Token::Uint(op.nonce),
            Token::Address(op.target),
            Token::Uint(op.value),
            Token::FixedBytes(keccak256(&op.call_data).to_vec()),
            Token::Uint(op.prefund),
        ]));

        H256::from(keccak256(encode(&[
            Token::FixedBytes(fields.to_vec()),
            Token::FixedBytes(self.domain.as_bytes().to_vec()),
        ])))
    }
}

impl OperationHasher for TypedOperationHasher {
    fn digest(&self, op: &UserOperation) -> H256 {
        hash_message(self.operation_hash(op))
    }
}

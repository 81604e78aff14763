use ethers::types::{Address, Bytes, U256};

/// Context handed to a contract for a single call
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    /// Address that initiated the call
    pub caller: Address,
    /// Address the contract is deployed at
    pub this: Address,
    /// Native value transferred with the call
    pub value: U256,
    /// Set when the call was routed through the system dispatcher
    pub is_system: bool,
}

/// Revert raised by a contract, carrying a human readable reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revert(pub String);

impl Revert {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Code deployed on the ledger at some address
pub trait Contract: Send + Sync {
    fn call(&mut self, ctx: &CallContext, data: &[u8]) -> Result<Bytes, Revert>;

    /// Whether value sent without calldata succeeds. Calls carrying calldata
    /// reach [`Contract::call`] with the value regardless.
    fn accepts_value(&self) -> bool {
        true
    }
}

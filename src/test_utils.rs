//! Shared fixtures for unit tests: wallets, signing helpers and a handful of
//! contracts to call.

use crate::ledger::{CallContext, Contract, Revert};
use crate::UserOperation;
use ethers::abi::{ParamType, Token, decode, encode};
use ethers::signers::LocalWallet;
use ethers::types::{Address, Bytes, H256, U256};
use ethers::utils::id;
use std::collections::HashMap;

const OWNER_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const STRANGER_KEY: &str = "0x8da4ef21b864d2cc526dbdb2a120bd2874c36c9d0a1fb7f8c63d7f7a8b41de8f";

pub fn owner_wallet() -> LocalWallet {
    OWNER_KEY.parse().unwrap()
}

pub fn stranger_wallet() -> LocalWallet {
    STRANGER_KEY.parse().unwrap()
}

pub fn sign_digest(wallet: &LocalWallet, digest: H256) -> Bytes {
    wallet.sign_hash(digest).unwrap().to_vec().into()
}

/// A fixture digest, standing in for the real operation hashing scheme
pub fn fixture_digest(tag: u8) -> H256 {
    H256::repeat_byte(tag)
}

pub fn operation(sender: Address, nonce: u64, target: Address, call_data: Bytes) -> UserOperation {
    UserOperation {
        sender,
        nonce: U256::from(nonce),
        target,
        value: U256::zero(),
        call_data,
        signature: Bytes::new(),
        prefund: U256::zero(),
    }
}

pub fn mint_call(to: Address, amount: u64) -> Bytes {
    let mut data = id("mint(address,uint256)").to_vec();
    data.extend(encode(&[Token::Address(to), Token::Uint(U256::from(amount))]));
    data.into()
}

pub fn balance_of_call(owner: Address) -> Bytes {
    let mut data = id("balanceOf(address)").to_vec();
    data.extend(encode(&[Token::Address(owner)]));
    data.into()
}

pub fn decode_uint(output: &[u8]) -> U256 {
    match decode(&[ParamType::Uint(256)], output).unwrap().as_slice() {
        [Token::Uint(value)] => *value,
        other => panic!("unexpected output: {:?}", other),
    }
}

/// Minimal token with open minting
#[derive(Default)]
pub struct MockToken {
    balances: HashMap<Address, U256>,
}

impl Contract for MockToken {
    fn call(&mut self, _ctx: &CallContext, data: &[u8]) -> Result<Bytes, Revert> {
        if data.len() < 4 {
            return Err(Revert::new("missing selector"));
        }
        let (selector, args) = data.split_at(4);

        if selector == id("mint(address,uint256)") {
            let tokens = decode(&[ParamType::Address, ParamType::Uint(256)], args)
                .map_err(|e| Revert::new(e.to_string()))?;
            if let [Token::Address(to), Token::Uint(amount)] = tokens.as_slice() {
                *self.balances.entry(*to).or_default() += *amount;
                return Ok(Bytes::new());
            }
        } else if selector == id("balanceOf(address)") {
            let tokens = decode(&[ParamType::Address], args).map_err(|e| Revert::new(e.to_string()))?;
            if let [Token::Address(owner)] = tokens.as_slice() {
                let balance = self.balances.get(owner).copied().unwrap_or_default();
                return Ok(encode(&[Token::Uint(balance)]).into());
            }
        }

        Err(Revert::new("unknown selector"))
    }
}

/// Contract whose every call reverts
pub struct Reverter;

impl Contract for Reverter {
    fn call(&mut self, _ctx: &CallContext, _data: &[u8]) -> Result<Bytes, Revert> {
        Err(Revert::new("always reverts"))
    }
}

/// Contract without a receive hook: refuses plain value
pub struct NoReceive;

impl Contract for NoReceive {
    fn call(&mut self, _ctx: &CallContext, _data: &[u8]) -> Result<Bytes, Revert> {
        Ok(Bytes::new())
    }

    fn accepts_value(&self) -> bool {
        false
    }
}

/// Deployer that only serves system calls and echoes the caller back
pub struct MockDeployer;

impl Contract for MockDeployer {
    fn call(&mut self, ctx: &CallContext, _data: &[u8]) -> Result<Bytes, Revert> {
        if !ctx.is_system {
            return Err(Revert::new("deployer requires a system call"));
        }
        Ok(encode(&[Token::Address(ctx.caller)]).into())
    }
}

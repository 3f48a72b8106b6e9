//! Value movement in and out of escrow.
//!
//! The escrow never moves balances itself; it asks the funding token contract
//! to do so. Every call goes through the fallible `try_transfer` so that a
//! rejected transfer surfaces as [`Error::TransferFailure`] at the entry point
//! instead of trapping the host. Returning that error reverts the invocation.

use soroban_sdk::{token, Address, Env};

use crate::storage;
use crate::Error;

pub struct ValueTransfer<'a> {
    env: &'a Env,
    client: token::Client<'a>,
}

impl<'a> ValueTransfer<'a> {
    /// Bind to the token configured at `init`.
    pub fn load(env: &'a Env) -> Result<Self, Error> {
        let token = storage::get_token(env)?;
        Ok(ValueTransfer {
            env,
            client: token::Client::new(env, &token),
        })
    }

    /// Pull `amount` from `from` into escrow.
    pub fn deposit(&self, from: &Address, amount: i128) -> Result<(), Error> {
        self.move_funds(from, &self.env.current_contract_address(), amount)
    }

    /// Send `amount` out of escrow to `to`.
    pub fn send(&self, to: &Address, amount: i128) -> Result<(), Error> {
        self.move_funds(&self.env.current_contract_address(), to, amount)
    }

    fn move_funds(&self, from: &Address, to: &Address, amount: i128) -> Result<(), Error> {
        if amount == 0 {
            return Ok(());
        }
        match self.client.try_transfer(from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => Err(Error::TransferFailure),
        }
    }
}

//! # Funder ledger
//!
//! Per-project map from funder to the cumulative amount they have put into
//! escrow. It is the only basis for refunds: what a funder gets back on
//! cancellation is exactly their entry here, regardless of which milestone
//! segment the money arrived in.

use soroban_sdk::{Address, Env, Map, Vec};

/// Add `amount` to `funder`'s running total.
pub fn record(ledger: &mut Map<Address, i128>, funder: &Address, amount: i128) {
    let previous = ledger.get(funder.clone()).unwrap_or(0);
    ledger.set(funder.clone(), previous + amount);
}

/// Contribution of `funder`, `0` if they never funded.
pub fn balance_of(ledger: &Map<Address, i128>, funder: &Address) -> i128 {
    ledger.get(funder.clone()).unwrap_or(0)
}

/// Refund obligations owed on cancellation: one `(funder, amount)` per
/// non-zero balance, in ledger order.
pub fn refunds(env: &Env, ledger: &Map<Address, i128>) -> Vec<(Address, i128)> {
    let mut out = Vec::new(env);
    for (funder, amount) in ledger.iter() {
        if amount > 0 {
            out.push_back((funder, amount));
        }
    }
    out
}

/// Sum of all refund obligations.
pub fn total(refunds: &Vec<(Address, i128)>) -> i128 {
    refunds.iter().map(|(_, amount)| amount).sum()
}

use crate::ledger::{Ledger, Posting};
use num_bigint::BigInt;
use std::collections::HashMap;

/// Balance changes of sends already resolved in the current execution
///
/// Nothing reaches the ledger until the whole script commits, so a later
/// send reads `ledger balance + pending delta` to see the funds an earlier
/// send moved.
#[derive(Debug, Clone, Default)]
pub struct PendingBalances {
    deltas: HashMap<(String, String), BigInt>,
}

impl PendingBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delta(&self, address: &str, asset: &str) -> BigInt {
        self.deltas
            .get(&(address.to_string(), asset.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn effective_balance(&self, ledger: &Ledger, address: &str, asset: &str) -> BigInt {
        ledger.get_balance(address, asset) + self.delta(address, asset)
    }

    pub fn record(&mut self, posting: &Posting) {
        *self
            .deltas
            .entry((posting.source.clone(), posting.asset.clone()))
            .or_default() -= &posting.amount;
        *self
            .deltas
            .entry((posting.destination.clone(), posting.asset.clone()))
            .or_default() += &posting.amount;
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

use crate::semantic::serde_bigint;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde::Serialize;

/// A ledger account, created lazily on first reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// Normalized address, sigil included
    pub address: String,
    /// Asset identifier -> balance in the asset's smallest unit
    #[serde(serialize_with = "serde_bigint::serialize_map")]
    pub balances: IndexMap<String, BigInt>,
    pub metadata: IndexMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            balances: IndexMap::new(),
            metadata: IndexMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Balance for `asset`, zero when the account never held it
    pub fn balance(&self, asset: &str) -> BigInt {
        self.balances.get(asset).cloned().unwrap_or_default()
    }

    pub(crate) fn credit(&mut self, asset: &str, amount: &BigInt) {
        *self.balances.entry(asset.to_string()).or_default() += amount;
    }

    pub(crate) fn debit(&mut self, asset: &str, amount: &BigInt) {
        *self.balances.entry(asset.to_string()).or_default() -= amount;
    }
}

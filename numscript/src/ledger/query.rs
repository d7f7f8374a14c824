//! Query filters and result rows for ledger lookups

use crate::ledger::pattern::matches_pattern;
use crate::ledger::{Account, Transaction};
use crate::semantic::serde_bigint;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// One non-zero `(account, asset)` balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceEntry {
    pub address: String,
    pub asset: String,
    #[serde(serialize_with = "serde_bigint::serialize")]
    pub balance: BigInt,
}

/// Per-asset sum across every account matched by a set of patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedBalance {
    pub asset: String,
    #[serde(serialize_with = "serde_bigint::serialize")]
    pub balance: BigInt,
    /// Contributing addresses, each listed once
    pub accounts: Vec<String>,
}

/// Filter for `Ledger::list_transactions`; empty fields match everything
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    /// Pattern matched against the source and destination of every posting
    #[serde(default)]
    pub account: Option<String>,
    /// Every key must be present with exactly this value
    #[serde(default)]
    pub metadata: IndexMap<String, String>,
    /// Inclusive lower bound
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, pattern: impl Into<String>) -> Self {
        self.account = Some(pattern.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(pattern) = &self.account {
            let touches = tx.postings.iter().any(|p| {
                matches_pattern(&p.source, pattern) || matches_pattern(&p.destination, pattern)
            });
            if !touches {
                return false;
            }
        }
        if !metadata_matches(&tx.metadata, &self.metadata) {
            return false;
        }
        if self.from.is_some_and(|from| tx.timestamp < from) {
            return false;
        }
        if self.to.is_some_and(|to| tx.timestamp > to) {
            return false;
        }
        true
    }
}

/// Filter for `Ledger::list_accounts`; empty fields match everything
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFilter {
    #[serde(default, alias = "address")]
    pub address_pattern: Option<String>,
    #[serde(default)]
    pub metadata: IndexMap<String, String>,
}

impl AccountFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.address_pattern = Some(pattern.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn matches(&self, account: &Account) -> bool {
        if let Some(pattern) = &self.address_pattern {
            if !matches_pattern(&account.address, pattern) {
                return false;
            }
        }
        metadata_matches(&account.metadata, &self.metadata)
    }
}

fn metadata_matches(actual: &IndexMap<String, String>, wanted: &IndexMap<String, String>) -> bool {
    wanted
        .iter()
        .all(|(key, value)| actual.get(key).is_some_and(|v| v == value))
}

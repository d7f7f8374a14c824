//! In-memory double-entry ledger
//!
//! Holds the authoritative balances and the transaction log. Every
//! transaction is validated against a staged copy of the balances it touches
//! and only then applied, so a failing posting leaves no trace.

pub mod account;
pub mod pattern;
pub mod query;

pub use account::Account;
pub use pattern::matches_pattern;
pub use query::{AccountFilter, AggregatedBalance, BalanceEntry, TransactionFilter};

use crate::semantic::{normalize_address, serde_bigint, WORLD};
use crate::{NumscriptError, NumscriptResult};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Flat, insertion-ordered string metadata
pub type Metadata = IndexMap<String, String>;

/// Movement of one asset amount between two accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Posting {
    pub source: String,
    pub destination: String,
    pub asset: String,
    #[serde(serialize_with = "serde_bigint::serialize")]
    pub amount: BigInt,
}

impl Posting {
    /// Build a posting with both addresses normalized
    pub fn new(
        source: &str,
        destination: &str,
        asset: impl Into<String>,
        amount: impl Into<BigInt>,
    ) -> Self {
        Self {
            source: normalize_address(source),
            destination: normalize_address(destination),
            asset: asset.into(),
            amount: amount.into(),
        }
    }

    fn normalized(self) -> Self {
        Self {
            source: normalize_address(&self.source),
            destination: normalize_address(&self.destination),
            ..self
        }
    }
}

/// A committed, immutable transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: u64,
    pub postings: Vec<Posting>,
    pub metadata: Metadata,
    pub timestamp: DateTime<Utc>,
}

/// Per-call options for `Ledger::create_transaction`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Address -> whether it may go below zero in this transaction
    pub allow_overdraft: HashMap<String, bool>,
}

impl TransactionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overdraft(mut self, address: &str) -> Self {
        self.grant_overdraft(address);
        self
    }

    pub fn grant_overdraft(&mut self, address: &str) {
        self.allow_overdraft.insert(normalize_address(address), true);
    }

    pub fn allows_overdraft(&self, address: &str) -> bool {
        address == WORLD
            || self
                .allow_overdraft
                .get(address)
                .copied()
                .unwrap_or(false)
    }
}

/// Accounts plus transaction log for one demo session
#[derive(Debug, Clone)]
pub struct Ledger {
    accounts: IndexMap<String, Account>,
    transactions: Vec<Transaction>,
    next_id: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        let mut accounts = IndexMap::new();
        accounts.insert(WORLD.to_string(), Account::new(WORLD));
        Self {
            accounts,
            transactions: Vec::new(),
            next_id: 1,
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the account at `address`, creating an empty one if needed
    pub fn get_or_create_account(&mut self, address: &str) -> &mut Account {
        let address = normalize_address(address);
        self.accounts
            .entry(address.clone())
            .or_insert_with(|| Account::new(address))
    }

    /// Balance of `address` for `asset`; zero for unknown accounts or assets
    pub fn get_balance(&self, address: &str, asset: &str) -> BigInt {
        self.accounts
            .get(&normalize_address(address))
            .map(|account| account.balance(asset))
            .unwrap_or_default()
    }

    /// Commit `postings` as one transaction
    ///
    /// Postings are checked in order, each against the balances left by the
    /// postings before it. A source other than `@world` without an overdraft
    /// grant in `options` may not end below zero. Balances only change once
    /// every posting has passed.
    pub fn create_transaction(
        &mut self,
        postings: Vec<Posting>,
        metadata: Metadata,
        options: &TransactionOptions,
    ) -> NumscriptResult<Transaction> {
        if postings.is_empty() {
            return Err(NumscriptError::InvalidPosting(
                "a transaction needs at least one posting".to_string(),
            ));
        }

        let postings: Vec<Posting> = postings.into_iter().map(Posting::normalized).collect();

        let mut staged: HashMap<(&str, &str), BigInt> = HashMap::new();
        for posting in &postings {
            validate_posting(posting)?;

            let source_key = (posting.source.as_str(), posting.asset.as_str());
            let available = self.get_balance(&posting.source, &posting.asset)
                + staged.get(&source_key).cloned().unwrap_or_default();

            if !options.allows_overdraft(&posting.source)
                && (&available - &posting.amount).is_negative()
            {
                return Err(NumscriptError::InsufficientFunds {
                    account: posting.source.clone(),
                    asset: posting.asset.clone(),
                    available,
                    required: posting.amount.clone(),
                });
            }

            *staged.entry(source_key).or_default() -= &posting.amount;
            *staged
                .entry((posting.destination.as_str(), posting.asset.as_str()))
                .or_default() += &posting.amount;
        }

        for posting in &postings {
            self.get_or_create_account(&posting.source)
                .debit(&posting.asset, &posting.amount);
            self.get_or_create_account(&posting.destination)
                .credit(&posting.asset, &posting.amount);
        }

        let transaction = Transaction {
            id: self.next_id,
            postings,
            metadata,
            timestamp: Utc::now(),
        };
        self.next_id += 1;

        debug!(
            id = transaction.id,
            postings = transaction.postings.len(),
            "committed transaction"
        );

        self.transactions.push(transaction.clone());
        Ok(transaction)
    }

    pub fn set_account_metadata(&mut self, address: &str, key: &str, value: &str) {
        self.get_or_create_account(address)
            .metadata
            .insert(key.to_string(), value.to_string());
    }

    pub fn get_account_metadata(&self, address: &str, key: &str) -> Option<&str> {
        self.get_account(address)
            .and_then(|account| account.metadata.get(key))
            .map(String::as_str)
    }

    /// Non-zero balances of every account matching `pattern`
    pub fn get_balances(&self, pattern: &str) -> Vec<BalanceEntry> {
        self.balance_entries(|address| matches_pattern(address, pattern))
    }

    /// Non-zero balances of every account, `@world` included
    pub fn get_all_balances(&self) -> Vec<BalanceEntry> {
        self.balance_entries(|_| true)
    }

    fn balance_entries(&self, include: impl Fn(&str) -> bool) -> Vec<BalanceEntry> {
        self.accounts
            .values()
            .filter(|account| include(&account.address))
            .flat_map(|account| {
                account
                    .balances
                    .iter()
                    .filter(|(_, balance)| !balance.is_zero())
                    .map(|(asset, balance)| BalanceEntry {
                        address: account.address.clone(),
                        asset: asset.clone(),
                        balance: balance.clone(),
                    })
            })
            .collect()
    }

    /// Per-asset totals across every account matching any of `patterns`
    ///
    /// An account matched by several patterns is counted once.
    pub fn get_aggregated_balances<S: AsRef<str>>(&self, patterns: &[S]) -> Vec<AggregatedBalance> {
        let mut totals: IndexMap<String, AggregatedBalance> = IndexMap::new();

        let matched = self.accounts.values().filter(|account| {
            patterns
                .iter()
                .any(|pattern| matches_pattern(&account.address, pattern.as_ref()))
        });

        for account in matched {
            for (asset, balance) in &account.balances {
                if balance.is_zero() {
                    continue;
                }
                let entry = totals
                    .entry(asset.clone())
                    .or_insert_with(|| AggregatedBalance {
                        asset: asset.clone(),
                        balance: BigInt::zero(),
                        accounts: Vec::new(),
                    });
                entry.balance += balance;
                if !entry.accounts.contains(&account.address) {
                    entry.accounts.push(account.address.clone());
                }
            }
        }

        totals.into_values().collect()
    }

    /// Transactions matching `filter`, oldest first
    pub fn list_transactions(&self, filter: &TransactionFilter) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|tx| filter.matches(tx))
            .collect()
    }

    /// Accounts matching `filter` in creation order, `@world` included
    pub fn list_accounts(&self, filter: &AccountFilter) -> Vec<&Account> {
        self.accounts
            .values()
            .filter(|account| filter.matches(account))
            .collect()
    }

    pub fn get_account(&self, address: &str) -> Option<&Account> {
        self.accounts.get(&normalize_address(address))
    }

    /// Every balance held by `address`; empty for unknown accounts
    pub fn get_account_balances(&self, address: &str) -> IndexMap<String, BigInt> {
        self.get_account(address)
            .map(|account| account.balances.clone())
            .unwrap_or_default()
    }

    pub fn get_transaction(&self, id: u64) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Drop every account and transaction, re-seed `@world`, restart IDs at 1
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn get_transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Number of accounts, not counting `@world`
    pub fn get_account_count(&self) -> usize {
        self.accounts.keys().filter(|a| a.as_str() != WORLD).count()
    }
}

fn validate_posting(posting: &Posting) -> NumscriptResult<()> {
    if posting.amount.is_negative() {
        return Err(NumscriptError::InvalidPosting(format!(
            "negative amount {} {} from {} to {}",
            posting.asset, posting.amount, posting.source, posting.destination
        )));
    }
    for address in [&posting.source, &posting.destination] {
        if address.len() <= 1 {
            return Err(NumscriptError::InvalidPosting(format!(
                "empty account address in posting of {} {}",
                posting.asset, posting.amount
            )));
        }
    }
    if posting.asset.trim().is_empty() {
        return Err(NumscriptError::InvalidPosting(format!(
            "posting from {} to {} has no asset",
            posting.source, posting.destination
        )));
    }
    Ok(())
}

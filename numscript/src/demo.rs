//! Demo configurations and their saved queries
//!
//! A demo configuration is JSON produced outside this crate. It names the
//! accounts to show, the variables shared by every step, the Numscript steps
//! to run in order and a list of queries worth running afterwards.

use crate::executor::Variables;
use crate::ledger::{
    Account, AccountFilter, AggregatedBalance, BalanceEntry, Ledger, Transaction,
    TransactionFilter,
};
use crate::{NumscriptError, NumscriptResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub accounts: Vec<DemoAccount>,
    /// Bindings shared by every step, see `Variables::from_json`
    #[serde(default)]
    pub variables: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub transaction_steps: Vec<TransactionStep>,
    #[serde(default)]
    pub useful_queries: Vec<UsefulQuery>,
}

impl DemoConfig {
    /// A configuration with no accounts, steps or queries
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            accounts: Vec::new(),
            variables: serde_json::Map::new(),
            transaction_steps: Vec::new(),
            useful_queries: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> NumscriptResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| NumscriptError::Engine(format!("Invalid demo configuration: {}", e)))
    }

    pub fn variables(&self) -> NumscriptResult<Variables> {
        Variables::from_json(&serde_json::Value::Object(self.variables.clone()))
    }
}

/// An account shown in the demo, with display name and color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoAccount {
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStep {
    pub label: String,
    pub numscript: String,
    #[serde(default)]
    pub description: String,
}

/// A query plus its display text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsefulQuery {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub query: QueryDescriptor,
}

/// A ledger lookup, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum QueryDescriptor {
    /// One pattern lists balances; several patterns aggregate per asset
    #[serde(rename_all = "camelCase")]
    Balance {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        address_pattern: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        address_patterns: Option<Vec<String>>,
    },
    #[serde(rename_all = "camelCase")]
    Transactions {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account: Option<String>,
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        metadata: IndexMap<String, String>,
    },
    #[serde(rename_all = "camelCase")]
    Accounts {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        address_pattern: Option<String>,
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        metadata: IndexMap<String, String>,
    },
}

/// Rows returned by `run_query`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "rows", rename_all = "camelCase")]
pub enum QueryResult {
    Balances(Vec<BalanceEntry>),
    Aggregated(Vec<AggregatedBalance>),
    Transactions(Vec<Transaction>),
    Accounts(Vec<Account>),
}

impl QueryResult {
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Balances(rows) => rows.len(),
            QueryResult::Aggregated(rows) => rows.len(),
            QueryResult::Transactions(rows) => rows.len(),
            QueryResult::Accounts(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run one query descriptor against `ledger`
///
/// A balance query with `addressPatterns` aggregates; otherwise it lists the
/// balances of `addressPattern`.
pub fn run_query(ledger: &Ledger, query: &QueryDescriptor) -> NumscriptResult<QueryResult> {
    match query {
        QueryDescriptor::Balance {
            address_patterns: Some(patterns),
            ..
        } if !patterns.is_empty() => Ok(QueryResult::Aggregated(
            ledger.get_aggregated_balances(patterns.as_slice()),
        )),
        QueryDescriptor::Balance {
            address_pattern: Some(pattern),
            ..
        } => Ok(QueryResult::Balances(ledger.get_balances(pattern))),
        QueryDescriptor::Balance { .. } => Err(NumscriptError::Engine(
            "A balance query needs addressPattern or addressPatterns".to_string(),
        )),
        QueryDescriptor::Transactions { account, metadata } => {
            let filter = TransactionFilter {
                account: account.clone(),
                metadata: metadata.clone(),
                ..TransactionFilter::default()
            };
            Ok(QueryResult::Transactions(
                ledger.list_transactions(&filter).into_iter().cloned().collect(),
            ))
        }
        QueryDescriptor::Accounts {
            address_pattern,
            metadata,
        } => {
            let filter = AccountFilter {
                address_pattern: address_pattern.clone(),
                metadata: metadata.clone(),
            };
            Ok(QueryResult::Accounts(
                ledger.list_accounts(&filter).into_iter().cloned().collect(),
            ))
        }
    }
}

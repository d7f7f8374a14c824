//! Script execution against a ledger
//!
//! `Executor::execute` substitutes variables, parses, resolves every send
//! into postings against the ledger plus the balances moved by earlier sends,
//! and commits all postings as one transaction.

pub mod funding;
pub mod pending;
pub mod variables;

pub use pending::PendingBalances;
pub use variables::{substitute, VariableValue, Variables};

use crate::ledger::{Ledger, Metadata, Transaction, TransactionOptions};
use crate::parser::parse_numscript;
use crate::semantic::{MetadataScope, ParsedScript};
use crate::{NumscriptError, NumscriptResult, ResourceLimits};
use serde::Serialize;
use tracing::debug;

/// Outcome of `validate_numscript`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Runs Numscript against a `Ledger`
#[derive(Debug, Clone, Default)]
pub struct Executor {
    limits: ResourceLimits,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Execute `script` as one atomic transaction
    ///
    /// Statements that fail to parse are skipped. Insufficient funds,
    /// unsupported operations and unbound accounts fail the whole script and
    /// leave the ledger untouched. Account metadata is written after the
    /// transaction commits.
    pub fn execute(
        &self,
        script: &str,
        variables: &Variables,
        ledger: &mut Ledger,
    ) -> NumscriptResult<Transaction> {
        self.limits.check_script_size(script)?;

        let substituted = substitute(script, variables);
        let parsed = parse_numscript(&substituted);
        self.limits.check_send_count(parsed.sends.len())?;

        let mut pending = PendingBalances::new();
        let mut postings = Vec::new();
        let mut options = TransactionOptions::new();

        for send in &parsed.sends {
            let total = send.monetary.fixed_amount()?;
            let withdrawals = funding::fund_sources(send, total, ledger, &pending)?;
            let allocations = funding::split_destinations(send, total)?;
            postings.extend(funding::pair_postings(
                &send.monetary.asset,
                &withdrawals,
                &allocations,
                &mut pending,
            ));

            for source in send.sources.iter().filter(|s| s.overdraft.is_some()) {
                options.grant_overdraft(source.account.resolve()?);
            }
        }

        self.limits.check_posting_count(postings.len())?;
        if postings.is_empty() {
            return Err(NumscriptError::Execution(
                "script produced no postings".to_string(),
            ));
        }

        let metadata = transaction_metadata(&parsed);
        let account_metadata = resolved_account_metadata(&parsed)?;

        let transaction = ledger.create_transaction(postings, metadata, &options)?;

        for (address, key, value) in account_metadata {
            ledger.set_account_metadata(&address, &key, &value);
        }

        debug!(
            id = transaction.id,
            sends = parsed.sends.len(),
            skipped = parsed.failures.len(),
            "executed script"
        );
        Ok(transaction)
    }

    /// Report problems in `script` without executing it
    pub fn validate(&self, script: &str) -> Validation {
        let mut errors = Vec::new();

        if let Err(e) = self.limits.check_script_size(script) {
            errors.push(e.to_string());
            return Validation {
                valid: false,
                errors,
            };
        }

        let parsed = parse_numscript(script);
        if let Err(e) = self.limits.check_send_count(parsed.sends.len()) {
            errors.push(e.to_string());
        }

        if parsed.sends.is_empty() {
            errors.push("No send statements found".to_string());
        }
        for (index, send) in parsed.sends.iter().enumerate() {
            if send.sources.is_empty() {
                errors.push(format!(
                    "Send statement {} ({}) has no sources",
                    index + 1,
                    send.monetary
                ));
            }
            if send.destinations.is_empty() {
                errors.push(format!(
                    "Send statement {} ({}) has no destinations",
                    index + 1,
                    send.monetary
                ));
            }
        }
        errors.extend(parsed.failures.iter().map(|failure| failure.to_string()));

        Validation {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate with default resource limits
pub fn validate_numscript(script: &str) -> Validation {
    Executor::new().validate(script)
}

/// Every `set_tx_meta` in order; a repeated key keeps its last value
fn transaction_metadata(parsed: &ParsedScript) -> Metadata {
    let mut metadata = Metadata::new();
    for statement in parsed.tx_metadata() {
        metadata.insert(statement.key.clone(), statement.value.render());
    }
    metadata
}

fn resolved_account_metadata(
    parsed: &ParsedScript,
) -> NumscriptResult<Vec<(String, String, String)>> {
    parsed
        .account_metadata()
        .filter_map(|statement| match &statement.scope {
            MetadataScope::Account(account) => Some((account, statement)),
            MetadataScope::Transaction => None,
        })
        .map(|(account, statement)| {
            Ok((
                account.resolve()?.to_string(),
                statement.key.clone(),
                statement.value.render(),
            ))
        })
        .collect()
}

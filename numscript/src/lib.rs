//! # Numscript Engine
//!
//! **Double-entry transaction scripts over an in-memory ledger**
//!
//! Numscript describes money movements: how much of which asset, drawn from
//! which accounts, split across which destinations. This crate parses
//! Numscript, resolves it against account balances and commits the result
//! as one atomic ledger transaction.
//!
//! ## Quick Start
//!
//! ```rust
//! use numscript::{Executor, Ledger, NumscriptResult, Variables};
//!
//! fn main() -> NumscriptResult<()> {
//!     let mut ledger = Ledger::new();
//!     let executor = Executor::new();
//!
//!     let script = r#"
//!         send [USD/2 10000] (
//!             source = @world
//!             destination = @users:alice
//!         )
//!     "#;
//!     executor.execute(script, &Variables::new(), &mut ledger)?;
//!
//!     assert_eq!(ledger.get_balance("@users:alice", "USD/2"), 10000.into());
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Accounts
//! Colon-delimited addresses such as `@users:alice:wallet`, created on first
//! use. `@world` is the only account that may always go below zero.
//!
//! ### Assets and amounts
//! `USD/2` counts cents: `[USD/2 10000]` is one hundred dollars. Amounts are
//! unbounded integers and never floating point.
//!
//! ### Sends
//! A send drains its sources in order and splits the total across its
//! destinations by percentage, fraction or `remaining`. Every send of a
//! script sees the balances moved by the sends before it, and all of them
//! commit together or not at all.
//!
//! ### Scanning
//! `parse_postings_from_numscript` and `parse_metadata_from_numscript` pull
//! flows and metadata keys out of scripts that may not parse at all, for
//! drawing diagrams.

pub mod ast;
pub mod demo;
pub mod error;
pub mod executor;
pub mod format;
pub mod ledger;
pub mod parser;
pub mod resource_limits;
pub mod semantic;
pub mod session;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use ast::Span;
pub use demo::{run_query, DemoConfig, QueryDescriptor, QueryResult, UsefulQuery};
pub use error::NumscriptError;
pub use executor::{validate_numscript, Executor, Validation, VariableValue, Variables};
pub use format::format_amount;
pub use ledger::{
    matches_pattern, Account, AccountFilter, Ledger, Metadata, Posting, Transaction,
    TransactionFilter, TransactionOptions,
};
pub use parser::{
    parse_asset, parse_metadata_from_numscript, parse_monetary, parse_numscript,
    parse_numscript_strict, parse_postings_from_numscript, MetadataKeys, ScannedPosting,
};
pub use resource_limits::ResourceLimits;
pub use semantic::*;
pub use session::{DemoSession, SessionRegistry, StepRun};

/// Result type for Numscript operations
pub type NumscriptResult<T> = Result<T, NumscriptError>;

#[cfg(test)]
mod tests;

use crate::ast::Span;
use num_bigint::BigInt;
use std::fmt;
use std::sync::Arc;

/// Detailed error information with source location
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub message: String,
    pub span: Span,
    pub source_id: String,
    pub source_text: Arc<str>,
    pub suggestion: Option<String>,
}

/// Error types for parsing, executing and committing Numscript
#[derive(Debug, Clone)]
pub enum NumscriptError {
    /// Malformed literal or statement, with source location
    Parse(Box<ErrorDetails>),

    /// A source could not cover its debit.
    ///
    /// For a waterfall, `account` lists every source that was drained and
    /// `available` is what they covered together.
    InsufficientFunds {
        account: String,
        asset: String,
        available: BigInt,
        required: BigInt,
    },

    /// Valid syntax the executor has no resolution logic for
    Unsupported(String),

    /// Execution failed for a reason other than funds
    Execution(String),

    /// Posting rejected by the ledger before any balance check
    InvalidPosting(String),

    /// Input exceeded a configured resource limit
    ResourceLimitExceeded {
        limit_name: String,
        limit_value: String,
        actual_value: String,
        suggestion: String,
    },

    /// Engine error without specific source location
    Engine(String),
}

impl NumscriptError {
    /// Create a parse error with source information
    pub fn parse(
        message: impl Into<String>,
        span: Span,
        source_id: impl Into<String>,
        source_text: Arc<str>,
    ) -> Self {
        Self::Parse(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_id: source_id.into(),
            source_text,
            suggestion: None,
        }))
    }

    /// Create a parse error with suggestion
    pub fn parse_with_suggestion(
        message: impl Into<String>,
        span: Span,
        source_id: impl Into<String>,
        source_text: Arc<str>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Parse(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_id: source_id.into(),
            source_text,
            suggestion: Some(suggestion.into()),
        }))
    }

    /// Amount still missing for an insufficient-funds error
    pub fn shortfall(&self) -> Option<BigInt> {
        match self {
            NumscriptError::InsufficientFunds {
                available,
                required,
                ..
            } => Some(required - available),
            _ => None,
        }
    }

    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, NumscriptError::InsufficientFunds { .. })
    }
}

impl fmt::Display for NumscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumscriptError::Parse(details) => {
                write!(f, "Parse error: {}", details.message)?;
                if let Some(suggestion) = &details.suggestion {
                    write!(f, " (suggestion: {})", suggestion)?;
                }
                write!(
                    f,
                    " at {}:{}:{}",
                    details.source_id, details.span.line, details.span.col
                )
            }
            NumscriptError::InsufficientFunds {
                account,
                asset,
                available,
                required,
            } => write!(
                f,
                "Insufficient funds in {}: {} available {}, required {}",
                account, asset, available, required
            ),
            NumscriptError::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
            NumscriptError::Execution(msg) => write!(f, "Execution error: {}", msg),
            NumscriptError::InvalidPosting(msg) => write!(f, "Invalid posting: {}", msg),
            NumscriptError::ResourceLimitExceeded {
                limit_name,
                limit_value,
                actual_value,
                suggestion,
            } => write!(
                f,
                "Resource limit exceeded: {} (limit {}, actual {}). {}",
                limit_name, limit_value, actual_value, suggestion
            ),
            NumscriptError::Engine(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for NumscriptError {}

impl From<std::fmt::Error> for NumscriptError {
    fn from(err: std::fmt::Error) -> Self {
        NumscriptError::Engine(format!("Format error: {}", err))
    }
}

use crate::ast::Span;
use crate::error::NumscriptError;
use crate::NumscriptResult;
use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Account sigil every normalized address starts with
pub const SIGIL: char = '@';

/// The only account with permanent, implicit overdraft
pub const WORLD: &str = "@world";

/// Prefix `address` with the account sigil unless it already has one.
pub fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    if trimmed.starts_with(SIGIL) {
        trimmed.to_string()
    } else {
        format!("{}{}", SIGIL, trimmed)
    }
}

/// Drop a single leading sigil.
pub fn strip_sigil(address: &str) -> &str {
    address.strip_prefix(SIGIL).unwrap_or(address)
}

/// Largest `/PRECISION` an asset identifier may carry
pub const MAX_ASSET_PRECISION: u32 = 38;

/// Asset identifier split into currency code and decimal precision
///
/// `USD/2` has code `USD` and precision 2; balances of that asset count cents.
/// An identifier without `/` has precision 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Asset {
    pub code: String,
    pub precision: u32,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.precision == 0 {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}/{}", self.code, self.precision)
        }
    }
}

/// Amount of a monetary literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Amount {
    Fixed(BigInt),
    /// `*`: the whole available balance
    All,
}

impl Amount {
    pub fn fixed(&self) -> Option<&BigInt> {
        match self {
            Amount::Fixed(n) => Some(n),
            Amount::All => None,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Fixed(n) => write!(f, "{}", n),
            Amount::All => write!(f, "*"),
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A bracketed `[ASSET AMOUNT]` literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Monetary {
    pub asset: String,
    pub amount: Amount,
}

impl Monetary {
    pub fn new(asset: impl Into<String>, amount: impl Into<BigInt>) -> Self {
        Self {
            asset: asset.into(),
            amount: Amount::Fixed(amount.into()),
        }
    }

    /// The fixed amount, or an `Unsupported` error for `*`.
    pub fn fixed_amount(&self) -> NumscriptResult<&BigInt> {
        self.amount.fixed().ok_or_else(|| {
            NumscriptError::Unsupported(format!(
                "send all ({}) is not supported by the executor; use a fixed amount",
                self
            ))
        })
    }
}

impl fmt::Display for Monetary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.asset, self.amount)
    }
}

/// An account as written in a script: a literal address or a variable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AccountRef {
    /// Normalized address, sigil included
    Address(String),
    /// Variable name without the `$`
    Variable(String),
}

impl AccountRef {
    /// The concrete address; variables still present here were never bound.
    pub fn resolve(&self) -> NumscriptResult<&str> {
        match self {
            AccountRef::Address(address) if address.contains('$') => Err(
                NumscriptError::Execution(format!("Unbound variable in account {}", address)),
            ),
            AccountRef::Address(address) => Ok(address),
            AccountRef::Variable(name) => Err(NumscriptError::Execution(format!(
                "Unbound account variable ${}",
                name
            ))),
        }
    }

    pub fn is_world(&self) -> bool {
        matches!(self, AccountRef::Address(a) if a == WORLD)
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRef::Address(address) => write!(f, "{}", address),
            AccountRef::Variable(name) => write!(f, "${}", name),
        }
    }
}

/// Overdraft modifier on a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Overdraft {
    /// `allowing overdraft`, optionally `up to [MONETARY]`
    Bounded { limit: Option<Monetary> },
    /// `allowing unbounded overdraft`
    Unbounded,
}

/// One entry of a source block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub account: AccountRef,
    /// `max [MONETARY] from` cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Monetary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overdraft: Option<Overdraft>,
}

impl Source {
    pub fn account(account: AccountRef) -> Self {
        Self {
            account,
            max: None,
            overdraft: None,
        }
    }

    /// `@world` or an explicit overdraft modifier
    pub fn allows_overdraft(&self) -> bool {
        self.overdraft.is_some() || self.account.is_world()
    }

    /// `@world` or `allowing unbounded overdraft`
    pub fn is_unbounded(&self) -> bool {
        matches!(self.overdraft, Some(Overdraft::Unbounded)) || self.account.is_world()
    }
}

/// Share specifier of a destination entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Portion {
    /// `2.5%` is stored as 2.5
    Percentage { value: Decimal },
    Fraction {
        #[serde(serialize_with = "serde_bigint::serialize")]
        numerator: BigInt,
        #[serde(serialize_with = "serde_bigint::serialize")]
        denominator: BigInt,
    },
    Remaining,
}

impl fmt::Display for Portion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Portion::Percentage { value } => write!(f, "{}%", value),
            Portion::Fraction {
                numerator,
                denominator,
            } => write!(f, "{}/{}", numerator, denominator),
            Portion::Remaining => write!(f, "remaining"),
        }
    }
}

/// Where a destination entry sends its share
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "account", rename_all = "snake_case")]
pub enum DestinationTarget {
    Account(AccountRef),
    /// The share stays with the sources
    Kept,
}

/// One entry of a destination block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portion: Option<Portion>,
    pub target: DestinationTarget,
}

impl Destination {
    pub fn account(account: AccountRef) -> Self {
        Self {
            portion: None,
            target: DestinationTarget::Account(account),
        }
    }

    pub fn is_kept(&self) -> bool {
        matches!(self.target, DestinationTarget::Kept)
    }

    pub fn is_remaining(&self) -> bool {
        matches!(self.portion, Some(Portion::Remaining))
    }
}

/// `send [MONETARY] ( source = ... destination = ... )`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendStatement {
    pub monetary: Monetary,
    /// Drained in order
    pub sources: Vec<Source>,
    pub destinations: Vec<Destination>,
    pub span: Span,
}

/// Right-hand side of a metadata call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetadataValue {
    Text(String),
    Monetary(Monetary),
    #[serde(serialize_with = "serde_bigint::serialize")]
    Number(BigInt),
    Account(String),
    /// Variable name without the `$`; never bound at execution time
    Variable(String),
}

impl MetadataValue {
    /// The string stored in a metadata map
    pub fn render(&self) -> String {
        match self {
            MetadataValue::Text(text) => text.clone(),
            MetadataValue::Monetary(monetary) => monetary.to_string(),
            MetadataValue::Number(n) => n.to_string(),
            MetadataValue::Account(address) => address.clone(),
            MetadataValue::Variable(name) => format!("${}", name),
        }
    }
}

/// Whether a metadata call targets the transaction or an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "account", rename_all = "snake_case")]
pub enum MetadataScope {
    Transaction,
    Account(AccountRef),
}

/// `set_tx_meta(...)` or `set_account_meta(...)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataStatement {
    pub scope: MetadataScope,
    pub key: String,
    pub value: MetadataValue,
    pub span: Span,
}

impl MetadataStatement {
    pub fn is_transaction(&self) -> bool {
        matches!(self.scope, MetadataScope::Transaction)
    }
}

/// Type keyword of a `vars { }` declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    Monetary,
    Account,
    Asset,
    Portion,
    Number,
    String,
}

impl FromStr for VariableType {
    type Err = NumscriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monetary" => Ok(VariableType::Monetary),
            "account" => Ok(VariableType::Account),
            "asset" => Ok(VariableType::Asset),
            "portion" => Ok(VariableType::Portion),
            "number" => Ok(VariableType::Number),
            "string" => Ok(VariableType::String),
            other => Err(NumscriptError::Engine(format!(
                "Unknown variable type '{}'\n\
                 Expected one of: monetary, account, asset, portion, number, string",
                other
            ))),
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariableType::Monetary => "monetary",
            VariableType::Account => "account",
            VariableType::Asset => "asset",
            VariableType::Portion => "portion",
            VariableType::Number => "number",
            VariableType::String => "string",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableDecl {
    pub var_type: VariableType,
    /// Without the `$`
    pub name: String,
    pub span: Span,
}

/// Statement categories the segmenter recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Vars,
    Send,
    TxMeta,
    AccountMeta,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::Vars => "vars block",
            StatementKind::Send => "send statement",
            StatementKind::TxMeta => "set_tx_meta call",
            StatementKind::AccountMeta => "set_account_meta call",
        };
        write!(f, "{}", name)
    }
}

/// A statement that was located but did not parse; it was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    pub kind: StatementKind,
    /// The whole statement
    pub span: Span,
    /// Where parsing stopped
    pub location: Span,
    pub message: String,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Skipped {} at line {}, column {}: {}",
            self.kind, self.location.line, self.location.col, self.message
        )
    }
}

/// Structured result of a full-script parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedScript {
    pub variables: Vec<VariableDecl>,
    pub sends: Vec<SendStatement>,
    pub metadata: Vec<MetadataStatement>,
    /// Statements skipped because they failed to parse
    pub failures: Vec<ParseFailure>,
}

impl ParsedScript {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn tx_metadata(&self) -> impl Iterator<Item = &MetadataStatement> {
        self.metadata.iter().filter(|m| m.is_transaction())
    }

    pub fn account_metadata(&self) -> impl Iterator<Item = &MetadataStatement> {
        self.metadata.iter().filter(|m| !m.is_transaction())
    }
}

/// Serialize unbounded integers as decimal strings
pub(crate) mod serde_bigint {
    use indexmap::IndexMap;
    use num_bigint::BigInt;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn serialize_map<S: Serializer>(
        map: &IndexMap<String, BigInt>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(map.iter().map(|(k, v)| (k, v.to_string())))
    }
}

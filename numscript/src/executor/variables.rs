//! Typed variable bindings and the text substitution pass
//!
//! Substitution runs on raw script text before parsing and produces a new
//! buffer. `{NAME}` and `$name` both look up the same map.

use crate::parser::{parse_monetary, string_literal_ranges, variable_blocks};
use crate::semantic::{normalize_address, Monetary, VariableType};
use crate::{NumscriptError, NumscriptResult};
use indexmap::IndexMap;
use num_bigint::BigInt;
use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::OnceLock;

/// A bound variable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum VariableValue {
    Text(String),
    #[serde(serialize_with = "crate::semantic::serde_bigint::serialize")]
    Number(BigInt),
    Monetary(Monetary),
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Text(text) => write!(f, "{}", text),
            VariableValue::Number(n) => write!(f, "{}", n),
            VariableValue::Monetary(monetary) => write!(f, "{}", monetary),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Text(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::Text(value)
    }
}

impl From<i32> for VariableValue {
    fn from(value: i32) -> Self {
        VariableValue::Number(BigInt::from(value))
    }
}

impl From<i64> for VariableValue {
    fn from(value: i64) -> Self {
        VariableValue::Number(BigInt::from(value))
    }
}

impl From<BigInt> for VariableValue {
    fn from(value: BigInt) -> Self {
        VariableValue::Number(value)
    }
}

impl From<Monetary> for VariableValue {
    fn from(value: Monetary) -> Self {
        VariableValue::Monetary(value)
    }
}

/// Reads a command-line value: `[USD/2 100]` is monetary, digits are a
/// number, anything else is text.
impl FromStr for VariableValue {
    type Err = NumscriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('[') {
            return parse_monetary(trimmed).map(VariableValue::Monetary);
        }
        if let Ok(n) = BigInt::from_str(trimmed) {
            return Ok(VariableValue::Number(n));
        }
        Ok(VariableValue::Text(s.to_string()))
    }
}

/// Variable name (without `$` or braces) -> value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Variables {
    values: IndexMap<String, VariableValue>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<VariableValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<VariableValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&VariableValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &VariableValue)> {
        self.values.iter()
    }

    /// Merge `other` over `self`; `other` wins on conflicts
    pub fn extend(&mut self, other: Variables) {
        self.values.extend(other.values);
    }

    /// Bindings from a JSON object
    ///
    /// Strings become text, integers numbers, and `{"asset": .., "amount": ..}`
    /// objects monetary values. Booleans and non-integer numbers are kept as
    /// their text. `null` entries are skipped.
    pub fn from_json(value: &serde_json::Value) -> NumscriptResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            NumscriptError::Engine(format!(
                "Variables must be a JSON object, got {}",
                json_kind(value)
            ))
        })?;

        let mut variables = Variables::new();
        for (name, value) in object {
            if let Some(value) = json_to_value(name, value)? {
                variables.insert(name, value);
            }
        }
        Ok(variables)
    }
}

fn json_to_value(name: &str, value: &serde_json::Value) -> NumscriptResult<Option<VariableValue>> {
    use serde_json::Value;

    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(VariableValue::Text(s.clone()))),
        Value::Bool(b) => Ok(Some(VariableValue::Text(b.to_string()))),
        Value::Number(n) => {
            let text = n.to_string();
            Ok(Some(match BigInt::from_str(&text) {
                Ok(integer) => VariableValue::Number(integer),
                Err(_) => VariableValue::Text(text),
            }))
        }
        Value::Object(fields) => {
            let asset = fields.get("asset").and_then(Value::as_str);
            let amount = fields.get("amount").and_then(|amount| match amount {
                Value::Number(n) => BigInt::from_str(&n.to_string()).ok(),
                Value::String(s) => BigInt::from_str(s.trim()).ok(),
                _ => None,
            });
            match (asset, amount) {
                (Some(asset), Some(amount)) => {
                    Ok(Some(VariableValue::Monetary(Monetary::new(asset, amount))))
                }
                _ => Err(NumscriptError::Engine(format!(
                    "Variable '{}' must be a string, an integer or {{\"asset\": .., \"amount\": ..}}",
                    name
                ))),
            }
        }
        Value::Array(_) => Err(NumscriptError::Engine(format!(
            "Variable '{}' must not be an array",
            name
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn reference_regex() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    CELL.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").ok()
    })
    .as_ref()
}

/// Replace every bound `{NAME}` and `$name` outside `vars { }` blocks
///
/// Monetary values render as `[ASSET AMOUNT]`. Values of variables declared
/// `account` gain the `@` sigil. Text containing spaces or punctuation
/// outside a string literal is written as a quoted string. Unbound
/// references stay as written.
pub fn substitute(script: &str, variables: &Variables) -> String {
    let Some(regex) = reference_regex() else {
        return script.to_string();
    };
    if variables.is_empty() {
        return script.to_string();
    }

    let (declarations, vars_ranges) = variable_blocks(script);
    let strings = string_literal_ranges(script);
    let declared = |name: &str| {
        declarations
            .iter()
            .find(|decl| decl.name == name)
            .map(|decl| decl.var_type)
    };

    regex
        .replace_all(script, |caps: &Captures| {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let original = caps[0].to_string();
            if within(&vars_ranges, whole.start) {
                return original;
            }
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            match variables.get(name) {
                Some(value) => render(value, declared(name), within(&strings, whole.start)),
                None => original,
            }
        })
        .into_owned()
}

fn within(ranges: &[Range<usize>], position: usize) -> bool {
    ranges.iter().any(|range| range.contains(&position))
}

fn render(value: &VariableValue, declared: Option<VariableType>, in_string: bool) -> String {
    match value {
        VariableValue::Monetary(monetary) => monetary.to_string(),
        VariableValue::Number(n) => n.to_string(),
        VariableValue::Text(text) if in_string => text.replace('"', "\\\""),
        VariableValue::Text(text) if declared == Some(VariableType::Account) => {
            normalize_address(text)
        }
        VariableValue::Text(text) if needs_quotes(text) => {
            format!("\"{}\"", text.replace('"', "\\\""))
        }
        VariableValue::Text(text) => text.clone(),
    }
}

fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '(' | ')' | ','))
}

use crate::error::NumscriptError;
use crate::parser::{grammar_error, NumscriptParser, Rule, SOURCE_ID};
use crate::semantic::*;
use crate::NumscriptResult;

use num_bigint::BigInt;
use num_traits::Zero;
use pest::iterators::Pair;
use pest::Parser;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

/// Parse an asset identifier such as `USD/2` or `COIN`
///
/// Precision defaults to 0 when there is no `/PRECISION` suffix.
pub fn parse_asset(input: &str) -> NumscriptResult<Asset> {
    let trimmed = input.trim();
    NumscriptParser::parse(Rule::asset_input, trimmed).map_err(|e| {
        literal_error(
            "asset",
            trimmed,
            e,
            "Write assets as CODE or CODE/PRECISION, e.g. USD/2",
        )
    })?;
    split_asset(trimmed)
}

pub(crate) fn split_asset(identifier: &str) -> NumscriptResult<Asset> {
    match identifier.split_once('/') {
        Some((code, precision)) => {
            let precision = precision.parse::<u32>().map_err(|_| {
                NumscriptError::Engine(format!(
                    "Invalid asset precision in '{}'\n\
                     Expected CODE/PRECISION with a small integer precision (e.g., USD/2)",
                    identifier
                ))
            })?;
            if precision > MAX_ASSET_PRECISION {
                return Err(NumscriptError::Engine(format!(
                    "Asset precision {} in '{}' exceeds the maximum of {}",
                    precision, identifier, MAX_ASSET_PRECISION
                )));
            }
            Ok(Asset {
                code: code.to_string(),
                precision,
            })
        }
        None => Ok(Asset {
            code: identifier.to_string(),
            precision: 0,
        }),
    }
}

/// Parse a bracketed monetary literal: `[USD/2 10000]` or `[USD/2 *]`
pub fn parse_monetary(input: &str) -> NumscriptResult<Monetary> {
    let trimmed = input.trim();
    let mut pairs = NumscriptParser::parse(Rule::monetary_input, trimmed).map_err(|e| {
        literal_error(
            "monetary literal",
            trimmed,
            e,
            "Write monetary values as [ASSET AMOUNT], e.g. [USD/2 10000]",
        )
    })?;
    let monetary = pairs
        .next()
        .and_then(|input| input.into_inner().next())
        .ok_or_else(|| grammar_error("monetary_input must contain monetary"))?;
    parse_monetary_pair(monetary)
}

pub(crate) fn parse_monetary_pair(pair: Pair<Rule>) -> NumscriptResult<Monetary> {
    let mut asset = None;
    let mut amount = None;

    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::asset => {
                split_asset(inner_pair.as_str())?;
                asset = Some(inner_pair.as_str().to_string());
            }
            Rule::send_all => amount = Some(Amount::All),
            Rule::amount_digits => {
                amount = Some(Amount::Fixed(parse_integer(inner_pair.as_str())?));
            }
            _ => {}
        }
    }

    Ok(Monetary {
        asset: asset.ok_or_else(|| grammar_error("monetary missing asset"))?,
        amount: amount.ok_or_else(|| grammar_error("monetary missing amount"))?,
    })
}

pub(crate) fn parse_portion(pair: Pair<Rule>) -> NumscriptResult<Portion> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| grammar_error("portion must contain a specifier"))?;

    match inner.as_rule() {
        Rule::percentage => {
            let digits = inner.as_str().trim_end_matches('%');
            let value = Decimal::from_str(digits).map_err(|_| {
                NumscriptError::Engine(format!(
                    "Invalid percentage: '{}'\n\
                     Expected a decimal number followed by % (e.g., 2.5%)",
                    inner.as_str()
                ))
            })?;
            Ok(Portion::Percentage { value })
        }
        Rule::fraction => {
            let (numerator, denominator) = inner
                .as_str()
                .split_once('/')
                .ok_or_else(|| grammar_error("fraction without '/'"))?;
            let denominator = parse_integer(denominator)?;
            if denominator.is_zero() {
                return Err(NumscriptError::Engine(format!(
                    "Invalid fraction '{}': denominator must not be zero",
                    inner.as_str()
                )));
            }
            Ok(Portion::Fraction {
                numerator: parse_integer(numerator)?,
                denominator,
            })
        }
        Rule::remaining => Ok(Portion::Remaining),
        other => Err(grammar_error(&format!("unexpected portion rule {:?}", other))),
    }
}

pub(crate) fn parse_account_ref(pair: Pair<Rule>) -> NumscriptResult<AccountRef> {
    let inner = match pair.as_rule() {
        Rule::account_ref => pair
            .into_inner()
            .next()
            .ok_or_else(|| grammar_error("account_ref must contain address or variable"))?,
        _ => pair,
    };

    match inner.as_rule() {
        Rule::address => Ok(AccountRef::Address(inner.as_str().to_string())),
        Rule::variable => Ok(AccountRef::Variable(inner.as_str()[1..].to_string())),
        other => Err(grammar_error(&format!(
            "unexpected account reference {:?}",
            other
        ))),
    }
}

pub(crate) fn parse_string_literal(pair: Pair<Rule>) -> String {
    let content = pair.as_str();
    content[1..content.len() - 1].replace("\\\"", "\"")
}

/// Parse a digit string, allowing `_` as a separator (e.g., 1_000_000)
pub(crate) fn parse_integer(digits: &str) -> NumscriptResult<BigInt> {
    let clean = digits.replace('_', "");
    BigInt::from_str(&clean).map_err(|_| {
        NumscriptError::Engine(format!(
            "Invalid integer: '{}'\n\
             Expected digits, optionally separated by underscores (e.g., 1_000_000)",
            digits
        ))
    })
}

fn literal_error(
    what: &str,
    input: &str,
    error: pest::error::Error<Rule>,
    suggestion: &str,
) -> NumscriptError {
    let (start, end) = match error.location {
        pest::error::InputLocation::Pos(pos) => (pos, pos),
        pest::error::InputLocation::Span((start, end)) => (start, end),
    };
    NumscriptError::parse_with_suggestion(
        format!("Invalid {} '{}': {}", what, input, error.variant.message()),
        crate::ast::Span::new(input, start, end),
        SOURCE_ID,
        Arc::from(input),
        suggestion,
    )
}

use crate::ast::Span;
use crate::parser::literals::{
    parse_account_ref, parse_integer, parse_monetary_pair, parse_portion, parse_string_literal,
};
use crate::parser::{grammar_error, Rule};
use crate::semantic::*;
use crate::NumscriptResult;
use pest::iterators::Pair;

pub(crate) fn parse_send_statement(pair: Pair<Rule>, span: Span) -> NumscriptResult<SendStatement> {
    let mut monetary = None;
    let mut sources = None;
    let mut destinations = None;

    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::monetary => monetary = Some(parse_monetary_pair(inner_pair)?),
            Rule::source_clause => sources = Some(parse_source_clause(inner_pair)?),
            Rule::destination_clause => {
                destinations = Some(parse_destination_clause(inner_pair)?)
            }
            _ => {}
        }
    }

    Ok(SendStatement {
        monetary: monetary.ok_or_else(|| grammar_error("send_statement missing monetary"))?,
        sources: sources.ok_or_else(|| grammar_error("send_statement missing source"))?,
        destinations: destinations
            .ok_or_else(|| grammar_error("send_statement missing destination"))?,
        span,
    })
}

fn parse_source_clause(pair: Pair<Rule>) -> NumscriptResult<Vec<Source>> {
    let source = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::source)
        .ok_or_else(|| grammar_error("source_clause must contain source"))?;
    let inner = source
        .into_inner()
        .next()
        .ok_or_else(|| grammar_error("source must contain a list or an account"))?;

    match inner.as_rule() {
        Rule::source_list => inner
            .into_inner()
            .filter(|p| p.as_rule() == Rule::source_item)
            .map(parse_source_item)
            .collect(),
        Rule::source_account => Ok(vec![parse_source_account(inner)?]),
        other => Err(grammar_error(&format!("unexpected source rule {:?}", other))),
    }
}

fn parse_source_item(pair: Pair<Rule>) -> NumscriptResult<Source> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| grammar_error("source_item must contain a source"))?;

    match inner.as_rule() {
        Rule::capped_source => {
            let mut max = None;
            let mut source = None;
            for capped_inner in inner.into_inner() {
                match capped_inner.as_rule() {
                    Rule::monetary => max = Some(parse_monetary_pair(capped_inner)?),
                    Rule::source_account => source = Some(parse_source_account(capped_inner)?),
                    _ => {}
                }
            }
            let mut source =
                source.ok_or_else(|| grammar_error("capped_source missing account"))?;
            source.max = max;
            Ok(source)
        }
        Rule::source_account => parse_source_account(inner),
        other => Err(grammar_error(&format!(
            "unexpected source item rule {:?}",
            other
        ))),
    }
}

fn parse_source_account(pair: Pair<Rule>) -> NumscriptResult<Source> {
    let mut account = None;
    let mut overdraft = None;

    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::account_ref => account = Some(parse_account_ref(inner_pair)?),
            Rule::overdraft => overdraft = Some(parse_overdraft(inner_pair)?),
            _ => {}
        }
    }

    Ok(Source {
        account: account.ok_or_else(|| grammar_error("source_account missing account"))?,
        max: None,
        overdraft,
    })
}

fn parse_overdraft(pair: Pair<Rule>) -> NumscriptResult<Overdraft> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| grammar_error("overdraft must be bounded or unbounded"))?;

    match inner.as_rule() {
        Rule::unbounded_overdraft => Ok(Overdraft::Unbounded),
        Rule::bounded_overdraft => {
            let limit = inner
                .into_inner()
                .find(|p| p.as_rule() == Rule::monetary)
                .map(parse_monetary_pair)
                .transpose()?;
            Ok(Overdraft::Bounded { limit })
        }
        other => Err(grammar_error(&format!(
            "unexpected overdraft rule {:?}",
            other
        ))),
    }
}

fn parse_destination_clause(pair: Pair<Rule>) -> NumscriptResult<Vec<Destination>> {
    let destination = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::destination)
        .ok_or_else(|| grammar_error("destination_clause must contain destination"))?;
    let inner = destination
        .into_inner()
        .next()
        .ok_or_else(|| grammar_error("destination must contain a list or an account"))?;

    match inner.as_rule() {
        Rule::destination_list => inner
            .into_inner()
            .filter(|p| p.as_rule() == Rule::destination_item)
            .map(parse_destination_item)
            .collect(),
        Rule::account_ref => Ok(vec![Destination::account(parse_account_ref(inner)?)]),
        other => Err(grammar_error(&format!(
            "unexpected destination rule {:?}",
            other
        ))),
    }
}

fn parse_destination_item(pair: Pair<Rule>) -> NumscriptResult<Destination> {
    let mut portion = None;
    let mut target = None;

    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::portion => portion = Some(parse_portion(inner_pair)?),
            Rule::destination_target => {
                let target_inner = inner_pair
                    .into_inner()
                    .next()
                    .ok_or_else(|| grammar_error("destination_target must not be empty"))?;
                target = Some(match target_inner.as_rule() {
                    Rule::kept => DestinationTarget::Kept,
                    _ => DestinationTarget::Account(parse_account_ref(target_inner)?),
                });
            }
            _ => {}
        }
    }

    Ok(Destination {
        portion,
        target: target.ok_or_else(|| grammar_error("destination_item missing target"))?,
    })
}

pub(crate) fn parse_tx_meta_statement(
    pair: Pair<Rule>,
    span: Span,
) -> NumscriptResult<MetadataStatement> {
    let mut key = None;
    let mut value = None;

    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::string_literal => key = Some(parse_string_literal(inner_pair)),
            Rule::metadata_value => value = Some(parse_metadata_value(inner_pair)?),
            _ => {}
        }
    }

    Ok(MetadataStatement {
        scope: MetadataScope::Transaction,
        key: key.ok_or_else(|| grammar_error("set_tx_meta missing key"))?,
        value: value.ok_or_else(|| grammar_error("set_tx_meta missing value"))?,
        span,
    })
}

pub(crate) fn parse_account_meta_statement(
    pair: Pair<Rule>,
    span: Span,
) -> NumscriptResult<MetadataStatement> {
    let mut account = None;
    let mut key = None;
    let mut value = None;

    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::account_ref => account = Some(parse_account_ref(inner_pair)?),
            Rule::string_literal => key = Some(parse_string_literal(inner_pair)),
            Rule::metadata_value => value = Some(parse_metadata_value(inner_pair)?),
            _ => {}
        }
    }

    let account = account.ok_or_else(|| grammar_error("set_account_meta missing account"))?;
    Ok(MetadataStatement {
        scope: MetadataScope::Account(account),
        key: key.ok_or_else(|| grammar_error("set_account_meta missing key"))?,
        value: value.ok_or_else(|| grammar_error("set_account_meta missing value"))?,
        span,
    })
}

fn parse_metadata_value(pair: Pair<Rule>) -> NumscriptResult<MetadataValue> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| grammar_error("metadata_value must not be empty"))?;

    match inner.as_rule() {
        Rule::string_literal => Ok(MetadataValue::Text(parse_string_literal(inner))),
        Rule::monetary => Ok(MetadataValue::Monetary(parse_monetary_pair(inner)?)),
        Rule::variable => Ok(MetadataValue::Variable(inner.as_str()[1..].to_string())),
        Rule::address => Ok(MetadataValue::Account(inner.as_str().to_string())),
        Rule::number_literal => Ok(MetadataValue::Number(parse_integer(inner.as_str())?)),
        Rule::bare_word => Ok(MetadataValue::Text(inner.as_str().to_string())),
        other => Err(grammar_error(&format!(
            "unexpected metadata value rule {:?}",
            other
        ))),
    }
}

pub(crate) fn parse_vars_block(
    pair: Pair<Rule>,
    offset: usize,
    source: &str,
) -> NumscriptResult<Vec<VariableDecl>> {
    let mut variables = Vec::new();

    for decl in pair.into_inner().filter(|p| p.as_rule() == Rule::var_decl) {
        let span = Span::from_pest_span(decl.as_span(), offset, source);
        let mut var_type = None;
        let mut name = None;
        for inner_pair in decl.into_inner() {
            match inner_pair.as_rule() {
                Rule::var_type => var_type = Some(inner_pair.as_str().parse::<VariableType>()?),
                Rule::variable => name = Some(inner_pair.as_str()[1..].to_string()),
                _ => {}
            }
        }
        variables.push(VariableDecl {
            var_type: var_type.ok_or_else(|| grammar_error("var_decl missing type"))?,
            name: name.ok_or_else(|| grammar_error("var_decl missing name"))?,
            span,
        });
    }

    Ok(variables)
}

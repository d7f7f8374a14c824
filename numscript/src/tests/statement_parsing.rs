use crate::parser::parse_numscript;
use crate::semantic::*;
use num_bigint::BigInt;
use rust_decimal::Decimal;
use std::str::FromStr;

fn address(a: &str) -> AccountRef {
    AccountRef::Address(a.to_string())
}

#[test]
fn test_parse_simple_send() {
    let parsed = parse_numscript(
        r#"
send [USD/2 10000] (
  source = @world
  destination = @users:alice
)
"#,
    );

    assert!(parsed.is_complete());
    assert_eq!(parsed.sends.len(), 1);
    let send = &parsed.sends[0];
    assert_eq!(send.monetary, Monetary::new("USD/2", 10000));
    assert_eq!(send.sources, vec![Source::account(address("@world"))]);
    assert_eq!(
        send.destinations,
        vec![Destination::account(address("@users:alice"))]
    );
    assert_eq!(send.span.line, 2);
}

#[test]
fn test_parse_source_list_with_cap_and_overdraft() {
    let parsed = parse_numscript(
        r#"
send [USD/2 500] (
  source = {
    max [USD/2 200] from @users:alice
    @users:bob allowing overdraft up to [USD/2 100]
    @users:carol allowing unbounded overdraft
    @users:dave allowing overdraft
  }
  destination = @merchants:shop
)
"#,
    );

    assert!(parsed.is_complete(), "{:?}", parsed.failures);
    let sources = &parsed.sends[0].sources;
    assert_eq!(sources.len(), 4);

    assert_eq!(sources[0].max, Some(Monetary::new("USD/2", 200)));
    assert_eq!(sources[0].overdraft, None);

    assert_eq!(
        sources[1].overdraft,
        Some(Overdraft::Bounded {
            limit: Some(Monetary::new("USD/2", 100))
        })
    );
    assert_eq!(sources[2].overdraft, Some(Overdraft::Unbounded));
    assert!(sources[2].is_unbounded());
    assert_eq!(sources[3].overdraft, Some(Overdraft::Bounded { limit: None }));
    assert!(sources[3].allows_overdraft());
    assert!(!sources[3].is_unbounded());
}

#[test]
fn test_parse_destination_portions() {
    let parsed = parse_numscript(
        r#"
send [USD/2 10000] (
  source = @world
  destination = {
    2.5% to @platform:fees,
    1/3 to @partners:a
    10% kept
    remaining to @merchants:shop
  }
)
"#,
    );

    assert!(parsed.is_complete(), "{:?}", parsed.failures);
    let destinations = &parsed.sends[0].destinations;
    assert_eq!(destinations.len(), 4);

    assert_eq!(
        destinations[0].portion,
        Some(Portion::Percentage {
            value: Decimal::from_str("2.5").unwrap()
        })
    );
    assert_eq!(
        destinations[1].portion,
        Some(Portion::Fraction {
            numerator: BigInt::from(1),
            denominator: BigInt::from(3)
        })
    );
    assert!(destinations[2].is_kept());
    assert!(destinations[3].is_remaining());
    assert_eq!(
        destinations[3].target,
        DestinationTarget::Account(address("@merchants:shop"))
    );
}

#[test]
fn test_parse_bare_kept_destination() {
    let parsed = parse_numscript(
        "send [COIN 10] ( source = @world destination = { 50% to @a kept } )",
    );
    assert!(parsed.is_complete(), "{:?}", parsed.failures);
    let destinations = &parsed.sends[0].destinations;
    assert_eq!(destinations[1].portion, None);
    assert!(destinations[1].is_kept());
}

#[test]
fn test_parse_variables_block() {
    let parsed = parse_numscript(
        r#"
vars {
  monetary $amount
  account $user
  string $note
}
"#,
    );

    let declared: Vec<(VariableType, &str)> = parsed
        .variables
        .iter()
        .map(|v| (v.var_type, v.name.as_str()))
        .collect();
    assert_eq!(
        declared,
        vec![
            (VariableType::Monetary, "amount"),
            (VariableType::Account, "user"),
            (VariableType::String, "note"),
        ]
    );
    assert_eq!(parsed.variables[1].span.line, 4);
}

#[test]
fn test_parse_metadata_calls() {
    let parsed = parse_numscript(
        r#"
set_tx_meta("type", "deposit")
set_tx_meta("amount", [USD/2 100])
set_tx_meta("count", 3)
set_tx_meta("channel", web)
set_account_meta(@users:alice, "tier", "gold")
set_account_meta($user, "referrer", @users:bob)
"#,
    );

    assert!(parsed.is_complete(), "{:?}", parsed.failures);
    let values: Vec<String> = parsed.tx_metadata().map(|m| m.value.render()).collect();
    assert_eq!(values, vec!["deposit", "[USD/2 100]", "3", "web"]);

    let accounts: Vec<&MetadataStatement> = parsed.account_metadata().collect();
    assert_eq!(accounts.len(), 2);
    assert_eq!(
        accounts[0].scope,
        MetadataScope::Account(address("@users:alice"))
    );
    assert_eq!(
        accounts[1].scope,
        MetadataScope::Account(AccountRef::Variable("user".to_string()))
    );
    assert_eq!(
        accounts[1].value,
        MetadataValue::Account("@users:bob".to_string())
    );
}

#[test]
fn test_escaped_quotes_in_strings() {
    let parsed = parse_numscript(r#"set_tx_meta("note", "the \"big\" one")"#);
    assert_eq!(
        parsed.metadata[0].value,
        MetadataValue::Text("the \"big\" one".to_string())
    );
}

#[test]
fn test_broken_statement_is_skipped_and_recorded() {
    let parsed = parse_numscript(
        r#"
send [USD/2 100] (
  source = @world
  destination =
)
send [USD/2 200] (
  source = @world
  destination = @users:bob
)
"#,
    );

    assert_eq!(parsed.sends.len(), 1);
    assert_eq!(parsed.sends[0].monetary, Monetary::new("USD/2", 200));
    assert_eq!(parsed.failures.len(), 1);

    let failure = &parsed.failures[0];
    assert_eq!(failure.kind, StatementKind::Send);
    assert_eq!(failure.span.line, 2);
    assert!(failure.location.line >= 4);
    assert!(failure.to_string().starts_with("Skipped send statement at line"));
}

#[test]
fn test_unterminated_statement_is_recorded() {
    let parsed = parse_numscript("set_tx_meta(\"type\", \"deposit\"");
    assert!(parsed.metadata.is_empty());
    assert_eq!(parsed.failures.len(), 1);
    assert!(parsed.failures[0].message.contains("unterminated"));
}

#[test]
fn test_zero_denominator_is_a_failure() {
    let parsed = parse_numscript(
        "send [COIN 10] ( source = @world destination = { 1/0 to @a remaining to @b } )",
    );
    assert!(parsed.sends.is_empty());
    assert_eq!(parsed.failures.len(), 1);
    assert!(parsed.failures[0].message.contains("denominator"));
}

#[test]
fn test_empty_script_parses_to_nothing() {
    let parsed = parse_numscript("");
    assert_eq!(parsed, ParsedScript::default());
}

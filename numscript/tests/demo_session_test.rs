use num_bigint::BigInt;
use numscript::{DemoConfig, DemoSession, QueryResult, SessionRegistry};

const PAYROLL: &str = r##"{
    "name": "Payroll",
    "description": "A company funds payroll and pays two employees",
    "accounts": [
        { "address": "@company:treasury", "name": "Treasury" },
        { "address": "@employees:ana", "name": "Ana" },
        { "address": "@employees:raj", "name": "Raj" }
    ],
    "variables": {
        "PAYROLL": 500000,
        "treasury": "company:treasury"
    },
    "transactionSteps": [
        {
            "label": "Fund treasury",
            "numscript": "send [EUR/2 {PAYROLL}] ( source = @world destination = @company:treasury )"
        },
        {
            "label": "Pay salaries",
            "numscript": "vars { account $treasury }\nsend [EUR/2 300000] ( source = $treasury destination = { 60% to @employees:ana remaining to @employees:raj } )\nset_tx_meta(\"batch\", \"2026-10\")"
        }
    ],
    "usefulQueries": [
        { "title": "Employees", "type": "balance", "addressPattern": "employees:" },
        { "title": "Batch", "type": "transactions", "metadata": { "batch": "2026-10" } }
    ]
}"##;

#[test]
fn test_payroll_demo_end_to_end() {
    let config = DemoConfig::from_json(PAYROLL).unwrap();
    let mut session = DemoSession::new(config).unwrap();

    let runs = session.run_all_steps().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[1].label, "Pay salaries");

    let ledger = session.ledger();
    assert_eq!(ledger.get_balance("@company:treasury", "EUR/2"), BigInt::from(200000));
    assert_eq!(ledger.get_balance("@employees:ana", "EUR/2"), BigInt::from(180000));
    assert_eq!(ledger.get_balance("@employees:raj", "EUR/2"), BigInt::from(120000));

    let results = session.run_useful_queries();
    assert_eq!(results[0].0.title.as_deref(), Some("Employees"));
    assert_eq!(results[0].1.as_ref().map(QueryResult::len).ok(), Some(2));
    match &results[1].1 {
        Ok(QueryResult::Transactions(rows)) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].id, 2);
        }
        other => panic!("expected transactions, got {:?}", other),
    }
}

#[test]
fn test_query_results_serialize_with_type_tag() {
    let config = DemoConfig::from_json(PAYROLL).unwrap();
    let mut session = DemoSession::new(config).unwrap();
    session.run_all_steps().unwrap();

    let results = session.run_useful_queries();
    let json = serde_json::to_value(results[0].1.as_ref().unwrap()).unwrap();
    assert_eq!(json["type"], "balances");
    assert_eq!(json["rows"][0]["address"], "@employees:ana");
    assert_eq!(json["rows"][0]["balance"], "180000");
}

#[test]
fn test_registry_runs_demos_independently() {
    let mut registry = SessionRegistry::new();
    let config = DemoConfig::from_json(PAYROLL).unwrap();

    registry.switch_to("payroll-a", config.clone()).unwrap();
    registry.switch_to("payroll-b", config).unwrap();

    registry
        .get_mut("payroll-a")
        .unwrap()
        .run_all_steps()
        .unwrap();

    let a = registry.get("payroll-a").unwrap();
    let b = registry.get("payroll-b").unwrap();
    assert!(a.is_finished());
    assert_eq!(b.cursor(), 0);
    assert_eq!(b.ledger().get_transaction_count(), 0);
    assert_eq!(registry.active(), Some("payroll-b"));

    let mut ids: Vec<&str> = registry.ids().collect();
    ids.sort();
    assert_eq!(ids, vec!["payroll-a", "payroll-b"]);
}

use numscript::{
    parse_metadata_from_numscript, parse_postings_from_numscript, Executor, Ledger,
    TransactionFilter, Variables,
};
use num_bigint::BigInt;

fn usd(ledger: &Ledger, address: &str) -> BigInt {
    ledger.get_balance(address, "USD/2")
}

#[test]
fn test_marketplace_order_with_fees() {
    let mut ledger = Ledger::new();
    let executor = Executor::new();

    executor
        .execute(
            "send [USD/2 20000] ( source = @world destination = @customers:1234 )",
            &Variables::new(),
            &mut ledger,
        )
        .unwrap();

    let tx = executor
        .execute(
            r#"
            send [USD/2 15000] (
                source = @customers:1234
                destination = {
                    3% to @platform:fees
                    remaining to @merchants:42
                }
            )
            set_tx_meta("order", "ORD-1")
            set_account_meta(@merchants:42, "category", "books")
            "#,
            &Variables::new(),
            &mut ledger,
        )
        .unwrap();

    assert_eq!(tx.id, 2);
    assert_eq!(usd(&ledger, "@customers:1234"), BigInt::from(5000));
    assert_eq!(usd(&ledger, "@platform:fees"), BigInt::from(450));
    assert_eq!(usd(&ledger, "@merchants:42"), BigInt::from(14550));
    assert_eq!(
        ledger.get_account_metadata("@merchants:42", "category"),
        Some("books")
    );

    let orders = ledger.list_transactions(&TransactionFilter::new().with_metadata("order", "ORD-1"));
    assert_eq!(orders.len(), 1);
    let merchant_txs = ledger.list_transactions(&TransactionFilter::new().with_account("merchants:"));
    assert_eq!(merchant_txs.len(), 1);
}

#[test]
fn test_currency_exchange_through_desk() {
    let mut ledger = Ledger::new();
    let executor = Executor::new();

    executor
        .execute(
            "send [USD/2 10000] ( source = @world destination = @users:alice )
             send [EUR/2 50000] ( source = @world destination = @fx:desk )",
            &Variables::new(),
            &mut ledger,
        )
        .unwrap();

    let variables = Variables::new()
        .with("USD_AMOUNT", 10000)
        .with("EUR_AMOUNT", 9200)
        .with("user", "users:alice");
    executor
        .execute(
            r#"
            vars {
                account $user
            }
            send [USD/2 {USD_AMOUNT}] ( source = $user destination = @fx:desk )
            send [EUR/2 {EUR_AMOUNT}] ( source = @fx:desk destination = $user )
            set_tx_meta("rate", "0.92")
            "#,
            &variables,
            &mut ledger,
        )
        .unwrap();

    assert_eq!(usd(&ledger, "@users:alice"), BigInt::from(0));
    assert_eq!(ledger.get_balance("@users:alice", "EUR/2"), BigInt::from(9200));
    assert_eq!(usd(&ledger, "@fx:desk"), BigInt::from(10000));
    assert_eq!(ledger.get_balance("@fx:desk", "EUR/2"), BigInt::from(40800));
}

#[test]
fn test_wallet_waterfall_with_credit_fallback() {
    let mut ledger = Ledger::new();
    let executor = Executor::new();

    executor
        .execute(
            "send [USD/2 1000] ( source = @world destination = @users:bob:gift )
             send [USD/2 2000] ( source = @world destination = @users:bob:main )",
            &Variables::new(),
            &mut ledger,
        )
        .unwrap();

    executor
        .execute(
            "send [USD/2 5000] (
                source = {
                    @users:bob:gift
                    @users:bob:main
                    @users:bob:credit allowing unbounded overdraft
                }
                destination = @shops:hardware
            )",
            &Variables::new(),
            &mut ledger,
        )
        .unwrap();

    assert_eq!(usd(&ledger, "@users:bob:gift"), BigInt::from(0));
    assert_eq!(usd(&ledger, "@users:bob:main"), BigInt::from(0));
    assert_eq!(usd(&ledger, "@users:bob:credit"), BigInt::from(-2000));

    let wallets = ledger.get_aggregated_balances(&["users:bob:"]);
    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].balance, BigInt::from(-2000));

    let available = ledger.get_balances("users::gift");
    assert!(available.is_empty());
}

#[test]
fn test_scanning_matches_executed_flows() {
    let script = r#"
        send [USD/2 100] ( source = @world destination = @users:alice )
        set_tx_meta("kind", "deposit")
        set_account_meta(@users:alice, "tier", "gold")
    "#;

    let scanned = parse_postings_from_numscript(script);
    assert_eq!(scanned.len(), 1);
    assert_eq!(scanned[0].amount, "[USD/2 100]");
    assert_eq!(scanned[0].source, "world");
    assert_eq!(scanned[0].destination, "users:alice");

    let keys = parse_metadata_from_numscript(script);
    assert_eq!(keys.tx, vec!["kind".to_string()]);
    assert_eq!(keys.account, vec!["tier".to_string()]);

    let mut ledger = Ledger::new();
    let tx = Executor::new()
        .execute(script, &Variables::new(), &mut ledger)
        .unwrap();
    assert_eq!(tx.postings[0].destination, "@users:alice");
}

#[test]
fn test_huge_amounts_do_not_overflow() {
    let mut ledger = Ledger::new();
    Executor::new()
        .execute(
            "send [WEI 1000000000000000000000000000000] ( source = @world destination = @vault )",
            &Variables::new(),
            &mut ledger,
        )
        .unwrap();

    let expected: BigInt = "1000000000000000000000000000000".parse().unwrap();
    assert_eq!(ledger.get_balance("@vault", "WEI"), expected);
    assert_eq!(ledger.get_balance("@world", "WEI"), -expected);
}

#[test]
fn test_transaction_serializes_amounts_as_strings() {
    let mut ledger = Ledger::new();
    let tx = Executor::new()
        .execute(
            r#"send [USD/2 100] ( source = @world destination = @alice )
            set_tx_meta("kind", "deposit")"#,
            &Variables::new(),
            &mut ledger,
        )
        .unwrap();

    let json = serde_json::to_value(&tx).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["postings"][0]["amount"], "100");
    assert_eq!(json["postings"][0]["source"], "@world");
    assert_eq!(json["metadata"]["kind"], "deposit");
}

use numscript::{Executor, Ledger, NumscriptError, ResourceLimits, Variables};

fn deposit(n: usize) -> String {
    "send [USD/2 1] ( source = @world destination = @users:alice )\n".repeat(n)
}

#[test]
fn test_script_size_limit() {
    let limits = ResourceLimits {
        max_script_bytes: 100,
        ..ResourceLimits::default()
    };
    let executor = Executor::with_limits(limits);
    let mut ledger = Ledger::new();

    let result = executor.execute(&deposit(3), &Variables::new(), &mut ledger);

    match result {
        Err(NumscriptError::ResourceLimitExceeded {
            limit_name,
            limit_value,
            ..
        }) => {
            assert_eq!(limit_name, "max_script_bytes");
            assert_eq!(limit_value, "100");
        }
        _ => panic!("Expected ResourceLimitExceeded error"),
    }
    assert_eq!(ledger.get_transaction_count(), 0);
}

#[test]
fn test_script_just_under_size_limit() {
    let limits = ResourceLimits {
        max_script_bytes: 1000,
        ..ResourceLimits::default()
    };
    let executor = Executor::with_limits(limits);
    let mut ledger = Ledger::new();

    let result = executor.execute(&deposit(1), &Variables::new(), &mut ledger);
    assert!(result.is_ok(), "Small script should be accepted");
}

#[test]
fn test_send_statement_limit() {
    let limits = ResourceLimits {
        max_send_statements: 3,
        ..ResourceLimits::default()
    };
    let executor = Executor::with_limits(limits);
    let mut ledger = Ledger::new();

    assert!(executor
        .execute(&deposit(3), &Variables::new(), &mut ledger)
        .is_ok());

    match executor.execute(&deposit(4), &Variables::new(), &mut ledger) {
        Err(NumscriptError::ResourceLimitExceeded {
            limit_name,
            actual_value,
            ..
        }) => {
            assert_eq!(limit_name, "max_send_statements");
            assert_eq!(actual_value, "4");
        }
        _ => panic!("Expected ResourceLimitExceeded error"),
    }
}

#[test]
fn test_posting_limit() {
    let limits = ResourceLimits {
        max_postings: 3,
        ..ResourceLimits::default()
    };
    let executor = Executor::with_limits(limits);
    let mut ledger = Ledger::new();

    let script = "send [COIN 100] (
        source = @world
        destination = { 25% to @a 25% to @b 25% to @c remaining to @d }
    )";
    match executor.execute(script, &Variables::new(), &mut ledger) {
        Err(NumscriptError::ResourceLimitExceeded { limit_name, .. }) => {
            assert_eq!(limit_name, "max_postings");
        }
        _ => panic!("Expected ResourceLimitExceeded error"),
    }
}

#[test]
fn test_validate_reports_size_limit_only() {
    let limits = ResourceLimits {
        max_script_bytes: 10,
        ..ResourceLimits::default()
    };
    let validation = Executor::with_limits(limits).validate(&deposit(2));

    assert!(!validation.valid);
    assert_eq!(validation.errors.len(), 1);
    assert!(validation.errors[0].contains("max_script_bytes"));
}

#[test]
fn test_default_limits() {
    let limits = ResourceLimits::default();
    assert_eq!(limits.max_script_bytes, 1024 * 1024);
    assert_eq!(limits.max_send_statements, 256);
    assert_eq!(limits.max_postings, 4096);
}

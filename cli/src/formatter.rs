use chrono::SecondsFormat;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Row, Table};
use numscript::ledger::{AggregatedBalance, BalanceEntry};
use numscript::{
    format_amount, Account, DemoConfig, MetadataKeys, NumscriptResult, QueryResult,
    ScannedPosting, StepRun, Transaction, UsefulQuery, Validation,
};

pub struct Formatter {}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {}
    }

    fn table(&self, header: &[&str]) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(
            header
                .iter()
                .map(|title| Cell::new(title).set_alignment(CellAlignment::Left))
                .collect::<Vec<_>>(),
        ));
        table
    }

    pub fn format_transaction(&self, transaction: &Transaction) -> String {
        let mut output = format!(
            "Transaction #{} ({})\n",
            transaction.id,
            transaction
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Secs, true)
        );

        let mut postings = self.table(&["Source", "Destination", "Amount"]);
        for posting in &transaction.postings {
            postings.add_row(Row::from(vec![
                Cell::new(&posting.source),
                Cell::new(&posting.destination),
                Cell::new(format_amount(&posting.amount, &posting.asset))
                    .set_alignment(CellAlignment::Right),
            ]));
        }
        output.push_str(&postings.to_string());
        output.push('\n');

        if !transaction.metadata.is_empty() {
            let mut metadata = self.table(&["Metadata", "Value"]);
            for (key, value) in &transaction.metadata {
                metadata.add_row(Row::from(vec![key, value]));
            }
            output.push_str(&metadata.to_string());
            output.push('\n');
        }

        output
    }

    pub fn format_balances(&self, balances: &[BalanceEntry]) -> String {
        if balances.is_empty() {
            return "No balances\n".to_string();
        }

        let mut table = self.table(&["Account", "Asset", "Balance"]);
        for entry in balances {
            table.add_row(Row::from(vec![
                Cell::new(&entry.address),
                Cell::new(&entry.asset),
                Cell::new(format_amount(&entry.balance, &entry.asset))
                    .set_alignment(CellAlignment::Right),
            ]));
        }
        format!("{}\n", table)
    }

    fn format_aggregated(&self, balances: &[AggregatedBalance]) -> String {
        let mut table = self.table(&["Asset", "Total", "Accounts"]);
        for entry in balances {
            table.add_row(Row::from(vec![
                Cell::new(&entry.asset),
                Cell::new(format_amount(&entry.balance, &entry.asset))
                    .set_alignment(CellAlignment::Right),
                Cell::new(entry.accounts.join("\n")),
            ]));
        }
        format!("{}\n", table)
    }

    fn format_accounts(&self, accounts: &[Account]) -> String {
        let mut table = self.table(&["Account", "Metadata"]);
        for account in accounts {
            let metadata = account
                .metadata
                .iter()
                .map(|(key, value)| format!("{}: {}", key, value))
                .collect::<Vec<_>>()
                .join("\n");
            table.add_row(Row::from(vec![account.address.clone(), metadata]));
        }
        format!("{}\n", table)
    }

    pub fn format_validation(&self, name: &str, validation: &Validation) -> String {
        if validation.valid {
            return format!("✓ {}\n", name);
        }
        let mut output = format!("✗ {}\n", name);
        for error in &validation.errors {
            output.push_str(&format!("  - {}\n", error));
        }
        output
    }

    pub fn format_scan(&self, postings: &[ScannedPosting], metadata: &MetadataKeys) -> String {
        let mut output = String::new();

        if postings.is_empty() {
            output.push_str("No postings found\n");
        } else {
            let mut table = self.table(&["Source", "Destination", "Amount"]);
            for posting in postings {
                table.add_row(Row::from(vec![
                    &posting.source,
                    &posting.destination,
                    &posting.amount,
                ]));
            }
            output.push_str(&format!("{}\n", table));
        }

        if !metadata.tx.is_empty() {
            output.push_str(&format!("Transaction metadata: {}\n", metadata.tx.join(", ")));
        }
        if !metadata.account.is_empty() {
            output.push_str(&format!("Account metadata: {}\n", metadata.account.join(", ")));
        }
        output
    }

    pub fn format_demo_header(&self, config: &DemoConfig) -> String {
        let mut output = format!("Demo: {}\n", config.name);
        if !config.description.is_empty() {
            output.push_str(&format!("{}\n", config.description));
        }
        output.push('\n');
        output
    }

    pub fn format_step(&self, run: &StepRun) -> String {
        format!(
            "Step {}: {}\n{}",
            run.index + 1,
            run.label,
            self.format_transaction(&run.transaction)
        )
    }

    pub fn format_query(
        &self,
        useful: &UsefulQuery,
        result: &NumscriptResult<QueryResult>,
    ) -> String {
        let title = useful.title.as_deref().unwrap_or("Query");
        let mut output = format!("{}\n", title);
        if let Some(description) = &useful.description {
            output.push_str(&format!("{}\n", description));
        }

        let body = match result {
            Err(e) => format!("Error: {}\n", e),
            Ok(rows) if rows.is_empty() => "No results\n".to_string(),
            Ok(QueryResult::Balances(rows)) => self.format_balances(rows),
            Ok(QueryResult::Aggregated(rows)) => self.format_aggregated(rows),
            Ok(QueryResult::Transactions(rows)) => rows
                .iter()
                .map(|tx| self.format_transaction(tx))
                .collect::<String>(),
            Ok(QueryResult::Accounts(rows)) => self.format_accounts(rows),
        };
        output.push_str(&body);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use num_bigint::BigInt;
    use numscript::{Executor, Ledger, Posting, Variables};

    fn sample_transaction() -> (Ledger, Transaction) {
        let mut ledger = Ledger::new();
        let tx = Executor::new()
            .execute(
                r#"send [USD/2 10000] ( source = @world destination = { 10% to @fees remaining to @shop } )
                set_tx_meta("order", "ORD-7")"#,
                &Variables::new(),
                &mut ledger,
            )
            .unwrap();
        (ledger, tx)
    }

    #[test]
    fn test_transaction_table() {
        let (_, tx) = sample_transaction();
        let output = Formatter::new().format_transaction(&tx);

        assert!(output.starts_with("Transaction #1"));
        assert!(output.contains("@fees"));
        assert!(output.contains("$10.00"));
        assert!(output.contains("$90.00"));
        assert!(output.contains("ORD-7"));
    }

    #[test]
    fn test_transaction_header_uses_rfc3339_seconds() {
        let tx = Transaction {
            id: 42,
            postings: vec![Posting::new(
                "@world",
                "@users:alice",
                "USD/2",
                BigInt::from(500),
            )],
            metadata: Default::default(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap(),
        };
        let output = Formatter::new().format_transaction(&tx);

        assert!(output.starts_with("Transaction #42 (2026-03-09T14:05:07Z)\n"));
        assert!(output.contains("$5.00"));
    }

    #[test]
    fn test_balances_table() {
        let (ledger, _) = sample_transaction();
        let output = Formatter::new().format_balances(&ledger.get_all_balances());

        assert!(output.contains("@world"));
        assert!(output.contains("-$100.00"));
        assert!(output.contains("@shop"));
        assert_eq!(Formatter::new().format_balances(&[]), "No balances\n");
    }

    #[test]
    fn test_validation_lines() {
        let formatter = Formatter::new();
        let ok = Validation {
            valid: true,
            errors: vec![],
        };
        assert_eq!(formatter.format_validation("a.num", &ok), "✓ a.num\n");

        let bad = Validation {
            valid: false,
            errors: vec!["No send statements found".to_string()],
        };
        assert_eq!(
            formatter.format_validation("b.num", &bad),
            "✗ b.num\n  - No send statements found\n"
        );
    }

    #[test]
    fn test_scan_output() {
        let script = r#"send [USD/2 5] ( source = @a destination = @b )
        set_tx_meta("kind", "x")"#;
        let output = Formatter::new().format_scan(
            &numscript::parse_postings_from_numscript(script),
            &numscript::parse_metadata_from_numscript(script),
        );
        assert!(output.contains("[USD/2 5]"));
        assert!(output.contains("Transaction metadata: kind"));
        assert!(!output.contains("Account metadata"));
    }
}

use crate::executor::{Executor, Variables};
use crate::ledger::{Ledger, TransactionFilter};
use crate::parser::{parse_metadata_from_numscript, parse_postings_from_numscript};
use crate::NumscriptError;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmLedger {
    ledger: Ledger,
    executor: Executor,
}

impl Default for WasmLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmLedger {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook::set_once();

        WasmLedger {
            ledger: Ledger::new(),
            executor: Executor::new(),
        }
    }

    /// Execute a script; `variables_json` is a JSON object or empty
    #[wasm_bindgen(js_name = execute)]
    pub fn execute(&mut self, script: &str, variables_json: &str) -> String {
        let variables = if variables_json.trim().is_empty() {
            Variables::new()
        } else {
            let json: serde_json::Value = match serde_json::from_str(variables_json) {
                Ok(v) => v,
                Err(e) => {
                    return failure(&format!("Invalid variables JSON: {}", e));
                }
            };
            match Variables::from_json(&json) {
                Ok(variables) => variables,
                Err(e) => return failure(&format_error(&e)),
            }
        };

        match self.executor.execute(script, &variables, &mut self.ledger) {
            Ok(transaction) => respond(serde_json::json!({
                "success": true,
                "transaction": transaction,
                "error": serde_json::Value::Null
            })),
            Err(e) => failure(&format_error(&e)),
        }
    }

    #[wasm_bindgen(js_name = validate)]
    pub fn validate(&self, script: &str) -> String {
        respond(serde_json::json!(self.executor.validate(script)))
    }

    #[wasm_bindgen(js_name = getBalances)]
    pub fn get_balances(&self, pattern: &str) -> String {
        respond(serde_json::json!({
            "success": true,
            "balances": self.ledger.get_balances(pattern),
            "error": serde_json::Value::Null
        }))
    }

    #[wasm_bindgen(js_name = listTransactions)]
    pub fn list_transactions(&self, account_pattern: &str) -> String {
        let filter = if account_pattern.is_empty() {
            TransactionFilter::new()
        } else {
            TransactionFilter::new().with_account(account_pattern)
        };
        respond(serde_json::json!({
            "success": true,
            "transactions": self.ledger.list_transactions(&filter),
            "error": serde_json::Value::Null
        }))
    }

    #[wasm_bindgen(js_name = reset)]
    pub fn reset(&mut self) {
        self.ledger.reset();
    }

    #[wasm_bindgen(js_name = scan)]
    pub fn scan(&self, script: &str) -> String {
        respond(serde_json::json!({
            "success": true,
            "postings": parse_postings_from_numscript(script),
            "metadata": parse_metadata_from_numscript(script),
            "error": serde_json::Value::Null
        }))
    }
}

fn respond(value: serde_json::Value) -> String {
    serde_json::to_string(&value)
        .unwrap_or_else(|_| r#"{"success":false,"error":"Failed to serialize response"}"#.to_string())
}

fn failure(message: &str) -> String {
    respond(serde_json::json!({
        "success": false,
        "error": message
    }))
}

fn format_error(error: &NumscriptError) -> String {
    match error {
        NumscriptError::Parse(details) => format!("Parse Error: {}", details.message),
        NumscriptError::InsufficientFunds { .. } => format!("Insufficient Funds: {}", error),
        NumscriptError::Unsupported(msg) => format!("Unsupported: {}", msg),
        NumscriptError::Execution(msg) => format!("Execution Error: {}", msg),
        NumscriptError::InvalidPosting(msg) => format!("Invalid Posting: {}", msg),
        NumscriptError::ResourceLimitExceeded { .. } => error.to_string(),
        NumscriptError::Engine(msg) => format!("Engine Error: {}", msg),
    }
}

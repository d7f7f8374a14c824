//! Demo sessions: one ledger per demo, stepped through its transactions
//!
//! `SessionRegistry` keeps every open session by demo id, so several demos
//! can be explored side by side without sharing balances.

use crate::demo::{run_query, DemoConfig, QueryResult, UsefulQuery};
use crate::executor::{Executor, Variables};
use crate::ledger::{Ledger, Transaction};
use crate::NumscriptResult;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// A step that ran and committed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRun {
    /// Zero-based step index
    pub index: usize,
    pub label: String,
    pub transaction: Transaction,
}

#[derive(Debug, Clone)]
pub struct DemoSession {
    config: DemoConfig,
    variables: Variables,
    ledger: Ledger,
    executor: Executor,
    cursor: usize,
}

impl DemoSession {
    pub fn new(config: DemoConfig) -> NumscriptResult<Self> {
        Self::with_executor(config, Executor::new())
    }

    pub fn with_executor(config: DemoConfig, executor: Executor) -> NumscriptResult<Self> {
        let variables = config.variables()?;
        Ok(Self {
            config,
            variables,
            ledger: Ledger::new(),
            executor,
            cursor: 0,
        })
    }

    fn blank(name: &str) -> Self {
        Self {
            config: DemoConfig::empty(name),
            variables: Variables::new(),
            ledger: Ledger::new(),
            executor: Executor::new(),
            cursor: 0,
        }
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Index of the next step to run
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.config.transaction_steps.len()
    }

    /// Run the step under the cursor
    ///
    /// Returns `None` once every step has run. A failing step leaves the
    /// cursor where it was.
    pub fn run_next_step(&mut self) -> NumscriptResult<Option<StepRun>> {
        let Some(step) = self.config.transaction_steps.get(self.cursor) else {
            return Ok(None);
        };

        let transaction = self
            .executor
            .execute(&step.numscript, &self.variables, &mut self.ledger)?;
        let run = StepRun {
            index: self.cursor,
            label: step.label.clone(),
            transaction,
        };
        debug!(
            demo = %self.config.name,
            step = run.index,
            label = %run.label,
            "ran demo step"
        );

        self.cursor += 1;
        Ok(Some(run))
    }

    /// Run every remaining step, stopping at the first failure
    pub fn run_all_steps(&mut self) -> NumscriptResult<Vec<StepRun>> {
        let mut runs = Vec::new();
        while let Some(run) = self.run_next_step()? {
            runs.push(run);
        }
        Ok(runs)
    }

    /// Execute an ad hoc script with the demo variables, `extra` taking
    /// precedence
    pub fn execute(&mut self, script: &str, extra: Variables) -> NumscriptResult<Transaction> {
        let mut variables = self.variables.clone();
        variables.extend(extra);
        self.executor.execute(script, &variables, &mut self.ledger)
    }

    /// Run every useful query of the configuration
    pub fn run_useful_queries(&self) -> Vec<(&UsefulQuery, NumscriptResult<QueryResult>)> {
        self.config
            .useful_queries
            .iter()
            .map(|useful| (useful, run_query(&self.ledger, &useful.query)))
            .collect()
    }

    /// Fresh ledger and cursor back at the first step
    pub fn reset(&mut self) {
        self.ledger.reset();
        self.cursor = 0;
    }
}

/// Open demo sessions by demo id
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, DemoSession>,
    active: Option<String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session for `id`, opened with an empty configuration if missing
    pub fn get_or_create(&mut self, id: &str) -> &mut DemoSession {
        self.active = Some(id.to_string());
        self.sessions.entry(id.to_string()).or_insert_with(|| {
            debug!(demo = id, "opened demo session");
            DemoSession::blank(id)
        })
    }

    /// Start `id` over with `config`, dropping any session it had
    pub fn switch_to(&mut self, id: &str, config: DemoConfig) -> NumscriptResult<&mut DemoSession> {
        let session = DemoSession::new(config)?;
        debug!(demo = id, "switched demo session");
        self.active = Some(id.to_string());
        Ok(match self.sessions.entry(id.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(session);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(session),
        })
    }

    pub fn get(&self, id: &str) -> Option<&DemoSession> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut DemoSession> {
        self.sessions.get_mut(id)
    }

    /// Id of the session most recently opened or switched to
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn remove(&mut self, id: &str) -> Option<DemoSession> {
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        self.sessions.remove(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }
}

//! Permissive scan for visualization
//!
//! Pure regular-expression extraction. Nothing here validates structure, so a
//! script that `parse_numscript` rejects can still be drawn.

use crate::semantic::strip_sigil;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// One source to destination flow found by the scan, sigils stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedPosting {
    /// Monetary literal as written, e.g. `[USD/2 100]`
    pub amount: String,
    pub source: String,
    pub destination: String,
}

/// Metadata keys by call kind, in call order with duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataKeys {
    pub tx: Vec<String>,
    pub account: Vec<String>,
}

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn send_regex() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(
        &CELL,
        r"(?s)send\s*\[([^\]]*)\]\s*\((.*?)source\s*=(.*?)destination\s*=(.*?)\)",
    )
}

fn loose_send_regex() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(
        &CELL,
        r"(?s)\[([^\]]*)\].*?source\s*[=:]?\s*@?([\w:$-]+).*?destination\s*[=:]?\s*@?([\w:$-]+)",
    )
}

fn account_regex() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&CELL, r"@[\w:$-]+")
}

fn tx_meta_regex() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&CELL, r#"set_tx_meta\s*\(\s*"([^"]*)""#)
}

fn account_meta_regex() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&CELL, r#"set_account_meta\s*\(\s*[^,()]*,\s*"([^"]*)""#)
}

/// Extract every source to destination flow of every send
///
/// Each send contributes one entry per (source, destination) pair. When the
/// structured pattern finds nothing, a looser one picks up the first source
/// and destination after each bracketed amount.
pub fn parse_postings_from_numscript(script: &str) -> Vec<ScannedPosting> {
    let (Some(send), Some(accounts)) = (send_regex(), account_regex()) else {
        return Vec::new();
    };

    let mut postings = Vec::new();
    for caps in send.captures_iter(script) {
        let amount = format!("[{}]", caps[1].trim());
        let sources: Vec<&str> = accounts.find_iter(&caps[3]).map(|m| m.as_str()).collect();
        let destinations: Vec<&str> = accounts.find_iter(&caps[4]).map(|m| m.as_str()).collect();
        for source in &sources {
            for destination in &destinations {
                postings.push(ScannedPosting {
                    amount: amount.clone(),
                    source: strip_sigil(source).to_string(),
                    destination: strip_sigil(destination).to_string(),
                });
            }
        }
    }

    if postings.is_empty() {
        if let Some(loose) = loose_send_regex() {
            postings = loose
                .captures_iter(script)
                .map(|caps| ScannedPosting {
                    amount: format!("[{}]", caps[1].trim()),
                    source: caps[2].to_string(),
                    destination: caps[3].to_string(),
                })
                .collect();
        }
    }

    postings
}

/// Extract the keys of `set_tx_meta` and `set_account_meta` calls
pub fn parse_metadata_from_numscript(script: &str) -> MetadataKeys {
    let keys = |regex: Option<&'static Regex>| -> Vec<String> {
        regex
            .map(|r| r.captures_iter(script).map(|c| c[1].to_string()).collect())
            .unwrap_or_default()
    };

    MetadataKeys {
        tx: keys(tx_meta_regex()),
        account: keys(account_meta_regex()),
    }
}

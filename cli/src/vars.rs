use anyhow::{bail, Context, Result};
use numscript::{VariableValue, Variables};
use std::fs;
use std::path::Path;

/// Bindings from an optional JSON file, then `--var` pairs on top
pub fn collect(pairs: &[String], file: Option<&Path>) -> Result<Variables> {
    let mut variables = match file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            let json: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;
            Variables::from_json(&json)?
        }
        None => Variables::new(),
    };

    for pair in pairs {
        let (name, value) = parse_assignment(pair)?;
        variables.insert(&name, value);
    }
    Ok(variables)
}

/// Parse `name=value`; the value is typed by `VariableValue::from_str`
pub fn parse_assignment(pair: &str) -> Result<(String, VariableValue)> {
    let Some((name, value)) = pair.split_once('=') else {
        bail!("Invalid variable '{}': expected name=value", pair);
    };
    let name = name.trim().trim_start_matches('$');
    if name.is_empty() {
        bail!("Invalid variable '{}': missing name", pair);
    }
    let value: VariableValue = value.trim().parse()?;
    Ok((name.to_string(), value))
}

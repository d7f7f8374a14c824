mod error_formatter;
mod formatter;
mod server;
mod vars;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formatter::Formatter;
use numscript::{
    parse_metadata_from_numscript, parse_numscript_strict, parse_postings_from_numscript,
    DemoConfig, DemoSession, Executor, Ledger,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// File extension of Numscript sources picked up by `check`
const SCRIPT_EXTENSION: &str = "num";

#[derive(Parser)]
#[command(name = "numscript")]
#[command(about = "Double-entry transaction scripts over an in-memory ledger.")]
#[command(
    long_about = "Numscript describes money movements between accounts.\nThe CLI executes scripts against a fresh ledger, validates and scans them, replays demo configurations, or serves demo sessions over HTTP."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a script against a fresh ledger
    ///
    /// Prints the committed transaction and every resulting balance.
    /// Variables are given as name=value pairs or read from a JSON file.
    Run {
        /// Numscript file to execute
        file: PathBuf,
        /// Variable binding (format: name=value)
        ///
        /// Examples: AMOUNT=2500, dest=users:bob, fee=[USD/2 250]
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,
        /// JSON object of variable bindings; --var entries take precedence
        #[arg(long)]
        vars_file: Option<PathBuf>,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Validate one script or every .num file under a directory
    ///
    /// Exits with status 1 when any script has problems.
    Check {
        /// File or directory to validate
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// List the flows and metadata keys of a script without executing it
    ///
    /// Works on scripts that do not parse, for drawing diagrams.
    Scan {
        /// Numscript file to scan
        file: PathBuf,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Run every step of a demo configuration, then its useful queries
    Demo {
        /// Demo configuration (JSON)
        config: PathBuf,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Start HTTP REST API server (default: localhost:3000)
    ///
    /// Serves demo sessions keyed by id, each with its own ledger.
    /// API: POST /sessions/:id/execute with {script, variables}
    Server {
        /// Host address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port number to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Commands::Server { .. } => "numscript=info,tower_http=info",
        _ => "numscript=warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Run {
            file,
            vars,
            vars_file,
            json,
        } => run_command(file, vars, vars_file.as_deref(), *json),
        Commands::Check { path } => check_command(path),
        Commands::Scan { file, json } => scan_command(file, *json),
        Commands::Demo { config, json } => demo_command(config, *json),
        Commands::Server { host, port } => server_command(host, *port),
    };

    if let Err(e) = result {
        // Render engine errors with source context, everything else plainly
        if let Some(numscript_err) = e.downcast_ref::<numscript::NumscriptError>() {
            eprintln!("{}", error_formatter::format_error(numscript_err));
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn read_script(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("Cannot read {}", file.display()))
}

fn run_command(file: &Path, vars: &[String], vars_file: Option<&Path>, json: bool) -> Result<()> {
    let script = read_script(file)?;
    let variables = vars::collect(vars, vars_file)?;

    let mut ledger = Ledger::new();
    let transaction = Executor::new().execute(&script, &variables, &mut ledger)?;

    if json {
        let output = serde_json::json!({
            "transaction": transaction,
            "balances": ledger.get_all_balances(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let formatter = Formatter::default();
        print!("{}", formatter.format_transaction(&transaction));
        print!("{}", formatter.format_balances(&ledger.get_all_balances()));
    }

    Ok(())
}

fn check_command(path: &Path) -> Result<()> {
    let files = script_files(path)?;
    if files.is_empty() {
        anyhow::bail!("No .{} files found under {}", SCRIPT_EXTENSION, path.display());
    }

    let executor = Executor::new();
    let formatter = Formatter::default();
    let mut invalid = 0;

    for file in &files {
        let script = read_script(file)?;
        let validation = executor.validate(&script);
        print!(
            "{}",
            formatter.format_validation(&file.display().to_string(), &validation)
        );

        if let Err(e) = parse_numscript_strict(&script) {
            eprintln!(
                "{}",
                error_formatter::format_error_in(&e, &file.display().to_string())
            );
        }
        if !validation.valid {
            invalid += 1;
        }
    }

    if invalid > 0 {
        anyhow::bail!("{} of {} script(s) have problems", invalid, files.len());
    }
    Ok(())
}

/// `path` itself, or every script file below it in sorted order
fn script_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        if entry.path().extension().and_then(|s| s.to_str()) == Some(SCRIPT_EXTENSION) {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

fn scan_command(file: &Path, json: bool) -> Result<()> {
    let script = read_script(file)?;
    let postings = parse_postings_from_numscript(&script);
    let metadata = parse_metadata_from_numscript(&script);

    if json {
        let output = serde_json::json!({
            "postings": postings,
            "metadata": metadata,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", Formatter::default().format_scan(&postings, &metadata));
    }

    Ok(())
}

fn demo_command(config_path: &Path, json: bool) -> Result<()> {
    let config = DemoConfig::from_json(&read_script(config_path)?)?;
    let mut session = DemoSession::new(config)?;
    let runs = session.run_all_steps()?;
    let queries = session.run_useful_queries();

    if json {
        let queries: Vec<serde_json::Value> = queries
            .iter()
            .map(|(useful, result)| match result {
                Ok(rows) => serde_json::json!({ "query": useful, "result": rows }),
                Err(e) => serde_json::json!({ "query": useful, "error": e.to_string() }),
            })
            .collect();
        let output = serde_json::json!({
            "name": session.config().name,
            "steps": runs,
            "balances": session.ledger().get_all_balances(),
            "queries": queries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let formatter = Formatter::default();
    print!("{}", formatter.format_demo_header(session.config()));
    for run in &runs {
        print!("{}", formatter.format_step(run));
    }
    print!(
        "{}",
        formatter.format_balances(&session.ledger().get_all_balances())
    );
    for (useful, result) in &queries {
        print!("{}", formatter.format_query(useful, result));
    }

    Ok(())
}

fn server_command(host: &str, port: u16) -> Result<()> {
    #[cfg(feature = "server")]
    {
        use tokio::runtime::Runtime;
        let rt = Runtime::new()?;
        rt.block_on(server::http::start_server(host, port))?;
    }

    #[cfg(not(feature = "server"))]
    {
        let _ = (host, port);
        eprintln!("Error: Server feature not enabled");
        eprintln!("Recompile with: cargo build --features server");
        std::process::exit(1);
    }

    Ok(())
}

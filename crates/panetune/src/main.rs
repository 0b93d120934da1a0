//! panetune CLI: validate documents and inspect effective configurations.

use std::{env, fs, path::Path, process::ExitCode};

use clap::Parser;
use config::{Document, EffectiveConfig, ViewerContext};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command, LogArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.logs);
    // Debug verbosity is decided once at startup and passed down explicitly.
    let debug = cli.logs.debug;
    match run(cli.command, debug) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing subscriber with precedence:
/// `--log-filter`, then `--debug`, then `RUST_LOG`, then `info`.
fn init_tracing(logs: &LogArgs) {
    let spec = if let Some(filter) = &logs.log_filter {
        filter.clone()
    } else if logs.debug {
        "config=debug,panetune=debug".to_string()
    } else {
        env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };
    let filter = EnvFilter::try_new(&spec).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Dispatch the selected subcommand.
fn run(command: Command, debug: bool) -> Result<(), String> {
    match command {
        Command::Check { file } => check(&file, debug),
        Command::Resolve {
            file,
            user,
            device,
            user_agent,
            admin,
            owner,
            json,
        } => {
            let ctx = ViewerContext {
                user,
                device,
                user_agent,
                is_admin: admin,
                is_owner: owner,
            };
            resolve(&file, &ctx, json)
        }
    }
}

/// Read and parse the raw JSON document at `path`.
fn load_document(path: &Path) -> Result<Document, String> {
    let text = fs::read_to_string(path)
        .map_err(|error| format!("Failed to read {}: {error}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|error| format!("Malformed JSON in {}: {error}", path.display()))?;
    Document::from_value(&value).map_err(|error| error.pretty())
}

/// Validate structure, inheritance graph, and partial graph of a document.
fn check(path: &Path, debug: bool) -> Result<(), String> {
    let doc = load_document(path)?;
    config::validate_extends(&doc).map_err(|error| error.pretty())?;
    for body in doc.partials.values() {
        let _expanded =
            config::resolve_partials(body, &doc.partials).map_err(|error| error.pretty())?;
    }
    if debug {
        debug!(
            fragments = doc.fragments.len(),
            partials = doc.partials.len(),
            "graphs validated"
        );
    }
    println!(
        "{}: OK ({} order items, {} exceptions, {} fragments, {} partials)",
        path.display(),
        doc.order.as_ref().map_or(0, Vec::len),
        doc.exceptions.len(),
        doc.fragments.len(),
        doc.partials.len(),
    );
    Ok(())
}

/// Build and print the effective configuration for `ctx`.
fn resolve(path: &Path, ctx: &ViewerContext, json: bool) -> Result<(), String> {
    let doc = load_document(path)?;
    let effective = EffectiveConfig::build(&doc, ctx).map_err(|error| error.pretty())?;
    if json {
        let rendered = serde_json::to_string_pretty(&effective)
            .map_err(|error| format!("Failed to render effective configuration: {error}"))?;
        println!("{rendered}");
        return Ok(());
    }
    if let Some(title) = &effective.options.title {
        println!("title: {title}");
    }
    if let Some(mode) = effective.options.mode {
        println!("mode: {mode:?}");
    }
    println!("order ({} items):", effective.order.len());
    for item in &effective.order {
        let mut line = format!("  {}", item.item);
        if item.new_item {
            line.push_str(" (new)");
        }
        if let Some(href) = &item.href {
            line.push_str(&format!(" -> {href}"));
        }
        println!("{line}");
    }
    Ok(())
}

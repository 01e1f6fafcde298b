// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! keel - versioned entity store CLI

mod commands;
mod completions;
mod context;
mod error;
mod fields;
mod output;

use clap::{Parser, Subcommand};
use commands::{entity, lookup, store};
use completions::{print_completions, CompletionsArgs};
use context::Context;
use error::KeelError;
use output::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "keel", version, about = "keel - versioned entity store")]
struct Cli {
    /// Directory holding the store and keel.toml
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Application scope entities are partitioned under
    #[arg(long, global = true, default_value = "default")]
    app: String,

    /// Config file (defaults to <data-dir>/keel.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a new version of an entity
    Put(entity::PutArgs),
    /// Load the current version of an entity
    Get(entity::GetArgs),
    /// Delete an entity and release its unique values
    Delete(entity::DeleteArgs),
    /// List the recorded versions of an entity
    History(entity::HistoryArgs),
    /// Find the entity owning a unique value
    Lookup(lookup::LookupArgs),
    /// Compact the write-ahead log
    Checkpoint,
    /// Check the store is reachable
    Health,
    /// Generate shell completions
    Completions(CompletionsArgs),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<KeelError>() {
                Some(keel) => eprint!("{}", keel),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Completions don't need the store
    if let Commands::Completions(args) = cli.command {
        print_completions::<Cli>(args.shell);
        return Ok(());
    }

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => context::default_data_dir()?,
    };
    let config = context::load_config(&data_dir, cli.config.as_deref())?;
    let ctx = Context::open(&data_dir, &cli.app, config, cli.output)?;

    let result = match cli.command {
        Commands::Put(args) => entity::put(&ctx, args).await,
        Commands::Get(args) => entity::get(&ctx, args).await,
        Commands::Delete(args) => entity::delete(&ctx, args).await,
        Commands::History(args) => entity::history(&ctx, args).await,
        Commands::Lookup(args) => lookup::lookup(&ctx, args).await,
        Commands::Checkpoint => store::checkpoint(&ctx).await,
        Commands::Health => store::health(&ctx).await,
        Commands::Completions(_) => Ok(()),
    };

    // Let background cleanup finish before the store lock is released
    ctx.manager.quiesce().await;
    result
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

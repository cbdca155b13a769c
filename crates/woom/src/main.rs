// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Woom - deferred webinar registration for WooCommerce orders.
//!
//! This is the binary entry point.

mod commands;
mod serve;
mod shutdown;
mod wiring;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use woom_config::WoomConfig;

/// Woom - deferred webinar registration for WooCommerce orders.
#[derive(Parser, Debug)]
#[command(name = "woom", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the dispatcher and the HTTP gateway.
    Serve,
    /// Run one registration attempt for an order line item now.
    Process {
        #[arg(long)]
        order: u64,
        #[arg(long)]
        item: u64,
        /// Status code to carry into the attempt, as a rescheduled task would.
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        previous_status_code: i64,
    },
    /// List the audit trail of an order.
    Audit {
        #[arg(long)]
        order: u64,
        /// Print records as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Validate configuration and report missing credentials.
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> WoomConfig {
    let loaded = match path {
        Some(path) => woom_config::load_and_validate_path(path),
        None => woom_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            woom_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

fn require_serving_config(config: &WoomConfig) {
    if let Err(errors) = woom_config::validate_for_serving(config) {
        woom_config::render_errors(&errors);
        std::process::exit(1);
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let result = match cli.command {
        Some(Commands::Serve) => {
            require_serving_config(&config);
            serve::run_serve(config).await
        }
        Some(Commands::Process {
            order,
            item,
            previous_status_code,
        }) => {
            require_serving_config(&config);
            serve::init_tracing(&config.service.log_level);
            commands::run_process(config, order, item, previous_status_code).await
        }
        Some(Commands::Audit { order, json }) => commands::run_audit(config, order, json).await,
        Some(Commands::CheckConfig) => {
            if !commands::run_check_config(&config) {
                std::process::exit(1);
            }
            Ok(())
        }
        None => {
            println!("woom: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

//! `stockline` -- operator CLI for warehouse pickings on an Odoo server.
//!
//! Each subcommand logs in over JSON-RPC, runs one workflow, prints a
//! report on stdout, and exits with status 1 on any failure. Logs go to
//! stderr.
//!
//! # Environment variables
//!
//! | Variable               | Default                 | Description                          |
//! |------------------------|-------------------------|--------------------------------------|
//! | `ODOO_URL`             | `http://localhost:8018` | Server base URL                      |
//! | `ODOO_DB`              | `18_odoo`               | Database to log into                 |
//! | `ODOO_USERNAME`        | `admin`                 | Login                                |
//! | `ODOO_PASSWORD`        | `admin`                 | Password                             |
//! | `REQUEST_TIMEOUT_SECS` | `30`                    | Per-request timeout                  |
//! | `SESSION_RETRY_LIMIT`  | `1`                     | Re-logins per request on expiry      |
//! | `PICKING_ID`           | `108080`                | Picking used when no ID is given     |
//! | `OUTPUT_DIR`           | `.`                     | Where snapshot files are written     |
//! | `RUST_LOG`             | `stockline_cli=info,stockline_rpc=info` | Log filter          |

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use stockline_core::stock::{OrderStatusSnapshot, MODEL_STOCK_MOVE};
use stockline_core::types::RecordId;
use stockline_rpc::batch::bulk_update;
use stockline_rpc::OdooClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockline_cli::config::AppConfig;
use stockline_cli::output;
use stockline_cli::workflows::fetch_picking::fetch_picking;
use stockline_cli::workflows::fetch_status::fetch_order_statuses;
use stockline_cli::workflows::update_records::load_updates;
use stockline_cli::workflows::update_salla::call_update_salla;
use stockline_cli::workflows::update_status::{status_values, update_picking_status};
use stockline_cli::workflows::validate::{validate_picking, ValidateOptions};

#[derive(Parser, Debug)]
#[command(name = "stockline")]
#[command(about = "Fetch, update, and validate stock pickings over JSON-RPC")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save a picking and its moves to stock_picking_<ID>.json.
    FetchPicking { id: Option<RecordId> },
    /// Save every order status to salla_order_status_all.json.
    FetchStatuses,
    /// Push a picking to the storefront.
    UpdateSalla { id: Option<RecordId> },
    /// Validate a picking, cancelling any backorder.
    Validate(ValidateArgs),
    /// Apply a JSON file of per-record updates in grouped writes.
    BulkUpdate(BulkUpdateArgs),
    /// Write fixed fields to pickings and verify them.
    UpdateStatus(UpdateStatusArgs),
}

#[derive(clap::Args, Debug)]
struct ValidateArgs {
    id: Option<RecordId>,
    /// Send SMS notifications.
    #[arg(long = "no-skip-sms", action = ArgAction::SetTrue)]
    no_skip_sms: bool,
    /// Allow a backorder to be created.
    #[arg(long = "no-cancel-backorder", action = ArgAction::SetTrue)]
    no_cancel_backorder: bool,
}

#[derive(clap::Args, Debug)]
struct BulkUpdateArgs {
    #[arg(long)]
    file: PathBuf,
    #[arg(long, default_value = MODEL_STOCK_MOVE)]
    model: String,
}

#[derive(clap::Args, Debug)]
struct UpdateStatusArgs {
    /// Picking ids, comma separated (default: PICKING_ID).
    #[arg(long, value_delimiter = ',')]
    ids: Vec<RecordId>,
    /// Field assignment; repeatable.
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    set: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockline_cli=info,stockline_rpc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run one command. `Ok(false)` means the command ran but reported a
/// failure.
async fn run(command: Command) -> anyhow::Result<bool> {
    let config = AppConfig::from_env().context("Invalid configuration")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::FetchPicking { id } => {
            let id = id.unwrap_or(config.picking_id);
            output::banner(&mut out, "Fetch Stock Picking")?;
            let mut client = connect(&config).await?;

            let snapshot = fetch_picking(&mut client, id)
                .await
                .with_context(|| format!("Failed to fetch picking {id}"))?;
            let path = output::write_snapshot(&config.output_dir, &snapshot.file_name(), &snapshot)?;
            output::picking_summary(&mut out, &snapshot, &path)?;
            Ok(true)
        }

        Command::FetchStatuses => {
            output::banner(&mut out, "Fetch Order Statuses")?;
            let mut client = connect(&config).await?;

            let snapshot = fetch_order_statuses(&mut client)
                .await
                .context("Failed to fetch order statuses")?;
            let path =
                output::write_snapshot(&config.output_dir, OrderStatusSnapshot::FILE_NAME, &snapshot)?;
            output::order_status_summary(&mut out, &snapshot, &path)?;
            Ok(true)
        }

        Command::UpdateSalla { id } => {
            let id = id.unwrap_or(config.picking_id);
            output::banner(&mut out, "Call update_salla")?;
            let mut client = connect(&config).await?;

            let outcome = call_update_salla(&mut client, id).await;
            output::method_outcome(&mut out, &outcome)?;
            Ok(outcome.success)
        }

        Command::Validate(args) => {
            let id = args.id.unwrap_or(config.picking_id);
            let options = ValidateOptions {
                skip_sms: !args.no_skip_sms,
                cancel_backorder: !args.no_cancel_backorder,
            };
            output::banner(&mut out, "Validate Stock Picking")?;
            writeln!(out, "   Picking ID: {id}")?;
            writeln!(out, "   skip_sms: {}", options.skip_sms)?;
            writeln!(out, "   cancel_backorder: {}", options.cancel_backorder)?;
            let mut client = connect(&config).await?;

            let outcome = validate_picking(&mut client, id, options).await;
            output::method_outcome(&mut out, &outcome)?;
            Ok(outcome.success)
        }

        Command::BulkUpdate(args) => {
            let updates = load_updates(&args.file)?;
            output::banner(&mut out, "Bulk Update")?;
            writeln!(out, "   Model: {}", args.model)?;
            writeln!(out, "   Records: {}", updates.len())?;
            let mut client = connect(&config).await?;

            let report = bulk_update(&mut client, &args.model, updates).await;
            output::update_report(&mut out, &report)?;
            Ok(report.success)
        }

        Command::UpdateStatus(args) => {
            let values = status_values(&args.set)?;
            let ids = if args.ids.is_empty() {
                vec![config.picking_id]
            } else {
                args.ids
            };
            output::banner(&mut out, "Update Picking Status")?;
            writeln!(out, "   Pickings: {ids:?}")?;
            writeln!(out, "   Fields: {}", serde_json::Value::Object(values.clone()))?;
            let mut client = connect(&config).await?;

            let outcome = update_picking_status(&mut client, &ids, &values).await;
            output::status_update(&mut out, &outcome)?;
            Ok(outcome.success())
        }
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<OdooClient> {
    let mut client = OdooClient::new(&config.client).context("Failed to build HTTP client")?;
    client
        .authenticate()
        .await
        .with_context(|| format!("Could not log into {}", config.client.url))?;
    Ok(client)
}

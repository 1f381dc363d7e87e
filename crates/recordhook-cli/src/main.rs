#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;

use std::process;

use anyhow::Context;
use recordhook_core::Operation;
use recordhook_dispatch::{Dispatcher, HookPoint, HookRegistry, RecordEvent};
use recordhook_store::MemoryStore;

use crate::config::{Cli, Command, create_store, create_webhook_service, parse_record};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "recordhook_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "recordhook_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "recordhook_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "recordhook_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();

    let store = create_store(&cli).await?;

    match &cli.command {
        Command::Validate => validate(&store).await,
        Command::Dispatch {
            collection,
            op,
            record,
        } => {
            let record = parse_record(collection, record)?;
            dispatch(&cli, store, collection, *op, record).await
        }
    }
}

/// Logs a summary of every loaded subscription.
async fn validate(store: &MemoryStore) -> anyhow::Result<()> {
    let subscriptions = store.list().await;

    for subscription in &subscriptions {
        tracing::info!(
            target: TRACING_TARGET_COMMAND,
            id = %subscription.id,
            table_name = %subscription.table_name,
            op = %subscription.op,
            url = %subscription.url,
            headers = subscription.headers.len(),
            "Subscription"
        );
    }

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        count = subscriptions.len(),
        "Subscriptions are valid"
    );

    Ok(())
}

/// Builds the composition root and fires the after-commit hook once.
async fn dispatch(
    cli: &Cli,
    store: MemoryStore,
    collection: &str,
    op: Operation,
    record: recordhook_core::Record,
) -> anyhow::Result<()> {
    let webhook = create_webhook_service(cli)?;
    let dispatcher = Dispatcher::new(store, webhook);

    let mut hooks = HookRegistry::new();
    recordhook_dispatch::install(&mut hooks, dispatcher);

    let point = HookPoint::after(op);
    let event = RecordEvent::new(collection, record);

    hooks
        .trigger(point, &event)
        .await
        .with_context(|| format!("{point} hook failed for `{collection}`"))?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        collection = %collection,
        op = %op,
        record_id = %event.record.id,
        "Record change dispatched"
    );

    Ok(())
}

//! # ΨForms Trigger Runtime
//!
//! Runs the triggers over an in-memory object store, fed by
//! newline-delimited JSON write commands on stdin:
//!
//! ```text
//! {"caller": {"User": "u1"}, "acl": {...}, "record": {"type": "Form", ...}}
//! {"caller": "Privileged", "record": {"type": "RequestEvent", ...}}
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (`PF_*` environment) and validate it
//! 2. Install logging
//! 3. Pick the email transport (`dry_run` records instead of sending)
//! 4. Start the reaction handler
//! 5. Apply commands until stdin closes or Ctrl+C
//! 6. Drain outstanding reactions, then exit

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use pf_06_notifications::{EmailLabsTransport, EmailTransport, RecordingTransport};
use shared_types::InMemoryObjectStore;
use trigger_runtime::{init_tracing, RuntimeConfig, TriggerRuntime, WriteCommand};

async fn serve<T: EmailTransport + 'static>(config: &RuntimeConfig, transport: Arc<T>) -> Result<()> {
    let store = Arc::new(InMemoryObjectStore::new());
    let runtime = TriggerRuntime::new(config, store, transport)
        .context("Failed to create trigger runtime")?;
    runtime.start();

    info!("Trigger runtime is running. Reading write commands from stdin.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match WriteCommand::from_json(&line) {
            Ok(command) => command,
            Err(e) => {
                warn!("Skipping malformed command: {}", e);
                continue;
            }
        };

        let class = command.record.class();
        match runtime.write(&command.caller, command.record, command.acl).await {
            Ok(notice) => info!(class = %class, key = %notice.key, "Write accepted"),
            Err(e) => error!(class = %class, caller = %command.caller, "Write rejected: {}", e),
        }
    }

    // Reactions to the last commits finish before the process exits.
    runtime.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config.log)?;
    config.validate().context("Invalid configuration")?;

    if config.dry_run {
        warn!("Dry run: emails are recorded, not sent");
        serve(&config, Arc::new(RecordingTransport::new())).await
    } else {
        let transport = EmailLabsTransport::new(config.email.clone())
            .context("Failed to build email transport")?;
        serve(&config, Arc::new(transport)).await
    }
}

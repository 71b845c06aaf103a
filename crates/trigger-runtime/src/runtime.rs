//! # Trigger Runtime
//!
//! Wires the store, the commit queue, the write pipeline and the reaction
//! handler.
//!
//! ## Startup Sequence
//!
//! 1. Validate the configuration
//! 2. Create the commit queue (`bus_capacity`) and the result bus
//! 3. Build the notification dispatcher for the configured network
//! 4. `start()`: spawn the reaction handler over the queue
//!
//! Writes go through `write()`; their reactions run in the background and
//! report on the `Reactions` / `DeadLetterQueue` topics. `shutdown()`
//! returns once every queued commit has been reacted to.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use pf_06_notifications::{EmailTransport, NotificationDispatcher, UrlBuilder};
use shared_bus::{
    commit_queue, CommitNotice, CommitReceiver, EventFilter, EventTopic, ResultBus, Subscription,
};
use shared_types::{Acl, Caller, ObjectStore, TriggerError};

use crate::config::{ConfigError, RuntimeConfig};
use crate::handlers::ReactionHandler;
use crate::pipeline::{WritePipeline, WriteRecord};

/// The trigger runtime.
pub struct TriggerRuntime<S, T> {
    /// Object store.
    store: Arc<S>,
    /// Reaction results.
    results: Arc<ResultBus>,
    /// Before-save guards and commit.
    pipeline: WritePipeline<S>,
    /// After-save reactions.
    handler: Arc<ReactionHandler<S, T>>,
    /// Read side of the commit queue until `start` hands it to the handler.
    commits: Mutex<Option<CommitReceiver>>,
    /// Handler loop, once started.
    worker: Mutex<Option<JoinHandle<()>>>,
    /// Shutdown signal sender.
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl<S, T> TriggerRuntime<S, T>
where
    S: ObjectStore + 'static,
    T: EmailTransport + 'static,
{
    /// Create a runtime over `store`, sending email through `transport`.
    ///
    /// # Errors
    ///
    /// `config` does not validate.
    pub fn new(
        config: &RuntimeConfig,
        store: Arc<S>,
        transport: Arc<T>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(network = %config.network, "Creating ΨForms trigger runtime");

        let (commits_tx, commits_rx) = commit_queue(config.bus_capacity);
        let results = Arc::new(ResultBus::new());
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&store),
            transport,
            UrlBuilder::new(config.network),
            config.retry,
        );
        let handler = Arc::new(ReactionHandler::new(
            Arc::clone(&store),
            dispatcher,
            Arc::clone(&results),
        ));
        let pipeline = WritePipeline::new(Arc::clone(&store), commits_tx);
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        Ok(Self {
            store,
            results,
            pipeline,
            handler,
            commits: Mutex::new(Some(commits_rx)),
            worker: Mutex::new(None),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Start the reaction handler.
    ///
    /// Commits made before `start` wait in the queue; once it holds
    /// `bus_capacity` of them, writers block until the handler runs.
    pub fn start(&self) {
        let Some(commits) = self.commits.lock().take() else {
            warn!("[runtime] Reaction handler already started");
            return;
        };

        let handler = Arc::clone(&self.handler);
        let shutdown = self.shutdown_rx.clone();
        *self.worker.lock() = Some(tokio::spawn(handler.run(commits, shutdown)));

        info!("Reaction handler started");
    }

    /// Guard and commit one client or backend write.
    ///
    /// # Errors
    ///
    /// The write was rejected by a before-save guard, or the store failed.
    /// Reaction failures are never returned here.
    pub async fn write(
        &self,
        caller: &Caller,
        record: WriteRecord,
        acl: Acl,
    ) -> Result<CommitNotice, TriggerError> {
        self.pipeline.write(caller, record, acl).await
    }

    /// Announce an already committed record again, as an at-least-once
    /// delivery would. The replay carries the record as first written.
    pub async fn redeliver(&self, notice: &CommitNotice) -> CommitNotice {
        let replay = notice.redelivered();
        self.pipeline.announce(replay.clone()).await;
        replay
    }

    /// Subscribe to reaction results (completed and failed).
    pub fn subscribe_results(&self) -> Subscription {
        self.results.subscribe(EventFilter::topics(vec![
            EventTopic::Reactions,
            EventTopic::DeadLetterQueue,
        ]))
    }

    /// Stop accepting commits, then wait for every queued and running
    /// reaction to finish.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!("Reaction handler did not stop cleanly: {}", e);
            }
        }

        info!("Shutdown complete");
    }

    /// Object store.
    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }
}

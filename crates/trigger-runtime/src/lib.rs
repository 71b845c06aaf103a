//! # ΨForms Trigger Runtime
//!
//! Hosts the triggers of the ΨForms store: before-save guards on every
//! write, after-save reactions on every committed request event.
//!
//! ## Modular Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `config` | `RuntimeConfig`: defaults, JSON, `PF_*` environment |
//! | `telemetry` | `tracing` subscriber setup |
//! | `pipeline` | Write path: guard, commit, announce |
//! | `handlers` | After-save reactions to request events |
//! | `runtime` | `TriggerRuntime`: wiring, start, shutdown |
//!
//! ## Flow
//!
//! ```text
//! client/backend write
//!        │
//!        ▼
//!  WritePipeline ──guard──→ reject (nothing stored)
//!        │
//!     commit ──CommitNotice──→ commit queue ──→ ReactionHandler
//!                                                   │
//!                         confirmed = false ────────┼──→ sync_request → grant_receipt_access
//!                         confirmed = true ─────────┴──→ notify
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod handlers;
pub mod pipeline;
pub mod runtime;
pub mod telemetry;

pub use config::{ConfigError, LogConfig, RuntimeConfig};
pub use handlers::ReactionHandler;
pub use pipeline::{WriteCommand, WritePipeline, WriteRecord};
pub use runtime::TriggerRuntime;
pub use telemetry::init_tracing;

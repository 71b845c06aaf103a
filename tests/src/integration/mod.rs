//! Workflow scenarios across the trigger crates.

pub mod harness;
mod lifecycle;
mod notifications;

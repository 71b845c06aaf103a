//! # Reaction Handlers
//!
//! After-save handlers driven by commit notices on the shared bus.

pub mod reactions;

pub use reactions::ReactionHandler;

//! Sideline
//!
//! Letter/category soundboard: a persisted library of tiles, a hydration
//! pass that turns stored clip bytes into playable audio, and a command
//! vocabulary driving the multi-voice playback engine.
//!
//! This library exposes the session and its parts for the console binary
//! and for testing.

pub mod config;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod hydration;
pub mod library;
pub mod remote;
pub mod session;

// Re-export commonly used types for convenience
pub use config::SidelineConfig;
pub use dispatcher::{Command, CommandDispatcher, CommandOutcome};
pub use error::{AppError, Result};
pub use hydration::{HydrationReport, HydrationService};
pub use library::LibraryStore;
pub use remote::LoggingRemoteProvider;
pub use session::{Bundle, Session, Soundboard};

pub mod commands;
pub mod polling;
pub mod services;

// Re-export key types for convenience
pub use commands::{create_task_store, SharedTaskStore, TaskStore, VersionedInvoker};
pub use polling::{timed_poll, PollOutcome, PollSettings};
pub use services::{SessionService, SessionSettings, SharedSessionService, TaskRetention};

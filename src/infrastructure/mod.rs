//! Infrastructure layer - external concerns

pub mod memory;
pub mod shutdown;
pub mod simulator;

pub use memory::{InMemoryChargePoints, InMemoryOcppTags, InMemoryTransactions};
pub use shutdown::{listen_for_shutdown_signals, ShutdownSignal};
pub use simulator::{SimulatedBehavior, SimulatedCommandChannel};

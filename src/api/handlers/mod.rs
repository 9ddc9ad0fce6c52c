//! API handlers

pub mod charge_points;
pub mod health;
pub mod id_tags;
pub mod metrics;
pub mod transactions;

pub use charge_points::ChargePointAppState;
pub use health::HealthState;
pub use id_tags::IdTagAppState;
pub use metrics::MetricsState;
pub use transactions::SessionAppState;

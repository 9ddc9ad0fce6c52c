//! Transaction aggregate
//!
//! Contains the Transaction entity and repository interface.

pub mod model;
pub mod repository;

pub use model::Transaction;
pub use repository::TransactionRepository;

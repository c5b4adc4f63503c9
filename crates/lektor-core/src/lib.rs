pub mod availability;
pub mod config;
pub mod error;
pub mod expand;
pub mod identity;
pub mod policy;
pub mod recurrence;
pub mod types;

pub mod calendar;
pub mod materialized;
pub mod participant;
pub mod policy;
pub mod template;

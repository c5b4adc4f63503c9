pub mod availability;
pub mod materialize;
pub mod policy;
pub mod service;
pub mod template;

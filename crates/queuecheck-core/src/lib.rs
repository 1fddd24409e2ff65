pub mod batch;
pub mod classifier;
pub mod config;
pub mod deadline;
pub mod error;
pub mod policy;
pub mod query;
pub mod teams;
pub mod ticket;
pub mod types;
pub mod waiting;

pub use error::{QueueCheckError, Result};

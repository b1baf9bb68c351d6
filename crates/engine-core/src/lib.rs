pub mod archive;
pub mod chain;
pub mod error;
pub mod metrics;

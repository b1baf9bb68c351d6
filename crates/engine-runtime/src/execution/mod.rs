pub mod executor;
pub mod scratch;
pub mod state;
pub mod summary;
pub mod workers;

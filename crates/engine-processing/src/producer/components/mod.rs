pub mod coordinator;
pub mod reader;

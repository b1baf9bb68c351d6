pub mod batch;
pub mod codec;
pub mod header;
pub mod synthetic;

pub mod hash;
pub mod range;

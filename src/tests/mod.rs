pub mod common;
pub mod token_lifecycle;

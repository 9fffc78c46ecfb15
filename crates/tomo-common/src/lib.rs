pub mod error;
pub mod redis;

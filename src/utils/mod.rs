pub mod error;
pub mod keys;
pub mod logger;
pub mod validation;

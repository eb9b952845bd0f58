pub mod logger;
pub mod macros;

pub mod cli;
pub mod config;
pub mod error;
pub mod startup;
pub mod tracing_init;

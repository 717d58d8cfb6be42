pub mod executor;
pub mod runner;

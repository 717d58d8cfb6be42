pub mod core;
pub mod models;
pub mod policy;
pub mod input;
pub mod api;
pub mod pipeline;

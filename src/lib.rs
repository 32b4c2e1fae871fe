pub mod admission;
pub mod cli;
pub mod completion;
pub mod config;
pub mod coordinator;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod outside;
pub mod pipeline;
pub mod result;
pub mod store;
pub mod strategy;
pub mod types;

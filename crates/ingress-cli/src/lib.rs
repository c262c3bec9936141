//! CLI library components for the dataset ingress pipeline.

pub mod commands;
pub mod logging;
pub mod summary;

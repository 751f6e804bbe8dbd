//! Wire types and configuration shared by the task server and its tests.

pub mod config;
pub mod types;

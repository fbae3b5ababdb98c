//! CLI command implementations

pub mod ask;
pub mod classify;
pub mod completions;
pub mod config;
pub mod explain;
pub mod explore;
pub mod show;

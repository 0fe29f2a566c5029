//! Configuration management for kbucket
//!
//! A `Config` is built once at startup, either from the environment
//! (`Config::from_env`) or through `ConfigBuilder`, and is immutable
//! afterwards.

pub mod config;

pub use config::{Config, ConfigBuilder};

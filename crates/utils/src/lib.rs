//! Shared utilities for kbucket
//!
//! Small helpers used across the workspace: atomic file writes for the
//! cache's JSON records, XDG directory lookup and tracing setup.

pub mod atomic_file;
pub mod logging;
pub mod xdg;

pub use atomic_file::*;
pub use xdg::*;

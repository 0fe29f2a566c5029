//! Core domain types, errors, and constants for kbucket.
//!
//! ## Key Components
//!
//! - **`errors`**: the shared `Error` enum and `Result` alias. Absence of a
//!   file is never an error; it is reported as `Ok(None)` by the callers.
//! - **`types`**: `ContentHash`, the parsed `Reference` union and `ShareId`.
//! - **`constants`**: URI schemes, environment variable names and cache
//!   layout suffixes.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result},
    types::*,
};

//! Domain types shared across the kbucket crates

mod hash;
mod reference;
mod share;

pub use hash::ContentHash;
pub use reference::Reference;
pub use share::ShareId;

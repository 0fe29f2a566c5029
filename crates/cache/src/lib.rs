//! Content-addressed local file cache for kbucket
//!
//! Files are stored under their SHA-1 content hash. To avoid rereading large
//! files, every hash computation is remembered against the file's
//! fingerprint (path, size, inode, mtime, ctime), and every hashed path is
//! remembered as a hint for its hash so it can be served without copying.

mod download;
pub mod fingerprint;
pub mod hashing;
pub mod records;
pub mod store;

pub use fingerprint::FileFingerprint;
pub use hashing::{hash_bytes, hash_file, ContentHasher};
pub use records::{FingerprintRecord, HintSet};
pub use store::{ContentStore, HashOutcome};

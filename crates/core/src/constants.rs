//! Constants used throughout the kbucket codebase

// Reference URI schemes
pub const SHA1_URI_PREFIX: &str = "sha1://";
pub const KBUCKET_URI_PREFIX: &str = "kbucket://";

// Environment variable names
pub const KBUCKET_URL_VAR: &str = "KBUCKET_URL";
pub const KBUCKET_CACHE_DIR_VAR: &str = "KBUCKET_CACHE_DIR";
pub const KBUCKET_SHARE_IDS_VAR: &str = "KBUCKET_SHARE_IDS";
pub const KBUCKET_LOAD_LOCAL_VAR: &str = "KBUCKET_LOAD_LOCAL";
pub const KBUCKET_LOAD_REMOTE_VAR: &str = "KBUCKET_LOAD_REMOTE";
pub const KBUCKET_TIMEOUT_VAR: &str = "KBUCKET_TIMEOUT_SECS";

// Remote hub
pub const DEFAULT_REMOTE_URL: &str = "https://kbucket.flatironinstitute.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// Local cache layout
pub const HINTS_SUFFIX: &str = ".hints.json";
pub const RECORD_SUFFIX: &str = ".record.json";
pub const HASH_CHUNK_SIZE: usize = 64 * 1024;

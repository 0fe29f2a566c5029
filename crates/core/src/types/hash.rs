use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::ops::Deref;
use std::str::FromStr;

/// A lowercase hex SHA-1 digest identifying file content
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Number of hex characters in a digest
    pub const LEN: usize = 40;

    /// Parse a hex digest, normalising it to lowercase
    pub fn parse(hex: &str) -> Result<Self> {
        if hex.len() != Self::LEN || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::configuration(format!(
                "invalid content hash '{hex}': expected {} hex characters",
                Self::LEN
            )));
        }
        Ok(Self(hex.to_ascii_lowercase()))
    }

    /// Build a hash from a raw 20-byte SHA-1 digest
    pub fn from_sha1_digest(digest: [u8; 20]) -> Self {
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two directory levels a hash is sharded under: first character,
    /// then the next two.
    pub fn shard(&self) -> (&str, &str) {
        (&self.0[..1], &self.0[1..3])
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for ContentHash {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for ContentHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

    #[test]
    fn test_parse_valid() {
        let hash = ContentHash::parse(HASH).unwrap();
        assert_eq!(hash.as_str(), HASH);
        assert_eq!(hash.shard(), ("d", "a3"));
    }

    #[test]
    fn test_parse_normalises_case() {
        let hash = ContentHash::parse(&HASH.to_uppercase()).unwrap();
        assert_eq!(hash.as_str(), HASH);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(ContentHash::parse("").is_err());
        assert!(ContentHash::parse("abc123").is_err());
        assert!(ContentHash::parse(&"g".repeat(40)).is_err());
        assert!(ContentHash::parse(&"a".repeat(41)).is_err());
    }

    #[test]
    fn test_from_sha1_digest() {
        let hash = ContentHash::from_sha1_digest([0xab; 20]);
        assert_eq!(hash.as_str(), "ab".repeat(20));
        assert_eq!(hash.shard(), ("a", "ba"));
    }

    #[test]
    fn test_serde_validates() {
        let json = format!("\"{HASH}\"");
        let hash: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(serde_json::to_string(&hash).unwrap(), json);
        assert!(serde_json::from_str::<ContentHash>("\"nope\"").is_err());
    }
}

use crate::errors::{Error, Result};
use std::fmt::{self, Display};

/// The share segment of a `kbucket://` reference or a configured share list
///
/// A segment with exactly one `.` names an alias in the naming service as
/// `<collection>.<key>`; anything else is used verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShareId {
    Direct(String),
    Alias { collection: String, key: String },
}

impl ShareId {
    pub fn parse(segment: &str) -> Result<Self> {
        if segment.is_empty() {
            return Err(Error::configuration("share identifier must not be empty"));
        }
        if segment.contains('/') || segment.chars().any(char::is_whitespace) {
            return Err(Error::configuration(format!(
                "malformed share identifier '{segment}'"
            )));
        }

        let parts: Vec<&str> = segment.split('.').collect();
        match parts.as_slice() {
            [collection, key] => {
                if collection.is_empty() || key.is_empty() {
                    return Err(Error::configuration(format!(
                        "malformed share alias '{segment}': expected <collection>.<key>"
                    )));
                }
                Ok(ShareId::Alias {
                    collection: (*collection).to_string(),
                    key: (*key).to_string(),
                })
            }
            _ => Ok(ShareId::Direct(segment.to_string())),
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, ShareId::Alias { .. })
    }
}

impl Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareId::Direct(id) => f.write_str(id),
            ShareId::Alias { collection, key } => write!(f, "{collection}.{key}"),
        }
    }
}

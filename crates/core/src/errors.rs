use std::path::PathBuf;

/// Result type alias for kbucket operations
pub type Result<T> = std::result::Result<T, Error>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for kbucket operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Contradictory or malformed caller input
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A `collection.key` share alias could not be translated
    #[error("failed to resolve share alias '{alias}': {message}")]
    Alias { alias: String, message: String },

    /// Network-layer failure talking to a remote endpoint
    #[error("transport error for '{url}': {message}")]
    Transport {
        url: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Downloaded bytes did not hash to the expected content hash
    #[error("content verification failed for '{url}': expected {expected}, got {actual}")]
    Verification {
        url: String,
        expected: String,
        actual: String,
    },

    /// Malformed response, or a response carrying `success=false`
    #[error("remote protocol error for '{url}': {message}")]
    RemoteProtocol { url: String, message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create an alias translation error
    #[must_use]
    pub fn alias(alias: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Alias {
            alias: alias.into(),
            message: message.into(),
        }
    }

    /// Create a transport error wrapping the underlying client error
    #[must_use]
    pub fn transport(url: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        let source = source.into();
        Error::Transport {
            url: url.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a transport error without an underlying source, e.g. for HTTP status failures
    #[must_use]
    pub fn transport_message(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Transport {
            url: url.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a verification error
    #[must_use]
    pub fn verification(
        url: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Error::Verification {
            url: url.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a remote protocol error
    #[must_use]
    pub fn remote_protocol(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::RemoteProtocol {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Whether this error came from the network layer
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

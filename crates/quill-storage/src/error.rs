//! Storage errors

use std::path::PathBuf;

/// Failure reported by a durable store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend could not serve the request
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// IO error on the backing file
    #[error("io error at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Backing file could not be decoded
    #[error("corrupt data in {path}: {source}")]
    Corrupt {
        /// File involved
        path: PathBuf,
        /// Decode error
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be encoded
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Snapshot blob written by an incompatible version
    #[error("unsupported snapshot version {0}")]
    UnsupportedSnapshot(u32),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create decode error for path
    pub fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Corrupt {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::Unavailable("quota exceeded".to_string());
        assert_eq!(err.to_string(), "storage unavailable: quota exceeded");

        let err = StoreError::UnsupportedSnapshot(2);
        assert_eq!(err.to_string(), "unsupported snapshot version 2");
    }

    #[test]
    fn io_error_keeps_source() {
        use std::error::Error as _;

        let err = StoreError::io_error(
            "/tmp/x.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/x.json"));
        assert!(err.source().is_some());
    }
}

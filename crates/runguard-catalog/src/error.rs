//! Error types for catalog loading.

/// Catalog errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Request failed or returned a non-success status.
    #[error("network error: {message}")]
    Network { message: String },

    /// Response body could not be read.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Catalog text contained no release headings.
    #[error("catalog parse error: {message}")]
    Parse { message: String },

    /// Local catalog file could not be read.
    #[error("io error: {message}")]
    Io { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl CatalogError {
    /// Process exit status for this error class: 1 configuration,
    /// 5 transport, 6 catalog content or file.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 1,
            Self::Network { .. } | Self::InvalidResponse { .. } => 5,
            Self::Parse { .. } | Self::Io { .. } => 6,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl From<runguard_core::CatalogParseError> for CatalogError {
    fn from(err: runguard_core::CatalogParseError) -> Self {
        Self::Parse {
            message: err.to_string(),
        }
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> String {
        "boom".to_string()
    }

    #[test]
    fn test_exit_codes_by_class() {
        assert_eq!(CatalogError::Config { message: message() }.exit_code(), 1);
        assert_eq!(CatalogError::Network { message: message() }.exit_code(), 5);
        assert_eq!(
            CatalogError::InvalidResponse { message: message() }.exit_code(),
            5
        );
        assert_eq!(CatalogError::Parse { message: message() }.exit_code(), 6);
        assert_eq!(CatalogError::Io { message: message() }.exit_code(), 6);
    }

    #[test]
    fn test_conversions_keep_class() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(CatalogError::from(io).exit_code(), 6);

        let parse = runguard_core::ReleaseCatalog::parse("no headings here").unwrap_err();
        let err = CatalogError::from(parse);
        assert!(matches!(err, CatalogError::Parse { .. }));
        assert!(err.to_string().starts_with("catalog parse error:"));
    }
}

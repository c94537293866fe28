//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `tabs.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("cache.dir".to_string());
        assert_eq!(format!("{err}"), "missing required field: cache.dir");
    }

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 3".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse configuration: expected '=' at line 3"
        );
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError(
            "tables.People.path: arrays are not supported".to_string(),
        );
        assert!(format!("{err}").starts_with("validation error: tables.People.path"));
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}

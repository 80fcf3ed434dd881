use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template rendering failed: {0}")]
    Render(#[from] askama::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load clinic data from '{location}': {reason}")]
    Load { location: String, reason: String },

    #[error("No clinic found for slug '{slug}'")]
    NotFound { slug: String },
}

impl DirectoryError {
    /// Whether this error means the source data could not be loaded at all
    pub fn is_load_failure(&self) -> bool {
        matches!(self, DirectoryError::Load { .. })
    }
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_not_a_load_failure() {
        let not_found = DirectoryError::NotFound { slug: "missing".to_string() };
        assert!(!not_found.is_load_failure());
        assert_eq!(not_found.to_string(), "No clinic found for slug 'missing'");

        let load = DirectoryError::Load {
            location: "clinics.csv".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert!(load.is_load_failure());
        assert!(load.to_string().contains("clinics.csv"));
    }

    #[test]
    fn test_conversions_keep_the_cause() {
        let io: DirectoryError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
        assert!(matches!(io, DirectoryError::Io(_)));
        assert!(!io.is_load_failure());
        assert_eq!(io.to_string(), "I/O error: read-only");

        let toml: DirectoryError = toml::from_str::<toml::Value>("= nope").unwrap_err().into();
        assert!(toml.to_string().starts_with("TOML deserialization failed"));
    }
}

use std::fmt;

use thiserror::Error;

/// Failure reported by a single minification engine.
#[derive(Debug, Clone, Error)]
pub enum MinifyError {
    #[error("{engine}: {message}")]
    Parse { engine: &'static str, message: String },

    #[error("{engine}: minifier returned no usable code")]
    MalformedResult { engine: &'static str },

    #[error("{engine}: failed to build source map: {message}")]
    Codegen { engine: &'static str, message: String },

    #[error("{engine}: invalid engine options: {message}")]
    Options { engine: &'static str, message: String },
}

impl MinifyError {
    pub fn engine(&self) -> &'static str {
        match self {
            MinifyError::Parse { engine, .. }
            | MinifyError::MalformedResult { engine }
            | MinifyError::Codegen { engine, .. }
            | MinifyError::Options { engine, .. } => engine,
        }
    }
}

/// Both engines rejected a file.
///
/// The primary engine's diagnostics are what gets reported; the fallback
/// engine's error is kept alongside for anyone who wants the extra detail.
#[derive(Debug, Clone)]
pub struct FileMinifyError {
    pub path: String,
    pub primary: MinifyError,
    pub fallback: Option<MinifyError>,
}

impl FileMinifyError {
    pub fn new(path: impl Into<String>, primary: MinifyError) -> Self {
        Self { path: path.into(), primary, fallback: None }
    }

    pub fn with_fallback(mut self, fallback: MinifyError) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

impl fmt::Display for FileMinifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} while minifying {}", self.primary, self.path)
    }
}

impl std::error::Error for FileMinifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_appends_path() {
        let err = FileMinifyError::new(
            "app/app.js",
            MinifyError::Parse { engine: "strict", message: "Unexpected token".to_string() },
        );
        assert_eq!(err.to_string(), "strict: Unexpected token while minifying app/app.js");
    }

    #[test]
    fn test_fallback_error_does_not_change_message() {
        let err = FileMinifyError::new(
            "a.js",
            MinifyError::Parse { engine: "strict", message: "primary".to_string() },
        )
        .with_fallback(MinifyError::MalformedResult { engine: "lenient" });

        assert_eq!(err.to_string(), "strict: primary while minifying a.js");
        assert_eq!(err.fallback.as_ref().map(|e| e.engine()), Some("lenient"));
    }
}

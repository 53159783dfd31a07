use std::fmt;

/// Error types for forestwatch operations
#[derive(Debug)]
pub enum ForestError {
    /// IO error (output files, sockets, etc.)
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// Input dataset not found
    FileNotFound(String),

    /// CSV parsing error
    Csv(csv::Error),

    /// A required column is absent from the dataset
    ColumnNotFound(String),

    /// A column holds the wrong kind of values
    ColumnType(String),

    /// Dataset structure is unusable (duplicate headers, etc.)
    MalformedData(String),

    /// Chart rendering error
    Render(String),

    /// PDF generation error
    Pdf(String),

    /// TOML parsing error
    TomlParsing(toml::de::Error),
}

/// Coarse classification of a [`ForestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The dataset could not be loaded; nothing downstream can run.
    Load,
    /// An output artifact could not be produced.
    Output,
    /// Configuration or arguments were rejected.
    Config,
}

impl ForestError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ForestError::FileNotFound(_)
            | ForestError::Csv(_)
            | ForestError::ColumnNotFound(_)
            | ForestError::ColumnType(_)
            | ForestError::MalformedData(_) => ErrorCategory::Load,
            ForestError::Io(_) | ForestError::Render(_) | ForestError::Pdf(_) => {
                ErrorCategory::Output
            }
            ForestError::Config(_) | ForestError::TomlParsing(_) => ErrorCategory::Config,
        }
    }
}

impl fmt::Display for ForestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForestError::Io(err) => write!(f, "IO error: {err}"),
            ForestError::Config(msg) => write!(f, "Configuration error: {msg}"),
            ForestError::FileNotFound(path) => write!(f, "File not found: {path}"),
            ForestError::Csv(err) => write!(f, "CSV error: {err}"),
            ForestError::ColumnNotFound(name) => write!(f, "Column not found: {name}"),
            ForestError::ColumnType(msg) => write!(f, "Column type error: {msg}"),
            ForestError::MalformedData(msg) => write!(f, "Malformed data: {msg}"),
            ForestError::Render(msg) => write!(f, "Render error: {msg}"),
            ForestError::Pdf(msg) => write!(f, "PDF error: {msg}"),
            ForestError::TomlParsing(err) => write!(f, "TOML parsing error: {err}"),
        }
    }
}

impl std::error::Error for ForestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ForestError::Io(err) => Some(err),
            ForestError::Csv(err) => Some(err),
            ForestError::TomlParsing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ForestError {
    fn from(err: std::io::Error) -> Self {
        ForestError::Io(err)
    }
}

impl From<csv::Error> for ForestError {
    fn from(err: csv::Error) -> Self {
        ForestError::Csv(err)
    }
}

impl From<toml::de::Error> for ForestError {
    fn from(err: toml::de::Error) -> Self {
        ForestError::TomlParsing(err)
    }
}

/// Type alias for Results using ForestError
pub type Result<T> = std::result::Result<T, ForestError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn csv_error() -> csv::Error {
        let data = "a,b\n1,2,3\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        reader
            .records()
            .next()
            .expect("one record")
            .expect_err("ragged row")
    }

    #[test]
    fn test_error_display() {
        let config_error = ForestError::Config("Invalid bins".to_string());
        assert_eq!(format!("{config_error}"), "Configuration error: Invalid bins");

        let file_error = ForestError::FileNotFound("/path/to/data.csv".to_string());
        assert_eq!(format!("{file_error}"), "File not found: /path/to/data.csv");

        let column_error = ForestError::ColumnNotFound("income".to_string());
        assert_eq!(format!("{column_error}"), "Column not found: income");
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let error = ForestError::from(io_error);

        match error {
            ForestError::Io(_) => {} // Expected
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_error_from_csv() {
        let error = ForestError::from(csv_error());
        assert!(matches!(error, ForestError::Csv(_)));
        assert!(error.source().is_some());
        assert!(format!("{error}").starts_with("CSV error:"));
    }

    #[test]
    fn test_error_from_toml() {
        let toml_error = toml::from_str::<toml::Value>("invalid toml [").unwrap_err();
        let error = ForestError::from(toml_error);

        match error {
            ForestError::TomlParsing(_) => {} // Expected
            _ => panic!("Expected TomlParsing variant"),
        }
    }

    #[test]
    fn test_error_categories() {
        let load_errors = vec![
            ForestError::FileNotFound("data.csv".to_string()),
            ForestError::Csv(csv_error()),
            ForestError::ColumnNotFound("income".to_string()),
            ForestError::ColumnType("year".to_string()),
            ForestError::MalformedData("duplicate header".to_string()),
        ];
        for error in load_errors {
            assert_eq!(error.category(), ErrorCategory::Load, "{error}");
        }

        let output_errors = vec![
            ForestError::Io(std::io::Error::other("disk full")),
            ForestError::Render("backend".to_string()),
            ForestError::Pdf("font".to_string()),
        ];
        for error in output_errors {
            assert_eq!(error.category(), ErrorCategory::Output, "{error}");
        }

        assert_eq!(
            ForestError::Config("x".to_string()).category(),
            ErrorCategory::Config
        );
    }

    #[test]
    fn test_error_no_source_variants() {
        let errors_without_source = vec![
            ForestError::Config("test".to_string()),
            ForestError::FileNotFound("test".to_string()),
            ForestError::ColumnNotFound("test".to_string()),
            ForestError::ColumnType("test".to_string()),
            ForestError::MalformedData("test".to_string()),
            ForestError::Render("test".to_string()),
            ForestError::Pdf("test".to_string()),
        ];

        for error in errors_without_source {
            assert!(error.source().is_none());
            assert!(format!("{error}").contains(':'));
        }
    }

    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = ForestError::Io(io_error);

        let source = error.source();
        assert!(source.is_some());

        let source_display = format!("{}", source.unwrap());
        assert!(source_display.contains("file not found"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ForestError>();
    }
}

use thiserror::Error;

/// Main error type for jdoc operations
#[derive(Error, Debug)]
pub enum JdocError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("{count} generated file(s) are out of date")]
    StaleOutput { count: usize },
}

pub type Result<T> = std::result::Result<T, JdocError>;

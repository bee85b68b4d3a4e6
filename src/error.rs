use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conversion failures. Parsing and numbering never produce these.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("document serialization failed: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("archive packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid table: {0}")]
    InvalidTable(String),

    #[error("invalid rule set: {0}")]
    RuleSet(#[from] toml::de::Error),
}

/// Error types for document model operations.
use thiserror::Error;

/// Result type for document model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for document model operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed address or range string input
    #[error("invalid reference: {0}")]
    Format(String),

    /// File references an out-of-bounds index or a structurally
    /// inconsistent table
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A mutation would produce overlapping merged ranges
    #[error("range {new} overlaps existing merged range {existing}")]
    Overlap { new: String, existing: String },

    /// A table, field, or defined name collides with an existing one
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// Row or column addressing beyond the worksheet bounds
    #[error("{kind} {value} out of range (1..={max})")]
    IndexOutOfRange {
        kind: &'static str,
        value: u64,
        max: u32,
    },

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Part not found in the package
    #[error("part not found: {0}")]
    PartNotFound(String),

    /// Save-time validation failure
    #[error("invalid document state: {0}")]
    InvalidState(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Error::Xml(format!("XML write error: {}", err))
    }
}

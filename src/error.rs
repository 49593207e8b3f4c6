use {
    std::io::{self, ErrorKind},
    thiserror::Error,
};

/// Errors that can occur while reading a POD file.
///
/// Every failure aborts the whole model; there is no partial result.
#[derive(Debug, Error)]
pub enum Error {
    #[error("attribute {semantic} extends beyond its vertex data block")]
    AttributeOutOfBounds { semantic: String },

    #[error("mesh declared {declared} bone batches but {actual} were read")]
    BoneBatchMismatch { declared: usize, actual: usize },

    #[error("scene declared {declared} {entity} but {actual} were read")]
    CountMismatch {
        entity: &'static str,
        declared: usize,
        actual: usize,
    },

    #[error("vertex attribute {semantic} was already added to this mesh")]
    DuplicateAttribute { semantic: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("stream contains no scene block")]
    MissingScene,

    #[error("{context} does not fit in 32 bits")]
    Overflow { context: &'static str },

    #[error("mesh declared {declared} triangle strips but {actual} strip lengths were read")]
    StripCountMismatch { declared: usize, actual: usize },

    #[error("{entity} block appeared more often than the declared {declared}")]
    TooManyEntities { entity: &'static str, declared: usize },

    #[error("stream ended while reading {context}")]
    Truncated { context: &'static str },

    #[error("{context}: unsupported data type {value}")]
    UnsupportedDataType { context: &'static str, value: u32 },

    #[error("file version mismatch")]
    VersionMismatch,
}

impl Error {
    /// Maps a short read onto [`Error::Truncated`], keeping every other I/O error as-is.
    pub(crate) fn from_io(err: io::Error, context: &'static str) -> Self {
        if err.kind() == ErrorKind::UnexpectedEof {
            Self::Truncated { context }
        } else {
            Self::Io(err)
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(err) => err,
            Error::Truncated { .. } => io::Error::new(ErrorKind::UnexpectedEof, err),
            err => io::Error::new(ErrorKind::InvalidData, err),
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArborError {
    /// Malformed `.tree` byte stream.
    #[error("corrupt tree data: {0}")]
    CorruptTree(String),

    /// Propagated I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch all for unexpected internal problems.
    #[error("internal error: {0}")]
    Internal(String),
}

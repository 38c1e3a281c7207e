use std::io;

/// Errors raised by the crate's own plumbing.
///
/// Collaborator failures (network, validation, pre-rendering) are not
/// errors: they come back as `Option`, `bool` or error lists and are folded
/// into store flags. This type only covers local storage and construction.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Reading or writing a storage file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A storage file exists but does not hold a JSON object of strings.
    #[error("storage file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// [`EditorBuilder::build`](crate::EditorBuilder::build) was called
    /// without a required collaborator.
    #[error("editor is missing its {0} collaborator")]
    MissingCollaborator(&'static str),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

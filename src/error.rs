use thiserror::Error;

/// Errors produced while serving a request.
///
/// Expected conditions, like missing files or bad range headers, never end up here. They are
/// answered with a regular response instead.
#[derive(Error, Debug)]
pub enum Error {
    /// An unexpected IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The response could not be assembled.
    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),
}

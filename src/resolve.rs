use std::{
    io::{Error as IoError, ErrorKind as IoErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
};

use mime_guess::{Mime, MimeGuess};
use tokio::fs::File;
use tracing::debug;

use crate::{
    util::RequestedPath,
    vfs::{FileOpener, FileWithMetadata, ResourceMetadata, TokioFileOpener},
};

/// Default index resource, relative to the root.
pub const DEFAULT_INDEX: &str = "index.html";

/// A file that was found and opened, ready to be served.
#[derive(Debug)]
pub struct ResolvedFile<F = File> {
    /// Open file handle.
    pub handle: F,
    /// Root-relative path of the file.
    pub path: PathBuf,
    /// Metadata of the file, taken from the open handle.
    pub metadata: ResourceMetadata,
    /// Content type guessed from the file extension.
    pub content_type: Option<Mime>,
}

impl<F> ResolvedFile<F> {
    fn new(file: FileWithMetadata<F>, path: PathBuf) -> Self {
        let content_type = MimeGuess::from_path(&path).first();
        Self {
            handle: file.handle,
            path,
            metadata: file.metadata,
            content_type,
        }
    }
}

/// The result of resolving a request path.
///
/// Every path resolves to exactly one of these. Paths that don't map onto a file fall back to
/// the index resource instead of producing an error.
#[derive(Debug)]
pub enum ResolvedTarget<F = File> {
    /// Redirect permanently to the given decoded path.
    Redirect(String),
    /// Serve the file that was found.
    ServeFile(ResolvedFile<F>),
    /// Serve the index resource.
    ServeIndex,
}

/// Resolves request paths against a filesystem.
pub struct Resolver<O = TokioFileOpener> {
    /// The (virtual) filesystem used to open files.
    pub opener: Arc<O>,
    /// Root-relative path of the index resource.
    pub index: PathBuf,
}

impl Resolver<TokioFileOpener> {
    /// Create a resolver serving files from the given root path.
    ///
    /// The root may be absolute or relative.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_opener(TokioFileOpener::new(root))
    }
}

impl<O: FileOpener> Resolver<O> {
    /// Create a resolver on top of a custom `FileOpener`.
    pub fn with_opener(opener: O) -> Self {
        Self {
            opener: Arc::new(opener),
            index: PathBuf::from(DEFAULT_INDEX),
        }
    }

    /// Resolve a percent-decoded request path.
    ///
    /// A path that is not in canonical form redirects to its canonical form first. Only then is
    /// the filesystem consulted. Any error opening the path counts as 'not found', and results
    /// in the index fallback.
    pub async fn resolve_path(&self, decoded_path: &str) -> ResolvedTarget<O::File> {
        let requested = RequestedPath::resolve(decoded_path);
        if requested.needs_redirect(decoded_path) {
            debug!(
                from = decoded_path,
                to = %requested.normalized,
                "redirecting to canonical path"
            );
            return ResolvedTarget::Redirect(requested.normalized);
        }

        let file = match self.opener.open(&requested.sanitized).await {
            Ok(file) => file,
            Err(err) => {
                debug!(path = %requested.sanitized.display(), %err, "falling back to index");
                return ResolvedTarget::ServeIndex;
            }
        };

        if file.metadata.is_dir {
            if requested.is_dir_request {
                return ResolvedTarget::ServeIndex;
            }
            let mut target = requested.normalized;
            target.push('/');
            return ResolvedTarget::Redirect(target);
        }

        if !file.metadata.is_file {
            return ResolvedTarget::ServeIndex;
        }

        ResolvedTarget::ServeFile(ResolvedFile::new(file, requested.sanitized))
    }

    /// Open the index resource.
    pub async fn resolve_index(&self) -> Result<ResolvedFile<O::File>, IoError> {
        let file = self.opener.open(&self.index).await?;
        if !file.metadata.is_file {
            return Err(IoError::new(
                IoErrorKind::NotFound,
                "index resource is not a regular file",
            ));
        }
        Ok(ResolvedFile::new(file, self.index.clone()))
    }

    /// Root-relative path of the index resource.
    pub fn index_path(&self) -> &Path {
        &self.index
    }
}

impl<O> Clone for Resolver<O> {
    fn clone(&self) -> Self {
        Self {
            opener: self.opener.clone(),
            index: self.index.clone(),
        }
    }
}

use std::{future::Future, path::PathBuf, pin::Pin};

use http::{HeaderValue, Method, Request, Response};
use tracing::{debug, warn};

use crate::{
    util::{decode_percents, Body, DEFAULT_SERVER_NAME},
    vfs::{FileOpener, TokioFileOpener},
    Error, ResolvedTarget, Resolver, ResponseBuilder,
};

/// High-level interface for serving static files.
///
/// This struct serves files from a single root path, which may be absolute or relative. The
/// request is mapped onto the filesystem by appending its decoded, normalized URL path to the
/// root path. Regular files are served with range and conditional request support. Directories
/// without a trailing slash redirect to the slashed form. Everything else, including paths that
/// don't exist, gets the index resource.
///
/// Only `GET` requests are handled. Other methods are answered with `405 Method Not Allowed`.
///
/// This struct also implements the `hyper::Service` trait, which simply wraps `Static::serve`.
pub struct Static<O = TokioFileOpener> {
    /// The resolver instance used to open files.
    pub resolver: Resolver<O>,
    /// Value of the `server` header.
    pub server_name: HeaderValue,
}

impl Static<TokioFileOpener> {
    /// Create a new instance of `Static` with a given root path.
    ///
    /// If `Path::new("")` is given, files will be served from the current directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_resolver(Resolver::new(root))
    }
}

impl<O: FileOpener> Static<O> {
    /// Create a new instance of `Static` with a custom file opener.
    pub fn with_opener(opener: O) -> Self {
        Self::with_resolver(Resolver::with_opener(opener))
    }

    /// Create a new instance of `Static` on top of an existing resolver.
    pub fn with_resolver(resolver: Resolver<O>) -> Self {
        Self {
            resolver,
            server_name: HeaderValue::from_static(DEFAULT_SERVER_NAME),
        }
    }

    /// Set the index resource, relative to the root. Defaults to `index.html`.
    pub fn index(mut self, path: impl Into<PathBuf>) -> Self {
        self.resolver.index = path.into();
        self
    }

    /// Set the value of the `server` response header.
    pub fn server_name(mut self, value: HeaderValue) -> Self {
        self.server_name = value;
        self
    }

    /// Serve a request.
    pub async fn serve<B>(self, request: Request<B>) -> Result<Response<Body<O::File>>, Error> {
        // The request body is never read.
        let (parts, _) = request.into_parts();
        let request = Request::from_parts(parts, ());

        let mut builder = ResponseBuilder::from_request(&request);
        builder.server_name(self.server_name.clone());

        if *request.method() != Method::GET {
            debug!(method = %request.method(), "method not allowed");
            return Ok(builder.build_method_not_allowed()?);
        }

        let path = decode_percents(request.uri().path());
        let response = match self.resolver.resolve_path(&path).await {
            ResolvedTarget::Redirect(target) => builder.build_redirect(&target)?,
            ResolvedTarget::ServeFile(file) => builder.build_file(file)?,
            ResolvedTarget::ServeIndex => match self.resolver.resolve_index().await {
                Ok(file) => builder.build_index(file)?,
                Err(err) => {
                    warn!(
                        index = %self.resolver.index_path().display(),
                        %err,
                        "cannot open index resource"
                    );
                    builder.build_not_found()?
                }
            },
        };

        debug!(%path, status = %response.status(), "served");
        Ok(response)
    }
}

impl<O> Clone for Static<O> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            server_name: self.server_name.clone(),
        }
    }
}

impl<O, B> hyper::service::Service<Request<B>> for Static<O>
where
    O: FileOpener,
    B: Send + 'static,
{
    type Response = Response<Body<O::File>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, request: Request<B>) -> Self::Future {
        Box::pin(self.clone().serve(request))
    }
}

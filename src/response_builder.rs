use http::{
    header, response::Builder as HttpResponseBuilder, HeaderValue, Request, Response, Result,
    StatusCode,
};

use crate::{
    resolve::ResolvedFile,
    util::{encode_path, method_not_allowed, Body, FileBytesStream, FileResponseBuilder},
};

/// Utility to build the default response for a resolved request.
///
/// This is a short-lived, per-request instance. The response headers for a request are built
/// exactly once, through one of the `build_*` methods.
#[derive(Clone, Debug)]
pub struct ResponseBuilder<'a> {
    /// Inner builder for file responses.
    pub file_response_builder: FileResponseBuilder,
    /// Query string of the request, kept on redirects.
    pub query: Option<&'a str>,
}

impl<'a> ResponseBuilder<'a> {
    /// Create a new builder for the given request.
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            file_response_builder: FileResponseBuilder::from_request(req),
            query: req.uri().query(),
        }
    }

    /// Set the `server` header value.
    pub fn server_name(&mut self, value: HeaderValue) -> &mut Self {
        self.file_response_builder.server_name(value);
        self
    }

    /// Build a `405 Method Not Allowed` response.
    pub fn build_method_not_allowed<F>(&self) -> Result<Response<Body<F>>> {
        method_not_allowed(&self.file_response_builder.server_name)
    }

    /// Build a permanent redirect to the given decoded path.
    pub fn build_redirect<F>(&self, path: &str) -> Result<Response<Body<F>>> {
        let mut target = encode_path(path);
        if let Some(query) = self.query {
            target.push('?');
            target.push_str(query);
        }

        HttpResponseBuilder::new()
            .status(StatusCode::MOVED_PERMANENTLY)
            .header(header::SERVER, self.file_response_builder.server_name.clone())
            .header(header::LOCATION, target)
            .body(Body::Empty)
    }

    /// Build a response for a resolved file, honoring range and conditional headers.
    pub fn build_file<F>(&self, file: ResolvedFile<F>) -> Result<Response<Body<F>>> {
        self.file_response_builder
            .build(file.handle, &file.metadata, file.content_type.as_ref())
    }

    /// Build a response streaming the whole index resource.
    ///
    /// Range and conditional headers are ignored for the index.
    pub fn build_index<F>(&self, file: ResolvedFile<F>) -> Result<Response<Body<F>>> {
        let size = file.metadata.size;
        let mut res = HttpResponseBuilder::new()
            .status(StatusCode::OK)
            .header(header::SERVER, self.file_response_builder.server_name.clone())
            .header(header::CONTENT_LENGTH, size);
        if let Some(ref content_type) = file.content_type {
            res = res.header(header::CONTENT_TYPE, content_type.as_ref());
        }
        res.body(Body::Full(FileBytesStream::new_with_limit(file.handle, size)))
    }

    /// Build a `404 Not Found` response, used only when the index resource itself is missing.
    pub fn build_not_found<F>(&self) -> Result<Response<Body<F>>> {
        HttpResponseBuilder::new()
            .status(StatusCode::NOT_FOUND)
            .header(header::SERVER, self.file_response_builder.server_name.clone())
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Body::message("Not Found"))
    }
}

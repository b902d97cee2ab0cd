use std::time::SystemTime;

use http::{
    header, response::Builder as ResponseBuilder, HeaderMap, HeaderValue, Method, Request,
    Response, Result, StatusCode,
};
use mime_guess::Mime;
use tracing::debug;

use crate::util::{
    is_not_modified, parse_range, Body, FileBytesStream, FileBytesStreamRange, RangeParseOutcome,
};
use crate::vfs::ResourceMetadata;

/// Value of the `server` header when none is configured.
pub const DEFAULT_SERVER_NAME: &str = "staticserve";

/// Utility to build responses for serving a file.
///
/// This struct allows direct access to its fields, but these fields are typically initialized by
/// the accessors, using the builder pattern. The fields are basically a bunch of settings that
/// determine the response details.
#[derive(Clone, Debug)]
pub struct FileResponseBuilder {
    /// Value of the `server` header.
    pub server_name: HeaderValue,
    /// Whether this is a `GET` request. Anything else is refused.
    pub is_get: bool,
    /// The `If-None-Match` request header.
    pub if_none_match: Option<HeaderValue>,
    /// The `If-Modified-Since` request header.
    pub if_modified_since: Option<HeaderValue>,
    /// The `Range` request header.
    pub range: Option<HeaderValue>,
}

impl Default for FileResponseBuilder {
    fn default() -> Self {
        Self {
            server_name: HeaderValue::from_static(DEFAULT_SERVER_NAME),
            is_get: true,
            if_none_match: None,
            if_modified_since: None,
            range: None,
        }
    }
}

impl FileResponseBuilder {
    /// Create a new builder with a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for the given request.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let mut builder = Self::new();
        builder.request_parts(req.method(), req.headers());
        builder
    }

    /// Apply parts of a request.
    pub fn request_parts(&mut self, method: &Method, headers: &HeaderMap) -> &mut Self {
        self.method(method);
        self.if_none_match = headers.get(header::IF_NONE_MATCH).cloned();
        self.if_modified_since = headers.get(header::IF_MODIFIED_SINCE).cloned();
        self.range = headers.get(header::RANGE).cloned();
        self
    }

    /// Build responses for the given request method.
    pub fn method(&mut self, value: &Method) -> &mut Self {
        self.is_get = *value == Method::GET;
        self
    }

    /// Set the `server` header value.
    pub fn server_name(&mut self, value: HeaderValue) -> &mut Self {
        self.server_name = value;
        self
    }

    /// Build a response for the given file handle and metadata.
    ///
    /// The content type is normally guessed from the file name. When `None`, no `Content-Type`
    /// header is sent.
    pub fn build<F>(
        &self,
        file: F,
        metadata: &ResourceMetadata,
        content_type: Option<&Mime>,
    ) -> Result<Response<Body<F>>> {
        if !self.is_get {
            return method_not_allowed(&self.server_name);
        }

        let mut res = ResponseBuilder::new()
            .header(header::SERVER, self.server_name.clone())
            .header(header::ACCEPT_RANGES, "bytes");
        if let Some(accessed) = metadata.accessed {
            res = res.header(header::DATE, http_date(accessed));
        }
        if let Some(modified) = metadata.modified {
            res = res.header(header::LAST_MODIFIED, http_date(modified));
        }

        if is_not_modified(
            self.if_none_match.as_ref(),
            self.if_modified_since.as_ref(),
            metadata.modified,
        ) {
            debug!("not modified");
            return res.status(StatusCode::NOT_MODIFIED).body(Body::Empty);
        }

        if let Some(content_type) = content_type {
            res = res.header(header::CONTENT_TYPE, content_type.as_ref());
        }

        let size = metadata.size;
        let range = match self.range {
            Some(ref value) if size > 0 => value
                .to_str()
                .map_or(RangeParseOutcome::Unparseable, |v| parse_range(v, size)),
            _ => RangeParseOutcome::Unparseable,
        };

        match range {
            RangeParseOutcome::Parsed(range) => {
                let Some((start, length)) = range.clamp(size) else {
                    debug!(?range, size, "range not satisfiable");
                    return res
                        .status(StatusCode::RANGE_NOT_SATISFIABLE)
                        .header(header::CONTENT_RANGE, format!("bytes */{size}"))
                        .body(Body::Empty);
                };
                let end = start + length - 1;
                debug!(start, end, size, "serving partial content");
                res.status(StatusCode::PARTIAL_CONTENT)
                    .header(header::CONTENT_RANGE, format!("bytes {start}-{end}/{size}"))
                    .header(header::CONTENT_LENGTH, length)
                    .body(Body::Range(FileBytesStreamRange::new(file, start, length)))
            }
            RangeParseOutcome::Unparseable => res
                .status(StatusCode::OK)
                .header(header::CONTENT_LENGTH, size)
                .body(Body::Full(FileBytesStream::new_with_limit(file, size))),
        }
    }
}

/// Build a `405 Method Not Allowed` response.
pub(crate) fn method_not_allowed<F>(server_name: &HeaderValue) -> Result<Response<Body<F>>> {
    ResponseBuilder::new()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(header::SERVER, server_name.clone())
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::message("Method Not Allowed"))
}

fn http_date(time: SystemTime) -> String {
    httpdate::fmt_http_date(time)
}

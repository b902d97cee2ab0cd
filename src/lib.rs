#![crate_name = "hyper_staticserve"]
#![deny(missing_docs)]

//! Static file serving for [Hyper 1.0](https://github.com/hyperium/hyper), with single-page
//! application style index fallback.
//!
//! ## Basic usage
//!
//! The `Static` type holds a root directory and an index resource, and a `serve` method to handle
//! a request. It also implements the `hyper::service::Service` trait.
//!
//! ```rust
//! # #[tokio::main]
//! # async fn main() {
//! let static_ = hyper_staticserve::Static::new("my/doc/root/").index("index.html");
//!
//! // A dummy request, but normally obtained from Hyper.
//! let request = http::Request::get("/foo/bar.txt")
//!     .body(())
//!     .unwrap();
//!
//! let response = static_.serve(request).await.unwrap();
//! # drop(response);
//! # }
//! ```
//!
//! ## How requests are answered
//!
//! Only `GET` is served; other methods get `405 Method Not Allowed`. The percent-decoded path is
//! normalized first, and a non-canonical path (`/a//b`, `/a/../b`) is redirected to its canonical
//! form. The path is then looked up under the root:
//!
//! - a regular file is served, with `Range` and `If-Modified-Since` support;
//! - a directory requested without a trailing slash redirects to the slashed path;
//! - anything else, including a path that does not exist, gets the index resource.
//!
//! The `Resolver` performs the lookup and returns a `ResolvedTarget`. The `ResponseBuilder` turns
//! that into a response, and uses `FileResponseBuilder` for files. Bodies are streamed by
//! `FileBytesStream` and `FileBytesStreamRange`, which work on anything implementing `AsyncRead`
//! and `AsyncSeek`.
//!
//! Entity tags are not supported. A request carrying `If-None-Match` is always served in full.

mod error;
mod resolve;
mod response_builder;
mod service;
mod util;

/// Filesystem abstraction used to open files.
pub mod vfs;

pub use crate::error::*;
pub use crate::resolve::*;
pub use crate::response_builder::*;
pub use crate::service::*;
pub use crate::util::{
    is_not_modified, normalize_url_path, parse_range, Body, ByteRange, FileBytesStream,
    FileBytesStreamRange, FileResponseBuilder, RangeParseOutcome, DEFAULT_SERVER_NAME,
};

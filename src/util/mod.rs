mod body;
mod conditional;
mod file_bytes_stream;
mod file_response_builder;
mod range;
mod requested_path;

pub use self::body::*;
pub use self::conditional::*;
pub use self::file_bytes_stream::*;
pub use self::file_response_builder::*;
pub use self::range::*;
pub use self::requested_path::normalize_url_path;

pub(crate) use self::requested_path::*;
pub(crate) use self::file_response_builder::method_not_allowed;

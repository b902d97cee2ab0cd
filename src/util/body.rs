use std::{
    io::Error as IoError,
    pin::Pin,
    task::{ready, Context, Poll},
};

use futures_util::stream::Stream;
use hyper::body::{Bytes, Frame};
use tokio::{
    fs::File,
    io::{AsyncRead, AsyncSeek},
};

use crate::util::{FileBytesStream, FileBytesStreamRange};

/// Hyper Body implementation for the various types of streams used in static serving.
pub enum Body<F = File> {
    /// No response body.
    Empty,
    /// A short in-memory message, such as the text of an error response.
    Message(Option<Bytes>),
    /// Serve a complete file.
    Full(FileBytesStream<F>),
    /// Serve a range from a file.
    Range(FileBytesStreamRange<F>),
}

impl<F> Body<F> {
    /// Create a body holding a static text message.
    pub fn message(text: &'static str) -> Self {
        Body::Message(Some(Bytes::from_static(text.as_bytes())))
    }
}

impl<F> hyper::body::Body for Body<F>
where
    F: AsyncRead + AsyncSeek + Unpin,
{
    type Data = Bytes;
    type Error = IoError;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, IoError>>> {
        let opt = ready!(match *self {
            Body::Empty => return Poll::Ready(None),
            Body::Message(ref mut data) => {
                return Poll::Ready(data.take().map(|data| Ok(Frame::data(data))));
            }
            Body::Full(ref mut stream) => Pin::new(stream).poll_next(cx),
            Body::Range(ref mut stream) => Pin::new(stream).poll_next(cx),
        });
        Poll::Ready(opt.map(|res| res.map(Frame::data)))
    }

    fn is_end_stream(&self) -> bool {
        match *self {
            Body::Empty => true,
            Body::Message(ref data) => data.is_none(),
            _ => false,
        }
    }
}

use std::{
    cmp::min,
    io::{Error as IoError, SeekFrom},
    mem::MaybeUninit,
    pin::Pin,
    task::{Context, Poll},
};

use futures_util::stream::Stream;
use hyper::body::Bytes;
use tokio::{
    fs::File,
    io::{AsyncRead, AsyncSeek, ReadBuf},
};

const BUF_SIZE: usize = 8 * 1024;

/// Wraps an `AsyncRead`, like a tokio `File`, and implements a stream of `Bytes`s.
///
/// The stream is single-pass. Dropping it closes the underlying file.
pub struct FileBytesStream<F = File> {
    file: F,
    buf: Box<[MaybeUninit<u8>; BUF_SIZE]>,
    remaining: u64,
}

impl<F> FileBytesStream<F> {
    /// Create a new stream from the given file.
    pub fn new(file: F) -> Self {
        Self::new_with_limit(file, u64::MAX)
    }

    /// Create a new stream from the given file, reading up to `limit` bytes.
    pub fn new_with_limit(file: F, limit: u64) -> Self {
        Self {
            file,
            buf: Box::new([MaybeUninit::uninit(); BUF_SIZE]),
            remaining: limit,
        }
    }
}

impl<F> Stream for FileBytesStream<F>
where
    F: AsyncRead + Unpin,
{
    type Item = Result<Bytes, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>> {
        let Self {
            ref mut file,
            ref mut buf,
            ref mut remaining,
        } = *self;

        if *remaining == 0 {
            return Poll::Ready(None);
        }

        let max_read_length = min(*remaining, buf.len() as u64) as usize;
        let mut read_buf = ReadBuf::uninit(&mut buf[..max_read_length]);
        match Pin::new(file).poll_read(cx, &mut read_buf) {
            Poll::Ready(Ok(())) => {
                let filled = read_buf.filled();
                *remaining -= filled.len() as u64;
                if filled.is_empty() {
                    Poll::Ready(None)
                } else {
                    Poll::Ready(Some(Ok(Bytes::copy_from_slice(filled))))
                }
            }
            Poll::Ready(Err(e)) => Poll::Ready(Some(Err(e))),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[derive(PartialEq, Eq)]
enum FileSeekState {
    NeedSeek,
    Seeking,
    Reading,
}

/// Wraps an `AsyncRead + AsyncSeek`, like a tokio `File`, and implements a stream of `Bytes`s
/// producing at most `length` bytes starting at `start`.
pub struct FileBytesStreamRange<F = File> {
    file_stream: FileBytesStream<F>,
    seek_state: FileSeekState,
    start_offset: u64,
}

impl<F> FileBytesStreamRange<F> {
    /// Create a new stream reading `length` bytes of `file` from offset `start`.
    pub fn new(file: F, start: u64, length: u64) -> Self {
        Self {
            file_stream: FileBytesStream::new_with_limit(file, length),
            seek_state: FileSeekState::NeedSeek,
            start_offset: start,
        }
    }
}

impl<F> Stream for FileBytesStreamRange<F>
where
    F: AsyncRead + AsyncSeek + Unpin,
{
    type Item = Result<Bytes, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>> {
        let Self {
            ref mut file_stream,
            ref mut seek_state,
            start_offset,
        } = *self;
        if *seek_state == FileSeekState::NeedSeek {
            *seek_state = FileSeekState::Seeking;
            if let Err(e) =
                Pin::new(&mut file_stream.file).start_seek(SeekFrom::Start(start_offset))
            {
                return Poll::Ready(Some(Err(e)));
            }
        }
        if *seek_state == FileSeekState::Seeking {
            match Pin::new(&mut file_stream.file).poll_complete(cx) {
                Poll::Ready(Ok(..)) => *seek_state = FileSeekState::Reading,
                Poll::Ready(Err(e)) => return Poll::Ready(Some(Err(e))),
                Poll::Pending => return Poll::Pending,
            }
        }
        Pin::new(file_stream).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use futures_util::StreamExt;

    use super::*;

    async fn collect<S>(mut stream: S) -> Vec<u8>
    where
        S: Stream<Item = Result<Bytes, IoError>> + Unpin,
    {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    fn data() -> Bytes {
        (0..=255u8).cycle().take(20_000).collect::<Vec<_>>().into()
    }

    #[tokio::test]
    async fn streams_whole_file_in_chunks() {
        let out = collect(FileBytesStream::new(Cursor::new(data()))).await;
        assert_eq!(out, data());
    }

    #[tokio::test]
    async fn stops_at_limit() {
        let out = collect(FileBytesStream::new_with_limit(Cursor::new(data()), 10)).await;
        assert_eq!(out, &data()[..10]);
    }

    #[tokio::test]
    async fn range_seeks_and_bounds() {
        let out = collect(FileBytesStreamRange::new(Cursor::new(data()), 9_000, 9_500)).await;
        assert_eq!(out, &data()[9_000..18_500]);
    }

    #[tokio::test]
    async fn range_past_end_is_short() {
        let out = collect(FileBytesStreamRange::new(Cursor::new(data()), 19_990, 100)).await;
        assert_eq!(out, &data()[19_990..]);
    }
}

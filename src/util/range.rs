/// An inclusive byte interval requested through a `Range` header.
///
/// The interval is not clamped to the resource. In particular, a suffix request for more bytes
/// than the resource holds results in a negative `start`. Validity is checked by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset.
    pub start: i64,
    /// Last byte offset, inclusive.
    pub end: i64,
}

impl ByteRange {
    /// Whether this range can be served from a resource of `size` bytes.
    ///
    /// A negative start is acceptable, and is clamped to zero when serving.
    pub fn is_satisfiable(&self, size: u64) -> bool {
        let size = i64::try_from(size).unwrap_or(i64::MAX);
        self.end >= 0 && self.end >= self.start && self.start < size
    }

    /// Clamp to a resource of `size` bytes, returning the offset and length to read.
    ///
    /// Returns `None` if the range is not satisfiable.
    pub fn clamp(&self, size: u64) -> Option<(u64, u64)> {
        if !self.is_satisfiable(size) {
            return None;
        }
        let start = self.start.max(0) as u64;
        let end = (self.end as u64).min(size - 1);
        Some((start, end - start + 1))
    }
}

/// Result of parsing a `Range` header value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeParseOutcome {
    /// The header describes a single byte interval.
    Parsed(ByteRange),
    /// The header does not match the single-interval `bytes=` grammar.
    Unparseable,
}

fn parse_offset(value: &str) -> Option<Option<i64>> {
    if value.is_empty() {
        return Some(None);
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok().map(Some)
}

/// Parse a `Range` header value against a resource of `size` bytes.
///
/// Only a single interval is accepted: `bytes=<start>-<end>`, `bytes=<start>-` or
/// `bytes=-<suffix>`. Everything else, including multiple comma-separated intervals, is
/// `Unparseable`.
pub fn parse_range(header: &str, size: u64) -> RangeParseOutcome {
    let Some(interval) = header.strip_prefix("bytes=") else {
        return RangeParseOutcome::Unparseable;
    };
    let Some((start, end)) = interval.split_once('-') else {
        return RangeParseOutcome::Unparseable;
    };
    let (Some(start), Some(end)) = (parse_offset(start), parse_offset(end)) else {
        return RangeParseOutcome::Unparseable;
    };

    let size = i64::try_from(size).unwrap_or(i64::MAX);
    let range = match (start, end) {
        (Some(start), Some(end)) => ByteRange { start, end },
        (Some(start), None) => ByteRange {
            start,
            end: size - 1,
        },
        (None, Some(suffix)) => ByteRange {
            start: size - suffix,
            end: size - 1,
        },
        (None, None) => return RangeParseOutcome::Unparseable,
    };
    RangeParseOutcome::Parsed(range)
}

//! A response sink that remembers what went through it.

use std::io;

use http::{HeaderMap, StatusCode};

use crate::response::ResponseWriter;

/// What an [`ObservedWriter`] has seen so far.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Recorded {
    /// Last status written, or `200 OK` if none was.
    pub status: StatusCode,
    /// Body bytes accepted by the inner sink.
    pub size: usize,
}

/// Wraps a sink and records the status and body size written through it.
///
/// Everything is forwarded to the inner sink unchanged; the only visible
/// difference is that [`recorded`](ResponseWriter::recorded) returns `Some`.
/// [`Chain`](super::Chain) installs one per request unless told otherwise.
pub struct ObservedWriter<'w> {
    inner: &'w mut dyn ResponseWriter,
    status: StatusCode,
    size: usize,
}

impl<'w> ObservedWriter<'w> {
    pub fn new(inner: &'w mut dyn ResponseWriter) -> Self {
        Self { inner, status: StatusCode::OK, size: 0 }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn size(&self) -> usize { self.size }
}

impl ResponseWriter for ObservedWriter<'_> {
    fn headers(&self) -> &HeaderMap { self.inner.headers() }

    fn headers_mut(&mut self) -> &mut HeaderMap { self.inner.headers_mut() }

    fn write_header(&mut self, status: StatusCode) {
        self.status = status;
        self.inner.write_header(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.size += n;
        Ok(n)
    }

    fn recorded(&self) -> Option<Recorded> {
        Some(Recorded { status: self.status, size: self.size })
    }
}

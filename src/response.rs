//! The response sink every chain link writes into, the buffer the server
//! hands to the chain, and a small [`Response`] value for one-line replies.

use std::io;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;

use crate::middleware::Recorded;

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// Where a handler or middleware writes its response.
///
/// Status and body are written in place rather than returned, so an outer
/// middleware can run more code after its continuation and still see what
/// the inner links produced (through [`recorded`](ResponseWriter::recorded)).
pub trait ResponseWriter: Send {
    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Sets the response status. Calling it again replaces the previous value.
    fn write_header(&mut self, status: StatusCode);

    /// Appends body bytes and returns how many were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Status and byte count observed so far, if this sink records them.
    ///
    /// Plain sinks return `None`. [`ObservedWriter`](crate::middleware::ObservedWriter)
    /// returns `Some`, and so does anything that delegates to one.
    fn recorded(&self) -> Option<Recorded> {
        None
    }

    /// Writes the whole of `buf`, retrying short writes.
    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write(buf)? {
                0 => return Err(io::ErrorKind::WriteZero.into()),
                n => buf = &buf[n..],
            }
        }
        Ok(())
    }
}

// ── ResponseBuffer ────────────────────────────────────────────────────────────

/// In-memory [`ResponseWriter`] used by [`Server`](crate::Server) for each
/// request. Also handy for driving a chain directly in tests.
///
/// Status defaults to `200 OK`; the last [`write_header`](ResponseWriter::write_header)
/// wins because nothing is sent until the chain has finished.
#[derive(Debug)]
pub struct ResponseBuffer {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), body: Vec::new() }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Converts the buffered state into a response hyper can send.
    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl Default for ResponseBuffer {
    fn default() -> Self { Self::new() }
}

impl ResponseWriter for ResponseBuffer {
    fn headers(&self) -> &HeaderMap { &self.headers }

    fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    fn write_header(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    Csv,          // text/csv
    EventStream,  // text/event-stream  (SSE)
    FormData,     // application/x-www-form-urlencoded
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::EventStream => "text/event-stream",
            Self::FormData    => "application/x-www-form-urlencoded",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// A complete response value, written into a sink with [`Response::write_to`].
///
/// ```rust
/// use strata::{Response, ResponseBuffer};
/// use http::StatusCode;
///
/// let mut out = ResponseBuffer::new();
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec())
///     .write_to(&mut out)
///     .unwrap();
///
/// assert_eq!(out.status(), StatusCode::CREATED);
/// ```
#[derive(Debug)]
pub struct Response {
    body: Vec<u8>,
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl Response {
    /// `200 OK` — `application/json`.
    pub fn json(body: Vec<u8>) -> Self {
        Self::bytes_raw("application/json", body)
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::bytes_raw("text/plain; charset=utf-8", body.into().into_bytes())
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self { body: Vec::new(), headers: Vec::new(), status: code }
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: StatusCode::OK }
    }

    fn bytes_raw(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            body,
            headers: vec![("content-type".to_owned(), content_type.to_owned())],
            status: StatusCode::OK,
        }
    }

    /// Copies headers, status, and body into `w`.
    ///
    /// Each header this response carries replaces any value `w` already has
    /// under that name; repeated [`ResponseBuilder::header`] calls for one
    /// name stay multi-valued. Headers are validated before `w` is touched.
    ///
    /// Fails with [`io::ErrorKind::InvalidInput`] if a header name or value
    /// is not valid HTTP, and otherwise with whatever `w` reports.
    pub fn write_to(self, w: &mut dyn ResponseWriter) -> io::Result<()> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            headers.append(name, value);
        }

        let out = w.headers_mut();
        for name in headers.keys() {
            out.remove(name);
        }
        out.extend(headers);

        w.write_header(self.status);
        w.write_all(&self.body)
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`]. Defaults to `200 OK`.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish("application/json", body)
    }

    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish("text/plain; charset=utf-8", body.into().into_bytes())
    }

    /// Terminate with a typed body. Use this for XML, HTML, binary, SSE, etc.
    pub fn bytes(self, content_type: ContentType, body: Vec<u8>) -> Response {
        self.finish(content_type.as_str(), body)
    }

    pub fn no_body(self) -> Response {
        Response { body: Vec::new(), headers: self.headers, status: self.status }
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_defaults_to_ok_and_empty() {
        let buf = ResponseBuffer::new();
        assert_eq!(buf.status(), StatusCode::OK);
        assert!(buf.body().is_empty());
        assert!(buf.recorded().is_none());
    }

    #[test]
    fn buffer_keeps_last_status_and_appends_body() {
        let mut buf = ResponseBuffer::new();
        buf.write_header(StatusCode::NOT_FOUND);
        buf.write_header(StatusCode::INTERNAL_SERVER_ERROR);
        buf.write_all(b"abc").unwrap();
        buf.write_all(b"de").unwrap();
        assert_eq!(buf.body(), b"abcde");

        let res = buf.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn write_to_copies_everything() {
        let mut buf = ResponseBuffer::new();
        Response::builder()
            .status(StatusCode::ACCEPTED)
            .header("x-request-id", "7")
            .bytes(ContentType::Xml, b"<ok/>".to_vec())
            .write_to(&mut buf)
            .unwrap();

        assert_eq!(buf.status(), StatusCode::ACCEPTED);
        assert_eq!(buf.headers()["content-type"], "application/xml");
        assert_eq!(buf.headers()["x-request-id"], "7");
        assert_eq!(buf.body(), b"<ok/>");
    }

    #[test]
    fn write_to_rejects_bad_header_names() {
        let mut buf = ResponseBuffer::new();
        let err = Response::builder()
            .header("bad header", "x")
            .no_body()
            .write_to(&mut buf)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn writing_twice_replaces_headers_instead_of_duplicating() {
        let mut buf = ResponseBuffer::new();
        Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .text("no")
            .write_to(&mut buf)
            .unwrap();
        Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .json(b"{}".to_vec())
            .write_to(&mut buf)
            .unwrap();

        let types: Vec<_> = buf.headers().get_all("content-type").iter().collect();
        assert_eq!(types, ["application/json"]);
        assert_eq!(buf.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn repeated_builder_headers_stay_multi_valued() {
        let mut buf = ResponseBuffer::new();
        buf.headers_mut().insert("vary", HeaderValue::from_static("cookie"));
        Response::builder()
            .header("vary", "accept")
            .header("vary", "origin")
            .no_body()
            .write_to(&mut buf)
            .unwrap();

        let vary: Vec<_> = buf.headers().get_all("vary").iter().collect();
        assert_eq!(vary, ["accept", "origin"]);
    }

    #[test]
    fn invalid_header_leaves_the_sink_untouched() {
        let mut buf = ResponseBuffer::new();
        Response::builder()
            .header("x-ok", "1")
            .header("bad header", "x")
            .no_body()
            .write_to(&mut buf)
            .unwrap_err();
        assert!(buf.headers().is_empty());
    }

    #[test]
    fn status_only_response_has_no_body() {
        let mut buf = ResponseBuffer::new();
        Response::status(StatusCode::NO_CONTENT).write_to(&mut buf).unwrap();
        assert_eq!(buf.status(), StatusCode::NO_CONTENT);
        assert!(buf.body().is_empty());
        assert!(buf.headers().is_empty());
    }
}

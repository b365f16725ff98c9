//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Stages and handlers build a [`Response`] and return it; the server turns
//! it into the hyper representation at the very edge. That is the entire job
//! description.

use bytes::Bytes;
use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http_body_util::Full;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    Css,         // text/css
    Html,        // text/html; charset=utf-8
    Json,        // application/json
    OctetStream, // application/octet-stream
    Text,        // text/plain; charset=utf-8
    Xml,         // application/xml
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "text/css",
            Self::Html => "text/html; charset=utf-8",
            Self::Json => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text => "text/plain; charset=utf-8",
            Self::Xml => "application/xml",
        }
    }
}

// ── Response ──────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use frogsystem::Response;
/// use http::StatusCode;
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::html("<h1>hello</h1>");
/// Response::status(StatusCode::NO_CONTENT);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use frogsystem::Response;
/// use http::StatusCode;
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl Response {
    /// `200 OK`, `application/json`. Pass bytes from your serializer.
    pub fn json(body: Vec<u8>) -> Self {
        Self::with_content_type("application/json", body.into())
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_content_type("text/plain; charset=utf-8", body.into().into())
    }

    /// `200 OK`, `text/html; charset=utf-8`.
    pub fn html(body: impl Into<String>) -> Self {
        Self::with_content_type("text/html; charset=utf-8", body.into().into())
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self {
            status: code,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    fn with_content_type(content_type: &'static str, body: Bytes) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self {
            status: StatusCode::OK,
            headers,
            body,
        }
    }

    /// Conversion into the hyper representation. Only the server edge needs
    /// this.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`. Terminated by a
/// typed body method.
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// Appends a header.
    ///
    /// # Panics
    ///
    /// Panics on an invalid header name or value. Headers are assembled at
    /// build time from literals; a bad one is a programming error, caught
    /// the same way an invalid route pattern is.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let header = HeaderName::from_bytes(name.as_bytes())
            .unwrap_or_else(|e| panic!("invalid header name `{name}`: {e}"));
        let value = HeaderValue::from_str(value)
            .unwrap_or_else(|e| panic!("invalid value for header `{name}`: {e}"));
        self.headers.append(header, value);
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(HeaderValue::from_static("application/json"), body.into())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(
            HeaderValue::from_static("text/plain; charset=utf-8"),
            body.into().into(),
        )
    }

    /// Terminate with an HTML body (`text/html; charset=utf-8`).
    pub fn html(self, body: impl Into<String>) -> Response {
        self.finish(
            HeaderValue::from_static("text/html; charset=utf-8"),
            body.into().into(),
        )
    }

    /// Terminate with a typed body.
    pub fn bytes(self, content_type: ContentType, body: Vec<u8>) -> Response {
        self.finish(HeaderValue::from_static(content_type.as_str()), body.into())
    }

    /// Terminate with a raw body and an arbitrary content type.
    ///
    /// # Panics
    ///
    /// Panics if `content_type` is not a valid header value.
    pub fn body(self, content_type: &str, body: Vec<u8>) -> Response {
        let value = HeaderValue::from_str(content_type)
            .unwrap_or_else(|e| panic!("invalid content type `{content_type}`: {e}"));
        self.finish(value, body.into())
    }

    /// Terminate with no body.
    pub fn no_body(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: Bytes::new(),
        }
    }

    fn finish(mut self, content_type: HeaderValue, body: Bytes) -> Response {
        self.headers.entry(CONTENT_TYPE).or_insert(content_type);
        Response {
            status: self.status,
            headers: self.headers,
            body,
        }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Infallible conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them from handlers, directly or as
/// the `Ok` side of an [`Outcome`](crate::Outcome).
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

/// Return a status directly from a handler: `return StatusCode::NOT_FOUND`.
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response {
        Response::status(self)
    }
}

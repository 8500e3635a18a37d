use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// `<crate name>/<crate version>`, sent in every `Server` header.
pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// HTTP status codes this server produces.
///
/// - `Ok` (200): the file is sent
/// - `NotFound` (404): nothing servable at the path
/// - `MethodNotAllowed` (405): POST
/// - `NotImplemented` (501): any method other than GET, HEAD or POST
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use sentinel_httpd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use sentinel_httpd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotImplemented.reason_phrase(), "Not Implemented");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }

    fn explanation(&self) -> &'static str {
        match self {
            StatusCode::Ok => "",
            StatusCode::NotFound => "The requested file was not found on this server.",
            StatusCode::MethodNotAllowed => "The requested method is not allowed for this resource.",
            StatusCode::NotImplemented => "The requested method is not implemented by this server.",
        }
    }
}

/// What follows the header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Empty,
    Bytes(Vec<u8>),
    /// Streamed from disk by the writer.
    File { path: PathBuf, len: u64 },
}

impl Body {
    pub fn len(&self) -> u64 {
        match self {
            Body::Empty => 0,
            Body::Bytes(bytes) => bytes.len() as u64,
            Body::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Minor version echoed in the status line
    pub minor_version: u32,
    /// Headers in emission order
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl Response {
    /// Retrieves a header value by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// A short HTML page naming the status.
    pub fn error(status: StatusCode, minor_version: u32) -> ResponseBuilder {
        ResponseBuilder::new(status)
            .version(minor_version)
            .header("Content-Type", "text/html")
            .body(Body::Bytes(error_page(status).into_bytes()))
    }

    pub fn not_found(minor_version: u32) -> ResponseBuilder {
        Self::error(StatusCode::NotFound, minor_version)
    }

    pub fn method_not_allowed(minor_version: u32) -> ResponseBuilder {
        Self::error(StatusCode::MethodNotAllowed, minor_version)
    }

    pub fn not_implemented(minor_version: u32) -> ResponseBuilder {
        Self::error(StatusCode::NotImplemented, minor_version)
    }
}

fn error_page(status: StatusCode) -> String {
    let title = format!("{} {}", status.as_u16(), status.reason_phrase());
    format!(
        "<html>\r\n<head><title>{title}</title></head>\r\n<body>\r\n<h1>{title}</h1>\r\n<p>{}</p>\r\n</body>\r\n</html>\r\n",
        status.explanation()
    )
}

/// Formats a timestamp the way the `Date` header wants it (RFC 1123, GMT).
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// Every response starts with `Date`, `Server` and `Connection: close`, in
/// that order.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/plain")
///     .body(Body::Bytes(b"hi".to_vec()))
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    minor_version: u32,
    headers: Vec<(String, String)>,
    body: Body,
    omit_body: bool,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self::at(status, Utc::now())
    }

    /// Same as [`ResponseBuilder::new`] with a fixed `Date`.
    pub fn at(status: StatusCode, now: DateTime<Utc>) -> Self {
        let headers = vec![
            ("Date".to_string(), http_date(now)),
            ("Server".to_string(), SERVER_NAME.to_string()),
            ("Connection".to_string(), "close".to_string()),
        ];

        Self {
            status,
            minor_version: 1,
            headers,
            body: Body::Empty,
            omit_body: false,
        }
    }

    pub fn version(mut self, minor_version: u32) -> Self {
        self.minor_version = minor_version;
        self
    }

    /// Adds a header, replacing any earlier one with the same name.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();

        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(existing) => existing.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Keeps the headers describing the body but sends no body bytes (HEAD).
    pub fn omit_body(mut self) -> Self {
        self.omit_body = true;
        self
    }

    /// Builds the final Response.
    ///
    /// Adds `Content-Length` from the body size unless one was set explicitly.
    pub fn build(mut self) -> Response {
        if !self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("Content-Length")) {
            let len = self.body.len();
            self.headers.push(("Content-Length".to_string(), len.to_string()));
        }

        let body = if self.omit_body { Body::Empty } else { self.body };

        Response {
            status: self.status,
            minor_version: self.minor_version,
            headers: self.headers,
            body,
        }
    }
}

use sentinel_httpd::error::{BodyError, ProtocolError, RequestError};
use sentinel_httpd::http::parser::{MAX_LINE_LENGTH, parse_header_line, parse_request_line};
use sentinel_httpd::http::reader::read_request;
use sentinel_httpd::http::request::Method;

const LIMIT: u64 = 1024;

async fn parse(raw: &[u8]) -> Result<sentinel_httpd::http::request::Request, RequestError> {
    let mut input = raw;
    read_request(&mut input, LIMIT).await
}

#[tokio::test]
async fn test_parse_simple_get_request() {
    let parsed = parse(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n").await.unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "/");
    assert_eq!(parsed.minor_version, 1);
    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert!(parsed.body.is_empty());
}

#[tokio::test]
async fn test_parse_post_request_with_body() {
    let parsed = parse(b"POST /api HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello")
        .await
        .unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.path, "/api");
    assert_eq!(parsed.body, b"hello".to_vec());
}

#[tokio::test]
async fn test_parse_body_stops_at_content_length() {
    let mut input: &[u8] = b"POST / HTTP/1.0\r\nContent-Length: 3\r\n\r\nabcdef";
    let parsed = read_request(&mut input, LIMIT).await.unwrap();

    assert_eq!(parsed.body, b"abc".to_vec());
    assert_eq!(input, b"def");
}

#[tokio::test]
async fn test_parse_headers_keep_arrival_order() {
    let parsed = parse(b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n")
        .await
        .unwrap();

    let names: Vec<&str> = parsed.headers.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, ["Host", "User-Agent", "Accept"]);
    assert_eq!(parsed.header("Accept"), Some("*/*"));
}

#[tokio::test]
async fn test_parse_accepts_bare_lf_lines() {
    let parsed = parse(b"GET /a HTTP/1.0\nHost: x\n\n").await.unwrap();

    assert_eq!(parsed.path, "/a");
    assert_eq!(parsed.header("host"), Some("x"));
}

#[tokio::test]
async fn test_parse_lowercase_method_is_uppercased() {
    let parsed = parse(b"get / HTTP/1.0\r\n\r\n").await.unwrap();
    assert_eq!(parsed.method, Method::GET);
}

#[tokio::test]
async fn test_parse_unknown_method_is_kept() {
    let parsed = parse(b"BREW /pot HTTP/1.1\r\n\r\n").await.unwrap();
    assert_eq!(parsed.method, Method::Extension("BREW".to_string()));
}

#[tokio::test]
async fn test_parse_empty_stream_has_no_request_line() {
    let err = parse(b"").await.unwrap_err();

    assert!(matches!(err, RequestError::Protocol(ProtocolError::MissingRequestLine)));
    assert!(err.is_empty_connection());
}

#[tokio::test]
async fn test_parse_request_line_missing_spaces() {
    let err = parse(b"GET/HTTP/1.1\r\n\r\n").await.unwrap_err();
    assert!(matches!(err, RequestError::Protocol(ProtocolError::MalformedRequestLine(_))));

    let err = parse(b"GET /\r\n\r\n").await.unwrap_err();
    assert!(matches!(err, RequestError::Protocol(ProtocolError::MalformedRequestLine(_))));
}

#[tokio::test]
async fn test_parse_rejects_other_protocols() {
    for raw in [
        &b"GET / HTTP/2.0\r\n\r\n"[..],
        b"GET / HTTP/1.\r\n\r\n",
        b"GET / HTTP/1.x\r\n\r\n",
        b"GET / FTP\r\n\r\n",
    ] {
        let err = parse(raw).await.unwrap_err();
        assert!(matches!(err, RequestError::Protocol(ProtocolError::InvalidProtocol(_))));
    }
}

#[tokio::test]
async fn test_parse_rejects_relative_path() {
    let err = parse(b"GET index.html HTTP/1.0\r\n\r\n").await.unwrap_err();
    assert!(matches!(err, RequestError::Protocol(ProtocolError::InvalidPath(_))));
}

#[tokio::test]
async fn test_parse_malformed_header() {
    let err = parse(b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n").await.unwrap_err();
    assert!(matches!(err, RequestError::Protocol(ProtocolError::MalformedHeader(_))));
}

#[tokio::test]
async fn test_parse_missing_blank_line() {
    let err = parse(b"GET / HTTP/1.1\r\nHost: example.com\r\n").await.unwrap_err();
    assert!(matches!(err, RequestError::Protocol(ProtocolError::UnterminatedHeader)));
}

#[tokio::test]
async fn test_parse_line_too_long() {
    let mut raw = b"GET /".to_vec();
    raw.extend(std::iter::repeat_n(b'a', MAX_LINE_LENGTH));
    raw.extend_from_slice(b" HTTP/1.0\r\n\r\n");

    let err = parse(&raw).await.unwrap_err();
    assert!(matches!(err, RequestError::Protocol(ProtocolError::LineTooLong { .. })));
}

#[tokio::test]
async fn test_parse_line_at_exact_limit() {
    let prefix = b"GET /";
    let suffix = b" HTTP/1.0\r\n";
    let mut raw = prefix.to_vec();
    raw.extend(std::iter::repeat_n(b'a', MAX_LINE_LENGTH - prefix.len() - suffix.len()));
    raw.extend_from_slice(suffix);
    assert_eq!(raw.len(), MAX_LINE_LENGTH);
    raw.extend_from_slice(b"\r\n");

    let parsed = parse(&raw).await.unwrap();
    assert_eq!(parsed.path.len(), MAX_LINE_LENGTH - 4 - suffix.len());
    assert_eq!(parsed.minor_version, 0);
}

#[tokio::test]
async fn test_parse_line_one_past_limit() {
    let prefix = b"GET /";
    let suffix = b" HTTP/1.0\r\n";
    let mut raw = prefix.to_vec();
    raw.extend(std::iter::repeat_n(b'a', MAX_LINE_LENGTH + 1 - prefix.len() - suffix.len()));
    raw.extend_from_slice(suffix);
    raw.extend_from_slice(b"\r\n");

    let err = parse(&raw).await.unwrap_err();
    assert!(matches!(err, RequestError::Protocol(ProtocolError::LineTooLong { .. })));
}

#[tokio::test]
async fn test_parse_header_line_at_exact_limit() {
    let mut raw = b"GET / HTTP/1.1\r\nX-Fill: ".to_vec();
    raw.extend(std::iter::repeat_n(b'v', MAX_LINE_LENGTH - "X-Fill: ".len() - 2));
    raw.extend_from_slice(b"\r\n\r\n");

    let parsed = parse(&raw).await.unwrap();
    assert_eq!(parsed.header("x-fill").map(str::len), Some(MAX_LINE_LENGTH - 10));
}

#[tokio::test]
async fn test_parse_negative_content_length() {
    let err = parse(b"POST / HTTP/1.1\r\nContent-Length: -1\r\n\r\n").await.unwrap_err();
    assert!(matches!(err, RequestError::Protocol(ProtocolError::NegativeContentLength)));
}

#[tokio::test]
async fn test_parse_non_numeric_content_length() {
    let err = parse(b"POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n").await.unwrap_err();
    assert!(matches!(err, RequestError::Protocol(ProtocolError::InvalidContentLength(_))));
}

#[tokio::test]
async fn test_parse_content_length_over_limit() {
    let raw = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", LIMIT + 1);
    let err = parse(raw.as_bytes()).await.unwrap_err();

    assert!(matches!(
        err,
        RequestError::Body(BodyError::TooLarge { length, limit }) if length == LIMIT + 1 && limit == LIMIT
    ));
}

#[tokio::test]
async fn test_parse_content_length_at_limit() {
    let mut raw = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", LIMIT).into_bytes();
    raw.extend(std::iter::repeat_n(b'x', LIMIT as usize));

    let parsed = parse(&raw).await.unwrap();
    assert_eq!(parsed.body.len(), LIMIT as usize);
    assert!(parsed.body.iter().all(|&b| b == b'x'));
}

#[tokio::test]
async fn test_parse_huge_declared_body_under_generous_limit() {
    let mut input: &[u8] = b"PUT /big HTTP/1.1\r\nContent-Length: 1099511627776\r\n\r\nhello";
    let err = read_request(&mut input, u64::MAX).await.unwrap_err();

    assert!(matches!(
        err,
        RequestError::Body(BodyError::Truncated { expected: 1099511627776, received: 5 })
    ));
}

#[tokio::test]
async fn test_parse_incomplete_body() {
    let err = parse(b"POST /api HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello").await.unwrap_err();

    assert!(matches!(
        err,
        RequestError::Body(BodyError::Truncated { expected: 10, received: 5 })
    ));
}

#[tokio::test]
async fn test_parse_content_length_lookup_ignores_case() {
    let parsed = parse(b"POST / HTTP/1.1\r\ncontent-length: 4\r\n\r\n\x00\x01\x02\x03")
        .await
        .unwrap();

    assert_eq!(parsed.body, vec![0, 1, 2, 3]);
}

#[test]
fn test_request_line_minor_version() {
    let line = parse_request_line("HEAD /index.html HTTP/1.0").unwrap();

    assert_eq!(line.method, Method::HEAD);
    assert_eq!(line.path, "/index.html");
    assert_eq!(line.minor_version, 0);
}

#[test]
fn test_header_value_leading_whitespace_is_skipped() {
    let field = parse_header_line("X-Test:\t  padded value ").unwrap();

    assert_eq!(field.name, "X-Test");
    assert_eq!(field.value, "padded value ");
}

#[test]
fn test_header_value_may_contain_colons() {
    let field = parse_header_line("Host: example.com:8080").unwrap();
    assert_eq!(field.value, "example.com:8080");
}

#[test]
fn test_header_without_name_is_rejected() {
    assert!(matches!(
        parse_header_line(": value"),
        Err(ProtocolError::MalformedHeader(_))
    ));
}

use crate::error::ProtocolError;
use crate::http::request::{HeaderField, Headers, Method};

/// Longest request or header line accepted, terminator included.
pub const MAX_LINE_LENGTH: usize = 4096;

const PROTOCOL_PREFIX: &str = "HTTP/1.";

/// The three parts of `METHOD SP PATH SP HTTP/1.<minor>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub path: String,
    pub minor_version: u32,
}

/// Strips a trailing `\r\n` or `\n`.
pub fn trim_line_ending(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r\n")
        .or_else(|| line.strip_suffix(b"\n"))
        .unwrap_or(line)
}

pub fn parse_request_line(line: &str) -> Result<RequestLine, ProtocolError> {
    let malformed = || ProtocolError::MalformedRequestLine(line.to_string());

    let (method, rest) = line.split_once(' ').ok_or_else(malformed)?;
    let method = Method::parse(method).ok_or_else(malformed)?;

    let (path, protocol) = rest.split_once(' ').ok_or_else(malformed)?;
    if !path.starts_with('/') {
        return Err(ProtocolError::InvalidPath(path.to_string()));
    }

    let minor_version = parse_protocol(protocol)?;

    Ok(RequestLine {
        method,
        path: path.to_string(),
        minor_version,
    })
}

/// Accepts `HTTP/1.<digits>`; the prefix is matched without regard to case.
fn parse_protocol(token: &str) -> Result<u32, ProtocolError> {
    let invalid = || ProtocolError::InvalidProtocol(token.to_string());

    let prefix = token.get(..PROTOCOL_PREFIX.len()).ok_or_else(invalid)?;
    if !prefix.eq_ignore_ascii_case(PROTOCOL_PREFIX) {
        return Err(invalid());
    }

    let digits = &token[PROTOCOL_PREFIX.len()..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    digits.parse().map_err(|_| invalid())
}

/// Splits `Name: value` on the first colon. Leading spaces and tabs are
/// dropped from the value; trailing ones are kept.
pub fn parse_header_line(line: &str) -> Result<HeaderField, ProtocolError> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| ProtocolError::MalformedHeader(line.to_string()))?;

    if name.is_empty() {
        return Err(ProtocolError::MalformedHeader(line.to_string()));
    }

    Ok(HeaderField {
        name: name.to_string(),
        value: value.trim_start_matches(|c: char| c == ' ' || c == '\t').to_string(),
    })
}

/// Declared body length; an absent header means no body.
pub fn parse_content_length(headers: &Headers) -> Result<u64, ProtocolError> {
    let Some(value) = headers.get("Content-Length") else {
        return Ok(0);
    };

    match value.trim_end().parse::<i64>() {
        Ok(n) if n < 0 => Err(ProtocolError::NegativeContentLength),
        Ok(n) => Ok(n as u64),
        Err(_) => Err(ProtocolError::InvalidContentLength(value.to_string())),
    }
}

//! Reads exactly one request off a buffered byte stream.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::{BodyError, ProtocolError, RequestError};
use crate::http::parser::{self, MAX_LINE_LENGTH};
use crate::http::request::{Headers, Request};

/// Upper bound on the buffer reserved before the body starts arriving.
const INITIAL_BODY_CAPACITY: u64 = 8192;

enum Line {
    Eof,
    /// Stream ended in the middle of a line.
    Partial,
    Complete(String),
}

/// Reads the request line, the header block and a `Content-Length` body.
///
/// Bodies longer than `max_body_length` are refused before any body byte is
/// read. Nothing past the declared body is consumed.
pub async fn read_request<R>(reader: &mut R, max_body_length: u64) -> Result<Request, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let line = match read_line(reader).await? {
        Line::Complete(line) => line,
        Line::Eof => return Err(ProtocolError::MissingRequestLine.into()),
        Line::Partial => return Err(ProtocolError::UnterminatedHeader.into()),
    };
    let request_line = parser::parse_request_line(&line)?;

    let mut headers = Headers::new();
    loop {
        let line = match read_line(reader).await? {
            Line::Complete(line) => line,
            Line::Eof | Line::Partial => return Err(ProtocolError::UnterminatedHeader.into()),
        };
        if line.is_empty() {
            break;
        }

        let field = parser::parse_header_line(&line)?;
        headers.push(field.name, field.value);
    }

    let length = parser::parse_content_length(&headers)?;
    let body = read_body(reader, length, max_body_length).await?;

    Ok(Request {
        method: request_line.method,
        path: request_line.path,
        minor_version: request_line.minor_version,
        headers,
        body,
    })
}

async fn read_line<R>(reader: &mut R) -> Result<Line, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::with_capacity(256);
    let n = (&mut *reader)
        .take(MAX_LINE_LENGTH as u64)
        .read_until(b'\n', &mut buf)
        .await?;

    if n == 0 {
        return Ok(Line::Eof);
    }

    if !buf.ends_with(b"\n") {
        if buf.len() >= MAX_LINE_LENGTH {
            return Err(ProtocolError::LineTooLong {
                limit: MAX_LINE_LENGTH,
            }
            .into());
        }
        return Ok(Line::Partial);
    }

    let line = parser::trim_line_ending(&buf);
    Ok(Line::Complete(String::from_utf8_lossy(line).into_owned()))
}

async fn read_body<R>(reader: &mut R, length: u64, limit: u64) -> Result<Vec<u8>, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    if length == 0 {
        return Ok(Vec::new());
    }
    if length > limit {
        return Err(BodyError::TooLarge { length, limit }.into());
    }

    let mut body = Vec::with_capacity(length.min(INITIAL_BODY_CAPACITY) as usize);
    let received = (&mut *reader).take(length).read_to_end(&mut body).await? as u64;

    if received < length {
        return Err(BodyError::Truncated {
            expected: length,
            received,
        }
        .into());
    }

    Ok(body)
}

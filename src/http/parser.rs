use thiserror::Error;

use crate::http::request::{Method, Request};

/// Longest request line we are willing to buffer.
pub const MAX_REQUEST_LINE: usize = 8 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty request line")]
    Empty,
    #[error("request line is not valid UTF-8")]
    InvalidEncoding,
    #[error("malformed request line")]
    InvalidRequest,
    #[error("invalid HTTP version token {0:?}")]
    InvalidVersion(String),
    #[error("request line exceeds {} bytes", MAX_REQUEST_LINE)]
    TooLong,
    #[error("request line not terminated yet")]
    Incomplete,
}

/// Parses `<METHOD> SP <target> [SP HTTP/x.y]`.
///
/// `line` may still carry its `\r\n` terminator.
pub fn parse_request_line(line: &[u8]) -> Result<Request, ParseError> {
    let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;
    let line = line.trim_end_matches(['\r', '\n']);

    if line.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut parts = line.split_whitespace();

    let method = parts.next().ok_or(ParseError::InvalidRequest)?;
    let target = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next();

    if parts.next().is_some() {
        return Err(ParseError::InvalidRequest);
    }

    if let Some(version) = version {
        if !version.starts_with("HTTP/") {
            return Err(ParseError::InvalidVersion(version.to_string()));
        }
    }

    Ok(Request {
        method: Method::from_token(method),
        target: target.to_string(),
        version: version.map(str::to_string),
    })
}

/// Splits off the first line of `buf`, terminator included.
///
/// Returns `Incomplete` until a `\n` arrives and `TooLong` once more than
/// [`MAX_REQUEST_LINE`] bytes are buffered without one.
pub fn take_request_line(buf: &[u8]) -> Result<&[u8], ParseError> {
    match buf.iter().position(|&b| b == b'\n') {
        Some(end) if end < MAX_REQUEST_LINE => Ok(&buf[..=end]),
        Some(_) => Err(ParseError::TooLong),
        None if buf.len() >= MAX_REQUEST_LINE => Err(ParseError::TooLong),
        None => Err(ParseError::Incomplete),
    }
}

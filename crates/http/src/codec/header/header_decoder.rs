//! Request head decoder: the request line and the header lines up to the first blank line.
//!
//! # Parsing rules
//!
//! - the request line is split on its first two spaces into method, target and version;
//!   fewer than two spaces is a [`ParseError::InvalidRequestLine`]
//! - method tokens are matched case-insensitively; unknown tokens are rejected unless the
//!   decoder was built to treat them as `GET`
//! - each header line is split on its first `:`, the value is whitespace-trimmed; lines with
//!   no colon, a colon at position 0, or a name/value that is not a valid HTTP token are skipped
//! - lines may end with `\r\n` or a bare `\n`; empty lines before the request line are ignored
//!
//! # Limits
//!
//! The whole head must fit in `max_header_bytes`, 8 KiB unless configured otherwise.

use bytes::{Buf, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue};
use tokio_util::codec::Decoder;
use tracing::{trace, warn};

use crate::ensure;
use crate::protocol::{Method, ParseError, RequestHead};

/// Maximum size in bytes allowed for the entire header section
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder for request heads implementing the [`Decoder`] trait.
#[derive(Debug, Clone)]
pub struct HeaderDecoder {
    max_header_bytes: usize,
    unknown_method_as_get: bool,
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self { max_header_bytes: DEFAULT_MAX_HEADER_BYTES, unknown_method_as_get: false }
    }
}

impl HeaderDecoder {
    pub fn new(max_header_bytes: usize, unknown_method_as_get: bool) -> Self {
        Self { max_header_bytes, unknown_method_as_get }
    }

    /// Parses whatever is buffered as a head, complete or not.
    ///
    /// Used when the peer closed the connection before sending the blank line.
    pub fn decode_partial(&mut self, src: &mut BytesMut) -> Result<Option<RequestHead>, ParseError> {
        skip_leading_blank_lines(src);
        if src.is_empty() {
            return Ok(None);
        }

        ensure!(src.len() <= self.max_header_bytes, ParseError::too_large_header(src.len(), self.max_header_bytes));
        let head_bytes = src.split();
        self.parse_head(&head_bytes).map(Some)
    }

    fn parse_head(&self, head: &[u8]) -> Result<RequestHead, ParseError> {
        let mut lines = head.split(|&b| b == b'\n').map(trim_cr);

        let request_line = lines.next().unwrap_or_default();
        let request_line = std::str::from_utf8(request_line).map_err(|_e| ParseError::invalid_request_line("not utf-8"))?;
        let (method, target) = self.parse_request_line(request_line)?;

        let mut headers = HeaderMap::new();
        for line in lines.filter(|line| !line.is_empty()) {
            match parse_header_line(line) {
                Some((name, value)) => {
                    headers.insert(name, value);
                }
                None => trace!(line = %String::from_utf8_lossy(line), "skip malformed header line"),
            }
        }

        Ok(RequestHead::new(method, target, headers))
    }

    fn parse_request_line<'a>(&self, line: &'a str) -> Result<(Method, &'a str), ParseError> {
        let (token, rest) = line.split_once(' ').ok_or_else(|| ParseError::invalid_request_line(line))?;
        let (target, version) = rest.split_once(' ').ok_or_else(|| ParseError::invalid_request_line(line))?;
        trace!(method = token, target, version, "parsed request line");

        let method = match Method::from_token(token) {
            Some(method) => method,
            None if self.unknown_method_as_get => {
                warn!(method = token, "unknown method treated as GET");
                Method::Get
            }
            None => return Err(ParseError::invalid_method(token)),
        };

        Ok((method, target))
    }
}

impl Decoder for HeaderDecoder {
    type Item = RequestHead;
    type Error = ParseError;

    /// Returns the head once the blank line arrived, `Ok(None)` while more bytes are needed.
    ///
    /// # Errors
    ///
    /// - the buffered head exceeds the size limit
    /// - the request line is malformed or names an unknown method
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        skip_leading_blank_lines(src);

        match find_head_end(src) {
            Some((head_len, consumed)) => {
                ensure!(head_len <= self.max_header_bytes, ParseError::too_large_header(head_len, self.max_header_bytes));
                let head_bytes = src.split_to(consumed);
                trace!(head_size = head_len, "parsed head size");
                self.parse_head(&head_bytes[..head_len]).map(Some)
            }
            None => {
                ensure!(src.len() <= self.max_header_bytes, ParseError::too_large_header(src.len(), self.max_header_bytes));
                Ok(None)
            }
        }
    }
}

/// Finds the blank line ending the head.
///
/// Returns the length of the head (without the blank line) and the number of bytes to consume.
fn find_head_end(src: &[u8]) -> Option<(usize, usize)> {
    let mut line_start = 0;
    while let Some(offset) = src[line_start..].iter().position(|&b| b == b'\n') {
        let newline = line_start + offset;
        if trim_cr(&src[line_start..newline]).is_empty() {
            return Some((line_start, newline + 1));
        }
        line_start = newline + 1;
    }
    None
}

fn skip_leading_blank_lines(src: &mut BytesMut) {
    let blank = src.iter().take_while(|&&b| b == b'\r' || b == b'\n').count();
    src.advance(blank);
}

fn parse_header_line(line: &[u8]) -> Option<(HeaderName, HeaderValue)> {
    let colon = line.iter().position(|&b| b == b':')?;
    if colon == 0 {
        return None;
    }

    let name = HeaderName::from_bytes(&line[..colon]).ok()?;
    let value = HeaderValue::from_bytes(line[colon + 1..].trim_ascii()).ok()?;
    Some((name, value))
}

#[inline]
fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header;
    use indoc::indoc;

    #[test]
    fn test_bytes_mut_lens() {
        let str = indoc! {r##"
        POST /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        Content-Length: 3

        123"##};

        let mut bytes = BytesMut::from(str);
        let result = HeaderDecoder::default().decode(&mut bytes).unwrap();

        assert!(result.is_some());
        assert_eq!(&bytes[..], &b"123"[..]);
    }

    #[test]
    fn from_curl() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        "##};

        let mut buf = BytesMut::from(str);
        let head = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();

        assert_eq!(head.method(), Method::Get);
        assert_eq!(head.path(), "/index.html");
        assert_eq!(head.raw_query(), "");
        assert_eq!(head.headers().len(), 3);
        assert_eq!(head.headers().get(header::ACCEPT), Some(&HeaderValue::from_static("*/*")));
        assert_eq!(head.headers().get(header::HOST), Some(&HeaderValue::from_static("127.0.0.1:8080")));
        assert_eq!(head.headers().get(header::USER_AGENT), Some(&HeaderValue::from_static("curl/7.79.1")));
        assert!(buf.is_empty());
    }

    #[test]
    fn from_crlf() {
        let mut buf = BytesMut::from(&b"GET /user/42?verbose=true HTTP/1.1\r\nHost: esp32.local\r\n\r\n"[..]);
        let head = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();

        assert_eq!(head.path(), "/user/42");
        assert_eq!(head.raw_query(), "verbose=true");
        assert_eq!(head.headers().get("host").unwrap(), "esp32.local");
    }

    #[test]
    fn test_partial_head() {
        let input = b"GET / HTTP/1.1\r\nHost: a\r\n";
        let mut buf = BytesMut::from(&input[..]);
        assert!(HeaderDecoder::default().decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), input.len());
        assert_eq!(&buf[..], &input[..]);
    }

    #[test]
    fn test_decode_partial_at_eof() {
        let mut buf = BytesMut::from(&b"GET /status HTTP/1.1\r\nHost: a"[..]);
        let head = HeaderDecoder::default().decode_partial(&mut buf).unwrap().unwrap();

        assert_eq!(head.path(), "/status");
        assert_eq!(head.headers().get("host").unwrap(), "a");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_malformed_header_lines_are_skipped() {
        let str = indoc! {r##"
        GET / HTTP/1.1
        no colon here
        : starts with colon
        Bad Name: spaces in name
        X-Spaced:    padded value
        Accept: text/html

        "##};

        let mut buf = BytesMut::from(str);
        let head = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();

        assert_eq!(head.headers().len(), 2);
        assert_eq!(head.headers().get("x-spaced").unwrap(), "padded value");
        assert_eq!(head.headers().get("accept").unwrap(), "text/html");
    }

    #[test]
    fn test_header_value_keeps_later_colons() {
        let mut buf = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: 10.0.0.7:80\r\n\r\n"[..]);
        let head = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();
        assert_eq!(head.headers().get("host").unwrap(), "10.0.0.7:80");
    }

    #[test]
    fn test_duplicate_header_last_wins() {
        let mut buf = BytesMut::from(&b"GET / HTTP/1.1\r\nX-Mode: a\r\nx-mode: b\r\n\r\n"[..]);
        let head = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();
        assert_eq!(head.headers().get_all("x-mode").iter().count(), 1);
        assert_eq!(head.headers().get("x-mode").unwrap(), "b");
    }

    #[test]
    fn test_invalid_request_line() {
        let mut buf = BytesMut::from(&b"GET/index.html\r\n\r\n"[..]);
        let result = HeaderDecoder::default().decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidRequestLine { .. })));

        let mut buf = BytesMut::from(&b"GET /index.html\r\n\r\n"[..]);
        let result = HeaderDecoder::default().decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidRequestLine { .. })));
    }

    #[test]
    fn test_unknown_method() {
        let mut buf = BytesMut::from(&b"BREW /pot HTTP/1.1\r\n\r\n"[..]);
        let result = HeaderDecoder::default().decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidMethod { token }) if token == "BREW"));

        let mut buf = BytesMut::from(&b"BREW /pot HTTP/1.1\r\n\r\n"[..]);
        let head = HeaderDecoder::new(DEFAULT_MAX_HEADER_BYTES, true).decode(&mut buf).unwrap().unwrap();
        assert_eq!(head.method(), Method::Get);
        assert_eq!(head.path(), "/pot");
    }

    #[test]
    fn test_lowercase_method() {
        let mut buf = BytesMut::from(&b"post /api HTTP/1.1\r\n\r\n"[..]);
        let head = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();
        assert_eq!(head.method(), Method::Post);
    }

    #[test]
    fn test_leading_blank_lines() {
        let mut buf = BytesMut::from(&b"\r\n\r\nGET /x HTTP/1.1\r\n\r\n"[..]);
        let head = HeaderDecoder::default().decode(&mut buf).unwrap().unwrap();
        assert_eq!(head.path(), "/x");
    }

    #[test]
    fn test_too_large_header() {
        let mut decoder = HeaderDecoder::new(32, false);
        let mut buf = BytesMut::from(&b"GET / HTTP/1.1\r\nX-Long: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"[..]);

        let result = decoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::TooLargeHeader { max_size: 32, .. })));
    }
}

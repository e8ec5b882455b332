//! The response writer handed to middleware and handlers.
//!
//! A [`Response`] buffers its status and headers until the first body byte is about to be
//! written; the head is then serialized exactly once. Two one-way flags track progress:
//!
//! - `headers_sent`: the head is on the wire, status and headers can no longer change
//! - `response_sent`: the response is complete, every further call is a no-op
//!
//! A write failure also marks the response as sent, since the connection cannot carry
//! anything else afterwards.

use std::fmt;

use bytes::BytesMut;
use http::header::{CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use http::{HeaderMap, HeaderName, HeaderValue};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::{trace, warn};

use crate::codec::HeaderEncoder;
use crate::protocol::{SendError, reason_phrase};

/// Default size of the slices written by [`Response::send_binary`].
pub const DEFAULT_WRITE_CHUNK_SIZE: usize = 1024;

#[inline]
fn connection_close() -> HeaderValue {
    HeaderValue::from_static("close")
}

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Status code and headers of a response, before they are written.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    status: u16,
    headers: HeaderMap,
}

impl ResponseHead {
    pub fn new(status: u16, headers: HeaderMap) -> Self {
        Self { status, headers }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl Default for ResponseHead {
    fn default() -> Self {
        let mut headers = HeaderMap::with_capacity(4);
        headers.insert(CONNECTION, connection_close());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        Self { status: 200, headers }
    }
}

pub struct Response {
    writer: BoxedWriter,
    head: ResponseHead,
    headers_sent: bool,
    response_sent: bool,
    chunk_size: usize,
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("head", &self.head)
            .field("headers_sent", &self.headers_sent)
            .field("response_sent", &self.response_sent)
            .finish_non_exhaustive()
    }
}

impl Response {
    /// Creates a response writing to `writer`, with status 200, `Content-Type: text/html`
    /// and `Connection: close`.
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            writer: Box::new(writer),
            head: ResponseHead::default(),
            headers_sent: false,
            response_sent: false,
            chunk_size: DEFAULT_WRITE_CHUNK_SIZE,
        }
    }

    /// Sets the slice size used by [`Response::send_binary`]. Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn status_code(&self) -> u16 {
        self.head.status
    }

    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    #[inline]
    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    #[inline]
    pub fn is_sent(&self) -> bool {
        self.response_sent
    }

    /// Sets the status code. Ignored once the headers are on the wire.
    pub fn code(&mut self, status: u16) -> &mut Self {
        if self.headers_sent {
            warn!(status, "headers already sent, status change ignored");
            return self;
        }
        self.head.status = status;
        self
    }

    /// Sets a header, replacing any previous value for the same name.
    ///
    /// Ignored once the headers are on the wire, and when the name or value is not a valid
    /// HTTP token. `Connection` is always written as `close`.
    pub fn header(&mut self, name: &str, value: &str) -> &mut Self {
        if self.headers_sent {
            warn!(header = name, "headers already sent, header change ignored");
            return self;
        }

        match parse_header(name, value) {
            Ok((name, value)) => {
                self.head.headers.insert(name, value);
            }
            Err(e) => warn!(cause = %e, "skip invalid response header"),
        }
        self
    }

    /// Sends `body` with the given content type and completes the response.
    pub async fn send(&mut self, body: impl AsRef<[u8]>, content_type: &str) -> Result<(), SendError> {
        if self.response_sent {
            return Ok(());
        }

        let body = body.as_ref();
        self.header(CONTENT_TYPE.as_str(), content_type);
        self.set_content_length(body.len());

        let result = self.write_body(body).await;
        self.response_sent = true;
        result
    }

    /// `send` with `text/html`.
    pub async fn html(&mut self, body: impl AsRef<[u8]>) -> Result<(), SendError> {
        self.send(body, mime::TEXT_HTML.as_ref()).await
    }

    /// `send` with `text/plain`.
    pub async fn text(&mut self, body: impl AsRef<[u8]>) -> Result<(), SendError> {
        self.send(body, mime::TEXT_PLAIN.as_ref()).await
    }

    /// `send` with `application/json`.
    pub async fn json(&mut self, body: impl AsRef<[u8]>) -> Result<(), SendError> {
        self.send(body, mime::APPLICATION_JSON.as_ref()).await
    }

    /// Sends `data` in fixed-size slices, yielding to the runtime between slices so other
    /// work on the same thread is not starved by a large payload.
    pub async fn send_binary(&mut self, data: &[u8], content_type: &str) -> Result<(), SendError> {
        if self.response_sent {
            return Ok(());
        }

        self.header(CONTENT_TYPE.as_str(), content_type);
        self.set_content_length(data.len());

        let result = self.write_chunked(data).await;
        self.response_sent = true;
        result
    }

    /// Sets the status and sends `message` as the body. An empty message is replaced by the
    /// reason phrase of the code, or `Status <code>` when the code has none.
    pub async fn status(&mut self, status: u16, message: &str) -> Result<(), SendError> {
        if self.response_sent {
            return Ok(());
        }

        self.code(status);
        if !message.is_empty() {
            return self.html(message).await;
        }

        match reason_phrase(status) {
            Some(reason) => self.html(reason).await,
            None => self.html(format!("Status {status}")).await,
        }
    }

    /// Redirects with `302 Found`.
    pub async fn redirect(&mut self, url: &str) -> Result<(), SendError> {
        self.redirect_with_status(url, 302).await
    }

    pub async fn redirect_with_status(&mut self, url: &str, status: u16) -> Result<(), SendError> {
        if self.response_sent {
            return Ok(());
        }

        self.code(status);
        self.header(LOCATION.as_str(), url);
        let url = escape_html(url);
        self.html(format!("<html><body>Redirecting to <a href=\"{url}\">{url}</a></body></html>")).await
    }

    /// Completes the response. If nothing was written yet, the head goes out with an empty body.
    pub async fn end(&mut self) -> Result<(), SendError> {
        if self.response_sent {
            return Ok(());
        }

        if !self.head.headers.contains_key(CONTENT_LENGTH) {
            self.set_content_length(0);
        }

        let result = self.write_body(&[]).await;
        self.response_sent = true;
        result
    }

    /// Shuts down the write side of the connection.
    pub(crate) async fn close(&mut self) -> Result<(), SendError> {
        self.writer.shutdown().await.map_err(SendError::io)
    }

    fn set_content_length(&mut self, len: usize) {
        if !self.headers_sent {
            self.head.headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        }
    }

    async fn write_head(&mut self) -> Result<(), SendError> {
        if self.headers_sent {
            return Ok(());
        }

        self.head.headers.insert(CONNECTION, connection_close());
        let mut dst = BytesMut::new();
        HeaderEncoder.encode(&self.head, &mut dst)?;

        self.headers_sent = true;
        trace!(status = self.head.status, head_size = dst.len(), "write response head");
        self.writer.write_all(&dst).await?;
        Ok(())
    }

    async fn write_body(&mut self, body: &[u8]) -> Result<(), SendError> {
        self.write_head().await?;
        self.writer.write_all(body).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn write_chunked(&mut self, data: &[u8]) -> Result<(), SendError> {
        self.write_head().await?;
        for chunk in data.chunks(self.chunk_size) {
            self.writer.write_all(chunk).await?;
            tokio::task::yield_now().await;
        }
        self.writer.flush().await?;
        Ok(())
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), SendError> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| SendError::invalid_header(name, e))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| SendError::invalid_header(name, e))?;
    Ok((header_name, header_value))
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

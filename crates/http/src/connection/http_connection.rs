use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::{Duration, Instant, timeout, timeout_at};
use tokio_util::codec::FramedRead;
use tracing::{debug, error, info, warn};

use crate::codec::RequestDecoder;
use crate::connection::ConnectionConfig;
use crate::handler::Handler;
use crate::protocol::{HttpError, Message, ParseError, PayloadItem, PayloadSize, Request, RequestHead, Response};

/// A single-request HTTP connection.
///
/// # Type Parameters
///
/// * `R`: The async readable half of the stream
/// * `W`: The async writable half of the stream
///
/// # Lifecycle
///
/// 1. wait up to `connect_timeout` for a complete head; nothing received means the connection
///    is dropped silently, a partial or malformed head is answered with 400
/// 2. read the body for up to `body_timeout`, keeping whatever arrived if it runs out
/// 3. run the handler; an error is logged and answered with 500 if nothing was sent yet
/// 4. complete the response if the handler left it open
/// 5. shut the stream down
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    writer: W,
    config: ConnectionConfig,
}

impl<R, W> std::fmt::Debug for HttpConnection<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnection").field("config", &self.config).finish_non_exhaustive()
    }
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Send + Unpin + 'static,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ConnectionConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: ConnectionConfig) -> Self {
        let decoder = RequestDecoder::with_limits(config.max_header_bytes, config.max_body_size, config.unknown_method_as_get);
        Self { framed_read: FramedRead::with_capacity(reader, decoder, 8 * 1024), writer, config }
    }

    /// Serves one request with `handler`, then closes the connection.
    ///
    /// # Errors
    ///
    /// Returns the parse error after a 400 was sent for a bad head, or the write error when
    /// the response could not be delivered. A connection that closes or times out without
    /// sending anything is not an error.
    pub async fn process<H>(self, handler: &H) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        let Self { mut framed_read, writer, config } = self;
        let mut response = Response::new(writer).with_chunk_size(config.write_chunk_size);

        let result = match read_head(&mut framed_read, config.connect_timeout()).await {
            Ok(Some((head, payload_size))) => {
                let body = read_body(&mut framed_read, payload_size, config.body_timeout()).await;
                dispatch(head.body(body), &mut response, handler).await
            }
            Ok(None) => Ok(()),
            Err(e) => {
                if let Err(send_error) = response.status(400, "Bad Request").await {
                    warn!(cause = %send_error, "failed to send bad request response");
                }
                Err(e.into())
            }
        };

        if let Err(e) = response.close().await {
            debug!(cause = %e, "shutdown connection failed");
        }

        result
    }
}

/// Waits for the request head. `Ok(None)` means the peer went away or never sent anything.
async fn read_head<R>(
    framed_read: &mut FramedRead<R, RequestDecoder>,
    connect_timeout: Duration,
) -> Result<Option<(RequestHead, PayloadSize)>, ParseError>
where
    R: AsyncRead + Unpin,
{
    match timeout(connect_timeout, framed_read.next()).await {
        Ok(Some(Ok(Message::Header(header)))) => Ok(Some(header)),

        Ok(Some(Ok(Message::Payload(_)))) => {
            error!("received body before request head");
            Err(ParseError::invalid_request_line("need header while receive body"))
        }

        Ok(Some(Err(e))) => {
            warn!(cause = %e, "can't parse request head");
            Err(e)
        }

        Ok(None) => {
            info!("connection closed before sending a request");
            Ok(None)
        }

        Err(_elapsed) if framed_read.read_buffer().is_empty() => {
            info!(timeout = ?connect_timeout, "no request data received, dropping connection");
            Ok(None)
        }

        Err(_elapsed) => {
            let received = framed_read.read_buffer().len();
            warn!(received, timeout = ?connect_timeout, "request head incomplete at timeout");
            Err(ParseError::incomplete_head(received))
        }
    }
}

/// Reads up to `payload_size` body bytes, accepting a shorter body on timeout or early close.
async fn read_body<R>(framed_read: &mut FramedRead<R, RequestDecoder>, payload_size: PayloadSize, body_timeout: Duration) -> Bytes
where
    R: AsyncRead + Unpin,
{
    if payload_size.is_empty() {
        return Bytes::new();
    }

    let expected = payload_size.len();
    let deadline = Instant::now() + body_timeout;
    let mut body = BytesMut::with_capacity(expected);

    loop {
        match timeout_at(deadline, framed_read.next()).await {
            Ok(Some(Ok(Message::Payload(PayloadItem::Chunk(bytes))))) => body.extend_from_slice(&bytes),
            Ok(Some(Ok(Message::Payload(PayloadItem::Eof)))) => break,
            Ok(Some(Ok(Message::Header(_)))) => {
                warn!("received request head while reading body");
                break;
            }
            Ok(Some(Err(e))) => {
                warn!(cause = %e, received = body.len(), expected, "body read failed, keeping partial body");
                break;
            }
            Ok(None) => {
                warn!(received = body.len(), expected, "connection closed before full body, keeping partial body");
                break;
            }
            Err(_elapsed) => {
                warn!(received = body.len(), expected, "body read timed out, keeping partial body");
                break;
            }
        }
    }

    debug!(size = body.len(), "read request body");
    body.freeze()
}

async fn dispatch<H>(mut request: Request, response: &mut Response, handler: &H) -> Result<(), HttpError>
where
    H: Handler + ?Sized,
{
    info!(method = %request.method(), path = request.path(), "handling request");

    if let Err(e) = handler.call(&mut request, response).await {
        error!(cause = %e, path = request.path(), "handler failed");
        if !response.is_sent() {
            response.status(500, "Internal Server Error").await?;
        }
    }

    response.end().await?;
    Ok(())
}

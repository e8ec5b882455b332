//! Streaming request decoder.
//!
//! The decoder runs in two phases, tracked by the `payload_decoder` field:
//!
//! - `None`: parsing the head with [`HeaderDecoder`]
//! - `Some(LengthDecoder)`: delivering the body, clamped to `max_body_size`
//!
//! Bytes the peer sends beyond the clamped body are left in the buffer and never read.

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::debug;

use crate::codec::body::LengthDecoder;
use crate::codec::header::{DEFAULT_MAX_HEADER_BYTES, HeaderDecoder};
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestHead};

/// Largest body the decoder delivers; longer declared bodies are truncated.
pub const DEFAULT_MAX_BODY_SIZE: usize = 4096;

/// A decoder for requests that handles both the head and the body.
#[derive(Debug)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<LengthDecoder>,
    max_body_size: usize,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a decoder with explicit limits.
    pub fn with_limits(max_header_bytes: usize, max_body_size: usize, unknown_method_as_get: bool) -> Self {
        Self {
            header_decoder: HeaderDecoder::new(max_header_bytes, unknown_method_as_get),
            payload_decoder: None,
            max_body_size,
        }
    }

    fn start_payload(&mut self, head: &RequestHead) -> PayloadSize {
        let payload_size = match head.content_length() {
            Some(declared) => {
                if declared > self.max_body_size {
                    debug!(declared, max_body_size = self.max_body_size, "body exceeds limit, truncating");
                }
                PayloadSize::capped(declared, self.max_body_size)
            }
            None => PayloadSize::Empty,
        };

        self.payload_decoder = Some(LengthDecoder::new(payload_size.len()));
        payload_size
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_HEADER_BYTES, DEFAULT_MAX_BODY_SIZE, false)
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<(RequestHead, PayloadSize)>;
    type Error = ParseError;

    /// Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: the head and the number of body bytes that will follow
    /// - `Ok(Some(Message::Payload(_)))`: a body chunk, or `Eof` once the body is complete
    /// - `Ok(None)`: more data is needed
    /// - `Err(_)`: the head is malformed or too large
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ PayloadItem::Eof) => {
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                None => None,
            };

            return Ok(message);
        }

        let message = match self.header_decoder.decode(src)? {
            Some(head) => {
                let payload_size = self.start_payload(&head);
                Some(Message::Header((head, payload_size)))
            }
            None => None,
        };

        Ok(message)
    }

    /// At end of stream a head without its blank line is still parsed, and a short body
    /// simply ends without `Eof`.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }

        if self.payload_decoder.is_some() {
            return Ok(None);
        }

        match self.header_decoder.decode_partial(src)? {
            Some(head) => {
                let payload_size = self.start_payload(&head);
                Ok(Some(Message::Header((head, payload_size))))
            }
            None => Ok(None),
        }
    }
}

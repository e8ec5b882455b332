//! Codecs turning raw bytes into requests and responses into raw bytes.
//!
//! - [`RequestDecoder`]: a [`Decoder`](tokio_util::codec::Decoder) state machine yielding the
//!   request head and then the capped body
//! - [`HeaderEncoder`]: serializes a response head
//! - [`percent`]: percent-decoding of paths and query strings
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use express_http::codec::RequestDecoder;
//! use express_http::protocol::Message;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET /led/on HTTP/1.1\r\nHost: esp32\r\n\r\n"[..]);
//!
//! let Some(Message::Header((head, _payload_size))) = decoder.decode(&mut buffer).unwrap() else {
//!     panic!("expected a request head");
//! };
//! assert_eq!(head.path(), "/led/on");
//! ```

mod body;
mod header;
pub mod percent;
mod request_decoder;

pub use body::LengthDecoder;
pub use header::DEFAULT_MAX_HEADER_BYTES;
pub use header::HeaderDecoder;
pub use header::HeaderEncoder;
pub use request_decoder::DEFAULT_MAX_BODY_SIZE;
pub use request_decoder::RequestDecoder;

//! Core protocol types shared by the decoder, the connection and the handlers.
//!
//! - [`Method`]: request methods, plus the registration-only `Any`
//! - [`RequestHead`] / [`Request`]: the parsed request, with lazily decoded query parameters
//! - [`Response`]: the one-shot response writer
//! - [`Message`], [`PayloadItem`], [`PayloadSize`]: items produced by the request decoder
//! - [`HttpError`], [`ParseError`], [`SendError`]: error types

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod method;
pub use method::Method;

mod request;
pub use request::Request;
pub use request::RequestHead;

mod response;
pub use response::DEFAULT_WRITE_CHUNK_SIZE;
pub use response::Response;
pub use response::ResponseHead;

mod status;
pub use status::reason_phrase;
pub use status::status_line_reason;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

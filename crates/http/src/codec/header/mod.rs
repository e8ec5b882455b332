//! Request head decoding and response head encoding.
//!
//! - [`HeaderDecoder`]: lenient request line and header parsing, with a head size limit
//! - [`HeaderEncoder`]: status line and title-cased header serialization

mod header_decoder;
mod header_encoder;

pub use header_decoder::DEFAULT_MAX_HEADER_BYTES;
pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;

//! Request body decoding.
//!
//! Bodies are delimited by `Content-Length` only; the declared length is clamped to the
//! configured cap before a [`LengthDecoder`] is created, so the decoder never yields more
//! than the cap.

mod length_decoder;

pub use length_decoder::LengthDecoder;

//! Serializes a response head into raw bytes.
//!
//! Writes the status line `HTTP/1.1 <code> <reason>`, one `Name: value` line per header
//! with the name in title case, and the terminating blank line.

use crate::protocol::{ResponseHead, SendError, status_line_reason};

use bytes::{BufMut, BytesMut};

use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 512;

/// Encoder for HTTP response heads implementing the [`Encoder`] trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderEncoder;

impl Encoder<&ResponseHead> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, head: &ResponseHead, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);
        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", head.status(), status_line_reason(head.status()))?;

        for (header_name, header_value) in head.headers().iter() {
            put_title_case(header_name.as_str(), dst);
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// `content-length` is written as `Content-Length`.
fn put_title_case(name: &str, dst: &mut BytesMut) {
    let mut upper = true;
    for b in name.bytes() {
        dst.put_u8(if upper { b.to_ascii_uppercase() } else { b });
        upper = b == b'-';
    }
}

/// Writer over `BytesMut`, so `write!` can format straight into the header buffer.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

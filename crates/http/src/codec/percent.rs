//! Percent-decoding shared by the request path and the query string.
//!
//! - `%XX` becomes the byte with hex value `XX`, hex digits in either case
//! - a `%` that is not followed by two hex digits is kept as-is
//! - in query components `+` becomes a space; in paths it stays literal
//!
//! Decoded bytes that are not valid UTF-8 are replaced with U+FFFD.

use std::borrow::Cow;
use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use url::form_urlencoded;

/// Decodes a request path: only `%XX` escapes are resolved.
pub fn decode_path(input: &str) -> Cow<'_, str> {
    percent_decode_str(input).decode_utf8_lossy()
}

/// Splits a raw query string on `&` and `=` and decodes each key and value.
///
/// Pairs without `=` or with an empty key are skipped. A repeated key keeps the last value.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| pair.find('=').is_some_and(|eq| eq > 0))
        .flat_map(|pair| form_urlencoded::parse(pair.as_bytes()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

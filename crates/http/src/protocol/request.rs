//! Parsed HTTP requests.
//!
//! The decoder first produces a [`RequestHead`] (method, path, query, headers). Once the
//! body has been read the head is turned into a [`Request`], which is what middleware and
//! handlers see.

use std::borrow::Cow;
use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, header};
use once_cell::sync::OnceCell;

use crate::codec::percent;
use crate::protocol::Method;

/// The request line and headers of an incoming request.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    path: String,
    raw_query: String,
    headers: HeaderMap,
}

impl RequestHead {
    /// Builds a head from a request target such as `/user/42?verbose=true`.
    ///
    /// The target is split on the first `?`; the path part is percent-decoded, the query is
    /// kept raw until first read.
    pub fn new(method: Method, target: &str, headers: HeaderMap) -> Self {
        let (path, raw_query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };

        Self { method, path: percent::decode_path(path).into_owned(), raw_query: raw_query.to_owned(), headers }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The declared `Content-Length`, if present and numeric.
    pub fn content_length(&self) -> Option<usize> {
        self.headers.get(header::CONTENT_LENGTH)?.to_str().ok()?.trim().parse::<usize>().ok()
    }

    /// Attaches the body read from the connection, producing the full request.
    pub fn body(self, body: Bytes) -> Request {
        Request {
            method: self.method,
            path: self.path,
            query: Query::new(self.raw_query),
            headers: self.headers,
            params: HashMap::new(),
            body,
        }
    }
}

/// A fully read request, owned by the connection that is processing it.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: Query,
    headers: HeaderMap,
    params: HashMap<String, String>,
    body: Bytes,
}

/// Query string that is either still raw or already decoded.
///
/// Decoding happens on first read and is cached, so handlers holding `&Request`
/// never pay for it unless they ask.
#[derive(Debug)]
struct Query {
    raw: String,
    decoded: OnceCell<HashMap<String, String>>,
}

impl Query {
    fn new(raw: String) -> Self {
        Self { raw, decoded: OnceCell::new() }
    }

    fn params(&self) -> &HashMap<String, String> {
        self.decoded.get_or_init(|| percent::parse_query(&self.raw))
    }

    #[cfg(test)]
    fn is_decoded(&self) -> bool {
        self.decoded.get().is_some()
    }
}

impl Request {
    pub fn method(&self) -> Method {
        self.method
    }

    /// The percent-decoded path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn raw_query(&self) -> &str {
        &self.query.raw
    }

    /// All query parameters, decoded on first access.
    pub fn query_params(&self) -> &HashMap<String, String> {
        self.query.params()
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.params().get(name).map(String::as_str)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Header lookup, case-insensitive on the name. Values that are not visible ASCII read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Route parameters captured by the router, e.g. `id` for `/user/:id`.
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Replaces the route parameters. Called by the router before the handler runs.
    pub fn set_params<I>(&mut self, params: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.params.clear();
        self.params.extend(params);
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Returns true if the `Content-Type` header starts with `content_type`.
    pub fn is(&self, content_type: &str) -> bool {
        self.header(header::CONTENT_TYPE.as_str()).is_some_and(|value| value.starts_with(content_type))
    }

    /// Returns true if the `Accept` header names `content_type` or `*/*`. A missing header accepts everything.
    pub fn accepts(&self, content_type: &str) -> bool {
        let accept = self.header(header::ACCEPT.as_str()).unwrap_or("*/*");
        accept.contains(content_type) || accept.contains("*/*")
    }

    #[cfg(test)]
    fn query_decoded(&self) -> bool {
        self.query.is_decoded()
    }
}

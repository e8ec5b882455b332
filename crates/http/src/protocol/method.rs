//! HTTP request methods understood by the server.
//!
//! [`Method::Any`] only exists on the registration side: routes registered with it
//! match every incoming method, while the request decoder never produces it.

use std::fmt;
use std::str::FromStr;

use crate::protocol::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    /// Registration-only wildcard
    Any,
}

impl Method {
    /// Parses a request-line method token, ignoring ASCII case.
    ///
    /// `ANY` is not a wire method and is rejected like any other unknown token.
    pub fn from_token(token: &str) -> Option<Self> {
        const WIRE_METHODS: [Method; 7] =
            [Method::Get, Method::Post, Method::Put, Method::Delete, Method::Patch, Method::Options, Method::Head];

        WIRE_METHODS.into_iter().find(|method| method.as_str().eq_ignore_ascii_case(token))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
            Method::Any => "ANY",
        }
    }

    /// Returns true if a route registered with `self` accepts a request made with `incoming`.
    #[inline]
    pub fn accepts(&self, incoming: Method) -> bool {
        *self == Method::Any || *self == incoming
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::from_token(s).ok_or_else(|| ParseError::invalid_method(s))
    }
}

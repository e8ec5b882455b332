//! Path templates such as `/user/:id/posts/:post`.
//!
//! A template is scanned once into literal spans and parameter segments. Each `:` starts a
//! parameter that runs to the next `/` or the end of the template; the parameter matches one
//! or more characters other than `/`. A single trailing slash is optional on both the template
//! and the path.
//!
//! Templates with parameters compare their literals ASCII case-insensitively. Templates without
//! parameters compare the whole path exactly.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("path template must start with '/': {template}")]
    MissingLeadingSlash { template: String },

    #[error("empty parameter name at byte {position} in {template}")]
    EmptyParamName { template: String, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
    param_names: Vec<String>,
}

impl PathPattern {
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        if !template.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash { template: template.to_owned() });
        }

        let trimmed = strip_trailing_slash(template);
        let mut segments = Vec::new();
        let mut param_names = Vec::new();
        let mut rest = trimmed;

        while let Some(colon) = rest.find(':') {
            if colon > 0 {
                segments.push(Segment::Literal(rest[..colon].to_owned()));
            }

            let after = &rest[colon + 1..];
            let name_len = after.find('/').unwrap_or(after.len());
            if name_len == 0 {
                let position = trimmed.len() - rest.len() + colon;
                return Err(PatternError::EmptyParamName { template: template.to_owned(), position });
            }

            let name = after[..name_len].to_owned();
            param_names.push(name.clone());
            segments.push(Segment::Param(name));
            rest = &after[name_len..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_owned()));
        }

        Ok(Self { segments, param_names })
    }

    /// Parameter names in template order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    #[inline]
    pub fn has_params(&self) -> bool {
        !self.param_names.is_empty()
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }

    /// Matches `path` and returns the captured values in parameter order.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
        let mut rest = strip_trailing_slash(path);
        let mut captures = Vec::with_capacity(self.param_names.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => {
                    let head = rest.get(..literal.len())?;
                    let same = if self.has_params() { head.eq_ignore_ascii_case(literal) } else { head == literal };
                    if !same {
                        return None;
                    }
                    rest = &rest[literal.len()..];
                }
                Segment::Param(_) => {
                    let len = rest.find('/').unwrap_or(rest.len());
                    if len == 0 {
                        return None;
                    }
                    captures.push(&rest[..len]);
                    rest = &rest[len..];
                }
            }
        }

        rest.is_empty().then_some(captures)
    }

    /// Matches `path` and pairs each parameter name with its captured value.
    pub fn params(&self, path: &str) -> Option<Vec<(String, String)>> {
        let captures = self.captures(path)?;
        Some(self.param_names.iter().zip(captures).map(|(name, value)| (name.clone(), value.to_owned())).collect())
    }
}

#[inline]
fn strip_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(template: &str, path: &str) -> Option<Vec<(String, String)>> {
        PathPattern::parse(template).unwrap().params(path)
    }

    fn pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_literal_template() {
        let pattern = PathPattern::parse("/manual/on").unwrap();
        assert!(!pattern.has_params());
        assert!(pattern.is_match("/manual/on"));
        assert!(pattern.is_match("/manual/on/"));
        assert!(!pattern.is_match("/Manual/ON"));
        assert!(!pattern.is_match("/MANUAL/on/"));
        assert!(!pattern.is_match("/manual/onx"));
        assert!(!pattern.is_match("/manual"));
        assert!(!pattern.is_match("/manual/on//"));
    }

    #[test]
    fn test_root_template() {
        let pattern = PathPattern::parse("/").unwrap();
        assert!(pattern.is_match("/"));
        assert!(pattern.is_match(""));
        assert!(!pattern.is_match("/index.html"));
        assert!(!pattern.is_match("//"));
    }

    #[test]
    fn test_template_trailing_slash() {
        let pattern = PathPattern::parse("/foo/").unwrap();
        assert!(pattern.is_match("/foo"));
        assert!(pattern.is_match("/foo/"));
    }

    #[test]
    fn test_single_param() {
        assert_eq!(params("/user/:id", "/user/42"), Some(pairs(&[("id", "42")])));
        assert_eq!(params("/user/:id", "/user/42/"), Some(pairs(&[("id", "42")])));
        assert_eq!(params("/user/:id", "/user/"), None);
        assert_eq!(params("/user/:id", "/user/42/posts"), None);
    }

    #[test]
    fn test_multiple_params_are_positional() {
        assert_eq!(
            params("/user/:uid/posts/:pid", "/user/7/posts/abc"),
            Some(pairs(&[("uid", "7"), ("pid", "abc")]))
        );
        assert_eq!(params("/:a/:b", "/x/y"), Some(pairs(&[("a", "x"), ("b", "y")])));
    }

    #[test]
    fn test_param_template_literals_ignore_case() {
        assert_eq!(params("/user/:id/posts", "/USER/7/Posts/"), Some(pairs(&[("id", "7")])));
    }

    #[test]
    fn test_param_keeps_case() {
        assert_eq!(params("/Files/:name", "/files/ReadMe"), Some(pairs(&[("name", "ReadMe")])));
    }

    #[test]
    fn test_param_inside_segment() {
        assert_eq!(params("/file-:id", "/file-12"), Some(pairs(&[("id", "12")])));
        assert_eq!(params("/file-:id", "/file-"), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            PathPattern::parse("user/:id"),
            Err(PatternError::MissingLeadingSlash { template: "user/:id".into() })
        );
        assert_eq!(
            PathPattern::parse("/user/:/x"),
            Err(PatternError::EmptyParamName { template: "/user/:/x".into(), position: 6 })
        );
        assert!(matches!(PathPattern::parse("/user/:"), Err(PatternError::EmptyParamName { .. })));
    }

    #[test]
    fn test_param_names() {
        let pattern = PathPattern::parse("/a/:first/b/:second").unwrap();
        assert_eq!(pattern.param_names(), ["first", "second"]);
    }
}

//! Ant-style path matching.
//!
//! # Pattern Syntax
//!
//! - `?` matches exactly one character
//! - `*` matches zero or more characters within a path segment
//! - `**` matches zero or more path segments
//!
//! Empty segments are ignored, so `/spittles/` and `/spittles` are the same
//! path.
//!
//! # Examples
//!
//! ```rust
//! use spittr_security_core::http::security::ant_matcher::AntMatcher;
//!
//! let matcher = AntMatcher::new("/spitters/**");
//! assert!(matcher.matches("/spitters/alice"));
//! assert!(matcher.matches("/spitters/alice/spittles"));
//!
//! let matcher = AntMatcher::new("/spitters/*");
//! assert!(matcher.matches("/spitters/me"));
//! assert!(!matcher.matches("/spitters/alice/spittles"));
//!
//! let matcher = AntMatcher::new("/page?.html");
//! assert!(matcher.matches("/page1.html"));
//! assert!(!matcher.matches("/page12.html"));
//! ```
//!
//! # Spring Equivalent
//!
//! `org.springframework.util.AntPathMatcher`

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// `**`
    AnyPath,
    /// Segment containing `*` or `?`
    Glob(Vec<char>),
    Literal(String),
}

/// Ant-style path matcher.
#[derive(Debug, Clone)]
pub struct AntMatcher {
    pattern: String,
    segments: Vec<Segment>,
    case_sensitive: bool,
}

impl AntMatcher {
    pub fn new(pattern: &str) -> Self {
        AntMatcher {
            pattern: pattern.to_string(),
            segments: Self::parse(pattern, true),
            case_sensitive: true,
        }
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self.segments = Self::parse(&self.pattern, false);
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn parse(pattern: &str, case_sensitive: bool) -> Vec<Segment> {
        pattern
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let part = if case_sensitive {
                    part.to_string()
                } else {
                    part.to_lowercase()
                };
                if part == "**" {
                    Segment::AnyPath
                } else if part.contains(['*', '?']) {
                    Segment::Glob(part.chars().collect())
                } else {
                    Segment::Literal(part)
                }
            })
            .collect()
    }

    /// Checks whether `path` matches the pattern. Query strings are not
    /// stripped; pass the request path only.
    pub fn matches(&self, path: &str) -> bool {
        let path = if self.case_sensitive {
            path.to_string()
        } else {
            path.to_lowercase()
        };
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match_segments(&self.segments, &parts)
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyPath, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((segment, rest)) => match path.split_first() {
            None => false,
            Some((part, path_rest)) => {
                let ok = match segment {
                    Segment::Literal(literal) => literal == part,
                    Segment::Glob(glob) => {
                        let text: Vec<char> = part.chars().collect();
                        match_glob(glob, &text)
                    }
                    Segment::AnyPath => false,
                };
                ok && match_segments(rest, path_rest)
            }
        },
    }
}

fn match_glob(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => (0..=text.len()).any(|skip| match_glob(rest, &text[skip..])),
        Some(('?', rest)) => !text.is_empty() && match_glob(rest, &text[1..]),
        Some((c, rest)) => text.first() == Some(c) && match_glob(rest, &text[1..]),
    }
}

/// A set of patterns, any of which may match.
#[derive(Debug, Clone, Default)]
pub struct AntMatchers {
    matchers: Vec<AntMatcher>,
}

impl AntMatchers {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, pattern: &str) -> Self {
        self.matchers.push(AntMatcher::new(pattern));
        self
    }

    pub fn add_all<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        self.matchers
            .extend(patterns.iter().map(|p| AntMatcher::new(p.as_ref())));
        self
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

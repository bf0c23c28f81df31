use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt;

/// Capture name → matched token, in pattern order.
pub type Bindings = IndexMap<String, String>;

pub const DEFAULT_CAPTURE_MARKER: char = ':';

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the token exactly.
    Literal(String),
    /// Matches any single token and binds it under this name.
    Capture(String),
}

/// An ordered sequence of segments, one per command token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<Segment>,
    marker:   char,
}

impl Pattern {
    /// Tokenizes `source` on whitespace. A token that starts with `marker` and
    /// has a name after it becomes a capture; everything else is a literal.
    ///
    /// # Example
    ///
    /// ```
    /// use cmdform::router::{Pattern, Segment};
    ///
    /// let pattern = Pattern::parse("show loadbalancer :id", ':');
    /// assert_eq!(pattern.segments()[2], Segment::Capture("id".into()));
    /// ```
    pub fn parse(source: &str, marker: char) -> Self {
        let segments = source
            .split_whitespace()
            .map(|token| match token.strip_prefix(marker) {
                Some(name) if !name.is_empty() => Segment::Capture(name.to_string()),
                _ => Segment::Literal(token.to_string()),
            })
            .collect();
        Self { segments, marker }
    }

    /// Literal words only, split on whitespace like commands are. Used for inline routes.
    pub fn literal(words: &str) -> Self {
        Self {
            segments: words.split_whitespace().map(|word| Segment::Literal(word.to_string())).collect(),
            marker:   DEFAULT_CAPTURE_MARKER,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the bindings when every segment accepts its token.
    pub fn matches(&self, argv: &[String]) -> Option<Bindings> {
        if argv.len() != self.segments.len() {
            return None;
        }

        let mut bindings = Bindings::new();
        for (segment, token) in self.segments.iter().zip(argv) {
            match segment {
                Segment::Literal(literal) if literal != token => return None,
                Segment::Literal(_) => {}
                Segment::Capture(name) => {
                    bindings.insert(name.clone(), token.clone());
                }
            }
        }
        Some(bindings)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(literal) => literal.clone(),
                Segment::Capture(name) => format!("{}{}", self.marker, name),
            })
            .join(" ");
        write!(f, "{}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn captures_bind_their_tokens() {
        let pattern = Pattern::parse("show loadbalancer :id", ':');
        let bindings = pattern.matches(&tokens("show loadbalancer 6")).unwrap();
        assert_eq!(bindings["id"], "6");
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn length_must_match_exactly() {
        let pattern = Pattern::parse("show :what", ':');
        assert!(pattern.matches(&tokens("show")).is_none());
        assert!(pattern.matches(&tokens("show a b")).is_none());
    }

    #[test]
    fn literals_compare_exactly() {
        let pattern = Pattern::parse("login", ':');
        assert!(pattern.matches(&tokens("Login")).is_none());
        assert!(pattern.matches(&tokens("login")).is_some());
    }

    #[test]
    fn bare_marker_is_a_literal() {
        let pattern = Pattern::parse("a : b", ':');
        assert_eq!(pattern.segments()[1], Segment::Literal(":".into()));
    }

    #[test]
    fn custom_marker_and_display() {
        let pattern = Pattern::parse("get  @key\tnow", '@');
        assert_eq!(pattern.segments()[1], Segment::Capture("key".into()));
        assert_eq!(pattern.to_string(), "get @key now");
        assert_eq!(Pattern::parse(":id", '@').segments()[0], Segment::Literal(":id".into()));
    }

    #[test]
    fn literal_patterns_never_capture() {
        let pattern = Pattern::literal("config  :show");
        assert_eq!(pattern.segments(), [Segment::Literal("config".into()), Segment::Literal(":show".into())]);
        assert!(pattern.matches(&tokens("config :show")).is_some());
        assert!(pattern.matches(&tokens("config show")).is_none());
    }

    #[test]
    fn empty_pattern_matches_empty_command() {
        let pattern = Pattern::parse("   ", ':');
        assert!(pattern.is_empty());
        assert_eq!(pattern.matches(&[]), Some(Bindings::new()));
    }
}

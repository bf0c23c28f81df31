use std::fmt;

/// Anything that carries a tokenized command line.
pub trait Command {
    fn argv(&self) -> &[String];
}

/// A plain token sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Argv(Vec<String>);

impl Argv {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    /// Splits a line on whitespace; an empty line has no tokens.
    pub fn parse(line: &str) -> Self {
        Self(line.split_whitespace().map(String::from).collect())
    }
}

impl Command for Argv {
    fn argv(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Argv {
    fn from(tokens: Vec<String>) -> Self {
        Self::new(tokens)
    }
}

impl From<&str> for Argv {
    fn from(line: &str) -> Self {
        Self::parse(line)
    }
}

impl fmt::Display for Argv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_any_whitespace() {
        let argv = Argv::parse("  show\tloadbalancer   6 ");
        assert_eq!(argv.argv(), ["show", "loadbalancer", "6"]);
        assert_eq!(argv.to_string(), "show loadbalancer 6");
    }

    #[test]
    fn empty_line_has_no_tokens() {
        assert!(Argv::parse("").argv().is_empty());
    }
}

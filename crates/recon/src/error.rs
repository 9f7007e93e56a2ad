use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No package id starts with the given text.
    NotFound(String),
    /// More than one package id starts with the given text.
    Ambiguous { prefix: String, matches: usize },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) if id.is_empty() => write!(f, "no package id given"),
            Self::NotFound(id) => write!(f, "no package with id '{id}'"),
            Self::Ambiguous { prefix, matches } => {
                write!(f, "id prefix '{prefix}' matches {matches} packages")
            }
        }
    }
}

impl std::error::Error for LookupError {}

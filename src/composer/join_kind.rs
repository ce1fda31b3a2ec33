use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Kind of a JOIN fragment.
///
/// `left` and `right` are treated as their OUTER forms, and the short
/// aliases `l`, `r` and `f` map to LEFT, RIGHT and FULL OUTER.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    #[default]
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

impl JoinKind {
    /// Normalizes a free-form join kind. Never fails: anything unrecognized
    /// becomes `Inner`.
    pub fn parse(kind: &str) -> JoinKind {
        let lowered = kind.trim().to_lowercase();
        let normalized = WHITESPACE.replace_all(&lowered, " ");

        match &*normalized {
            "" | "inner" => JoinKind::Inner,
            "l" | "left" | "left outer" => JoinKind::LeftOuter,
            "r" | "right" | "right outer" => JoinKind::RightOuter,
            "f" | "full" | "full outer" => JoinKind::FullOuter,
            other => {
                tracing::trace!(kind = other, "unrecognized join kind, using INNER");
                JoinKind::Inner
            }
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::LeftOuter => "LEFT OUTER",
            JoinKind::RightOuter => "RIGHT OUTER",
            JoinKind::FullOuter => "FULL OUTER",
        }
    }
}

impl From<&str> for JoinKind {
    fn from(value: &str) -> Self {
        JoinKind::parse(value)
    }
}

impl From<&String> for JoinKind {
    fn from(value: &String) -> Self {
        JoinKind::parse(value)
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} JOIN", self.keyword())
    }
}

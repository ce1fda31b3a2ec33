/// Clause that most recently received content on a node. `and`/`or`
/// continuations are routed to it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    #[default]
    None,
    From,
    Joins,
    Where,
    GroupBy,
    OrderBy,
    Having,
}

/// Connective used by a continuation fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn keyword(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

/// A WHERE condition: either one fragment or several joined with `AND`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Single(String),
    All(Vec<String>),
}

impl Condition {
    pub fn to_sql(&self) -> String {
        match self {
            Condition::Single(text) => text.clone(),
            Condition::All(parts) => parts.join(" AND "),
        }
    }
}

impl From<&str> for Condition {
    fn from(value: &str) -> Self {
        Condition::Single(value.to_string())
    }
}

impl From<String> for Condition {
    fn from(value: String) -> Self {
        Condition::Single(value)
    }
}

impl From<Vec<String>> for Condition {
    fn from(value: Vec<String>) -> Self {
        Condition::All(value)
    }
}

impl From<Vec<&str>> for Condition {
    fn from(value: Vec<&str>) -> Self {
        Condition::All(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Condition {
    fn from(value: [&str; N]) -> Self {
        Condition::All(value.iter().map(|part| part.to_string()).collect())
    }
}

impl From<&[&str]> for Condition {
    fn from(value: &[&str]) -> Self {
        Condition::All(value.iter().map(|part| part.to_string()).collect())
    }
}

/// Offset/count pair of a LIMIT clause. Defaults to `LIMIT 0, 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub offset: u64,
    pub count: u64,
}

impl Limit {
    pub const DEFAULT_OFFSET: u64 = 0;
    pub const DEFAULT_COUNT: u64 = 100;

    pub fn new(offset: u64, count: u64) -> Self {
        Self { offset, count }
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self { offset: Self::DEFAULT_OFFSET, count: Self::DEFAULT_COUNT }
    }
}

impl From<(u64, u64)> for Limit {
    fn from((offset, count): (u64, u64)) -> Self {
        Self { offset, count }
    }
}

/// A bare count starts at offset 0.
impl From<u64> for Limit {
    fn from(count: u64) -> Self {
        Self { offset: Self::DEFAULT_OFFSET, count }
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ComposerResult, ParamMap};

/// Shape of the rows returned by [`Connection::fetch`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum FetchMode {
    /// Every row, as objects.
    #[default]
    All,
    /// Only the first row.
    One,
    /// The first column of every row.
    Column,
}

impl FetchMode {
    /// Reshapes object rows according to the mode. Collaborators that only
    /// know how to fetch everything can pass their rows through this.
    pub fn shape(&self, rows: Vec<Value>) -> Vec<Value> {
        match self {
            FetchMode::All => rows,
            FetchMode::One => rows.into_iter().take(1).collect(),
            FetchMode::Column => rows
                .into_iter()
                .map(|row| match row {
                    Value::Object(map) => map.into_iter().next().map(|(_, v)| v).unwrap_or(Value::Null),
                    Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
                    other => other,
                })
                .collect(),
        }
    }
}

/// Turns a string into a driver safe literal.
pub trait Quote {
    /// ANSI quoting: wrap in single quotes, double embedded ones.
    fn quote(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// External collaborator that runs finished statements.
///
/// The composer only produces SQL text and passes parameters through; all
/// binding, escaping and transaction semantics live behind this trait.
pub trait Connection: Quote {
    type Statement;

    fn prepare(&mut self, sql: &str) -> ComposerResult<Self::Statement>;
    fn execute(&mut self, statement: &mut Self::Statement, params: &ParamMap) -> ComposerResult<()>;
    fn fetch(&mut self, statement: &mut Self::Statement, mode: FetchMode) -> ComposerResult<Vec<Value>>;
    /// Runs a raw statement for its side effects, returning affected rows.
    fn exec(&mut self, statement: &str) -> ComposerResult<u64>;
}

/// Stand-in for composers that only render text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Detached;

impl Quote for Detached {}

impl<Q: Quote + ?Sized> Quote for &Q {
    fn quote(&self, value: &str) -> String {
        (**self).quote(value)
    }
}

impl<Q: Quote + ?Sized> Quote for &mut Q {
    fn quote(&self, value: &str) -> String {
        (**self).quote(value)
    }
}

impl<C: Connection + ?Sized> Connection for &mut C {
    type Statement = C::Statement;

    fn prepare(&mut self, sql: &str) -> ComposerResult<Self::Statement> {
        (**self).prepare(sql)
    }

    fn execute(&mut self, statement: &mut Self::Statement, params: &ParamMap) -> ComposerResult<()> {
        (**self).execute(statement, params)
    }

    fn fetch(&mut self, statement: &mut Self::Statement, mode: FetchMode) -> ComposerResult<Vec<Value>> {
        (**self).fetch(statement, mode)
    }

    fn exec(&mut self, statement: &str) -> ComposerResult<u64> {
        (**self).exec(statement)
    }
}

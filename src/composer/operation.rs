use crate::{
    composer::{Condition, Limit, QueryComposer},
    ComposerError, ComposerResult,
};

/// Composer operations reachable by name through [`QueryComposer::call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Preamble,
    Select,
    From,
    Join,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    And,
    Or,
    OpenSubquery,
    CloseSubquery,
}

impl Operation {
    /// Resolves snake_case and camelCase spellings. `and`/`or` are the
    /// continuation operations.
    pub fn from_name(name: &str) -> ComposerResult<Operation> {
        let operation = match name {
            "pre" | "preamble" | "set_preamble" | "setPreamble" => Operation::Preamble,
            "select" => Operation::Select,
            "from" => Operation::From,
            "join" => Operation::Join,
            "where" => Operation::Where,
            "group_by" | "groupBy" => Operation::GroupBy,
            "having" => Operation::Having,
            "order_by" | "orderBy" => Operation::OrderBy,
            "limit" => Operation::Limit,
            "and" | "continue_and" | "continueAnd" => Operation::And,
            "or" | "continue_or" | "continueOr" => Operation::Or,
            "open_subquery" | "openSubquery" | "add_subquery" | "addSubQuery" => Operation::OpenSubquery,
            "close_subquery" | "closeSubquery" => Operation::CloseSubquery,
            other => return ComposerError::UnsupportedOperation(other.to_string()).err(),
        };

        Ok(operation)
    }
}

fn parse_count(operation: &str, value: Option<&&str>, default: u64) -> ComposerResult<u64> {
    match value {
        None => Ok(default),
        Some(text) => text.trim().parse::<u64>().map_err(|_| ComposerError::InvalidArgument {
            operation: operation.to_string(),
            value: text.to_string(),
        }),
    }
}

impl<C> QueryComposer<C> {
    /// Invokes an operation by name with string arguments, for callers that
    /// build queries from data. Unknown names fail with
    /// [`ComposerError::UnsupportedOperation`].
    pub fn call(&mut self, name: &str, args: &[&str]) -> ComposerResult<&mut Self> {
        let operation = Operation::from_name(name)?;
        let missing = |position: usize| ComposerError::MissingArgument {
            operation: name.to_string(),
            position: position + 1,
        };
        let arg = |position: usize| args.get(position).copied().ok_or_else(|| missing(position));

        match operation {
            Operation::Preamble => self.set_preamble(arg(0)?),
            Operation::Select => self.select(arg(0)?),
            Operation::From => self.from(arg(0)?),
            Operation::Join => {
                let kind = args.get(2).copied().unwrap_or("inner");
                self.join(arg(0)?, arg(1)?, kind)
            }
            Operation::Where => {
                let condition = match args {
                    [] => return Err(missing(0)),
                    [single] => Condition::from(*single),
                    many => Condition::from(many),
                };
                self.r#where(condition)
            }
            Operation::GroupBy => self.group_by(arg(0)?),
            Operation::Having => self.having(arg(0)?),
            Operation::OrderBy => self.order_by(arg(0)?),
            Operation::Limit => {
                let offset = parse_count(name, args.first(), Limit::DEFAULT_OFFSET)?;
                let count = parse_count(name, args.get(1), Limit::DEFAULT_COUNT)?;
                self.limit(Limit::new(offset, count))
            }
            Operation::And => self.continue_and(arg(0)?),
            Operation::Or => self.continue_or(arg(0)?),
            Operation::OpenSubquery => {
                let start = args.get(1).copied().unwrap_or("");
                self.open_subquery_with(arg(0)?, start)
            }
            Operation::CloseSubquery => self.close_subquery(),
        };

        Ok(self)
    }
}

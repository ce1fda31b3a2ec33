use std::fmt::Display;

/// Errors surfaced by the composer and by execution collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum ComposerError {
    /// A dynamically invoked operation name is not known.
    UnsupportedOperation(String),
    /// A dynamically invoked operation was called without a required argument.
    MissingArgument { operation: String, position: usize },
    /// An argument could not be interpreted, e.g. a non numeric limit.
    InvalidArgument { operation: String, value: String },
    /// Failure reported by the database collaborator.
    Database(String),
}

pub type ComposerResult<T> = Result<T, ComposerError>;

impl ComposerError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    pub fn err<T>(self) -> ComposerResult<T> {
        Err(self)
    }
}

impl Display for ComposerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComposerError::UnsupportedOperation(name) => {
                write!(f, "ComposerError: unsupported operation '{}'", name)
            }
            ComposerError::MissingArgument { operation, position } => write!(
                f,
                "ComposerError: '{}' is missing argument #{}",
                operation, position
            ),
            ComposerError::InvalidArgument { operation, value } => write!(
                f,
                "ComposerError: '{}' cannot use argument '{}'",
                operation, value
            ),
            ComposerError::Database(message) => write!(f, "ComposerError: database: {}", message),
        }
    }
}

impl std::error::Error for ComposerError {}

use std::path::PathBuf;
use thiserror::Error;

use crate::core::api::ApiError;

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Every failure a single command cycle can produce.
///
/// All variants are recovered at the evaluator loop: the message is printed,
/// and the process only exits when exit-on-error mode is active.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Syntax error: {0}")]
    Lex(String),

    #[error("Variable is not defined: ${0}")]
    UndefinedVariable(String),

    #[error("Argument type is invalid: arg=[{arg}] expectedType=[{expected}]")]
    InvalidType { arg: String, expected: String },

    #[error("Argument is missing: <{0}>")]
    MissingArgument(String),

    #[error("Too many arguments")]
    TooManyArguments,

    #[error("Command not found: {0}")]
    UnknownCommand(String),

    #[error("End of input reached while reading a multi-line command")]
    UnexpectedEndOfInput,

    #[error("{message}")]
    Handler {
        message: String,
        #[source]
        cause: Option<Cause>,
    },

    #[error("Cluster variable ${cluster} is invalid: {reason}")]
    InvalidCluster { cluster: String, reason: String },

    #[error("{message}: file=[{}]", path.display())]
    Script { path: PathBuf, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShellError {
    pub fn handler(message: impl Into<String>) -> Self {
        ShellError::Handler {
            message: message.into(),
            cause: None,
        }
    }

    pub fn handler_with(message: impl Into<String>, cause: impl Into<Cause>) -> Self {
        ShellError::Handler {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn invalid_type(arg: impl Into<String>, expected: impl Into<String>) -> Self {
        ShellError::InvalidType {
            arg: arg.into(),
            expected: expected.into(),
        }
    }

    /// Underlying cause, if any, for the log. Never shown to the user.
    pub fn cause_chain(&self) -> Option<String> {
        let mut source = std::error::Error::source(self)?;
        let mut chain = source.to_string();
        while let Some(next) = source.source() {
            chain.push_str(": ");
            chain.push_str(&next.to_string());
            source = next;
        }
        Some(chain)
    }
}

impl From<ApiError> for ShellError {
    fn from(err: ApiError) -> Self {
        ShellError::handler_with(err.to_string(), err)
    }
}

//! Errors raised while running the interactive shell.

use crate::models::ResultId;
use crate::sources::SourceError;
use crate::storage::GatewayError;

/// Errors raised by the parsers, the result registry and the session loop.
///
/// None of these are handled where they are raised: they travel up to the
/// shell dispatcher, which either reports them (prod) or stops (dev).
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// The user entered no tokens
    #[error("no command given")]
    EmptyInput,

    /// The first token is not part of the vocabulary
    #[error("'{given}' is not a valid command, expected one of: {}", .expected.join(", "))]
    UnknownCommand {
        given: String,
        expected: Vec<&'static str>,
    },

    /// Wrong number of arguments for the command
    #[error("'{command}' expects {expected} argument(s), got {got}")]
    Arity {
        command: &'static str,
        expected: &'static str,
        got: usize,
    },

    /// An argument is not an integer
    #[error("'{0}' is not a valid integer argument")]
    ArgumentType(String),

    /// The id was never shown in this session
    #[error("{0} is not a valid result id")]
    UnknownId(ResultId),

    /// The id was already registered in this session
    #[error("result id {0} is already registered")]
    DuplicateId(ResultId),

    /// The query contained nothing to search for
    #[error("search query is empty")]
    EmptyQuery,

    /// Console input ended while a response was expected
    #[error("input closed")]
    InputClosed,

    /// The session already finished
    #[error("search session already finished")]
    SessionClosed,

    /// The search provider failed
    #[error("search failed: {0}")]
    Source(#[from] SourceError),

    /// Committing the selection failed
    #[error("saving papers failed: {0}")]
    Gateway(#[from] GatewayError),

    /// Reading or writing the console failed
    #[error("console error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type used throughout the shell
pub type ShellResult<T> = Result<T, ShellError>;

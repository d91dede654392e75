//! Parsers for the mode prompt and the search-session response prompt.

use std::fmt;

use crate::models::ResultId;
use crate::shell::error::{ShellError, ShellResult};
use crate::shell::registry::ResultRegistry;

/// Split a console line into tokens
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// How many arguments a command takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    /// Whether `count` arguments satisfy this arity
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Arity::Exactly(0) => "no",
            Arity::Exactly(1) => "exactly 1",
            Arity::AtLeast(0) => "0 or more",
            Arity::Exactly(_) | Arity::AtLeast(_) => "a different number of",
        }
    }
}

/// Keywords accepted at the response prompt of a search session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    More,
    Cont,
    Add,
    Quit,
    View,
}

impl CommandKind {
    /// The full vocabulary, in menu order
    pub const ALL: [CommandKind; 5] = [
        CommandKind::More,
        CommandKind::Add,
        CommandKind::View,
        CommandKind::Cont,
        CommandKind::Quit,
    ];

    /// Keyword typed by the user
    pub fn keyword(self) -> &'static str {
        match self {
            CommandKind::More => "more",
            CommandKind::Cont => "cont",
            CommandKind::Add => "add",
            CommandKind::Quit => "quit",
            CommandKind::View => "view",
        }
    }

    /// Usage line shown in the menu
    pub fn usage(self) -> &'static str {
        match self {
            CommandKind::More => "more <id>",
            CommandKind::Cont => "cont",
            CommandKind::Add => "add [<id> ...]",
            CommandKind::Quit => "quit",
            CommandKind::View => "view",
        }
    }

    /// What the command does
    pub fn description(self) -> &'static str {
        match self {
            CommandKind::More => "show the full details of a result",
            CommandKind::Cont => "continue to the next page of results",
            CommandKind::Add => "add results to the papers to save",
            CommandKind::Quit => "save the selected papers and leave search",
            CommandKind::View => "show the papers selected so far",
        }
    }

    /// Number of arguments the command takes
    pub fn arity(self) -> Arity {
        match self {
            CommandKind::More => Arity::Exactly(1),
            CommandKind::Add => Arity::AtLeast(0),
            CommandKind::Cont | CommandKind::Quit | CommandKind::View => Arity::Exactly(0),
        }
    }

    /// Case-sensitive keyword lookup
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }

    fn keywords() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.keyword()).collect()
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A validated response to a page of results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show one result in full
    More(ResultId),
    /// Select the given results
    Add(Vec<ResultId>),
    /// Fetch the next page
    Cont,
    /// Commit the selection and end the session
    Quit,
    /// Show the selection
    View,
}

impl Command {
    /// Parse a tokenized response against the vocabulary.
    ///
    /// `more` is checked against `registry` here; the ids given to `add` are
    /// only checked when they are selected.
    pub fn parse(tokens: &[&str], registry: &ResultRegistry) -> ShellResult<Command> {
        let (keyword, args) = tokens.split_first().ok_or(ShellError::EmptyInput)?;

        let kind = CommandKind::from_keyword(keyword).ok_or_else(|| ShellError::UnknownCommand {
            given: keyword.to_string(),
            expected: CommandKind::keywords(),
        })?;

        let arity = kind.arity();
        if !arity.accepts(args.len()) {
            return Err(ShellError::Arity {
                command: kind.keyword(),
                expected: arity.describe(),
                got: args.len(),
            });
        }

        let ids = args
            .iter()
            .map(|arg| {
                arg.parse::<ResultId>()
                    .map_err(|_| ShellError::ArgumentType(arg.to_string()))
            })
            .collect::<ShellResult<Vec<_>>>()?;

        Ok(match kind {
            CommandKind::More => {
                let id = ids[0];
                if !registry.is_valid(id) {
                    return Err(ShellError::UnknownId(id));
                }
                Command::More(id)
            }
            CommandKind::Add => Command::Add(ids),
            CommandKind::Cont => Command::Cont,
            CommandKind::Quit => Command::Quit,
            CommandKind::View => Command::View,
        })
    }

    /// The vocabulary entry this command belongs to
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::More(_) => CommandKind::More,
            Command::Add(_) => CommandKind::Add,
            Command::Cont => CommandKind::Cont,
            Command::Quit => CommandKind::Quit,
            Command::View => CommandKind::View,
        }
    }

    /// Integer arguments of the command
    pub fn args(&self) -> Vec<ResultId> {
        match self {
            Command::More(id) => vec![*id],
            Command::Add(ids) => ids.clone(),
            Command::Cont | Command::Quit | Command::View => Vec::new(),
        }
    }
}

/// Top-level shell modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Search,
    Suggest,
    Saved,
    Exit,
    Help,
}

impl Mode {
    /// All modes, in menu order
    pub const ALL: [Mode; 5] = [Mode::Search, Mode::Suggest, Mode::Saved, Mode::Help, Mode::Exit];

    /// Keyword typed by the user
    pub fn keyword(self) -> &'static str {
        match self {
            Mode::Search => "search",
            Mode::Suggest => "suggest",
            Mode::Saved => "saved",
            Mode::Exit => "exit",
            Mode::Help => "help",
        }
    }

    /// What the mode does
    pub fn description(self) -> &'static str {
        match self {
            Mode::Search => "search for papers",
            Mode::Suggest => "suggested papers based on gathered citations",
            Mode::Saved => "view previously saved papers",
            Mode::Exit => "exit the program",
            Mode::Help => "what each mode does",
        }
    }

    /// Case-sensitive keyword lookup; `explore` is accepted for `saved`
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword == "explore" {
            return Some(Mode::Saved);
        }
        Self::ALL.into_iter().find(|mode| mode.keyword() == keyword)
    }

    /// Parse the mode prompt: exactly one known keyword
    pub fn parse(tokens: &[&str]) -> ShellResult<Mode> {
        let [keyword] = tokens else {
            return Err(ShellError::Arity {
                command: "mode selection",
                expected: Arity::Exactly(1).describe(),
                got: tokens.len(),
            });
        };

        Self::from_keyword(keyword).ok_or_else(|| ShellError::UnknownCommand {
            given: keyword.to_string(),
            expected: Self::ALL.iter().map(|mode| mode.keyword()).collect(),
        })
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

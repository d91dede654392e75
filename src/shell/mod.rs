//! The interactive shell.
//!
//! [`Shell`] shows the mode prompt and dispatches each mode:
//!
//! - `search` runs one [`SearchSession`] and commits its selection,
//! - `suggest` and `saved` (alias `explore`) read the library through the
//!   [`Catalog`],
//! - `help` describes the modes and `exit` leaves.
//!
//! Errors from a mode end that mode. What happens next depends on the
//! [`RunMode`]: in `prod` the error is printed and the mode prompt comes
//! back, in `dev` it is returned to the caller.

pub mod command;
mod console;
mod error;
mod registry;
mod session;

pub use command::{tokenize, Arity, Command, CommandKind, Mode};
pub use console::Console;
pub use error::{ShellError, ShellResult};
pub use registry::ResultRegistry;
pub use session::{normalize_query, SearchSession, SessionState};

use clap::ValueEnum;
use std::io::{BufRead, Write};

use crate::config::SearchConfig;
use crate::sources::Source;
use crate::storage::{Catalog, Gateway};
use crate::ui;

/// How the shell treats errors raised by a mode
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Print the error and return to the mode prompt
    Prod,
    /// Stop the shell with the error
    Dev,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Prod => f.write_str("prod"),
            RunMode::Dev => f.write_str("dev"),
        }
    }
}

/// Collaborators used by the shell
#[derive(Debug, Clone, Copy)]
pub struct Services<'a> {
    pub source: &'a dyn Source,
    pub gateway: &'a dyn Gateway,
    pub catalog: &'a dyn Catalog,
    pub search: &'a SearchConfig,
    pub suggestion_limit: usize,
}

/// Whether the shell keeps prompting after a mode finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellControl {
    Continue,
    Exit,
}

/// The mode prompt loop
#[derive(Debug)]
pub struct Shell<'a, R, W> {
    services: Services<'a>,
    console: Console<R, W>,
    run_mode: RunMode,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(services: Services<'a>, console: Console<R, W>, run_mode: RunMode) -> Self {
        Self {
            services,
            console,
            run_mode,
        }
    }

    /// Give back the console, e.g. to inspect captured output
    pub fn into_console(self) -> Console<R, W> {
        self.console
    }

    /// Prompt for modes until `exit` or end of input.
    ///
    /// Console failures always stop the shell, whatever the run mode.
    pub async fn run(&mut self) -> ShellResult<()> {
        self.console.println(ui::banner())?;

        loop {
            match self.step().await {
                Ok(ShellControl::Exit) => return Ok(()),
                Ok(ShellControl::Continue) => {}
                Err(err) => self.recover(err)?,
            }
        }
    }

    /// Read one mode selection and run it
    pub async fn step(&mut self) -> ShellResult<ShellControl> {
        self.console.blank()?;
        self.console.println(ui::mode_menu())?;

        let Some(line) = self.console.prompt("mode: ")? else {
            return Ok(ShellControl::Exit);
        };
        let mode = Mode::parse(&tokenize(&line))?;
        self.dispatch(mode).await
    }

    /// Run `mode` to completion
    pub async fn dispatch(&mut self, mode: Mode) -> ShellResult<ShellControl> {
        tracing::debug!(%mode, "Entering mode");

        match mode {
            Mode::Search => {
                let services = self.services;
                let mut session =
                    SearchSession::new(services.source, services.gateway, services.search);
                session.run(&mut self.console).await?;
            }
            Mode::Suggest => {
                let suggestions = self
                    .services
                    .catalog
                    .suggestions(self.services.suggestion_limit)?;
                self.console.println(ui::suggestion_table(&suggestions))?;
            }
            Mode::Saved => {
                let papers = self.services.catalog.saved_papers()?;
                self.console.println(ui::saved_table(&papers))?;
            }
            Mode::Help => self.console.println(ui::mode_help())?,
            Mode::Exit => return Ok(ShellControl::Exit),
        }

        Ok(ShellControl::Continue)
    }

    fn recover(&mut self, err: ShellError) -> ShellResult<()> {
        match (self.run_mode, err) {
            (_, err @ ShellError::Io(_)) | (RunMode::Dev, err) => Err(err),
            (RunMode::Prod, err) => {
                tracing::warn!(error = %err, "Mode failed");
                self.console.println(ui::error_line(&err))?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::{make_paper, MockSource};
    use crate::storage::mock::RecordingGateway;
    use crate::storage::{SavedPaper, Suggestion};
    use std::io::Cursor;
    use std::path::PathBuf;

    struct Fixture {
        source: MockSource,
        gateway: RecordingGateway,
        search: SearchConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                source: MockSource::with_papers(vec![
                    make_paper("2301.00001", "First"),
                    make_paper("2301.00002", "Second"),
                ]),
                gateway: RecordingGateway::new(),
                search: SearchConfig::default(),
            }
        }

        fn shell(&self, script: &str, run_mode: RunMode) -> Shell<'_, Cursor<String>, Vec<u8>> {
            let services = Services {
                source: &self.source,
                gateway: &self.gateway,
                catalog: &self.gateway,
                search: &self.search,
                suggestion_limit: 5,
            };
            let console = Console::new(Cursor::new(script.to_string()), Vec::new());
            Shell::new(services, console, run_mode)
        }
    }

    fn output(shell: Shell<'_, Cursor<String>, Vec<u8>>) -> String {
        String::from_utf8(shell.into_console().into_output()).unwrap()
    }

    #[tokio::test]
    async fn test_exit_and_end_of_input() {
        let fixture = Fixture::new();

        let mut shell = fixture.shell("exit\nsearch\n", RunMode::Dev);
        shell.run().await.unwrap();

        let mut shell = fixture.shell("", RunMode::Dev);
        shell.run().await.unwrap();

        assert_eq!(fixture.source.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_two_tokens_never_enter_search() {
        let fixture = Fixture::new();
        let mut shell = fixture.shell("search extra\nq\nquit\n", RunMode::Dev);

        let err = shell.run().await.unwrap_err();
        assert!(matches!(
            err,
            ShellError::Arity { command: "mode selection", got: 2, .. }
        ));
        assert_eq!(fixture.source.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_mode() {
        let fixture = Fixture::new();
        let mut shell = fixture.shell("browse\n", RunMode::Dev);
        assert!(matches!(
            shell.step().await,
            Err(ShellError::UnknownCommand { given, .. }) if given == "browse"
        ));
    }

    #[tokio::test]
    async fn test_prod_recovers_and_starts_over() {
        let fixture = Fixture::new();
        let script = "search extra\nsearch\nq\nadd 9\nsearch\nq\nadd 2\nquit\nexit\n";
        let mut shell = fixture.shell(script, RunMode::Prod);

        shell.run().await.unwrap();
        assert_eq!(fixture.gateway.submissions(), vec![vec![2]]);

        let out = output(shell);
        assert!(out.contains("error:"));
        assert!(out.contains("'mode selection' expects"));
        assert!(out.contains("9 is not a valid result id"));
        assert!(out.contains("saved 1 paper(s)"));
    }

    #[tokio::test]
    async fn test_dev_propagates_session_errors() {
        let fixture = Fixture::new();
        let mut shell = fixture.shell("search\n\n", RunMode::Dev);
        assert!(matches!(shell.run().await, Err(ShellError::EmptyQuery)));
    }

    #[tokio::test]
    async fn test_help_saved_and_suggest() {
        let fixture = Fixture::new();
        fixture.gateway.set_saved(vec![SavedPaper {
            paper_id: "2301.00001".to_string(),
            title: "Stored Paper".to_string(),
            authors: "Test Author".to_string(),
            published_date: Some("2023-01-01".to_string()),
            pdf_path: PathBuf::from("papers/2301.00001.pdf"),
            saved_at: "2023-02-01 10:00:00".to_string(),
            references: 1,
        }]);
        fixture.gateway.set_suggestions(vec![Suggestion {
            title: "Often Cited".to_string(),
            authors: "Someone".to_string(),
            arxiv_id: None,
            doi: Some("10.1000/xyz".to_string()),
            cited_by: 3,
        }]);

        let mut shell = fixture.shell("help\nexplore\nsuggest\nexit\n", RunMode::Dev);
        shell.run().await.unwrap();

        let out = output(shell);
        assert!(out.contains("what each mode does"));
        assert!(out.contains("Stored Paper"));
        assert!(out.contains("Often Cited"));
        assert!(out.contains("doi:10.1000/xyz"));
    }
}

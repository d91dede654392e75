//! The search session: query, paged results, selection, commit.

use std::io::{BufRead, Write};

use crate::config::SearchConfig;
use crate::models::SearchQuery;
use crate::shell::command::{tokenize, Command};
use crate::shell::console::Console;
use crate::shell::error::{ShellError, ShellResult};
use crate::shell::registry::ResultRegistry;
use crate::sources::{ResultPages, Source};
use crate::storage::{Gateway, SubmitReport};
use crate::ui;

/// Where a search session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the free-text query
    AwaitingQuery,
    /// About to fetch and print the next page
    PageDisplayed,
    /// Waiting for a command about the printed results
    AwaitingResponse,
    /// Handing the selection to the gateway
    Submitting,
    /// Selection committed
    Terminated,
    /// An error ended the session; its selection is dropped
    Aborted,
}

/// Split a raw query into search terms.
///
/// Every character in `strip_chars` is removed from each whitespace-separated
/// token and tokens left empty are dropped. A query with no terms left is
/// rejected so it never reaches the provider.
pub fn normalize_query(raw: &str, strip_chars: &str) -> ShellResult<Vec<String>> {
    let terms = raw
        .split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| !strip_chars.contains(*c))
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return Err(ShellError::EmptyQuery);
    }
    Ok(terms)
}

/// One interactive search session.
///
/// The session exclusively owns its [`ResultRegistry`]; the registry is
/// handed to the gateway on `quit` and dropped with the session otherwise.
#[derive(Debug)]
pub struct SearchSession<'a> {
    source: &'a dyn Source,
    gateway: &'a dyn Gateway,
    settings: &'a SearchConfig,
    registry: ResultRegistry,
    state: SessionState,
}

impl<'a> SearchSession<'a> {
    /// Create a session waiting for its query
    pub fn new(source: &'a dyn Source, gateway: &'a dyn Gateway, settings: &'a SearchConfig) -> Self {
        Self {
            source,
            gateway,
            settings,
            registry: ResultRegistry::new(),
            state: SessionState::AwaitingQuery,
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Results seen and selected so far
    pub fn registry(&self) -> &ResultRegistry {
        &self.registry
    }

    /// Drive the session until the selection is committed.
    ///
    /// Errors end the session in [`SessionState::Aborted`] and are returned
    /// to the caller untouched.
    pub async fn run<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
    ) -> ShellResult<SubmitReport> {
        match self.drive(console).await {
            Ok(report) => Ok(report),
            Err(err) => {
                tracing::debug!(state = ?self.state, error = %err, "Search session aborted");
                self.state = SessionState::Aborted;
                Err(err)
            }
        }
    }

    async fn drive<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
    ) -> ShellResult<SubmitReport> {
        let mut pages: Option<ResultPages<'a>> = None;

        loop {
            self.state = match self.state {
                SessionState::AwaitingQuery => {
                    pages = Some(self.read_query(console)?);
                    SessionState::PageDisplayed
                }
                SessionState::PageDisplayed => match pages.as_mut() {
                    Some(pages) => {
                        self.display_page(pages, console).await?;
                        SessionState::AwaitingResponse
                    }
                    None => SessionState::AwaitingQuery,
                },
                SessionState::AwaitingResponse => self.respond(console)?,
                SessionState::Submitting => {
                    let report = self.gateway.submit(&self.registry).await?;
                    tracing::info!(saved = report.saved.len(), "Search session committed");
                    console.println(ui::submit_summary(&report))?;
                    self.state = SessionState::Terminated;
                    return Ok(report);
                }
                SessionState::Terminated | SessionState::Aborted => {
                    return Err(ShellError::SessionClosed);
                }
            };
        }
    }

    fn read_query<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
    ) -> ShellResult<ResultPages<'a>> {
        let raw = console
            .prompt("query: ")?
            .ok_or(ShellError::InputClosed)?;
        let terms = normalize_query(&raw, &self.settings.strip_chars)?;
        let query = SearchQuery::new(terms).page_size(self.settings.page_size);
        tracing::debug!(query = %query.text(), "Starting search");
        Ok(ResultPages::new(self.source, query))
    }

    async fn display_page<R: BufRead, W: Write>(
        &mut self,
        pages: &mut ResultPages<'a>,
        console: &mut Console<R, W>,
    ) -> ShellResult<()> {
        match pages.next_page().await? {
            Some(page) => {
                console.blank()?;
                for (id, paper) in page {
                    let line = ui::result_line(id, &paper);
                    self.registry.add_valid(id, paper)?;
                    console.println(line)?;
                }
            }
            None if self.registry.is_empty() => {
                console.println(format!("no results for '{}'", pages.query().text()))?;
            }
            None => console.println("no more results")?,
        }

        console.blank()?;
        console.println(ui::command_menu())?;
        Ok(())
    }

    fn respond<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
    ) -> ShellResult<SessionState> {
        let line = console.prompt("> ")?.ok_or(ShellError::InputClosed)?;
        let tokens = tokenize(&line);

        match Command::parse(&tokens, &self.registry)? {
            Command::More(id) => {
                console.println(ui::paper_detail(id, self.registry.get(id)?))?;
                Ok(SessionState::AwaitingResponse)
            }
            Command::Add(ids) => {
                self.registry.select_all(&ids)?;
                console.println(format!(
                    "{} paper(s) selected",
                    self.registry.selected_len()
                ))?;
                Ok(SessionState::AwaitingResponse)
            }
            Command::View => {
                console.println(self.registry.describe())?;
                Ok(SessionState::AwaitingResponse)
            }
            Command::Cont => Ok(SessionState::PageDisplayed),
            Command::Quit => Ok(SessionState::Submitting),
        }
    }
}

//! Terminal output for the interactive shell.
//!
//! Every function here builds a `String`; the shell writes it through its
//! console so the same text can be captured in tests. Colors are off until
//! [`set_colors`] turns them on, which the binary does when stdout is a
//! terminal.

use owo_colors::{OwoColorize, Style};
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::models::{Paper, ResultId};
use crate::shell::{CommandKind, Mode};
use crate::storage::{SavedPaper, SubmitReport, Suggestion};

static COLORS: AtomicBool = AtomicBool::new(false);

/// Enable or disable ANSI colors in everything this module renders
pub fn set_colors(enabled: bool) {
    COLORS.store(enabled, Ordering::Relaxed);
}

/// Whether colors are enabled
pub fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal()
}

fn paint(text: impl Display, style: Style) -> String {
    if colors_enabled() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

fn label(text: &str) -> String {
    paint(text, Style::new().bold().cyan())
}

fn dim(text: impl Display) -> String {
    paint(text, Style::new().dimmed())
}

/// Welcome banner for the application.
pub fn banner() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        "{}\n{}",
        paint(format!("arxivist v{}", version), Style::new().bold().blue()),
        dim("search arXiv, save papers and their references"),
    )
}

/// The mode prompt menu
pub fn mode_menu() -> String {
    let modes = Mode::ALL
        .iter()
        .map(|mode| paint(mode.keyword(), Style::new().yellow()))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("modes: {}", modes)
}

/// Longer description of each mode, shown by `help`
pub fn mode_help() -> String {
    let mut lines = vec![label("modes:")];
    for mode in Mode::ALL {
        lines.push(format!("  {:<8} {}", mode.keyword(), mode.description()));
    }
    lines.push(dim("  (explore is an alias for saved)"));
    lines.join("\n")
}

/// Commands available after a page of results
pub fn command_menu() -> String {
    let mut lines = vec![label("commands:")];
    for kind in CommandKind::ALL {
        lines.push(format!("  {:<16} {}", kind.usage(), dim(kind.description())));
    }
    lines.join("\n")
}

/// One numbered search result
pub fn result_line(id: ResultId, paper: &Paper) -> String {
    let year = year(paper.published_date.as_deref());
    let heading = paint(
        format!("[{}] {}", id, truncate_with_ellipsis(&paper.title, 90)),
        Style::new().bold(),
    );
    format!(
        "{}\n     {} {}",
        heading,
        truncate_with_ellipsis(&paper.authors, 70),
        dim(format!("({})", year)),
    )
}

/// Every known field of one result, for `more`
pub fn paper_detail(id: ResultId, paper: &Paper) -> String {
    let mut lines = vec![paint(
        format!("[{}] {}", id, paper.title),
        Style::new().bold().blue(),
    )];

    lines.push(format!("{} {}", label("Authors:"), paper.authors));
    lines.push(format!("{} {}", label("Source:"), paper.source));
    if let Some(date) = &paper.published_date {
        lines.push(format!("{} {}", label("Published:"), date));
    }
    if let Some(categories) = &paper.categories {
        lines.push(format!("{} {}", label("Categories:"), categories));
    }
    if let Some(doi) = &paper.doi {
        lines.push(format!("{} {}", label("DOI:"), doi));
    }
    lines.push(format!("{} {}", label("URL:"), paper.url));
    match paper.pdf_url.as_deref().filter(|url| !url.is_empty()) {
        Some(url) => lines.push(format!("{} {}", label("PDF:"), url)),
        None => lines.push(format!("{} {}", label("PDF:"), dim("none"))),
    }
    if !paper.r#abstract.is_empty() {
        lines.push(String::new());
        lines.push(paper.r#abstract.clone());
    }
    lines.join("\n")
}

/// Result of committing a selection
pub fn submit_summary(report: &SubmitReport) -> String {
    if report.is_empty() {
        return "nothing selected, nothing saved".to_string();
    }

    let mut lines = vec![paint(
        format!("saved {} paper(s)", report.saved.len()),
        Style::new().green().bold(),
    )];
    for record in &report.saved {
        lines.push(format!(
            "  {} {} {}",
            truncate_with_ellipsis(&record.title, 60),
            dim("->"),
            record.pdf_path.display(),
        ));
    }
    lines.join("\n")
}

/// Table of saved papers
pub fn saved_table(papers: &[SavedPaper]) -> String {
    if papers.is_empty() {
        return "no saved papers yet".to_string();
    }

    let mut table = new_table(vec!["Id", "Title", "Authors", "Year", "Refs", "PDF"]);
    for paper in papers {
        table.add_row(vec![
            paper.paper_id.clone(),
            truncate_with_ellipsis(&paper.title, 50),
            truncate_with_ellipsis(&paper.authors, 30),
            year(paper.published_date.as_deref()),
            paper.references.to_string(),
            paper.pdf_path.display().to_string(),
        ]);
    }
    table.to_string()
}

/// Table of suggested reading
pub fn suggestion_table(suggestions: &[Suggestion]) -> String {
    if suggestions.is_empty() {
        return "no suggestions yet, save some papers first".to_string();
    }

    let mut table = new_table(vec!["Cited by", "Title", "Authors", "Identifier"]);
    for suggestion in suggestions {
        let identifier = suggestion
            .arxiv_id
            .as_ref()
            .map(|id| format!("arXiv:{}", id))
            .or_else(|| suggestion.doi.as_ref().map(|doi| format!("doi:{}", doi)))
            .unwrap_or_default();
        table.add_row(vec![
            suggestion.cited_by.to_string(),
            truncate_with_ellipsis(&suggestion.title, 60),
            truncate_with_ellipsis(&suggestion.authors, 30),
            identifier,
        ]);
    }
    table.to_string()
}

fn new_table(header: Vec<&str>) -> comfy_table::Table {
    use comfy_table::{Attribute, Cell, Table};

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    if colors_enabled() {
        table.set_header(
            header
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
    } else {
        table.force_no_tty();
        table.set_header(header);
    }
    table
}

/// An error reported at the mode prompt
pub fn error_line(err: &impl Display) -> String {
    format!("{} {}", paint("error:", Style::new().red().bold()), err)
}

fn year(date: Option<&str>) -> String {
    date.map(|d| d.chars().take(4).collect::<String>())
        .unwrap_or_else(|| "????".to_string())
}

/// Truncate text to fit within the specified width using unicode-aware truncation.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width <= 3 {
        return "...".to_string();
    }

    let char_widths: Vec<(char, usize)> = text
        .chars()
        .map(|c| (c, unicode_width::UnicodeWidthChar::width(c).unwrap_or(1)))
        .collect();

    let total_width: usize = char_widths.iter().map(|(_, w)| *w).sum();
    if total_width <= max_width {
        return text.to_string();
    }

    let mut current_width = 0;
    let mut end_idx = 0;
    for (i, (_, w)) in char_widths.iter().enumerate() {
        if current_width + w > max_width - 3 {
            break;
        }
        current_width += w;
        end_idx = i + 1;
    }

    let truncated: String = char_widths[..end_idx].iter().map(|(c, _)| *c).collect();
    format!("{}...", truncated.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::make_paper;
    use crate::storage::SavedRecord;
    use std::path::PathBuf;

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
        assert_eq!(truncate_with_ellipsis("", 10), "");
        assert_eq!(truncate_with_ellipsis("Hello", 3), "...");
        assert_eq!(truncate_with_ellipsis("日本語のタイトル", 9), "日本語...");
    }

    #[test]
    fn test_result_line() {
        let paper = make_paper("2301.00001", "Attention Is All You Need");
        let line = result_line(4, &paper);
        assert!(line.contains("[4] Attention Is All You Need"));
        assert!(line.contains("Test Author"));
        assert!(line.contains("(????)"));
    }

    #[test]
    fn test_paper_detail_includes_abstract() {
        let paper = make_paper("2301.00001", "Title");
        let detail = paper_detail(1, &paper);
        assert!(detail.contains("Abstract of Title"));
        assert!(detail.contains("http://arxiv.org/pdf/2301.00001.pdf"));
        assert!(detail.contains("Source: arXiv"));
    }

    #[test]
    fn test_menus_list_every_keyword() {
        let menu = command_menu();
        for kind in CommandKind::ALL {
            assert!(menu.contains(kind.usage()));
        }
        let modes = mode_menu();
        for mode in Mode::ALL {
            assert!(modes.contains(mode.keyword()));
        }
    }

    #[test]
    fn test_submit_summary() {
        assert!(submit_summary(&SubmitReport::default()).contains("nothing saved"));

        let report = SubmitReport {
            saved: vec![SavedRecord {
                paper_id: "2301.00001".to_string(),
                title: "Title".to_string(),
                pdf_path: PathBuf::from("papers/2301.00001.pdf"),
                references: 3,
            }],
        };
        let summary = submit_summary(&report);
        assert!(summary.contains("saved 1 paper(s)"));
        assert!(summary.contains("papers/2301.00001.pdf"));
    }

    #[test]
    fn test_suggestion_table() {
        assert!(suggestion_table(&[]).contains("no suggestions"));

        let table = suggestion_table(&[Suggestion {
            title: "Cited Work".to_string(),
            authors: "A. Author".to_string(),
            arxiv_id: Some("1706.03762".to_string()),
            doi: None,
            cited_by: 2,
        }]);
        assert!(table.contains("Cited Work"));
        assert!(table.contains("arXiv:1706.03762"));
    }
}

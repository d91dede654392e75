//! SQLite-backed gateway and catalog.

use async_trait::async_trait;
use rusqlite::{params, Connection, Transaction};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::Paper;
use crate::shell::ResultRegistry;
use crate::sources::ReferenceSource;
use crate::storage::{
    Catalog, Gateway, GatewayError, SavedPaper, SavedRecord, SubmitReport, Suggestion,
};
use crate::utils::HttpClient;

/// Schema applied by [`init_db`]
pub const SCHEMA: &str = include_str!("schema.sql");

/// Open the database at `path` with foreign keys enforced
pub fn open_database(path: &Path) -> Result<Connection, GatewayError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// Create the tables if they do not exist yet
pub fn init_db(path: &Path) -> Result<(), GatewayError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let conn = open_database(path)?;
    conn.execute_batch(SCHEMA)?;
    tracing::debug!(path = %path.display(), "Database schema ready");
    Ok(())
}

/// Everything fetched for one paper before the database is touched
#[derive(Debug)]
struct StagedPaper<'a> {
    paper: &'a Paper,
    staged_pdf: PathBuf,
    final_pdf: PathBuf,
    /// Where a PDF already at `final_pdf` is kept until the commit succeeds
    previous_pdf: PathBuf,
    references: Vec<Paper>,
}

/// A PDF moved into the download directory by an unfinished commit
#[derive(Debug)]
struct PlacedPdf<'s> {
    path: &'s Path,
    previous: Option<&'s Path>,
}

impl PlacedPdf<'_> {
    /// Remove the new PDF and put back the one it replaced
    fn undo(&self) {
        if let Err(err) = fs::remove_file(self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %err, "Failed to remove PDF");
            }
        }
        if let Some(previous) = self.previous {
            if let Err(err) = fs::rename(previous, self.path) {
                tracing::warn!(path = %self.path.display(), error = %err, "Failed to restore PDF");
            }
        }
    }
}

/// Gateway writing papers to SQLite and their PDFs to a directory.
///
/// A connection is opened per operation and closed when it returns.
#[derive(Debug, Clone)]
pub struct SqliteGateway {
    db_path: PathBuf,
    download_dir: PathBuf,
    http: HttpClient,
    references: Arc<dyn ReferenceSource>,
}

impl SqliteGateway {
    /// Create a gateway over the database at `db_path`
    pub fn new(
        db_path: impl Into<PathBuf>,
        download_dir: impl Into<PathBuf>,
        http: HttpClient,
        references: Arc<dyn ReferenceSource>,
    ) -> Self {
        Self {
            db_path: db_path.into(),
            download_dir: download_dir.into(),
            http,
            references,
        }
    }

    /// File name used for a paper's PDF
    pub fn pdf_file_name(paper: &Paper) -> String {
        let stem: String = paper
            .paper_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}.pdf", stem)
    }

    async fn stage<'a>(
        &self,
        paper: &'a Paper,
        staging_dir: &Path,
    ) -> Result<StagedPaper<'a>, GatewayError> {
        let pdf_url = paper
            .pdf_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| GatewayError::MissingPdf(paper.paper_id.clone()))?;

        let file_name = Self::pdf_file_name(paper);
        let staged_pdf = staging_dir.join(&file_name);
        self.http
            .download_to(pdf_url, &staged_pdf)
            .await
            .map_err(|source| GatewayError::Download {
                paper_id: paper.paper_id.clone(),
                source,
            })?;

        let references = self
            .references
            .get_references(paper)
            .await
            .map_err(|source| GatewayError::References {
                paper_id: paper.paper_id.clone(),
                source,
            })?;

        tracing::debug!(
            paper = %paper.paper_id,
            references = references.len(),
            "Staged paper"
        );

        Ok(StagedPaper {
            paper,
            staged_pdf,
            previous_pdf: staging_dir.join(format!("{}.previous", file_name)),
            final_pdf: self.download_dir.join(file_name),
            references,
        })
    }
}

#[async_trait]
impl Gateway for SqliteGateway {
    async fn submit(&self, registry: &ResultRegistry) -> Result<SubmitReport, GatewayError> {
        if registry.selected_len() == 0 {
            return Ok(SubmitReport::default());
        }

        fs::create_dir_all(&self.download_dir)?;
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&self.download_dir)?;

        // The same paper can show up under several result ids
        let mut seen = HashSet::new();
        let mut staged = Vec::with_capacity(registry.selected_len());
        for (_, paper) in registry.selected() {
            if !seen.insert(paper.paper_id.as_str()) {
                tracing::debug!(paper = %paper.paper_id, "Skipping paper selected twice");
                continue;
            }
            staged.push(self.stage(paper, staging.path()).await?);
        }

        let mut conn = open_database(&self.db_path)?;
        let report = commit(&mut conn, &staged)?;
        tracing::info!(
            saved = report.saved.len(),
            db = %self.db_path.display(),
            "Committed papers"
        );
        Ok(report)
    }
}

/// Write all staged papers in one transaction, moving their PDFs into place.
///
/// On failure the transaction is rolled back, every PDF moved so far is
/// removed again and the PDFs they replaced are restored.
fn commit(conn: &mut Connection, staged: &[StagedPaper<'_>]) -> Result<SubmitReport, GatewayError> {
    let tx = conn.transaction()?;
    let mut placed: Vec<PlacedPdf<'_>> = Vec::new();

    let result = match write_all(&tx, staged, &mut placed) {
        Ok(report) => tx.commit().map(|()| report).map_err(GatewayError::from),
        Err(err) => Err(err),
    };

    if result.is_err() {
        for pdf in placed.iter().rev() {
            pdf.undo();
        }
    }
    result
}

fn write_all<'s>(
    tx: &Transaction<'_>,
    staged: &'s [StagedPaper<'_>],
    placed: &mut Vec<PlacedPdf<'s>>,
) -> Result<SubmitReport, GatewayError> {
    let saved_at = chrono::Utc::now().to_rfc3339();
    let mut report = SubmitReport::default();

    for item in staged {
        let paper = item.paper;
        tx.execute(
            "INSERT INTO papers
                (paper_id, ref_key, title, authors, abstract, published_date,
                 url, pdf_url, pdf_path, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(paper_id) DO UPDATE SET
                ref_key = excluded.ref_key,
                title = excluded.title,
                authors = excluded.authors,
                abstract = excluded.abstract,
                published_date = excluded.published_date,
                url = excluded.url,
                pdf_url = excluded.pdf_url,
                pdf_path = excluded.pdf_path,
                saved_at = excluded.saved_at",
            params![
                paper.paper_id,
                paper.reference_key(),
                paper.title,
                paper.authors,
                paper.r#abstract,
                paper.published_date,
                paper.url,
                paper.pdf_url.as_deref().unwrap_or_default(),
                item.final_pdf.to_string_lossy().into_owned(),
                saved_at,
            ],
        )?;

        tx.execute(
            "DELETE FROM paper_references WHERE paper_id = ?1",
            params![paper.paper_id],
        )?;

        {
            let mut insert = tx.prepare_cached(
                "INSERT INTO paper_references
                    (paper_id, ref_key, title, authors, doi, arxiv_id, url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for reference in &item.references {
                insert.execute(params![
                    paper.paper_id,
                    reference.reference_key(),
                    reference.title,
                    reference.authors,
                    reference.doi,
                    reference.arxiv_id,
                    reference.url,
                ])?;
            }
        }

        let previous = if item.final_pdf.exists() {
            fs::rename(&item.final_pdf, &item.previous_pdf)?;
            Some(item.previous_pdf.as_path())
        } else {
            None
        };
        placed.push(PlacedPdf {
            path: &item.final_pdf,
            previous,
        });
        fs::rename(&item.staged_pdf, &item.final_pdf)?;

        report.saved.push(SavedRecord {
            paper_id: paper.paper_id.clone(),
            title: paper.title.clone(),
            pdf_path: item.final_pdf.clone(),
            references: item.references.len(),
        });
    }

    Ok(report)
}

impl Catalog for SqliteGateway {
    fn saved_papers(&self) -> Result<Vec<SavedPaper>, GatewayError> {
        let conn = open_database(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT p.paper_id, p.title, p.authors, p.published_date, p.pdf_path, p.saved_at,
                    (SELECT COUNT(*) FROM paper_references r WHERE r.paper_id = p.paper_id)
             FROM papers p
             ORDER BY p.saved_at DESC, p.paper_id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(SavedPaper {
                paper_id: row.get(0)?,
                title: row.get(1)?,
                authors: row.get(2)?,
                published_date: row.get(3)?,
                pdf_path: PathBuf::from(row.get::<_, String>(4)?),
                saved_at: row.get(5)?,
                references: row.get::<_, i64>(6)? as usize,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn suggestions(&self, limit: usize) -> Result<Vec<Suggestion>, GatewayError> {
        let conn = open_database(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT MIN(r.title), MIN(r.authors), MAX(r.arxiv_id), MAX(r.doi),
                    COUNT(DISTINCT r.paper_id) AS cited_by
             FROM paper_references r
             WHERE r.ref_key NOT IN (SELECT ref_key FROM papers)
             GROUP BY r.ref_key
             ORDER BY cited_by DESC, MIN(r.title) ASC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(Suggestion {
                title: row.get(0)?,
                authors: row.get(1)?,
                arxiv_id: row.get(2)?,
                doi: row.get(3)?,
                cited_by: row.get::<_, i64>(4)? as usize,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::{make_paper, make_reference, MockSource};

    struct Fixture {
        _dir: tempfile::TempDir,
        db_path: PathBuf,
        download_dir: PathBuf,
        references: Arc<MockSource>,
        server: mockito::ServerGuard,
    }

    impl Fixture {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let db_path = dir.path().join("library.db");
            init_db(&db_path).unwrap();
            Self {
                download_dir: dir.path().join("papers"),
                db_path,
                _dir: dir,
                references: Arc::new(MockSource::new()),
                server: mockito::Server::new_async().await,
            }
        }

        fn gateway(&self) -> SqliteGateway {
            SqliteGateway::new(
                &self.db_path,
                &self.download_dir,
                HttpClient::new().unwrap(),
                self.references.clone(),
            )
        }

        async fn paper(&mut self, id: &str, title: &str) -> Paper {
            self.server
                .mock("GET", format!("/pdf/{id}.pdf").as_str())
                .with_status(200)
                .with_body(format!("%PDF {id}"))
                .create_async()
                .await;
            let mut paper = make_paper(id, title);
            paper.pdf_url = Some(format!("{}/pdf/{id}.pdf", self.server.url()));
            paper
        }

        fn count(&self, table: &str) -> i64 {
            let conn = open_database(&self.db_path).unwrap();
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .unwrap()
        }

        fn pdf_files(&self) -> Vec<String> {
            let mut names = fs::read_dir(&self.download_dir)
                .map(|entries| {
                    entries
                        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            names.sort();
            names
        }
    }

    fn registry_of(papers: Vec<Paper>, selected: &[i64]) -> ResultRegistry {
        let mut registry = ResultRegistry::new();
        for (i, paper) in papers.into_iter().enumerate() {
            registry.add_valid(i as i64 + 1, paper).unwrap();
        }
        registry.select_all(selected).unwrap();
        registry
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("library.db");
        init_db(&path).unwrap();
        init_db(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_pdf_file_name_is_sanitized() {
        let paper = make_paper("solv-int/9901001", "Old");
        assert_eq!(SqliteGateway::pdf_file_name(&paper), "solv-int_9901001.pdf");
    }

    #[tokio::test]
    async fn test_submit_stores_papers_references_and_pdfs() {
        let mut fx = Fixture::new().await;
        let first = fx.paper("2301.00001", "First").await;
        let second = fx.paper("2301.00002", "Second").await;
        let skipped = fx.paper("2301.00003", "Skipped").await;
        fx.references.set_references(
            "2301.00001",
            vec![
                make_reference("Attention Is All You Need", Some("1706.03762")),
                make_reference("Long Short-Term Memory", None),
            ],
        );

        let registry = registry_of(vec![first, second, skipped], &[1, 2]);
        let report = fx.gateway().submit(&registry).await.unwrap();

        assert_eq!(report.saved.len(), 2);
        assert_eq!(report.saved[0].references, 2);
        assert_eq!(fx.count("papers"), 2);
        assert_eq!(fx.count("paper_references"), 2);
        assert_eq!(fx.pdf_files(), vec!["2301.00001.pdf", "2301.00002.pdf"]);
        assert_eq!(
            fs::read_to_string(fx.download_dir.join("2301.00001.pdf")).unwrap(),
            "%PDF 2301.00001"
        );
    }

    #[tokio::test]
    async fn test_failed_reference_lookup_writes_nothing() {
        let mut fx = Fixture::new().await;
        let first = fx.paper("2301.00001", "First").await;
        let second = fx.paper("2301.00002", "Second").await;
        fx.references.fail_references_for("2301.00002");

        let registry = registry_of(vec![first, second], &[1, 2]);
        let err = fx.gateway().submit(&registry).await.unwrap_err();

        assert!(matches!(err, GatewayError::References { .. }));
        assert_eq!(fx.count("papers"), 0);
        assert!(fx.pdf_files().is_empty(), "{:?}", fx.pdf_files());
    }

    #[tokio::test]
    async fn test_failed_download_writes_nothing() {
        let mut fx = Fixture::new().await;
        let first = fx.paper("2301.00001", "First").await;
        let mut broken = make_paper("2301.00002", "Broken");
        broken.pdf_url = Some(format!("{}/missing.pdf", fx.server.url()));
        fx.server
            .mock("GET", "/missing.pdf")
            .with_status(404)
            .create_async()
            .await;

        let registry = registry_of(vec![first, broken], &[1, 2]);
        let err = fx.gateway().submit(&registry).await.unwrap_err();

        assert!(matches!(err, GatewayError::Download { .. }));
        assert_eq!(fx.count("papers"), 0);
        assert!(fx.pdf_files().is_empty());
    }

    #[tokio::test]
    async fn test_missing_pdf_link_fails_submit() {
        let fx = Fixture::new().await;
        let mut paper = make_paper("2301.00001", "No PDF");
        paper.pdf_url = None;

        let registry = registry_of(vec![paper], &[1]);
        let err = fx.gateway().submit(&registry).await.unwrap_err();
        assert!(matches!(err, GatewayError::MissingPdf(id) if id == "2301.00001"));
    }

    #[tokio::test]
    async fn test_storage_failure_removes_moved_pdfs() {
        let mut fx = Fixture::new().await;
        let first = fx.paper("2301.00001", "First").await;
        let second = fx.paper("2301.00002", "Second").await;
        {
            let conn = open_database(&fx.db_path).unwrap();
            conn.execute_batch(
                "CREATE TRIGGER reject_second BEFORE INSERT ON papers
                 WHEN NEW.paper_id = '2301.00002'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();
        }

        let registry = registry_of(vec![first, second], &[1, 2]);
        let err = fx.gateway().submit(&registry).await.unwrap_err();

        assert!(matches!(err, GatewayError::Storage(_)));
        assert_eq!(fx.count("papers"), 0);
        assert!(fx.pdf_files().is_empty(), "{:?}", fx.pdf_files());
    }

    #[tokio::test]
    async fn test_failed_resave_restores_previous_pdf() {
        let mut fx = Fixture::new().await;
        let first = fx.paper("2301.00001", "First").await;
        let second = fx.paper("2301.00002", "Second").await;
        fx.gateway()
            .submit(&registry_of(vec![first.clone()], &[1]))
            .await
            .unwrap();
        fs::write(fx.download_dir.join("2301.00001.pdf"), "%PDF saved earlier").unwrap();
        {
            let conn = open_database(&fx.db_path).unwrap();
            conn.execute_batch(
                "CREATE TRIGGER reject_second BEFORE INSERT ON papers
                 WHEN NEW.paper_id = '2301.00002'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();
        }

        let registry = registry_of(vec![first, second], &[1, 2]);
        let err = fx.gateway().submit(&registry).await.unwrap_err();

        assert!(matches!(err, GatewayError::Storage(_)));
        assert_eq!(fx.count("papers"), 1);
        assert_eq!(fx.pdf_files(), vec!["2301.00001.pdf"]);
        assert_eq!(
            fs::read_to_string(fx.download_dir.join("2301.00001.pdf")).unwrap(),
            "%PDF saved earlier"
        );
    }

    #[tokio::test]
    async fn test_resave_replaces_previous_pdf() {
        let mut fx = Fixture::new().await;
        let paper = fx.paper("2301.00001", "First").await;
        let registry = registry_of(vec![paper], &[1]);
        fx.gateway().submit(&registry).await.unwrap();
        fs::write(fx.download_dir.join("2301.00001.pdf"), "%PDF stale").unwrap();

        fx.gateway().submit(&registry).await.unwrap();

        assert_eq!(fx.pdf_files(), vec!["2301.00001.pdf"]);
        assert_eq!(
            fs::read_to_string(fx.download_dir.join("2301.00001.pdf")).unwrap(),
            "%PDF 2301.00001"
        );
    }

    #[tokio::test]
    async fn test_paper_selected_under_two_ids_is_saved_once() {
        let mut fx = Fixture::new().await;
        let paper = fx.paper("2301.00001", "First").await;

        let registry = registry_of(vec![paper.clone(), paper], &[1, 2]);
        let report = fx.gateway().submit(&registry).await.unwrap();

        assert_eq!(report.saved.len(), 1);
        assert_eq!(fx.count("papers"), 1);
        assert_eq!(fx.pdf_files(), vec!["2301.00001.pdf"]);
    }

    #[tokio::test]
    async fn test_empty_selection_commits_nothing() {
        let fx = Fixture::new().await;
        let registry = registry_of(vec![make_paper("2301.00001", "First")], &[]);
        let report = fx.gateway().submit(&registry).await.unwrap();
        assert!(report.is_empty());
        assert!(!fx.download_dir.exists());
    }

    #[tokio::test]
    async fn test_resaving_replaces_references() {
        let mut fx = Fixture::new().await;
        let paper = fx.paper("2301.00001", "First").await;
        fx.references.set_references(
            "2301.00001",
            vec![make_reference("A", None), make_reference("B", None)],
        );
        let registry = registry_of(vec![paper.clone()], &[1]);
        fx.gateway().submit(&registry).await.unwrap();

        fx.references
            .set_references("2301.00001", vec![make_reference("C", None)]);
        fx.gateway().submit(&registry).await.unwrap();

        assert_eq!(fx.count("papers"), 1);
        assert_eq!(fx.count("paper_references"), 1);
    }

    #[tokio::test]
    async fn test_catalog_lists_saved_and_suggestions() {
        let mut fx = Fixture::new().await;
        let first = fx.paper("2301.00001", "First").await;
        let second = fx.paper("2301.00002", "Second").await;
        fx.references.set_references(
            "2301.00001",
            vec![
                make_reference("Attention Is All You Need", Some("1706.03762")),
                make_reference("Long Short-Term Memory", None),
                // Cites the other saved paper, which must not be suggested
                make_reference("Second", Some("2301.00002")),
            ],
        );
        fx.references.set_references(
            "2301.00002",
            vec![make_reference("Attention Is All You Need", Some("1706.03762"))],
        );

        let registry = registry_of(vec![first, second], &[1, 2]);
        let gateway = fx.gateway();
        gateway.submit(&registry).await.unwrap();

        let saved = gateway.saved_papers().unwrap();
        assert_eq!(saved.len(), 2);
        let first_saved = saved.iter().find(|p| p.paper_id == "2301.00001").unwrap();
        assert_eq!(first_saved.references, 3);

        let suggestions = gateway.suggestions(10).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].title, "Attention Is All You Need");
        assert_eq!(suggestions[0].cited_by, 2);
        assert_eq!(suggestions[0].arxiv_id.as_deref(), Some("1706.03762"));
        assert_eq!(suggestions[1].title, "Long Short-Term Memory");
        assert_eq!(suggestions[1].cited_by, 1);

        assert_eq!(gateway.suggestions(1).unwrap().len(), 1);
    }
}

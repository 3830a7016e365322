use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use walkdir::WalkDir;

use crate::analysis::Classifier;
use crate::config::PipelineConfig;
use crate::document::{apply_markers, Document, HtmlDocument};
use crate::error::{Error, Result};
use crate::models::MetadataRecord;
use crate::storage::{atomic_write, sidecar_path, write_sidecar};
use crate::taxonomy::Taxonomy;

pub struct ClassifyPipeline {
    classifier: Arc<Classifier>,
    config: PipelineConfig,
}

/// End-of-run summary. One failed document never aborts the batch; only
/// a systemic write failure does, and the documents not attempted after
/// it are counted as skipped.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

enum Outcome {
    Processed,
    Skipped,
    Failed(Error),
}

impl ClassifyPipeline {
    pub fn new(taxonomy: Arc<Taxonomy>, config: PipelineConfig) -> Self {
        Self {
            classifier: Arc::new(Classifier::new(taxonomy)),
            config,
        }
    }

    pub async fn run(&self, root: &Path) -> Result<BatchReport> {
        let (documents, walk_failures) = enumerate_documents(root);
        tracing::info!("Found {} documents under {}", documents.len(), root.display());

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency_limit));
        // Set on a systemic failure; documents still waiting for a
        // permit bail out instead of wasting more writes.
        let abort = Arc::new(AtomicBool::new(false));

        let pb = ProgressBar::new(documents.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut tasks = Vec::new();

        for path in documents {
            let classifier = self.classifier.clone();
            let sem = semaphore.clone();
            let abort = abort.clone();
            let root = root.to_path_buf();
            let dry_run = self.config.dry_run;
            let pb = pb.clone();

            tasks.push(async move {
                let _permit = sem.acquire().await.ok();

                let outcome = if abort.load(Ordering::SeqCst) {
                    Outcome::Skipped
                } else {
                    // The per-document work is blocking file I/O; run it
                    // off the runtime thread so the permit actually
                    // bounds parallel workers.
                    let task_path = path.clone();
                    let result = tokio::task::spawn_blocking(move || {
                        process_document(&classifier, &root, &task_path, dry_run)
                    })
                    .await
                    .unwrap_or_else(|e| {
                        Err(Error::Io(std::io::Error::other(format!(
                            "worker task failed: {}",
                            e
                        ))))
                    });

                    match result {
                        Ok(()) => Outcome::Processed,
                        Err(e) => {
                            if e.is_fatal() {
                                abort.store(true, Ordering::SeqCst);
                            }
                            Outcome::Failed(e)
                        }
                    }
                };

                pb.inc(1);
                (path, outcome)
            });
        }

        let results = join_all(tasks).await;
        pb.finish_with_message("Classification complete");

        let mut report = BatchReport::default();
        for (path, cause) in walk_failures {
            tracing::warn!("Skipping {}: {}", path.display(), cause);
            report.failures.push((path, cause));
        }
        for (path, outcome) in results {
            match outcome {
                Outcome::Processed => report.processed += 1,
                Outcome::Skipped => report.skipped += 1,
                Outcome::Failed(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    report.failures.push((path, e.to_string()));
                }
            }
        }

        tracing::info!(
            "Batch done: {} processed, {} skipped, {} failed",
            report.processed,
            report.skipped,
            report.failures.len()
        );

        Ok(report)
    }
}

/// Recursively enumerate content documents under `root`, sorted
/// lexicographically. Directory-walk order varies across filesystems and
/// must not leak into batch behavior. An unreadable entry is recorded as
/// a failure and the walk continues; the rest of the tree still gets
/// classified.
fn enumerate_documents(root: &Path) -> (Vec<PathBuf>, Vec<(PathBuf, String)>) {
    let mut documents = Vec::new();
    let mut failures = Vec::new();

    for entry in WalkDir::new(root) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_html(entry.path()) {
                    documents.push(entry.into_path());
                }
            }
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                failures.push((path, e.to_string()));
            }
        }
    }

    documents.sort();
    (documents, failures)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

fn process_document(
    classifier: &Classifier,
    root: &Path,
    path: &Path,
    dry_run: bool,
) -> Result<()> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::DocumentRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut doc = HtmlDocument::parse(raw)?;

    let title = doc.title().unwrap_or_else(|| fallback_title(path));
    let tags = classifier.analyze(&doc.query_text());

    let source_path = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");
    let record = MetadataRecord::new(title, tags).with_source_path(source_path);

    if dry_run {
        tracing::info!(
            "[dry-run] {}: {}",
            path.display(),
            serde_json::to_string(&record.tags)?
        );
        return Ok(());
    }

    write_sidecar(&sidecar_path(path), &record)?;

    apply_markers(&mut doc, &record.tags);
    atomic_write(path, &doc.serialize()).map_err(|source| Error::DocumentWrite {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

fn fallback_title(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::read_sidecar;

    fn pipeline(dry_run: bool) -> ClassifyPipeline {
        let taxonomy = Taxonomy::bundled().unwrap();
        let config = PipelineConfig {
            concurrency_limit: 2,
            dry_run,
        };
        ClassifyPipeline::new(taxonomy, config)
    }

    fn write_page(dir: &Path, rel: &str, body: &str) -> PathBuf {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let html = format!(
            "<html>\n<head>\n<title>{}</title>\n</head>\n<body>{}</body>\n</html>\n",
            rel, body
        );
        std::fs::write(&path, html).unwrap();
        path
    }

    #[test]
    fn enumeration_is_sorted_and_html_only() {
        let dir = tempfile::tempdir().unwrap();
        write_page(dir.path(), "b/game.html", "x");
        write_page(dir.path(), "a/game.html", "x");
        std::fs::write(dir.path().join("notes.txt"), "not html").unwrap();

        let (docs, failures) = enumerate_documents(dir.path());
        assert!(failures.is_empty());
        assert_eq!(docs.len(), 2);
        assert!(docs[0].ends_with("a/game.html"));
        assert!(docs[1].ends_with("b/game.html"));
    }

    #[tokio::test]
    async fn missing_root_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let report = pipeline(false).run(&dir.path().join("nope")).await.unwrap();
        assert_eq!(report.processed, 0);
        assert_eq!(report.failures.len(), 1);
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn batch_writes_sidecar_and_markers() {
        let dir = tempfile::tempdir().unwrap();
        let page = write_page(dir.path(), "space/index.html", "學習機器學習和程式設計的遊戲");

        let report = pipeline(false).run(dir.path()).await.unwrap();
        assert_eq!(report.processed, 1);
        assert!(!report.has_failures());

        let record = read_sidecar(&sidecar_path(&page)).unwrap();
        assert!(record.tags.ai_topic.contains(&"machine_learning".to_string()));
        assert!(record.tags.steam_topic.technology.contains(&"programming".to_string()));
        assert_eq!(record.source_path.as_deref(), Some("space/index.html"));

        let annotated = std::fs::read_to_string(&page).unwrap();
        assert!(annotated.contains("<meta name=\"tags-ai_topic\""));
    }

    #[tokio::test]
    async fn empty_body_gets_full_empty_shape() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("empty.html");
        std::fs::write(&page, "<html>\n<head>\n</head>\n<body></body>\n</html>\n").unwrap();

        pipeline(false).run(dir.path()).await.unwrap();

        let record = read_sidecar(&sidecar_path(&page)).unwrap();
        assert_eq!(record.tags, crate::models::TagSet::default());

        // No positive signal, no marker on the document.
        let annotated = std::fs::read_to_string(&page).unwrap();
        assert!(!annotated.contains("<meta name=\"tags-"));
    }

    #[tokio::test]
    async fn unparsable_document_is_recorded_and_batch_continues() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bad")).unwrap();
        std::fs::write(dir.path().join("bad/broken.html"), "no head here").unwrap();
        let good = write_page(dir.path(), "good/index.html", "機器學習");

        let report = pipeline(false).run(dir.path()).await.unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].0.ends_with("bad/broken.html"));
        assert!(report.has_failures());

        assert!(sidecar_path(&good).exists());
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let page = write_page(dir.path(), "space/index.html", "機器學習");
        let before = std::fs::read_to_string(&page).unwrap();

        let report = pipeline(true).run(dir.path()).await.unwrap();
        assert_eq!(report.processed, 1);

        assert!(!sidecar_path(&page).exists());
        assert_eq!(std::fs::read_to_string(&page).unwrap(), before);
    }

    #[tokio::test]
    async fn missing_title_falls_back_to_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("untitled.html");
        std::fs::write(
            &page,
            "<html>\n<head>\n</head>\n<body>學習機器學習</body>\n</html>\n",
        )
        .unwrap();

        pipeline(false).run(dir.path()).await.unwrap();

        let record = read_sidecar(&sidecar_path(&page)).unwrap();
        assert_eq!(record.title, "untitled.html");
        assert!(record.tags.ai_topic.contains(&"machine_learning".to_string()));
    }

    #[tokio::test]
    async fn bounded_workers_process_the_whole_batch() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..8 {
            write_page(dir.path(), &format!("g{}/index.html", i), "機器學習和程式");
        }

        let taxonomy = Taxonomy::bundled().unwrap();
        let config = PipelineConfig {
            concurrency_limit: 3,
            dry_run: false,
        };
        let report = ClassifyPipeline::new(taxonomy, config)
            .run(dir.path())
            .await
            .unwrap();

        assert_eq!(report.processed, 8);
        assert!(!report.has_failures());
        for i in 0..8 {
            let page = dir.path().join(format!("g{}/index.html", i));
            assert!(sidecar_path(&page).exists());
        }
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let page = write_page(dir.path(), "space/index.html", "機器學習和程式");

        pipeline(false).run(dir.path()).await.unwrap();
        let html_once = std::fs::read_to_string(&page).unwrap();
        let sidecar_once = std::fs::read(sidecar_path(&page)).unwrap();

        pipeline(false).run(dir.path()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&page).unwrap(), html_once);
        assert_eq!(std::fs::read(sidecar_path(&page)).unwrap(), sidecar_once);
    }
}

//! Batch pipeline: discover, load, assemble, deduplicate.
//!
//! Documents may be assembled in parallel; results are collected in input
//! order and the field registry is filled afterwards, so a parallel run
//! produces exactly the output of a sequential one.

use crate::assemble::{AssembledRecord, Assembler};
use crate::dedup::{merge, AuditEntry, MergePolicy};
use crate::error::{Error, Result};
use crate::extract::ExtractOptions;
use crate::load::LoaderRegistry;
use crate::model::{Document, FieldRegistry, Record};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Prefix of the lock files Word leaves next to open documents.
const LOCK_FILE_PREFIX: &str = "~$";

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Whether to assemble documents in parallel
    pub parallel: bool,

    /// Whether discovery descends into subfolders
    pub recursive: bool,

    /// How duplicate reports are merged
    pub merge: MergePolicy,
}

impl PipelineOptions {
    /// Create new pipeline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Enable or disable descending into subfolders.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the merge policy.
    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge = policy;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            recursive: true,
            merge: MergePolicy::default(),
        }
    }
}

/// Receives progress events during a batch run.
///
/// Events may arrive from worker threads, in any order.
pub trait ProgressSink: Sync {
    /// The batch is about to process `total` documents.
    fn on_start(&self, _total: usize) {}

    /// A document was loaded and assembled.
    fn on_document(&self, _name: &str, _elapsed: Duration) {}

    /// A document could not be loaded.
    fn on_skipped(&self, _path: &Path, _error: &Error) {}

    /// Every document has been handled.
    fn on_finish(&self) {}
}

/// Progress sink that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// A file that could not be loaded.
#[derive(Debug)]
pub struct SkippedDocument {
    /// Path of the file
    pub path: PathBuf,
    /// Why loading failed
    pub error: Error,
}

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct BatchOutput {
    /// Records left after deduplication
    pub records: Vec<Record>,

    /// Every field name produced by the batch, in first-seen order
    pub registry: FieldRegistry,

    /// Duplicates log
    pub audit: Vec<AuditEntry>,

    /// Files that could not be loaded
    pub skipped: Vec<SkippedDocument>,

    /// Number of documents assembled
    pub processed: usize,

    /// Number of extraction diagnostics across all documents
    pub diagnostics: usize,
}

/// Runs the whole extraction over a set of documents.
pub struct Pipeline {
    assembler: Assembler,
    loaders: LoaderRegistry,
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline with the default loaders and options.
    pub fn new(extract: ExtractOptions) -> Result<Self> {
        Ok(Self {
            assembler: Assembler::new(extract)?,
            loaders: LoaderRegistry::with_defaults(),
            options: PipelineOptions::default(),
        })
    }

    /// Replace the loader registry.
    pub fn with_loaders(mut self, loaders: LoaderRegistry) -> Self {
        self.loaders = loaders;
        self
    }

    /// Replace the pipeline options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// The record assembler.
    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }

    /// The loader registry.
    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    /// The pipeline options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Loadable files under `folder`, sorted by path.
    pub fn discover(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        if !std::fs::metadata(folder)?.is_dir() {
            return Err(Error::Other(format!("{} is not a folder", folder.display())));
        }

        let mut walker = WalkDir::new(folder).min_depth(1);
        if !self.options.recursive {
            walker = walker.max_depth(1);
        }

        let mut paths: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Cannot read directory entry: {}", e);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter(|e| !e.file_name().to_string_lossy().starts_with(LOCK_FILE_PREFIX))
            .map(|e| e.into_path())
            .filter(|p| self.loaders.supports_path(p))
            .collect();
        paths.sort();

        log::debug!("Discovered {} documents in {}", paths.len(), folder.display());
        Ok(paths)
    }

    /// Process every loadable file under `folder`.
    pub fn run_folder(&self, folder: &Path, progress: &dyn ProgressSink) -> Result<BatchOutput> {
        let paths = self.discover(folder)?;
        if paths.is_empty() {
            return Err(Error::NoDocuments(folder.to_path_buf()));
        }
        Ok(self.run_paths(&paths, progress))
    }

    /// Process the given files in order.
    pub fn run_paths(&self, paths: &[PathBuf], progress: &dyn ProgressSink) -> BatchOutput {
        progress.on_start(paths.len());
        let results: Vec<std::result::Result<AssembledRecord, SkippedDocument>> =
            if self.options.parallel {
                paths.par_iter().map(|p| self.process(p, progress)).collect()
            } else {
                paths.iter().map(|p| self.process(p, progress)).collect()
            };
        let output = self.collect(results);
        progress.on_finish();
        output
    }

    /// Process documents that are already loaded.
    pub fn run_documents(&self, docs: &[Document]) -> BatchOutput {
        let assemble = |doc: &Document| -> std::result::Result<AssembledRecord, SkippedDocument> {
            Ok(self.assembler.assemble(doc))
        };
        let results: Vec<_> = if self.options.parallel {
            docs.par_iter().map(assemble).collect()
        } else {
            docs.iter().map(assemble).collect()
        };
        self.collect(results)
    }

    fn process(
        &self,
        path: &Path,
        progress: &dyn ProgressSink,
    ) -> std::result::Result<AssembledRecord, SkippedDocument> {
        let started = Instant::now();
        match self.loaders.load(path) {
            Ok(doc) => {
                let assembled = self.assembler.assemble(&doc);
                progress.on_document(&doc.name, started.elapsed());
                Ok(assembled)
            }
            Err(error) => {
                log::warn!("Skipping {}: {}", path.display(), error);
                progress.on_skipped(path, &error);
                Err(SkippedDocument {
                    path: path.to_path_buf(),
                    error,
                })
            }
        }
    }

    fn collect(
        &self,
        results: Vec<std::result::Result<AssembledRecord, SkippedDocument>>,
    ) -> BatchOutput {
        let mut registry = FieldRegistry::new();
        let mut records = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        let mut diagnostics = 0;

        for result in results {
            match result {
                Ok(assembled) => {
                    registry.register(&assembled.record);
                    diagnostics += assembled.diagnostics.len();
                    records.push(assembled.record);
                }
                Err(skip) => skipped.push(skip),
            }
        }

        let processed = records.len();
        let merged = merge(records, &self.options.merge);
        log::info!(
            "Processed {} documents ({} skipped, {} diagnostics), {} records after merging",
            processed,
            skipped.len(),
            diagnostics,
            merged.records.len()
        );

        BatchOutput {
            records: merged.records,
            registry,
            audit: merged.audit,
            skipped,
            processed,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn pipeline() -> Pipeline {
        Pipeline::new(ExtractOptions::default()).unwrap()
    }

    #[test]
    fn test_options_builder() {
        let options = PipelineOptions::new().sequential().with_recursive(false);
        assert!(!options.parallel);
        assert!(!options.recursive);
        assert!(PipelineOptions::default().parallel);
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("sub/c.txt"), "c").unwrap();
        fs::write(dir.path().join("~$a.docx"), "lock").unwrap();
        fs::write(dir.path().join("notes.pdf"), "x").unwrap();

        let found = pipeline().discover(dir.path()).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, ["a.txt", "b.txt", "sub/c.txt"]);

        let flat = pipeline()
            .with_options(PipelineOptions::new().with_recursive(false))
            .discover(dir.path())
            .unwrap();
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_empty_folder_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = pipeline().run_folder(dir.path(), &NoProgress).unwrap_err();
        assert!(matches!(err, Error::NoDocuments(_)));
    }

    #[test]
    fn test_unloadable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "Obduktion af 54-årig mand").unwrap();
        fs::write(dir.path().join("b.docx"), "not a zip").unwrap();

        struct Counter(AtomicUsize, AtomicUsize);
        impl ProgressSink for Counter {
            fn on_document(&self, _name: &str, _elapsed: Duration) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
            fn on_skipped(&self, _path: &Path, _error: &Error) {
                self.1.fetch_add(1, Ordering::SeqCst);
            }
        }
        let counter = Counter(AtomicUsize::new(0), AtomicUsize::new(0));

        let out = pipeline().run_folder(dir.path(), &counter).unwrap();
        assert_eq!(out.processed, 1);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.skipped.len(), 1);
        assert!(matches!(out.skipped[0].error, Error::UnknownFormat));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert_eq!(counter.1.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let docs: Vec<Document> = (0..8)
            .map(|i| {
                let mut paragraphs = vec![format!("Obduktion af {}-årig kvinde.", 20 + i)];
                if i % 2 == 0 {
                    paragraphs.push(format!("Hjertet vejer {} g.", 300 + i));
                }
                Document::from_paragraphs(format!("{:02}.docx", i), paragraphs)
            })
            .collect();

        let parallel = pipeline().run_documents(&docs);
        let sequential = pipeline()
            .with_options(PipelineOptions::new().sequential())
            .run_documents(&docs);

        assert_eq!(parallel.registry.columns(), sequential.registry.columns());
        assert_eq!(parallel.records, sequential.records);
    }
}

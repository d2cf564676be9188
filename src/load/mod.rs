//! Document loaders with a registry keyed by file extension.
//!
//! A loader turns a file into a [`Document`]. The registry dispatches on the
//! lowercase extension, or on sniffed magic bytes when only the content is
//! known.
//!
//! # Example
//!
//! ```no_run
//! use autmine::load::LoaderRegistry;
//! use std::path::Path;
//!
//! fn main() -> autmine::Result<()> {
//!     let registry = LoaderRegistry::with_defaults();
//!     let doc = registry.load(Path::new("reports/0001.docx"))?;
//!     println!("{} paragraphs", doc.paragraph_count());
//!     Ok(())
//! }
//! ```

mod docx;
mod text;

pub use docx::{parse_document_xml, DocxLoader};
pub use text::TextLoader;

use crate::detect::{detect_format_from_bytes, SourceFormat};
use crate::error::{Error, Result};
use crate::model::Document;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// File name without its directory, as stored in `File Name`.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Trait for document loaders.
///
/// Implement this trait to read reports from another file format.
pub trait DocumentLoader: Send + Sync {
    /// Get the supported file extensions for this loader.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["docx"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this loader.
    fn name(&self) -> &str;

    /// Load a document from bytes; `name` becomes the document name.
    fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<Document>;

    /// Load a document from a file.
    fn load(&self, path: &Path) -> Result<Document> {
        let bytes = std::fs::read(path)?;
        self.load_bytes(&file_name(path), &bytes)
    }

    /// Check if this loader supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for document loaders.
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn DocumentLoader>>,
    by_name: HashMap<String, Arc<dyn DocumentLoader>>,
}

impl LoaderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            loaders: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the docx and plain-text loaders.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxLoader::new()));
        registry.register(Arc::new(TextLoader::new()));
        registry
    }

    /// Register a loader for all its supported extensions.
    pub fn register(&mut self, loader: Arc<dyn DocumentLoader>) {
        for ext in loader.supported_extensions() {
            self.loaders.insert(ext.to_lowercase(), loader.clone());
        }
        self.by_name.insert(loader.name().to_lowercase(), loader);
    }

    /// Get a loader by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentLoader>> {
        self.loaders.get(&ext.to_lowercase()).cloned()
    }

    /// Get a loader by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentLoader>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.loaders.contains_key(&ext.to_lowercase())
    }

    /// Check if a path has a supported extension.
    pub fn supports_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.supports(e))
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.loaders.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Load a file using the loader for its extension.
    pub fn load(&self, path: &Path) -> Result<Document> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedExtension(String::new()))?;

        let loader = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedExtension(ext.to_string()))?;

        log::debug!("Loading {} with {} loader", path.display(), loader.name());
        loader.load(path)
    }

    /// Load bytes, choosing the loader from the sniffed format.
    pub fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<Document> {
        let loader_name = match detect_format_from_bytes(bytes)? {
            SourceFormat::Docx => "docx",
            SourceFormat::PlainText => "text",
        };
        let loader = self
            .get_by_name(loader_name)
            .ok_or_else(|| Error::Other(format!("No loader named {}", loader_name)))?;
        loader.load_bytes(name, bytes)
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

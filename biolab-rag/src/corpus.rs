//! Corpus loading: markdown documents and structured analysis records.
//!
//! Both loaders scan a flat directory, sort file paths for deterministic
//! ordering, and skip unreadable or malformed units with a log line —
//! a broken file never aborts a build.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::analysis::{AnalysisRecord, RawAnalysis, laboratory_for_filename};
use crate::document::Document;

/// Title used for documents without a level-1 markdown heading.
pub const UNTITLED_DOCUMENT: &str = "Document sans titre";

fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files = WalkDir::new(dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == extension))
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();
    files.sort();
    files
}

fn file_name(path: &Path) -> String {
    path.file_name().and_then(|name| name.to_str()).unwrap_or_default().to_string()
}

/// Extract a document title: the first `# ` heading, or the fixed
/// untitled sentinel.
pub fn extract_title(content: &str) -> String {
    content
        .lines()
        .find_map(|line| line.strip_prefix("# ").map(|title| title.trim().to_string()))
        .unwrap_or_else(|| UNTITLED_DOCUMENT.to_string())
}

/// Load all markdown documents under `dir`, sorted by path.
pub fn load_documents(dir: &Path) -> Vec<Document> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "document directory not found");
        return Vec::new();
    }

    let mut documents = Vec::new();
    for path in files_with_extension(dir, "md") {
        match fs::read_to_string(&path) {
            Ok(text) => {
                let title = extract_title(&text);
                documents.push(Document { filename: file_name(&path), title, text });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable document");
            }
        }
    }
    info!(dir = %dir.display(), count = documents.len(), "loaded documents");
    documents
}

/// Load and normalize all analysis records under `dir`, sorted by path.
///
/// Each file holds one JSON array of heterogeneous records; the laboratory
/// is attributed from the filename. Records failing the admission filter
/// (empty `titre` or `lien`) are dropped.
pub fn load_analyses(dir: &Path) -> Vec<AnalysisRecord> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "analysis directory not found");
        return Vec::new();
    }

    let mut records = Vec::new();
    for path in files_with_extension(dir, "json") {
        let filename = file_name(&path);
        let laboratoire = laboratory_for_filename(&filename);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable record file");
                continue;
            }
        };
        let items: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(items) => items,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping malformed record file");
                continue;
            }
        };

        let before = records.len();
        let mut rejected = 0usize;
        for item in items {
            if !item.is_object() {
                continue;
            }
            let raw: RawAnalysis = match serde_json::from_value(item) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping malformed record");
                    continue;
                }
            };
            match AnalysisRecord::from_raw(raw, laboratoire) {
                Some(record) => records.push(record),
                None => rejected += 1,
            }
        }
        info!(
            file = %filename,
            laboratoire,
            loaded = records.len() - before,
            rejected,
            "loaded analyses"
        );
    }
    records
}

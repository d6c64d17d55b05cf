//! Data types for source documents and their chunks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document loaded from the corpus directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The source file name (without directory).
    pub filename: String,
    /// The document title: its first level-1 markdown heading.
    pub title: String,
    /// The full text content.
    pub text: String,
}

/// A token-bounded segment of a [`Document`], stored as one retrievable unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The text content of the chunk.
    pub content: String,
    /// The source file name.
    pub filename: String,
    /// The parent document title.
    pub title: String,
    /// Unique id within a collection build: `"<filename>_<index>"`.
    pub chunk_id: String,
}

impl Chunk {
    /// The metadata map stored alongside the chunk's embedding.
    ///
    /// Every field is always present so the map reconstructs the chunk
    /// fields exactly.
    pub fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            ("filename".to_string(), self.filename.clone()),
            ("title".to_string(), self.title.clone()),
            ("chunk_id".to_string(), self.chunk_id.clone()),
        ])
    }
}

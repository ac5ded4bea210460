//! Synchronized document store
//!
//! Holds the editor's live text for the single most recently queried
//! document. Queries for any other document fall back to disk and take
//! over the slot. The identity + version check and the content update
//! happen under one lock so concurrent request handlers cannot observe a
//! torn state, and an out-of-order or duplicate change notification can
//! never regress the content.

use thiserror::Error;
use tokio::sync::Mutex;
use tower_lsp::lsp_types::Url;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported document uri: {0}")]
    InvalidUri(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The editor's authoritative view of one open document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedDocument {
    pub uri: Url,
    pub content: String,
    pub version: i32,
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    slot: Mutex<Option<SyncedDocument>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a full-text change notification. The update only lands when a
    /// document is cached, the identity matches, and the version strictly
    /// increases; anything else is dropped. A change for a document that
    /// was never read stays dropped (content is fetched lazily on the
    /// first query instead).
    pub async fn apply_change(&self, uri: &Url, version: i32, text: String) -> bool {
        let mut slot = self.slot.lock().await;
        match slot.as_mut() {
            Some(document) if document.uri == *uri && version > document.version => {
                document.content = text;
                document.version = version;
                true
            }
            _ => {
                debug!("Dropping change notification for {} (v{})", uri, version);
                false
            }
        }
    }

    /// Resolve the text a query should analyze: the synchronized content
    /// when `uri` matches the cached document, otherwise the on-disk
    /// content, which seeds the slot at version 0 and evicts whatever was
    /// cached before.
    pub async fn get_content(&self, uri: &Url) -> Result<String, DocumentError> {
        let mut slot = self.slot.lock().await;

        if let Some(document) = slot.as_ref() {
            if document.uri == *uri {
                return Ok(document.content.clone());
            }
        }

        let path = uri
            .to_file_path()
            .map_err(|()| DocumentError::InvalidUri(uri.to_string()))?;
        let content = tokio::fs::read_to_string(&path).await?;
        *slot = Some(SyncedDocument {
            uri: uri.clone(),
            content: content.clone(),
            version: 0,
        });
        Ok(content)
    }
}

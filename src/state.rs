//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::ocr::{GoogleVisionExtractor, OcrError, TextExtractor};
use crate::scan::{BookMatcher, ScanSessionStore};
use crate::search::{BookSearchProvider, CachedSearchProvider, GoogleBooksProvider, SearchError};

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to initialize book search: {0}")]
    Search(#[from] SearchError),

    #[error("Failed to initialize OCR: {0}")]
    Ocr(#[from] OcrError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    matcher: BookMatcher,
    extractor: Option<Arc<dyn TextExtractor>>,
    sessions: ScanSessionStore,
}

impl AppState {
    /// Create the application state from configuration
    ///
    /// Book search goes through Google Books behind an LRU cache. Image
    /// scanning is only available when a Vision API key is configured.
    pub fn new(config: Config) -> Result<Self, StateError> {
        let books = GoogleBooksProvider::new(
            &config.books.api_url,
            config.books.api_key.clone(),
            config.books.timeout(),
        )?;
        let provider: Arc<dyn BookSearchProvider> =
            Arc::new(CachedSearchProvider::new(Arc::new(books), config.books.cache_size));

        let extractor: Option<Arc<dyn TextExtractor>> = match &config.vision.api_key {
            Some(key) => Some(Arc::new(GoogleVisionExtractor::new(
                &config.vision.api_url,
                key,
                config.vision.timeout(),
            )?)),
            None => {
                tracing::warn!("GOOGLE_VISION_API_KEY not set, image scanning disabled");
                None
            }
        };

        Ok(Self::from_parts(config, provider, extractor))
    }

    /// Assemble state from already-built collaborators
    pub fn from_parts(
        config: Config,
        provider: Arc<dyn BookSearchProvider>,
        extractor: Option<Arc<dyn TextExtractor>>,
    ) -> Self {
        let matcher = BookMatcher::new(provider, config.matcher_config());
        let sessions = ScanSessionStore::new(config.scan.session_capacity);

        Self {
            inner: Arc::new(AppStateInner {
                matcher,
                extractor,
                sessions,
            }),
        }
    }

    /// Get the book matcher
    pub fn matcher(&self) -> &BookMatcher {
        &self.inner.matcher
    }

    /// Get the text extractor, if image scanning is enabled
    pub fn extractor(&self) -> Option<&Arc<dyn TextExtractor>> {
        self.inner.extractor.as_ref()
    }

    /// Get the scan session store
    pub fn sessions(&self) -> &ScanSessionStore {
        &self.inner.sessions
    }
}

//! OCR Module
//!
//! Turns a shelf photo into positioned text fragments for the scan pipeline.
//!
//! Supports:
//! - Google Cloud Vision TEXT_DETECTION (word-level boxes)
//! - A static extractor returning canned fragments
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shelfscan::ocr::{GoogleVisionExtractor, TextExtractor};
//!
//! let extractor = GoogleVisionExtractor::new(base_url, api_key, timeout)?;
//! let result = extractor.extract(&image_bytes).await?;
//! let matches = matcher.match_books_from_fragments(&result.fragments, None).await;
//! ```

mod provider;
mod types;

pub use provider::{GoogleVisionExtractor, StaticExtractor, TextExtractor};
pub use types::{ExtractionResult, OcrError, OcrProvider};

//! Shelf Scan Module
//!
//! Identifies the books on a photographed shelf from positioned OCR
//! fragments.
//!
//! Pipeline:
//! - `cluster`: group fragments into vertical spine strips
//! - `similarity`: edit distance and composite title/author scoring
//! - `resolver`: one search per spine, rescored against the OCR text
//! - `matcher`: batched resolution, first-seen deduplication, ranking
//! - `session`: cross-frame merging for live scans
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shelfscan::scan::{BookMatcher, MatcherConfig};
//!
//! let matcher = BookMatcher::new(provider, MatcherConfig::default());
//! let matches = matcher.match_books_from_fragments(&fragments, None).await;
//! ```

pub mod cluster;
pub mod matcher;
pub mod resolver;
pub mod session;
pub mod similarity;
mod types;

pub use matcher::{BookMatcher, MatcherConfig, DEFAULT_CONFIDENCE_THRESHOLD};
pub use session::{ScanSession, ScanSessionStore, SessionMatch, SessionSnapshot};
pub use types::{Bounds, CandidateBook, MatchResult, PositionedFragment, SpineCluster};

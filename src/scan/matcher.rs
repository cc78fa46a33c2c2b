//! Match Aggregator
//!
//! Runs the resolver over every spine cluster of one image and returns the
//! ranked, deduplicated matches.
//!
//! Clusters are resolved in fixed-size batches: the resolutions within a
//! batch run concurrently, and a batch starts only after the previous one
//! has fully completed. When two clusters resolve to the same external id,
//! the leftmost one wins.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use super::cluster::{cluster_fragments, DEFAULT_PROXIMITY_PX};
use super::resolver::{BookResolver, MAX_CANDIDATES, MAX_QUERY_LEN};
use super::types::{MatchResult, PositionedFragment};
use crate::search::BookSearchProvider;

/// Default confidence floor for accepting a candidate
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.45;
/// Default number of clusters resolved concurrently
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Matcher tuning
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    pub confidence_threshold: f64,
    pub proximity_px: f64,
    pub batch_size: usize,
    pub max_candidates: usize,
    pub max_query_len: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            proximity_px: DEFAULT_PROXIMITY_PX,
            batch_size: DEFAULT_BATCH_SIZE,
            max_candidates: MAX_CANDIDATES,
            max_query_len: MAX_QUERY_LEN,
        }
    }
}

/// Shelf-scan entry point: fragments in, ranked matches out
#[derive(Clone)]
pub struct BookMatcher {
    resolver: BookResolver,
    config: MatcherConfig,
}

impl BookMatcher {
    pub fn new(provider: Arc<dyn BookSearchProvider>, config: MatcherConfig) -> Self {
        let resolver = BookResolver::with_limits(provider, config.max_candidates, config.max_query_len);
        Self { resolver, config }
    }

    /// Identify the books in one image's OCR fragments.
    ///
    /// Never fails: provider errors only reduce the number of matches. Every
    /// returned match has a distinct external id and a score at or above the
    /// threshold (the configured one unless overridden), sorted by score
    /// descending.
    pub async fn match_books_from_fragments(
        &self,
        fragments: &[PositionedFragment],
        confidence_threshold: Option<f64>,
    ) -> Vec<MatchResult> {
        let threshold = confidence_threshold.unwrap_or(self.config.confidence_threshold);

        let clusters = cluster_fragments(fragments, self.config.proximity_px);
        if clusters.is_empty() {
            return Vec::new();
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut matches: Vec<MatchResult> = Vec::new();
        let mut duplicates = 0usize;

        for batch in clusters.chunks(self.config.batch_size.max(1)) {
            let resolved = join_all(
                batch
                    .iter()
                    .map(|cluster| self.resolver.resolve_cluster(cluster.texts(), threshold)),
            )
            .await;

            for result in resolved.into_iter().flatten() {
                if seen.insert(result.external_id().to_string()) {
                    matches.push(result);
                } else {
                    duplicates += 1;
                }
            }
        }

        // Stable sort: equal scores stay in resolution order
        matches.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));

        tracing::debug!(
            fragments = fragments.len(),
            clusters = clusters.len(),
            matches = matches.len(),
            duplicates,
            threshold,
            "Shelf scan matched"
        );

        matches
    }
}

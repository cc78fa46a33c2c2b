//! Bibliographic Resolver
//!
//! Turns one spine cluster into a search query, rescores every returned
//! candidate against the cluster text and keeps the best one that clears the
//! confidence floor. Provider failures are absorbed: the cluster simply has
//! no match for this pass.

use std::sync::Arc;

use super::similarity::score_match;
use super::types::{CandidateBook, MatchResult};
use crate::search::BookSearchProvider;

/// Shortest query worth sending to the provider
pub const MIN_QUERY_LEN: usize = 3;
/// Longer queries are truncated to this many characters
pub const MAX_QUERY_LEN: usize = 100;
/// Candidates requested per cluster
pub const MAX_CANDIDATES: usize = 3;

/// Resolves spine clusters against a search provider
#[derive(Clone)]
pub struct BookResolver {
    provider: Arc<dyn BookSearchProvider>,
    max_candidates: usize,
    max_query_len: usize,
}

impl BookResolver {
    pub fn new(provider: Arc<dyn BookSearchProvider>) -> Self {
        Self {
            provider,
            max_candidates: MAX_CANDIDATES,
            max_query_len: MAX_QUERY_LEN,
        }
    }

    pub fn with_limits(provider: Arc<dyn BookSearchProvider>, max_candidates: usize, max_query_len: usize) -> Self {
        Self {
            provider,
            max_candidates,
            max_query_len,
        }
    }

    /// Build the search query for a cluster, or `None` when it carries too little text
    pub fn build_query(&self, cluster_texts: &[String]) -> Option<String> {
        let joined = cluster_texts.join(" ");
        let joined = joined.trim();
        if joined.chars().count() < MIN_QUERY_LEN {
            return None;
        }
        Some(joined.chars().take(self.max_query_len).collect())
    }

    /// Best candidate for one cluster scoring at least `confidence_threshold`
    pub async fn resolve_cluster(&self, cluster_texts: &[String], confidence_threshold: f64) -> Option<MatchResult> {
        let query = self.build_query(cluster_texts)?;

        let candidates = match self.provider.search(&query, self.max_candidates).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    query = %query,
                    error = %e,
                    "Book search failed, treating cluster as unmatched"
                );
                Vec::new()
            }
        };

        let (book, score) = pick_best(&query, candidates, confidence_threshold)?;

        tracing::debug!(
            query = %query,
            external_id = %book.external_id,
            score,
            "Cluster matched"
        );

        Some(MatchResult {
            book,
            confidence_score: score,
            matched_fragments: cluster_texts.to_vec(),
        })
    }
}

/// Highest-scoring candidate at or above the threshold; earlier candidates win ties.
///
/// The running best starts at 0, so a zero score never matches.
fn pick_best(query: &str, candidates: Vec<CandidateBook>, threshold: f64) -> Option<(CandidateBook, f64)> {
    let mut best: Option<CandidateBook> = None;
    let mut best_score = 0.0;

    for candidate in candidates {
        let score = score_match(query, &candidate.title, &candidate.authors);
        if score >= threshold && score > best_score {
            best = Some(candidate);
            best_score = score;
        }
    }

    best.map(|book| (book, best_score))
}

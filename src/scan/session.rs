//! Scan sessions
//!
//! A live scan produces one match list per camera frame. The matcher
//! deduplicates within a frame only; a session merges frames by external id,
//! keeping the highest-confidence match seen for each book.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use super::types::MatchResult;

const DEFAULT_SESSION_CAPACITY: usize = 256;

/// A book seen during a session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMatch {
    #[serde(flatten)]
    pub result: MatchResult,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    /// Number of frames the book was matched in
    pub frames_seen: u32,
}

/// Accumulated matches of one scanning session
#[derive(Debug, Clone)]
pub struct ScanSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    frames: u32,
    matches: HashMap<String, SessionMatch>,
}

/// Serializable view of a session, matches ranked by confidence
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub frames: u32,
    pub matches: Vec<SessionMatch>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            frames: 0,
            matches: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Merge one frame's matches
    pub fn merge_frame(&mut self, results: Vec<MatchResult>, now: DateTime<Utc>) {
        self.frames += 1;

        for result in results {
            match self.matches.get_mut(result.external_id()) {
                Some(existing) => {
                    existing.frames_seen += 1;
                    existing.last_seen_at = now;
                    if result.confidence_score > existing.result.confidence_score {
                        existing.result = result;
                    }
                }
                None => {
                    self.matches.insert(
                        result.external_id().to_string(),
                        SessionMatch {
                            result,
                            first_seen_at: now,
                            last_seen_at: now,
                            frames_seen: 1,
                        },
                    );
                }
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut matches: Vec<SessionMatch> = self.matches.values().cloned().collect();
        matches.sort_by(|a, b| {
            b.result
                .confidence_score
                .total_cmp(&a.result.confidence_score)
                .then_with(|| a.first_seen_at.cmp(&b.first_seen_at))
                .then_with(|| a.result.external_id().cmp(b.result.external_id()))
        });

        SessionSnapshot {
            session_id: self.id,
            created_at: self.created_at,
            frames: self.frames,
            matches,
        }
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded in-memory session store; least recently used sessions are evicted
pub struct ScanSessionStore {
    sessions: Mutex<LruCache<Uuid, ScanSession>>,
}

impl ScanSessionStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_SESSION_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Start a new session and return its id
    pub fn create(&self) -> Uuid {
        let session = ScanSession::new();
        let id = session.id();

        if let Some((evicted, _)) = self.sessions.lock().push(id, session) {
            if evicted != id {
                tracing::debug!(session_id = %evicted, "Evicted scan session");
            }
        }
        tracing::info!(session_id = %id, "Created scan session");
        id
    }

    /// Merge a frame into a session; `None` for unknown sessions
    pub fn merge_frame(&self, id: &Uuid, results: Vec<MatchResult>) -> Option<SessionSnapshot> {
        let mut sessions = self.sessions.lock();
        let session = sessions.get_mut(id)?;
        session.merge_frame(results, Utc::now());
        Some(session.snapshot())
    }

    pub fn get(&self, id: &Uuid) -> Option<SessionSnapshot> {
        self.sessions.lock().get(id).map(ScanSession::snapshot)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

impl Default for ScanSessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY)
    }
}

//! Session queue store
//!
//! Process-wide map from session to its pending tracks and "now playing"
//! slot:
//!
//! ```text
//! Session 809493208504860692
//!   Currently Playing: Track A
//!   ─────────────────────────────
//!   Pending (FIFO):
//!     - Track B   <- next
//!     - Track C
//! ```
//!
//! The outer map lock is only taken to find, create or remove an entry.
//! Mutations of one session take that session's mutex and never hold it
//! across an `.await`, so a slow catalog call can't stall the queue.

use crate::error::QueueError;
use crate::shuffle;
use chorus_core::{SessionId, Track};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// What the player should do after the queue advanced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Start this track (already moved into the current slot)
    Start(Track),
    /// Queue drained; stop the player and go idle
    Stop,
}

#[derive(Debug, Default)]
struct SessionQueue {
    /// Track the player was last told to start; never also in `pending`
    current: Option<Track>,
    /// Upcoming tracks, head is next
    pending: VecDeque<Track>,
}

impl SessionQueue {
    /// Move the head of the pending queue into the current slot
    fn promote_next(&mut self) -> Option<Track> {
        self.current = self.pending.pop_front();
        self.current.clone()
    }
}

/// Per-session playback queues
#[derive(Debug, Default)]
pub struct SessionQueueStore {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<SessionQueue>>>>,
}

fn lock(queue: &Mutex<SessionQueue>) -> MutexGuard<'_, SessionQueue> {
    // A panic while holding the lock can't leave the VecDeque half-written
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionQueueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against an existing session, if any
    fn with_session<R>(&self, id: SessionId, f: impl FnOnce(&mut SessionQueue) -> R) -> Option<R> {
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        sessions.get(&id).map(|queue| f(&mut lock(queue)))
    }

    /// Run `f` against a session, creating it first when missing
    fn with_session_or_create<R>(&self, id: SessionId, f: impl FnOnce(&mut SessionQueue) -> R) -> R {
        {
            let sessions = self
                .sessions
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(queue) = sessions.get(&id) {
                return f(&mut lock(queue));
            }
        }

        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let queue = sessions.entry(id).or_default();
        let mut guard = lock(queue);
        f(&mut guard)
    }

    /// Whether a queue entry exists for the session
    pub fn exists(&self, id: SessionId) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    /// Append a track, creating the session entry if needed
    pub fn append(&self, id: SessionId, track: Track) {
        self.with_session_or_create(id, |queue| queue.pending.push_back(track));
    }

    /// Append several tracks in order, as one critical section
    pub fn append_all(&self, id: SessionId, tracks: impl IntoIterator<Item = Track>) {
        self.with_session_or_create(id, |queue| queue.pending.extend(tracks));
    }

    /// Remove and return the next pending track
    ///
    /// # Errors
    /// [`QueueError::Empty`] when the queue is empty or the session unknown
    pub fn pop_front(&self, id: SessionId) -> Result<Track, QueueError> {
        self.with_session(id, |queue| queue.pending.pop_front())
            .flatten()
            .ok_or(QueueError::Empty)
    }

    /// Replace the pending tracks with a random permutation of themselves
    ///
    /// Returns the number of shuffled tracks.
    ///
    /// # Errors
    /// [`QueueError::Missing`] when the session has no entry
    pub fn replace_shuffled(&self, id: SessionId) -> Result<usize, QueueError> {
        self.with_session(id, |queue| {
            shuffle::shuffle_tracks(queue.pending.make_contiguous());
            queue.pending.len()
        })
        .ok_or(QueueError::Missing)
    }

    /// Drop the session's entry entirely (stop / disconnect)
    ///
    /// Returns whether an entry existed.
    pub fn clear(&self, id: SessionId) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    /// Copy of the pending tracks in play order
    pub fn snapshot(&self, id: SessionId) -> Vec<Track> {
        self.with_session(id, |queue| queue.pending.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of pending tracks (0 for unknown sessions)
    pub fn len(&self, id: SessionId) -> usize {
        self.with_session(id, |queue| queue.pending.len())
            .unwrap_or_default()
    }

    /// Whether the session has no pending tracks
    pub fn is_empty(&self, id: SessionId) -> bool {
        self.len(id) == 0
    }

    /// Next pending track without removing it
    pub fn peek_next(&self, id: SessionId) -> Option<Track> {
        self.with_session(id, |queue| queue.pending.front().cloned())
            .flatten()
    }

    /// Track in the session's current slot
    pub fn current(&self, id: SessionId) -> Option<Track> {
        self.with_session(id, |queue| queue.current.clone()).flatten()
    }

    /// Append `tracks`; if nothing is current, promote the head
    ///
    /// Returns the track the caller must start. Deciding "idle or not" and
    /// appending happen in one critical section so two concurrent enqueues
    /// can't both start playback.
    pub fn enqueue(&self, id: SessionId, tracks: Vec<Track>) -> Option<Track> {
        self.with_session_or_create(id, |queue| {
            queue.pending.extend(tracks);
            if queue.current.is_none() {
                queue.promote_next()
            } else {
                None
            }
        })
    }

    /// Move the queue forward after a skip or a finished track
    ///
    /// Unknown sessions are treated as drained and no entry is created.
    pub fn advance(&self, id: SessionId) -> Advance {
        self.with_session(id, SessionQueue::promote_next)
            .flatten()
            .map_or(Advance::Stop, Advance::Start)
    }

    /// Number of sessions with a queue entry
    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

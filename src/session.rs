//! Caller-owned session state for the pipeline.
//!
//! A [`RagSession`] replaces ambient global state: the caller owns one,
//! passes it to every pipeline call, and controls its lifecycle
//! (uninitialized → built → stale on input change → rebuilt).

use crate::index::VectorIndex;

/// Lifecycle state of a session's index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No index has been built or loaded yet.
    Uninitialized,
    /// An index is installed and current.
    Built,
    /// An index is installed but the source document set has changed since
    /// it was built. Still queryable until rebuilt.
    Stale,
}

/// Caller-owned context holding the built vector index for a session.
///
/// The index, once installed, is treated as read-only; a changed document
/// set replaces it wholesale via [`install`](RagSession::install).
#[derive(Debug, Default)]
pub struct RagSession {
    index: Option<VectorIndex>,
    stale: bool,
}

impl RagSession {
    /// Create a new uninitialized session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SessionState {
        match (&self.index, self.stale) {
            (None, _) => SessionState::Uninitialized,
            (Some(_), false) => SessionState::Built,
            (Some(_), true) => SessionState::Stale,
        }
    }

    /// The installed index, if any. Stale indexes remain queryable.
    pub fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }

    /// Whether the installed index no longer reflects the document set.
    pub fn is_stale(&self) -> bool {
        self.index.is_some() && self.stale
    }

    /// Install a freshly built or loaded index, replacing any previous one.
    pub fn install(&mut self, index: VectorIndex) {
        self.index = Some(index);
        self.stale = false;
    }

    /// Mark the installed index stale after the document set changed.
    /// No-op for an uninitialized session.
    pub fn mark_stale(&mut self) {
        if self.index.is_some() {
            self.stale = true;
        }
    }

    /// Drop the installed index, returning to the uninitialized state.
    pub fn clear(&mut self) {
        self.index = None;
        self.stale = false;
    }
}

//! The user's saved papers.

use crate::error::StorageError;
use crate::paper::Paper;
use crate::persistence::{PersistenceBridge, SAVED_PAPERS_KEY};

/// Result of toggling a paper's saved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveToggle {
    Saved,
    Removed,
}

/// Papers pinned by the user, in insertion order.
///
/// Membership is decided by [`Paper::identity_key`]; no two members share a
/// title.
#[derive(Debug, Clone)]
pub struct SavedCollection {
    papers: Vec<Paper>,
    bridge: PersistenceBridge,
}

impl SavedCollection {
    /// Read the persisted collection. Absent or malformed data yields an
    /// empty collection; this never fails.
    pub fn load(bridge: PersistenceBridge) -> Self {
        let stored: Vec<Paper> = bridge.load_or_default(SAVED_PAPERS_KEY);
        let mut papers: Vec<Paper> = Vec::with_capacity(stored.len());
        for paper in stored {
            if !papers.iter().any(|p| p.same_identity(&paper)) {
                papers.push(paper);
            }
        }
        tracing::debug!(count = papers.len(), "Loaded saved papers");
        Self { papers, bridge }
    }

    /// Remove the paper if a member shares its title, otherwise append it.
    ///
    /// The in-memory collection always changes; a failed store write is
    /// reported alongside the toggle result.
    pub fn toggle(&mut self, paper: &Paper) -> (SaveToggle, Result<(), StorageError>) {
        let toggle = if self.contains(paper) {
            self.papers.retain(|p| !p.same_identity(paper));
            SaveToggle::Removed
        } else {
            self.papers.push(paper.clone());
            SaveToggle::Saved
        };
        tracing::info!(title = %paper.title, ?toggle, "Saved papers changed");

        let persisted = self
            .bridge
            .save(SAVED_PAPERS_KEY, &self.papers)
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to persist saved papers"));
        (toggle, persisted)
    }

    /// Whether a member with the same title exists.
    pub fn contains(&self, paper: &Paper) -> bool {
        self.papers.iter().any(|p| p.same_identity(paper))
    }

    /// Find a saved paper by exact title.
    pub fn find_by_title(&self, title: &str) -> Option<&Paper> {
        self.papers.iter().find(|p| p.identity_key() == title)
    }

    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    pub fn get(&self, index: usize) -> Option<&Paper> {
        self.papers.get(index)
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// "1 paper" / "N papers".
    pub fn count_label(&self) -> String {
        match self.papers.len() {
            1 => "1 paper".to_string(),
            n => format!("{} papers", n),
        }
    }
}

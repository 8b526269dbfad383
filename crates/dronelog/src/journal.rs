//! The observation list and the hand-off to the details view.

use tracing::debug;

use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::log_store::ObservationLog;
use crate::record::ObservationRecord;

/// Cached view of the observation log.
///
/// The cache is only as fresh as the last [`JournalView::refresh`]; callers
/// refresh whenever the list becomes visible again.
#[derive(Debug)]
pub struct JournalView<S> {
    log: ObservationLog<S>,
    entries: Vec<ObservationRecord>,
}

impl<S: KeyValueStore> JournalView<S> {
    /// Create a view with an empty cache.
    pub fn new(log: ObservationLog<S>) -> Self {
        Self {
            log,
            entries: Vec::new(),
        }
    }

    /// The log this view reads from.
    #[must_use]
    pub fn log(&self) -> &ObservationLog<S> {
        &self.log
    }

    /// Reload the cache from the log.
    ///
    /// # Errors
    ///
    /// Returns the log's load error; the previous cache is kept.
    pub async fn refresh(&mut self) -> Result<&[ObservationRecord]> {
        self.entries = self.log.load_all().await?;
        debug!(count = self.entries.len(), "Journal refreshed");
        Ok(&self.entries)
    }

    /// Delete every observation and empty the cache.
    ///
    /// # Errors
    ///
    /// Returns the log's clear error; the cache is kept.
    pub async fn clear_all(&mut self) -> Result<()> {
        self.log.clear_all().await?;
        self.entries.clear();
        Ok(())
    }

    /// Cached records, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[ObservationRecord] {
        &self.entries
    }

    /// Check if the cache holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The record at zero-based `index`, cloned for the details view.
    #[must_use]
    pub fn open(&self, index: usize) -> Option<ObservationRecord> {
        self.entries.get(index).cloned()
    }

    /// Find a record by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&ObservationRecord> {
        self.entries.iter().find(|record| record.id == id)
    }

    /// Resolve a list position (starting at 1) or a record id.
    ///
    /// Positions win when the text is a number within the list length.
    #[must_use]
    pub fn lookup(&self, target: &str) -> Option<ObservationRecord> {
        if let Ok(position) = target.parse::<usize>() {
            if (1..=self.entries.len()).contains(&position) {
                return self.open(position - 1);
            }
        }
        self.find(target).cloned()
    }

    /// Summary lines for the list, numbered from 1.
    #[must_use]
    pub fn summaries(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, record)| format!("{:>3}. {}", i + 1, record.summary()))
            .collect()
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Paged walks over an entity's log history

use keel_core::{Id, LogEntry, Scope, Version};
use keel_storage::{ColumnStore, LogEntrySerializationStrategy, StoreError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Cursor over one entity's log, one page per store read
pub struct LogPager<S> {
    logs: LogEntrySerializationStrategy<S>,
    scope: Scope,
    id: Id,
    direction: Direction,
    page_size: usize,
    /// Next version to read from (inclusive); `None` once exhausted
    cursor: Option<Version>,
}

impl<S: ColumnStore> LogPager<S> {
    pub fn ascending(
        logs: LogEntrySerializationStrategy<S>,
        scope: Scope,
        id: Id,
        from: Version,
        page_size: usize,
    ) -> Self {
        Self::new(logs, scope, id, Direction::Ascending, from, page_size)
    }

    pub fn descending(
        logs: LogEntrySerializationStrategy<S>,
        scope: Scope,
        id: Id,
        from: Version,
        page_size: usize,
    ) -> Self {
        Self::new(logs, scope, id, Direction::Descending, from, page_size)
    }

    fn new(
        logs: LogEntrySerializationStrategy<S>,
        scope: Scope,
        id: Id,
        direction: Direction,
        from: Version,
        page_size: usize,
    ) -> Self {
        Self {
            logs,
            scope,
            id,
            direction,
            page_size: page_size.max(1),
            cursor: Some(from),
        }
    }

    /// Next page of entries; empty once the history is exhausted
    pub async fn next_page(&mut self) -> Result<Vec<LogEntry>, StoreError> {
        let Some(cursor) = self.cursor else {
            return Ok(Vec::new());
        };
        let page = match self.direction {
            Direction::Ascending => {
                self.logs
                    .load_ascending(&self.scope, &self.id, cursor, self.page_size)
                    .await?
            }
            Direction::Descending => {
                self.logs
                    .load_descending(&self.scope, &self.id, cursor, self.page_size)
                    .await?
            }
        };

        self.cursor = match page.last() {
            Some(last) if page.len() >= self.page_size => self.step_past(last.version),
            _ => None,
        };
        Ok(page)
    }

    /// Drain every remaining page
    pub async fn collect(mut self) -> Result<Vec<LogEntry>, StoreError> {
        let mut out = Vec::new();
        loop {
            let page = self.next_page().await?;
            if page.is_empty() {
                return Ok(out);
            }
            out.extend(page);
        }
    }

    fn step_past(&self, version: Version) -> Option<Version> {
        match self.direction {
            Direction::Ascending if version == Version::MAX => None,
            Direction::Descending if version == Version::MIN => None,
            Direction::Ascending => Some(version.successor()),
            Direction::Descending => Some(version.predecessor()),
        }
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;

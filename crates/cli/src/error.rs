// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing errors with context and suggestions

use keel_core::{Field, Id};
use keel_engine::CollectionError;
use keel_storage::StoreError;
use std::fmt;
use std::path::Path;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct KeelError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl KeelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for KeelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for KeelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Builders for the failures users actually hit
impl KeelError {
    pub fn unique_conflict(id: &Id, violations: &[Field]) -> Self {
        let names: Vec<String> = violations
            .iter()
            .map(|f| match f.value.scalar_repr() {
                Some(value) => format!("{}={}", f.name, value),
                None => f.name.clone(),
            })
            .collect();
        let mut err = KeelError::new(format!("unique value already taken: {}", names.join(", ")))
            .with_context(format!("{} was not written", id));
        for field in violations {
            if let Some(value) = field.value.scalar_repr() {
                err = err.with_suggestion(format!(
                    "Find the owner: keel lookup {} {} {}",
                    id.type_name, field.name, value
                ));
            }
        }
        err.with_suggestion("Choose a different value and retry")
    }

    pub fn entity_not_found(id: &Id) -> Self {
        KeelError::new(format!("{} not found", id))
            .with_context("It may never have been written, or it was deleted")
            .with_suggestion(format!(
                "Check its history: keel history {} {}",
                id.type_name, id.uuid
            ))
    }

    pub fn value_not_claimed(type_name: &str, field: &str, value: &str) -> Self {
        KeelError::new(format!("no {} owns {}={}", type_name, field, value))
            .with_suggestion(format!("Write one: keel put {} --unique {}={}", type_name, field, value))
    }

    pub fn store_locked(dir: &Path) -> Self {
        KeelError::new(format!("data directory {} is in use", dir.display()))
            .with_context("Another keel process holds the store lock")
            .with_suggestion("Wait for the other command to finish")
            .with_suggestion("Use a different directory with --data-dir")
    }

    pub fn invalid_field(arg: &str, reason: impl fmt::Display) -> Self {
        KeelError::new(format!("invalid field '{}': {}", arg, reason))
            .with_suggestion("Fields are written as name=value or name:kind=value")
            .with_suggestion("Kinds: string, boolean, integer, long, float, double, uuid")
    }

    pub fn no_data_dir() -> Self {
        KeelError::new("cannot determine a data directory").with_suggestion("Pass --data-dir")
    }
}

impl From<CollectionError> for KeelError {
    fn from(e: CollectionError) -> Self {
        match e {
            CollectionError::UniqueConflict {
                entity_id,
                violations,
                ..
            } => KeelError::unique_conflict(&entity_id, &violations),
            CollectionError::Storage(StoreError::Connection(reason)) => {
                KeelError::new("store unavailable")
                    .with_context(reason)
                    .with_suggestion("Retry the command")
            }
            other if other.is_retryable() => KeelError::new(other.to_string())
                .with_suggestion("Retry the command")
                .with_source(other),
            other => KeelError::new(other.to_string()).with_source(other),
        }
    }
}

impl From<StoreError> for KeelError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Corrupt(reason) => KeelError::new("store data is corrupt")
                .with_context(reason)
                .with_suggestion("Restore the data directory from a backup"),
            other => KeelError::new(other.to_string()).with_source(other),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

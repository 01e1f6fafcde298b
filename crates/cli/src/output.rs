// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use keel_core::{Entity, Field, FieldValue, LogEntry, Stage, State, Version};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + fmt::Display>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for item in items {
                println!("{}", item);
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(items) {
                println!("{}", json);
            }
        }
    }
}

/// A loaded entity version
#[derive(Serialize)]
#[serde(transparent)]
pub struct EntityView<'a> {
    pub entity: &'a Entity,
}

impl fmt::Display for EntityView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entity.version {
            Some(version) => writeln!(f, "{} @ {}", self.entity.id, version)?,
            None => writeln!(f, "{}", self.entity.id)?,
        }
        for field in self.entity.fields.values() {
            write_field(f, field, 1)?;
        }
        Ok(())
    }
}

fn write_field(f: &mut fmt::Formatter<'_>, field: &Field, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    let marker = if field.unique { " (unique)" } else { "" };
    match &field.value {
        FieldValue::Object(children) => {
            writeln!(f, "{}{}:{}", indent, field.name, marker)?;
            for child in children {
                write_field(f, child, depth + 1)?;
            }
            Ok(())
        }
        value => writeln!(
            f,
            "{}{} = {}{}",
            indent,
            field.name,
            render_value(value),
            marker
        ),
    }
}

fn render_value(value: &FieldValue) -> String {
    match value {
        FieldValue::List(items) => {
            let items: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", items.join(", "))
        }
        FieldValue::Location {
            latitude,
            longitude,
        } => format!("({}, {})", latitude, longitude),
        FieldValue::Object(children) => {
            let children: Vec<String> = children
                .iter()
                .map(|c| format!("{}: {}", c.name, render_value(&c.value)))
                .collect();
            format!("{{{}}}", children.join(", "))
        }
        scalar => scalar.scalar_repr().unwrap_or_default(),
    }
}

/// Result of a successful write or delete
#[derive(Serialize)]
pub struct Written {
    pub id: String,
    pub version: Version,
    pub deleted: bool,
}

impl fmt::Display for Written {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.deleted { "deleted" } else { "written" };
        write!(f, "{} {} {}", verb, self.id, self.version)
    }
}

/// One row of an entity's version history
#[derive(Serialize)]
pub struct HistoryRow {
    pub version: Version,
    pub stage: Stage,
    pub state: State,
    pub timestamp: Option<String>,
}

impl From<&LogEntry> for HistoryRow {
    fn from(entry: &LogEntry) -> Self {
        Self {
            version: entry.version,
            stage: entry.stage,
            state: entry.state,
            timestamp: entry.version.timestamp().map(|t| t.to_rfc3339()),
        }
    }
}

impl fmt::Display for HistoryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {:<10} {:<9} {}",
            self.version,
            self.stage,
            self.state,
            self.timestamp.as_deref().unwrap_or("-")
        )
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

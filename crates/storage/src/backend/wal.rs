// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log for the memory backend
//!
//! One JSON line per applied batch, each carrying a CRC32 of its content.
//! Replay stops at the first line that fails to parse or verify; everything
//! from there on is truncated before new appends.

use super::{Mutation, StoreError};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WalRecord {
    pub sequence: u64,
    /// Epoch millis the batch was applied; TTLs count from here
    pub written_at: u64,
    pub mutations: Vec<Mutation>,
    pub checksum: u32,
}

impl WalRecord {
    pub fn new(sequence: u64, written_at: u64, mutations: Vec<Mutation>) -> Self {
        let checksum = Self::calculate_checksum(sequence, written_at, &mutations);
        Self {
            sequence,
            written_at,
            mutations,
            checksum,
        }
    }

    fn calculate_checksum(sequence: u64, written_at: u64, mutations: &[Mutation]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&sequence.to_be_bytes());
        hasher.update(&written_at.to_be_bytes());
        // Mutation holds only strings, byte vectors and integers
        let json = serde_json::to_vec(mutations).unwrap_or_default();
        hasher.update(&json);
        hasher.finalize()
    }

    pub fn verify(&self) -> bool {
        self.checksum == Self::calculate_checksum(self.sequence, self.written_at, &self.mutations)
    }
}

/// Valid prefix of a WAL file
pub(crate) struct Replay {
    pub records: Vec<WalRecord>,
    /// Byte length of the valid prefix
    pub valid_len: u64,
    /// Line number of the first invalid entry, if any
    pub corrupt_line: Option<u64>,
}

pub(crate) fn replay(path: &Path) -> Result<Replay, StoreError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Replay {
                records: Vec::new(),
                valid_len: 0,
                corrupt_line: None,
            })
        }
        Err(e) => return Err(e.into()),
    };

    let mut reader = BufReader::new(file);
    let mut records = Vec::new();
    let mut valid_len = 0u64;
    let mut position = 0u64;
    let mut line_number = 0u64;
    let mut corrupt_line = None;
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(n) => n as u64,
            Err(_) => {
                corrupt_line = Some(line_number + 1);
                break;
            }
        };
        line_number += 1;
        position += bytes_read;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            valid_len = position;
            continue;
        }
        match serde_json::from_str::<WalRecord>(trimmed) {
            Ok(record) if record.verify() && line.ends_with('\n') => {
                records.push(record);
                valid_len = position;
            }
            _ => {
                corrupt_line = Some(line_number);
                break;
            }
        }
    }

    Ok(Replay {
        records,
        valid_len,
        corrupt_line,
    })
}

/// Append-only writer; every append is fsynced before returning
pub(crate) struct WalWriter {
    path: PathBuf,
    file: File,
    next_sequence: u64,
}

impl WalWriter {
    /// Open for appending after `replay`, dropping any invalid tail
    pub fn open(path: &Path, replay: &Replay) -> Result<Self, StoreError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if replay.corrupt_line.is_some() {
            file.set_len(replay.valid_len)?;
            file.sync_all()?;
        }
        let next_sequence = replay.records.last().map(|r| r.sequence + 1).unwrap_or(1);
        Ok(Self {
            path: path.to_path_buf(),
            file,
            next_sequence,
        })
    }

    pub fn append(&mut self, written_at: u64, mutations: Vec<Mutation>) -> Result<u64, StoreError> {
        let sequence = self.next_sequence;
        let record = WalRecord::new(sequence, written_at, mutations);
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.sync_all()?;
        self.next_sequence += 1;
        Ok(sequence)
    }

    /// Replace the log with a single record holding `mutations`
    pub fn rewrite(&mut self, written_at: u64, mutations: Vec<Mutation>) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("jsonl.tmp");
        {
            let mut file = File::create(&tmp)?;
            if !mutations.is_empty() {
                let record = WalRecord::new(1, written_at, mutations);
                let mut line = serde_json::to_vec(&record)?;
                line.push(b'\n');
                file.write_all(&line)?;
            }
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        self.file = OpenOptions::new().append(true).open(&self.path)?;
        self.next_sequence = 2;
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;

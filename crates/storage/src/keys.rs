// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composite row and column keys
//!
//! Keys concatenate fixed 16-byte uuids and u64-length-prefixed strings, so
//! columns that start with a version sort in version order. Strings are
//! never truncated: a value of any size maps to its own key.

use crate::backend::StoreError;
use keel_core::{Field, FieldValue, Id, Scope, Version};
use uuid::Uuid;

const LEN_PREFIX: usize = 8;

#[derive(Default)]
pub(crate) struct KeyBuilder {
    buf: Vec<u8>,
}

impl KeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uuid(mut self, uuid: &Uuid) -> Self {
        self.buf.extend_from_slice(uuid.as_bytes());
        self
    }

    pub fn str(mut self, s: &str) -> Self {
        let bytes = s.as_bytes();
        // usize is at most 64 bits on every supported target
        let len = bytes.len() as u64;
        self.buf.extend_from_slice(&len.to_be_bytes());
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn id(self, id: &Id) -> Self {
        self.uuid(&id.uuid).str(&id.type_name)
    }

    pub fn scope(self, scope: &Scope) -> Self {
        self.id(&scope.application)
    }

    pub fn version(self, version: &Version) -> Self {
        self.uuid(version.as_uuid())
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

pub(crate) struct KeyReader<'a> {
    buf: &'a [u8],
}

impl<'a> KeyReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], StoreError> {
        if self.buf.len() < n {
            return Err(StoreError::Corrupt(format!(
                "key truncated: wanted {} bytes, {} left",
                n,
                self.buf.len()
            )));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub fn uuid(&mut self) -> Result<Uuid, StoreError> {
        let bytes = self.take(16)?;
        Uuid::from_slice(bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    pub fn str(&mut self) -> Result<String, StoreError> {
        let mut len_bytes = [0u8; LEN_PREFIX];
        len_bytes.copy_from_slice(self.take(LEN_PREFIX)?);
        let len = usize::try_from(u64::from_be_bytes(len_bytes))
            .map_err(|e| StoreError::Corrupt(format!("key string length: {}", e)))?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    pub fn id(&mut self) -> Result<Id, StoreError> {
        let uuid = self.uuid()?;
        let type_name = self.str()?;
        Ok(Id::new(uuid, type_name))
    }

    pub fn version(&mut self) -> Result<Version, StoreError> {
        self.uuid().map(Version::from_uuid)
    }

    pub fn finish(self) -> Result<(), StoreError> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Corrupt(format!(
                "{} trailing key bytes",
                self.buf.len()
            )))
        }
    }
}

/// Row holding every version of one entity
pub(crate) fn entity_row(scope: &Scope, id: &Id) -> Vec<u8> {
    KeyBuilder::new().scope(scope).id(id).finish()
}

pub(crate) fn version_column(version: &Version) -> Vec<u8> {
    KeyBuilder::new().version(version).finish()
}

pub(crate) fn decode_version_column(name: &[u8]) -> Result<Version, StoreError> {
    let mut reader = KeyReader::new(name);
    let version = reader.version()?;
    reader.finish()?;
    Ok(version)
}

/// Row holding every claim on one field value; `None` for non-scalar fields
pub(crate) fn unique_row(scope: &Scope, type_name: &str, field: &Field) -> Option<Vec<u8>> {
    let repr = field.value.scalar_repr()?;
    Some(
        KeyBuilder::new()
            .scope(scope)
            .str(type_name)
            .str(field.value.kind())
            .str(&field.name)
            .str(&repr)
            .finish(),
    )
}

/// Claim column in a value row: version first so the oldest claim sorts first
pub(crate) fn unique_owner_column(version: &Version, id: &Id) -> Vec<u8> {
    KeyBuilder::new().version(version).id(id).finish()
}

pub(crate) fn decode_unique_owner_column(name: &[u8]) -> Result<(Version, Id), StoreError> {
    let mut reader = KeyReader::new(name);
    let version = reader.version()?;
    let id = reader.id()?;
    reader.finish()?;
    Ok((version, id))
}

/// Claim column in an entity's unique log row
pub(crate) fn unique_log_column(version: &Version, field: &Field) -> Option<Vec<u8>> {
    let repr = field.value.scalar_repr()?;
    Some(
        KeyBuilder::new()
            .version(version)
            .str(field.value.kind())
            .str(&field.name)
            .str(&repr)
            .finish(),
    )
}

pub(crate) fn decode_unique_log_column(name: &[u8]) -> Result<(Version, Field), StoreError> {
    let mut reader = KeyReader::new(name);
    let version = reader.version()?;
    let kind = reader.str()?;
    let field_name = reader.str()?;
    let repr = reader.str()?;
    reader.finish()?;
    let value = FieldValue::parse_scalar(&kind, &repr)?;
    Ok((version, Field::new(field_name, value).unique()))
}

#[cfg(test)]
#[path = "keys_tests.rs"]
mod tests;

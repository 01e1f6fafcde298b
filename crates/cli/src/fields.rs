// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing `name=value` and `name:kind=value` field arguments

use crate::error::KeelError;
use keel_core::{Field, FieldValue};

/// Parse one field argument; the kind defaults to `string`
pub fn parse_field(arg: &str, unique: bool) -> Result<Field, KeelError> {
    let (key, repr) = arg
        .split_once('=')
        .ok_or_else(|| KeelError::invalid_field(arg, "missing '='"))?;
    let (name, kind) = match key.split_once(':') {
        Some((name, kind)) => (name, kind),
        None => (key, "string"),
    };
    if name.is_empty() {
        return Err(KeelError::invalid_field(arg, "empty name"));
    }

    let value = FieldValue::parse_scalar(kind, repr)
        .map_err(|e| KeelError::invalid_field(arg, &e).with_source(e))?;
    let field = Field::new(name, value);
    Ok(if unique { field.unique() } else { field })
}

/// Parse plain and unique arguments together, later names replacing earlier ones
pub fn parse_fields(plain: &[String], unique: &[String]) -> Result<Vec<Field>, KeelError> {
    let plain = plain.iter().map(|arg| parse_field(arg, false));
    let unique = unique.iter().map(|arg| parse_field(arg, true));
    plain.chain(unique).collect()
}

#[cfg(test)]
#[path = "fields_tests.rs"]
mod tests;

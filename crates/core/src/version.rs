// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time-ordered entity versions
//!
//! A version is a UUIDv7: 48 bits of epoch milliseconds followed by a 12-bit
//! per-generator counter and 62 bits of node entropy. Byte order is time order,
//! so versions sort correctly as raw column keys.

use crate::clock::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::{Builder, Uuid};

const MAX_COUNTER: u16 = 0x0FFF;

/// One snapshot of an entity's state
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(Uuid);

impl Version {
    /// Lowest possible version; sorts before every minted version
    pub const MIN: Version = Version(Uuid::nil());
    /// Highest possible version; used for "latest" reads
    pub const MAX: Version = Version(Uuid::max());

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Wall-clock time embedded in the version, if it is time-based
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let (secs, nanos) = self.0.get_timestamp()?.to_unix();
        DateTime::from_timestamp(i64::try_from(secs).ok()?, nanos)
    }

    /// Smallest version strictly greater than this one
    pub fn successor(&self) -> Version {
        Version(Uuid::from_u128(self.0.as_u128().saturating_add(1)))
    }

    /// Largest version strictly smaller than this one
    pub fn predecessor(&self) -> Version {
        Version(Uuid::from_u128(self.0.as_u128().saturating_sub(1)))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Version {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Version)
    }
}

/// Mints new versions
pub trait VersionGen: Clone + Send + Sync + 'static {
    fn mint(&self) -> Version;
}

#[derive(Debug, Default)]
struct GenState {
    millis: u64,
    counter: u16,
}

/// Version generator backed by a clock
///
/// Versions from one generator are strictly increasing, even when the clock
/// stalls or steps backwards: the counter absorbs up to 4096 mints per
/// millisecond before borrowing the next millisecond.
#[derive(Clone)]
pub struct TimeVersionGen<C: Clock> {
    clock: C,
    node: [u8; 8],
    state: Arc<Mutex<GenState>>,
}

impl<C: Clock> TimeVersionGen<C> {
    pub fn new(clock: C) -> Self {
        let mut node = [0u8; 8];
        node.copy_from_slice(&Uuid::new_v4().as_bytes()[..8]);
        Self {
            clock,
            node,
            state: Arc::new(Mutex::new(GenState::default())),
        }
    }
}

impl<C: Clock> VersionGen for TimeVersionGen<C> {
    fn mint(&self) -> Version {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now_millis();

        let (millis, counter) = if now > state.millis {
            (now, 0)
        } else if state.counter < MAX_COUNTER {
            (state.millis, state.counter + 1)
        } else {
            (state.millis + 1, 0)
        };
        state.millis = millis;
        state.counter = counter;

        let mut bytes = [0u8; 10];
        bytes[..2].copy_from_slice(&counter.to_be_bytes());
        bytes[2..].copy_from_slice(&self.node);

        Version(Builder::from_unix_timestamp_millis(millis, &bytes).into_uuid())
    }
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;

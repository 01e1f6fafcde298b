// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use proptest::prelude::*;
use std::time::Duration;

#[test]
fn versions_increase_within_one_millisecond() {
    let gen = TimeVersionGen::new(FakeClock::new());
    let v1 = gen.mint();
    let v2 = gen.mint();
    let v3 = gen.mint();
    assert!(v1 < v2);
    assert!(v2 < v3);
}

#[test]
fn versions_increase_when_clock_steps_backwards() {
    let clock = FakeClock::at(10_000);
    let gen = TimeVersionGen::new(clock.clone());
    let v1 = gen.mint();
    clock.set(5_000);
    let v2 = gen.mint();
    assert!(v2 > v1);
}

#[test]
fn counter_overflow_borrows_next_millisecond() {
    let clock = FakeClock::at(10_000);
    let gen = TimeVersionGen::new(clock);
    let mut last = gen.mint();
    for _ in 0..5_000 {
        let next = gen.mint();
        assert!(next > last);
        last = next;
    }
    let ts = last.timestamp().unwrap();
    assert_eq!(ts.timestamp_millis(), 10_001);
}

#[test]
fn version_embeds_clock_time() {
    let clock = FakeClock::at(1_767_225_600_123);
    let gen = TimeVersionGen::new(clock);
    let v = gen.mint();
    assert_eq!(v.timestamp().unwrap().timestamp_millis(), 1_767_225_600_123);
    assert_eq!(v.as_uuid().get_version_num(), 7);
}

#[test]
fn min_and_max_bound_minted_versions() {
    let gen = TimeVersionGen::new(FakeClock::new());
    let v = gen.mint();
    assert!(Version::MIN < v);
    assert!(v < Version::MAX);
}

#[test]
fn successor_and_predecessor_are_adjacent() {
    let gen = TimeVersionGen::new(FakeClock::new());
    let v = gen.mint();
    assert!(v.successor() > v);
    assert!(v.predecessor() < v);
    assert_eq!(v.successor().predecessor(), v);
}

#[test]
fn version_parses_from_display() {
    let gen = TimeVersionGen::new(FakeClock::new());
    let v = gen.mint();
    let parsed: Version = v.to_string().parse().unwrap();
    assert_eq!(parsed, v);
}

proptest! {
    #[test]
    fn byte_order_matches_mint_order(steps in proptest::collection::vec(0u64..3, 1..200)) {
        let clock = FakeClock::new();
        let gen = TimeVersionGen::new(clock.clone());
        let mut last = gen.mint();
        for step in steps {
            clock.advance(Duration::from_millis(step));
            let next = gen.mint();
            prop_assert!(next > last);
            prop_assert!(next.as_bytes() > last.as_bytes());
            last = next;
        }
    }
}

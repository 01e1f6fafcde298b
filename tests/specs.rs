//! Behavioral specifications for the keel CLI.
//!
//! These tests are black-box: they invoke the CLI binary against a
//! temporary data directory and verify stdout, stderr, and exit codes.
//! They run the `keel` binary from `target/<profile>/`; `cargo test
//! --workspace` builds it, or run `cargo build -p keel` first.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

// entity/
#[path = "specs/entity/delete.rs"]
mod entity_delete;
#[path = "specs/entity/history.rs"]
mod entity_history;
#[path = "specs/entity/put_get.rs"]
mod entity_put_get;
#[path = "specs/entity/unique.rs"]
mod entity_unique;

// store/
#[path = "specs/store/durability.rs"]
mod store_durability;

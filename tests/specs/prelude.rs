//! Test helpers for behavioral specifications.
//!
//! Every `Project` owns a temporary data directory; commands built from it
//! run the `keel` binary against that directory only.

use assert_cmd::Command;
use std::path::{Path, PathBuf};

pub use predicates::prelude::*;

/// A temporary keel data directory
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the data directory
    pub fn file(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    /// A `keel` invocation bound to this data directory
    pub fn keel(&self) -> CliBuilder {
        CliBuilder {
            args: vec!["--data-dir".into(), self.dir.path().display().to_string()],
        }
    }

    /// Write an entity and return its `type:uuid` id
    pub fn put(&self, args: &[&str]) -> String {
        let out = self.keel().args(&["put"]).args(args).passes().stdout();
        let mut words = out.split_whitespace();
        assert_eq!(words.next(), Some("written"), "unexpected put output: {out}");
        words.next().unwrap().to_string()
    }
}

/// Path to the built `keel` binary.
///
/// This suite lives in the root package, which doesn't own the binary, so
/// cargo never sets `CARGO_BIN_EXE_keel` here. The binary sits next to the
/// test executable's `deps/` directory in `target/<profile>/`.
pub fn keel_bin() -> PathBuf {
    if let Some(path) = std::env::var_os("CARGO_BIN_EXE_keel") {
        return PathBuf::from(path);
    }
    let exe = std::env::current_exe().unwrap();
    let mut dir = exe.parent().unwrap();
    if dir.ends_with("deps") {
        dir = dir.parent().unwrap();
    }
    let bin = dir.join(format!("keel{}", std::env::consts::EXE_SUFFIX));
    assert!(
        bin.exists(),
        "keel binary not found at {}; build the workspace first (cargo build --workspace)",
        bin.display()
    );
    bin
}

pub struct CliBuilder {
    args: Vec<String>,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    fn run(self) -> std::process::Output {
        Command::new(keel_bin())
            .args(&self.args)
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    }

    /// Run and assert a zero exit code
    pub fn passes(self) -> RunAssert {
        let args = self.args.join(" ");
        let output = self.run();
        let run = RunAssert::new(output);
        assert!(
            run.success,
            "expected `keel {args}` to pass\nstdout:\n{}\nstderr:\n{}",
            run.stdout, run.stderr
        );
        run
    }

    /// Run and assert a non-zero exit code
    pub fn fails(self) -> RunAssert {
        let args = self.args.join(" ");
        let output = self.run();
        let run = RunAssert::new(output);
        assert!(
            !run.success,
            "expected `keel {args}` to fail\nstdout:\n{}",
            run.stdout
        );
        run
    }
}

pub struct RunAssert {
    success: bool,
    stdout: String,
    stderr: String,
}

impl RunAssert {
    fn new(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    pub fn stdout(&self) -> String {
        self.stdout.clone()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        assert!(
            predicate::str::contains(expected).eval(&self.stdout),
            "stdout missing {expected:?}:\n{}",
            self.stdout
        );
        self
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        assert!(
            !self.stdout.contains(unexpected),
            "stdout unexpectedly has {unexpected:?}:\n{}",
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        assert!(
            predicate::str::contains(expected).eval(&self.stderr),
            "stderr missing {expected:?}:\n{}",
            self.stderr
        );
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }
}

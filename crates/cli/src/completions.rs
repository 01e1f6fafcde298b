// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell completion generation for the keel CLI.
//!
//! ```bash
//! keel completions bash > ~/.local/share/bash-completion/completions/keel
//! keel completions zsh > ~/.zfunc/_keel
//! keel completions fish > ~/.config/fish/completions/keel.fish
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io::{self, Write};

/// Write shell completions for `C` to `out`.
pub fn generate_completions<C: CommandFactory>(shell: Shell, out: &mut dyn Write) {
    let mut cmd = C::command();
    generate(shell, &mut cmd, "keel", out);
}

/// Generate shell completions and write to stdout.
pub fn print_completions<C: CommandFactory>(shell: Shell) {
    generate_completions::<C>(shell, &mut io::stdout());
}

/// Arguments for the completions command.
#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

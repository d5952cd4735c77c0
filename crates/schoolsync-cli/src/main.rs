//! schoolsync CLI: the `schoolsync` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::Cli;

fn main() {
    let Cli {
        project,
        fix,
        dry_run: _,
        limit,
        store_root,
        config,
        json,
    } = Cli::parse();

    commands::migrate::run(commands::migrate::Args {
        project,
        fix,
        limit,
        store_root,
        config,
        json,
    });
}

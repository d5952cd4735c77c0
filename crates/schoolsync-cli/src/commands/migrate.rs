use crate::support::{credentials_from_env, emit_error, load_config, resolve_store_root};
use schoolsync_migrate::{RunMode, RunOptions, RunReport, cap_to_limit, run_migration};
use schoolsync_store::DirectoryStore;
use std::io;

pub struct Args {
    pub project: String,
    pub fix: bool,
    pub limit: usize,
    pub store_root: Option<String>,
    pub config: Option<String>,
    pub json: bool,
}

pub fn run(args: Args) {
    let credentials = credentials_from_env().unwrap_or_else(|e| emit_error(e));
    if let Some(warning) = credentials.project_mismatch(&args.project) {
        eprintln!("warning: {warning}");
    }

    let config = load_config(args.config.as_deref()).unwrap_or_else(|e| emit_error(e));
    let store_root = resolve_store_root(args.store_root, &config);
    let mut store =
        DirectoryStore::open(&store_root, &args.project).unwrap_or_else(|e| emit_error(e));

    let options = RunOptions {
        project: args.project,
        mode: RunMode::from_fix_flag(args.fix),
        limit: cap_to_limit(args.limit),
        collections: config.collections,
    };

    let result = if args.json {
        run_migration(&mut store, &options, &mut io::sink())
    } else {
        run_migration(&mut store, &options, &mut io::stdout().lock())
    };
    let report = result.unwrap_or_else(|e| emit_error(e));

    if args.json {
        print_json(&report);
    }
}

fn print_json(report: &RunReport) {
    let rendered = serde_json::to_string_pretty(report)
        .unwrap_or_else(|err| emit_error(format!("failed to render json output: {err}")));
    println!("{rendered}");
}

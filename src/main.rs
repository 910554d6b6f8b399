use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};

use srcfmt::{build_options, Args, ExternalCommand, Runner};

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    // stdout carries only the matched paths
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let opts = build_options(&args)?;
    info!(
        dir = %opts.working_directory.display(),
        roots = ?opts.roots,
        extensions = ?opts.extensions,
        formatter = %opts.formatter.program,
        "starting"
    );

    let formatter = ExternalCommand::new(opts.formatter.clone());
    let runner = Runner::new(opts, formatter);
    let counters = runner.run(&mut io::stdout().lock())?;

    info!(
        matched = counters.matched,
        changed = counters.changed,
        unchanged = counters.unchanged,
        failed = counters.failed,
        missing_roots = counters.missing_roots,
        walk_errors = counters.walk_errors,
        "done"
    );

    Ok(())
}

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use log::{debug, info};
use std::io::{BufWriter, Write};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use repo_sizer::cli::{reference_filter, Cli};
use repo_sizer::concern::ConcernScale;
use repo_sizer::report::{json_v1, json_v2, table_string, JsonVersion};
use repo_sizer::repository::{
    GitObjectSource, ProgressObserver, ProgressReporter, Scanner, VerboseProgress,
};
use repo_sizer::util::{format_count, format_size};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    // Matches are kept around: filter rules depend on their order.
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    debug!("Parsed CLI arguments: {cli:?}");

    let threshold = cli.threshold();
    let scale = ConcernScale::new(cli.severity_base)?;
    let filter = reference_filter(&matches)?;
    debug!("Reference filter: {} rules", filter.rules().len());

    let scanner = Scanner::new();
    let cancel = scanner.cancel_flag().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let observer = ProgressObserver::spawn(
        scanner.progress().clone(),
        VerboseProgress::new(cli.show_progress()).start("Processing objects"),
        PROGRESS_INTERVAL,
    );

    let start = Instant::now();
    let repo_path = cli.repo_path.clone();
    let names = cli.names.wants_names();
    let show_refs = cli.show_refs;
    info!("Scanning repository at {}", repo_path.display());

    let scan = tokio::task::spawn_blocking(move || -> Result<_> {
        let mut source = GitObjectSource::open(&repo_path, &filter)?.with_names(names);
        if show_refs {
            for r in source.reference_selection() {
                eprintln!("{} {}", if r.included { "+" } else { " " }, r.name);
            }
        }
        Ok(scanner.scan(&mut source)?)
    })
    .await
    .context("Scan task failed")?;

    let processed = observer.finish().await;
    let history = scan?;
    info!(
        "Processed {} objects ({} of blobs) in {:?}",
        format_count(processed),
        format_size(history.unique_blob_size.get()),
        start.elapsed()
    );

    let output = if cli.json {
        let mut json = match cli.json_version {
            JsonVersion::V1 => json_v1(&history, cli.names),
            JsonVersion::V2 => json_v2(&history, threshold, cli.names, &scale),
        }
        .context("Could not encode JSON")?;
        json.push('\n');
        json
    } else {
        table_string(&history, threshold, cli.names, &scale)
    };

    // stdout is line-buffered; batch the whole report into one write.
    let mut stdout = BufWriter::new(std::io::stdout());
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

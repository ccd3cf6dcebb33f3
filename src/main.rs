//! Main entry point for the rtik CLI

use anyhow::Context;
use clap::{CommandFactory, Parser};
use rtik::cli::args::{Args, VerbosityLevel};
use rtik::cli::output::{create_progress_callback, OutputFormatter};
use rtik::core::Downloader;
use rtik::platform::RequestThrottle;
use rtik::utils::url::{normalize_handle, normalize_video_link};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbosity_level());
    debug!("Starting rtik with args: {:?}", args);

    let mut formatter = OutputFormatter::new(args.verbosity_level());
    if !args.no_progress {
        formatter = formatter.with_progress_bar();
    }
    let formatter = Arc::new(formatter);

    // One throttle for the whole process, shared by every client built below
    let throttle = Arc::new(RequestThrottle::new(args.throttle_duration()));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let result = if args.targets.is_empty() {
        run_interactive(&throttle, &cancel, &formatter).await
    } else {
        run_targets(&args, &throttle, &cancel, &formatter).await
    };

    formatter.finish_progress();
    result
}

/// Process one parsed argument set
async fn run_targets(
    args: &Args,
    throttle: &Arc<RequestThrottle>,
    cancel: &CancellationToken,
    formatter: &Arc<OutputFormatter>,
) -> anyhow::Result<()> {
    let mut downloader = Downloader::with_options(args.download_options(), Arc::clone(throttle))
        .with_cancellation(cancel.clone());
    if !args.no_progress {
        downloader =
            downloader.with_progress_callback(create_progress_callback(Arc::clone(formatter)));
    }

    let mut failures = 0usize;

    if args.profile_mode() {
        for target in &args.targets {
            let handle = normalize_handle(target);
            formatter.print_profile_start(&handle);

            let start = Instant::now();
            match downloader.sync_profile(&handle).await {
                Ok(report) => {
                    formatter.print_profile_summary(&handle, &report, start.elapsed());
                }
                Err(e) if e.is_cancelled() => {
                    formatter.warning("Interrupted");
                    return Ok(());
                }
                Err(e) => {
                    formatter.error(&format!("{:#}", anyhow::Error::from(e)));
                    failures += 1;
                }
            }
        }
    } else {
        let dir = args.directory.clone().unwrap_or_else(|| PathBuf::from("."));
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("cannot create directory {}", dir.display()))?;

        for target in &args.targets {
            let link = match normalize_video_link(target) {
                Ok(link) => link,
                Err(e) => {
                    formatter.error(&format!("{:#}", anyhow::Error::from(e)));
                    failures += 1;
                    continue;
                }
            };

            match downloader.download_video(&link, &dir).await {
                Ok(filename) => formatter.print_video_saved(&filename),
                Err(e) if e.is_cancelled() => {
                    formatter.warning("Interrupted");
                    return Ok(());
                }
                Err(e) => {
                    formatter.error(&format!("{:#}", anyhow::Error::from(e)));
                    failures += 1;
                }
            }
        }
    }

    anyhow::ensure!(failures == 0, "{} target(s) failed", failures);
    Ok(())
}

/// Prompt loop reading argument lines from stdin
async fn run_interactive(
    throttle: &Arc<RequestThrottle>,
    cancel: &CancellationToken,
    formatter: &Arc<OutputFormatter>,
) -> anyhow::Result<()> {
    formatter.print_banner();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        formatter.print_prompt();

        let line = tokio::select! {
            line = lines.next_line() => line.context("cannot read from stdin")?,
            _ = cancel.cancelled() => {
                println!();
                break;
            }
        };
        let Some(line) = line else { break };

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            formatter.info("Nothing entered, exiting in 5 seconds...");
            tokio::time::sleep(Duration::from_secs(5)).await;
            break;
        }
        match words[0] {
            "exit" | "quit" => break,
            "help" => {
                let _ = Args::command().print_help();
                continue;
            }
            _ => {}
        }

        // Each line is a full argument list, flags included
        let line_args = match Args::try_parse_from(std::iter::once("rtik").chain(words)) {
            Ok(line_args) => line_args,
            Err(e) => {
                let _ = e.print();
                continue;
            }
        };
        if line_args.throttle.is_some() && line_args.throttle_duration() != throttle.interval() {
            formatter.warning("--throttle is fixed at launch; keeping the current interval");
        }

        if let Err(e) = run_targets(&line_args, throttle, cancel, formatter).await {
            formatter.error(&format!("{:#}", e));
        }
        if cancel.is_cancelled() {
            break;
        }
    }

    Ok(())
}

/// Initialize logging system
fn init_logging(verbosity: VerbosityLevel) {
    let default_filter = match verbosity {
        VerbosityLevel::Quiet => "rtik=error",
        VerbosityLevel::Normal => "rtik=warn",
        VerbosityLevel::Verbose => "rtik=debug",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}

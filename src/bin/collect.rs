//! Batch dataset collection: analyze a file of URLs and write the labeled
//! feature table used for model training.
//!
//! Usage:
//!   collect <urls-file> [--out dataset.csv] [--checkpoint progress.jsonl]
//!           [--workers N] [--delay-ms N] [--limit N] [--axe path] [--validate]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use guidepost::{
    collect_dataset, is_navigable_url, normalize_url, write_dataset_csv, AxeSource, CollectOptions,
};

struct CollectArgs {
    urls_file: PathBuf,
    out: PathBuf,
    checkpoint: PathBuf,
    limit: Option<usize>,
    validate: bool,
    options: CollectOptions,
}

fn parse_args(args: &[String]) -> Result<CollectArgs, String> {
    let mut urls_file = None;
    let mut out = PathBuf::from("dataset.csv");
    let mut checkpoint = PathBuf::from("collect_progress.jsonl");
    let mut limit = None;
    let mut validate = false;
    let mut options = CollectOptions::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value_for = |flag: &str| {
            iter.next()
                .map(|value| value.to_string())
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match arg.as_str() {
            "--out" => out = PathBuf::from(value_for("--out")?),
            "--checkpoint" => checkpoint = PathBuf::from(value_for("--checkpoint")?),
            "--workers" => {
                options.workers = value_for("--workers")?
                    .parse()
                    .map_err(|_| "--workers expects a number".to_string())?
            }
            "--delay-ms" => {
                let ms: u64 = value_for("--delay-ms")?
                    .parse()
                    .map_err(|_| "--delay-ms expects milliseconds".to_string())?;
                options.request_delay = Duration::from_millis(ms);
            }
            "--limit" => {
                limit = Some(
                    value_for("--limit")?
                        .parse()
                        .map_err(|_| "--limit expects a number".to_string())?,
                )
            }
            "--axe" => {
                options.audit.axe_source = AxeSource::Path(PathBuf::from(value_for("--axe")?))
            }
            "--validate" => validate = true,
            other if other.starts_with("--") => return Err(format!("unknown flag {other}")),
            other => {
                if urls_file.is_some() {
                    return Err(format!("unexpected argument {other}"));
                }
                urls_file = Some(PathBuf::from(other));
            }
        }
    }

    Ok(CollectArgs {
        urls_file: urls_file.ok_or_else(|| "missing <urls-file> argument".to_string())?,
        out,
        checkpoint,
        limit,
        validate,
        options,
    })
}

fn run(args: CollectArgs) -> Result<(), String> {
    let raw = std::fs::read_to_string(&args.urls_file)
        .map_err(|err| format!("cannot read {}: {err}", args.urls_file.display()))?;
    let mut urls: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(normalize_url)
        .collect();
    if let Some(limit) = args.limit {
        urls.truncate(limit);
    }
    if args.validate {
        let before = urls.len();
        urls.retain(|url| is_navigable_url(url, args.options.fetch_timeout));
        log::info!("url validation kept {}/{before}", urls.len());
    }
    if urls.is_empty() {
        return Err("no urls to analyze".to_string());
    }

    let rows = collect_dataset(&urls, &args.checkpoint, &args.options)
        .map_err(|err| err.to_string())?;
    write_dataset_csv(&rows, &args.out).map_err(|err| err.to_string())?;
    println!(
        "dataset written: {} rows of {} urls -> {}",
        rows.len(),
        urls.len(),
        args.out.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let parsed = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!(
                "usage: collect <urls-file> [--out file] [--checkpoint file] [--workers N] [--delay-ms N] [--limit N] [--axe path] [--validate]"
            );
            return ExitCode::from(2);
        }
    };
    match run(parsed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

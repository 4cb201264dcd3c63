use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use rayon::prelude::*;

use guidepost_feature_contract as contract;

use crate::audit::{run_audit, AuditOptions};
use crate::checkpoint::{completed_urls, CheckpointEntry, CheckpointLog, CheckpointStatus};
use crate::error::GuidepostError;
use crate::features::{extract_features, FeatureRecord};
use crate::fetch::fetch_page;

#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Bounded worker count; every worker holds a browser engine while it
    /// audits, so this stays small.
    pub workers: usize,
    /// Fixed pause after each analyzed URL, per worker. Remote hosts block
    /// unpaced crawlers.
    pub request_delay: Duration,
    pub fetch_timeout: Duration,
    pub audit: AuditOptions,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            request_delay: Duration::from_millis(500),
            fetch_timeout: Duration::from_secs(10),
            audit: AuditOptions::default(),
        }
    }
}

/// One dataset row: audited label plus the static feature record.
#[derive(Debug, Clone)]
pub struct DatasetRow {
    pub url: String,
    pub label_score: i32,
    pub features: FeatureRecord,
}

/// Analyze a URL list into labeled rows. URLs already present in the
/// checkpoint are skipped and their completed rows are replayed from it, so
/// an interrupted batch resumes where it stopped. Per-URL failures (fetch
/// errors, audit sentinel) discard that row and continue; they are never
/// fatal to the batch.
pub fn collect_dataset(
    urls: &[String],
    checkpoint_path: &Path,
    options: &CollectOptions,
) -> Result<Vec<DatasetRow>, GuidepostError> {
    if options.workers == 0 {
        return Err(GuidepostError::InvalidConfiguration(
            "collect requires at least one worker".to_string(),
        ));
    }

    let history = CheckpointLog::load(checkpoint_path)?;
    let handled = completed_urls(&history);
    let mut rows: Vec<DatasetRow> = history
        .into_iter()
        .filter(|entry| entry.status == CheckpointStatus::Done)
        .filter_map(|entry| {
            Some(DatasetRow {
                url: entry.url,
                label_score: entry.label_score?,
                features: entry.features?,
            })
        })
        .collect();

    let pending: Vec<&String> = urls.iter().filter(|url| !handled.contains(*url)).collect();
    log::info!(
        "collecting {} urls ({} replayed from checkpoint)",
        pending.len(),
        rows.len()
    );

    let logbook = CheckpointLog::open(checkpoint_path)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()
        .map_err(|err| GuidepostError::InvalidConfiguration(format!("worker pool: {err}")))?;

    let collected: Vec<DatasetRow> = pool.install(|| {
        pending
            .par_iter()
            .filter_map(|url| {
                let row = analyze_for_dataset(url, options, &logbook);
                std::thread::sleep(options.request_delay);
                row
            })
            .collect()
    });

    rows.extend(collected);
    Ok(rows)
}

fn analyze_for_dataset(
    url: &str,
    options: &CollectOptions,
    logbook: &CheckpointLog,
) -> Option<DatasetRow> {
    let discard = |reason: &str| {
        log::warn!("discarding {url}: {reason}");
        logbook.append(&CheckpointEntry {
            url: url.to_string(),
            status: CheckpointStatus::Discarded,
            label_score: None,
            features: None,
        });
        None
    };

    let page = match fetch_page(url, options.fetch_timeout) {
        Ok(page) => page,
        Err(err) => return discard(&err.to_string()),
    };
    let mut features = extract_features(&page);

    let outcome = run_audit(url, &options.audit);
    if outcome.is_failure() {
        return discard("dynamic audit sentinel");
    }
    features.contrast_failures = outcome.contrast_failures as u32;

    logbook.append(&CheckpointEntry {
        url: url.to_string(),
        status: CheckpointStatus::Done,
        label_score: Some(outcome.score),
        features: Some(features.clone()),
    });
    log::info!("collected {url}: label {}", outcome.score);
    Some(DatasetRow {
        url: url.to_string(),
        label_score: outcome.score,
        features,
    })
}

/// Write rows as the tabular dataset file: url, label, every canonical
/// feature in schema order, then the nested layout serialized into one
/// `layout_json` text column.
pub fn write_dataset_csv(rows: &[DatasetRow], path: &Path) -> Result<(), GuidepostError> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);

    let header: Vec<String> = contract::dataset_columns()
        .iter()
        .map(|column| csv_field(column))
        .collect();
    writeln!(writer, "{}", header.join(","))?;

    for row in rows {
        let mut fields = Vec::with_capacity(contract::FEATURE_COUNT + 3);
        fields.push(csv_field(&row.url));
        fields.push(row.label_score.to_string());
        for name in contract::FEATURE_SCHEMA {
            fields.push(numeric_field(row.features.value(name).unwrap_or(0.0)));
        }
        let layout_json = serde_json::to_string(&row.features.layout)
            .map_err(|err| GuidepostError::Io(std::io::Error::other(err)))?;
        fields.push(csv_field(&layout_json));
        writeln!(writer, "{}", fields.join(","))?;
    }
    writer.flush()?;
    Ok(())
}

fn numeric_field(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Quote a field when it carries a separator, quote or newline; embedded
/// quotes are doubled.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        let mut out = String::with_capacity(raw.len() + 2);
        out.push('"');
        for ch in raw.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
        out
    } else {
        raw.to_string()
    }
}

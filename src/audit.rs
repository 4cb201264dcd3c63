use std::path::PathBuf;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions};
use serde::Deserialize;

use crate::error::GuidepostError;

/// Axe rule id whose affected nodes feed `falhas_contraste`.
const CONTRAST_RULE_ID: &str = "color-contrast";

/// Each violation subtracts five points from a perfect page.
const VIOLATION_PENALTY: i32 = 5;

/// Runs after the audit script is injected; resolves to a compact JSON
/// summary so only rule ids and node counts cross the protocol boundary.
const AXE_RUN_EXPRESSION: &str = "\
axe.run(document, { resultTypes: ['violations'] }).then(results => JSON.stringify({\
 violations: results.violations.map(v => ({ id: v.id, nodes: v.nodes.length }))\
 }))";

/// Result of one dynamic audit. `FAILED` is the reserved sentinel meaning
/// "discard this sample": it is returned for every rendering, injection or
/// timeout problem, never a partial score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditOutcome {
    pub score: i32,
    pub contrast_failures: i32,
}

impl AuditOutcome {
    pub const FAILED: AuditOutcome = AuditOutcome {
        score: -1,
        contrast_failures: -1,
    };

    pub fn is_failure(&self) -> bool {
        self.score < 0
    }
}

/// Where the third-party audit script comes from. The crate does not vendor
/// axe-core; deployments point at their own copy.
#[derive(Debug, Clone)]
pub enum AxeSource {
    Path(PathBuf),
    Inline(String),
}

impl AxeSource {
    fn load(&self) -> Result<String, GuidepostError> {
        match self {
            AxeSource::Path(path) => std::fs::read_to_string(path).map_err(|err| {
                GuidepostError::Audit(format!("cannot read audit script {}: {err}", path.display()))
            }),
            AxeSource::Inline(source) => Ok(source.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub axe_source: AxeSource,
    /// Hard upper bound covering navigation, DOM readiness and the audit
    /// run; the invocation is abandoned past it.
    pub timeout: Duration,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            axe_source: AxeSource::Path(PathBuf::from("assets/axe.min.js")),
            timeout: Duration::from_secs(180),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AxeResults {
    #[serde(default)]
    violations: Vec<AxeViolation>,
}

#[derive(Debug, Deserialize)]
struct AxeViolation {
    id: String,
    #[serde(default)]
    nodes: u32,
}

/// Render `url` in a headless browser, run the audit script and derive the
/// (score, contrast failure) pair. One retry on a timeout-shaped failure;
/// any other failure, and a second timeout, surface the sentinel. The
/// browser handle lives inside the attempt, so the engine is torn down on
/// every path.
pub fn run_audit(url: &str, options: &AuditOptions) -> AuditOutcome {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match audit_once(url, options) {
            Ok(outcome) => {
                log::debug!(
                    "dynamic audit for {url}: score {} with {} contrast failures",
                    outcome.score,
                    outcome.contrast_failures
                );
                return outcome;
            }
            Err(err) => {
                log::warn!("dynamic audit failed for {url} (attempt {attempt}): {err}");
                if attempt == 1 && is_timeout_shaped(&err) {
                    continue;
                }
                return AuditOutcome::FAILED;
            }
        }
    }
}

fn audit_once(url: &str, options: &AuditOptions) -> Result<AuditOutcome, GuidepostError> {
    // Read the script before touching the browser: a misconfigured script
    // path should not cost an engine launch per attempt.
    let axe_source = options.axe_source.load()?;

    let launch = LaunchOptions::default_builder()
        .headless(true)
        .idle_browser_timeout(options.timeout)
        .build()
        .map_err(|err| GuidepostError::Audit(format!("browser launch options: {err}")))?;
    let browser =
        Browser::new(launch).map_err(|err| GuidepostError::Audit(format!("browser launch: {err}")))?;
    let tab = browser
        .new_tab()
        .map_err(|err| GuidepostError::Audit(format!("tab open: {err}")))?;
    tab.set_default_timeout(options.timeout);

    tab.navigate_to(url)
        .map_err(|err| GuidepostError::Audit(format!("navigation: {err}")))?;
    tab.wait_until_navigated()
        .map_err(|err| GuidepostError::Audit(format!("navigation wait: {err}")))?;

    tab.evaluate(&axe_source, false)
        .map_err(|err| GuidepostError::Audit(format!("audit script injection: {err}")))?;
    let evaluated = tab
        .evaluate(AXE_RUN_EXPRESSION, true)
        .map_err(|err| GuidepostError::Audit(format!("audit run: {err}")))?;

    let value = evaluated
        .value
        .ok_or_else(|| GuidepostError::Audit("audit run returned no value".to_string()))?;
    let summary = value
        .as_str()
        .ok_or_else(|| GuidepostError::Audit(format!("audit run returned non-string: {value}")))?;
    decode_audit_summary(summary)
}

fn decode_audit_summary(summary: &str) -> Result<AuditOutcome, GuidepostError> {
    let results: AxeResults = serde_json::from_str(summary)
        .map_err(|err| GuidepostError::Audit(format!("audit summary decode: {err}")))?;
    Ok(AuditOutcome {
        score: score_from_violations(results.violations.len()),
        contrast_failures: contrast_failures(&results.violations),
    })
}

fn score_from_violations(count: usize) -> i32 {
    (100 - VIOLATION_PENALTY * count as i32).max(0)
}

fn contrast_failures(violations: &[AxeViolation]) -> i32 {
    violations
        .iter()
        .filter(|violation| violation.id == CONTRAST_RULE_ID)
        .map(|violation| violation.nodes as i32)
        .sum()
}

fn is_timeout_shaped(err: &GuidepostError) -> bool {
    let text = err.to_string().to_ascii_lowercase();
    text.contains("timed out") || text.contains("timeout")
}

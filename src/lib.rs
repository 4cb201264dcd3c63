mod audit;
mod checkpoint;
mod dataset;
mod error;
mod features;
mod fetch;
mod guide;
mod layout;
mod messages;
mod page;
mod predict;

pub use audit::{run_audit, AuditOptions, AuditOutcome, AxeSource};
pub use checkpoint::{completed_urls, CheckpointEntry, CheckpointLog, CheckpointStatus};
pub use dataset::{collect_dataset, write_dataset_csv, CollectOptions, DatasetRow};
pub use error::GuidepostError;
pub use features::{extract_features, FeatureRecord, GENERIC_LINK_PHRASES};
pub use fetch::{fetch_page, is_navigable_url, normalize_url};
pub use guide::compose_guide;
pub use layout::{detect_layout, LayoutInfo, Region};
pub use messages::{Locale, MessageId, Plural};
pub use page::PageStructure;
pub use predict::{LayerParams, ModelArtifact, ScalerParams, ScorePredictor};

use std::path::PathBuf;
use std::time::Duration;

/// Analysis strategies in the order they are tried. Complete adds the
/// dynamic audit (slow, browser-backed); Quick is static extraction only,
/// with `falhas_contraste` approximated as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Complete,
    Quick,
}

/// Everything the presentation layer needs for one page.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub url: String,
    pub features: FeatureRecord,
    pub score: u8,
    pub guide: String,
    pub mode: AnalysisMode,
}

/// Page analyzer: fetches, extracts, predicts and narrates. Configure
/// through [`GuidepostBuilder`]; the predictor artifact is validated when
/// the analyzer is built, never lazily.
pub struct Guidepost {
    predictor: ScorePredictor,
    locale: Locale,
    fetch_timeout: Duration,
    audit: Option<AuditOptions>,
    strategies: Vec<AnalysisMode>,
}

#[derive(Debug, Clone, Default)]
pub struct GuidepostBuilder {
    model_path: Option<PathBuf>,
    model_bytes: Option<Vec<u8>>,
    locale: Locale,
    fetch_timeout: Option<Duration>,
    audit: Option<AuditOptions>,
}

impl GuidepostBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    pub fn with_model_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.model_bytes = Some(bytes);
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Enable the complete strategy. Without this the analyzer only runs
    /// static analysis.
    pub fn with_audit(mut self, options: AuditOptions) -> Self {
        self.audit = Some(options);
        self
    }

    pub fn build(self) -> Result<Guidepost, GuidepostError> {
        let predictor = match (self.model_bytes, self.model_path) {
            (Some(bytes), _) => ScorePredictor::from_bytes(&bytes)?,
            (None, Some(path)) => ScorePredictor::from_path(&path)?,
            (None, None) => {
                return Err(GuidepostError::InvalidConfiguration(
                    "a model artifact is required; set with_model_path or with_model_bytes"
                        .to_string(),
                ))
            }
        };
        let strategies = if self.audit.is_some() {
            vec![AnalysisMode::Complete, AnalysisMode::Quick]
        } else {
            vec![AnalysisMode::Quick]
        };
        Ok(Guidepost {
            predictor,
            locale: self.locale,
            fetch_timeout: self.fetch_timeout.unwrap_or(Duration::from_secs(10)),
            audit: self.audit,
            strategies,
        })
    }
}

impl Guidepost {
    pub fn builder() -> GuidepostBuilder {
        GuidepostBuilder::new()
    }

    pub fn strategies(&self) -> &[AnalysisMode] {
        &self.strategies
    }

    /// Analyze a URL, trying each strategy in order and taking the first
    /// that produces a record. When every strategy comes back empty the
    /// result is an explicit error: a page that could not be analyzed must
    /// never read as a page without problems.
    pub fn analyze_url(&self, url: &str) -> Result<AnalysisReport, GuidepostError> {
        for mode in &self.strategies {
            if let Some(report) = self.try_strategy(*mode, url) {
                return Ok(report);
            }
            log::info!("{mode:?} analysis unavailable for {url}, trying next strategy");
        }
        Err(GuidepostError::AnalysisFailed {
            url: url.to_string(),
        })
    }

    /// Analyze an already-parsed structure (no network, no audit).
    pub fn analyze_structure(&self, page: &PageStructure, url: &str) -> AnalysisReport {
        let features = extract_features(page);
        self.report_for(url, features, AnalysisMode::Quick)
    }

    fn try_strategy(&self, mode: AnalysisMode, url: &str) -> Option<AnalysisReport> {
        match mode {
            AnalysisMode::Complete => {
                let audit_options = self.audit.as_ref()?;
                let outcome = run_audit(url, audit_options);
                if outcome.is_failure() {
                    return None;
                }
                let page = match fetch_page(url, self.fetch_timeout) {
                    Ok(page) => page,
                    Err(err) => {
                        log::warn!("{err}");
                        return None;
                    }
                };
                let mut features = extract_features(&page);
                features.contrast_failures = outcome.contrast_failures as u32;
                Some(self.report_for(url, features, AnalysisMode::Complete))
            }
            AnalysisMode::Quick => {
                let page = match fetch_page(url, self.fetch_timeout) {
                    Ok(page) => page,
                    Err(err) => {
                        log::warn!("{err}");
                        return None;
                    }
                };
                let features = extract_features(&page);
                Some(self.report_for(url, features, AnalysisMode::Quick))
            }
        }
    }

    fn report_for(&self, url: &str, features: FeatureRecord, mode: AnalysisMode) -> AnalysisReport {
        let score = self.predictor.predict(&features);
        let guide = compose_guide(&features, score, url, self.locale);
        AnalysisReport {
            url: url.to_string(),
            features,
            score,
            guide,
            mode,
        }
    }
}

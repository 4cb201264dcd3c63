use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::error::GuidepostError;
use crate::page::PageStructure;

/// Browser-like identity; bare library user agents get blocked by enough
/// hosts to skew a batch.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Hosts matching these fragments serve assets, not navigable pages.
const CDN_HOST_PATTERN: &str =
    r"\.(cdn|cloudfront|akamai|edgekey|edgesuite|msedge|akamaiedge|fastly|fbcdn|azurefd|aws)\.";

fn cdn_host_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(CDN_HOST_PATTERN).expect("static cdn pattern"))
}

/// Prefix a bare domain with https; URLs users type rarely carry a scheme.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

pub fn has_supported_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

pub fn host_of(url: &str) -> &str {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let authority = stripped.split('/').next().unwrap_or("");
    let host = authority.rsplit('@').next().unwrap_or(authority);
    host.split(':').next().unwrap_or(host)
}

pub fn is_cdn_host(url: &str) -> bool {
    cdn_host_regex().is_match(host_of(url))
}

/// Download and parse a page. Transport failures and non-success statuses
/// map to a fetch error (the input-unreachable taxonomy); callers fall
/// back to other strategies or report an explicit failure.
pub fn fetch_page(url: &str, timeout: Duration) -> Result<PageStructure, GuidepostError> {
    if !has_supported_scheme(url) {
        return Err(GuidepostError::Fetch {
            url: url.to_string(),
            message: "unsupported scheme".to_string(),
        });
    }
    let agent = ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build();
    let response = agent.get(url).call().map_err(|err| GuidepostError::Fetch {
        url: url.to_string(),
        message: err.to_string(),
    })?;
    let body = response.into_string().map_err(|err| GuidepostError::Fetch {
        url: url.to_string(),
        message: format!("body read: {err}"),
    })?;
    Ok(PageStructure::parse(&body))
}

/// True when the URL looks worth analyzing: http(s) scheme, not a CDN-like
/// host, and a HEAD probe answering success with an HTML content type.
/// Validation problems are logged and treated as "not navigable", never as
/// errors.
pub fn is_navigable_url(url: &str, timeout: Duration) -> bool {
    if !has_supported_scheme(url) {
        log::warn!("skipping {url}: unsupported scheme");
        return false;
    }
    if is_cdn_host(url) {
        log::info!("skipping {url}: CDN-like host");
        return false;
    }
    let agent = ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build();
    match agent.head(url).call() {
        Ok(response) => {
            let content_type = response.content_type().to_ascii_lowercase();
            if content_type.contains("text/html") {
                true
            } else {
                log::info!("skipping {url}: content type {content_type}");
                false
            }
        }
        Err(err) => {
            log::info!("skipping {url}: {err}");
            false
        }
    }
}

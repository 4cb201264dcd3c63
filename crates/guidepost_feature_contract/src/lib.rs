use sha2::{Digest, Sha256};
use std::sync::OnceLock;

pub const CONTRACT_ID: &str = "guidepost.feature_contract";
pub const CONTRACT_VERSION: &str = "1";

/// Canonical ordered feature schema. Persisted artifacts (model files,
/// dataset columns) are bound to these names in this exact order; a
/// predictor that disagrees must refuse to serve.
pub const FEATURE_SCHEMA: [&str; 8] = [
    "imagens_sem_alt",
    "pct_links_genericos",
    "lang_presente",
    "erros_hierarquia",
    "inputs_sem_label",
    "aria_presente",
    "videos_sem_captions",
    "falhas_contraste",
];

pub const FEATURE_COUNT: usize = FEATURE_SCHEMA.len();

/// Features stored on a heavy-tailed scale; predictors apply ln(1+x)
/// before scaling.
pub const SKEW_FEATURES: [&str; 3] = ["falhas_contraste", "imagens_sem_alt", "videos_sem_captions"];

// Dataset column contract: url, label, features in schema order, then the
// nested layout serialized to a single text column.
pub const URL_COLUMN: &str = "url";
pub const LABEL_COLUMN: &str = "label_score_acessibilidade";
pub const LAYOUT_COLUMN: &str = "layout_json";

/// Layout keys a collector may serialize into LAYOUT_COLUMN. Absence of a
/// key means the region was not detected; it is never written as zero.
pub const LAYOUT_KEYS: [&str; 8] = [
    "header_presente",
    "nav_itens",
    "carousel_imagens",
    "carousel_sem_alt",
    "main_presente",
    "form_campos",
    "form_rotulados",
    "footer_presente",
];

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_SCHEMA.iter().position(|entry| *entry == name)
}

pub fn is_skew_feature(name: &str) -> bool {
    SKEW_FEATURES.iter().any(|entry| *entry == name)
}

/// True iff `names` is exactly the canonical schema: same count, same
/// names, same order.
pub fn schema_matches(names: &[String]) -> bool {
    names.len() == FEATURE_COUNT
        && names
            .iter()
            .zip(FEATURE_SCHEMA.iter())
            .all(|(found, expected)| found == expected)
}

/// Ordered column list for the tabular dataset file.
pub fn dataset_columns() -> Vec<&'static str> {
    let mut columns = Vec::with_capacity(FEATURE_COUNT + 3);
    columns.push(URL_COLUMN);
    columns.push(LABEL_COLUMN);
    columns.extend(FEATURE_SCHEMA.iter().copied());
    columns.push(LAYOUT_COLUMN);
    columns
}

fn sha256_hex(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Fingerprint of the contract text (id, version, schema order). Stable for
/// a given contract version; logged by loaders so artifact provenance can
/// be traced.
pub fn contract_fingerprint() -> &'static str {
    static FINGERPRINT: OnceLock<String> = OnceLock::new();
    FINGERPRINT.get_or_init(|| {
        let mut payload = String::new();
        payload.push_str(CONTRACT_ID);
        payload.push('\n');
        payload.push_str(CONTRACT_VERSION);
        payload.push('\n');
        for name in FEATURE_SCHEMA {
            payload.push_str(name);
            payload.push('\n');
        }
        sha256_hex(payload.as_bytes())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_order_is_the_contract() {
        assert_eq!(FEATURE_COUNT, 8);
        assert_eq!(feature_index("imagens_sem_alt"), Some(0));
        assert_eq!(feature_index("falhas_contraste"), Some(7));
        assert_eq!(feature_index("layout"), None);
    }

    #[test]
    fn schema_matches_requires_exact_order() {
        let exact: Vec<String> = FEATURE_SCHEMA.iter().map(|s| s.to_string()).collect();
        assert!(schema_matches(&exact));

        let mut swapped = exact.clone();
        swapped.swap(0, 1);
        assert!(!schema_matches(&swapped), "permuted schema must not match");

        let truncated = exact[..FEATURE_COUNT - 1].to_vec();
        assert!(!schema_matches(&truncated), "short schema must not match");
    }

    #[test]
    fn dataset_columns_wrap_schema() {
        let columns = dataset_columns();
        assert_eq!(columns.first(), Some(&URL_COLUMN));
        assert_eq!(columns.get(1), Some(&LABEL_COLUMN));
        assert_eq!(columns.last(), Some(&LAYOUT_COLUMN));
        assert_eq!(columns.len(), FEATURE_COUNT + 3);
    }

    #[test]
    fn fingerprint_is_stable_within_a_version() {
        let first = contract_fingerprint();
        let second = contract_fingerprint();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64, "expected hex sha256, got {first}");
    }

    #[test]
    fn skew_features_are_schema_members() {
        for name in SKEW_FEATURES {
            assert!(
                feature_index(name).is_some(),
                "skew feature {name} missing from schema"
            );
        }
    }
}

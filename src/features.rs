use std::collections::HashSet;

use kuchiki::NodeRef;
use serde::{Deserialize, Serialize};

use crate::layout::{detect_layout, LayoutInfo};
use crate::page::{element_name, has_attr, trimmed_attr, PageStructure};

/// Anchor texts that carry no page-specific meaning. Compared against
/// trimmed, case-folded link text; exact match only.
pub const GENERIC_LINK_PHRASES: [&str; 6] = [
    "clique aqui",
    "saiba mais",
    "leia mais",
    "aqui",
    "click here",
    "veja mais",
];

/// Fixed-schema accessibility summary of one page. Serialized field names
/// are the persisted contract names used by model artifacts and dataset
/// columns; every numeric key is always present (zero when the page lacks
/// the structure), while layout keys exist only for detected regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "imagens_sem_alt")]
    pub images_missing_alt: u32,
    #[serde(rename = "pct_links_genericos")]
    pub generic_link_pct: f64,
    #[serde(rename = "lang_presente")]
    pub lang_declared: u8,
    #[serde(rename = "erros_hierarquia")]
    pub heading_skips: u32,
    #[serde(rename = "inputs_sem_label")]
    pub unlabeled_fields: u32,
    #[serde(rename = "aria_presente")]
    pub aria_present: u8,
    #[serde(rename = "videos_sem_captions")]
    pub videos_missing_captions: u32,
    #[serde(rename = "falhas_contraste")]
    pub contrast_failures: u32,
    pub layout: LayoutInfo,
}

impl FeatureRecord {
    /// Numeric value by canonical schema name. `None` for unknown names and
    /// for the non-numeric layout sub-record; predictors assemble their
    /// input vector through this accessor.
    pub fn value(&self, name: &str) -> Option<f64> {
        match name {
            "imagens_sem_alt" => Some(f64::from(self.images_missing_alt)),
            "pct_links_genericos" => Some(self.generic_link_pct),
            "lang_presente" => Some(f64::from(self.lang_declared)),
            "erros_hierarquia" => Some(f64::from(self.heading_skips)),
            "inputs_sem_label" => Some(f64::from(self.unlabeled_fields)),
            "aria_presente" => Some(f64::from(self.aria_present)),
            "videos_sem_captions" => Some(f64::from(self.videos_missing_captions)),
            "falhas_contraste" => Some(f64::from(self.contrast_failures)),
            _ => None,
        }
    }
}

/// Extract the complete feature record from a parsed page. Pure over the
/// tree; malformed or partial structures degrade to zero counts, never to
/// errors. `falhas_contraste` is always 0 here; only the dynamic audit
/// can measure contrast, and the caller overwrites the field when audit
/// data exists.
pub fn extract_features(page: &PageStructure) -> FeatureRecord {
    let unlabeled_fields = count_unlabeled_fields(page);
    FeatureRecord {
        images_missing_alt: count_images_missing_alt(page),
        generic_link_pct: generic_link_percentage(page),
        lang_declared: lang_declared(page),
        heading_skips: count_heading_skips(page),
        unlabeled_fields,
        aria_present: aria_present(page),
        videos_missing_captions: count_videos_missing_captions(page),
        contrast_failures: 0,
        layout: detect_layout(page, unlabeled_fields),
    }
}

fn elements_named<'a>(
    page: &'a PageStructure,
    tag: &'a str,
) -> impl Iterator<Item = NodeRef> + 'a {
    page.elements()
        .filter(move |node| element_name(node).as_deref() == Some(tag))
}

fn count_images_missing_alt(page: &PageStructure) -> u32 {
    elements_named(page, "img")
        .filter(|img| trimmed_attr(img, "alt").map(|alt| alt.is_empty()).unwrap_or(true))
        .count() as u32
}

fn generic_link_percentage(page: &PageStructure) -> f64 {
    let mut total = 0u32;
    let mut generic = 0u32;
    for anchor in elements_named(page, "a") {
        total += 1;
        let text = anchor.text_contents().trim().to_lowercase();
        if GENERIC_LINK_PHRASES.iter().any(|phrase| *phrase == text) {
            generic += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    f64::from(generic) / f64::from(total) * 100.0
}

fn lang_declared(page: &PageStructure) -> u8 {
    let declared = page
        .root_element()
        .and_then(|root| trimmed_attr(&root, "lang"))
        .map(|lang| !lang.is_empty())
        .unwrap_or(false);
    u8::from(declared)
}

fn heading_level(name: &str) -> Option<u32> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Jumps of more than one level between consecutive headings break the
/// document outline screen readers navigate by. Decreases and single-step
/// increases are fine.
fn count_heading_skips(page: &PageStructure) -> u32 {
    let levels: Vec<u32> = page
        .elements()
        .filter_map(|node| element_name(&node).and_then(|name| heading_level(&name)))
        .collect();
    levels
        .windows(2)
        .filter(|pair| pair[1] > pair[0] + 1)
        .count() as u32
}

/// A field counts as unlabeled when it has no id at all, or no label's
/// `for` points at its id. Hidden and submit inputs are skipped: neither
/// takes user text.
fn count_unlabeled_fields(page: &PageStructure) -> u32 {
    let label_targets: HashSet<String> = elements_named(page, "label")
        .filter_map(|label| trimmed_attr(&label, "for"))
        .filter(|target| !target.is_empty())
        .collect();

    let mut unlabeled = 0u32;
    for tag in ["input", "select", "textarea"] {
        for field in elements_named(page, tag) {
            let field_type = trimmed_attr(&field, "type").unwrap_or_default();
            if field_type == "hidden" || field_type == "submit" {
                continue;
            }
            let labeled = trimmed_attr(&field, "id")
                .filter(|id| !id.is_empty())
                .map(|id| label_targets.contains(&id))
                .unwrap_or(false);
            if !labeled {
                unlabeled += 1;
            }
        }
    }
    unlabeled
}

fn aria_present(page: &PageStructure) -> u8 {
    u8::from(page.elements().any(|node| has_attr(&node, "role")))
}

fn count_videos_missing_captions(page: &PageStructure) -> u32 {
    elements_named(page, "video")
        .filter(|video| {
            let has_captions = video
                .descendants()
                .filter(|node| element_name(node).as_deref() == Some("track"))
                .any(|track| trimmed_attr(&track, "kind").as_deref() == Some("captions"));
            !has_captions
        })
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features_for(html: &str) -> FeatureRecord {
        extract_features(&PageStructure::parse(html))
    }

    #[test]
    fn images_missing_alt_counts_absent_and_blank() {
        let features = features_for(
            r#"<html><body>
                <img src="a.png" alt="described">
                <img src="b.png" alt="">
                <img src="c.png" alt="   ">
                <img src="d.png">
            </body></html>"#,
        );
        assert_eq!(features.images_missing_alt, 3);
    }

    #[test]
    fn generic_link_percentage_has_no_division_by_zero() {
        let features = features_for("<html><body><p>no links here</p></body></html>");
        assert_eq!(features.generic_link_pct, 0.0);
    }

    #[test]
    fn generic_links_match_trimmed_case_folded_text() {
        let features = features_for(
            r#"<html><body>
                <a href="/a">  Clique AQUI </a>
                <a href="/b">detailed report</a>
                <a href="/c">click here</a>
                <a href="/d">aqui mesmo</a>
            </body></html>"#,
        );
        assert_eq!(features.generic_link_pct, 50.0, "exact match only, 2 of 4");
    }

    #[test]
    fn heading_skip_counting_matches_outline_rules() {
        let render = |levels: &[u32]| {
            let body: String = levels
                .iter()
                .map(|level| format!("<h{level}>t</h{level}>"))
                .collect();
            features_for(&format!("<html><body>{body}</body></html>")).heading_skips
        };
        assert_eq!(render(&[1, 3]), 1, "h1 to h3 skips a level");
        assert_eq!(render(&[1, 2, 3]), 0, "stepwise descent is clean");
        assert_eq!(render(&[1, 3, 2]), 1, "only the upward jump counts");
        assert_eq!(render(&[3, 1, 2]), 0, "decreases never count");
    }

    #[test]
    fn heading_skips_invariant_under_adjacent_level_insertion() {
        let base = features_for("<html><body><h1>a</h1><h3>b</h3></body></html>");
        let padded = features_for(
            "<html><body><h1>a</h1><h1>a2</h1><h3>b</h3><h3>b2</h3></body></html>",
        );
        assert_eq!(base.heading_skips, padded.heading_skips);
    }

    #[test]
    fn unlabeled_fields_require_id_and_matching_label() {
        let features = features_for(
            r#"<html><body>
                <input type="text" id="named"><label for="named">Name</label>
                <input type="text" id="orphan">
                <input type="text">
                <input type="hidden">
                <input type="submit">
                <select id="named-too"></select><label for="named-too">Kind</label>
            </body></html>"#,
        );
        assert_eq!(
            features.unlabeled_fields, 2,
            "orphan id and missing id both disqualify; hidden/submit are skipped"
        );
    }

    #[test]
    fn aria_presence_is_an_existence_check() {
        let features = features_for(r#"<html><body><div role="button">x</div></body></html>"#);
        assert_eq!(features.aria_present, 1);

        let features = features_for("<html><body><div>x</div></body></html>");
        assert_eq!(features.aria_present, 0);
    }

    #[test]
    fn videos_need_a_captions_track() {
        let features = features_for(
            r#"<html><body>
                <video><track kind="captions"></video>
                <video><track kind="subtitles"></video>
                <video></video>
            </body></html>"#,
        );
        assert_eq!(features.videos_missing_captions, 2);
    }

    #[test]
    fn extraction_absorbs_malformed_markup() {
        let features = features_for("<div><img><input type='text'><h1><h4");
        assert_eq!(features.images_missing_alt, 1);
        assert_eq!(features.lang_declared, 0, "recovered root carries no lang");
        assert_eq!(features.unlabeled_fields, 1);
    }

    #[test]
    fn contrast_failures_default_to_zero() {
        let features = features_for("<html><body></body></html>");
        assert_eq!(features.contrast_failures, 0);
    }

    #[test]
    fn full_page_end_to_end() {
        // Lang declared, one nav with two links (one generic), one
        // heading skip, one unlabeled input, no header/main/footer.
        let features = features_for(
            r#"<html lang="pt"><body>
                <nav><a href="/a">relatório completo</a><a href="/b">clique aqui</a></nav>
                <h1>Título</h1>
                <h3>Sub</h3>
                <input type="text">
            </body></html>"#,
        );
        assert_eq!(features.lang_declared, 1);
        assert_eq!(features.generic_link_pct, 50.0);
        assert_eq!(features.heading_skips, 1);
        assert_eq!(features.unlabeled_fields, 1);
        assert_eq!(features.layout.nav_items, Some(2));
        assert_eq!(features.layout.header_present, None);
        assert_eq!(features.layout.main_present, None);
        assert_eq!(features.layout.footer_present, None);
    }

    #[test]
    fn record_serializes_contract_names_and_skips_absent_layout_keys() {
        let features = features_for(
            r#"<html lang="en"><body><header>h</header><img></body></html>"#,
        );
        let json = serde_json::to_value(&features).expect("serialize record");
        assert_eq!(json["imagens_sem_alt"], serde_json::json!(1));
        assert_eq!(json["lang_presente"], serde_json::json!(1));
        assert_eq!(json["layout"]["header_presente"], serde_json::json!(1));
        assert!(
            json["layout"].get("nav_itens").is_none(),
            "undetected nav must not serialize a key"
        );
    }

    #[test]
    fn value_accessor_covers_the_schema() {
        let features = features_for("<html><body></body></html>");
        for name in guidepost_feature_contract::FEATURE_SCHEMA {
            assert!(
                features.value(name).is_some(),
                "schema name {name} missing from accessor"
            );
        }
        assert_eq!(features.value("layout"), None);
    }
}

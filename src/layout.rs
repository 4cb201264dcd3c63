use kuchiki::NodeRef;
use serde::{Deserialize, Serialize};

use crate::page::{descendant_elements, element_name, trimmed_attr, PageStructure};

/// Structural page regions located by heuristic selectors, in the order a
/// screen reader would meet them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Header,
    Nav,
    Main,
    Footer,
    Carousel,
    Form,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Header => "header",
            Region::Nav => "nav",
            Region::Main => "main",
            Region::Footer => "footer",
            Region::Carousel => "carousel",
            Region::Form => "form",
        }
    }
}

/// One match predicate. Semantic tags come first in every pattern list;
/// attribute-substring heuristics cover legacy markup that never adopted
/// the semantic elements.
#[derive(Debug, Clone, Copy)]
enum Pattern {
    Tag(&'static str),
    IdContains(&'static str, &'static str),
    ClassContains(&'static str, &'static str),
}

/// Region detection table. Patterns are tried in order and the first one
/// with at least one match wins for its region; regions with no matching
/// pattern are omitted from the output entirely.
const REGION_PATTERNS: [(Region, &[Pattern]); 6] = [
    (
        Region::Header,
        &[
            Pattern::Tag("header"),
            Pattern::IdContains("div", "header"),
            Pattern::ClassContains("div", "header"),
        ],
    ),
    (
        Region::Nav,
        &[
            Pattern::Tag("nav"),
            Pattern::IdContains("ul", "menu"),
            Pattern::ClassContains("ul", "nav"),
            Pattern::IdContains("div", "menu"),
            Pattern::ClassContains("div", "nav"),
        ],
    ),
    (
        Region::Main,
        &[
            Pattern::Tag("main"),
            Pattern::Tag("article"),
            Pattern::IdContains("section", "content"),
            Pattern::IdContains("div", "content"),
            Pattern::ClassContains("div", "main"),
        ],
    ),
    (
        Region::Footer,
        &[
            Pattern::Tag("footer"),
            Pattern::IdContains("div", "footer"),
            Pattern::ClassContains("div", "footer"),
        ],
    ),
    (
        Region::Carousel,
        &[
            Pattern::ClassContains("div", "carousel"),
            Pattern::ClassContains("div", "slider"),
        ],
    ),
    (Region::Form, &[Pattern::Tag("form")]),
];

/// Per-region presence flags and counts. A `None` field means the region
/// was not detected, which is distinct from a region detected with zero
/// items; serialization drops `None` keys so the distinction survives the
/// dataset's `layout_json` column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    #[serde(rename = "header_presente", skip_serializing_if = "Option::is_none", default)]
    pub header_present: Option<u8>,
    #[serde(rename = "nav_itens", skip_serializing_if = "Option::is_none", default)]
    pub nav_items: Option<u32>,
    #[serde(rename = "carousel_imagens", skip_serializing_if = "Option::is_none", default)]
    pub carousel_images: Option<u32>,
    #[serde(rename = "carousel_sem_alt", skip_serializing_if = "Option::is_none", default)]
    pub carousel_missing_alt: Option<u32>,
    #[serde(rename = "main_presente", skip_serializing_if = "Option::is_none", default)]
    pub main_present: Option<u8>,
    #[serde(rename = "form_campos", skip_serializing_if = "Option::is_none", default)]
    pub form_fields: Option<u32>,
    #[serde(rename = "form_rotulados", skip_serializing_if = "Option::is_none", default)]
    pub form_all_labeled: Option<bool>,
    #[serde(rename = "footer_presente", skip_serializing_if = "Option::is_none", default)]
    pub footer_present: Option<u8>,
}

fn pattern_matches(pattern: &Pattern, node: &NodeRef) -> bool {
    let Some(name) = element_name(node) else {
        return false;
    };
    match pattern {
        Pattern::Tag(tag) => name == *tag,
        Pattern::IdContains(tag, fragment) => {
            name == *tag
                && trimmed_attr(node, "id")
                    .map(|id| id.contains(fragment))
                    .unwrap_or(false)
        }
        Pattern::ClassContains(tag, fragment) => {
            name == *tag
                && trimmed_attr(node, "class")
                    .map(|class| class.contains(fragment))
                    .unwrap_or(false)
        }
    }
}

/// First node in document order matched by the first pattern that matches
/// anything.
fn find_region(page: &PageStructure, patterns: &[Pattern]) -> Option<NodeRef> {
    for pattern in patterns {
        let matched = page.elements().find(|node| pattern_matches(pattern, node));
        if matched.is_some() {
            return matched;
        }
    }
    None
}

fn count_descendants(node: &NodeRef, tags: &[&str]) -> u32 {
    descendant_elements(node)
        .iter()
        .filter(|child| {
            element_name(child)
                .map(|name| tags.contains(&name.as_str()))
                .unwrap_or(false)
        })
        .count() as u32
}

fn count_images_missing_alt(node: &NodeRef) -> u32 {
    descendant_elements(node)
        .iter()
        .filter(|child| element_name(child).as_deref() == Some("img"))
        .filter(|child| trimmed_attr(child, "alt").map(|alt| alt.is_empty()).unwrap_or(true))
        .count() as u32
}

/// Detect structural regions. Pure over the tree: no side effects, no
/// failures.
///
/// `page_unlabeled_fields` is the page-wide `inputs_sem_label` count; the
/// form region's `form_rotulados` flag reports whether it is zero.
pub fn detect_layout(page: &PageStructure, page_unlabeled_fields: u32) -> LayoutInfo {
    let mut layout = LayoutInfo::default();

    for (region, patterns) in REGION_PATTERNS.iter() {
        let Some(node) = find_region(page, patterns) else {
            continue;
        };
        match region {
            Region::Header => layout.header_present = Some(1),
            Region::Main => layout.main_present = Some(1),
            Region::Footer => layout.footer_present = Some(1),
            Region::Nav => layout.nav_items = Some(count_descendants(&node, &["a"])),
            Region::Carousel => {
                layout.carousel_images =
                    Some(count_descendants(&node, &["img"]));
                layout.carousel_missing_alt = Some(count_images_missing_alt(&node));
            }
            Region::Form => {
                layout.form_fields =
                    Some(count_descendants(&node, &["input", "select", "textarea"]));
                layout.form_all_labeled = Some(page_unlabeled_fields == 0);
            }
        }
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_for(html: &str) -> LayoutInfo {
        detect_layout(&PageStructure::parse(html), 0)
    }

    #[test]
    fn missing_regions_are_omitted_not_zero() {
        let layout = layout_for("<html><body><p>plain page</p></body></html>");
        assert_eq!(layout, LayoutInfo::default());

        let json = serde_json::to_value(&layout).expect("serialize layout");
        assert_eq!(
            json,
            serde_json::json!({}),
            "absent regions must not serialize keys"
        );
    }

    #[test]
    fn semantic_tag_wins_over_heuristic() {
        let layout = layout_for(
            r#"<html><body>
                <div id="page-header">legacy</div>
                <header>semantic</header>
                <nav><a href="/a">a</a><a href="/b">b</a><a href="/c">c</a></nav>
            </body></html>"#,
        );
        assert_eq!(layout.header_present, Some(1));
        assert_eq!(layout.nav_items, Some(3));
    }

    #[test]
    fn heuristic_selectors_cover_legacy_markup() {
        let layout = layout_for(
            r#"<html><body>
                <div id="site-header">top</div>
                <ul class="main-nav"><a href="/x">x</a></ul>
                <div id="content"><h1>body</h1></div>
                <div class="footer-wrap">bottom</div>
            </body></html>"#,
        );
        assert_eq!(layout.header_present, Some(1));
        assert_eq!(layout.nav_items, Some(1));
        assert_eq!(layout.main_present, Some(1));
        assert_eq!(layout.footer_present, Some(1));
    }

    #[test]
    fn first_match_in_document_order_is_chosen() {
        let layout = layout_for(
            r#"<html><body>
                <nav><a href="/only">one</a></nav>
                <nav><a href="/a">a</a><a href="/b">b</a></nav>
            </body></html>"#,
        );
        assert_eq!(layout.nav_items, Some(1), "expected the first nav, not the largest");
    }

    #[test]
    fn carousel_counts_images_and_missing_alt() {
        let layout = layout_for(
            r#"<html><body>
                <div class="hero-carousel">
                    <img src="a.png" alt="described">
                    <img src="b.png" alt="  ">
                    <img src="c.png">
                </div>
            </body></html>"#,
        );
        assert_eq!(layout.carousel_images, Some(3));
        assert_eq!(layout.carousel_missing_alt, Some(2));
    }

    #[test]
    fn form_counts_fields_and_reports_labeling() {
        let page = PageStructure::parse(
            r#"<html><body>
                <form>
                    <input type="text" id="name">
                    <select id="kind"></select>
                    <textarea id="notes"></textarea>
                    <input type="submit">
                </form>
            </body></html>"#,
        );
        let layout = detect_layout(&page, 0);
        assert_eq!(layout.form_fields, Some(4), "field count includes submit inputs");
        assert_eq!(layout.form_all_labeled, Some(true));

        let layout = detect_layout(&page, 2);
        assert_eq!(layout.form_all_labeled, Some(false));
    }

    #[test]
    fn detected_region_with_zero_items_stays_present() {
        let layout = layout_for("<html><body><nav></nav></body></html>");
        assert_eq!(layout.nav_items, Some(0), "empty nav is present with zero items");

        let json = serde_json::to_string(&layout).expect("serialize layout");
        assert!(
            json.contains("\"nav_itens\":0"),
            "present-but-empty region must serialize as zero: {json}"
        );
    }
}

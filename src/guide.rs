use crate::features::FeatureRecord;
use crate::messages::{template, Locale, MessageId, Plural};

/// Share of generic anchor text above which the nav clause gains a
/// warning.
const GENERIC_LINK_WARNING_PCT: f64 = 20.0;

// Closing-recommendation buckets. Contiguous and non-overlapping:
// (80, 100] direct, (50, 80] reasonable, [0, 50] assistive.
const DIRECT_SCORE_FLOOR: u8 = 80;
const REASONABLE_SCORE_FLOOR: u8 = 50;

/// Compose the navigation guide: one linear narrative mimicking how a
/// screen reader meets the page top to bottom. Deterministic over
/// (features, score, url, locale); plain text, no markup.
pub fn compose_guide(features: &FeatureRecord, score: u8, url: &str, locale: Locale) -> String {
    let mut guide = String::new();
    let name = page_name(url, locale);

    guide.push_str(
        &template(MessageId::Opening, Plural::Other, locale)
            .replace("{name}", &name)
            .replace("{url}", url)
            .replace("{score}", &score.to_string()),
    );

    // Structural walk in fixed traversal order. Every clause is gated on
    // its layout key being present; a missing key means the region was not
    // found and narrating it would be a lie.
    let layout = &features.layout;
    if layout.header_present.is_some() {
        guide.push_str(template(MessageId::HeaderIntro, Plural::Other, locale));
    }
    if let Some(nav_items) = layout.nav_items {
        push_counted(&mut guide, MessageId::NavIntro, nav_items, locale);
        if features.generic_link_pct > GENERIC_LINK_WARNING_PCT {
            guide.push_str(template(MessageId::GenericLinksWarning, Plural::Other, locale));
        }
    }
    if let Some(carousel_images) = layout.carousel_images {
        push_counted(&mut guide, MessageId::CarouselIntro, carousel_images, locale);
        if let Some(missing) = layout.carousel_missing_alt.filter(|count| *count > 0) {
            push_counted(&mut guide, MessageId::CarouselMissingAlt, missing, locale);
        }
    }
    if layout.main_present.is_some() {
        guide.push_str(template(MessageId::MainIntro, Plural::Other, locale));
        if features.heading_skips > 0 {
            push_counted(&mut guide, MessageId::HierarchyWarning, features.heading_skips, locale);
        }
    }
    if let Some(form_fields) = layout.form_fields {
        push_counted(&mut guide, MessageId::FormIntro, form_fields, locale);
        if features.unlabeled_fields > 0 {
            push_counted(
                &mut guide,
                MessageId::UnlabeledFieldsWarning,
                features.unlabeled_fields,
                locale,
            );
        } else {
            guide.push_str(template(MessageId::FormAllLabeled, Plural::Other, locale));
        }
    }
    if layout.footer_present.is_some() {
        guide.push_str(template(MessageId::FooterOutro, Plural::Other, locale));
    }

    // Page-wide warnings after the structural walk.
    if features.images_missing_alt > 0 {
        push_counted(&mut guide, MessageId::ImagesMissingAlt, features.images_missing_alt, locale);
    }
    if features.videos_missing_captions > 0 {
        push_counted(
            &mut guide,
            MessageId::VideosMissingCaptions,
            features.videos_missing_captions,
            locale,
        );
    }
    if features.contrast_failures > 0 {
        push_counted(&mut guide, MessageId::ContrastWarning, features.contrast_failures, locale);
    }
    if features.aria_present == 0 {
        guide.push_str(template(MessageId::MissingAria, Plural::Other, locale));
    }

    let closing = if score > DIRECT_SCORE_FLOOR {
        MessageId::ClosingDirect
    } else if score > REASONABLE_SCORE_FLOOR {
        MessageId::ClosingReasonable
    } else {
        MessageId::ClosingAssistive
    };
    guide.push_str(template(closing, Plural::Other, locale));

    guide
}

fn push_counted(guide: &mut String, id: MessageId, count: u32, locale: Locale) {
    let text = template(id, Plural::for_count(count), locale).replace("{n}", &count.to_string());
    guide.push_str(&text);
}

/// Friendly page name: last non-empty path segment of the URL, else the
/// host, else a locale-appropriate stand-in for the front page.
fn page_name(url: &str, locale: Locale) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let without_query = stripped
        .split_once(['?', '#'])
        .map(|(path, _)| path)
        .unwrap_or(stripped);
    let segment = without_query
        .split('/')
        .rev()
        .find(|segment| !segment.is_empty());
    match segment {
        Some(segment) => segment.to_string(),
        None => match locale {
            Locale::Pt => "principal".to_string(),
            Locale::En => "front page".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract_features;
    use crate::page::PageStructure;

    fn features_for(html: &str) -> FeatureRecord {
        extract_features(&PageStructure::parse(html))
    }

    fn empty_features() -> FeatureRecord {
        features_for("<html><body></body></html>")
    }

    #[test]
    fn absent_layout_keys_omit_structural_clauses() {
        let guide = compose_guide(&empty_features(), 90, "https://example.com", Locale::Pt);
        assert!(!guide.contains("cabeçalho"), "no header clause expected: {guide}");
        assert!(!guide.contains("menu"), "no nav clause expected: {guide}");
        assert!(!guide.contains("formulário"), "no form clause expected: {guide}");
        assert!(!guide.contains("rodapé"), "no footer clause expected: {guide}");
    }

    #[test]
    fn structural_clauses_follow_traversal_order() {
        let features = features_for(
            r#"<html lang="pt"><body>
                <header>h</header>
                <nav><a href="/a">ir</a></nav>
                <main><p>texto</p></main>
                <form><input type="text" id="f"><label for="f">F</label></form>
                <footer>f</footer>
            </body></html>"#,
        );
        let guide = compose_guide(&features, 90, "https://example.com", Locale::Pt);
        let header = guide.find("cabeçalho").expect("header clause");
        let nav = guide.find("menu de navegação").expect("nav clause");
        let main = guide.find("conteúdo principal").expect("main clause");
        let form = guide.find("formulário").expect("form clause");
        let footer = guide.find("rodapé").expect("footer clause");
        assert!(header < nav && nav < main && main < form && form < footer);
        assert!(
            guide.contains("rotulados corretamente"),
            "fully labeled form must be confirmed: {guide}"
        );
    }

    #[test]
    fn counts_pluralize_exactly() {
        let one = features_for(r#"<html lang="pt" role="main"><body><img></body></html>"#);
        let guide = compose_guide(&one, 90, "https://example.com", Locale::Pt);
        assert!(
            guide.contains("1 imagem sem descrição alternativa"),
            "singular phrasing expected: {guide}"
        );
        assert!(!guide.contains("imagens sem"), "plural form must not appear: {guide}");

        let six = features_for(
            r#"<html lang="pt" role="main"><body>
                <img><img><img><img><img><img>
            </body></html>"#,
        );
        let guide = compose_guide(&six, 90, "https://example.com", Locale::Pt);
        assert!(guide.contains('6'), "count must be spelled out: {guide}");
        assert!(
            guide.contains("6 imagens sem descrições alternativas"),
            "plural phrasing expected: {guide}"
        );
        assert!(
            !guide.contains("1 imagem sem"),
            "singular form must not appear alongside plural: {guide}"
        );
    }

    #[test]
    fn generic_link_warning_requires_nav_and_threshold() {
        let noisy = features_for(
            r#"<html><body><nav>
                <a href="/a">clique aqui</a><a href="/b">saiba mais</a><a href="/c">mapa</a>
            </nav></body></html>"#,
        );
        let guide = compose_guide(&noisy, 90, "https://example.com", Locale::Pt);
        assert!(guide.contains("links genéricos"), "66% generic: {guide}");

        let mut quiet = noisy.clone();
        quiet.generic_link_pct = 20.0;
        let guide = compose_guide(&quiet, 90, "https://example.com", Locale::Pt);
        assert!(!guide.contains("links genéricos"), "20% is at, not over, the threshold");
    }

    #[test]
    fn closing_recommendation_buckets_are_exact() {
        let features = empty_features();
        let closing = |score: u8| compose_guide(&features, score, "https://example.com", Locale::Pt);
        assert!(closing(81).contains("direta e acessível"));
        assert!(closing(100).contains("direta e acessível"));
        assert!(closing(80).contains("razoável"));
        assert!(closing(51).contains("razoável"));
        assert!(closing(50).contains("ferramentas alternativas"));
        assert!(closing(0).contains("ferramentas alternativas"));
    }

    #[test]
    fn opening_names_the_page_from_the_url() {
        let features = empty_features();
        let guide = compose_guide(
            &features,
            70,
            "https://example.com/docs/accessibility",
            Locale::Pt,
        );
        assert!(guide.contains("accessibility"), "last path segment expected: {guide}");
        assert!(guide.contains("Pontuação prevista: 70"));

        let guide = compose_guide(&features, 70, "https://example.com/", Locale::Pt);
        assert!(guide.contains("example.com"), "host fallback expected: {guide}");
    }

    #[test]
    fn english_catalog_produces_an_english_guide() {
        let features = features_for(
            r#"<html><body><nav><a href="/a">go</a><a href="/b">docs</a></nav><video></video></body></html>"#,
        );
        let guide = compose_guide(&features, 40, "https://example.com", Locale::En);
        assert!(guide.contains("navigation menu with 2 items"), "{guide}");
        assert!(guide.contains("1 video has no captions"), "{guide}");
        assert!(guide.contains("alternative tools"), "{guide}");
    }

    #[test]
    fn contrast_and_aria_warnings_are_gated() {
        let mut features = empty_features();
        features.contrast_failures = 3;
        let guide = compose_guide(&features, 60, "https://example.com", Locale::Pt);
        assert!(guide.contains("3 problemas de contraste"), "{guide}");
        assert!(
            guide.contains("Falta de ARIA"),
            "aria warning expected when aria_present is 0: {guide}"
        );

        features.contrast_failures = 0;
        features.aria_present = 1;
        let guide = compose_guide(&features, 60, "https://example.com", Locale::Pt);
        assert!(!guide.contains("contraste"), "{guide}");
        assert!(!guide.contains("ARIA"), "{guide}");
    }
}

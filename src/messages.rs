/// Narration language. `Pt` is the default output language; `En` exists so
/// the composer's structural logic stays independent of presentation
/// language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Pt,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plural {
    One,
    Other,
}

impl Plural {
    pub fn for_count(count: u32) -> Self {
        if count == 1 {
            Plural::One
        } else {
            Plural::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageId {
    Opening,
    HeaderIntro,
    NavIntro,
    GenericLinksWarning,
    CarouselIntro,
    CarouselMissingAlt,
    MainIntro,
    HierarchyWarning,
    FormIntro,
    UnlabeledFieldsWarning,
    FormAllLabeled,
    FooterOutro,
    ImagesMissingAlt,
    VideosMissingCaptions,
    ContrastWarning,
    MissingAria,
    ClosingDirect,
    ClosingReasonable,
    ClosingAssistive,
}

/// Sentence templates keyed by (message, plural category, locale).
/// Messages with no count register only `Other`; lookup falls back from
/// `One` to `Other` so the table stays sparse. Placeholders `{name}`,
/// `{url}`, `{score}` and `{n}` are substituted by the composer.
const CATALOG: &[(MessageId, Plural, Locale, &str)] = &[
    // -- pt --------------------------------------------------------------
    (
        MessageId::Opening,
        Plural::Other,
        Locale::Pt,
        "Análise da página {name} de {url}. Pontuação prevista: {score}. Guia rápido e alertas: ",
    ),
    (
        MessageId::HeaderIntro,
        Plural::Other,
        Locale::Pt,
        "A página começa com um cabeçalho. ",
    ),
    (
        MessageId::NavIntro,
        Plural::One,
        Locale::Pt,
        "Em seguida há um menu de navegação com 1 item. ",
    ),
    (
        MessageId::NavIntro,
        Plural::Other,
        Locale::Pt,
        "Em seguida há um menu de navegação com {n} itens. ",
    ),
    (
        MessageId::GenericLinksWarning,
        Plural::Other,
        Locale::Pt,
        "Cuidado: muitos links genéricos no menu podem confundir a navegação. ",
    ),
    (
        MessageId::CarouselIntro,
        Plural::One,
        Locale::Pt,
        "Há uma galeria ou carrossel com 1 imagem. ",
    ),
    (
        MessageId::CarouselIntro,
        Plural::Other,
        Locale::Pt,
        "Há uma galeria ou carrossel com {n} imagens. ",
    ),
    (
        MessageId::CarouselMissingAlt,
        Plural::One,
        Locale::Pt,
        "Alerta: 1 imagem da galeria sem descrição; seu leitor de tela pode ignorá-la. ",
    ),
    (
        MessageId::CarouselMissingAlt,
        Plural::Other,
        Locale::Pt,
        "Alerta: {n} imagens da galeria sem descrição; seu leitor de tela pode ignorá-las. ",
    ),
    (
        MessageId::MainIntro,
        Plural::Other,
        Locale::Pt,
        "A área de conteúdo principal segue. ",
    ),
    (
        MessageId::HierarchyWarning,
        Plural::One,
        Locale::Pt,
        "Ela tem 1 erro de hierarquia em títulos, o que pode bagunçar a navegação por seções. ",
    ),
    (
        MessageId::HierarchyWarning,
        Plural::Other,
        Locale::Pt,
        "Ela tem {n} erros de hierarquia em títulos, o que pode bagunçar a navegação por seções. ",
    ),
    (
        MessageId::FormIntro,
        Plural::One,
        Locale::Pt,
        "Há um formulário com 1 campo. ",
    ),
    (
        MessageId::FormIntro,
        Plural::Other,
        Locale::Pt,
        "Há um formulário com {n} campos. ",
    ),
    (
        MessageId::UnlabeledFieldsWarning,
        Plural::One,
        Locale::Pt,
        "Alerta: 1 campo sem rótulo adequado; o formulário pode ser difícil. ",
    ),
    (
        MessageId::UnlabeledFieldsWarning,
        Plural::Other,
        Locale::Pt,
        "Alerta: {n} campos sem rótulos adequados; formulários podem ser difíceis. ",
    ),
    (
        MessageId::FormAllLabeled,
        Plural::Other,
        Locale::Pt,
        "Todos os campos parecem rotulados corretamente. ",
    ),
    (
        MessageId::FooterOutro,
        Plural::Other,
        Locale::Pt,
        "A página termina com um rodapé. ",
    ),
    (
        MessageId::ImagesMissingAlt,
        Plural::One,
        Locale::Pt,
        "Cuidado geral: 1 imagem sem descrição alternativa na página. ",
    ),
    (
        MessageId::ImagesMissingAlt,
        Plural::Other,
        Locale::Pt,
        "Cuidado geral: {n} imagens sem descrições alternativas em toda a página. ",
    ),
    (
        MessageId::VideosMissingCaptions,
        Plural::One,
        Locale::Pt,
        "Alerta: 1 vídeo sem legendas; o áudio pode ser inacessível. ",
    ),
    (
        MessageId::VideosMissingCaptions,
        Plural::Other,
        Locale::Pt,
        "Alerta: {n} vídeos sem legendas; o áudio pode ser inacessível. ",
    ),
    (
        MessageId::ContrastWarning,
        Plural::One,
        Locale::Pt,
        "Foi detectado 1 problema de contraste, o que afeta a legibilidade para baixa visão. ",
    ),
    (
        MessageId::ContrastWarning,
        Plural::Other,
        Locale::Pt,
        "Foram detectados {n} problemas de contraste, o que afeta a legibilidade para baixa visão. ",
    ),
    (
        MessageId::MissingAria,
        Plural::Other,
        Locale::Pt,
        "Falta de ARIA em elementos dinâmicos; interações podem não ser anunciadas. ",
    ),
    (
        MessageId::ClosingDirect,
        Plural::Other,
        Locale::Pt,
        "A navegação deve ser direta e acessível.",
    ),
    (
        MessageId::ClosingReasonable,
        Plural::Other,
        Locale::Pt,
        "A navegação é razoável, mas evite seções problemáticas.",
    ),
    (
        MessageId::ClosingAssistive,
        Plural::Other,
        Locale::Pt,
        "Sugiro usar ferramentas alternativas, como a busca do site, para evitar frustrações.",
    ),
    // -- en --------------------------------------------------------------
    (
        MessageId::Opening,
        Plural::Other,
        Locale::En,
        "Analysis of the page {name} at {url}. Predicted score: {score}. Quick guide and alerts: ",
    ),
    (
        MessageId::HeaderIntro,
        Plural::Other,
        Locale::En,
        "The page opens with a header. ",
    ),
    (
        MessageId::NavIntro,
        Plural::One,
        Locale::En,
        "Next comes a navigation menu with 1 item. ",
    ),
    (
        MessageId::NavIntro,
        Plural::Other,
        Locale::En,
        "Next comes a navigation menu with {n} items. ",
    ),
    (
        MessageId::GenericLinksWarning,
        Plural::Other,
        Locale::En,
        "Careful: many generic links in the menu can make navigation confusing. ",
    ),
    (
        MessageId::CarouselIntro,
        Plural::One,
        Locale::En,
        "There is a gallery or carousel with 1 image. ",
    ),
    (
        MessageId::CarouselIntro,
        Plural::Other,
        Locale::En,
        "There is a gallery or carousel with {n} images. ",
    ),
    (
        MessageId::CarouselMissingAlt,
        Plural::One,
        Locale::En,
        "Alert: 1 gallery image has no description; your screen reader may skip it. ",
    ),
    (
        MessageId::CarouselMissingAlt,
        Plural::Other,
        Locale::En,
        "Alert: {n} gallery images have no description; your screen reader may skip them. ",
    ),
    (
        MessageId::MainIntro,
        Plural::Other,
        Locale::En,
        "The main content area follows. ",
    ),
    (
        MessageId::HierarchyWarning,
        Plural::One,
        Locale::En,
        "It has 1 heading hierarchy error, which can scramble section navigation. ",
    ),
    (
        MessageId::HierarchyWarning,
        Plural::Other,
        Locale::En,
        "It has {n} heading hierarchy errors, which can scramble section navigation. ",
    ),
    (
        MessageId::FormIntro,
        Plural::One,
        Locale::En,
        "There is a form with 1 field. ",
    ),
    (
        MessageId::FormIntro,
        Plural::Other,
        Locale::En,
        "There is a form with {n} fields. ",
    ),
    (
        MessageId::UnlabeledFieldsWarning,
        Plural::One,
        Locale::En,
        "Alert: 1 field has no proper label; the form may be hard to fill in. ",
    ),
    (
        MessageId::UnlabeledFieldsWarning,
        Plural::Other,
        Locale::En,
        "Alert: {n} fields have no proper labels; forms may be hard to fill in. ",
    ),
    (
        MessageId::FormAllLabeled,
        Plural::Other,
        Locale::En,
        "All fields appear to be labeled correctly. ",
    ),
    (
        MessageId::FooterOutro,
        Plural::Other,
        Locale::En,
        "The page ends with a footer. ",
    ),
    (
        MessageId::ImagesMissingAlt,
        Plural::One,
        Locale::En,
        "General warning: 1 image on the page has no alternative description. ",
    ),
    (
        MessageId::ImagesMissingAlt,
        Plural::Other,
        Locale::En,
        "General warning: {n} images across the page have no alternative descriptions. ",
    ),
    (
        MessageId::VideosMissingCaptions,
        Plural::One,
        Locale::En,
        "Alert: 1 video has no captions; its audio may be inaccessible. ",
    ),
    (
        MessageId::VideosMissingCaptions,
        Plural::Other,
        Locale::En,
        "Alert: {n} videos have no captions; their audio may be inaccessible. ",
    ),
    (
        MessageId::ContrastWarning,
        Plural::One,
        Locale::En,
        "1 contrast problem was detected, which affects readability for low vision. ",
    ),
    (
        MessageId::ContrastWarning,
        Plural::Other,
        Locale::En,
        "{n} contrast problems were detected, which affects readability for low vision. ",
    ),
    (
        MessageId::MissingAria,
        Plural::Other,
        Locale::En,
        "Dynamic elements lack ARIA; interactions may not be announced. ",
    ),
    (
        MessageId::ClosingDirect,
        Plural::Other,
        Locale::En,
        "Navigation should be direct and accessible.",
    ),
    (
        MessageId::ClosingReasonable,
        Plural::Other,
        Locale::En,
        "Navigation is reasonable, but avoid the problem sections.",
    ),
    (
        MessageId::ClosingAssistive,
        Plural::Other,
        Locale::En,
        "I suggest alternative tools, such as the site's search, to avoid frustration.",
    ),
];

/// Template lookup; `One` falls back to `Other` for messages that carry no
/// count.
pub fn template(id: MessageId, plural: Plural, locale: Locale) -> &'static str {
    let exact = CATALOG
        .iter()
        .find(|(entry_id, entry_plural, entry_locale, _)| {
            *entry_id == id && *entry_plural == plural && *entry_locale == locale
        })
        .map(|(_, _, _, text)| *text);
    if let Some(text) = exact {
        return text;
    }
    CATALOG
        .iter()
        .find(|(entry_id, entry_plural, entry_locale, _)| {
            *entry_id == id && *entry_plural == Plural::Other && *entry_locale == locale
        })
        .map(|(_, _, _, text)| *text)
        .unwrap_or("")
}

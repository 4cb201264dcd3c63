use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;

/// Read-only view over a parsed HTML document. The analyzer only queries
/// the tree; it never mutates it, so independent analyses can share one
/// structure.
#[derive(Clone)]
pub struct PageStructure {
    document: NodeRef,
}

impl PageStructure {
    /// Parse raw HTML. The parser is error-recovering: malformed or partial
    /// markup yields a best-effort tree, never a failure.
    pub fn parse(html: &str) -> Self {
        Self {
            document: kuchiki::parse_html().one(html),
        }
    }

    /// Wrap an externally parsed document.
    pub fn from_document(document: NodeRef) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &NodeRef {
        &self.document
    }

    /// Element nodes in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.document
            .descendants()
            .filter(|node| node.as_element().is_some())
    }

    /// The root `<html>` element, when the tree has one.
    pub fn root_element(&self) -> Option<NodeRef> {
        self.elements()
            .find(|node| element_name(node).as_deref() == Some("html"))
    }
}

pub(crate) fn element_name(node: &NodeRef) -> Option<String> {
    node.as_element()
        .map(|element| element.name.local.as_ref().to_string())
}

/// Attribute value with surrounding whitespace trimmed; `None` when the
/// attribute is absent.
pub(crate) fn trimmed_attr(node: &NodeRef, name: &str) -> Option<String> {
    let element = node.as_element()?;
    let attrs = element.attributes.borrow();
    attrs.get(name).map(|value| value.trim().to_string())
}

pub(crate) fn has_attr(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .map(|element| element.attributes.borrow().get(name).is_some())
        .unwrap_or(false)
}

/// Descendant elements of `node` (excluding `node` itself) in document
/// order. Tree-order traversal yields the node first, so it is skipped
/// positionally.
pub(crate) fn descendant_elements(node: &NodeRef) -> Vec<NodeRef> {
    node.descendants()
        .skip(1)
        .filter(|candidate| candidate.as_element().is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recovers_from_malformed_markup() {
        let page = PageStructure::parse("<div><p>unclosed<span>text");
        assert!(
            page.elements().count() > 0,
            "malformed markup must still produce a tree"
        );
    }

    #[test]
    fn root_element_reads_lang() {
        let page = PageStructure::parse(r#"<html lang="pt"><body></body></html>"#);
        let root = page.root_element().expect("html root");
        assert_eq!(trimmed_attr(&root, "lang").as_deref(), Some("pt"));
    }

    #[test]
    fn trimmed_attr_distinguishes_absent_from_blank() {
        let page = PageStructure::parse(r#"<img alt="   "><img>"#);
        let images: Vec<NodeRef> = page
            .elements()
            .filter(|node| element_name(node).as_deref() == Some("img"))
            .collect();
        assert_eq!(images.len(), 2);
        assert_eq!(trimmed_attr(&images[0], "alt").as_deref(), Some(""));
        assert_eq!(trimmed_attr(&images[1], "alt"), None);
    }

    #[test]
    fn descendant_elements_follow_document_order() {
        let page = PageStructure::parse("<section><h1>a</h1><p><em>b</em></p></section>");
        let section = page
            .elements()
            .find(|node| element_name(node).as_deref() == Some("section"))
            .expect("section");
        let names: Vec<String> = descendant_elements(&section)
            .iter()
            .filter_map(element_name)
            .collect();
        assert_eq!(names, vec!["h1", "p", "em"]);
    }
}

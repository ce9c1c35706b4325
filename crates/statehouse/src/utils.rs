use scraper::{ElementRef, Html, Node, Selector};

pub(crate) fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of every descendant text node, trimmed and joined with single spaces.
pub(crate) fn stripped_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the element's own text-node children only, so nested lists do not bleed in.
pub(crate) fn direct_text(element: ElementRef) -> String {
    element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(text.trim().to_string()),
            _ => None,
        })
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text immediately following `element` among its siblings (the `<b>Label:</b> value` shape).
pub(crate) fn next_sibling_text(element: ElementRef) -> Option<String> {
    let sibling = element.next_sibling()?;
    let text = match sibling.value() {
        Node::Text(text) => text.trim().to_string(),
        Node::Element(_) => ElementRef::wrap(sibling).map(elem_text)?,
        _ => return None,
    };
    let text = normalize_whitespace(&text);
    (!text.is_empty()).then_some(text)
}

/// Nearest ancestor element with the given tag name.
pub(crate) fn ancestor<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == tag)
}

/// Next sibling element with the given tag name.
pub(crate) fn next_sibling_element<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == tag)
}

pub(crate) fn child_elements<'a>(
    element: ElementRef<'a>,
    tag: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |e| e.value().name() == tag)
}

/// Elements matching `selector` that come after `anchor` in document order (its descendants included).
pub(crate) fn elements_after<'a>(
    root: ElementRef<'a>,
    anchor: ElementRef<'a>,
    selector: &'a Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    root.descendants()
        .skip_while(move |node| node.id() != anchor.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |e| selector.matches(e))
}

/// First element with one of `tags` whose text satisfies `pred`.
pub(crate) fn find_labelled<'a>(
    root: ElementRef<'a>,
    tags: &[&str],
    pred: impl Fn(&str) -> bool,
) -> Option<ElementRef<'a>> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| tags.contains(&e.value().name()))
        .find(|e| pred(&normalize_whitespace(&elem_text(*e))))
}

/// Text with line breaks kept at `<br>` and block boundaries, for fixed-width status dumps.
pub(crate) fn block_text(element: ElementRef) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if matches!(el.name(), "br" | "p" | "div" | "tr" | "li" | "pre") => {
                out.push('\n')
            }
            _ => {}
        }
    }
    out
}

/// Line-preserving text of an HTML page, or the body itself when it is plain text.
pub(crate) fn document_text(body: &str) -> String {
    if body.contains('<') {
        block_text(Html::parse_document(body).root_element())
    } else {
        body.to_string()
    }
}

/// Resolves `href` against the page it was found on.
pub(crate) fn resolve_url(base: &str, href: &str) -> Result<String, url::ParseError> {
    let base = reqwest::Url::parse(base)?;
    Ok(base.join(href.trim())?.to_string())
}

//! Content extraction from fetched markup.
//!
//! The payload is parsed into a detached document, never into the live
//! page. Either a named sub-element is located inside it, or the document
//! body stands in (which also covers bare fragments — the parser wraps
//! them in a simulated body). The result is the replacement markup for the
//! target's children, installed later in a single swap so the live page
//! never shows a half-built state.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Content problems reported by the extractor. These are reported errors,
/// not panics: a missing sub-element is an expected outcome when the server
/// returns a page that lost the expected structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("could not find element '{0}' in downloaded content")]
    ElementNotFound(String),
    #[error("could not interpret content as HTML")]
    Unparseable,
}

/// Parse `markup` in a detached document and produce the replacement markup
/// for the target's children.
///
/// With a `sub_element_id`, the named element is looked up anywhere in the
/// parsed tree. Without one, the parsed body is used when present, else the
/// whole parsed root.
pub fn extract(markup: &str, sub_element_id: Option<&str>) -> Result<String, ExtractError> {
    let document = Html::parse_document(markup);

    match sub_element_id {
        Some(id) => find_by_id(&document, id)
            .map(|el| el.inner_html())
            .ok_or_else(|| ExtractError::ElementNotFound(id.to_string())),
        None => {
            let body = Selector::parse("body").unwrap();
            if let Some(el) = document.select(&body).next() {
                return Ok(el.inner_html());
            }
            // No body wrapper was produced; fall back to the parsed root.
            document
                .tree
                .root()
                .children()
                .find_map(ElementRef::wrap)
                .map(|el| el.inner_html())
                .ok_or(ExtractError::Unparseable)
        }
    }
}

/// Id lookup over the detached tree. A tree walk rather than a CSS selector,
/// so ids that are awkward to escape in selector syntax still resolve.
fn find_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    document
        .tree
        .nodes()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().attr("id") == Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_fragment_falls_back_to_body() {
        let markup = extract("<p>hi</p>", None).unwrap();
        assert_eq!(markup, "<p>hi</p>");
    }

    #[test]
    fn test_full_document_body_extracted() {
        let page = "<html><head><title>t</title></head>\
                    <body><div id=\"main\">content</div></body></html>";
        let markup = extract(page, None).unwrap();
        assert_eq!(markup, "<div id=\"main\">content</div>");
    }

    #[test]
    fn test_named_sub_element_extracted() {
        let page = "<html><body><div id=\"aside\">no</div>\
                    <div id=\"main\"><p>yes</p><p>also</p></div></body></html>";
        let markup = extract(page, Some("main")).unwrap();
        assert_eq!(markup, "<p>yes</p><p>also</p>");
    }

    #[test]
    fn test_named_sub_element_found_in_fragment() {
        // Fragments get a simulated body; the id lookup must still work.
        let markup = extract("<section id=\"x\"><em>inner</em></section>", Some("x")).unwrap();
        assert_eq!(markup, "<em>inner</em>");
    }

    #[test]
    fn test_missing_sub_element_is_reported() {
        let err = extract("<p>hi</p>", Some("x")).unwrap_err();
        assert_eq!(err, ExtractError::ElementNotFound("x".to_string()));
        assert!(err
            .to_string()
            .contains("could not find element 'x' in downloaded content"));
    }

    #[test]
    fn test_empty_payload_yields_empty_markup() {
        // An empty 200 body clears the target rather than erroring.
        assert_eq!(extract("", None).unwrap(), "");
    }

    #[test]
    fn test_text_only_payload_kept_verbatim() {
        assert_eq!(extract("just text", None).unwrap(), "just text");
    }
}

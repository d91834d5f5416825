use crate::error::{Result, TranscriptError};
use scraper::{ElementRef, Html, Node, Selector};

/// Pages with less readable text than this are treated as having none.
pub const MIN_PAGE_TEXT_LEN: usize = 50;

/// Visible body text of an arbitrary page, with whitespace collapsed.
pub fn page_text(markup: &str) -> Result<String> {
    let document = Html::parse_document(markup);
    let selector = Selector::parse("body").map_err(|_| TranscriptError::NoPageText)?;
    let body = document
        .select(&selector)
        .next()
        .ok_or(TranscriptError::NoPageText)?;

    let mut words = Vec::new();
    collect_text(body, &mut words);
    let text = words.join(" ");

    if text.chars().count() < MIN_PAGE_TEXT_LEN {
        return Err(TranscriptError::NoPageText);
    }
    Ok(text)
}

fn collect_text<'a>(element: ElementRef<'a>, words: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => words.extend(text.split_whitespace()),
            Node::Element(el) if matches!(el.name(), "script" | "style" | "noscript" | "template") => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, words);
                }
            }
            _ => {}
        }
    }
}

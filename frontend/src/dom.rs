//! Small lookups shared by the page behaviors. Every lookup answers with an
//! `Option`/empty `Vec` so callers can skip elements a page doesn't have.

use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, NodeList};

pub fn query(document: &Document, selector: &str) -> Option<HtmlElement> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

pub fn query_in(parent: &Element, selector: &str) -> Option<HtmlElement> {
    parent
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

pub fn query_all(document: &Document, selector: &str) -> Vec<HtmlElement> {
    match document.query_selector_all(selector) {
        Ok(list) => collect(&list),
        Err(_) => {
            warn!("bad selector {selector:?}");
            Vec::new()
        }
    }
}

/// Matching descendants of `parent`, in document order.
pub fn query_all_in(parent: &Element, selector: &str) -> Vec<HtmlElement> {
    match parent.query_selector_all(selector) {
        Ok(list) => collect(&list),
        Err(_) => {
            warn!("bad selector {selector:?}");
            Vec::new()
        }
    }
}

fn collect(list: &NodeList) -> Vec<HtmlElement> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

pub fn set_style(el: &HtmlElement, property: &str, value: &str) {
    if el.style().set_property(property, value).is_err() {
        warn!("could not set {property}: {value}");
    }
}

pub fn apply_styles(el: &HtmlElement, styles: &[(String, String)]) {
    for (property, value) in styles {
        set_style(el, property, value);
    }
}

use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, MouseEvent, ScrollBehavior, ScrollToOptions, Window};

use crate::config::SmoothScrollConfig;
use crate::dom;

/// Where to scroll so the target sits just under the fixed header.
pub fn destination(target_top: f64, header_height: f64, margin: f64) -> f64 {
    target_top - header_height - margin
}

/// The id part of an in-page link (`"#team"` -> `"team"`).
pub fn fragment_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

pub fn init(window: &Window, document: &Document, header_selector: &str, config: &SmoothScrollConfig) {
    let anchors = dom::query_all(document, &config.anchor_selector);
    if anchors.is_empty() {
        return;
    }

    for anchor in anchors {
        let (window, document) = (window.clone(), document.clone());
        let header_selector = header_selector.to_string();
        let margin = config.margin_px;
        let link = anchor.clone();

        let on_click = Closure::wrap(Box::new(move |e: MouseEvent| {
            e.prevent_default();
            let Some(id) = link.get_attribute("href") else {
                return;
            };
            let Some(target) = fragment_id(&id)
                .and_then(|id| document.get_element_by_id(id))
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                debug!("smooth scroll: no element for {id:?}");
                return;
            };
            let header_height = dom::query(&document, &header_selector)
                .map(|h| f64::from(h.offset_height()))
                .unwrap_or(0.0);

            let top = destination(f64::from(target.offset_top()), header_height, margin);
            let options = ScrollToOptions::new();
            options.set_top(top);
            options.set_behavior(ScrollBehavior::Smooth);
            window.scroll_to_with_scroll_to_options(&options);
        }) as Box<dyn FnMut(MouseEvent)>);

        let _ = anchor.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
        on_click.forget();
    }
}

//! Hover emphasis on the consciousness diagram, the timeline and the
//! consciousness model.

use std::rc::Rc;

use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, MouseEvent};

use crate::config::HoverConfig;
use crate::dom;

const CENTER_SHADOW_ACTIVE: &str = "0 15px 40px rgba(102, 126, 234, 0.4)";
const CENTER_SHADOW_IDLE: &str = "0 10px 30px rgba(0, 0, 0, 0.2)";
const CENTER_TRANSFORM_ACTIVE: &str = "translate(-50%, -50%) scale(1.1)";
const CENTER_TRANSFORM_IDLE: &str = "translate(-50%, -50%) scale(1)";
const DIMMED_OPACITY: &str = "0.5";

/// Opacity of each diagram node while `hovered` is under the pointer
/// (`None` once the pointer left).
pub fn node_opacities(count: usize, hovered: Option<usize>) -> Vec<&'static str> {
    (0..count)
        .map(|i| match hovered {
            Some(h) if h != i => DIMMED_OPACITY,
            _ => "1",
        })
        .collect()
}

fn on(el: &HtmlElement, event: &str, handler: impl FnMut(MouseEvent) + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(MouseEvent)>);
    let _ = el.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn diagram(document: &Document, config: &HoverConfig) {
    let nodes = Rc::new(dom::query_all(document, &config.component_node_selector));
    if nodes.is_empty() {
        return;
    }
    let Some(center) = dom::query(document, &config.center_node_selector) else {
        debug!("hover: diagram without a center node");
        return;
    };

    let paint = {
        let nodes = nodes.clone();
        Rc::new(move |hovered: Option<usize>| {
            let (shadow, transform) = if hovered.is_some() {
                (CENTER_SHADOW_ACTIVE, CENTER_TRANSFORM_ACTIVE)
            } else {
                (CENTER_SHADOW_IDLE, CENTER_TRANSFORM_IDLE)
            };
            dom::set_style(&center, "box-shadow", shadow);
            dom::set_style(&center, "transform", transform);
            for (node, opacity) in nodes.iter().zip(node_opacities(nodes.len(), hovered)) {
                dom::set_style(node, "opacity", opacity);
            }
        })
    };

    for (index, node) in nodes.iter().enumerate() {
        let enter = paint.clone();
        on(node, "mouseenter", move |_| enter(Some(index)));
        let leave = paint.clone();
        on(node, "mouseleave", move |_| leave(None));
    }
}

fn timeline(document: &Document, config: &HoverConfig) {
    for item in dom::query_all(document, &config.timeline_item_selector) {
        let el = item.clone();
        on(&item, "mouseenter", move |_| {
            dom::set_style(&el, "transform", "translateX(10px) scale(1.02)")
        });
        let el = item.clone();
        on(&item, "mouseleave", move |_| {
            dom::set_style(&el, "transform", "translateX(0) scale(1)")
        });
    }
}

fn model(document: &Document, config: &HoverConfig) {
    let Some(model) = dom::query(document, &config.model_selector) else {
        return;
    };
    let parts = Rc::new([
        (config.model_core_selector.clone(), "scale(1.1)", "scale(1)"),
        (
            config.model_inner_selector.clone(),
            "translateX(-10px) scale(1.05)",
            "translateX(0) scale(1)",
        ),
        (
            config.model_outer_selector.clone(),
            "translateX(10px) scale(1.05)",
            "translateX(0) scale(1)",
        ),
    ]);

    for entering in [true, false] {
        let (el, parts) = (model.clone(), parts.clone());
        let event = if entering { "mouseenter" } else { "mouseleave" };
        on(&model, event, move |_| {
            for (selector, active, idle) in parts.iter() {
                if let Some(part) = dom::query_in(&el, selector) {
                    dom::set_style(&part, "transform", if entering { active } else { idle });
                }
            }
        });
    }
}

pub fn init(document: &Document, config: &HoverConfig) {
    diagram(document, config);
    timeline(document, config);
    model(document, config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hovering_dims_every_other_node() {
        assert_eq!(node_opacities(3, Some(1)), vec!["0.5", "1", "0.5"]);
    }

    #[test]
    fn leaving_restores_all() {
        assert_eq!(node_opacities(3, None), vec!["1", "1", "1"]);
        assert!(node_opacities(0, Some(0)).is_empty());
    }
}

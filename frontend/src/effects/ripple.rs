use gloo_timers::callback::Timeout;
use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, MouseEvent};

use crate::config::RippleConfig;
use crate::dom;

/// Size and top-left corner of a ripple, relative to its button.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ripple {
    pub size: f64,
    pub x: f64,
    pub y: f64,
}

impl Ripple {
    /// A circle as large as the button's larger side, centered on the
    /// pointer. `left`/`top`/`width`/`height` are the button's client rect.
    pub fn at(left: f64, top: f64, width: f64, height: f64, client_x: f64, client_y: f64) -> Self {
        let size = width.max(height);
        Self {
            size,
            x: client_x - left - size / 2.0,
            y: client_y - top - size / 2.0,
        }
    }
}

fn spawn(document: &Document, button: &HtmlElement, e: &MouseEvent, config: &RippleConfig) {
    let rect = button.get_bounding_client_rect();
    let ripple = Ripple::at(
        rect.left(),
        rect.top(),
        rect.width(),
        rect.height(),
        f64::from(e.client_x()),
        f64::from(e.client_y()),
    );

    let span = match document.create_element("span") {
        Ok(el) => el.unchecked_into::<HtmlElement>(),
        Err(e) => {
            warn!("ripple: create_element failed: {e:?}");
            return;
        }
    };
    let size = format!("{}px", ripple.size);
    dom::set_style(&span, "width", &size);
    dom::set_style(&span, "height", &size);
    dom::set_style(&span, "left", &format!("{}px", ripple.x));
    dom::set_style(&span, "top", &format!("{}px", ripple.y));
    let _ = span.class_list().add_1(&config.class);

    if button.append_child(&span).is_err() {
        return;
    }
    Timeout::new(config.duration_ms, move || span.remove()).forget();
}

pub fn init(document: &Document, config: &RippleConfig) {
    for button in dom::query_all(document, &config.button_selector) {
        let (document, config, target) = (document.clone(), config.clone(), button.clone());
        let on_click = Closure::wrap(Box::new(move |e: MouseEvent| {
            spawn(&document, &target, &e, &config);
        }) as Box<dyn FnMut(MouseEvent)>);
        let _ = button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
        on_click.forget();
    }
}

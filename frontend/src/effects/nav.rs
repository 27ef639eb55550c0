use std::cell::Cell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, MouseEvent};

use crate::config::NavConfig;
use crate::dom;

/// Open/closed state of the mobile menu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavState {
    open: bool,
}

impl NavState {
    pub fn is_open(self) -> bool {
        self.open
    }

    /// Trigger activation. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Link activation always leaves the menu closed.
    pub fn close(&mut self) {
        self.open = false;
    }
}

fn render(state: NavState, menu: &HtmlElement, trigger: &HtmlElement, class: &str) {
    let _ = menu.class_list().toggle_with_force(class, state.is_open());
    let _ = trigger.class_list().toggle_with_force(class, state.is_open());
}

pub fn init(document: &Document, config: &NavConfig) {
    let (Some(trigger), Some(menu)) = (
        dom::query(document, &config.trigger_selector),
        dom::query(document, &config.menu_selector),
    ) else {
        debug!("nav: no menu on this page");
        return;
    };

    let state = Rc::new(Cell::new(NavState::default()));

    let on_toggle = {
        let state = state.clone();
        let (menu, trigger_el, class) = (menu.clone(), trigger.clone(), config.active_class.clone());
        Closure::wrap(Box::new(move |_e: MouseEvent| {
            let mut nav = state.get();
            nav.toggle();
            state.set(nav);
            render(nav, &menu, &trigger_el, &class);
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    let _ = trigger.add_event_listener_with_callback("click", on_toggle.as_ref().unchecked_ref());
    on_toggle.forget();

    for link in dom::query_all(document, &config.link_selector) {
        let state = state.clone();
        let (menu, trigger, class) = (menu.clone(), trigger.clone(), config.active_class.clone());
        let on_link = Closure::wrap(Box::new(move |_e: MouseEvent| {
            let mut nav = state.get();
            nav.close();
            state.set(nav);
            render(nav, &menu, &trigger, &class);
        }) as Box<dyn FnMut(MouseEvent)>);
        let _ = link.add_event_listener_with_callback("click", on_link.as_ref().unchecked_ref());
        on_link.forget();
    }
}

use std::cell::RefCell;

use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Window};

use crate::config::HeaderConfig;
use crate::dom;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Background {
    Top,
    Scrolled,
}

/// What one scroll event changes on the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderUpdate {
    pub visibility: Visibility,
    /// `Some` only when the background has to be swapped.
    pub background: Option<Background>,
}

/// Remembers the last scroll offset so each event can tell which way the
/// page moved.
#[derive(Debug)]
pub struct HeaderTracker {
    last_offset: f64,
    background: Background,
    background_offset: f64,
}

impl HeaderTracker {
    pub fn new(background_offset: f64) -> Self {
        Self {
            last_offset: 0.0,
            background: Background::Top,
            background_offset,
        }
    }

    pub fn on_scroll(&mut self, offset: f64) -> HeaderUpdate {
        let visibility = if offset > self.last_offset {
            Visibility::Hidden
        } else {
            Visibility::Shown
        };
        self.last_offset = offset;

        let wanted = if offset > self.background_offset {
            Background::Scrolled
        } else {
            Background::Top
        };
        let background = (wanted != self.background).then(|| {
            self.background = wanted;
            wanted
        });

        HeaderUpdate {
            visibility,
            background,
        }
    }
}

thread_local! {
    static TRACKER: RefCell<Option<HeaderTracker>> = const { RefCell::new(None) };
}

fn scroll_offset(window: &Window, document: &Document) -> f64 {
    match window.page_y_offset() {
        Ok(y) => y,
        Err(_) => document
            .document_element()
            .map(|el| f64::from(el.scroll_top()))
            .unwrap_or(0.0),
    }
}

pub fn init(window: &Window, document: &Document, config: &HeaderConfig) {
    let Some(header) = dom::query(document, &config.selector) else {
        debug!("header: no {:?} on this page", config.selector);
        return;
    };

    let already = TRACKER.with(|t| {
        let mut t = t.borrow_mut();
        let already = t.is_some();
        t.get_or_insert_with(|| HeaderTracker::new(config.background_offset_px));
        already
    });
    if already {
        return;
    }

    let config = config.clone();
    let (window_clone, document) = (window.clone(), document.clone());
    let scroll_callback = Closure::wrap(Box::new(move || {
        let offset = scroll_offset(&window_clone, &document);
        let Some(update) = TRACKER.with(|t| t.borrow_mut().as_mut().map(|t| t.on_scroll(offset)))
        else {
            return;
        };

        let transform = match update.visibility {
            Visibility::Hidden => &config.hidden_transform,
            Visibility::Shown => &config.shown_transform,
        };
        dom::set_style(&header, "transform", transform);

        if let Some(background) = update.background {
            debug!("header: background {background:?} at {offset}");
            let color = match background {
                Background::Scrolled => &config.scrolled_background,
                Background::Top => &config.top_background,
            };
            dom::set_style(&header, "background", color);
        }
    }) as Box<dyn FnMut()>);

    let _ = window.add_event_listener_with_callback("scroll", scroll_callback.as_ref().unchecked_ref());
    scroll_callback.forget();
}

use std::cell::RefCell;

use log::{debug, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, Window};

mod config;
mod dom;
mod styles;
mod reveal {
    pub mod observer;
    pub mod scheduler;
}
mod effects {
    pub mod header;
    pub mod hover;
    pub mod nav;
    pub mod ripple;
    pub mod smooth_scroll;
    pub mod team_cards;
    pub mod typewriter;
}

use config::SiteConfig;
use reveal::observer::RevealBinding;

/// Everything that has to stay alive for as long as the page is open.
struct Page {
    _slides: Option<RevealBinding>,
    _cards: Option<RevealBinding>,
}

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

fn start(window: &Window, document: &Document) {
    if PAGE.with(|page| page.borrow().is_some()) {
        debug!("page behaviors already wired");
        return;
    }

    let config = SiteConfig::load(document);

    effects::nav::init(document, &config.nav);
    effects::smooth_scroll::init(window, document, &config.header.selector, &config.smooth_scroll);
    effects::header::init(window, document, &config.header);

    if dom::query(document, &config.slides.target_selector).is_some() {
        styles::inject(document, &styles::blocks_for(true));
    }

    // slides and cards each get their own observer and threshold
    let slides = RevealBinding::attach(document, &config.slides, "slides");
    let cards = RevealBinding::attach(document, &config.cards, "cards");

    effects::hover::init(document, &config.hover);
    effects::typewriter::init(document, &config.typewriter);
    effects::team_cards::init(document, &config.team_cards);
    effects::ripple::init(document, &config.ripple);

    PAGE.with(|page| {
        *page.borrow_mut() = Some(Page {
            _slides: slides,
            _cards: cards,
        })
    });
    info!("page behaviors wired");
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    let Some(window) = window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    // styles go in right away so nothing flashes before the handlers land
    styles::inject(&document, &styles::blocks_for(false));

    if document.ready_state() == "loading" {
        let (win, doc) = (window.clone(), document.clone());
        let on_ready = Closure::<dyn FnMut()>::once(move || start(&win, &doc));
        let _ = document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref());
        on_ready.forget();
    } else {
        start(&window, &document);
    }
}

use web_sys::Document;

use crate::config::TeamCardsConfig;
use crate::dom;

/// CSS `animation-delay` for the card at `index`.
pub fn animation_delay(index: usize, step_secs: f64) -> String {
    format!("{}ms", (index as f64 * step_secs * 1000.0).round())
}

/// Starts the `fade-in-up` keyframes on each team card, one step apart.
pub fn init(document: &Document, config: &TeamCardsConfig) {
    for (index, card) in dom::query_all(document, &config.selector).iter().enumerate() {
        dom::set_style(card, "animation-delay", &animation_delay(index, config.step_secs));
        let _ = card.class_list().add_1(&config.class);
    }
}

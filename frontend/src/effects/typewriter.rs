use gloo_timers::future::TimeoutFuture;
use log::debug;
use wasm_bindgen_futures::spawn_local;
use web_sys::Document;

use crate::config::TypewriterConfig;
use crate::dom;

/// Walks a string one character at a time, yielding the text typed so far.
#[derive(Debug)]
pub struct Typewriter {
    text: String,
    typed: usize,
}

impl Typewriter {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            typed: 0,
        }
    }

    #[cfg(test)]
    pub fn is_done(&self) -> bool {
        self.typed >= self.text.len()
    }

    /// Types the next character. `None` once the whole text is out.
    pub fn advance(&mut self) -> Option<&str> {
        let next = self.text[self.typed..].chars().next()?;
        self.typed += next.len_utf8();
        Some(&self.text[..self.typed])
    }
}

pub fn init(document: &Document, config: &TypewriterConfig) {
    let Some(title) = dom::query(document, &config.selector) else {
        return;
    };
    let text = title.text_content().unwrap_or_default();
    title.set_text_content(Some(""));
    dom::set_style(&title, "border-right", &config.cursor_border);

    let config = config.clone();
    spawn_local(async move {
        let mut typewriter = Typewriter::new(text);
        TimeoutFuture::new(config.start_delay_ms).await;
        while let Some(typed) = typewriter.advance() {
            title.set_text_content(Some(typed));
            TimeoutFuture::new(config.char_interval_ms).await;
        }
        debug!("typewriter: done");
        // the cursor blinks a little longer before going away
        TimeoutFuture::new(config.cursor_linger_ms).await;
        dom::set_style(&title, "border-right", "none");
    });
}

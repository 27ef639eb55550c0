use log::{warn, Level};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use web_sys::Document;

use crate::reveal::scheduler::Threshold;

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // chatty when running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Id of the optional inline JSON block a page can use to override defaults.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

/// Largest stagger unit accepted from a page override.
pub const MAX_UNIT_MS: u32 = 10_000;

/// Inline style declarations as (property, value) pairs.
pub type Styles = Vec<(String, String)>;

fn styles(pairs: &[(&str, &str)]) -> Styles {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SiteConfig {
    pub slides: RevealConfig,
    pub cards: RevealConfig,
    pub nav: NavConfig,
    pub header: HeaderConfig,
    pub smooth_scroll: SmoothScrollConfig,
    pub typewriter: TypewriterConfig,
    pub ripple: RippleConfig,
    pub hover: HoverConfig,
    pub team_cards: TeamCardsConfig,
}

/// One reveal scheduler: which elements to observe and what "revealed"
/// looks like for them and their staggered children.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RevealConfig {
    pub target_selector: String,
    pub threshold: f64,
    pub root_margin: Option<String>,
    /// Applied at startup, before observation begins.
    pub hidden_style: Styles,
    pub revealed_class: Option<String>,
    pub revealed_style: Styles,
    pub groups: Vec<StaggerConfig>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StaggerConfig {
    pub selector: String,
    pub unit_ms: u32,
    pub revealed_style: Styles,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct NavConfig {
    pub menu_selector: String,
    pub trigger_selector: String,
    pub link_selector: String,
    pub active_class: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct HeaderConfig {
    pub selector: String,
    pub background_offset_px: f64,
    pub top_background: String,
    pub scrolled_background: String,
    pub hidden_transform: String,
    pub shown_transform: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SmoothScrollConfig {
    pub anchor_selector: String,
    pub margin_px: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TypewriterConfig {
    pub selector: String,
    pub start_delay_ms: u32,
    pub char_interval_ms: u32,
    pub cursor_linger_ms: u32,
    pub cursor_border: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RippleConfig {
    pub button_selector: String,
    pub class: String,
    pub duration_ms: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct HoverConfig {
    pub component_node_selector: String,
    pub center_node_selector: String,
    pub timeline_item_selector: String,
    pub model_selector: String,
    pub model_core_selector: String,
    pub model_inner_selector: String,
    pub model_outer_selector: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TeamCardsConfig {
    pub selector: String,
    pub class: String,
    pub step_secs: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            slides: RevealConfig {
                target_selector: ".slide".into(),
                threshold: 0.3,
                root_margin: None,
                hidden_style: Vec::new(),
                revealed_class: Some("animate-in".into()),
                revealed_style: Vec::new(),
                groups: vec![
                    StaggerConfig {
                        selector: ".timeline-item".into(),
                        unit_ms: 200,
                        revealed_style: styles(&[("opacity", "1"), ("transform", "translateX(0)")]),
                    },
                    StaggerConfig {
                        selector: ".relevance-card".into(),
                        unit_ms: 150,
                        revealed_style: styles(&[
                            ("opacity", "1"),
                            ("transform", "translateY(0) scale(1)"),
                        ]),
                    },
                ],
            },
            cards: RevealConfig {
                target_selector: ".team-card, .stat-card, .research-card".into(),
                threshold: 0.1,
                root_margin: Some("0px 0px -100px 0px".into()),
                hidden_style: styles(&[
                    ("opacity", "0"),
                    ("transform", "translateY(30px)"),
                    ("transition", "all 0.6s ease"),
                ]),
                revealed_class: None,
                revealed_style: styles(&[("opacity", "1"), ("transform", "translateY(0)")]),
                groups: Vec::new(),
            },
            nav: NavConfig::default(),
            header: HeaderConfig::default(),
            smooth_scroll: SmoothScrollConfig::default(),
            typewriter: TypewriterConfig::default(),
            ripple: RippleConfig::default(),
            hover: HoverConfig::default(),
            team_cards: TeamCardsConfig::default(),
        }
    }
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            selector: String::new(),
            unit_ms: 200,
            revealed_style: styles(&[("opacity", "1"), ("transform", "none")]),
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            menu_selector: ".nav-menu".into(),
            trigger_selector: ".hamburger".into(),
            link_selector: ".nav-link".into(),
            active_class: "active".into(),
        }
    }
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            selector: ".header".into(),
            background_offset_px: 50.0,
            top_background: "rgba(7, 7, 7, 0.95)".into(),
            scrolled_background: "rgba(51, 44, 44, 0.98)".into(),
            hidden_transform: "translateY(-100%)".into(),
            shown_transform: "translateY(0)".into(),
        }
    }
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            anchor_selector: "a[href^=\"#\"]".into(),
            margin_px: 20.0,
        }
    }
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            selector: ".hero-text h1".into(),
            start_delay_ms: 500,
            char_interval_ms: 100,
            cursor_linger_ms: 1000,
            cursor_border: "3px solid white".into(),
        }
    }
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            button_selector: ".btn, .card-btn".into(),
            class: "ripple".into(),
            duration_ms: 600,
        }
    }
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            component_node_selector: ".component-node".into(),
            center_node_selector: ".center-node".into(),
            timeline_item_selector: ".timeline-item".into(),
            model_selector: ".consciousness-model".into(),
            model_core_selector: ".consciousness-core".into(),
            model_inner_selector: ".inner-experience".into(),
            model_outer_selector: ".outer-experience".into(),
        }
    }
}

impl Default for TeamCardsConfig {
    fn default() -> Self {
        Self {
            selector: ".team-card".into(),
            class: "fade-in-up".into(),
            step_secs: 0.1,
        }
    }
}

impl SiteConfig {
    /// Parses an override document. Objects merge into the defaults key by
    /// key, anything else (numbers, strings, arrays) replaces the default.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let patch: Value = serde_json::from_str(raw)?;
        let mut merged = serde_json::to_value(Self::default())?;
        merge(&mut merged, patch);
        serde_json::from_value::<Self>(merged).map(Self::validated)
    }

    /// Reads the page's inline override block, falling back to defaults
    /// when it is missing or malformed.
    pub fn load(document: &Document) -> Self {
        let Some(raw) = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        else {
            return Self::default();
        };

        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring #{CONFIG_ELEMENT_ID}: {e}");
                Self::default()
            }
        }
    }

    /// Replaces values the schedulers cannot honor with the defaults.
    fn validated(mut self) -> Self {
        let defaults = Self::default();
        self.slides.sanitize(&defaults.slides, "slides");
        self.cards.sanitize(&defaults.cards, "cards");
        self
    }
}

fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

impl RevealConfig {
    pub fn threshold(&self) -> Threshold {
        Threshold::new(self.threshold).unwrap_or_default()
    }

    fn sanitize(&mut self, fallback: &RevealConfig, name: &str) {
        if Threshold::new(self.threshold).is_none() {
            warn!(
                "{name}: threshold {} outside (0, 1], using {}",
                self.threshold, fallback.threshold
            );
            self.threshold = fallback.threshold;
        }
        for group in &mut self.groups {
            // equal delays would leave sibling order up to the timer queue
            if group.unit_ms == 0 {
                warn!("{name}: stagger unit for {:?} is zero, using 1ms", group.selector);
                group.unit_ms = 1;
            } else if group.unit_ms > MAX_UNIT_MS {
                warn!(
                    "{name}: stagger unit {}ms for {:?} too long, using {MAX_UNIT_MS}ms",
                    group.unit_ms, group.selector
                );
                group.unit_ms = MAX_UNIT_MS;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_shipped_page() {
        let config = SiteConfig::default();
        assert_eq!(config.slides.threshold, 0.3);
        let units: Vec<u32> = config.slides.groups.iter().map(|g| g.unit_ms).collect();
        assert_eq!(units, vec![200, 150]);
        assert_eq!(config.cards.threshold, 0.1);
        assert_eq!(config.cards.root_margin.as_deref(), Some("0px 0px -100px 0px"));
        assert_eq!(config.header.background_offset_px, 50.0);
        assert_eq!(config.smooth_scroll.margin_px, 20.0);
    }

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(SiteConfig::from_json("{}").unwrap(), SiteConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = SiteConfig::from_json(
            r#"{ "header": { "background_offset_px": 120 }, "ripple": { "duration_ms": 900 } }"#,
        )
        .unwrap();
        assert_eq!(config.header.background_offset_px, 120.0);
        assert_eq!(config.header.selector, ".header");
        assert_eq!(config.ripple.duration_ms, 900);
        assert_eq!(config.ripple.class, "ripple");
        assert_eq!(config.slides, SiteConfig::default().slides);
    }

    #[test]
    fn styles_deserialize_from_pairs() {
        let config = SiteConfig::from_json(
            r#"{ "cards": { "revealed_style": [["opacity", "0.9"]] } }"#,
        )
        .unwrap();
        assert_eq!(
            config.cards.revealed_style,
            vec![("opacity".to_string(), "0.9".to_string())]
        );
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = SiteConfig::from_json(
            r#"{ "slides": { "threshold": 1.5, "groups": [{ "selector": ".x", "unit_ms": 0 }] },
                 "cards": { "threshold": 0 } }"#,
        )
        .unwrap();
        assert_eq!(config.slides.threshold, 0.3);
        assert_eq!(config.slides.groups[0].unit_ms, 1);
        assert_eq!(config.cards.threshold, 0.1);
        assert_eq!(config.cards.threshold().get(), 0.1);
    }

    #[test]
    fn huge_stagger_unit_is_capped() {
        let config = SiteConfig::from_json(
            r#"{ "slides": { "groups": [{ "selector": ".x", "unit_ms": 3000000000 }] } }"#,
        )
        .unwrap();
        let unit = config.slides.groups[0].unit_ms;
        assert_eq!(unit, MAX_UNIT_MS);
        // a long slide keeps its items in order under the browser timer cap
        let last = crate::reveal::scheduler::stagger_delay(unit, 199_999);
        assert!(last > crate::reveal::scheduler::stagger_delay(unit, 199_998));
    }

    #[test]
    fn nested_override_keeps_its_own_defaults() {
        let config = SiteConfig::from_json(r#"{ "cards": { "threshold": 0.25 } }"#).unwrap();
        assert_eq!(config.cards.threshold, 0.25);
        assert_eq!(config.cards.target_selector, ".team-card, .stat-card, .research-card");
        assert!(config.cards.groups.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SiteConfig::from_json("{ not json").is_err());
    }
}

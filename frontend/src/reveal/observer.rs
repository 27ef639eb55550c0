//! Binds a [`RevealScheduler`] to the live document.
//!
//! One `IntersectionObserver` per scheduler feeds visibility batches in, a
//! `MutationObserver` notices targets leaving the document, and every
//! staggered item reveal is a keyed [`Timeout`] so it can be cancelled by
//! dropping it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Array;
use web_sys::{
    Document, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, MutationObserver, MutationObserverInit,
};

use super::scheduler::{
    GroupLayout, RevealAction, RevealScheduler, StaggerKey, TargetId, TargetLayout,
    VisibilityEntry,
};
use crate::config::{RevealConfig, Styles};
use crate::dom;

struct Group {
    items: Vec<HtmlElement>,
    revealed_style: Styles,
}

struct Target {
    element: HtmlElement,
    groups: Vec<Group>,
}

struct State {
    name: &'static str,
    scheduler: RevealScheduler,
    targets: Vec<Target>,
    revealed_class: Option<String>,
    revealed_style: Styles,
    timers: HashMap<StaggerKey, Timeout>,
}

impl State {
    fn reveal_target(&self, id: TargetId) {
        let Some(target) = self.targets.get(id.0) else {
            return;
        };
        if let Some(class) = &self.revealed_class {
            let _ = target.element.class_list().add_1(class);
        }
        dom::apply_styles(&target.element, &self.revealed_style);
    }

    fn reveal_item(&mut self, key: StaggerKey) {
        if !self.scheduler.fire(key) {
            return;
        }
        let group = self
            .targets
            .get(key.target.0)
            .and_then(|t| t.groups.get(key.group));
        if let Some(group) = group {
            if let Some(item) = group.items.get(key.index) {
                debug!("{}: item {key}", self.name);
                dom::apply_styles(item, &group.revealed_style);
            }
        }
    }

    /// Drops handles of timers that already went off.
    fn prune_timers(&mut self) {
        let State {
            scheduler, timers, ..
        } = self;
        timers.retain(|key, _| scheduler.is_pending(*key));
    }
}

/// A live reveal scheduler. Dropping it disconnects both observers and
/// cancels every pending item reveal.
pub struct RevealBinding {
    state: Rc<RefCell<State>>,
    observer: IntersectionObserver,
    mutations: Option<MutationObserver>,
    _on_intersect: Closure<dyn FnMut(Array, IntersectionObserver)>,
    _on_mutation: Option<Closure<dyn FnMut(Array, MutationObserver)>>,
}

impl RevealBinding {
    /// Observes every element matching `config.target_selector`.
    ///
    /// Returns `None` when the page has no such element or the observer
    /// can't be created. Nothing is revealed here, even for targets that
    /// are already on screen: the observer's first callback does that.
    pub fn attach(document: &Document, config: &RevealConfig, name: &'static str) -> Option<Self> {
        let elements = dom::query_all(document, &config.target_selector);
        if elements.is_empty() {
            debug!("{name}: no {:?} on this page", config.target_selector);
            return None;
        }

        let mut layouts = Vec::with_capacity(elements.len());
        let mut targets = Vec::with_capacity(elements.len());
        for element in elements {
            let groups: Vec<Group> = config
                .groups
                .iter()
                .map(|g| Group {
                    items: dom::query_all_in(&element, &g.selector),
                    revealed_style: g.revealed_style.clone(),
                })
                .collect();
            layouts.push(TargetLayout {
                groups: config
                    .groups
                    .iter()
                    .zip(&groups)
                    .map(|(g, found)| GroupLayout {
                        unit_ms: g.unit_ms,
                        len: found.items.len(),
                    })
                    .collect(),
            });
            targets.push(Target { element, groups });
        }

        let threshold = config.threshold();
        let state = Rc::new(RefCell::new(State {
            name,
            scheduler: RevealScheduler::new(threshold, layouts),
            targets,
            revealed_class: config.revealed_class.clone(),
            revealed_style: config.revealed_style.clone(),
            timers: HashMap::new(),
        }));

        let on_intersect = {
            let weak = Rc::downgrade(&state);
            Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
                move |entries: Array, observer: IntersectionObserver| {
                    if let Some(state) = weak.upgrade() {
                        handle_entries(&state, &entries, &observer);
                    }
                },
            )
        };

        let init = IntersectionObserverInit::new();
        let steps: Array = threshold
            .observer_steps()
            .into_iter()
            .map(JsValue::from_f64)
            .collect();
        init.set_threshold(&steps);
        if let Some(margin) = &config.root_margin {
            init.set_root_margin(margin);
        }
        let created =
            IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &init);
        let observer = hide_and_observe(created, &state.borrow().targets, |observer, target| {
            dom::apply_styles(&target.element, &config.hidden_style);
            observer.observe(&target.element);
        });
        let Some(observer) = observer else {
            warn!("{name}: IntersectionObserver unavailable, targets left as they are");
            return None;
        };

        let (mutations, on_mutation) = match watch_removals(document, &state, &observer) {
            Some((mutations, closure)) => (Some(mutations), Some(closure)),
            None => (None, None),
        };

        info!(
            "{name}: observing {} targets at threshold {}",
            state.borrow().targets.len(),
            threshold.get()
        );

        Some(Self {
            state,
            observer,
            mutations,
            _on_intersect: on_intersect,
            _on_mutation: on_mutation,
        })
    }
}

impl Drop for RevealBinding {
    fn drop(&mut self) {
        self.observer.disconnect();
        if let Some(mutations) = &self.mutations {
            mutations.disconnect();
        }
        self.state.borrow_mut().timers.clear();
    }
}

/// Runs `watch` on every target once the observer exists. Targets are only
/// hidden in there, so a failed observer leaves them untouched.
fn hide_and_observe<O, E: std::fmt::Debug, T>(
    created: Result<O, E>,
    targets: &[T],
    mut watch: impl FnMut(&O, &T),
) -> Option<O> {
    let observer = match created {
        Ok(observer) => observer,
        Err(e) => {
            debug!("observer construction failed: {e:?}");
            return None;
        }
    };
    for target in targets {
        watch(&observer, target);
    }
    Some(observer)
}

fn handle_entries(shared: &Rc<RefCell<State>>, entries: &Array, observer: &IntersectionObserver) {
    let mut state = shared.borrow_mut();

    let batch: Vec<VisibilityEntry> = entries
        .iter()
        .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
        .filter_map(|entry| {
            let element = entry.target();
            let index = state.targets.iter().position(|t| *t.element == element)?;
            Some(VisibilityEntry {
                target: TargetId(index),
                intersecting: entry.is_intersecting(),
                ratio: entry.intersection_ratio(),
                root_coverage: root_coverage(&entry),
            })
        })
        .collect();

    let actions = state.scheduler.on_visibility(&batch);
    if actions.is_empty() {
        return;
    }
    state.prune_timers();

    for action in actions {
        match action {
            RevealAction::RevealTarget(id) => {
                debug!("{}: revealing target {}", state.name, id.0);
                state.reveal_target(id);
                // revealed is terminal
                if let Some(target) = state.targets.get(id.0) {
                    observer.unobserve(&target.element);
                }
            }
            RevealAction::Schedule { key, delay_ms } => {
                let weak: Weak<RefCell<State>> = Rc::downgrade(shared);
                let timeout = Timeout::new(delay_ms, move || {
                    if let Some(state) = weak.upgrade() {
                        state.borrow_mut().reveal_item(key);
                    }
                });
                state.timers.insert(key, timeout);
            }
        }
    }
}

/// Share of the viewport height the target currently fills.
fn root_coverage(entry: &IntersectionObserverEntry) -> f64 {
    let Some(root) = entry.root_bounds() else {
        return 0.0;
    };
    let height = root.height();
    if height <= 0.0 {
        return 0.0;
    }
    (entry.intersection_rect().height() / height).min(1.0)
}

fn watch_removals(
    document: &Document,
    state: &Rc<RefCell<State>>,
    observer: &IntersectionObserver,
) -> Option<(MutationObserver, Closure<dyn FnMut(Array, MutationObserver)>)> {
    let body = document.body()?;

    let closure = {
        let weak = Rc::downgrade(state);
        let observer = observer.clone();
        Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |_records: Array, _mutations: MutationObserver| {
                if let Some(state) = weak.upgrade() {
                    tear_down_detached(&mut state.borrow_mut(), &observer);
                }
            },
        )
    };

    let mutations = match MutationObserver::new(closure.as_ref().unchecked_ref()) {
        Ok(mutations) => mutations,
        Err(e) => {
            warn!("MutationObserver unavailable, removed targets won't be torn down: {e:?}");
            return None;
        }
    };
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    if let Err(e) = mutations.observe_with_options(&body, &init) {
        warn!("could not watch document body: {e:?}");
        return None;
    }

    Some((mutations, closure))
}

fn tear_down_detached(state: &mut State, observer: &IntersectionObserver) {
    let detached: Vec<TargetId> = state
        .targets
        .iter()
        .enumerate()
        .map(|(i, t)| (TargetId(i), t))
        .filter(|(id, t)| !t.element.is_connected() && !state.scheduler.is_torn_down(*id))
        .map(|(id, _)| id)
        .collect();

    for id in detached {
        let cancelled = state.scheduler.tear_down(id);
        for key in &cancelled {
            // dropping the handle clears the browser timer
            state.timers.remove(key);
        }
        observer.unobserve(&state.targets[id.0].element);
        debug!(
            "{}: target {} left the document, cancelled {} reveals",
            state.name,
            id.0,
            cancelled.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_observer_hides_nothing() {
        let mut hidden = Vec::new();
        let created: Result<(), &str> = Err("IntersectionObserver is not defined");
        let observer = hide_and_observe(created, &[1, 2, 3], |_, t| hidden.push(*t));
        assert!(observer.is_none());
        assert!(hidden.is_empty());
    }

    #[test]
    fn every_target_is_hidden_once_observed() {
        let mut hidden = Vec::new();
        let created: Result<&str, ()> = Ok("observer");
        let observer = hide_and_observe(created, &[1, 2, 3], |o, t| hidden.push((*o, *t)));
        assert_eq!(observer, Some("observer"));
        assert_eq!(hidden, vec![("observer", 1), ("observer", 2), ("observer", 3)]);
    }
}

//! Scroll-triggered reveal state machine.
//!
//! [`RevealScheduler`] is a pure reactor: it is fed batches of
//! [`VisibilityEntry`] notifications and answers with [`RevealAction`]s that
//! the DOM layer applies. Keeping the platform out of here lets the ordering
//! and idempotence rules be tested without a browser.

use std::fmt;

/// Slack allowed when comparing a reported intersection ratio against the
/// threshold. Browsers report the ratio at the crossing, which can land a
/// hair under the configured value.
const RATIO_EPSILON: f64 = 1e-3;

/// Minimum visible fraction of a target before it reveals. Always in (0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(ratio: f64) -> Option<Self> {
        (ratio > 0.0 && ratio <= 1.0).then_some(Self(ratio))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// A target counts as seen once enough of itself is visible, or, for
    /// targets too tall to ever reach the ratio, once it fills enough of
    /// the viewport.
    fn is_met_by(self, entry: &VisibilityEntry) -> bool {
        entry.intersecting
            && (entry.ratio + RATIO_EPSILON >= self.0
                || entry.root_coverage + RATIO_EPSILON >= self.0)
    }

    /// Ratios the platform observer should report at. A tall target only
    /// grows its ratio a little per screen scrolled, so the steps below the
    /// threshold keep callbacks coming while its viewport coverage grows.
    pub fn observer_steps(self) -> Vec<f64> {
        (0u32..)
            .map(|i| f64::from(i) * OBSERVER_STEP)
            .take_while(|&step| step < self.0)
            .chain(std::iter::once(self.0))
            .collect()
    }
}

const OBSERVER_STEP: f64 = 0.01;

/// Longest delay a browser timer honors; larger values fire at once.
pub const MAX_DELAY_MS: u32 = i32::MAX as u32;

impl Default for Threshold {
    fn default() -> Self {
        Self(0.3)
    }
}

/// Index of a target in the order it was handed to [`RevealScheduler::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub usize);

/// Key of one deferred item reveal: (target, group, index within group).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaggerKey {
    pub target: TargetId,
    pub group: usize,
    pub index: usize,
}

impl fmt::Display for StaggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.target.0, self.group, self.index)
    }
}

/// Shape of one target as discovered at initialization: how many items each
/// of its stagger groups holds, and the per-group stagger unit.
#[derive(Clone, Debug, Default)]
pub struct TargetLayout {
    pub groups: Vec<GroupLayout>,
}

#[derive(Clone, Copy, Debug)]
pub struct GroupLayout {
    pub unit_ms: u32,
    pub len: usize,
}

/// One platform notification about a target's visibility.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityEntry {
    pub target: TargetId,
    pub intersecting: bool,
    pub ratio: f64,
    /// Visible height of the target over the viewport height.
    pub root_coverage: f64,
}

/// What the DOM layer has to do in response to a visibility batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealAction {
    /// Apply the revealed visual state to the target itself.
    RevealTarget(TargetId),
    /// Arm a cancellable timer that calls [`RevealScheduler::fire`] with
    /// `key` after `delay_ms`.
    Schedule { key: StaggerKey, delay_ms: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ItemState {
    Hidden,
    Pending,
    Revealed,
}

#[derive(Debug)]
struct Group {
    unit_ms: u32,
    items: Vec<ItemState>,
}

#[derive(Debug)]
struct Target {
    revealed: bool,
    torn_down: bool,
    groups: Vec<Group>,
}

/// Reveals targets once they cross the visibility threshold and staggers
/// the reveal of their child items.
///
/// State only ever moves forward: a target goes `hidden -> revealed`, an
/// item goes `hidden -> pending -> revealed`. A torn-down target keeps its
/// flags but will not reveal anything else.
#[derive(Debug)]
pub struct RevealScheduler {
    threshold: Threshold,
    targets: Vec<Target>,
}

impl RevealScheduler {
    /// Builds the scheduler for a fixed set of targets. Nothing is revealed
    /// here; the first reveal always comes from [`on_visibility`].
    ///
    /// [`on_visibility`]: Self::on_visibility
    pub fn new(threshold: Threshold, layouts: impl IntoIterator<Item = TargetLayout>) -> Self {
        let targets = layouts
            .into_iter()
            .map(|layout| Target {
                revealed: false,
                torn_down: false,
                groups: layout
                    .groups
                    .into_iter()
                    .map(|g| Group {
                        unit_ms: g.unit_ms,
                        items: vec![ItemState::Hidden; g.len],
                    })
                    .collect(),
            })
            .collect();
        Self { threshold, targets }
    }

    /// Reacts to one batch of visibility notifications.
    ///
    /// Entries for unknown or torn-down targets, entries below the
    /// threshold, and entries for already revealed targets produce nothing.
    pub fn on_visibility(&mut self, batch: &[VisibilityEntry]) -> Vec<RevealAction> {
        let mut actions = Vec::new();

        for entry in batch {
            if !self.threshold.is_met_by(entry) {
                continue;
            }
            let Some(target) = self.targets.get_mut(entry.target.0) else {
                continue;
            };
            if target.revealed || target.torn_down {
                continue;
            }

            target.revealed = true;
            actions.push(RevealAction::RevealTarget(entry.target));

            for (group_idx, group) in target.groups.iter_mut().enumerate() {
                for (index, item) in group.items.iter_mut().enumerate() {
                    *item = ItemState::Pending;
                    actions.push(RevealAction::Schedule {
                        key: StaggerKey {
                            target: entry.target,
                            group: group_idx,
                            index,
                        },
                        delay_ms: stagger_delay(group.unit_ms, index),
                    });
                }
            }
        }

        actions
    }

    /// Called when the timer for `key` goes off. Returns `true` when the
    /// caller should apply the item's revealed visual state.
    pub fn fire(&mut self, key: StaggerKey) -> bool {
        let Some(target) = self.targets.get_mut(key.target.0) else {
            return false;
        };
        if !target.revealed || target.torn_down {
            return false;
        }
        match target
            .groups
            .get_mut(key.group)
            .and_then(|g| g.items.get_mut(key.index))
        {
            Some(item) if *item == ItemState::Pending => {
                *item = ItemState::Revealed;
                true
            }
            _ => false,
        }
    }

    /// Marks a target as removed from the document. Returns the keys whose
    /// timers are still armed so the caller can cancel them.
    pub fn tear_down(&mut self, id: TargetId) -> Vec<StaggerKey> {
        let Some(target) = self.targets.get_mut(id.0) else {
            return Vec::new();
        };
        if target.torn_down {
            return Vec::new();
        }
        target.torn_down = true;

        let mut cancelled = Vec::new();
        for (group_idx, group) in target.groups.iter_mut().enumerate() {
            for (index, item) in group.items.iter_mut().enumerate() {
                if *item == ItemState::Pending {
                    *item = ItemState::Hidden;
                    cancelled.push(StaggerKey {
                        target: id,
                        group: group_idx,
                        index,
                    });
                }
            }
        }
        cancelled
    }

    #[cfg(test)]
    pub fn is_revealed(&self, id: TargetId) -> bool {
        self.targets.get(id.0).is_some_and(|t| t.revealed)
    }

    pub fn is_torn_down(&self, id: TargetId) -> bool {
        self.targets.get(id.0).is_some_and(|t| t.torn_down)
    }

    #[cfg(test)]
    pub fn is_item_revealed(&self, key: StaggerKey) -> bool {
        self.item(key) == Some(ItemState::Revealed)
    }

    /// Whether a timer for `key` is armed and has not fired yet.
    pub fn is_pending(&self, key: StaggerKey) -> bool {
        self.item(key) == Some(ItemState::Pending)
    }

    fn item(&self, key: StaggerKey) -> Option<ItemState> {
        self.targets
            .get(key.target.0)?
            .groups
            .get(key.group)?
            .items
            .get(key.index)
            .copied()
    }
}

/// Delay of the item at `index` in a group staggered by `unit_ms`, capped
/// at [`MAX_DELAY_MS`].
pub fn stagger_delay(unit_ms: u32, index: usize) -> u32 {
    let index = u32::try_from(index).unwrap_or(u32::MAX);
    unit_ms.saturating_mul(index).min(MAX_DELAY_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(groups: &[(u32, usize)]) -> TargetLayout {
        TargetLayout {
            groups: groups
                .iter()
                .map(|&(unit_ms, len)| GroupLayout { unit_ms, len })
                .collect(),
        }
    }

    fn visible(target: usize) -> VisibilityEntry {
        VisibilityEntry {
            target: TargetId(target),
            intersecting: true,
            ratio: 0.5,
            root_coverage: 0.5,
        }
    }

    fn scheduled(actions: &[RevealAction]) -> Vec<(StaggerKey, u32)> {
        actions
            .iter()
            .filter_map(|a| match *a {
                RevealAction::Schedule { key, delay_ms } => Some((key, delay_ms)),
                RevealAction::RevealTarget(_) => None,
            })
            .collect()
    }

    /// Drives the scheduler against a virtual clock: targets reveal at
    /// `now`, timers fire in due order. Returns (key, fire time) pairs.
    fn run_timers(
        scheduler: &mut RevealScheduler,
        now: u64,
        actions: &[RevealAction],
    ) -> Vec<(StaggerKey, u64)> {
        let mut queue: Vec<(u64, StaggerKey)> = scheduled(actions)
            .into_iter()
            .map(|(key, delay)| (now + u64::from(delay), key))
            .collect();
        queue.sort();
        queue
            .into_iter()
            .filter(|&(_, key)| scheduler.fire(key))
            .map(|(at, key)| (key, at))
            .collect()
    }

    #[test]
    fn threshold_rejects_out_of_range() {
        assert!(Threshold::new(0.0).is_none());
        assert!(Threshold::new(-0.2).is_none());
        assert!(Threshold::new(1.01).is_none());
        assert!(Threshold::new(f64::NAN).is_none());
        assert_eq!(Threshold::new(1.0).map(Threshold::get), Some(1.0));
        assert_eq!(Threshold::new(0.3).map(Threshold::get), Some(0.3));
    }

    #[test]
    fn nothing_revealed_before_first_notification() {
        let scheduler = RevealScheduler::new(Threshold(0.3), vec![layout(&[(200, 2)])]);
        assert!(!scheduler.is_revealed(TargetId(0)));
        assert!(!scheduler.is_pending(StaggerKey {
            target: TargetId(0),
            group: 0,
            index: 0,
        }));
    }

    #[test]
    fn empty_target_set_is_a_noop() {
        let mut scheduler = RevealScheduler::new(Threshold(0.3), Vec::new());
        assert!(scheduler.on_visibility(&[visible(0)]).is_empty());
    }

    #[test]
    fn reveal_waits_for_threshold_and_stays_revealed() {
        let mut scheduler = RevealScheduler::new(Threshold(0.3), vec![layout(&[])]);
        let id = TargetId(0);

        let below = VisibilityEntry {
            target: id,
            intersecting: true,
            ratio: 0.1,
            root_coverage: 0.1,
        };
        assert!(scheduler.on_visibility(&[below]).is_empty());
        assert!(!scheduler.is_revealed(id));

        assert_eq!(
            scheduler.on_visibility(&[visible(0)]),
            vec![RevealAction::RevealTarget(id)]
        );
        assert!(scheduler.is_revealed(id));

        let leaving = VisibilityEntry {
            target: id,
            intersecting: false,
            ratio: 0.0,
            root_coverage: 0.0,
        };
        assert!(scheduler.on_visibility(&[leaving]).is_empty());
        assert!(scheduler.is_revealed(id));
    }

    #[test]
    fn ratio_just_under_threshold_counts_as_crossing() {
        let mut scheduler = RevealScheduler::new(Threshold(0.3), vec![layout(&[])]);
        let entry = VisibilityEntry {
            target: TargetId(0),
            intersecting: true,
            ratio: 0.2999,
            root_coverage: 0.1,
        };
        assert_eq!(scheduler.on_visibility(&[entry]).len(), 1);
    }

    #[test]
    fn three_items_at_200ms_reveal_at_0_200_400() {
        let mut scheduler = RevealScheduler::new(Threshold(0.3), vec![layout(&[(200, 3)])]);
        let actions = scheduler.on_visibility(&[visible(0)]);
        assert_eq!(actions[0], RevealAction::RevealTarget(TargetId(0)));

        let delays: Vec<u32> = scheduled(&actions).into_iter().map(|(_, d)| d).collect();
        assert_eq!(delays, vec![0, 200, 400]);

        let fired = run_timers(&mut scheduler, 1_000, &actions);
        let offsets: Vec<u64> = fired.iter().map(|&(_, at)| at - 1_000).collect();
        assert_eq!(offsets, vec![0, 200, 400]);
    }

    #[test]
    fn items_reveal_in_index_order_after_target() {
        let mut scheduler =
            RevealScheduler::new(Threshold(0.3), vec![layout(&[(200, 4), (150, 5)])]);
        let reveal_at = 2_500;
        let actions = scheduler.on_visibility(&[visible(0)]);
        let fired = run_timers(&mut scheduler, reveal_at, &actions);
        assert_eq!(fired.len(), 9);

        for group in 0..2 {
            let times: Vec<u64> = fired
                .iter()
                .filter(|(key, _)| key.group == group)
                .map(|&(_, at)| at)
                .collect();
            assert!(times.iter().all(|&t| t >= reveal_at));
            assert!(times.windows(2).all(|w| w[0] < w[1]), "group {group}: {times:?}");
        }

        let relevance: Vec<u32> = scheduled(&actions)
            .into_iter()
            .filter(|(key, _)| key.group == 1)
            .map(|(_, d)| d)
            .collect();
        assert_eq!(relevance, vec![0, 150, 300, 450, 600]);
    }

    #[test]
    fn repeated_notification_schedules_nothing_new() {
        let mut scheduler = RevealScheduler::new(Threshold(0.3), vec![layout(&[(200, 3)])]);
        let first = scheduler.on_visibility(&[visible(0)]);
        assert_eq!(scheduled(&first).len(), 3);

        let key = StaggerKey {
            target: TargetId(0),
            group: 0,
            index: 0,
        };
        assert!(scheduler.fire(key));

        assert!(scheduler.on_visibility(&[visible(0)]).is_empty());
        // same entry twice in one batch
        assert!(scheduler.on_visibility(&[visible(0), visible(0)]).is_empty());
        assert!(scheduler.is_item_revealed(key));
        assert!(!scheduler.fire(key));
    }

    #[test]
    fn duplicate_entries_in_first_batch_reveal_once() {
        let mut scheduler = RevealScheduler::new(Threshold(0.3), vec![layout(&[(150, 2)])]);
        let actions = scheduler.on_visibility(&[visible(0), visible(0)]);
        assert_eq!(actions.len(), 3);
    }

    #[test]
    fn target_without_items_schedules_nothing() {
        let mut scheduler = RevealScheduler::new(Threshold(0.1), vec![layout(&[(200, 0), (150, 0)])]);
        let actions = scheduler.on_visibility(&[visible(0)]);
        assert_eq!(actions, vec![RevealAction::RevealTarget(TargetId(0))]);
    }

    #[test]
    fn unknown_target_is_ignored() {
        let mut scheduler = RevealScheduler::new(Threshold(0.3), vec![layout(&[])]);
        assert!(scheduler.on_visibility(&[visible(7)]).is_empty());
        assert!(!scheduler.fire(StaggerKey {
            target: TargetId(7),
            group: 0,
            index: 0,
        }));
    }

    #[test]
    fn targets_reveal_independently() {
        let mut scheduler =
            RevealScheduler::new(Threshold(0.3), vec![layout(&[(200, 1)]), layout(&[(200, 1)])]);
        scheduler.on_visibility(&[visible(1)]);
        assert!(!scheduler.is_revealed(TargetId(0)));
        assert!(scheduler.is_revealed(TargetId(1)));
    }

    #[test]
    fn fire_before_reveal_does_nothing() {
        let mut scheduler = RevealScheduler::new(Threshold(0.3), vec![layout(&[(200, 2)])]);
        let key = StaggerKey {
            target: TargetId(0),
            group: 0,
            index: 1,
        };
        assert!(!scheduler.fire(key));
        assert!(!scheduler.is_item_revealed(key));
    }

    #[test]
    fn tear_down_cancels_only_pending_items() {
        let mut scheduler = RevealScheduler::new(Threshold(0.3), vec![layout(&[(200, 3)])]);
        scheduler.on_visibility(&[visible(0)]);
        let first = StaggerKey {
            target: TargetId(0),
            group: 0,
            index: 0,
        };
        assert!(scheduler.fire(first));

        let cancelled = scheduler.tear_down(TargetId(0));
        let indices: Vec<usize> = cancelled.iter().map(|k| k.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert!(cancelled.iter().all(|k| !scheduler.is_pending(*k)));

        // a timer that slipped through cancellation must not mutate anything
        assert!(!scheduler.fire(cancelled[0]));
        assert!(scheduler.is_item_revealed(first));
        assert!(scheduler.tear_down(TargetId(0)).is_empty());
    }

    #[test]
    fn torn_down_target_never_reveals() {
        let mut scheduler = RevealScheduler::new(Threshold(0.3), vec![layout(&[(200, 2)])]);
        assert!(scheduler.tear_down(TargetId(0)).is_empty());
        assert!(scheduler.is_torn_down(TargetId(0)));
        assert!(scheduler.on_visibility(&[visible(0)]).is_empty());
        assert!(!scheduler.is_revealed(TargetId(0)));
    }

    #[test]
    fn stagger_delay_saturates() {
        assert_eq!(stagger_delay(150, 3), 450);
        assert_eq!(stagger_delay(u32::MAX, 2), MAX_DELAY_MS);
        assert_eq!(stagger_delay(1 << 30, 3), MAX_DELAY_MS);
    }

    #[test]
    fn tall_target_reveals_once_it_fills_the_viewport() {
        let mut scheduler = RevealScheduler::new(Threshold(0.3), vec![layout(&[(200, 2)])]);
        // a slide about ten screens tall: its ratio never passes 0.1
        let scrolling = [(0.05, 0.02), (0.12, 0.1), (0.25, 0.2), (0.25, 0.25)];
        for (coverage, ratio) in scrolling {
            let entry = VisibilityEntry {
                target: TargetId(0),
                intersecting: true,
                ratio,
                root_coverage: coverage,
            };
            assert!(scheduler.on_visibility(&[entry]).is_empty());
        }
        assert!(!scheduler.is_revealed(TargetId(0)));

        let filled = VisibilityEntry {
            target: TargetId(0),
            intersecting: true,
            ratio: 0.1,
            root_coverage: 1.0,
        };
        let actions = scheduler.on_visibility(&[filled]);
        assert_eq!(actions[0], RevealAction::RevealTarget(TargetId(0)));
        assert_eq!(scheduled(&actions).len(), 2);
        assert!(scheduler.is_revealed(TargetId(0)));
    }

    #[test]
    fn coverage_without_intersection_does_not_reveal() {
        let mut scheduler = RevealScheduler::new(Threshold(0.3), vec![layout(&[])]);
        let entry = VisibilityEntry {
            target: TargetId(0),
            intersecting: false,
            ratio: 0.0,
            root_coverage: 0.9,
        };
        assert!(scheduler.on_visibility(&[entry]).is_empty());
    }

    #[test]
    fn observer_steps_climb_to_the_threshold() {
        let steps = Threshold(0.3).observer_steps();
        assert_eq!(steps.first(), Some(&0.0));
        assert_eq!(steps.last(), Some(&0.3));
        assert!(steps.windows(2).all(|w| w[0] < w[1]), "{steps:?}");
        assert!(steps.iter().all(|&s| (0.0..=1.0).contains(&s)));

        assert_eq!(Threshold(1.0).observer_steps().last(), Some(&1.0));
        assert_eq!(Threshold(0.005).observer_steps(), vec![0.0, 0.005]);
    }
}

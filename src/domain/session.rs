use super::{Direction, Item, Phase};
use crate::gesture::GestureRegistry;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Delays that shape the session's timing contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    /// Grace period after the batch arrives before input is accepted
    pub settle_delay: Duration,
    /// Pause between deciding the last card and showing the collection
    pub finish_delay: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(500),
            finish_delay: Duration::from_millis(300),
        }
    }
}

/// Result of feeding a decision into the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    Accepted {
        index: usize,
        direction: Direction,
        /// The last card was decided and the finish transition is scheduled
        finishing: bool,
    },
    /// The index no longer names the top card; nothing changed
    Stale,
}

/// State machine for one swipe session
///
/// The cursor starts at the top of the batch (`items.len() - 1`) and walks down to `-1`.
/// Only a decision for the card under the cursor is accepted, so late or duplicated gesture
/// completions for cards that were already resolved are dropped without side effects.
#[derive(Debug)]
pub struct SwipeSession {
    items: Vec<Item>,
    liked: Vec<Item>,
    cursor: isize,
    last_direction: Option<Direction>,
    phase: Phase,
    epoch: u64,
    ready_at: Option<Instant>,
    finish_at: Option<Instant>,
    timings: SessionTimings,
}

impl SwipeSession {
    pub fn new(timings: SessionTimings) -> Self {
        Self {
            items: Vec::new(),
            liked: Vec::new(),
            cursor: -1,
            last_direction: None,
            phase: Phase::Loading,
            epoch: 0,
            ready_at: None,
            finish_at: None,
            timings,
        }
    }

    /// Installs a freshly loaded batch.
    ///
    /// Returns `false` without touching the session when the batch belongs to an older
    /// epoch, when the session is not loading, or when the batch is empty.
    pub fn begin(&mut self, epoch: u64, items: Vec<Item>, now: Instant) -> bool {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "Dropping batch from stale epoch");
            return false;
        }
        if self.phase != Phase::Loading || items.is_empty() {
            return false;
        }

        self.cursor = items.len() as isize - 1;
        self.items = items;
        self.phase = Phase::Active;
        self.ready_at = Some(now + self.timings.settle_delay);
        info!(epoch, cards = self.items.len(), "Session started");
        true
    }

    /// Records a decision for `index` at the current instant
    pub fn decide(&mut self, index: usize, direction: Direction) -> DecisionOutcome {
        self.decide_at(index, direction, Instant::now())
    }

    /// Records a decision for `index`; anything but the card under the cursor is ignored
    pub fn decide_at(
        &mut self,
        index: usize,
        direction: Direction,
        now: Instant,
    ) -> DecisionOutcome {
        if self.phase != Phase::Active || self.cursor < 0 || index as isize != self.cursor {
            debug!(index, cursor = self.cursor, %direction, "Ignoring stale decision");
            return DecisionOutcome::Stale;
        }

        self.last_direction = Some(direction);
        if direction == Direction::Right {
            self.liked.push(self.items[index].clone());
        }

        let finishing = index == 0;
        if finishing {
            self.finish_at = Some(now + self.timings.finish_delay);
        }
        self.cursor -= 1;

        debug!(index, %direction, liked = self.liked.len(), "Decision accepted");
        DecisionOutcome::Accepted {
            index,
            direction,
            finishing,
        }
    }

    /// Applies the deferred finish transition once its deadline has passed.
    ///
    /// Returns `true` only on the call that moves the session to `Finished`.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.finish_at {
            Some(deadline) if self.phase == Phase::Active && now >= deadline => {
                self.finish_at = None;
                self.phase = Phase::Finished;
                info!(liked = self.liked.len(), total = self.items.len(), "Session finished");
                true
            }
            _ => false,
        }
    }

    /// Asks the gesture surface of the top card to swipe in `direction`.
    ///
    /// This never changes the session: the decision is recorded when the surface reports
    /// the completed swipe. Returns whether a surface accepted the request.
    pub fn trigger_programmatic_swipe(
        &self,
        registry: &mut GestureRegistry,
        direction: Direction,
        now: Instant,
    ) -> bool {
        if !self.is_ready(now) {
            return false;
        }
        match self.current_item() {
            Some(item) => registry.trigger(item.id, direction, now),
            None => false,
        }
    }

    /// Throws the whole session away and starts a new epoch.
    ///
    /// The caller is expected to release the old display handles and request a new batch
    /// tagged with the returned epoch.
    pub fn reset(&mut self) -> u64 {
        self.epoch = self.epoch.wrapping_add(1);
        self.items.clear();
        self.liked.clear();
        self.cursor = -1;
        self.last_direction = None;
        self.phase = Phase::Loading;
        self.ready_at = None;
        self.finish_at = None;
        info!(epoch = self.epoch, "Session reset");
        self.epoch
    }

    /// Input is accepted only once the batch is loaded and the settle delay has elapsed
    pub fn is_ready(&self, now: Instant) -> bool {
        self.phase == Phase::Active && self.ready_at.is_some_and(|ready| now >= ready)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn liked(&self) -> &[Item] {
        &self.liked
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn last_direction(&self) -> Option<Direction> {
        self.last_direction
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn timings(&self) -> SessionTimings {
        self.timings
    }

    /// The card under the cursor, if any remain
    pub fn current_item(&self) -> Option<&Item> {
        usize::try_from(self.cursor)
            .ok()
            .and_then(|index| self.items.get(index))
    }

    /// Number of cards still waiting for a decision
    pub fn remaining(&self) -> usize {
        (self.cursor + 1).max(0) as usize
    }

    /// Whether the last card was decided and the collection is about to appear
    pub fn is_finishing(&self) -> bool {
        self.finish_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DisplayHandle;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Builds a batch from labels listed top card first, the way a user sees them
    fn batch(labels: &[&str]) -> Vec<Item> {
        let n = labels.len();
        (0..n)
            .map(|i| Item::new(i, labels[n - 1 - i], DisplayHandle::new(i as u64)))
            .collect()
    }

    fn refs(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.source_reference.as_str()).collect()
    }

    fn active(labels: &[&str], now: Instant) -> SwipeSession {
        let mut session = SwipeSession::new(SessionTimings::default());
        assert!(session.begin(0, batch(labels), now));
        session
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn test_new_session_is_loading() {
            let session = SwipeSession::new(SessionTimings::default());
            assert_eq!(session.phase(), Phase::Loading);
            assert_eq!(session.cursor(), -1);
            assert!(session.items().is_empty());
            assert!(session.current_item().is_none());
        }

        #[test]
        fn test_begin_sets_cursor_to_top() {
            let now = Instant::now();
            let session = active(&["A", "B", "C"], now);

            assert_eq!(session.phase(), Phase::Active);
            assert_eq!(session.cursor(), 2);
            assert_eq!(session.remaining(), 3);
            assert_eq!(session.current_item().unwrap().source_reference, "A");
        }

        #[test]
        fn test_begin_rejects_stale_epoch() {
            let mut session = SwipeSession::new(SessionTimings::default());
            let epoch = session.reset();

            assert!(!session.begin(epoch - 1, batch(&["A"]), Instant::now()));
            assert_eq!(session.phase(), Phase::Loading);
            assert!(session.items().is_empty());

            assert!(session.begin(epoch, batch(&["A"]), Instant::now()));
        }

        #[test]
        fn test_begin_rejects_empty_batch() {
            let mut session = SwipeSession::new(SessionTimings::default());
            assert!(!session.begin(0, vec![], Instant::now()));
            assert_eq!(session.phase(), Phase::Loading);
        }

        #[test]
        fn test_begin_only_once_per_epoch() {
            let now = Instant::now();
            let mut session = active(&["A", "B"], now);
            assert!(!session.begin(0, batch(&["X"]), now));
            assert_eq!(session.items().len(), 2);
        }

        #[test]
        fn test_readiness_waits_for_settle_delay() {
            let now = Instant::now();
            let session = active(&["A"], now);

            assert!(!session.is_ready(now));
            assert!(!session.is_ready(now + Duration::from_millis(499)));
            assert!(session.is_ready(now + Duration::from_millis(500)));
        }

        #[test]
        fn test_reset_clears_everything() {
            let now = Instant::now();
            let mut session = active(&["A", "B"], now);
            session.decide_at(1, Direction::Right, now);

            let epoch = session.reset();

            assert_eq!(epoch, 1);
            assert_eq!(session.phase(), Phase::Loading);
            assert!(session.liked().is_empty());
            assert!(session.items().is_empty());
            assert_eq!(session.cursor(), -1);
            assert_eq!(session.last_direction(), None);
            assert!(!session.is_finishing());

            assert!(session.begin(epoch, batch(&["X", "Y", "Z"]), now));
            assert_eq!(session.cursor(), 2);
        }

        #[test]
        fn test_reset_after_finish_cancels_nothing_pending() {
            let now = Instant::now();
            let mut session = active(&["A"], now);
            session.decide_at(0, Direction::Left, now);
            session.reset();

            assert!(!session.tick(now + Duration::from_secs(5)));
            assert_eq!(session.phase(), Phase::Loading);
        }
    }

    mod decision_tests {
        use super::*;

        #[test]
        fn test_mixed_decisions_scenario() {
            let now = Instant::now();
            let mut session = active(&["A", "B", "C"], now);

            session.decide_at(2, Direction::Left, now);
            assert_eq!(session.cursor(), 1);
            assert!(session.liked().is_empty());

            session.decide_at(1, Direction::Right, now);
            assert_eq!(session.cursor(), 0);
            assert_eq!(refs(session.liked()), vec!["B"]);

            let outcome = session.decide_at(0, Direction::Right, now);
            assert_eq!(
                outcome,
                DecisionOutcome::Accepted {
                    index: 0,
                    direction: Direction::Right,
                    finishing: true
                }
            );
            assert_eq!(refs(session.liked()), vec!["B", "C"]);
            assert_eq!(session.phase(), Phase::Active);

            assert!(session.tick(now + Duration::from_millis(300)));
            assert_eq!(session.phase(), Phase::Finished);
        }

        #[test]
        fn test_duplicate_delivery_is_ignored() {
            let now = Instant::now();
            let mut session = active(&["A", "B", "C"], now);

            session.decide_at(2, Direction::Right, now);
            let outcome = session.decide_at(2, Direction::Left, now);

            assert_eq!(outcome, DecisionOutcome::Stale);
            assert_eq!(refs(session.liked()), vec!["A"]);
            assert_eq!(session.cursor(), 1);
            assert_eq!(session.last_direction(), Some(Direction::Right));
        }

        #[test]
        fn test_all_left_finishes_with_nothing_liked() {
            let now = Instant::now();
            let mut session = active(&["A", "B", "C"], now);

            for index in [2, 1, 0] {
                session.decide_at(index, Direction::Left, now);
            }

            assert!(session.liked().is_empty());
            assert_eq!(session.cursor(), -1);
            assert!(session.tick(now + Duration::from_millis(300)));
            assert_eq!(session.phase(), Phase::Finished);
        }

        #[test]
        fn test_future_index_is_stale() {
            let now = Instant::now();
            let mut session = active(&["A", "B", "C"], now);

            assert_eq!(
                session.decide_at(0, Direction::Right, now),
                DecisionOutcome::Stale
            );
            assert_eq!(session.cursor(), 2);
            assert!(session.liked().is_empty());
            assert_eq!(session.last_direction(), None);
        }

        #[test]
        fn test_decide_while_loading_is_stale() {
            let mut session = SwipeSession::new(SessionTimings::default());
            assert_eq!(
                session.decide_at(0, Direction::Right, Instant::now()),
                DecisionOutcome::Stale
            );
        }

        #[test]
        fn test_decide_after_last_card_is_stale() {
            let now = Instant::now();
            let mut session = active(&["A"], now);
            session.decide_at(0, Direction::Right, now);

            assert_eq!(
                session.decide_at(0, Direction::Right, now),
                DecisionOutcome::Stale
            );
            assert_eq!(session.liked().len(), 1);
            assert_eq!(session.cursor(), -1);
        }

        #[test]
        fn test_finish_is_deferred_and_happens_once() {
            let now = Instant::now();
            let mut session = active(&["A"], now);
            session.decide_at(0, Direction::Left, now);

            assert!(session.is_finishing());
            assert!(!session.tick(now + Duration::from_millis(299)));
            assert_eq!(session.phase(), Phase::Active);

            assert!(session.tick(now + Duration::from_millis(300)));
            assert!(!session.tick(now + Duration::from_millis(600)));
            assert_eq!(session.phase(), Phase::Finished);
        }

        #[test]
        fn test_tick_without_final_decision_never_finishes() {
            let now = Instant::now();
            let mut session = active(&["A", "B"], now);
            session.decide_at(1, Direction::Right, now);

            assert!(!session.tick(now + Duration::from_secs(60)));
            assert_eq!(session.phase(), Phase::Active);
        }

        #[test]
        fn test_random_delivery_keeps_invariants() {
            let mut rng = StdRng::seed_from_u64(42);
            let now = Instant::now();

            for _ in 0..50 {
                let n = rng.gen_range(1..=10);
                let labels: Vec<String> = (0..n).map(|i| format!("cat-{}", i)).collect();
                let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
                let mut session = active(&label_refs, now);
                let mut finished = 0;
                let mut last_cursor = session.cursor();

                for _ in 0..40 {
                    let index = rng.gen_range(0..n);
                    let direction = if rng.gen_bool(0.5) {
                        Direction::Right
                    } else {
                        Direction::Left
                    };
                    let liked_before = session.liked().len();
                    let cursor_before = session.cursor();
                    let last_before = session.last_direction();

                    let outcome = session.decide_at(index, direction, now);

                    if index as isize != cursor_before {
                        assert_eq!(outcome, DecisionOutcome::Stale);
                        assert_eq!(session.liked().len(), liked_before);
                        assert_eq!(session.cursor(), cursor_before);
                        assert_eq!(session.last_direction(), last_before);
                    } else if direction == Direction::Left {
                        assert_eq!(session.liked().len(), liked_before);
                    }

                    assert!(session.cursor() <= last_cursor);
                    assert!(session.cursor() >= -1);
                    assert!(session.liked().len() <= session.items().len());
                    last_cursor = session.cursor();

                    if session.tick(now + Duration::from_secs(1)) {
                        finished += 1;
                    }
                }

                assert!(finished <= 1);
                if session.cursor() == -1 {
                    assert_eq!(session.phase(), Phase::Finished);
                    assert_eq!(finished, 1);
                }
            }
        }
    }

    mod gesture_tests {
        use super::*;

        #[test]
        fn test_trigger_requires_readiness() {
            let now = Instant::now();
            let mut session = active(&["A", "B"], now);
            let mut registry = GestureRegistry::new(Duration::from_millis(200));
            registry.sync(session.items(), session.cursor());

            assert!(!session.trigger_programmatic_swipe(&mut registry, Direction::Right, now));

            let later = now + Duration::from_millis(500);
            assert!(session.trigger_programmatic_swipe(&mut registry, Direction::Right, later));
            assert_eq!(session.cursor(), 1);

            let done = registry.poll_completed(later + Duration::from_millis(200));
            assert_eq!(done.len(), 1);
            session.decide_at(done[0].index, done[0].direction, later);
            assert_eq!(refs(session.liked()), vec!["A"]);
        }

        #[test]
        fn test_trigger_without_surface_is_noop() {
            let now = Instant::now();
            let session = active(&["A"], now);
            let mut registry = GestureRegistry::new(Duration::from_millis(200));

            let later = now + Duration::from_secs(1);
            assert!(!session.trigger_programmatic_swipe(&mut registry, Direction::Left, later));
        }

        #[test]
        fn test_trigger_after_last_card_is_noop() {
            let now = Instant::now();
            let mut session = active(&["A"], now);
            let mut registry = GestureRegistry::new(Duration::from_millis(200));
            registry.sync(session.items(), session.cursor());
            session.decide_at(0, Direction::Left, now);

            let later = now + Duration::from_secs(1);
            assert!(!session.trigger_programmatic_swipe(&mut registry, Direction::Left, later));
        }
    }
}

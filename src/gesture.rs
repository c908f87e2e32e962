//! Gesture surfaces for cards: programmatic swipes, fly-out animation and mouse drags
//!
//! Each mounted card owns a [`CardSurface`] in the [`GestureRegistry`], keyed by item id.
//! A surface never touches the session directly; it reports [`CompletedSwipe`]s that the
//! caller feeds back into the session's decision guard.

use crate::domain::{Direction, Item, ItemId};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// How long a card takes to leave the screen
pub const DEFAULT_FLY_OUT: Duration = Duration::from_millis(250);

/// Columns a card travels while flying out
const FLY_OUT_DISTANCE: f32 = 60.0;

/// A swipe whose animation has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedSwipe {
    pub index: usize,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceState {
    Idle,
    FlyingOut { direction: Direction, started: Instant },
    Reported,
}

/// Swipe capability of a single mounted card
#[derive(Debug, Clone)]
pub struct CardSurface {
    index: usize,
    state: SurfaceState,
    drag_offset: i32,
}

impl CardSurface {
    fn new(index: usize) -> Self {
        Self {
            index,
            state: SurfaceState::Idle,
            drag_offset: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Starts the fly-out animation. Ignored unless the card is at rest.
    pub fn trigger_swipe(&mut self, direction: Direction, now: Instant) -> bool {
        if self.state != SurfaceState::Idle {
            return false;
        }
        self.state = SurfaceState::FlyingOut {
            direction,
            started: now,
        };
        true
    }

    pub fn is_flying(&self) -> bool {
        matches!(self.state, SurfaceState::FlyingOut { .. })
    }

    /// Horizontal displacement of the card in columns
    pub fn offset(&self, now: Instant, fly_out: Duration) -> i32 {
        match self.state {
            SurfaceState::Idle => self.drag_offset,
            SurfaceState::FlyingOut { direction, started } => {
                let elapsed = now.saturating_duration_since(started).as_secs_f32();
                let progress = if fly_out.is_zero() {
                    1.0
                } else {
                    (elapsed / fly_out.as_secs_f32()).min(1.0)
                };
                self.drag_offset + (direction.sign() as f32 * FLY_OUT_DISTANCE * progress) as i32
            }
            SurfaceState::Reported => 0,
        }
    }

    fn poll(&mut self, now: Instant, fly_out: Duration) -> Option<CompletedSwipe> {
        if let SurfaceState::FlyingOut { direction, started } = self.state {
            if now.saturating_duration_since(started) >= fly_out {
                self.state = SurfaceState::Reported;
                return Some(CompletedSwipe {
                    index: self.index,
                    direction,
                });
            }
        }
        None
    }
}

/// Registry of live card surfaces, populated as cards mount and pruned as they unmount
#[derive(Debug)]
pub struct GestureRegistry {
    surfaces: HashMap<ItemId, CardSurface>,
    fly_out: Duration,
}

impl GestureRegistry {
    pub fn new(fly_out: Duration) -> Self {
        Self {
            surfaces: HashMap::new(),
            fly_out,
        }
    }

    /// Mounts a surface for every card at or below the cursor and unmounts the rest
    pub fn sync(&mut self, items: &[Item], cursor: isize) {
        self.surfaces.retain(|id, surface| {
            surface.index as isize <= cursor
                && items.get(surface.index).is_some_and(|item| item.id == *id)
        });

        for (index, item) in items.iter().enumerate() {
            if index as isize > cursor {
                break;
            }
            self.surfaces
                .entry(item.id)
                .or_insert_with(|| CardSurface::new(index));
        }
    }

    /// Forwards a programmatic swipe to the surface for `id`
    pub fn trigger(&mut self, id: ItemId, direction: Direction, now: Instant) -> bool {
        match self.surfaces.get_mut(&id) {
            Some(surface) => {
                let started = surface.trigger_swipe(direction, now);
                debug!(id = %id, %direction, started, "Programmatic swipe");
                started
            }
            None => {
                debug!(id = %id, "No live surface for card");
                false
            }
        }
    }

    /// Collects swipes whose fly-out has finished. Each surface reports at most once.
    pub fn poll_completed(&mut self, now: Instant) -> Vec<CompletedSwipe> {
        let fly_out = self.fly_out;
        let mut completed: Vec<CompletedSwipe> = self
            .surfaces
            .values_mut()
            .filter_map(|surface| surface.poll(now, fly_out))
            .collect();
        completed.sort_by(|a, b| b.index.cmp(&a.index));
        completed
    }

    /// Shifts a resting card while it is being dragged
    pub fn set_drag_offset(&mut self, id: ItemId, offset: i32) {
        if let Some(surface) = self.surfaces.get_mut(&id) {
            if surface.state == SurfaceState::Idle {
                surface.drag_offset = offset;
            }
        }
    }

    /// Current horizontal displacement of the card for `id`
    pub fn offset(&self, id: ItemId, now: Instant) -> i32 {
        self.surfaces
            .get(&id)
            .map(|surface| surface.offset(now, self.fly_out))
            .unwrap_or(0)
    }

    pub fn surface(&self, id: ItemId) -> Option<&CardSurface> {
        self.surfaces.get(&id)
    }

    pub fn clear(&mut self) {
        self.surfaces.clear();
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl Default for GestureRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_FLY_OUT)
    }
}

/// Tracks a mouse drag across the card and decides whether it counts as a swipe
#[derive(Debug, Clone)]
pub struct DragTracker {
    threshold: u16,
    origin: Option<(u16, u16)>,
    current: (u16, u16),
}

impl DragTracker {
    pub fn new(threshold: u16) -> Self {
        Self {
            threshold,
            origin: None,
            current: (0, 0),
        }
    }

    pub fn press(&mut self, column: u16, row: u16) {
        self.origin = Some((column, row));
        self.current = (column, row);
    }

    pub fn drag(&mut self, column: u16, row: u16) {
        if self.origin.is_some() {
            self.current = (column, row);
        }
    }

    /// Ends the drag. Returns a direction when the card was pulled far enough sideways.
    pub fn release(&mut self, column: u16, row: u16) -> Option<Direction> {
        self.drag(column, row);
        let origin = self.origin.take()?;

        let dx = self.current.0 as i32 - origin.0 as i32;
        let dy = self.current.1 as i32 - origin.1 as i32;

        // Vertical swipes are not decisions
        if dy.abs() > dx.abs() || dx.unsigned_abs() < self.threshold as u32 {
            return None;
        }
        Some(if dx > 0 {
            Direction::Right
        } else {
            Direction::Left
        })
    }

    pub fn cancel(&mut self) {
        self.origin = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.origin.is_some()
    }

    /// Horizontal distance dragged so far
    pub fn offset(&self) -> i32 {
        match self.origin {
            Some((column, _)) => self.current.0 as i32 - column as i32,
            None => 0,
        }
    }
}

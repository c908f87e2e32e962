//! Core domain types: items, swipe directions and the session phase

pub mod session;

pub use session::{DecisionOutcome, SessionTimings, SwipeSession};

use std::fmt;

/// Direction of a completed or requested swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Reject ("nope")
    Left,
    /// Accept ("like")
    Right,
}

impl Direction {
    /// Short feedback label shown after a decision
    pub fn feedback(self) -> &'static str {
        match self {
            Direction::Left => "Nope",
            Direction::Right => "Like!",
        }
    }

    /// Signed horizontal unit, used to push a card off screen
    pub fn sign(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

/// Lifecycle phase of a swipe session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for the batch to arrive
    #[default]
    Loading,
    /// Cards are being swiped
    Active,
    /// Every card has been decided and the collection is shown
    Finished,
}

/// Stable identifier of an item within a session (its slot in the batch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub usize);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque token for image data owned by the item cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHandle(u64);

impl DisplayHandle {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// A fetched image ready to be shown as a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    /// The exact URL the image was requested from
    pub source_reference: String,
    pub display: DisplayHandle,
}

impl Item {
    pub fn new(id: usize, source_reference: impl Into<String>, display: DisplayHandle) -> Self {
        Self {
            id: ItemId(id),
            source_reference: source_reference.into(),
            display,
        }
    }
}

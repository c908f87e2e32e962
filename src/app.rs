//! Application controller tying the session, cache, gestures and loader together
//!
//! The terminal loop owns one [`App`]. Every frame it calls [`App::tick`] and forwards key
//! and mouse input; rendering only reads from it.

use crate::actions::{save_item, ShareOutcome, Sharer};
use crate::cache::{ItemCache, LoadReport, LoadedBatch};
use crate::cli::AppConfig;
use crate::domain::{Direction, Item, Phase, SwipeSession};
use crate::error::Result;
use crate::gesture::{DragTracker, GestureRegistry, DEFAULT_FLY_OUT};
use crate::loader::{BatchLoader, LoadPoll};
use crate::source::ImageSource;
use crate::tui::{KeyAction, MouseAction};
use ratatui::layout::Rect;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long a notice stays on screen
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Which screen the app is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Batch in flight, or loaded but still settling
    Loading,
    /// Cards accept input
    Swiping,
    /// The liked collection
    Collection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A short-lived message at the bottom of the screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    shown_at: Instant,
}

pub struct App {
    config: AppConfig,
    session: SwipeSession,
    cache: ItemCache,
    gestures: GestureRegistry,
    drag: DragTracker,
    loader: BatchLoader,
    sharer: Sharer,
    notice: Option<Notice>,
    load_error: Option<String>,
    last_report: Option<LoadReport>,
    selected: usize,
    show_help: bool,
    card_area: Option<Rect>,
    should_quit: bool,
}

impl App {
    /// Builds the app and immediately starts fetching the first batch
    pub fn new(config: AppConfig, source: Arc<dyn ImageSource>, sharer: Sharer) -> Result<Self> {
        let loader = BatchLoader::new(source)?;
        let mut app = Self {
            session: SwipeSession::new(config.timings),
            cache: ItemCache::new(),
            gestures: GestureRegistry::new(DEFAULT_FLY_OUT),
            drag: DragTracker::new(config.drag_threshold),
            loader,
            sharer,
            notice: None,
            load_error: None,
            last_report: None,
            selected: 0,
            show_help: false,
            card_area: None,
            should_quit: false,
            config,
        };
        app.start_session();
        Ok(app)
    }

    /// Drops the current session, frees its images and requests a fresh batch
    pub fn start_session(&mut self) {
        let epoch = self.session.reset();
        self.gestures.clear();
        self.drag.cancel();
        let released = self.cache.release_all();
        self.selected = 0;
        self.load_error = None;
        self.last_report = None;
        self.loader.request(epoch, self.config.batch_size);
        info!(epoch, released, count = self.config.batch_size, "Requested new batch");
    }

    /// Advances everything that depends on time or background work
    pub fn tick(&mut self, now: Instant) {
        match self.loader.poll() {
            LoadPoll::Ready(batch) => self.on_batch(batch, now),
            LoadPoll::Failed(reason) => {
                warn!(%reason, "Batch load failed");
                self.load_error = Some(reason);
            }
            LoadPoll::Idle | LoadPoll::Pending => {}
        }

        for swipe in self.gestures.poll_completed(now) {
            self.session.decide_at(swipe.index, swipe.direction, now);
        }
        self.gestures.sync(self.session.items(), self.session.cursor());

        if self.session.tick(now) {
            self.selected = 0;
        }

        if self
            .notice
            .as_ref()
            .is_some_and(|notice| now.saturating_duration_since(notice.shown_at) >= NOTICE_TTL)
        {
            self.notice = None;
        }
    }

    fn on_batch(&mut self, batch: LoadedBatch, now: Instant) {
        let epoch = batch.epoch;
        if epoch != self.session.epoch() {
            debug!(epoch, current = self.session.epoch(), "Discarding stale batch");
            return;
        }

        let report = batch.report.clone();
        let items = self.cache.admit(batch);
        if items.is_empty() {
            self.load_error = Some(format!(
                "No cats arrived ({} of {} requests failed)",
                report.failures.len(),
                report.requested
            ));
            self.last_report = Some(report);
            return;
        }

        if !self.session.begin(epoch, items.clone(), now) {
            for item in &items {
                self.cache.release(item);
            }
            return;
        }
        self.gestures.sync(self.session.items(), self.session.cursor());

        if !report.is_complete() {
            self.set_notice(
                format!("Only {} of {} cats showed up", report.loaded, report.requested),
                NoticeKind::Error,
                now,
            );
        }
        self.last_report = Some(report);
    }

    /// Current screen, derived from the session phase and the readiness gate
    pub fn view(&self, now: Instant) -> View {
        match self.session.phase() {
            Phase::Loading => View::Loading,
            Phase::Active if self.session.is_ready(now) => View::Swiping,
            Phase::Active => View::Loading,
            Phase::Finished => View::Collection,
        }
    }

    pub fn handle_key(&mut self, action: KeyAction, now: Instant) {
        if self.show_help {
            // Any key closes help
            self.show_help = false;
            return;
        }

        match (self.view(now), action) {
            (_, KeyAction::Quit) => self.should_quit = true,
            (_, KeyAction::Help) => self.show_help = true,

            (View::Loading, KeyAction::Restart) if self.load_error.is_some() => {
                self.start_session()
            }

            (View::Swiping, KeyAction::Like) => self.swipe(Direction::Right, now),
            (View::Swiping, KeyAction::Nope) => self.swipe(Direction::Left, now),

            (View::Collection, KeyAction::Up) => {
                self.selected = self.selected.saturating_sub(1);
            }
            (View::Collection, KeyAction::Down) => {
                if self.selected + 1 < self.session.liked().len() {
                    self.selected += 1;
                }
            }
            (View::Collection, KeyAction::Save) => self.save_selected(now),
            (View::Collection, KeyAction::Share) => self.share_selected(now),
            (View::Collection, KeyAction::Restart) => self.start_session(),

            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, action: MouseAction, now: Instant) {
        if self.view(now) != View::Swiping {
            self.drag.cancel();
            return;
        }
        let Some(current) = self.session.current_item().map(|item| item.id) else {
            return;
        };

        match action {
            MouseAction::Press { column, row } => {
                if self.hits_card(column, row) {
                    self.drag.press(column, row);
                }
            }
            MouseAction::Drag { column, row } => {
                if self.drag.is_dragging() {
                    self.drag.drag(column, row);
                    self.gestures.set_drag_offset(current, self.drag.offset());
                }
            }
            MouseAction::Release { column, row } => {
                if !self.drag.is_dragging() {
                    return;
                }
                match self.drag.release(column, row) {
                    Some(direction) => self.swipe(direction, now),
                    None => self.gestures.set_drag_offset(current, 0),
                }
            }
            MouseAction::None => {}
        }
    }

    fn swipe(&mut self, direction: Direction, now: Instant) {
        if !self
            .session
            .trigger_programmatic_swipe(&mut self.gestures, direction, now)
        {
            debug!(%direction, "Swipe request ignored");
        }
    }

    fn hits_card(&self, column: u16, row: u16) -> bool {
        self.card_area.is_some_and(|area| {
            column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
        })
    }

    fn save_selected(&mut self, now: Instant) {
        let Some(item) = self.selected_item().cloned() else {
            return;
        };
        match save_item(&self.cache, &item, &self.config.save_dir) {
            Ok(path) => self.set_notice(
                format!("Saved to {}", path.display()),
                NoticeKind::Info,
                now,
            ),
            Err(e) => {
                warn!(id = %item.id, error = %e, "Save failed");
                self.set_notice(format!("Save failed: {}", e), NoticeKind::Error, now);
            }
        }
    }

    fn share_selected(&mut self, now: Instant) {
        let Some(item) = self.selected_item().cloned() else {
            return;
        };
        let outcome = self.sharer.share(&item);
        let kind = match outcome {
            ShareOutcome::Unavailable { .. } => NoticeKind::Error,
            ShareOutcome::Shared | ShareOutcome::Copied => NoticeKind::Info,
        };
        self.set_notice(outcome.notice(), kind, now);
    }

    fn set_notice(&mut self, text: String, kind: NoticeKind, now: Instant) {
        self.notice = Some(Notice {
            text,
            kind,
            shown_at: now,
        });
    }

    /// Remembers where the card was drawn, for mouse hit testing
    pub fn set_card_area(&mut self, area: Option<Rect>) {
        self.card_area = area;
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.session.liked().get(self.selected)
    }

    /// Horizontal displacement of the top card (drag or fly-out)
    pub fn card_offset(&self, now: Instant) -> i32 {
        self.session
            .current_item()
            .map(|item| self.gestures.offset(item.id, now))
            .unwrap_or(0)
    }

    pub fn session(&self) -> &SwipeSession {
        &self.session
    }

    pub fn cache(&self) -> &ItemCache {
        &self.cache
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn last_report(&self) -> Option<&LoadReport> {
        self.last_report.as_ref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

//! Central application state for abreview.
//!
//! This module owns all mutable UI state: the load lifecycle, the review
//! engine once data has arrived, blind-test submission state and transient
//! status text. No ratatui rendering logic lives here. The render module reads
//! it and the keybinding dispatcher mutates it.

use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::debug;

use abreview_core::engine::{MediaRequest, ReviewEngine};
use abreview_core::load::{LoadTracker, RequestToken};
use abreview_core::stats::Summary;
use abreview_core::types::{Choice, Evaluation};
use abreview_core::LoadError;

use crate::event::LoadedTask;
use crate::player::MpvPlayer;

/// How long a status-bar message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(5);

/// Longest page number accepted by the jump prompt.
const MAX_JUMP_DIGITS: usize = 6;

/// Editor mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Full-screen help overlay is shown above all panels.
    HelpOverlay,
}

/// Which flow the session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Browse recorded evaluations.
    Review,
    /// Record new evaluations.
    BlindTest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Human-readable reason; `r` retries.
    Failed(String),
}

/// Everything the loader needs to submit one choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    pub token: RequestToken,
    pub index: usize,
    pub pair_id: String,
    pub choice: Choice,
    pub is_blind: bool,
}

pub struct AppState {
    pub mode: Mode,
    pub view: ViewMode,
    pub task_id: String,
    pub load_state: LoadState,
    pub engine: Option<ReviewEngine<MpvPlayer>>,
    pub media_base: String,
    /// Whether the player backend is enabled; the view lists URLs otherwise.
    pub players_enabled: bool,

    loads: LoadTracker,
    submits: LoadTracker,
    is_blind: bool,
    /// Set once the last pair of a blind test has been submitted.
    pub completed: bool,
    pub submit_error: Option<String>,

    /// Digits typed so far for a page jump.
    pub jump_input: String,
    pub help_scroll: u16,
    /// Page-strip hit boxes from the last frame, for mouse clicks.
    pub page_hits: Vec<(Rect, usize)>,
    status: Option<(String, Instant)>,
}

impl AppState {
    pub fn new(view: ViewMode, task_id: String, media_base: String, players_enabled: bool) -> Self {
        Self {
            mode: Mode::default(),
            view,
            task_id,
            load_state: LoadState::Loading,
            engine: None,
            media_base,
            players_enabled,
            loads: LoadTracker::new(),
            submits: LoadTracker::new(),
            is_blind: false,
            completed: false,
            submit_error: None,
            jump_input: String::new(),
            help_scroll: 0,
            page_hits: Vec::new(),
            status: None,
        }
    }

    /// Starts a (re)load. Whatever was in flight is superseded.
    pub fn begin_load(&mut self) -> RequestToken {
        self.load_state = LoadState::Loading;
        self.loads.issue()
    }

    /// Applies a finished load. Returns the media request for the first pair.
    pub fn apply_loaded(
        &mut self,
        token: RequestToken,
        result: Result<Box<LoadedTask>, LoadError>,
    ) -> Option<MediaRequest> {
        if !self.loads.accept(token) {
            debug!(token = token.value(), "discarding superseded load");
            return None;
        }
        match result {
            Ok(loaded) => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.close();
                }
                let LoadedTask { results, is_blind } = *loaded;
                let (engine, request) = ReviewEngine::new(results, &self.media_base);
                self.engine = Some(engine);
                self.is_blind = is_blind;
                self.completed = false;
                self.submit_error = None;
                self.load_state = LoadState::Ready;
                request
            }
            Err(e) => {
                self.load_state = LoadState::Failed(e.to_string());
                None
            }
        }
    }

    /// Runs a navigation step on the engine, if loaded.
    pub fn navigate(
        &mut self,
        step: impl FnOnce(&mut ReviewEngine<MpvPlayer>) -> Option<MediaRequest>,
    ) -> Option<MediaRequest> {
        let request = step(self.engine.as_mut()?);
        if request.is_some() {
            self.submit_error = None;
        }
        request
    }

    /// True for a blind-test run on a task flagged blind; folder names stay hidden.
    pub fn is_blind(&self) -> bool {
        self.view == ViewMode::BlindTest && self.is_blind
    }

    pub fn is_submitting(&self) -> bool {
        self.submits.is_pending()
    }

    /// Prepares a submission for the pair on screen.
    ///
    /// Refused outside blind-test mode, before data has loaded, after the
    /// run is complete, and while another submission is in flight.
    pub fn begin_submit(&mut self, choice: Choice) -> Option<SubmitTicket> {
        if self.view != ViewMode::BlindTest
            || self.load_state != LoadState::Ready
            || self.completed
            || self.submits.is_pending()
        {
            return None;
        }
        let engine = self.engine.as_ref()?;
        let index = engine.session().current_index();
        let pair_id = engine.current()?.pair.id.clone();
        self.submit_error = None;
        Some(SubmitTicket {
            token: self.submits.issue(),
            index,
            pair_id,
            choice,
            is_blind: self.is_blind,
        })
    }

    /// Applies a finished submission. On success the view advances to the
    /// next pair, or marks the run complete after the last one.
    pub fn apply_submitted(
        &mut self,
        token: RequestToken,
        index: usize,
        result: Result<Evaluation, LoadError>,
    ) -> Option<MediaRequest> {
        if !self.submits.accept(token) {
            return None;
        }
        let engine = self.engine.as_mut()?;
        match result {
            Ok(evaluation) => {
                engine.record_evaluation(index, evaluation);
                if engine.session().current_index() != index {
                    return None;
                }
                if engine.session().has_next() {
                    engine.next()
                } else {
                    self.completed = true;
                    self.set_status("All pairs evaluated");
                    None
                }
            }
            Err(e) => {
                self.submit_error = Some(e.to_string());
                None
            }
        }
    }

    /// Hands freshly opened players to the engine. Player errors are shown
    /// only when the players belong to the pair on screen. Returns whether
    /// the players were kept, in which case autoplay should be scheduled.
    pub fn apply_media_ready(
        &mut self,
        generation: u64,
        left: Option<MpvPlayer>,
        right: Option<MpvPlayer>,
        errors: Vec<String>,
    ) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        if !engine.attach_media(generation, left, right) {
            return false;
        }
        if !errors.is_empty() {
            self.set_status(errors.join("; "));
        }
        true
    }

    /// Summary over the loaded results.
    pub fn summary(&self) -> Option<Summary> {
        let engine = self.engine.as_ref()?;
        Some(Summary::from_entries(engine.session().entries()))
    }

    pub fn push_jump_digit(&mut self, digit: char) {
        if self.jump_input.len() < MAX_JUMP_DIGITS {
            self.jump_input.push(digit);
        }
    }

    /// Consumes the jump prompt as a 0-based index. Page numbers are 1-based.
    pub fn take_jump_target(&mut self) -> Option<usize> {
        let input = std::mem::take(&mut self.jump_input);
        input.parse::<usize>().ok()?.checked_sub(1)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(message, _)| message.as_str())
    }

    /// Drops the status message once it has been shown long enough.
    pub fn expire_status(&mut self) {
        if self.status.as_ref().is_some_and(|(_, at)| at.elapsed() >= STATUS_TTL) {
            self.status = None;
        }
    }

    /// Releases players and abandons in-flight work.
    pub fn shutdown(&mut self) {
        self.loads.cancel();
        self.submits.cancel();
        if let Some(engine) = self.engine.as_mut() {
            engine.close();
        }
    }
}

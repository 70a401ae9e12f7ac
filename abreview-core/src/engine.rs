//! Ties navigation, playback sync and choice display together.
//!
//! The engine never opens media itself. Each pair change produces a
//! [`MediaRequest`]; the caller opens the players (possibly asynchronously)
//! and hands them back through [`ReviewEngine::attach_media`] with the same
//! generation. Media for a generation that is no longer current is refused
//! and dropped.

use tracing::{debug, warn};

use crate::api::media_url;
use crate::choice::{chosen_folder, resolve_display, ChoiceDisplay};
use crate::prompt::extract_prompt;
use crate::session::{Navigation, ReviewSession};
use crate::sync::{Correction, MediaElement, PlaybackSync};
use crate::types::{Evaluation, PairEntry, Side, TaskHeader, TaskResults};

/// Players the caller should open for the pair now on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    pub generation: u64,
    /// `None` when the pair has no media on that side.
    pub left_url: Option<String>,
    pub right_url: Option<String>,
}

pub struct ReviewEngine<M> {
    header: TaskHeader,
    session: ReviewSession,
    sync: PlaybackSync<M>,
    display: Option<ChoiceDisplay>,
    media_base: String,
    generation: u64,
}

impl<M: MediaElement> ReviewEngine<M> {
    /// Builds an engine positioned on the first pair, along with the media
    /// request for it (none for an empty task).
    pub fn new(results: TaskResults, media_base: &str) -> (Self, Option<MediaRequest>) {
        let mut engine = Self {
            header: results.header,
            session: ReviewSession::new(results.entries),
            sync: PlaybackSync::new(),
            display: None,
            media_base: media_base.to_owned(),
            generation: 0,
        };
        engine.refresh_display();
        let request = engine.media_request();
        (engine, request)
    }

    pub fn header(&self) -> &TaskHeader {
        &self.header
    }

    pub fn session(&self) -> &ReviewSession {
        &self.session
    }

    pub fn current(&self) -> Option<&PairEntry> {
        self.session.current()
    }

    /// Choice line for the current pair; `None` for an empty task.
    pub fn display(&self) -> Option<&ChoiceDisplay> {
        self.display.as_ref()
    }

    /// Human-readable prompt derived from the current pair's A filename.
    pub fn prompt(&self) -> Option<String> {
        let pair = &self.session.current()?.pair;
        let source = if pair.video_a_name.trim().is_empty() {
            pair.video_a_path.rsplit('/').next().unwrap_or_default()
        } else {
            pair.video_a_name.as_str()
        };
        Some(extract_prompt(source))
    }

    /// Generation of the pair on screen.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sync(&self) -> &PlaybackSync<M> {
        &self.sync
    }

    pub fn next(&mut self) -> Option<MediaRequest> {
        let nav = self.session.next();
        self.after_navigation(nav)
    }

    pub fn previous(&mut self) -> Option<MediaRequest> {
        let nav = self.session.previous();
        self.after_navigation(nav)
    }

    pub fn go_to(&mut self, index: usize) -> Option<MediaRequest> {
        let nav = self.session.go_to(index);
        self.after_navigation(nav)
    }

    /// Request for the current pair under the current generation. Used to
    /// reopen players after a failure without moving.
    pub fn media_request(&self) -> Option<MediaRequest> {
        let pair = &self.session.current()?.pair;
        let url = |side: Side| {
            let path = pair.path_on(side);
            (!path.trim().is_empty()).then(|| media_url(&self.media_base, path))
        };
        Some(MediaRequest {
            generation: self.generation,
            left_url: url(Side::Left),
            right_url: url(Side::Right),
        })
    }

    /// Hands opened players to the synchronizer. Returns false, dropping
    /// them, if the user has already moved on.
    pub fn attach_media(&mut self, generation: u64, left: Option<M>, right: Option<M>) -> bool {
        if generation != self.generation || self.session.is_empty() {
            debug!(generation, current = self.generation, "dropping stale media");
            return false;
        }
        self.sync.attach(left, right, generation);
        true
    }

    pub fn time_update(&mut self, source: Side, generation: u64) -> Option<Correction> {
        self.sync.on_time_update(source, generation)
    }

    pub fn autoplay(&mut self, generation: u64) {
        self.sync.setup_autoplay(generation);
    }

    /// Stores an evaluation for the pair at `index`, updating the choice line
    /// if that pair is on screen.
    pub fn record_evaluation(&mut self, index: usize, evaluation: Evaluation) {
        if !self.session.record(index, evaluation) {
            return;
        }
        self.header.evaluated_pairs =
            self.session.entries().iter().filter(|e| e.evaluation.is_some()).count();
        if index == self.session.current_index() {
            self.refresh_display();
        }
    }

    /// Releases the players and invalidates every outstanding generation.
    pub fn close(&mut self) {
        self.sync.detach();
        self.generation += 1;
    }

    fn after_navigation(&mut self, nav: Navigation) -> Option<MediaRequest> {
        let Navigation::Moved { from, to } = nav else {
            return None;
        };
        self.sync.detach();
        self.generation += 1;
        self.refresh_display();
        debug!(from, to, generation = self.generation, "pair changed");
        self.media_request()
    }

    fn refresh_display(&mut self) {
        let Some(entry) = self.session.current() else {
            self.display = None;
            return;
        };
        let folders = &self.header.folders;
        if let Some(evaluation) = &entry.evaluation {
            let derived = chosen_folder(&entry.pair, &evaluation.choice, folders);
            if let (Some(reported), Some(derived)) = (&evaluation.chosen_folder, &derived) {
                if reported != derived {
                    warn!(
                        pair_id = %entry.pair.id,
                        %reported,
                        %derived,
                        "server chosen folder disagrees with swap mapping"
                    );
                }
            }
        }
        self.display = Some(resolve_display(&entry.pair, entry.evaluation.as_ref(), folders));
    }
}

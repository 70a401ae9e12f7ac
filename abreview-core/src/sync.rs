//! Keeps two independently buffering players in lockstep.
//!
//! The synchronizer owns the two media elements of the pair on screen. Each
//! attach is stamped with a generation; time-update events carry the
//! generation they were produced under, so an event from a player that has
//! since been detached can never move the new pair's players.

use std::time::Duration;

use tracing::debug;

use crate::types::Side;

/// Maximum allowed desynchronization before the other player is re-seeked.
pub const DRIFT_TOLERANCE_SECS: f64 = 0.2;

/// Delay between attaching freshly opened media and starting playback, giving
/// the players time to load metadata.
pub const AUTOPLAY_DELAY: Duration = Duration::from_millis(200);

/// Error reported by a player that refused to start.
#[derive(Debug, thiserror::Error)]
#[error("playback rejected: {0}")]
pub struct MediaError(pub String);

/// A seekable, loopable media player.
///
/// Implementations must not block: `set_current_time` and `play` queue work
/// and return immediately.
pub trait MediaElement {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;
    /// Moves the playback position to `secs`.
    fn set_current_time(&mut self, secs: f64);
    /// Enables or disables looping at end of stream.
    fn set_looping(&mut self, looping: bool);
    /// Starts playback. A rejection is not fatal.
    fn play(&mut self) -> Result<(), MediaError>;
}

/// A correction applied by [`PlaybackSync::on_time_update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    /// Side that was re-seeked.
    pub target: Side,
    /// New position of the target, equal to the reporting side's position.
    pub to_secs: f64,
}

/// Owner of the two media elements currently on screen.
pub struct PlaybackSync<M> {
    left: Option<M>,
    right: Option<M>,
    generation: Option<u64>,
}

impl<M> Default for PlaybackSync<M> {
    fn default() -> Self {
        Self { left: None, right: None, generation: None }
    }
}

impl<M: MediaElement> PlaybackSync<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a pair's elements. Anything still attached is
    /// detached (and dropped) first.
    ///
    /// Either side may be `None` when that player failed to open; the other
    /// still plays, but no drift correction happens.
    pub fn attach(&mut self, left: Option<M>, right: Option<M>, generation: u64) {
        self.detach();
        self.left = left;
        self.right = right;
        self.generation = Some(generation);
        debug!(generation, "media attached");
    }

    /// Releases both elements. Later time updates and autoplay requests are
    /// ignored until the next [`attach`](Self::attach).
    pub fn detach(&mut self) -> (Option<M>, Option<M>) {
        if let Some(generation) = self.generation.take() {
            debug!(generation, "media detached");
        }
        (self.left.take(), self.right.take())
    }

    /// Generation of the attached pair, if any.
    pub fn generation(&self) -> Option<u64> {
        self.generation
    }

    pub fn is_attached(&self) -> bool {
        self.generation.is_some()
    }

    pub fn element(&self, side: Side) -> Option<&M> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    /// Handles a periodic time report from `source`.
    ///
    /// When the two positions differ by more than [`DRIFT_TOLERANCE_SECS`] the
    /// other element is moved to the reporter's position. Whichever side
    /// reports first does the correcting; once in sync, further reports are
    /// no-ops.
    pub fn on_time_update(&mut self, source: Side, generation: u64) -> Option<Correction> {
        if self.generation != Some(generation) {
            return None;
        }
        let (left, right) = (self.left.as_mut()?, self.right.as_mut()?);
        let (reporter, target) = match source {
            Side::Left => (left, right),
            Side::Right => (right, left),
        };

        let now = reporter.current_time();
        let drift = (now - target.current_time()).abs();
        if drift <= DRIFT_TOLERANCE_SECS {
            return None;
        }
        target.set_current_time(now);
        debug!(?source, drift, to = now, "corrected playback drift");
        Some(Correction { target: source.other(), to_secs: now })
    }

    /// Turns looping on and starts playback on every attached element.
    ///
    /// Rejected play attempts are logged and left for the user to retry.
    pub fn setup_autoplay(&mut self, generation: u64) {
        if self.generation != Some(generation) {
            return;
        }
        for (side, element) in [(Side::Left, self.left.as_mut()), (Side::Right, self.right.as_mut())] {
            let Some(element) = element else { continue };
            element.set_looping(true);
            if let Err(e) = element.play() {
                debug!(?side, error = %e, "autoplay rejected");
            }
        }
    }
}

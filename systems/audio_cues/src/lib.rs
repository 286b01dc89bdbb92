#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system translating round events into discrete audio cues.
//!
//! Cue delivery is fire-and-forget: emitter failures are logged and never
//! reach gameplay state.

use six_seven_core::{AudioCue, Event};
use thiserror::Error;
use tracing::{debug, warn};

/// Failure reported by an [`AudioCueEmitter`].
#[derive(Debug, Error)]
pub enum CueError {
    /// The audio backend is not available.
    #[error("audio backend unavailable: {0}")]
    Unavailable(String),
    /// The backend refused the cue.
    #[error("cue `{cue}` rejected: {reason}")]
    Rejected {
        /// Tag of the rejected cue.
        cue: &'static str,
        /// Backend supplied reason.
        reason: String,
    },
}

/// Destination for audio cues.
pub trait AudioCueEmitter {
    /// Plays or forwards a single cue.
    fn emit(&mut self, cue: AudioCue) -> Result<(), CueError>;
}

/// Pure system that maps round events onto cues.
#[derive(Clone, Copy, Debug)]
pub struct AudioCues {
    enabled: bool,
}

impl Default for AudioCues {
    fn default() -> Self {
        Self::new(true)
    }
}

impl AudioCues {
    /// Creates the system with the provided sound setting.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Reports whether cues are produced at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Toggles cue production.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Consumes world events and appends the cues they call for.
    ///
    /// Shield-protected taps and omissions are silent.
    pub fn handle(&self, events: &[Event], out: &mut Vec<AudioCue>) {
        if !self.enabled {
            return;
        }

        out.extend(events.iter().filter_map(|event| match event {
            Event::RoundStarted { .. } => Some(AudioCue::Start),
            Event::TargetHit { .. } => Some(AudioCue::Hit),
            Event::WrongTap { .. } => Some(AudioCue::Miss),
            Event::RoundEnded { .. } => Some(AudioCue::GameOver),
            _ => None,
        }));
    }
}

/// Forwards every cue to `emitter`, logging and discarding failures.
pub fn dispatch<E>(emitter: &mut E, cues: &[AudioCue])
where
    E: AudioCueEmitter + ?Sized,
{
    for &cue in cues {
        if let Err(error) = emitter.emit(cue) {
            warn!(cue = cue.tag(), %error, "audio cue dropped");
        }
    }
}

/// Emitter that writes cues to the tracing log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEmitter;

impl AudioCueEmitter for TracingEmitter {
    fn emit(&mut self, cue: AudioCue) -> Result<(), CueError> {
        debug!(cue = cue.tag(), "audio cue");
        Ok(())
    }
}

/// Emitter that stores cues in memory, optionally failing every call.
#[derive(Clone, Debug, Default)]
pub struct RecordingEmitter {
    cues: Vec<AudioCue>,
    failing: bool,
}

impl RecordingEmitter {
    /// Creates an emitter that rejects every cue after recording it.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            cues: Vec::new(),
            failing: true,
        }
    }

    /// Cues received so far, in order.
    #[must_use]
    pub fn cues(&self) -> &[AudioCue] {
        &self.cues
    }
}

impl AudioCueEmitter for RecordingEmitter {
    fn emit(&mut self, cue: AudioCue) -> Result<(), CueError> {
        self.cues.push(cue);
        if self.failing {
            return Err(CueError::Unavailable("recording emitter set to fail".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_system_stays_silent() {
        let mut cues = AudioCues::new(false);
        let mut out = Vec::new();
        cues.handle(&[Event::Paused], &mut out);
        assert!(out.is_empty());
        assert!(!cues.is_enabled());

        cues.set_enabled(true);
        assert!(cues.is_enabled());
    }

    #[test]
    fn failing_emitter_does_not_stop_dispatch() {
        let mut emitter = RecordingEmitter::failing();
        dispatch(&mut emitter, &[AudioCue::Start, AudioCue::Hit]);
        assert_eq!(emitter.cues(), &[AudioCue::Start, AudioCue::Hit]);
    }

    #[test]
    fn tracing_emitter_accepts_every_cue() {
        let mut emitter = TracingEmitter;
        for cue in [AudioCue::Hit, AudioCue::Miss, AudioCue::Start, AudioCue::GameOver] {
            assert!(emitter.emit(cue).is_ok());
        }
    }

    #[test]
    fn cue_errors_name_the_cue() {
        let error = CueError::Rejected {
            cue: AudioCue::Miss.tag(),
            reason: "muted".to_owned(),
        };
        assert_eq!(error.to_string(), "cue `miss` rejected: muted");
    }
}

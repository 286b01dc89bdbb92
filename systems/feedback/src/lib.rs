#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system deriving the transient feedback banner from round events.

use std::time::Duration;

use six_seven_core::{Event, PowerUpKind};

/// Running time a feedback banner stays visible.
pub const FEEDBACK_LIFETIME: Duration = Duration::from_millis(500);

/// Visual category of a feedback banner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedbackTone {
    /// Ordinary hit or combo.
    Combo,
    /// Golden target hit.
    Golden,
    /// Power-up collected.
    PowerUp,
    /// Shield absorbed a wrong tap.
    Protected,
    /// Unprotected wrong tap.
    Oops,
    /// A running combo was lost to an untouched target.
    Missed,
}

/// Banner shown to the player after a notable event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Feedback {
    /// Text to display.
    pub text: String,
    /// Visual category.
    pub tone: FeedbackTone,
}

impl Feedback {
    fn new(text: impl Into<String>, tone: FeedbackTone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// Announcement shown when a power-up is collected.
#[must_use]
pub const fn power_up_announcement(kind: PowerUpKind) -> &'static str {
    match kind {
        PowerUpKind::DoublePoints => "⚡ DOUBLE POINTS!",
        PowerUpKind::SlowTime => "🕐 SLOW TIME!",
        PowerUpKind::Shield => "🛡️ SHIELD!",
        PowerUpKind::Multiplier => "✨ 5X MULTIPLIER!",
    }
}

/// Tracks the current feedback banner and its age in running time.
#[derive(Clone, Debug, Default)]
pub struct FeedbackSystem {
    current: Option<Feedback>,
    age: Duration,
}

impl FeedbackSystem {
    /// Creates a system with no banner showing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Banner currently visible, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Feedback> {
        self.current.as_ref()
    }

    /// Consumes world events in order, replacing or expiring the banner.
    ///
    /// Returns `true` when the visible banner changed.
    pub fn handle(&mut self, events: &[Event]) -> bool {
        let before = self.current.clone();

        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.advance(*dt),
                Event::TargetHit { digit, combo, .. } => {
                    let feedback = if digit.is_golden() {
                        Feedback::new("✨ GOLDEN! x3 ✨", FeedbackTone::Golden)
                    } else if let Some(kind) = digit.power_up() {
                        Feedback::new(power_up_announcement(kind), FeedbackTone::PowerUp)
                    } else {
                        let streak = combo.saturating_sub(1);
                        if streak > 1 {
                            Feedback::new(format!("{streak}x COMBO!"), FeedbackTone::Combo)
                        } else {
                            Feedback::new("PERFECT!", FeedbackTone::Combo)
                        }
                    };
                    self.show(feedback);
                }
                Event::ShieldConsumed { .. } => {
                    self.show(Feedback::new("🛡️ PROTECTED!", FeedbackTone::Protected));
                }
                Event::WrongTap { .. } => self.show(Feedback::new("OOPS!", FeedbackTone::Oops)),
                Event::TargetOmitted { .. } => {
                    self.show(Feedback::new("MISSED!", FeedbackTone::Missed));
                }
                Event::RoundStarted { .. } | Event::RoundEnded { .. } => self.current = None,
                _ => {}
            }
        }

        before != self.current
    }

    fn show(&mut self, feedback: Feedback) {
        self.current = Some(feedback);
        self.age = Duration::ZERO;
    }

    fn advance(&mut self, dt: Duration) {
        if self.current.is_none() {
            return;
        }
        self.age = self.age.saturating_add(dt);
        if self.age >= FEEDBACK_LIFETIME {
            self.current = None;
        }
    }
}

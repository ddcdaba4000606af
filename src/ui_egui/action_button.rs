//! Call-to-action button shown once the countdown finishes.
//!
//! Pure state machine driven by `Instant`s so the fade-in and the delayed
//! redirect can be tested without a window.

use std::time::{Duration, Instant};

/// Pause between the reveal and the start of the fade.
pub const REVEAL_DELAY: Duration = Duration::from_millis(50);
/// Length of the fade-in.
pub const REVEAL_FADE: Duration = Duration::from_millis(400);
/// Pause between a click and opening the destination.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(300);

pub const IDLE_LABEL: &str = "Click Me!";
pub const REDIRECTING_LABEL: &str = "Redirecting...";
const PRESSED_SCALE: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonPhase {
    #[default]
    Hidden,
    Revealing {
        since: Instant,
    },
    Shown,
    Redirecting {
        since: Instant,
    },
    Redirected,
}

/// Something the host has to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Navigate,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ActionButton {
    phase: ButtonPhase,
}

impl ActionButton {
    pub fn phase(&self) -> ButtonPhase {
        self.phase
    }

    /// Start the reveal transition. Only the first call has any effect.
    pub fn reveal(&mut self, now: Instant) -> bool {
        if self.phase != ButtonPhase::Hidden {
            return false;
        }
        self.phase = ButtonPhase::Revealing { since: now };
        true
    }

    pub fn is_visible(&self) -> bool {
        self.phase != ButtonPhase::Hidden
    }

    /// 0.0 while hidden or during the reveal delay, ramping to 1.0 over the fade.
    pub fn opacity(&self, now: Instant) -> f32 {
        match self.phase {
            ButtonPhase::Hidden => 0.0,
            ButtonPhase::Revealing { since } => {
                let elapsed = now.saturating_duration_since(since);
                if elapsed < REVEAL_DELAY {
                    return 0.0;
                }
                let faded = (elapsed - REVEAL_DELAY).as_secs_f32() / REVEAL_FADE.as_secs_f32();
                faded.clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    /// Clicks land once the fade has started.
    pub fn is_clickable(&self, now: Instant) -> bool {
        match self.phase {
            ButtonPhase::Revealing { since } => now.saturating_duration_since(since) >= REVEAL_DELAY,
            ButtonPhase::Shown => true,
            _ => false,
        }
    }

    pub fn click(&mut self, now: Instant) -> bool {
        if !self.is_clickable(now) {
            return false;
        }
        log::info!("Button clicked! Redirecting...");
        self.phase = ButtonPhase::Redirecting { since: now };
        true
    }

    /// Advance timed transitions. Returns `Navigate` exactly once,
    /// `REDIRECT_DELAY` after a click.
    pub fn update(&mut self, now: Instant) -> Option<ButtonEvent> {
        match self.phase {
            ButtonPhase::Revealing { since }
                if now.saturating_duration_since(since) >= REVEAL_DELAY + REVEAL_FADE =>
            {
                self.phase = ButtonPhase::Shown;
                None
            }
            ButtonPhase::Redirecting { since }
                if now.saturating_duration_since(since) >= REDIRECT_DELAY =>
            {
                self.phase = ButtonPhase::Redirected;
                Some(ButtonEvent::Navigate)
            }
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.phase {
            ButtonPhase::Redirecting { .. } | ButtonPhase::Redirected => REDIRECTING_LABEL,
            _ => IDLE_LABEL,
        }
    }

    pub fn scale(&self) -> f32 {
        match self.phase {
            ButtonPhase::Redirecting { .. } | ButtonPhase::Redirected => PRESSED_SCALE,
            _ => 1.0,
        }
    }

    /// True while a timed transition still needs frames.
    pub fn is_animating(&self) -> bool {
        matches!(
            self.phase,
            ButtonPhase::Revealing { .. } | ButtonPhase::Redirecting { .. }
        )
    }
}

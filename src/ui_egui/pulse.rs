use std::time::{Duration, Instant};

pub const PULSE_DURATION: Duration = Duration::from_millis(200);
pub const PULSE_SCALE: f32 = 1.1;

/// Brief enlargement of the seconds figure after each live tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseEffect {
    started: Option<Instant>,
}

impl PulseEffect {
    pub fn trigger(&mut self, now: Instant) {
        self.started = Some(now);
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.started
            .is_some_and(|started| now.saturating_duration_since(started) < PULSE_DURATION)
    }

    pub fn scale(&self, now: Instant) -> f32 {
        if self.is_active(now) {
            PULSE_SCALE
        } else {
            1.0
        }
    }
}

//! Bridge between the countdown engine and the egui frame loop.
//!
//! The engine ticks on a runtime thread and writes into [`DisplayState`]
//! through [`FrameSink`]; the UI thread reads a [`FrameView`] each frame.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::services::countdown::{ActionSink, FormattedRemaining, RemainingDuration, RenderSink};

use super::action_button::{ActionButton, ButtonEvent};
use super::pulse::PulseEffect;

#[derive(Debug, Default)]
pub struct DisplayState {
    pub remaining: Option<RemainingDuration>,
    pub formatted: FormattedRemaining,
    pub pulse: PulseEffect,
    pub button: ActionButton,
    pub renders: u64,
}

/// Everything one frame needs, copied out so the lock is not held while drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub formatted: FormattedRemaining,
    pub seconds_scale: f32,
    pub button_visible: bool,
    pub button_opacity: f32,
    pub button_clickable: bool,
    pub button_label: &'static str,
    pub button_scale: f32,
    pub animating: bool,
    pub navigate: bool,
}

impl DisplayState {
    pub fn apply_render(&mut self, remaining: &RemainingDuration, now: Instant) {
        self.remaining = Some(*remaining);
        self.formatted = remaining.formatted();
        self.renders += 1;
        if !remaining.is_zero() {
            self.pulse.trigger(now);
        }
    }

    /// Advance timed effects to `now` and capture the frame.
    pub fn frame(&mut self, now: Instant) -> FrameView {
        let navigate = self.button.update(now) == Some(ButtonEvent::Navigate);

        FrameView {
            formatted: self.formatted.clone(),
            seconds_scale: self.pulse.scale(now),
            button_visible: self.button.is_visible(),
            button_opacity: self.button.opacity(now),
            button_clickable: self.button.is_clickable(now),
            button_label: self.button.label(),
            button_scale: self.button.scale(),
            animating: self.pulse.is_active(now) || self.button.is_animating(),
            navigate,
        }
    }
}

/// Render and action sink that feeds the window.
#[derive(Clone, Default)]
pub struct FrameSink {
    state: Arc<Mutex<DisplayState>>,
    ctx: Option<egui::Context>,
}

impl FrameSink {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            state: Arc::default(),
            ctx: Some(ctx),
        }
    }

    /// A sink that records state without a window to repaint.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> MutexGuard<'_, DisplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn request_repaint(&self) {
        if let Some(ctx) = &self.ctx {
            ctx.request_repaint();
        }
    }
}

impl RenderSink for FrameSink {
    fn render(&mut self, remaining: &RemainingDuration) {
        self.lock().apply_render(remaining, Instant::now());
        self.request_repaint();
    }
}

impl ActionSink for FrameSink {
    fn reveal(&mut self) {
        if self.lock().button.reveal(Instant::now()) {
            log::info!("Showing button - countdown finished!");
        }
        self.request_repaint();
    }
}

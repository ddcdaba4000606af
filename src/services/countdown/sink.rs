//! Host-side receivers for engine output.

use super::models::RemainingDuration;

/// Receives the remaining time after every tick.
#[cfg_attr(test, mockall::automock)]
pub trait RenderSink: Send {
    fn render(&mut self, remaining: &RemainingDuration);
}

impl<F> RenderSink for F
where
    F: FnMut(&RemainingDuration) + Send,
{
    fn render(&mut self, remaining: &RemainingDuration) {
        self(remaining)
    }
}

/// The call-to-action control. `reveal` is invoked exactly once, when the
/// countdown finishes.
#[cfg_attr(test, mockall::automock)]
pub trait ActionSink: Send {
    fn reveal(&mut self);
}

impl<F> ActionSink for F
where
    F: FnMut() + Send,
{
    fn reveal(&mut self) {
        self()
    }
}

/// Action sink for hosts without a call-to-action control.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopActionSink;

impl ActionSink for NoopActionSink {
    fn reveal(&mut self) {}
}

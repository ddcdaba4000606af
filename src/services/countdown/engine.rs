//! The countdown engine: owns the deadline, ticks, and finishes once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::clock::{Clock, SystemClock};
use super::error::CountdownError;
use super::models::{EngineState, RemainingDuration, TargetInstant};
use super::scheduler::{CancellationHandle, Scheduler, TokioScheduler};
use super::sink::{ActionSink, NoopActionSink, RenderSink};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// State shared between the engine handle and its scheduled task.
struct EngineCore {
    target: TargetInstant,
    state: EngineState,
    clock: Box<dyn Clock>,
    render: Box<dyn RenderSink>,
    action: Box<dyn ActionSink>,
    schedule: Option<CancellationHandle>,
    last_remaining: Option<RemainingDuration>,
}

impl EngineCore {
    fn tick(&mut self) -> RemainingDuration {
        if self.state == EngineState::Finished {
            return self.last_remaining.unwrap_or(RemainingDuration::ZERO);
        }

        let now = self.clock.now();
        let remaining = RemainingDuration::between(&self.target, &now);
        log::debug!(
            "Time remaining: {} ({} ms)",
            remaining,
            remaining.total_milliseconds
        );

        self.last_remaining = Some(remaining);
        self.render.render(&remaining);

        if remaining.is_zero() {
            self.finish();
        }

        remaining
    }

    fn finish(&mut self) {
        self.state = EngineState::Finished;
        if let Some(handle) = self.schedule.take() {
            handle.cancel();
        }
        log::info!("Countdown finished! Target {} reached", self.target);
        self.action.reveal();
    }
}

fn lock_core(core: &Mutex<EngineCore>) -> MutexGuard<'_, EngineCore> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

enum TargetInput {
    Text(String),
    Instant(TargetInstant),
}

/// Configures and starts a [`CountdownEngine`].
pub struct CountdownEngineBuilder {
    target: TargetInput,
    tick_interval: Duration,
    clock: Box<dyn Clock>,
    render: Box<dyn RenderSink>,
    action: Box<dyn ActionSink>,
}

impl CountdownEngineBuilder {
    fn new(target: TargetInput) -> Self {
        Self {
            target,
            tick_interval: DEFAULT_TICK_INTERVAL,
            clock: Box::new(SystemClock),
            render: Box::new(|_: &RemainingDuration| {}),
            action: Box::new(NoopActionSink),
        }
    }

    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn tick_interval_ms(self, millis: u64) -> Self {
        self.tick_interval(Duration::from_millis(millis))
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn render_sink(mut self, sink: impl RenderSink + 'static) -> Self {
        self.render = Box::new(sink);
        self
    }

    pub fn action_sink(mut self, sink: impl ActionSink + 'static) -> Self {
        self.action = Box::new(sink);
        self
    }

    /// Validate the target, render once, and start ticking on `scheduler`.
    ///
    /// A target that has already passed is not an error: the first tick
    /// reports zero, the engine finishes, and nothing is scheduled.
    pub fn initialize<S: Scheduler>(
        self,
        mut scheduler: S,
    ) -> Result<CountdownEngine<S>, CountdownError> {
        let target = match self.target {
            TargetInput::Text(text) => TargetInstant::parse(&text)?,
            TargetInput::Instant(instant) => instant,
        };
        if self.tick_interval.is_zero() {
            return Err(CountdownError::InvalidTickInterval);
        }

        log::info!(
            "Initializing countdown to {} (tick every {} ms)",
            target,
            self.tick_interval.as_millis()
        );

        let core = Arc::new(Mutex::new(EngineCore {
            target,
            state: EngineState::Running,
            clock: self.clock,
            render: self.render,
            action: self.action,
            schedule: None,
            last_remaining: None,
        }));

        let first = lock_core(&core).tick();

        let schedule = if first.is_zero() {
            log::info!("Target already reached at startup; not scheduling ticks");
            None
        } else {
            let task_core = Arc::clone(&core);
            let handle = scheduler.schedule_every(
                self.tick_interval,
                Box::new(move || {
                    lock_core(&task_core).tick();
                }),
            );

            let mut guard = lock_core(&core);
            if guard.state == EngineState::Finished {
                // A very short interval can fire before the handle is stored.
                scheduler.cancel(&handle);
                None
            } else {
                guard.schedule = Some(handle.clone());
                Some(handle)
            }
        };

        Ok(CountdownEngine {
            core,
            scheduler,
            schedule,
            tick_interval: self.tick_interval,
        })
    }
}

/// A running (or finished) countdown.
///
/// Owned by the host. Dropping the engine stops its schedule.
pub struct CountdownEngine<S: Scheduler = TokioScheduler> {
    core: Arc<Mutex<EngineCore>>,
    scheduler: S,
    schedule: Option<CancellationHandle>,
    tick_interval: Duration,
}

impl CountdownEngine<TokioScheduler> {
    /// Builder for a countdown to `target`, an ISO-8601 timestamp with offset.
    pub fn builder(target: impl Into<String>) -> CountdownEngineBuilder {
        CountdownEngineBuilder::new(TargetInput::Text(target.into()))
    }

    /// Builder for a countdown to an already parsed instant.
    pub fn builder_for(target: TargetInstant) -> CountdownEngineBuilder {
        CountdownEngineBuilder::new(TargetInput::Instant(target))
    }
}

impl<S: Scheduler> CountdownEngine<S> {
    /// Recompute the remaining time and render it, finishing if it hit zero.
    /// A no-op returning zero once finished.
    pub fn tick(&self) -> RemainingDuration {
        self.lock().tick()
    }

    /// Cancel the periodic schedule if one is active. Idempotent, and does
    /// not touch the tick state, so sinks may trigger it mid-tick through
    /// [`CountdownEngine::cancellation_handle`].
    pub fn stop(&mut self) {
        if let Some(handle) = self.schedule.take() {
            if !handle.is_cancelled() {
                log::debug!("Stopping countdown schedule {}", handle.id());
            }
            self.scheduler.cancel(&handle);
        }
    }

    pub fn state(&self) -> EngineState {
        self.lock().state
    }

    pub fn is_finished(&self) -> bool {
        self.state() == EngineState::Finished
    }

    pub fn target(&self) -> TargetInstant {
        self.lock().target
    }

    /// Remaining time computed by the most recent tick.
    pub fn last_remaining(&self) -> Option<RemainingDuration> {
        self.lock().last_remaining
    }

    pub fn is_scheduled(&self) -> bool {
        self.schedule
            .as_ref()
            .is_some_and(|handle| !handle.is_cancelled())
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Token that cancels the schedule without access to the engine.
    pub fn cancellation_handle(&self) -> Option<CancellationHandle> {
        self.schedule.clone()
    }

    fn lock(&self) -> MutexGuard<'_, EngineCore> {
        lock_core(&self.core)
    }
}

impl<S: Scheduler> Drop for CountdownEngine<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::countdown::clock::ManualClock;
    use crate::services::countdown::scheduler::ManualScheduler;
    use crate::services::countdown::sink::{MockActionSink, MockRenderSink};
    use chrono::{DateTime, Utc};
    use mockall::Sequence;

    const TARGET: &str = "2025-08-25T00:00:00+05:30";

    fn at(input: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(input).unwrap().with_timezone(&Utc)
    }

    fn manual_at(input: &str) -> ManualScheduler {
        ManualScheduler::new(ManualClock::new(at(input)))
    }

    #[test]
    fn invalid_target_prevents_start() {
        let scheduler = manual_at("2025-08-24T23:59:00+05:30");
        let mut render = MockRenderSink::new();
        render.expect_render().never();

        let result = CountdownEngine::builder("not a date")
            .clock(scheduler.clock().clone())
            .render_sink(render)
            .initialize(scheduler.clone());

        assert!(matches!(result, Err(CountdownError::InvalidTarget { .. })));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let scheduler = manual_at("2025-08-24T23:59:00+05:30");

        let result = CountdownEngine::builder(TARGET)
            .tick_interval(Duration::ZERO)
            .clock(scheduler.clock().clone())
            .initialize(scheduler.clone());

        assert!(matches!(result, Err(CountdownError::InvalidTickInterval)));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn initialize_renders_immediately_and_schedules() {
        let scheduler = manual_at("2025-08-24T23:59:59+05:30");
        let mut render = MockRenderSink::new();
        render
            .expect_render()
            .withf(|remaining| remaining.seconds == 1 && remaining.total_milliseconds == 1000)
            .times(1)
            .return_const(());
        let mut action = MockActionSink::new();
        action.expect_reveal().never();

        let engine = CountdownEngine::builder(TARGET)
            .clock(scheduler.clock().clone())
            .render_sink(render)
            .action_sink(action)
            .initialize(scheduler.clone())
            .unwrap();

        assert_eq!(engine.state(), EngineState::Running);
        assert!(engine.is_scheduled());
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn finishing_renders_zero_then_reveals_once() {
        let scheduler = manual_at("2025-08-24T23:59:58+05:30");
        let mut seq = Sequence::new();
        let mut render = MockRenderSink::new();
        render
            .expect_render()
            .withf(|remaining| !remaining.is_zero())
            .times(2)
            .in_sequence(&mut seq)
            .return_const(());
        render
            .expect_render()
            .withf(|remaining| remaining.is_zero())
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        let mut action = MockActionSink::new();
        action
            .expect_reveal()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let engine = CountdownEngine::builder(TARGET)
            .clock(scheduler.clock().clone())
            .render_sink(render)
            .action_sink(action)
            .initialize(scheduler.clone())
            .unwrap();

        let fired = scheduler.advance(Duration::from_secs(10));

        assert_eq!(fired, 2);
        assert!(engine.is_finished());
        assert!(!engine.is_scheduled());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn past_target_finishes_on_first_tick_without_scheduling() {
        let scheduler = manual_at("2025-08-25T01:00:00+05:30");
        let mut render = MockRenderSink::new();
        render
            .expect_render()
            .withf(|remaining| *remaining == RemainingDuration::ZERO)
            .times(1)
            .return_const(());
        let mut action = MockActionSink::new();
        action.expect_reveal().times(1).return_const(());

        let engine = CountdownEngine::builder(TARGET)
            .clock(scheduler.clock().clone())
            .render_sink(render)
            .action_sink(action)
            .initialize(scheduler.clone())
            .unwrap();

        assert!(engine.is_finished());
        assert!(!engine.is_scheduled());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn ticks_after_finish_are_noops() {
        let scheduler = manual_at("2025-08-25T00:00:00+05:30");
        let mut render = MockRenderSink::new();
        render.expect_render().times(1).return_const(());
        let mut action = MockActionSink::new();
        action.expect_reveal().times(1).return_const(());

        let engine = CountdownEngine::builder(TARGET)
            .clock(scheduler.clock().clone())
            .render_sink(render)
            .action_sink(action)
            .initialize(scheduler.clone())
            .unwrap();

        for _ in 0..5 {
            assert_eq!(engine.tick(), RemainingDuration::ZERO);
        }
        assert_eq!(engine.state(), EngineState::Finished);
    }

    #[test]
    fn stop_prevents_further_ticks_and_is_idempotent() {
        let scheduler = manual_at("2025-08-24T23:00:00+05:30");
        let mut render = MockRenderSink::new();
        // Initial render plus two scheduled ticks.
        render.expect_render().times(3).return_const(());

        let mut engine = CountdownEngine::builder(TARGET)
            .clock(scheduler.clock().clone())
            .render_sink(render)
            .initialize(scheduler.clone())
            .unwrap();

        scheduler.advance(Duration::from_secs(2));
        engine.stop();
        engine.stop();
        scheduler.advance(Duration::from_secs(30));

        assert!(!engine.is_scheduled());
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn dropping_the_engine_cancels_its_schedule() {
        let scheduler = manual_at("2025-08-24T23:00:00+05:30");
        let engine = CountdownEngine::builder(TARGET)
            .clock(scheduler.clock().clone())
            .initialize(scheduler.clone())
            .unwrap();
        assert_eq!(scheduler.pending(), 1);

        drop(engine);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn builder_for_parsed_instant() {
        let scheduler = manual_at("2025-08-24T23:59:00+05:30");
        let target = TargetInstant::parse(TARGET).unwrap();

        let engine = CountdownEngine::builder_for(target)
            .tick_interval_ms(250)
            .clock(scheduler.clock().clone())
            .initialize(scheduler.clone())
            .unwrap();

        assert_eq!(engine.target(), target);
        assert_eq!(engine.tick_interval(), Duration::from_millis(250));
        assert_eq!(
            engine.last_remaining().map(|r| r.total_milliseconds),
            Some(60_000)
        );
    }
}

// Test fixtures - reusable test data
// Provides consistent instants and a recording engine harness across test files

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use launch_countdown::services::countdown::{
    CountdownEngine, CountdownError, ManualClock, ManualScheduler, RemainingDuration,
};

/// Sample instants for testing
pub mod dates {
    use super::*;

    /// The default deadline: Aug 25, 2025 at midnight IST
    pub const TARGET: &str = "2025-08-25T00:00:00+05:30";

    pub fn at(input: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(input)
            .unwrap()
            .with_timezone(&Utc)
    }

    /// One second before the deadline
    pub fn one_second_before() -> DateTime<Utc> {
        at("2025-08-24T23:59:59+05:30")
    }

    /// Exactly the deadline
    pub fn deadline() -> DateTime<Utc> {
        at(TARGET)
    }

    /// 1 day, 1 hour, 1 minute and 1 second before the deadline
    pub fn one_of_each_before() -> DateTime<Utc> {
        deadline() - chrono::Duration::milliseconds(90_061_000)
    }

    /// An hour after the deadline
    pub fn an_hour_after() -> DateTime<Utc> {
        deadline() + chrono::Duration::hours(1)
    }
}

/// An engine on a simulated clock whose sinks record everything they receive.
pub struct Harness {
    pub scheduler: ManualScheduler,
    pub engine: CountdownEngine<ManualScheduler>,
    renders: Arc<Mutex<Vec<RemainingDuration>>>,
    reveals: Arc<AtomicUsize>,
}

impl Harness {
    pub fn start(target: &str, now: DateTime<Utc>) -> Result<Self, CountdownError> {
        Self::start_with_interval(target, now, Duration::from_millis(1000))
    }

    pub fn start_with_interval(
        target: &str,
        now: DateTime<Utc>,
        interval: Duration,
    ) -> Result<Self, CountdownError> {
        let scheduler = ManualScheduler::new(ManualClock::new(now));
        let renders = Arc::new(Mutex::new(Vec::new()));
        let reveals = Arc::new(AtomicUsize::new(0));

        let render_log = Arc::clone(&renders);
        let reveal_count = Arc::clone(&reveals);
        let engine = CountdownEngine::builder(target)
            .tick_interval(interval)
            .clock(scheduler.clock().clone())
            .render_sink(move |remaining: &RemainingDuration| {
                render_log.lock().unwrap().push(*remaining);
            })
            .action_sink(move || {
                reveal_count.fetch_add(1, Ordering::SeqCst);
            })
            .initialize(scheduler.clone())?;

        Ok(Self {
            scheduler,
            engine,
            renders,
            reveals,
        })
    }

    pub fn advance(&self, by: Duration) -> usize {
        self.scheduler.advance(by)
    }

    pub fn renders(&self) -> Vec<RemainingDuration> {
        self.renders.lock().unwrap().clone()
    }

    pub fn last_render(&self) -> Option<RemainingDuration> {
        self.renders.lock().unwrap().last().copied()
    }

    pub fn reveals(&self) -> usize {
        self.reveals.load(Ordering::SeqCst)
    }
}

//! Periodic scheduling for countdown ticks.
//!
//! The engine never talks to a timer directly. It registers a task through
//! [`Scheduler::schedule_every`] and keeps the returned
//! [`CancellationHandle`], which lets it stop the schedule from inside a
//! running tick without needing the scheduler itself.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::clock::ManualClock;

/// Work run on every scheduled tick.
pub type TickTask = Box<dyn FnMut() + Send + 'static>;

/// Shortest period a scheduler will honour; zero would spin.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Token identifying one periodic schedule. Clones refer to the same
/// schedule; cancelling any of them stops it.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl CancellationHandle {
    fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop the schedule before its next invocation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Registers periodic work.
pub trait Scheduler {
    fn schedule_every(&mut self, interval: Duration, task: TickTask) -> CancellationHandle;

    fn cancel(&mut self, handle: &CancellationHandle) {
        handle.cancel();
    }
}

/// Runs each schedule as a task on a tokio runtime.
pub struct TokioScheduler {
    runtime: Handle,
    tasks: Vec<(CancellationHandle, JoinHandle<()>)>,
    next_id: u64,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Schedule onto the runtime the caller is currently inside.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    pub fn active_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|(handle, join)| !handle.is_cancelled() && !join.is_finished())
            .count()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_every(&mut self, interval: Duration, mut task: TickTask) -> CancellationHandle {
        let interval = interval.max(MIN_INTERVAL);
        let handle = CancellationHandle::new(self.next_id);
        self.next_id += 1;

        let token = handle.clone();
        let join = self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if token.is_cancelled() {
                    break;
                }
                task();
            }
        });

        self.tasks.retain(|(_, join)| !join.is_finished());
        self.tasks.push((handle.clone(), join));
        handle
    }

    fn cancel(&mut self, handle: &CancellationHandle) {
        handle.cancel();
        self.tasks.retain(|(existing, join)| {
            if existing.id() == handle.id() {
                join.abort();
                false
            } else {
                true
            }
        });
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (handle, join) in self.tasks.drain(..) {
            handle.cancel();
            join.abort();
        }
    }
}

struct ManualEntry {
    handle: CancellationHandle,
    interval: Duration,
    next_due: Duration,
    task: Option<TickTask>,
}

#[derive(Default)]
struct ManualQueue {
    elapsed: Duration,
    entries: Vec<ManualEntry>,
}

/// Deterministic scheduler for tests and simulations.
///
/// Time only moves through [`ManualScheduler::advance`], which also moves
/// the paired [`ManualClock`] so that every task observes the instant it
/// was due at. Clones share the same queue.
#[derive(Clone)]
pub struct ManualScheduler {
    clock: ManualClock,
    queue: Arc<Mutex<ManualQueue>>,
    next_id: Arc<AtomicU64>,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            queue: Arc::new(Mutex::new(ManualQueue::default())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Number of schedules that have not been cancelled.
    pub fn pending(&self) -> usize {
        self.lock_queue()
            .entries
            .iter()
            .filter(|entry| !entry.handle.is_cancelled())
            .count()
    }

    /// Move time forward by `by`, running every task that falls due on the
    /// way in due order. Returns how many task invocations happened.
    pub fn advance(&self, by: Duration) -> usize {
        let deadline = self.lock_queue().elapsed + by;
        let mut fired = 0;

        loop {
            let due = {
                let mut guard = self.lock_queue();
                let queue = &mut *guard;
                queue.entries.retain(|entry| !entry.handle.is_cancelled());

                let next = queue
                    .entries
                    .iter_mut()
                    .filter(|entry| entry.task.is_some() && entry.next_due <= deadline)
                    .min_by_key(|entry| entry.next_due);

                match next {
                    Some(entry) => {
                        let at = entry.next_due;
                        entry.next_due += entry.interval;
                        let handle = entry.handle.clone();
                        let task = entry.task.take();
                        let step = at.saturating_sub(queue.elapsed);
                        queue.elapsed = at;
                        Some((step, handle, task))
                    }
                    None => None,
                }
            };

            let Some((step, handle, task)) = due else {
                break;
            };
            self.move_clock(step);

            // Run without holding the queue so the task may cancel itself.
            let Some(mut task) = task else {
                continue;
            };
            task();
            fired += 1;

            let mut queue = self.lock_queue();
            if let Some(entry) = queue
                .entries
                .iter_mut()
                .find(|entry| entry.handle.id() == handle.id())
            {
                entry.task = Some(task);
            }
        }

        let step = {
            let mut queue = self.lock_queue();
            let step = deadline.saturating_sub(queue.elapsed);
            queue.elapsed = deadline;
            step
        };
        self.move_clock(step);

        fired
    }

    fn move_clock(&self, step: Duration) {
        if step.is_zero() {
            return;
        }
        let delta = chrono::Duration::from_std(step).unwrap_or_else(|_| chrono::Duration::zero());
        self.clock.advance(delta);
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, ManualQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_every(&mut self, interval: Duration, task: TickTask) -> CancellationHandle {
        let interval = interval.max(MIN_INTERVAL);
        let handle = CancellationHandle::new(self.next_id.fetch_add(1, Ordering::SeqCst));

        let mut queue = self.lock_queue();
        let next_due = queue.elapsed + interval;
        queue.entries.push(ManualEntry {
            handle: handle.clone(),
            interval,
            next_due,
            task: Some(task),
        });

        handle
    }
}

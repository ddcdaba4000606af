mod clock;
mod engine;
mod error;
mod models;
mod scheduler;
mod sink;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{CountdownEngine, CountdownEngineBuilder, DEFAULT_TICK_INTERVAL};
pub use error::CountdownError;
pub use models::{
    format_component, EngineState, FormattedRemaining, RemainingDuration, TargetInstant,
    SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE,
};
pub use scheduler::{CancellationHandle, ManualScheduler, Scheduler, TickTask, TokioScheduler};
pub use sink::{ActionSink, NoopActionSink, RenderSink};

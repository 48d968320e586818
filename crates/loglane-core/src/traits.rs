use crate::error::SinkError;
use crate::event::{Event, Level};

/// A destination for log events.
///
/// The dispatcher calls [`deliver`](Sink::deliver) for every event whose
/// level is at or above [`level`](Sink::level). Implementations must be safe
/// to call from any thread, including while [`shutdown`](Sink::shutdown) is in
/// progress on another one: once shutdown has begun, deliveries are dropped
/// instead of blocking or panicking.
pub trait Sink: Send + Sync {
    /// Short name of the sink kind, used in diagnostics
    fn name(&self) -> &'static str;

    /// Minimum level this sink accepts
    fn level(&self) -> Level;

    /// Hand one event to the sink.
    ///
    /// Synchronous sinks write before returning; queued sinks only enqueue.
    /// Dropping an event because a queue is full is not an error.
    fn deliver(&self, event: &Event) -> Result<(), SinkError>;

    /// Release the sink's resources, flushing whatever is already queued.
    ///
    /// Blocks until any worker has stopped. Calling it again is a no-op.
    fn shutdown(&self);

    /// Whether an event at `level` passes this sink's threshold
    fn accepts(&self, level: Level) -> bool {
        level >= self.level()
    }
}

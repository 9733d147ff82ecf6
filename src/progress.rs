use bevy_math::IVec2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a solve looks like from the outside at one yield point.
#[derive(Debug)]
pub struct Snapshot<'a> {
    /// The current status message.
    pub message: &'a str,
    /// The most recently validated path.
    pub path: &'a [IVec2],
    /// How many paths have been taken off the search stack so far.
    pub path_attempts: u64,
    /// Time elapsed since the solve started.
    pub time_taken: Duration,
}

/// A cloneable handle that cancels a running solve.
///
/// Every long loop in the solver polls the token at its yield points and
/// unwinds promptly once it is cancelled. Observers may hold a clone and
/// cancel from within their callback.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Ask the solve to stop at its next yield point.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

pub(crate) type Observer = Box<dyn FnMut(&Snapshot<'_>)>;

/// The solver's heartbeat: a yield deadline compared against the clock in
/// every inner loop, observer dispatch, and the cancellation flag.
pub(crate) struct Progress {
    observers: Vec<Observer>,
    cancel: CancelToken,
    interval: Duration,
    started: Instant,
    yield_at: Instant,
    pub message: String,
    pub path: Vec<IVec2>,
    pub path_attempts: u64,
    pub time_taken: Duration,
}

impl Progress {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            observers: Vec::new(),
            cancel: CancelToken::default(),
            interval: Duration::from_millis(100),
            started: now,
            yield_at: now,
            message: String::new(),
            path: Vec::new(),
            path_attempts: 0,
            time_taken: Duration::ZERO,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn register_observer(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Reset the clock and counters for a fresh solve.
    pub fn begin(&mut self, message: &str) {
        self.started = Instant::now();
        self.yield_at = self.started + self.interval;
        self.message.clear();
        self.message.push_str(message);
        self.path.clear();
        self.path_attempts = 0;
        self.time_taken = Duration::ZERO;
    }

    /// Poll the yield deadline and the cancellation flag. Notifies observers
    /// when the deadline has passed. Returns `false` once the solve has been
    /// cancelled; callers unwind without mutating committed state.
    #[inline]
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        if now > self.yield_at {
            self.notify();
            self.yield_at = now + self.interval;
        }
        !self.cancel.is_cancelled()
    }

    /// Invoke every observer with a snapshot of the current state.
    pub fn notify(&mut self) {
        self.time_taken = self.started.elapsed();
        let Self { observers, message, path, path_attempts, time_taken, .. } = self;
        let snapshot = Snapshot {
            message: message.as_str(),
            path: path.as_slice(),
            path_attempts: *path_attempts,
            time_taken: *time_taken,
        };
        for observer in observers.iter_mut() {
            observer(&snapshot);
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cancel_token_is_shared() {
        let progress = Progress::new();
        let token = progress.cancel_token();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(progress.cancel_token().is_cancelled());
    }

    #[test]
    fn test_tick_reports_cancellation() {
        let mut progress = Progress::new();
        progress.begin("Solving...");
        assert!(progress.tick());
        progress.cancel_token().cancel();
        assert!(!progress.tick());
    }

    #[test]
    fn test_observers_fire_after_deadline() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut progress = Progress::new();
        progress.set_interval(Duration::ZERO);
        progress.begin("Solving...");
        progress.path_attempts = 7;

        let seen = Rc::new(Cell::new(0u64));
        let seen_by_observer = Rc::clone(&seen);
        progress.register_observer(Box::new(move |snapshot| {
            seen_by_observer.set(snapshot.path_attempts);
        }));

        // A zero interval makes the first tick past-deadline.
        std::thread::sleep(Duration::from_millis(1));
        assert!(progress.tick());
        assert_eq!(seen.get(), 7);
    }
}

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic clock shared by everything that reads animation time.
///
/// Clones share the same time source. A clock can be switched to manual time, which tests use to
/// step animations deterministically.
#[derive(Debug, Clone)]
pub struct Clock {
    inner: Rc<RefCell<ClockInner>>,
}

#[derive(Debug)]
struct ClockInner {
    start: Instant,
    manual: Option<Duration>,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ClockInner {
                start: Instant::now(),
                manual: None,
            })),
        }
    }

    /// Clock frozen at `time` until changed with [`Clock::set_time`] or [`Clock::advance`].
    pub fn manual(time: Duration) -> Self {
        let clock = Self::new();
        clock.set_time(time);
        clock
    }

    /// Time since the clock was created.
    pub fn now(&self) -> Duration {
        let inner = self.inner.borrow();
        inner.manual.unwrap_or_else(|| inner.start.elapsed())
    }

    pub fn set_time(&self, time: Duration) {
        self.inner.borrow_mut().manual = Some(time);
    }

    pub fn advance(&self, by: Duration) {
        let now = self.now();
        self.set_time(now + by);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

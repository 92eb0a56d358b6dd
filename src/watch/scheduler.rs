//! Timer primitives driven by caller-supplied time, so the same code runs
//! under a host event loop or a test clock.

/// Identifies one scheduled unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    handle: TaskHandle,
    due_ms: u64,
    work: T,
}

/// Coalesces bursts: each `schedule` replaces the pending work and pushes
/// its deadline to `now + window`. Work runs once the window passes quietly.
#[derive(Debug)]
pub struct Coalescer<T> {
    window_ms: u64,
    pending: Option<Pending<T>>,
    next_handle: u64,
}

impl<T> Coalescer<T> {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending: None,
            next_handle: 0,
        }
    }

    pub fn schedule(&mut self, now_ms: u64, work: T) -> TaskHandle {
        self.next_handle += 1;
        let handle = TaskHandle(self.next_handle);
        self.pending = Some(Pending {
            handle,
            due_ms: now_ms.saturating_add(self.window_ms),
            work,
        });
        handle
    }

    /// Drops the pending work if `handle` is still the latest schedule.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        if self.pending.as_ref().is_some_and(|p| p.handle == handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.due_ms)
    }

    /// Takes the work if its deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| now_ms >= p.due_ms) {
            self.pending.take().map(|p| p.work)
        } else {
            None
        }
    }
}

/// Fixed-period ticker. Missed periods collapse into one firing.
#[derive(Debug, Clone)]
pub struct Interval {
    period_ms: u64,
    next_due_ms: u64,
}

impl Interval {
    pub fn new(period_ms: u64, start_ms: u64) -> Self {
        Self {
            period_ms,
            next_due_ms: start_ms.saturating_add(period_ms),
        }
    }

    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_due_ms {
            return false;
        }
        let period = self.period_ms.max(1);
        let missed = (now_ms - self.next_due_ms) / period;
        self.next_due_ms += (missed + 1) * period;
        true
    }
}

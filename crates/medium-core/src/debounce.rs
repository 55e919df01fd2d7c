use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy)]
struct Pending {
    id: TimerId,
    deadline: Duration,
}

/// Coalesces bursts of signals: each `schedule` replaces the pending timer, so
/// only the last signal of a burst fires.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    next_id: u64,
    pending: Option<Pending>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_id: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, now: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        if let Some(previous) = self.pending.replace(Pending {
            id,
            deadline: now + self.delay,
        }) {
            tracing::trace!(target: "editor.debounce", replaced = previous.id.0, id = id.0, "reschedule");
        }
        id
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Fire the pending timer if its deadline has passed.
    pub fn poll(&mut self, now: Duration) -> Option<TimerId> {
        let pending = self.pending?;
        if now < pending.deadline {
            return None;
        }
        self.pending = None;
        Some(pending.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_fires_once_for_the_last_signal() {
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.schedule(Duration::from_millis(0));
        debouncer.schedule(Duration::from_millis(5));
        let last = debouncer.schedule(Duration::from_millis(8));

        assert_eq!(debouncer.poll(Duration::from_millis(12)), None);
        assert_eq!(debouncer.poll(Duration::from_millis(18)), Some(last));
        assert_eq!(debouncer.poll(Duration::from_millis(30)), None);
    }

    #[test]
    fn zero_delay_fires_on_next_poll() {
        let mut debouncer = Debouncer::new(Duration::ZERO);
        let id = debouncer.schedule(Duration::from_millis(3));
        assert_eq!(debouncer.poll(Duration::from_millis(3)), Some(id));
    }
}

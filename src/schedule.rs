use std::time::Instant;

/// A timer waiting to fire. `generation` ties it to the spin that scheduled
/// it so later spins can invalidate it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheduled<K> {
    pub due: Instant,
    pub generation: u64,
    pub kind: K,
}

/// Frame-polled timer queue. Nothing fires on its own: the owner calls
/// [`TimerQueue::pop_due`] once per frame.
#[derive(Clone, Debug)]
pub struct TimerQueue<K> {
    timers: Vec<Scheduled<K>>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        TimerQueue { timers: Vec::new() }
    }
}

impl<K: Copy + Eq> TimerQueue<K> {
    pub fn schedule(&mut self, due: Instant, generation: u64, kind: K) {
        self.timers.push(Scheduled {
            due,
            generation,
            kind,
        });
    }

    /// Drops every timer scheduled by a generation older than `current`.
    pub fn retain_generation(&mut self, current: u64) {
        self.timers.retain(|t| t.generation == current);
    }

    pub fn cancel(&mut self, kind: K) {
        self.timers.retain(|t| t.kind != kind);
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Removes and returns the timers due at `now`, earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<Scheduled<K>> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|t| t.due <= now);
        self.timers = pending;
        due.sort_by_key(|t| t.due);
        due
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.due).min()
    }
}

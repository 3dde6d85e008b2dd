//! Deterministic cooperative scheduler.
//!
//! Time only moves when [`Scheduler::advance`] is called, once per platform
//! frame. Due work is handed out one callback at a time by
//! [`Scheduler::next_due`], so a callback can cancel another that is due in
//! the same frame and the cancelled one will not fire.

use std::collections::BTreeMap;

/// Opaque handle for one scheduled unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy)]
enum Kind {
    Interval { period: u64 },
    Timeout,
    // Frame callbacks fire on the first frame after the one they were requested in.
    Frame { requested_in: u64 },
}

#[derive(Debug)]
struct Entry<T> {
    kind: Kind,
    due: u64,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now: u64,
    frame: u64,
    next_id: u64,
    entries: BTreeMap<TimerHandle, Entry<T>>,
}

impl<T: Copy> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            frame: 0,
            next_id: 0,
            entries: BTreeMap::new(),
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of live (not yet fired or cancelled) entries.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Fire `task` every `period_ms`, first firing one period from now.
    pub fn set_interval(&mut self, period_ms: u64, task: T) -> TimerHandle {
        let period = period_ms.max(1);
        self.insert(Kind::Interval { period }, self.now + period, task)
    }

    /// Fire `task` once, `delay_ms` from now.
    pub fn set_timeout(&mut self, delay_ms: u64, task: T) -> TimerHandle {
        self.insert(Kind::Timeout, self.now + delay_ms, task)
    }

    /// Fire `task` once on the next frame.
    pub fn request_frame(&mut self, task: T) -> TimerHandle {
        let requested_in = self.frame;
        self.insert(Kind::Frame { requested_in }, self.now, task)
    }

    /// Cancel a pending entry. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    /// Move the clock forward and open a new frame.
    pub fn advance(&mut self, elapsed_ms: u64) {
        self.now += elapsed_ms;
        self.frame += 1;
    }

    /// Pop the next callback that is due at the current time.
    ///
    /// Timers come first in due order (ties broken by creation order), then
    /// frame callbacks in request order. Intervals are re-armed at fixed rate,
    /// so a long frame yields every period it covered.
    pub fn next_due(&mut self) -> Option<(TimerHandle, T)> {
        let timed = self
            .entries
            .iter()
            .filter(|(_, e)| !matches!(e.kind, Kind::Frame { .. }) && e.due <= self.now)
            .min_by_key(|(h, e)| (e.due, **h))
            .map(|(h, _)| *h);

        let frame = self.frame;
        let handle = timed.or_else(|| {
            self.entries
                .iter()
                .find(|(_, e)| matches!(e.kind, Kind::Frame { requested_in } if requested_in < frame))
                .map(|(h, _)| *h)
        })?;

        let entry = self.entries.get_mut(&handle)?;
        let task = entry.task;
        if let Kind::Interval { period } = entry.kind {
            entry.due += period;
        } else {
            self.entries.remove(&handle);
        }
        Some((handle, task))
    }

    fn insert(&mut self, kind: Kind, due: u64, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.insert(handle, Entry { kind, due, task });
        handle
    }
}

impl<T: Copy> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

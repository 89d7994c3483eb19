//! Tick scheduling
//!
//! The engine never owns a timer directly. It arms and cancels a
//! [`TickScheduler`], handing it a [`TickTicket`] each time; the host delivers
//! due tickets back through `Engine::on_tick`, which drops any ticket that is
//! no longer the armed one. Re-arming therefore always invalidates ticks that
//! were in flight under the previous interval.

use std::ops::Add;
use std::time::{Duration, Instant};

/// Identifies one arming of the tick source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickTicket(u64);

impl TickTicket {
    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Periodic tick source the engine can cancel and re-arm at will
pub trait TickScheduler {
    /// Deliver `ticket` every `interval`, replacing any previous arm
    fn schedule(&mut self, interval: Duration, ticket: TickTicket);

    /// Stop delivery until the next `schedule`
    fn cancel(&mut self);
}

/// A repeating timer on some clock
#[derive(Debug, Clone, Copy)]
struct Armed<T> {
    interval: Duration,
    next_due: T,
    ticket: TickTicket,
}

impl<T> Armed<T>
where
    T: Copy + Ord + Add<Duration, Output = T>,
{
    fn new(now: T, interval: Duration, ticket: TickTicket) -> Self {
        Self {
            interval,
            next_due: now + interval,
            ticket,
        }
    }

    /// Take the due tick, if any, and move the deadline one interval on
    fn pop_due(&mut self, now: T) -> Option<(T, TickTicket)> {
        if self.next_due > now {
            return None;
        }
        let due = self.next_due;
        self.next_due = due + self.interval;
        Some((due, self.ticket))
    }
}

/// A tick delivered by [`VirtualScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTick {
    /// Virtual time of delivery
    pub at: Duration,
    /// Interval the tick was armed with
    pub interval: Duration,
    pub ticket: TickTicket,
}

/// Most recent deliveries kept by [`VirtualScheduler::fired`]
pub const FIRED_HISTORY: usize = 1024;

/// Manually driven clock for tests and headless simulation
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now: Duration,
    armed: Option<Armed<Duration>>,
    fired: Vec<FiredTick>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Interval of the current arm
    pub fn interval(&self) -> Option<Duration> {
        self.armed.map(|a| a.interval)
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.armed.map(|a| a.next_due)
    }

    /// Recent deliveries, oldest first, at most `FIRED_HISTORY`
    pub fn fired(&self) -> &[FiredTick] {
        &self.fired
    }

    /// Drain the delivery history
    pub fn take_fired(&mut self) -> Vec<FiredTick> {
        std::mem::take(&mut self.fired)
    }

    /// Deliver the next tick due at or before `until`, moving the clock to it
    pub fn pop_due(&mut self, until: Duration) -> Option<TickTicket> {
        let armed = self.armed.as_mut()?;
        let interval = armed.interval;
        let (at, ticket) = armed.pop_due(until)?;
        self.now = at;
        if self.fired.len() == FIRED_HISTORY {
            self.fired.remove(0);
        }
        self.fired.push(FiredTick {
            at,
            interval,
            ticket,
        });
        Some(ticket)
    }

    /// Move the clock forward without delivering anything
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

impl TickScheduler for VirtualScheduler {
    fn schedule(&mut self, interval: Duration, ticket: TickTicket) {
        self.armed = Some(Armed::new(self.now, interval, ticket));
    }

    fn cancel(&mut self) {
        self.armed = None;
    }
}

/// Wall-clock deadlines for the real-time loop
#[derive(Debug, Default)]
pub struct DeadlineScheduler {
    armed: Option<Armed<Instant>>,
}

impl DeadlineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.armed.map(|a| a.next_due)
    }

    /// Take the tick due at `now`, if any. A loop that fell more than one
    /// interval behind resumes cadence from `now` instead of bursting.
    pub fn pop_due(&mut self, now: Instant) -> Option<TickTicket> {
        let armed = self.armed.as_mut()?;
        let (_, ticket) = armed.pop_due(now)?;
        if armed.next_due <= now {
            log::debug!("Tick loop fell behind; dropping missed ticks");
            armed.next_due = now + armed.interval;
        }
        Some(ticket)
    }
}

impl TickScheduler for DeadlineScheduler {
    fn schedule(&mut self, interval: Duration, ticket: TickTicket) {
        self.armed = Some(Armed::new(Instant::now(), interval, ticket));
    }

    fn cancel(&mut self) {
        self.armed = None;
    }
}

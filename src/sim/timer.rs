//! Tick-driven timers with cancellable handles
//!
//! Timers count whole simulation ticks, never accumulated float seconds, so a
//! 1 Hz timer at 60 Hz fires on exactly every 60th tick.

use serde::{Deserialize, Serialize};

/// Handle returned by [`Scheduler::every`] / [`Scheduler::after`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    tag: T,
    due: u64,
    /// `None` for one-shot timers
    period: Option<u64>,
}

/// Owns every pending timer of one round controller
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: u64,
    next_id: u64,
    timers: Vec<Timer<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: 0,
            next_id: 1,
            timers: Vec::new(),
        }
    }
}

impl<T: Copy> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks advanced so far
    pub fn now(&self) -> u64 {
        self.now
    }

    fn insert(&mut self, tag: T, delay: u64, period: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            tag,
            due: self.now + delay.max(1),
            period,
        });
        id
    }

    /// Fire `tag` every `period` ticks, first after one full period
    pub fn every(&mut self, period: u64, tag: T) -> TimerId {
        let period = period.max(1);
        self.insert(tag, period, Some(period))
    }

    /// Fire `tag` once after `delay` ticks
    pub fn after(&mut self, delay: u64, tag: T) -> TimerId {
        self.insert(tag, delay, None)
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Advance one tick and return the tags that fired, in creation order
    pub fn advance(&mut self) -> Vec<(TimerId, T)> {
        self.now += 1;
        let now = self.now;
        let mut fired = Vec::new();

        for timer in &mut self.timers {
            if timer.due <= now {
                fired.push((timer.id, timer.tag));
                if let Some(period) = timer.period {
                    timer.due += period;
                }
            }
        }
        self.timers.retain(|t| t.period.is_some() || t.due > now);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        Second,
        Fade,
    }

    fn run(s: &mut Scheduler<Tag>, ticks: u64) -> Vec<(u64, Tag)> {
        let mut out = Vec::new();
        for _ in 0..ticks {
            for (_, tag) in s.advance() {
                out.push((s.now(), tag));
            }
        }
        out
    }

    #[test]
    fn test_repeating_fires_on_exact_ticks() {
        let mut s = Scheduler::new();
        s.every(60, Tag::Second);
        let fired = run(&mut s, 180);
        assert_eq!(
            fired,
            vec![(60, Tag::Second), (120, Tag::Second), (180, Tag::Second)]
        );
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut s = Scheduler::new();
        s.after(3, Tag::Fade);
        assert_eq!(run(&mut s, 10), vec![(3, Tag::Fade)]);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut s = Scheduler::new();
        let id = s.every(2, Tag::Second);
        run(&mut s, 2);
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert!(run(&mut s, 10).is_empty());
    }

    #[test]
    fn test_replacing_a_timer_never_duplicates() {
        let mut s = Scheduler::new();
        let mut handle = s.every(5, Tag::Second);
        for _ in 0..4 {
            s.cancel(handle);
            handle = s.every(5, Tag::Second);
        }
        assert_eq!(s.pending(), 1);
        assert_eq!(run(&mut s, 5).len(), 1);
    }
}

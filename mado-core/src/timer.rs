use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::platform::WindowId;

#[derive(Clone, Debug)]
struct Timer {
    window: WindowId,
    id: usize,
    period: Duration,
    deadline: Instant,
}

/// Repeating timers keyed by window and application-chosen id.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn start(&mut self, window: WindowId, id: usize, period: Duration, now: Instant) -> Result<()> {
        if period.is_zero() {
            return Err(Error::BadParameter);
        }
        let deadline = now.checked_add(period).ok_or(Error::BadParameter)?;
        let timer = Timer {
            window,
            id,
            period,
            deadline,
        };
        match self.position(window, id) {
            Some(index) => self.timers[index] = timer,
            None => self.timers.push(timer),
        }
        Ok(())
    }

    pub fn stop(&mut self, window: WindowId, id: usize) -> Result<()> {
        let index = self.position(window, id).ok_or(Error::Failure)?;
        self.timers.remove(index);
        Ok(())
    }

    pub fn remove_window(&mut self, window: WindowId) {
        self.timers.retain(|timer| timer.window != window);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|timer| timer.deadline).min()
    }

    /// Shortens `timeout` so that a wait ends no later than the next
    /// deadline. `None` means "wait indefinitely".
    pub fn wait_timeout(&self, timeout: Option<Duration>, now: Instant) -> Option<Duration> {
        let until_deadline = self
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now));
        match (timeout, until_deadline) {
            (Some(timeout), Some(until_deadline)) => Some(timeout.min(until_deadline)),
            (timeout, None) => timeout,
            (None, until_deadline) => until_deadline,
        }
    }

    /// Reports every timer whose deadline has passed, in deadline order, and
    /// schedules its next firing.
    pub fn expire(&mut self, now: Instant) -> Vec<(WindowId, usize)> {
        let mut expired = Vec::new();
        self.timers.retain_mut(|timer| {
            if timer.deadline > now {
                return true;
            }
            expired.push((timer.deadline, timer.window, timer.id));
            let next = timer
                .deadline
                .checked_add(timer.period)
                .filter(|next| *next > now)
                .or_else(|| now.checked_add(timer.period));
            match next {
                Some(next) => {
                    timer.deadline = next;
                    true
                }
                None => {
                    log::warn!(
                        "timer {} of {:?} cannot be scheduled again, stopping it",
                        timer.id,
                        timer.window
                    );
                    false
                }
            }
        });
        expired.sort_by_key(|(fired_at, _, _)| *fired_at);
        expired
            .into_iter()
            .map(|(_, window, id)| (window, id))
            .collect()
    }

    fn position(&self, window: WindowId, id: usize) -> Option<usize> {
        self.timers
            .iter()
            .position(|timer| timer.window == window && timer.id == id)
    }
}

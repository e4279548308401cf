//! Transient visual feedback ("Copied", "Applying...").

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default time a feedback flag stays active.
pub const FEEDBACK_WINDOW: Duration = Duration::from_millis(2000);

/// A flag that turns on when triggered and off again after a fixed window.
///
/// Every trigger arms its own reset. The earliest pending reset turns the
/// flag off even if it was triggered again in the meantime, so a burst of
/// clicks still clears one window after the first click.
#[derive(Debug, Clone)]
pub struct Feedback {
    window: Duration,
    active: bool,
    resets: VecDeque<Instant>,
}

impl Feedback {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            active: false,
            resets: VecDeque::new(),
        }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.expire(now);
        self.active = true;
        self.resets.push_back(now + self.window);
    }

    /// Fire every reset due at or before `now`. Returns true if any fired.
    pub fn expire(&mut self, now: Instant) -> bool {
        let mut fired = false;
        while let Some(&at) = self.resets.front() {
            if at > now {
                break;
            }
            self.resets.pop_front();
            fired = true;
        }
        if fired {
            self.active = false;
        }
        fired
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.active && self.resets.front().is_none_or(|&at| at > now)
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for Feedback {
    fn default() -> Self {
        Self::new(FEEDBACK_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_active_for_exactly_one_window() {
        let t0 = Instant::now();
        let mut flag = Feedback::default();
        assert!(!flag.is_active(t0));

        flag.trigger(t0);
        assert!(flag.is_active(t0));
        assert!(flag.is_active(t0 + ms(1999)));
        assert!(!flag.is_active(t0 + ms(2000)));
    }

    #[test]
    fn test_later_trigger_does_not_extend_first_window() {
        let t0 = Instant::now();
        let mut flag = Feedback::default();

        flag.trigger(t0);
        flag.trigger(t0 + ms(1500));
        assert!(flag.is_active(t0 + ms(1999)));
        assert!(!flag.is_active(t0 + ms(2000)));

        flag.expire(t0 + ms(2000));
        assert!(!flag.is_active(t0 + ms(2500)));
    }

    #[test]
    fn test_trigger_after_stale_reset() {
        let t0 = Instant::now();
        let mut flag = Feedback::default();

        flag.trigger(t0);
        flag.trigger(t0 + ms(1500));
        // no tick between the first reset and this click
        flag.trigger(t0 + ms(3000));
        assert!(flag.is_active(t0 + ms(3200)));
        // the second click's reset is still pending
        assert!(!flag.is_active(t0 + ms(3500)));
    }

    #[test]
    fn test_custom_window() {
        let t0 = Instant::now();
        let mut flag = Feedback::new(ms(100));
        flag.trigger(t0);
        assert!(flag.is_active(t0 + ms(99)));
        assert!(!flag.is_active(t0 + ms(100)));
        assert_eq!(flag.window(), ms(100));
    }
}

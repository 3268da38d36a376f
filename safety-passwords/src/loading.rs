//! Debounced loading indicator.
//!
//! Once shown, the indicator stays up for at least the minimum display time
//! so quick checks do not flicker. If results have not arrived by the maximum
//! wait, the caller applies a synthetic unavailable result instead.
//!
//! The machine is pure: the owner arms real timers for the generation
//! returned by [`LoadingIndicator::begin`] and feeds their expiry back through
//! [`LoadingIndicator::on_timer`].

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingState {
    #[default]
    Idle,
    /// Minimum display time not yet elapsed.
    ShowingIndicator,
    /// Minimum display time elapsed, results still outstanding.
    WaitingForResults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingTimer {
    MinDisplay,
    MaxWait,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerOutcome<T> {
    /// Stale generation or wrong state.
    Ignored,
    /// Minimum display elapsed without a result.
    KeepWaiting,
    /// Minimum display elapsed and a held result is released.
    Release(T),
    /// Maximum wait elapsed without a result.
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct LoadingIndicator<T> {
    state: LoadingState,
    generation: u64,
    held: Option<T>,
}

impl<T> LoadingIndicator<T> {
    pub fn new() -> Self {
        Self {
            state: LoadingState::Idle,
            generation: 0,
            held: None,
        }
    }

    pub fn state(&self) -> LoadingState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state != LoadingState::Idle
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Shows the indicator. Timers armed for earlier generations become
    /// stale.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.state = LoadingState::ShowingIndicator;
        self.held = None;
        debug!(generation = self.generation, "loading indicator shown");
        self.generation
    }

    /// Offers a result. Returns it back when it should be applied now; while
    /// the indicator is still within its minimum display time the result is
    /// held instead.
    pub fn offer(&mut self, result: T) -> Option<T> {
        match self.state {
            LoadingState::Idle => Some(result),
            LoadingState::ShowingIndicator => {
                debug!(
                    generation = self.generation,
                    "holding result until minimum display elapses"
                );
                self.held = Some(result);
                None
            }
            LoadingState::WaitingForResults => {
                self.state = LoadingState::Idle;
                Some(result)
            }
        }
    }

    pub fn on_timer(&mut self, timer: LoadingTimer, generation: u64) -> TimerOutcome<T> {
        if generation != self.generation {
            debug!(?timer, generation, current = self.generation, "stale loading timer");
            return TimerOutcome::Ignored;
        }
        match (timer, self.state) {
            (LoadingTimer::MinDisplay, LoadingState::ShowingIndicator) => match self.held.take() {
                Some(result) => {
                    self.state = LoadingState::Idle;
                    TimerOutcome::Release(result)
                }
                None => {
                    self.state = LoadingState::WaitingForResults;
                    TimerOutcome::KeepWaiting
                }
            },
            (LoadingTimer::MaxWait, LoadingState::WaitingForResults) => {
                self.state = LoadingState::Idle;
                TimerOutcome::TimedOut
            }
            _ => TimerOutcome::Ignored,
        }
    }

    /// Hides the indicator and drops any held result.
    pub fn cancel(&mut self) {
        self.state = LoadingState::Idle;
        self.held = None;
    }
}

impl<T> Default for LoadingIndicator<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_applies_immediately() {
        let mut indicator = LoadingIndicator::new();
        assert_eq!(indicator.offer(1), Some(1));
        assert_eq!(indicator.state(), LoadingState::Idle);
    }

    #[test]
    fn test_result_before_min_display_is_held() {
        let mut indicator = LoadingIndicator::new();
        let generation = indicator.begin();
        assert_eq!(indicator.offer(7), None);
        assert_eq!(indicator.state(), LoadingState::ShowingIndicator);

        assert_eq!(
            indicator.on_timer(LoadingTimer::MinDisplay, generation),
            TimerOutcome::Release(7)
        );
        assert!(!indicator.is_loading());
        assert_eq!(
            indicator.on_timer(LoadingTimer::MaxWait, generation),
            TimerOutcome::Ignored
        );
    }

    #[test]
    fn test_result_while_waiting_applies() {
        let mut indicator = LoadingIndicator::new();
        let generation = indicator.begin();
        assert_eq!(
            indicator.on_timer(LoadingTimer::MinDisplay, generation),
            TimerOutcome::KeepWaiting
        );
        assert_eq!(indicator.state(), LoadingState::WaitingForResults);
        assert_eq!(indicator.offer(3), Some(3));
        assert_eq!(indicator.state(), LoadingState::Idle);
    }

    #[test]
    fn test_max_wait_times_out_once() {
        let mut indicator: LoadingIndicator<u32> = LoadingIndicator::new();
        let generation = indicator.begin();
        indicator.on_timer(LoadingTimer::MinDisplay, generation);
        assert_eq!(
            indicator.on_timer(LoadingTimer::MaxWait, generation),
            TimerOutcome::TimedOut
        );
        assert_eq!(
            indicator.on_timer(LoadingTimer::MaxWait, generation),
            TimerOutcome::Ignored
        );
    }

    #[test]
    fn test_stale_generation_ignored() {
        let mut indicator: LoadingIndicator<u32> = LoadingIndicator::new();
        let first = indicator.begin();
        let second = indicator.begin();
        assert_eq!(
            indicator.on_timer(LoadingTimer::MinDisplay, first),
            TimerOutcome::Ignored
        );
        assert_eq!(indicator.state(), LoadingState::ShowingIndicator);
        assert_eq!(
            indicator.on_timer(LoadingTimer::MinDisplay, second),
            TimerOutcome::KeepWaiting
        );
    }

    #[test]
    fn test_restart_drops_held_result() {
        let mut indicator = LoadingIndicator::new();
        indicator.begin();
        indicator.offer(1);
        let generation = indicator.begin();
        assert_eq!(
            indicator.on_timer(LoadingTimer::MinDisplay, generation),
            TimerOutcome::KeepWaiting
        );
    }
}

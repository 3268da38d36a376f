use std::time::Duration;

use safety_passwords::LoadingTimer;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Expiry of a loading timer armed for `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub timer: LoadingTimer,
    pub generation: u64,
}

/// Real timers behind the loading indicator.
///
/// Each arm runs one task that fires `MinDisplay` and then `MaxWait`.
/// Arming again cancels the previous task, so at most one `MaxWait` is live.
#[derive(Debug)]
pub struct LoadingTimers {
    min_display: Duration,
    max_wait: Duration,
    events: mpsc::UnboundedSender<TimerFired>,
    armed: Option<CancellationToken>,
}

impl LoadingTimers {
    pub fn new(
        min_display: Duration,
        max_wait: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<TimerFired>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                min_display,
                max_wait,
                events,
                armed: None,
            },
            rx,
        )
    }

    pub fn arm(&mut self, generation: u64) {
        self.cancel();
        let token = CancellationToken::new();
        self.armed = Some(token.clone());

        let events = self.events.clone();
        let min_display = self.min_display;
        let remaining = self.max_wait.saturating_sub(self.min_display);
        debug!(generation, ?min_display, max_wait = ?self.max_wait, "arming loading timers");

        tokio::spawn(async move {
            let fire = |timer| {
                events
                    .send(TimerFired { timer, generation })
                    .is_ok()
            };
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(min_display) => {}
            }
            if !fire(LoadingTimer::MinDisplay) {
                return;
            }
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(remaining) => {
                    fire(LoadingTimer::MaxWait);
                }
            }
        });
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.armed.take() {
            token.cancel();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.as_ref().is_some_and(|token| !token.is_cancelled())
    }
}

impl Drop for LoadingTimers {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_min_then_max() {
        let (mut timers, mut rx) =
            LoadingTimers::new(Duration::from_millis(100), Duration::from_millis(500));
        timers.arm(1);

        let first = rx.recv().await.unwrap();
        assert_eq!(
            first,
            TimerFired {
                timer: LoadingTimer::MinDisplay,
                generation: 1,
            }
        );
        let second = rx.recv().await.unwrap();
        assert_eq!(second.timer, LoadingTimer::MaxWait);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_cancels_previous() {
        let (mut timers, mut rx) =
            LoadingTimers::new(Duration::from_millis(100), Duration::from_millis(500));
        timers.arm(1);
        tokio::task::yield_now().await;
        timers.arm(2);

        tokio::time::sleep(Duration::from_secs(1)).await;
        let mut fired = Vec::new();
        while let Ok(event) = rx.try_recv() {
            fired.push(event.generation);
        }
        assert_eq!(fired, vec![2, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_max_wait() {
        let (mut timers, mut rx) =
            LoadingTimers::new(Duration::from_millis(100), Duration::from_millis(500));
        timers.arm(3);
        assert!(timers.is_armed());
        let first = rx.recv().await.unwrap();
        assert_eq!(first.timer, LoadingTimer::MinDisplay);
        timers.cancel();
        assert!(!timers.is_armed());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}

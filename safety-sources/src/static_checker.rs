use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use async_trait::async_trait;

use crate::checker::CheckDomain;
use crate::checker::Counts;
use crate::checker::SecurityChecker;
use crate::error::CheckerError;
use crate::error::Result;

#[derive(Debug, Default)]
struct Inner {
    responses: HashMap<CheckDomain, Result<Counts>>,
    after_checkup: HashMap<CheckDomain, Counts>,
    delays: HashMap<CheckDomain, Duration>,
    cooldown: bool,
    checkups: Vec<CheckDomain>,
    fetches: Vec<CheckDomain>,
}

/// Checker answering from canned responses.
///
/// Backs the scenario runner and tests. A domain without a response fails
/// with [`CheckerError::Unreachable`]. Delays use `tokio::time`, so paused
/// test clocks apply.
#[derive(Debug, Default)]
pub struct StaticChecker {
    inner: Mutex<Inner>,
}

impl StaticChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_response(&self, domain: CheckDomain, response: Result<Counts>) {
        self.lock().responses.insert(domain, response);
    }

    /// Counts that replace the response once a checkup for `domain` runs.
    pub fn set_checkup_result(&self, domain: CheckDomain, counts: Counts) {
        self.lock().after_checkup.insert(domain, counts);
    }

    pub fn set_delay(&self, domain: CheckDomain, delay: Duration) {
        self.lock().delays.insert(domain, delay);
    }

    /// While the cooldown is active every checkup is silently skipped.
    pub fn set_cooldown(&self, active: bool) {
        self.lock().cooldown = active;
    }

    /// Domains whose checkups actually ran, in order.
    pub fn checkups(&self) -> Vec<CheckDomain> {
        self.lock().checkups.clone()
    }

    pub fn fetches(&self) -> Vec<CheckDomain> {
        self.lock().fetches.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn delay(&self, domain: CheckDomain) -> Option<Duration> {
        self.lock().delays.get(&domain).copied()
    }
}

#[async_trait]
impl SecurityChecker for StaticChecker {
    async fn fetch_counts(&self, domain: CheckDomain) -> Result<Counts> {
        if let Some(delay) = self.delay(domain) {
            tokio::time::sleep(delay).await;
        }
        let mut inner = self.lock();
        inner.fetches.push(domain);
        inner
            .responses
            .get(&domain)
            .cloned()
            .unwrap_or_else(|| Err(CheckerError::Unreachable(format!("no response for {domain}"))))
    }

    async fn run_checkup(&self, domain: CheckDomain) -> Result<()> {
        let mut inner = self.lock();
        if inner.cooldown {
            return Ok(());
        }
        inner.checkups.push(domain);
        if let Some(counts) = inner.after_checkup.remove(&domain) {
            inner.responses.insert(domain, Ok(counts));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_response_is_unreachable() {
        let checker = StaticChecker::new();
        let err = checker.fetch_counts(CheckDomain::Update).await.unwrap_err();
        assert!(matches!(err, CheckerError::Unreachable(_)));
        assert_eq!(checker.fetches(), vec![CheckDomain::Update]);
    }

    #[tokio::test]
    async fn test_checkup_replaces_response() {
        let checker = StaticChecker::new();
        checker.set_response(
            CheckDomain::UnusedPermissions,
            Ok(Counts::UnusedPermissions { sites: 0 }),
        );
        checker.set_checkup_result(
            CheckDomain::UnusedPermissions,
            Counts::UnusedPermissions { sites: 2 },
        );
        checker.run_checkup(CheckDomain::UnusedPermissions).await.unwrap();
        assert_eq!(
            checker.fetch_counts(CheckDomain::UnusedPermissions).await,
            Ok(Counts::UnusedPermissions { sites: 2 })
        );
    }

    #[tokio::test]
    async fn test_cooldown_skips_checkup_silently() {
        let checker = StaticChecker::new();
        checker.set_response(
            CheckDomain::UnusedPermissions,
            Ok(Counts::UnusedPermissions { sites: 0 }),
        );
        checker.set_checkup_result(
            CheckDomain::UnusedPermissions,
            Counts::UnusedPermissions { sites: 2 },
        );
        checker.set_cooldown(true);
        checker.run_checkup(CheckDomain::UnusedPermissions).await.unwrap();
        assert!(checker.checkups().is_empty());
        assert_eq!(
            checker.fetch_counts(CheckDomain::UnusedPermissions).await,
            Ok(Counts::UnusedPermissions { sites: 0 })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_uses_tokio_clock() {
        let checker = StaticChecker::new();
        checker.set_response(
            CheckDomain::Update,
            Ok(Counts::Update {
                state: crate::checker::UpdateState::UpToDate,
            }),
        );
        checker.set_delay(CheckDomain::Update, Duration::from_secs(3));
        let started = tokio::time::Instant::now();
        checker.fetch_counts(CheckDomain::Update).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(3));
    }
}

use super::Synchronizer;
use crate::core::{BrowserDriver, ReadyState};
use crate::errors::{E2eError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    DomContentLoaded,
    Load,
    /// `load`, plus no request in flight for the configured quiet window.
    NetworkIdle,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadState::DomContentLoaded => "domcontentloaded",
            LoadState::Load => "load",
            LoadState::NetworkIdle => "networkidle",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SettleReport {
    pub overlays_removed: usize,
}

impl<D: BrowserDriver> Synchronizer<D> {
    pub async fn wait_for_load_state(&self, state: LoadState, timeout: Option<Duration>) -> Result<()> {
        match state {
            LoadState::DomContentLoaded => {
                self.wait_for_ready_state(
                    |s| matches!(s, ReadyState::Interactive | ReadyState::Complete),
                    state,
                    timeout,
                )
                .await
            }
            LoadState::Load => {
                self.wait_for_ready_state(|s| s == ReadyState::Complete, state, timeout)
                    .await
            }
            LoadState::NetworkIdle => self.wait_for_network_idle(timeout).await,
        }
    }

    async fn wait_for_ready_state<F>(
        &self,
        reached: F,
        state: LoadState,
        timeout: Option<Duration>,
    ) -> Result<()>
    where
        F: Fn(ReadyState) -> bool,
    {
        let timeout = timeout.unwrap_or_else(|| self.config().timeouts.navigation());
        let deadline = self.deadline(Some(timeout));

        loop {
            match self.driver().ready_state(self.page()).await {
                Ok(ready) if reached(ready) => return Ok(()),
                Ok(_) => {}
                Err(err) => debug!(error = %err, "ready state probe failed"),
            }

            if !deadline.tick().await {
                return Err(E2eError::timeout("page", state, timeout.as_millis() as u64));
            }
        }
    }

    /// Waits until the page is loaded and has had no request in flight for the
    /// quiet window.
    pub async fn wait_for_network_idle(&self, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or_else(|| self.config().timeouts.navigation());
        let quiet_window = Duration::from_millis(self.config().settle.quiet_window_ms);
        let deadline = self.deadline(Some(timeout));
        let mut quiet_since: Option<Instant> = None;

        loop {
            if self.is_quiet().await {
                let since = *quiet_since.get_or_insert_with(Instant::now);
                if since.elapsed() >= quiet_window {
                    return Ok(());
                }
            } else {
                quiet_since = None;
            }

            if !deadline.tick().await {
                return Err(E2eError::timeout(
                    "page",
                    LoadState::NetworkIdle,
                    timeout.as_millis() as u64,
                ));
            }
        }
    }

    async fn is_quiet(&self) -> bool {
        let ready = self.driver().ready_state(self.page()).await;
        let inflight = self.driver().inflight_requests(self.page()).await;
        match (ready, inflight) {
            (Ok(ReadyState::Complete), Ok(0)) => true,
            (Ok(_), Ok(_)) => false,
            (Err(err), _) | (_, Err(err)) => {
                debug!(error = %err, "network idle probe failed");
                false
            }
        }
    }

    /// Network idle within the default timeout, then removal of the configured
    /// overlays. Safe to repeat: a second call on a settled page finds nothing
    /// to remove.
    pub async fn settle(&self) -> Result<SettleReport> {
        self.wait_for_network_idle(Some(self.default_timeout()))
            .await?;
        let overlays_removed = self
            .remove_elements(&self.config().settle.overlay_selectors)
            .await?;
        if overlays_removed > 0 {
            info!(overlays_removed, "removed overlays");
        }
        Ok(SettleReport { overlays_removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDriver;

    #[tokio::test(start_paused = true)]
    async fn settle_is_idempotent() {
        let mock = MockDriver::new();
        mock.element("#fixedban");
        mock.element("footer");
        mock.element("#userName");
        let sync = mock.synchronizer();

        let first = sync.settle().await.unwrap();
        assert_eq!(first.overlays_removed, 2);
        let second = sync.settle().await.unwrap();
        assert_eq!(second.overlays_removed, 0);
        assert!(mock.has_element("#userName"));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_requires_a_full_quiet_window() {
        let mock = MockDriver::new();
        mock.requests_inflight_for(Duration::from_millis(1_000));
        let sync = mock.synchronizer();
        let started = Instant::now();

        sync.wait_for_network_idle(None).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1_500));
    }

    #[tokio::test(start_paused = true)]
    async fn busy_page_never_goes_idle() {
        let mock = MockDriver::new();
        mock.requests_inflight_for(Duration::from_secs(3_600));
        let sync = mock.synchronizer();

        let err = sync
            .wait_for_network_idle(Some(Duration::from_secs(2)))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("networkidle"));
    }

    #[tokio::test(start_paused = true)]
    async fn settle_gives_up_at_the_default_timeout() {
        let mock = MockDriver::new();
        mock.requests_inflight_for(Duration::from_secs(3_600));
        mock.element("#fixedban");
        let sync = mock.synchronizer();
        let bound = sync.default_timeout();
        let started = Instant::now();

        let err = sync.settle().await.unwrap_err();
        assert!(err.is_timeout());
        assert!(
            started.elapsed() <= bound + Duration::from_secs(1),
            "settle waited {:?}, default timeout is {:?}",
            started.elapsed(),
            bound
        );
        assert!(bound < sync.config().timeouts.navigation());
        assert!(mock.has_element("#fixedban"));
    }

    #[tokio::test(start_paused = true)]
    async fn load_waits_for_complete() {
        let mock = MockDriver::new();
        mock.loading_for(Duration::from_millis(400));
        let sync = mock.synchronizer();

        sync.wait_for_load_state(LoadState::DomContentLoaded, None)
            .await
            .unwrap();
        sync.wait_for_load_state(LoadState::Load, None).await.unwrap();
        assert_eq!(
            mock.ready_state_now(),
            ReadyState::Complete
        );
    }
}

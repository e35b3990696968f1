use super::{Synchronizer, WaitState};
use crate::core::{BrowserDriver, ClickOptions, Selector};
use crate::errors::{E2eError, Result};
use serde::Serialize;
use tracing::{debug, warn};

/// Which path delivered a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickPath {
    Standard,
    DomFallback,
}

enum ClickState {
    Standard,
    DomFallback { blocked_by: String },
    Done(ClickPath),
    Failed(E2eError),
}

impl<D: BrowserDriver> Synchronizer<D> {
    /// Waits for visibility, then clicks. A click that lands on another element
    /// falls back to `element.click()` once; only plain left clicks fall back.
    pub async fn click(&self, raw: &str) -> Result<ClickPath> {
        self.click_with(raw, ClickOptions::default()).await
    }

    pub async fn double_click(&self, raw: &str) -> Result<ClickPath> {
        self.click_with(raw, ClickOptions::double()).await
    }

    pub async fn right_click(&self, raw: &str) -> Result<ClickPath> {
        self.click_with(raw, ClickOptions::right()).await
    }

    pub async fn click_with(&self, raw: &str, options: ClickOptions) -> Result<ClickPath> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, WaitState::Visible, None)
            .await?;
        self.click_visible(&selector, options).await
    }

    async fn click_visible(&self, selector: &Selector, options: ClickOptions) -> Result<ClickPath> {
        let mut state = ClickState::Standard;

        loop {
            state = match state {
                ClickState::Standard => {
                    match self.driver().click(self.page(), selector, options).await {
                        Ok(()) => ClickState::Done(ClickPath::Standard),
                        Err(E2eError::InteractionBlocked { reason, .. })
                            if options == ClickOptions::default() =>
                        {
                            ClickState::DomFallback { blocked_by: reason }
                        }
                        Err(err) => ClickState::Failed(err),
                    }
                }
                ClickState::DomFallback { blocked_by } => {
                    warn!(selector = %selector, blocked_by, "click intercepted, using DOM click");
                    match self.driver().dom_click(self.page(), selector).await {
                        Ok(()) => ClickState::Done(ClickPath::DomFallback),
                        Err(err) => ClickState::Failed(err),
                    }
                }
                ClickState::Done(path) => {
                    debug!(selector = %selector, ?path, "clicked");
                    return Ok(path);
                }
                ClickState::Failed(err) => return Err(err),
            };
        }
    }

    /// `element.click()` in the page without hit testing, for controls that are
    /// permanently covered (styled radios and checkboxes).
    pub async fn dom_click(&self, raw: &str) -> Result<()> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, WaitState::Attached, None)
            .await?;
        self.driver().dom_click(self.page(), &selector).await
    }

    /// `click` under the configured retry policy.
    pub async fn retry_click(&self, raw: &str) -> Result<ClickPath> {
        let label = format!("click {}", raw);
        self.retry_policy()
            .run(&label, |_| self.click(raw))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDriver;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn unobstructed_click_takes_standard_path() {
        let mock = MockDriver::new();
        mock.element("#submit");
        let sync = mock.synchronizer();

        assert_eq!(sync.click("#submit").await.unwrap(), ClickPath::Standard);
        assert_eq!(mock.calls("click"), 1);
        assert_eq!(mock.calls("dom_click"), 0);
        assert_eq!(mock.clicks_on("#submit"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn intercepted_click_falls_back_exactly_once() {
        let mock = MockDriver::new();
        mock.element("#submit").blocked_by("#fixedban");
        let sync = mock.synchronizer();

        assert_eq!(sync.click("#submit").await.unwrap(), ClickPath::DomFallback);
        assert_eq!(mock.calls("click"), 1);
        assert_eq!(mock.calls("dom_click"), 1);
        assert_eq!(mock.clicks_on("#submit"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fallback_is_reported() {
        let mock = MockDriver::new();
        mock.element("#submit").blocked_by("footer").dom_click_fails();
        let sync = mock.synchronizer();

        assert!(sync.click("#submit").await.is_err());
        assert_eq!(mock.calls("dom_click"), 1);
        assert_eq!(mock.clicks_on("#submit"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn double_click_does_not_fall_back() {
        let mock = MockDriver::new();
        mock.element("#doubleClickBtn").blocked_by("#fixedban");
        let sync = mock.synchronizer();

        let err = sync.double_click("#doubleClickBtn").await.unwrap_err();
        assert!(err.is_blocked());
        assert_eq!(mock.calls("dom_click"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn never_clicks_before_visible() {
        let mock = MockDriver::new();
        mock.element("#late").visible_after(Duration::from_millis(700));
        let sync = mock.synchronizer();
        let started = Instant::now();

        sync.click("#late").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(700));
        assert_eq!(mock.calls("click"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_target_times_out_without_clicking() {
        let mock = MockDriver::new();
        let sync = mock.synchronizer();

        let err = sync.click("#ghost").await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(mock.calls("click"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_click_makes_three_attempts() {
        let mock = MockDriver::new();
        let sync = mock.synchronizer();
        let started = Instant::now();

        let err = sync.retry_click("#ghost").await.unwrap_err();
        assert!(err.is_timeout());
        // three full waits and two backoffs
        let wait = sync.default_timeout();
        assert_eq!(started.elapsed(), wait * 3 + Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_click_recovers_when_element_appears() {
        let mock = MockDriver::new();
        mock.element("#slow").visible_after(Duration::from_secs(12));
        let sync = mock.synchronizer();

        assert_eq!(sync.retry_click("#slow").await.unwrap(), ClickPath::Standard);
        assert_eq!(mock.calls("click"), 1);
    }
}

use super::Synchronizer;
use crate::core::{BrowserDriver, ElementProbe, Selector};
use crate::errors::{E2eError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitState {
    Attached,
    Detached,
    Visible,
    Hidden,
    Enabled,
    Disabled,
}

impl WaitState {
    pub fn holds(&self, probe: &ElementProbe) -> bool {
        match self {
            WaitState::Attached => probe.attached,
            WaitState::Detached => !probe.attached,
            WaitState::Visible => probe.visible,
            WaitState::Hidden => !probe.visible,
            WaitState::Enabled => probe.attached && probe.enabled,
            WaitState::Disabled => probe.attached && !probe.enabled,
        }
    }
}

impl fmt::Display for WaitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Enabled => "enabled",
            WaitState::Disabled => "disabled",
        };
        f.write_str(name)
    }
}

/// A poll loop bound. `tick` sleeps one interval, clipped so that the last
/// check lands exactly on the deadline, and reports `false` once it has passed.
pub(crate) struct Deadline {
    end: Instant,
    poll: Duration,
}

impl Deadline {
    pub(crate) fn new(timeout: Duration, poll: Duration) -> Self {
        Self {
            end: Instant::now() + timeout,
            poll,
        }
    }

    pub(crate) async fn tick(&self) -> bool {
        let now = Instant::now();
        if now >= self.end {
            return false;
        }
        sleep(self.poll.min(self.end - now)).await;
        true
    }
}

impl<D: BrowserDriver> Synchronizer<D> {
    pub(crate) fn deadline(&self, timeout: Option<Duration>) -> Deadline {
        Deadline::new(
            timeout.unwrap_or_else(|| self.default_timeout()),
            self.config().timeouts.poll_interval(),
        )
    }

    /// Waits until the first match of `raw` is in `state`.
    pub async fn wait_for(
        &self,
        raw: &str,
        state: WaitState,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, state, timeout).await
    }

    pub async fn wait_for_selector(
        &self,
        selector: &Selector,
        state: WaitState,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let timeout = timeout.unwrap_or_else(|| self.default_timeout());
        let deadline = self.deadline(Some(timeout));

        loop {
            match self.driver().probe(self.page(), selector).await {
                Ok(probe) if state.holds(&probe) => {
                    trace!(selector = %selector, %state, "wait satisfied");
                    return Ok(());
                }
                Ok(_) => {}
                // A page mid-navigation answers probes with errors; that is "not yet".
                Err(err) => debug!(selector = %selector, error = %err, "probe failed"),
            }

            if !deadline.tick().await {
                return Err(E2eError::timeout(
                    selector.as_str(),
                    state,
                    timeout.as_millis() as u64,
                ));
            }
        }
    }

    /// Polls a page expression until it evaluates truthy.
    pub async fn wait_for_function(&self, script: &str, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or_else(|| self.default_timeout());
        let deadline = self.deadline(Some(timeout));

        loop {
            match self.driver().evaluate(self.page(), script).await {
                Ok(value) if is_truthy(&value) => return Ok(()),
                Ok(_) => {}
                Err(err) => debug!(error = %err, "wait_for_function probe failed"),
            }

            if !deadline.tick().await {
                return Err(E2eError::timeout(
                    "function",
                    "truthy",
                    timeout.as_millis() as u64,
                ));
            }
        }
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

//! Listen-before-trigger capture of browser events.
//!
//! Events that are a direct consequence of an action (a native dialog, a new
//! tab) can fire before the action's call returns. The listener is therefore
//! armed first, the action is run through the armed value, and only then is
//! the event awaited. The types make the order the only one that compiles:
//!
//! ```ignore
//! let dialog = sync
//!     .arm(EventKind::Dialog)
//!     .await?
//!     .trigger(|| sync.click("#alertButton"))
//!     .await?
//!     .wait(None)
//!     .await?;
//! ```

use super::{LoadState, Synchronizer};
use crate::core::{BrowserDriver, DialogInfo, DialogKind, DialogResponse};
use crate::errors::{E2eError, Result};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Dialog,
    NewPage,
}

enum Baseline {
    Dialog(broadcast::Receiver<DialogInfo>),
    NewPage(HashSet<String>),
}

/// A registered listener. Nothing can be awaited until an action is triggered.
#[must_use = "an armed listener captures nothing until it is triggered"]
pub struct Armed<'a, D: BrowserDriver> {
    sync: &'a Synchronizer<D>,
    kind: EventKind,
    baseline: Baseline,
}

#[must_use = "a triggered listener must be waited on"]
pub struct Triggered<'a, D: BrowserDriver> {
    sync: &'a Synchronizer<D>,
    kind: EventKind,
    baseline: Baseline,
}

pub enum EventHandle<'a, D: BrowserDriver> {
    Dialog(DialogHandle<'a, D>),
    Page(D::Page),
}

impl<'a, D: BrowserDriver> EventHandle<'a, D> {
    pub fn into_dialog(self) -> Result<DialogHandle<'a, D>> {
        match self {
            EventHandle::Dialog(dialog) => Ok(dialog),
            EventHandle::Page(_) => Err(E2eError::Dialog("expected a dialog, got a page".into())),
        }
    }

    pub fn into_page(self) -> Result<D::Page> {
        match self {
            EventHandle::Page(page) => Ok(page),
            EventHandle::Dialog(_) => Err(E2eError::Dialog("expected a page, got a dialog".into())),
        }
    }
}

/// An open native dialog. Answering consumes the handle.
pub struct DialogHandle<'a, D: BrowserDriver> {
    sync: &'a Synchronizer<D>,
    info: DialogInfo,
}

impl<'a, D: BrowserDriver> DialogHandle<'a, D> {
    pub fn kind(&self) -> DialogKind {
        self.info.kind
    }

    pub fn message(&self) -> &str {
        &self.info.message
    }

    pub fn default_prompt(&self) -> Option<&str> {
        self.info.default_prompt.as_deref()
    }

    pub fn info(&self) -> &DialogInfo {
        &self.info
    }

    pub async fn accept(self, prompt_text: Option<&str>) -> Result<DialogInfo> {
        self.respond(DialogResponse::Accept {
            prompt_text: prompt_text.map(str::to_string),
        })
        .await
    }

    pub async fn dismiss(self) -> Result<DialogInfo> {
        self.respond(DialogResponse::Dismiss).await
    }

    async fn respond(self, response: DialogResponse) -> Result<DialogInfo> {
        debug!(kind = %self.info.kind, ?response, "answering dialog");
        self.sync
            .driver()
            .answer_dialog(self.sync.page(), response)
            .await?;
        Ok(self.info)
    }
}

impl<D: BrowserDriver> Synchronizer<D> {
    pub async fn arm(&self, kind: EventKind) -> Result<Armed<'_, D>> {
        let baseline = match kind {
            EventKind::Dialog => Baseline::Dialog(self.driver().dialog_events(self.page())),
            EventKind::NewPage => Baseline::NewPage(self.page_ids().await?),
        };
        Ok(Armed {
            sync: self,
            kind,
            baseline,
        })
    }

    async fn page_ids(&self) -> Result<HashSet<String>> {
        let driver = self.driver();
        Ok(driver
            .pages()
            .await?
            .iter()
            .map(|page| driver.page_id(page))
            .collect())
    }

    /// Arms a dialog listener, runs `trigger`, and returns the open dialog.
    pub async fn intercept_dialog<F, Fut, T>(&self, trigger: F) -> Result<DialogHandle<'_, D>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.arm(EventKind::Dialog)
            .await?
            .trigger(trigger)
            .await?
            .wait(None)
            .await?
            .into_dialog()
    }

    /// Arms a new-page listener, runs `trigger`, and returns the new page once
    /// it has finished loading.
    pub async fn intercept_new_page<F, Fut, T>(&self, trigger: F) -> Result<D::Page>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let page = self
            .arm(EventKind::NewPage)
            .await?
            .trigger(trigger)
            .await?
            .wait(Some(self.config().timeouts.navigation()))
            .await?
            .into_page()?;
        self.for_page(page.clone())
            .wait_for_load_state(LoadState::Load, Some(self.config().timeouts.navigation()))
            .await?;
        Ok(page)
    }

    pub async fn click_and_intercept_dialog(&self, raw: &str) -> Result<DialogHandle<'_, D>> {
        self.intercept_dialog(|| self.click(raw)).await
    }

    pub async fn click_and_wait_for_new_page(&self, raw: &str) -> Result<D::Page> {
        self.intercept_new_page(|| self.click(raw)).await
    }
}

impl<'a, D: BrowserDriver> Armed<'a, D> {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub async fn trigger<F, Fut, T>(self, action: F) -> Result<Triggered<'a, D>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        action().await?;
        Ok(Triggered {
            sync: self.sync,
            kind: self.kind,
            baseline: self.baseline,
        })
    }
}

impl<'a, D: BrowserDriver> Triggered<'a, D> {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Yields the one event the trigger caused, or times out.
    pub async fn wait(self, timeout: Option<Duration>) -> Result<EventHandle<'a, D>> {
        let timeout = timeout.unwrap_or_else(|| self.sync.default_timeout());
        match self.baseline {
            Baseline::Dialog(rx) => wait_dialog(self.sync, rx, timeout).await,
            Baseline::NewPage(known) => wait_page(self.sync, known, timeout).await,
        }
    }
}

async fn wait_dialog<'a, D: BrowserDriver>(
    sync: &'a Synchronizer<D>,
    mut rx: broadcast::Receiver<DialogInfo>,
    timeout: Duration,
) -> Result<EventHandle<'a, D>> {
    let received = tokio::time::timeout(timeout, async {
        loop {
            match rx.recv().await {
                Ok(info) => return Ok(info),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "dialog receiver lagged");
                }
                Err(RecvError::Closed) => {
                    return Err(E2eError::Dialog("dialog stream closed".into()));
                }
            }
        }
    })
    .await;

    match received {
        Ok(Ok(info)) => {
            info!(kind = %info.kind, message = %info.message, "dialog captured");
            Ok(EventHandle::Dialog(DialogHandle { sync, info }))
        }
        Ok(Err(err)) => Err(err),
        Err(_) => Err(E2eError::timeout("dialog", "opened", timeout.as_millis() as u64)),
    }
}

async fn wait_page<'a, D: BrowserDriver>(
    sync: &'a Synchronizer<D>,
    known: HashSet<String>,
    timeout: Duration,
) -> Result<EventHandle<'a, D>> {
    let deadline = sync.deadline(Some(timeout));
    let driver = sync.driver();

    loop {
        match driver.pages().await {
            Ok(pages) => {
                if let Some(page) = pages
                    .into_iter()
                    .find(|page| !known.contains(&driver.page_id(page)))
                {
                    info!(page = %driver.page_id(&page), "new page captured");
                    return Ok(EventHandle::Page(page));
                }
            }
            Err(err) => debug!(error = %err, "listing pages failed"),
        }

        if !deadline.tick().await {
            return Err(E2eError::timeout("new page", "opened", timeout.as_millis() as u64));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Effect, MockDriver};

    #[tokio::test(start_paused = true)]
    async fn captures_dialog_opened_during_the_click() {
        let mock = MockDriver::new();
        mock.element("#alertButton")
            .on_click(Effect::dialog(DialogKind::Alert, "You clicked a button"));
        let sync = mock.synchronizer();

        let handle = sync
            .arm(EventKind::Dialog)
            .await
            .unwrap()
            .trigger(|| sync.click("#alertButton"))
            .await
            .unwrap()
            .wait(None)
            .await
            .unwrap();

        let dialog = handle.into_dialog().unwrap();
        assert_eq!(dialog.kind(), DialogKind::Alert);
        assert_eq!(dialog.message(), "You clicked a button");
        dialog.accept(None).await.unwrap();
        assert_eq!(
            mock.dialog_responses(),
            vec![DialogResponse::Accept { prompt_text: None }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dialog_before_arming_is_not_captured() {
        let mock = MockDriver::new();
        mock.element("#alertButton")
            .on_click(Effect::dialog(DialogKind::Alert, "early"));
        let sync = mock.synchronizer();

        sync.click("#alertButton").await.unwrap();
        let err = sync
            .intercept_dialog(|| async { Ok::<_, E2eError>(()) })
            .await
            .err()
            .unwrap();
        assert!(err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_dialog_is_still_captured() {
        let mock = MockDriver::new();
        mock.element("#timerAlertButton").on_click(
            Effect::dialog(DialogKind::Alert, "This alert appeared after 5 seconds")
                .after(Duration::from_secs(5)),
        );
        let sync = mock.synchronizer();

        let dialog = sync
            .click_and_intercept_dialog("#timerAlertButton")
            .await
            .unwrap();
        assert!(dialog.message().contains("5 seconds"));
        dialog.dismiss().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_text_reaches_the_driver() {
        let mock = MockDriver::new();
        mock.element("#promtButton")
            .on_click(Effect::dialog(DialogKind::Prompt, "Please enter your name"));
        let sync = mock.synchronizer();

        let dialog = sync.click_and_intercept_dialog("#promtButton").await.unwrap();
        assert_eq!(dialog.kind(), DialogKind::Prompt);
        dialog.accept(Some("Ada")).await.unwrap();
        assert_eq!(
            mock.dialog_responses(),
            vec![DialogResponse::Accept {
                prompt_text: Some("Ada".to_string())
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn no_event_times_out() {
        let mock = MockDriver::new();
        mock.element("#quiet");
        let sync = mock.synchronizer();
        let started = tokio::time::Instant::now();

        let err = sync
            .arm(EventKind::Dialog)
            .await
            .unwrap()
            .trigger(|| sync.click("#quiet"))
            .await
            .unwrap()
            .wait(Some(Duration::from_secs(3)))
            .await
            .err()
            .unwrap();

        assert!(err.is_timeout());
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn captures_exactly_the_new_page() {
        let mock = MockDriver::new();
        mock.element("#tabButton")
            .on_click(Effect::new_page("https://demoqa.com/sample"));
        let sync = mock.synchronizer();
        let existing = mock.open_page_ids();

        let page = sync.click_and_wait_for_new_page("#tabButton").await.unwrap();

        let id = mock.page_id_of(&page);
        assert!(!existing.contains(&id));
        assert_eq!(mock.open_page_ids().len(), existing.len() + 1);
        assert_eq!(
            sync.for_page(page).current_url().await.unwrap(),
            "https://demoqa.com/sample"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failing_trigger_short_circuits() {
        let mock = MockDriver::new();
        let sync = mock.synchronizer();

        let err = sync
            .arm(EventKind::NewPage)
            .await
            .unwrap()
            .trigger(|| async { Err::<(), _>(E2eError::blocked("#tabButton", "covered")) })
            .await
            .err()
            .unwrap();
        assert!(err.is_blocked());
    }
}

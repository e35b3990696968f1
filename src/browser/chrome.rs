use crate::browser::{scripts, Session};
use crate::core::config::BrowserConfig;
use crate::core::{
    BoundingBox, BrowserDriver, ClickOptions, Config, DialogInfo, DialogKind, DialogResponse,
    ElementProbe, MouseAction, MouseButton, ReadyState, Selector,
};
use crate::errors::{E2eError, Result};
use crate::suite::SessionFactory;
use async_trait::async_trait;
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::{Input, DOM, Page};
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Chrome stays alive between scenarios for at most this long without traffic.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(600);

const DIALOG_CHANNEL_CAPACITY: usize = 16;

/// A Chrome tab plus the state the driver keeps for it.
#[derive(Clone)]
pub struct ChromePage {
    tab: Arc<Tab>,
    state: Arc<PageState>,
}

struct PageState {
    dialogs: broadcast::Sender<DialogInfo>,
    pointer: Mutex<(f64, f64)>,
}

impl ChromePage {
    fn attach(tab: Arc<Tab>) -> Result<Self> {
        let (dialogs, _) = broadcast::channel(DIALOG_CHANNEL_CAPACITY);
        let sender = dialogs.clone();

        tab.add_event_listener(Arc::new(move |event: &Event| {
            if let Event::PageJavascriptDialogOpening(opening) = event {
                let params = &opening.params;
                let kind = match params.Type {
                    Page::DialogType::Alert => DialogKind::Alert,
                    Page::DialogType::Confirm => DialogKind::Confirm,
                    Page::DialogType::Prompt => DialogKind::Prompt,
                    Page::DialogType::Beforeunload => DialogKind::BeforeUnload,
                };
                // No subscriber means nobody armed a wait; the dialog stays open.
                let _ = sender.send(DialogInfo {
                    kind,
                    message: params.message.clone(),
                    default_prompt: params.default_prompt.clone(),
                });
            }
        }))
        .map_err(|e| E2eError::PageCreationFailed(e.to_string()))?;

        Ok(Self {
            tab,
            state: Arc::new(PageState {
                dialogs,
                pointer: Mutex::new((0.0, 0.0)),
            }),
        })
    }

    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    fn target_id(&self) -> String {
        self.tab.get_target_id().to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ClickPoint {
    x: f64,
    y: f64,
    receives: bool,
    blocker: Option<String>,
}

/// `BrowserDriver` backed by a local Chrome through the DevTools protocol.
pub struct ChromeDriver {
    browser: Option<Browser>,
    pages: Mutex<HashMap<String, ChromePage>>,
    slow_mo: Duration,
}

impl Default for ChromeDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ChromeDriver {
    pub fn new() -> Self {
        Self {
            browser: None,
            pages: Mutex::new(HashMap::new()),
            slow_mo: Duration::ZERO,
        }
    }

    fn browser(&self) -> Result<&Browser> {
        self.browser.as_ref().ok_or(E2eError::BrowserNotLaunched)
    }

    fn registered(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, ChromePage>>> {
        self.pages
            .lock()
            .map_err(|e| E2eError::Chrome(format!("page registry poisoned: {}", e)))
    }

    fn register(&self, tab: Arc<Tab>) -> Result<ChromePage> {
        let id = tab.get_target_id().to_string();
        let mut pages = self.registered()?;
        if let Some(page) = pages.get(&id) {
            return Ok(page.clone());
        }
        let page = ChromePage::attach(tab)?;
        pages.insert(id, page.clone());
        Ok(page)
    }

    async fn slow_down(&self) {
        if !self.slow_mo.is_zero() {
            tokio::time::sleep(self.slow_mo).await;
        }
    }

    /// Runs a blocking DevTools call on the blocking pool.
    async fn on_tab<T, F>(page: &ChromePage, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> Result<T> + Send + 'static,
    {
        let tab = page.tab.clone();
        tokio::task::spawn_blocking(move || call(tab.as_ref()))
            .await
            .map_err(|e| E2eError::Chrome(e.to_string()))?
    }

    async fn eval_raw(&self, page: &ChromePage, script: &str) -> Result<Value> {
        let script = script.to_string();
        Self::on_tab(page, move |tab| {
            let result = tab
                .evaluate(&script, false)
                .map_err(|e| E2eError::JavaScriptFailed(e.to_string()))?;
            Ok(result.value.unwrap_or(Value::Null))
        })
        .await
    }

    /// Runs a snippet that returns `JSON.stringify(...)` and decodes the result.
    async fn eval_json<T: DeserializeOwned>(&self, page: &ChromePage, script: &str) -> Result<T> {
        match self.eval_raw(page, script).await? {
            Value::String(raw) => Ok(serde_json::from_str(&raw)?),
            other => Err(E2eError::JavaScriptFailed(format!(
                "expected a JSON string, got {}",
                other
            ))),
        }
    }

    fn require(&self, found: bool, selector: &Selector) -> Result<()> {
        if found {
            Ok(())
        } else {
            Err(E2eError::ElementNotFound(selector.to_string()))
        }
    }

    fn dispatch_mouse(
        tab: &Tab,
        kind: Input::DispatchMouseEventTypeOption,
        x: f64,
        y: f64,
        button: Option<Input::MouseButton>,
        click_count: Option<u32>,
    ) -> Result<()> {
        tab.call_method(Input::DispatchMouseEvent {
            Type: kind,
            x,
            y,
            modifiers: None,
            timestamp: None,
            button,
            buttons: None,
            click_count,
            force: None,
            tangential_pressure: None,
            tilt_x: None,
            tilt_y: None,
            twist: None,
            delta_x: None,
            delta_y: None,
            pointer_Type: None,
        })
        .map_err(|e| E2eError::Chrome(e.to_string()))?;
        Ok(())
    }

    /// Runs a blocking input call off the runtime. Chrome does not answer input
    /// events while a dialog is open, so the call counts as done as soon as a
    /// dialog appears.
    async fn dispatch_until_dialog<F>(&self, page: &ChromePage, action: F) -> Result<()>
    where
        F: FnOnce(Arc<Tab>) -> Result<()> + Send + 'static,
    {
        let mut dialogs = page.state.dialogs.subscribe();
        let tab = page.tab.clone();
        let task = tokio::task::spawn_blocking(move || action(tab));

        tokio::select! {
            joined = task => joined.map_err(|e| E2eError::Chrome(e.to_string()))?,
            Ok(info) = dialogs.recv() => {
                debug!(kind = %info.kind, "dialog opened during input dispatch");
                Ok(())
            }
        }
    }

    async fn click_point(&self, page: &ChromePage, selector: &Selector) -> Result<ClickPoint> {
        let point: Option<ClickPoint> = self
            .eval_json(page, &scripts::click_point(selector))
            .await?;
        let point = point.ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))?;
        if !point.receives {
            let blocker = point.blocker.as_deref().unwrap_or("another element");
            return Err(E2eError::blocked(
                selector.as_str(),
                format!("{} would receive the click", blocker),
            ));
        }
        Ok(point)
    }
}

fn cdp_button(button: MouseButton) -> Input::MouseButton {
    match button {
        MouseButton::Left => Input::MouseButton::Left,
        MouseButton::Right => Input::MouseButton::Right,
        MouseButton::Middle => Input::MouseButton::Middle,
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    type Page = ChromePage;

    async fn launch(&mut self, config: &BrowserConfig) -> Result<()> {
        let window_size_arg = format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        );
        let user_agent_arg = config
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));

        let mut args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(&window_size_arg),
        ];
        if let Some(ref ua_arg) = user_agent_arg {
            args.push(OsStr::new(ua_arg));
        }
        if config.ignore_https_errors {
            args.push(OsStr::new("--ignore-certificate-errors"));
        }
        for arg in &config.args {
            args.push(OsStr::new(arg));
        }

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .args(args)
            .build()
            .map_err(|e| E2eError::LaunchFailed(e.to_string()))?;

        let browser =
            Browser::new(launch_options).map_err(|e| E2eError::LaunchFailed(e.to_string()))?;

        info!(headless = config.headless, "chrome launched");
        self.browser = Some(browser);
        self.slow_mo = Duration::from_millis(config.slow_mo_ms);
        Ok(())
    }

    async fn new_page(&self) -> Result<ChromePage> {
        let tab = self
            .browser()?
            .new_tab()
            .map_err(|e| E2eError::PageCreationFailed(e.to_string()))?;
        self.register(tab)
    }

    async fn pages(&self) -> Result<Vec<ChromePage>> {
        let tabs: Vec<Arc<Tab>> = {
            let tabs = self
                .browser()?
                .get_tabs()
                .lock()
                .map_err(|e| E2eError::Chrome(format!("tab list poisoned: {}", e)))?;
            tabs.iter().cloned().collect()
        };
        tabs.into_iter().map(|tab| self.register(tab)).collect()
    }

    fn page_id(&self, page: &ChromePage) -> String {
        page.target_id()
    }

    async fn close_page(&self, page: &ChromePage) -> Result<()> {
        Self::on_tab(page, |tab| {
            tab.close(true)
                .map(drop)
                .map_err(|e| E2eError::Chrome(e.to_string()))
        })
        .await?;
        self.registered()?.remove(&page.target_id());
        Ok(())
    }

    async fn navigate(&self, page: &ChromePage, url: &str) -> Result<()> {
        let url = url.to_string();
        Self::on_tab(page, move |tab| {
            tab.navigate_to(&url)
                .and_then(|tab| tab.wait_until_navigated())
                .map(drop)
                .map_err(|e| E2eError::NavigationFailed(e.to_string()))
        })
        .await?;

        if let Err(err) = self.eval_raw(page, scripts::INSTALL_REQUEST_COUNTER).await {
            warn!(error = %err, "request counter not installed");
        }
        Ok(())
    }

    async fn current_url(&self, page: &ChromePage) -> Result<String> {
        Ok(page.tab.get_url())
    }

    async fn title(&self, page: &ChromePage) -> Result<String> {
        let title: Option<String> =
            self.eval_json(page, &scripts::json_wrapped("document.title")).await?;
        Ok(title.unwrap_or_default())
    }

    async fn ready_state(&self, page: &ChromePage) -> Result<ReadyState> {
        let raw: String = self.eval_json(page, scripts::READY_STATE).await?;
        Ok(ReadyState::parse(&raw))
    }

    async fn inflight_requests(&self, page: &ChromePage) -> Result<usize> {
        let count: Option<usize> = self.eval_json(page, scripts::INFLIGHT_REQUESTS).await?;
        match count {
            Some(count) => Ok(count),
            // Documents opened by the page itself never went through `navigate`.
            None => {
                self.eval_raw(page, scripts::INSTALL_REQUEST_COUNTER).await?;
                Ok(0)
            }
        }
    }

    async fn probe(&self, page: &ChromePage, selector: &Selector) -> Result<ElementProbe> {
        self.eval_json(page, &scripts::probe(selector)).await
    }

    async fn click(
        &self,
        page: &ChromePage,
        selector: &Selector,
        options: ClickOptions,
    ) -> Result<()> {
        let point = self.click_point(page, selector).await?;
        debug!(selector = %selector, x = point.x, y = point.y, "dispatching click");

        let button = cdp_button(options.button);
        let clicks = options.click_count.max(1);
        let (x, y) = (point.x, point.y);
        self.dispatch_until_dialog(page, move |tab| {
            Self::dispatch_mouse(
                &tab,
                Input::DispatchMouseEventTypeOption::MouseMoved,
                x,
                y,
                None,
                None,
            )?;
            for count in 1..=clicks {
                Self::dispatch_mouse(
                    &tab,
                    Input::DispatchMouseEventTypeOption::MousePressed,
                    x,
                    y,
                    Some(button.clone()),
                    Some(count),
                )?;
                Self::dispatch_mouse(
                    &tab,
                    Input::DispatchMouseEventTypeOption::MouseReleased,
                    x,
                    y,
                    Some(button.clone()),
                    Some(count),
                )?;
            }
            Ok(())
        })
        .await?;

        if let Ok(mut pointer) = page.state.pointer.lock() {
            *pointer = (x, y);
        }
        self.slow_down().await;
        Ok(())
    }

    async fn dom_click(&self, page: &ChromePage, selector: &Selector) -> Result<()> {
        let script = scripts::dom_click(selector);
        let raw = selector.to_string();
        let mut dialogs = page.state.dialogs.subscribe();
        let tab = page.tab.clone();
        let task = tokio::task::spawn_blocking(move || {
            tab.evaluate(&script, false)
                .map(|result| result.value)
                .map_err(|e| E2eError::JavaScriptFailed(e.to_string()))
        });

        tokio::select! {
            joined = task => {
                let value = joined.map_err(|e| E2eError::Chrome(e.to_string()))??;
                let clicked = value
                    .and_then(|v| v.as_str().map(|s| s == "true"))
                    .unwrap_or(false);
                if !clicked {
                    return Err(E2eError::ElementNotFound(raw));
                }
            }
            Ok(info) = dialogs.recv() => {
                debug!(kind = %info.kind, "dialog opened during DOM click");
            }
        }
        self.slow_down().await;
        Ok(())
    }

    async fn fill(&self, page: &ChromePage, selector: &Selector, value: &str) -> Result<()> {
        let found: bool = self.eval_json(page, &scripts::fill(selector, value)).await?;
        self.require(found, selector)?;
        self.slow_down().await;
        Ok(())
    }

    async fn select_options(
        &self,
        page: &ChromePage,
        selector: &Selector,
        values: &[String],
    ) -> Result<()> {
        let found: bool = self.eval_json(page, &scripts::select_options(selector, values)).await?;
        self.require(found, selector)?;
        self.slow_down().await;
        Ok(())
    }

    async fn set_input_files(
        &self,
        page: &ChromePage,
        selector: &Selector,
        files: &[PathBuf],
    ) -> Result<()> {
        let script = scripts::element_handle(selector);
        let object_id = Self::on_tab(page, move |tab| {
            tab.evaluate(&script, false)
                .map(|handle| handle.object_id)
                .map_err(|e| E2eError::JavaScriptFailed(e.to_string()))
        })
        .await?
        .ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))?;

        let files = files
            .iter()
            .map(|path| {
                std::fs::canonicalize(path)
                    .map(|p| p.to_string_lossy().into_owned())
                    .map_err(E2eError::from)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::on_tab(page, move |tab| {
            tab.call_method(DOM::SetFileInputFiles {
                files,
                node_id: None,
                backend_node_id: None,
                object_id: Some(object_id),
            })
            .map(drop)
            .map_err(|e| E2eError::Chrome(e.to_string()))
        })
        .await?;
        self.slow_down().await;
        Ok(())
    }

    async fn set_checked(
        &self,
        page: &ChromePage,
        selector: &Selector,
        checked: bool,
    ) -> Result<()> {
        let settled: bool = self.eval_json(page, &scripts::set_checked(selector, checked)).await?;
        if !settled {
            return Err(E2eError::blocked(
                selector.as_str(),
                format!("checked state did not become {}", checked),
            ));
        }
        self.slow_down().await;
        Ok(())
    }

    async fn hover(&self, page: &ChromePage, selector: &Selector) -> Result<()> {
        let bbox = self
            .bounding_box(page, selector)
            .await?
            .ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))?;
        let (x, y) = bbox.center();
        self.mouse(page, MouseAction::Move { x, y }).await
    }

    async fn text_content(&self, page: &ChromePage, selector: &Selector) -> Result<Option<String>> {
        self.eval_json(page, &scripts::text_content(selector)).await
    }

    async fn all_text_contents(&self, page: &ChromePage, selector: &Selector) -> Result<Vec<String>> {
        self.eval_json(page, &scripts::all_text_contents(selector)).await
    }

    async fn input_value(&self, page: &ChromePage, selector: &Selector) -> Result<String> {
        let value: Option<String> = self.eval_json(page, &scripts::input_value(selector)).await?;
        value.ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))
    }

    async fn attribute(
        &self,
        page: &ChromePage,
        selector: &Selector,
        name: &str,
    ) -> Result<Option<String>> {
        self.eval_json(page, &scripts::attribute(selector, name)).await
    }

    async fn outer_html(&self, page: &ChromePage, selector: &Selector) -> Result<String> {
        let html: Option<String> = self.eval_json(page, &scripts::outer_html(selector)).await?;
        html.ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))
    }

    async fn bounding_box(
        &self,
        page: &ChromePage,
        selector: &Selector,
    ) -> Result<Option<BoundingBox>> {
        self.eval_json(page, &scripts::bounding_box(selector)).await
    }

    async fn remove_elements(&self, page: &ChromePage, css: &[String]) -> Result<usize> {
        self.eval_json(page, &scripts::remove_elements(css)).await
    }

    async fn evaluate(&self, page: &ChromePage, script: &str) -> Result<Value> {
        self.eval_json(page, &scripts::json_wrapped(script)).await
    }

    async fn mouse(&self, page: &ChromePage, action: MouseAction) -> Result<()> {
        let (x, y) = match action {
            MouseAction::Move { x, y } => (x, y),
            MouseAction::Down | MouseAction::Up => page
                .state
                .pointer
                .lock()
                .map(|p| *p)
                .map_err(|e| E2eError::Chrome(e.to_string()))?,
        };

        let (kind, button, count) = match action {
            MouseAction::Move { .. } => (Input::DispatchMouseEventTypeOption::MouseMoved, None, None),
            MouseAction::Down => (
                Input::DispatchMouseEventTypeOption::MousePressed,
                Some(Input::MouseButton::Left),
                Some(1),
            ),
            MouseAction::Up => (
                Input::DispatchMouseEventTypeOption::MouseReleased,
                Some(Input::MouseButton::Left),
                Some(1),
            ),
        };

        self.dispatch_until_dialog(page, move |tab| {
            Self::dispatch_mouse(&tab, kind, x, y, button, count)
        })
        .await?;

        if let Ok(mut pointer) = page.state.pointer.lock() {
            *pointer = (x, y);
        }
        Ok(())
    }

    async fn press_key(&self, page: &ChromePage, key: &str) -> Result<()> {
        let key = key.to_string();
        self.dispatch_until_dialog(page, move |tab| {
            tab.press_key(&key)
                .map(drop)
                .map_err(|e| E2eError::Chrome(e.to_string()))
        })
        .await?;
        self.slow_down().await;
        Ok(())
    }

    async fn type_text(&self, page: &ChromePage, text: &str) -> Result<()> {
        let text = text.to_string();
        self.dispatch_until_dialog(page, move |tab| {
            tab.type_str(&text)
                .map(drop)
                .map_err(|e| E2eError::Chrome(e.to_string()))
        })
        .await?;
        self.slow_down().await;
        Ok(())
    }

    async fn screenshot(&self, page: &ChromePage) -> Result<Vec<u8>> {
        Self::on_tab(page, |tab| {
            tab.capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
                .map_err(|e| E2eError::ScreenshotFailed(e.to_string()))
        })
        .await
    }

    fn dialog_events(&self, page: &ChromePage) -> broadcast::Receiver<DialogInfo> {
        page.state.dialogs.subscribe()
    }

    async fn answer_dialog(&self, page: &ChromePage, response: DialogResponse) -> Result<()> {
        let (accept, prompt_text) = match response {
            DialogResponse::Accept { prompt_text } => (true, prompt_text),
            DialogResponse::Dismiss => (false, None),
        };
        Self::on_tab(page, move |tab| {
            tab.call_method(Page::HandleJavaScriptDialog {
                accept,
                prompt_text,
            })
            .map(drop)
            .map_err(|e| E2eError::Dialog(e.to_string()))
        })
        .await
    }

    fn is_running(&self) -> bool {
        self.browser.is_some()
    }

    async fn close(&mut self) -> Result<()> {
        if let Ok(mut pages) = self.pages.lock() {
            pages.clear();
        }
        // Dropping the handle kills the Chrome process.
        self.browser = None;
        Ok(())
    }
}

/// Launches a fresh Chrome for every scenario.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeSessionFactory;

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    type Driver = ChromeDriver;

    async fn create(&self, config: Arc<Config>) -> Result<Session<ChromeDriver>> {
        Session::start(ChromeDriver::new(), config).await
    }
}

use crate::core::config::BrowserConfig;
use crate::core::selector::Selector;
use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use tokio::sync::broadcast;

/// What a single query tells us about the first element a selector matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementProbe {
    pub count: usize,
    pub attached: bool,
    pub visible: bool,
    pub enabled: bool,
}

impl ElementProbe {
    pub fn missing() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickOptions {
    pub button: MouseButton,
    pub click_count: u32,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            click_count: 1,
        }
    }
}

impl ClickOptions {
    pub fn double() -> Self {
        Self {
            click_count: 2,
            ..Self::default()
        }
    }

    pub fn right() -> Self {
        Self {
            button: MouseButton::Right,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseAction {
    Move { x: f64, y: f64 },
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    Alert,
    Confirm,
    Prompt,
    BeforeUnload,
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DialogKind::Alert => "alert",
            DialogKind::Confirm => "confirm",
            DialogKind::Prompt => "prompt",
            DialogKind::BeforeUnload => "beforeunload",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogInfo {
    pub kind: DialogKind,
    pub message: String,
    pub default_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResponse {
    Accept { prompt_text: Option<String> },
    Dismiss,
}

/// `document.readyState` of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "complete" => ReadyState::Complete,
            "interactive" => ReadyState::Interactive,
            _ => ReadyState::Loading,
        }
    }
}

/// The browser-automation runtime the synchronization layer is written against.
///
/// Implementations do not wait for anything on their own: every method acts on
/// the page as it is right now. Waiting is the caller's job.
#[async_trait]
pub trait BrowserDriver: Send + Sync + 'static {
    type Page: Clone + Send + Sync + 'static;

    async fn launch(&mut self, config: &BrowserConfig) -> Result<()>;

    async fn new_page(&self) -> Result<Self::Page>;

    /// Every open page, including ones opened by the application itself.
    async fn pages(&self) -> Result<Vec<Self::Page>>;

    fn page_id(&self, page: &Self::Page) -> String;

    async fn close_page(&self, page: &Self::Page) -> Result<()>;

    async fn navigate(&self, page: &Self::Page, url: &str) -> Result<()>;

    async fn current_url(&self, page: &Self::Page) -> Result<String>;

    async fn title(&self, page: &Self::Page) -> Result<String>;

    async fn ready_state(&self, page: &Self::Page) -> Result<ReadyState>;

    /// Requests started by the page that have not completed yet.
    async fn inflight_requests(&self, page: &Self::Page) -> Result<usize>;

    async fn probe(&self, page: &Self::Page, selector: &Selector) -> Result<ElementProbe>;

    /// Trusted pointer click at the element's center. Fails with
    /// `InteractionBlocked` when another element would receive the click.
    async fn click(&self, page: &Self::Page, selector: &Selector, options: ClickOptions)
        -> Result<()>;

    /// `element.click()` invoked in the page, bypassing hit testing.
    async fn dom_click(&self, page: &Self::Page, selector: &Selector) -> Result<()>;

    async fn fill(&self, page: &Self::Page, selector: &Selector, value: &str) -> Result<()>;

    async fn select_options(
        &self,
        page: &Self::Page,
        selector: &Selector,
        values: &[String],
    ) -> Result<()>;

    async fn set_input_files(
        &self,
        page: &Self::Page,
        selector: &Selector,
        files: &[PathBuf],
    ) -> Result<()>;

    async fn set_checked(&self, page: &Self::Page, selector: &Selector, checked: bool)
        -> Result<()>;

    async fn hover(&self, page: &Self::Page, selector: &Selector) -> Result<()>;

    async fn text_content(&self, page: &Self::Page, selector: &Selector)
        -> Result<Option<String>>;

    async fn all_text_contents(&self, page: &Self::Page, selector: &Selector)
        -> Result<Vec<String>>;

    async fn input_value(&self, page: &Self::Page, selector: &Selector) -> Result<String>;

    async fn attribute(
        &self,
        page: &Self::Page,
        selector: &Selector,
        name: &str,
    ) -> Result<Option<String>>;

    async fn outer_html(&self, page: &Self::Page, selector: &Selector) -> Result<String>;

    async fn bounding_box(&self, page: &Self::Page, selector: &Selector)
        -> Result<Option<BoundingBox>>;

    /// Removes every element matching any of the CSS selectors, returning how
    /// many were removed.
    async fn remove_elements(&self, page: &Self::Page, css: &[String]) -> Result<usize>;

    async fn evaluate(&self, page: &Self::Page, script: &str) -> Result<Value>;

    async fn mouse(&self, page: &Self::Page, action: MouseAction) -> Result<()>;

    async fn press_key(&self, page: &Self::Page, key: &str) -> Result<()>;

    async fn type_text(&self, page: &Self::Page, text: &str) -> Result<()>;

    async fn screenshot(&self, page: &Self::Page) -> Result<Vec<u8>>;

    /// Subscribes to native dialogs on the page. Only dialogs opened after the
    /// call are delivered.
    fn dialog_events(&self, page: &Self::Page) -> broadcast::Receiver<DialogInfo>;

    async fn answer_dialog(&self, page: &Self::Page, response: DialogResponse) -> Result<()>;

    fn is_running(&self) -> bool;

    async fn close(&mut self) -> Result<()>;
}

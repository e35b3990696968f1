//! In-memory [`BrowserDriver`] for exercising page objects and the
//! synchronization layer without a browser.
//!
//! Elements are keyed by the exact selector string the code under test uses.
//! Time is read from `tokio::time`, so tests running on a paused clock can
//! schedule elements to appear, disappear, or fire events deterministically.

use crate::browser::Session;
use crate::core::config::BrowserConfig;
use crate::core::{
    BoundingBox, BrowserDriver, ClickOptions, Config, DialogInfo, DialogKind, DialogResponse,
    ElementProbe, MouseAction, ReadyState, Selector,
};
use crate::errors::{E2eError, Result};
use crate::fixtures::DateOfBirth;
use crate::pages::FORMS;
use crate::suite::SessionFactory;
use crate::sync::Synchronizer;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MockPage {
    id: String,
}

/// Something the fake page does in response to a click or hover.
#[derive(Clone)]
pub struct Effect {
    delay: Duration,
    action: EffectAction,
}

#[derive(Clone)]
enum EffectAction {
    Dialog {
        info: DialogInfo,
        report_to: Option<String>,
    },
    NewPage(String),
    Show(String),
    Hide(String),
    SetText(String, String),
    Remove(String),
    Navigate(String),
    Custom(Arc<dyn Fn(&MockDriver) + Send + Sync>),
}

impl Effect {
    fn now(action: EffectAction) -> Self {
        Self {
            delay: Duration::ZERO,
            action,
        }
    }

    pub fn dialog(kind: DialogKind, message: &str) -> Self {
        Self::now(EffectAction::Dialog {
            info: DialogInfo {
                kind,
                message: message.to_string(),
                default_prompt: None,
            },
            report_to: None,
        })
    }

    pub fn new_page(url: &str) -> Self {
        Self::now(EffectAction::NewPage(url.to_string()))
    }

    pub fn show(selector: &str) -> Self {
        Self::now(EffectAction::Show(selector.to_string()))
    }

    pub fn hide(selector: &str) -> Self {
        Self::now(EffectAction::Hide(selector.to_string()))
    }

    pub fn set_text(selector: &str, text: &str) -> Self {
        Self::now(EffectAction::SetText(selector.to_string(), text.to_string()))
    }

    pub fn remove(selector: &str) -> Self {
        Self::now(EffectAction::Remove(selector.to_string()))
    }

    pub fn navigate(url: &str) -> Self {
        Self::now(EffectAction::Navigate(url.to_string()))
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&MockDriver) + Send + Sync + 'static,
    {
        Self::now(EffectAction::Custom(Arc::new(f)))
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// After the dialog is answered, writes the result line the way the
    /// dialogs page does ("You selected Ok", "You entered ...").
    pub fn reports_to(mut self, selector: &str) -> Self {
        if let EffectAction::Dialog { report_to, .. } = &mut self.action {
            *report_to = Some(selector.to_string());
        }
        self
    }
}

#[derive(Clone)]
struct MockElement {
    created: Instant,
    visible_after: Duration,
    removed_after: Option<Duration>,
    removed: bool,
    hidden: bool,
    enabled: bool,
    count: usize,
    text: String,
    texts: Option<Vec<String>>,
    value: String,
    checked: bool,
    attributes: HashMap<String, String>,
    html: Option<String>,
    bbox: BoundingBox,
    blocked_by: Option<String>,
    dom_click_fails: bool,
    effects: Vec<(ClickOptions, Effect)>,
    hover_effects: Vec<Effect>,
    clicks: usize,
    files: Vec<PathBuf>,
}

impl MockElement {
    fn new() -> Self {
        Self {
            created: Instant::now(),
            visible_after: Duration::ZERO,
            removed_after: None,
            removed: false,
            hidden: false,
            enabled: true,
            count: 1,
            text: String::new(),
            texts: None,
            value: String::new(),
            checked: false,
            attributes: HashMap::new(),
            html: None,
            bbox: BoundingBox {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 30.0,
            },
            blocked_by: None,
            dom_click_fails: false,
            effects: Vec::new(),
            hover_effects: Vec::new(),
            clicks: 0,
            files: Vec::new(),
        }
    }

    fn attached(&self) -> bool {
        !self.removed
            && self
                .removed_after
                .map_or(true, |after| self.created.elapsed() < after)
    }

    fn visible(&self) -> bool {
        self.attached() && !self.hidden && self.created.elapsed() >= self.visible_after
    }

    fn probe(&self) -> ElementProbe {
        let attached = self.attached();
        ElementProbe {
            count: if attached { self.count } else { 0 },
            attached,
            visible: self.visible(),
            enabled: attached && self.enabled,
        }
    }

    fn reveal(&mut self) {
        self.created = Instant::now();
        self.visible_after = Duration::ZERO;
        self.removed_after = None;
        self.removed = false;
        self.hidden = false;
    }
}

struct PageState {
    id: String,
    url: String,
    title: String,
    dialogs: broadcast::Sender<DialogInfo>,
}

struct OpenDialog {
    info: DialogInfo,
    report_to: Option<String>,
}

struct MockState {
    running: bool,
    next_page: usize,
    pages: Vec<PageState>,
    elements: HashMap<String, MockElement>,
    calls: HashMap<&'static str, usize>,
    scripts: HashMap<String, VecDeque<Value>>,
    evaluated: Vec<String>,
    failing_probes: usize,
    navigation_fails: bool,
    loading_until: Option<Instant>,
    inflight_until: Option<Instant>,
    open_dialog: Option<OpenDialog>,
    dialog_responses: Vec<DialogResponse>,
    mouse: Vec<MouseAction>,
    mouse_up_effects: Vec<Effect>,
    key_effects: Vec<(String, Effect)>,
    keys: Vec<String>,
    typed: String,
}

impl MockState {
    fn page_mut(&mut self, id: &str) -> Result<&mut PageState> {
        self.pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| E2eError::UnknownTarget(id.to_string()))
    }

    fn open_page(&mut self, url: &str) -> MockPage {
        let id = format!("page-{}", self.next_page);
        self.next_page += 1;
        let (dialogs, _) = broadcast::channel(16);
        self.pages.push(PageState {
            id: id.clone(),
            url: url.to_string(),
            title: "DEMOQA".to_string(),
            dialogs,
        });
        MockPage { id }
    }

    fn attached(&self, key: &str) -> Result<&MockElement> {
        self.elements
            .get(key)
            .filter(|e| e.attached())
            .ok_or_else(|| E2eError::ElementNotFound(key.to_string()))
    }

    fn attached_mut(&mut self, key: &str) -> Result<&mut MockElement> {
        self.elements
            .get_mut(key)
            .filter(|e| e.attached())
            .ok_or_else(|| E2eError::ElementNotFound(key.to_string()))
    }

    fn bump(&mut self, call: &'static str) {
        *self.calls.entry(call).or_default() += 1;
    }
}

#[derive(Clone)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
    main: MockPage,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Chained configuration of one fake element. Every call takes effect
/// immediately.
pub struct ElementBuilder {
    driver: MockDriver,
    key: String,
}

impl ElementBuilder {
    fn update(self, f: impl FnOnce(&mut MockElement)) -> Self {
        {
            let mut state = self.driver.lock();
            if let Some(element) = state.elements.get_mut(&self.key) {
                f(element);
            }
        }
        self
    }

    pub fn visible_after(self, delay: Duration) -> Self {
        self.update(|e| e.visible_after = delay)
    }

    pub fn removed_after(self, delay: Duration) -> Self {
        self.update(|e| e.removed_after = Some(delay))
    }

    pub fn hidden(self) -> Self {
        self.update(|e| e.hidden = true)
    }

    pub fn detached(self) -> Self {
        self.update(|e| e.removed = true)
    }

    pub fn disabled(self) -> Self {
        self.update(|e| e.enabled = false)
    }

    pub fn enabled_after(self, delay: Duration) -> Self {
        let key = self.key.clone();
        let driver = self.driver.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(e) = driver.lock().elements.get_mut(&key) {
                e.enabled = true;
            }
        });
        self.disabled()
    }

    pub fn count(self, count: usize) -> Self {
        self.update(|e| e.count = count)
    }

    pub fn text(self, text: &str) -> Self {
        self.update(|e| e.text = text.to_string())
    }

    pub fn texts(self, texts: &[&str]) -> Self {
        self.update(|e| {
            e.count = texts.len();
            e.texts = Some(texts.iter().map(|t| t.to_string()).collect());
        })
    }

    pub fn value(self, value: &str) -> Self {
        self.update(|e| e.value = value.to_string())
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.update(|e| {
            e.attributes.insert(name.to_string(), value.to_string());
        })
    }

    pub fn classes(self, classes: &str) -> Self {
        self.attr("class", classes)
    }

    pub fn html(self, html: &str) -> Self {
        self.update(|e| e.html = Some(html.to_string()))
    }

    pub fn bbox(self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.update(|e| {
            e.bbox = BoundingBox {
                x,
                y,
                width,
                height,
            }
        })
    }

    pub fn blocked_by(self, overlay: &str) -> Self {
        self.update(|e| e.blocked_by = Some(overlay.to_string()))
    }

    pub fn dom_click_fails(self) -> Self {
        self.update(|e| e.dom_click_fails = true)
    }

    pub fn on_click(self, effect: Effect) -> Self {
        self.on_click_with(ClickOptions::default(), effect)
    }

    pub fn on_double_click(self, effect: Effect) -> Self {
        self.on_click_with(ClickOptions::double(), effect)
    }

    pub fn on_right_click(self, effect: Effect) -> Self {
        self.on_click_with(ClickOptions::right(), effect)
    }

    pub fn on_click_with(self, options: ClickOptions, effect: Effect) -> Self {
        self.update(|e| e.effects.push((options, effect)))
    }

    pub fn on_hover(self, effect: Effect) -> Self {
        self.update(|e| e.hover_effects.push(effect))
    }
}

impl MockDriver {
    pub fn new() -> Self {
        let mut state = MockState {
            running: true,
            next_page: 0,
            pages: Vec::new(),
            elements: HashMap::new(),
            calls: HashMap::new(),
            scripts: HashMap::new(),
            evaluated: Vec::new(),
            failing_probes: 0,
            navigation_fails: false,
            loading_until: None,
            inflight_until: None,
            open_dialog: None,
            dialog_responses: Vec::new(),
            mouse: Vec::new(),
            mouse_up_effects: Vec::new(),
            key_effects: Vec::new(),
            keys: Vec::new(),
            typed: String::new(),
        };
        let main = state.open_page("about:blank");
        Self {
            state: Arc::new(Mutex::new(state)),
            main,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread poisons the lock; the data is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn main_page(&self) -> MockPage {
        self.main.clone()
    }

    pub fn synchronizer(&self) -> Synchronizer<MockDriver> {
        self.synchronizer_with(Config::default())
    }

    pub fn synchronizer_with(&self, config: Config) -> Synchronizer<MockDriver> {
        Synchronizer::new(Arc::new(self.clone()), self.main_page(), Arc::new(config))
    }

    /// Registers `selector` (or resets it) as a visible, enabled element.
    pub fn element(&self, selector: &str) -> ElementBuilder {
        self.lock()
            .elements
            .insert(selector.to_string(), MockElement::new());
        ElementBuilder {
            driver: self.clone(),
            key: selector.to_string(),
        }
    }

    /// Configures an element that may already exist, keeping its state.
    pub fn existing(&self, selector: &str) -> ElementBuilder {
        self.lock()
            .elements
            .entry(selector.to_string())
            .or_insert_with(MockElement::new);
        ElementBuilder {
            driver: self.clone(),
            key: selector.to_string(),
        }
    }

    pub fn has_element(&self, selector: &str) -> bool {
        self.lock()
            .elements
            .get(selector)
            .is_some_and(|e| e.attached())
    }

    pub fn is_shown(&self, selector: &str) -> bool {
        self.lock()
            .elements
            .get(selector)
            .is_some_and(|e| e.visible())
    }

    pub fn value_of(&self, selector: &str) -> String {
        self.lock()
            .elements
            .get(selector)
            .map(|e| e.value.clone())
            .unwrap_or_default()
    }

    pub fn text_of(&self, selector: &str) -> String {
        self.lock()
            .elements
            .get(selector)
            .map(|e| e.text.clone())
            .unwrap_or_default()
    }

    pub fn is_checked(&self, selector: &str) -> bool {
        self.lock()
            .elements
            .get(selector)
            .is_some_and(|e| e.checked)
    }

    pub fn files_of(&self, selector: &str) -> Vec<PathBuf> {
        self.lock()
            .elements
            .get(selector)
            .map(|e| e.files.clone())
            .unwrap_or_default()
    }

    pub fn clicks_on(&self, selector: &str) -> usize {
        self.lock()
            .elements
            .get(selector)
            .map_or(0, |e| e.clicks)
    }

    pub fn calls(&self, call: &str) -> usize {
        self.lock().calls.get(call).copied().unwrap_or(0)
    }

    pub fn mouse_actions(&self) -> Vec<MouseAction> {
        self.lock().mouse.clone()
    }

    /// Press and release points of the most recent drag.
    pub fn last_drag(&self) -> Option<((f64, f64), (f64, f64))> {
        let actions = self.mouse_actions();
        let down = actions.iter().rposition(|a| *a == MouseAction::Down)?;
        let position = |actions: &[MouseAction]| {
            actions.iter().rev().find_map(|a| match a {
                MouseAction::Move { x, y } => Some((*x, *y)),
                _ => None,
            })
        };
        Some((position(&actions[..down])?, position(&actions[down..])?))
    }

    /// Fires `effect` every time the mouse button is released, so drops can
    /// rearrange the page.
    pub fn on_mouse_up(&self, effect: Effect) {
        self.lock().mouse_up_effects.push(effect);
    }

    /// Fires `effect` every time `key` is pressed.
    pub fn on_key(&self, key: &str, effect: Effect) {
        self.lock().key_effects.push((key.to_string(), effect));
    }

    pub fn keys_pressed(&self) -> Vec<String> {
        self.lock().keys.clone()
    }

    pub fn typed_text(&self) -> String {
        self.lock().typed.clone()
    }

    pub fn evaluated_scripts(&self) -> Vec<String> {
        self.lock().evaluated.clone()
    }

    pub fn dialog_responses(&self) -> Vec<DialogResponse> {
        self.lock().dialog_responses.clone()
    }

    pub fn open_page_ids(&self) -> Vec<String> {
        self.lock().pages.iter().map(|p| p.id.clone()).collect()
    }

    pub fn page_id_of(&self, page: &MockPage) -> String {
        page.id.clone()
    }

    pub fn url_of(&self, page: &MockPage) -> Option<String> {
        self.lock()
            .pages
            .iter()
            .find(|p| p.id == page.id)
            .map(|p| p.url.clone())
    }

    /// Queues the values successive evaluations of `script` return; the last
    /// one repeats.
    pub fn script_results(&self, script: &str, values: Vec<Value>) {
        self.lock()
            .scripts
            .insert(script.to_string(), values.into_iter().collect());
    }

    pub fn fail_next_probes(&self, count: usize) {
        self.lock().failing_probes = count;
    }

    pub fn fail_navigation(&self) {
        self.lock().navigation_fails = true;
    }

    pub fn loading_for(&self, duration: Duration) {
        self.lock().loading_until = Some(Instant::now() + duration);
    }

    pub fn requests_inflight_for(&self, duration: Duration) {
        self.lock().inflight_until = Some(Instant::now() + duration);
    }

    pub fn ready_state_now(&self) -> ReadyState {
        match self.lock().loading_until {
            Some(until) if Instant::now() < until => ReadyState::Interactive,
            _ => ReadyState::Complete,
        }
    }

    /// Registers the practice form. Picking the day writes the date into the
    /// input, and submitting renders the confirmation modal from whatever was
    /// entered.
    pub fn practice_form(&self, dob: &DateOfBirth) {
        let f = &FORMS;
        for sel in [
            f.first_name,
            f.last_name,
            f.email,
            f.gender_male,
            f.gender_female,
            f.gender_other,
            f.mobile,
            f.date_of_birth,
            f.month_select,
            f.year_select,
            f.subjects,
            f.hobby_sports,
            f.hobby_reading,
            f.hobby_music,
            f.picture,
            f.current_address,
            f.state,
            f.city,
        ] {
            self.element(sel);
        }

        let typed = dob.input_format();
        self.element(&dob.day_selector())
            .on_click(Effect::custom(move |m| {
                m.existing(FORMS.date_of_birth).value(&typed);
            }));

        let dob = *dob;
        self.element(f.submit).on_click(Effect::custom(move |m| {
            let gender = [
                (FORMS.gender_male, "Male"),
                (FORMS.gender_female, "Female"),
                (FORMS.gender_other, "Other"),
            ]
            .into_iter()
            .find(|(sel, _)| m.clicks_on(sel) > 0)
            .map_or("", |(_, label)| label);

            let rows = [
                (
                    "Student Name",
                    format!("{} {}", m.value_of(FORMS.first_name), m.value_of(FORMS.last_name)),
                ),
                ("Student Email", m.value_of(FORMS.email)),
                ("Gender", gender.to_string()),
                ("Mobile", m.value_of(FORMS.mobile)),
                (
                    "Date of Birth",
                    if m.clicks_on(&dob.day_selector()) > 0 {
                        dob.modal_format()
                    } else {
                        String::new()
                    },
                ),
                ("Address", m.value_of(FORMS.current_address)),
            ];
            let body = rows
                .iter()
                .map(|(label, value)| format!("<tr><td>{}</td><td>{}</td></tr>", label, value))
                .collect::<String>();
            let text = rows
                .iter()
                .map(|(label, value)| format!("{} {}", label, value))
                .collect::<Vec<_>>()
                .join(" ");

            m.element(FORMS.modal)
                .html(&format!(
                    r#"<div class="modal-content"><table><tbody>{}</tbody></table></div>"#,
                    body
                ))
                .text(&text);
        }));
    }

    fn fire(&self, page_id: &str, effects: Vec<Effect>) {
        for effect in effects {
            if effect.delay.is_zero() {
                self.apply(page_id, effect.action);
            } else {
                let driver = self.clone();
                let page_id = page_id.to_string();
                tokio::spawn(async move {
                    tokio::time::sleep(effect.delay).await;
                    driver.apply(&page_id, effect.action);
                });
            }
        }
    }

    fn apply(&self, page_id: &str, action: EffectAction) {
        match action {
            EffectAction::Custom(f) => f(self),
            EffectAction::Dialog { info, report_to } => {
                let mut state = self.lock();
                state.open_dialog = Some(OpenDialog {
                    info: info.clone(),
                    report_to,
                });
                if let Ok(page) = state.page_mut(page_id) {
                    // no subscriber means nobody armed a listener
                    let _ = page.dialogs.send(info);
                }
            }
            EffectAction::NewPage(url) => {
                self.lock().open_page(&url);
            }
            EffectAction::Show(selector) => {
                self.lock()
                    .elements
                    .entry(selector)
                    .or_insert_with(MockElement::new)
                    .reveal();
            }
            EffectAction::Hide(selector) => {
                if let Some(e) = self.lock().elements.get_mut(&selector) {
                    e.hidden = true;
                }
            }
            EffectAction::SetText(selector, text) => {
                let mut state = self.lock();
                let element = state
                    .elements
                    .entry(selector)
                    .or_insert_with(MockElement::new);
                element.reveal();
                element.text = text;
            }
            EffectAction::Remove(selector) => {
                if let Some(e) = self.lock().elements.get_mut(&selector) {
                    e.removed = true;
                }
            }
            EffectAction::Navigate(url) => {
                if let Ok(page) = self.lock().page_mut(page_id) {
                    page.url = url;
                }
            }
        }
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    type Page = MockPage;

    async fn launch(&mut self, _config: &BrowserConfig) -> Result<()> {
        self.lock().running = true;
        Ok(())
    }

    async fn new_page(&self) -> Result<MockPage> {
        let mut state = self.lock();
        state.bump("new_page");
        Ok(state.open_page("about:blank"))
    }

    async fn pages(&self) -> Result<Vec<MockPage>> {
        Ok(self
            .lock()
            .pages
            .iter()
            .map(|p| MockPage { id: p.id.clone() })
            .collect())
    }

    fn page_id(&self, page: &MockPage) -> String {
        page.id.clone()
    }

    async fn close_page(&self, page: &MockPage) -> Result<()> {
        let mut state = self.lock();
        state.bump("close_page");
        state.pages.retain(|p| p.id != page.id);
        Ok(())
    }

    async fn navigate(&self, page: &MockPage, url: &str) -> Result<()> {
        let mut state = self.lock();
        state.bump("navigate");
        if state.navigation_fails {
            return Err(E2eError::NavigationFailed(url.to_string()));
        }
        state.page_mut(&page.id)?.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self, page: &MockPage) -> Result<String> {
        Ok(self.lock().page_mut(&page.id)?.url.clone())
    }

    async fn title(&self, page: &MockPage) -> Result<String> {
        Ok(self.lock().page_mut(&page.id)?.title.clone())
    }

    async fn ready_state(&self, page: &MockPage) -> Result<ReadyState> {
        self.lock().page_mut(&page.id)?;
        Ok(self.ready_state_now())
    }

    async fn inflight_requests(&self, _page: &MockPage) -> Result<usize> {
        Ok(match self.lock().inflight_until {
            Some(until) if Instant::now() < until => 1,
            _ => 0,
        })
    }

    async fn probe(&self, _page: &MockPage, selector: &Selector) -> Result<ElementProbe> {
        let mut state = self.lock();
        state.bump("probe");
        if state.failing_probes > 0 {
            state.failing_probes -= 1;
            return Err(E2eError::JavaScriptFailed(
                "Execution context was destroyed".to_string(),
            ));
        }
        Ok(state
            .elements
            .get(selector.as_str())
            .map_or_else(ElementProbe::missing, MockElement::probe))
    }

    async fn click(&self, page: &MockPage, selector: &Selector, options: ClickOptions) -> Result<()> {
        let effects = {
            let mut state = self.lock();
            state.bump("click");
            let element = state.attached_mut(selector.as_str())?;
            if let Some(overlay) = &element.blocked_by {
                return Err(E2eError::blocked(
                    selector.as_str(),
                    format!("{} would receive the click", overlay),
                ));
            }
            element.clicks += 1;
            element
                .effects
                .iter()
                .filter(|(o, _)| *o == options)
                .map(|(_, e)| e.clone())
                .collect::<Vec<_>>()
        };
        self.fire(&page.id, effects);
        Ok(())
    }

    async fn dom_click(&self, page: &MockPage, selector: &Selector) -> Result<()> {
        let effects = {
            let mut state = self.lock();
            state.bump("dom_click");
            let element = state.attached_mut(selector.as_str())?;
            if element.dom_click_fails {
                return Err(E2eError::JavaScriptFailed(format!(
                    "click() on {} threw",
                    selector
                )));
            }
            element.clicks += 1;
            element
                .effects
                .iter()
                .filter(|(o, _)| *o == ClickOptions::default())
                .map(|(_, e)| e.clone())
                .collect::<Vec<_>>()
        };
        self.fire(&page.id, effects);
        Ok(())
    }

    async fn fill(&self, _page: &MockPage, selector: &Selector, value: &str) -> Result<()> {
        let mut state = self.lock();
        state.bump("fill");
        state.attached_mut(selector.as_str())?.value = value.to_string();
        Ok(())
    }

    async fn select_options(
        &self,
        _page: &MockPage,
        selector: &Selector,
        values: &[String],
    ) -> Result<()> {
        let mut state = self.lock();
        state.bump("select_options");
        state.attached_mut(selector.as_str())?.value = values.join(",");
        Ok(())
    }

    async fn set_input_files(
        &self,
        _page: &MockPage,
        selector: &Selector,
        files: &[PathBuf],
    ) -> Result<()> {
        let mut state = self.lock();
        state.bump("set_input_files");
        let element = state.attached_mut(selector.as_str())?;
        element.files = files.to_vec();
        element.value = files
            .first()
            .and_then(|f| f.file_name())
            .map(|name| format!("C:\\fakepath\\{}", name.to_string_lossy()))
            .unwrap_or_default();
        Ok(())
    }

    async fn set_checked(&self, _page: &MockPage, selector: &Selector, checked: bool) -> Result<()> {
        let mut state = self.lock();
        state.bump("set_checked");
        state.attached_mut(selector.as_str())?.checked = checked;
        Ok(())
    }

    async fn hover(&self, page: &MockPage, selector: &Selector) -> Result<()> {
        let effects = {
            let mut state = self.lock();
            state.bump("hover");
            state.attached(selector.as_str())?.hover_effects.clone()
        };
        self.fire(&page.id, effects);
        Ok(())
    }

    async fn text_content(&self, _page: &MockPage, selector: &Selector) -> Result<Option<String>> {
        Ok(Some(self.lock().attached(selector.as_str())?.text.clone()))
    }

    async fn all_text_contents(&self, _page: &MockPage, selector: &Selector) -> Result<Vec<String>> {
        let state = self.lock();
        Ok(match state.elements.get(selector.as_str()) {
            Some(e) if e.attached() => e.texts.clone().unwrap_or_else(|| vec![e.text.clone()]),
            _ => Vec::new(),
        })
    }

    async fn input_value(&self, _page: &MockPage, selector: &Selector) -> Result<String> {
        Ok(self.lock().attached(selector.as_str())?.value.clone())
    }

    async fn attribute(
        &self,
        _page: &MockPage,
        selector: &Selector,
        name: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .lock()
            .attached(selector.as_str())?
            .attributes
            .get(name)
            .cloned())
    }

    async fn outer_html(&self, _page: &MockPage, selector: &Selector) -> Result<String> {
        let state = self.lock();
        let element = state.attached(selector.as_str())?;
        Ok(element
            .html
            .clone()
            .unwrap_or_else(|| format!("<div>{}</div>", element.text)))
    }

    async fn bounding_box(&self, _page: &MockPage, selector: &Selector) -> Result<Option<BoundingBox>> {
        Ok(self
            .lock()
            .elements
            .get(selector.as_str())
            .filter(|e| e.visible())
            .map(|e| e.bbox))
    }

    async fn remove_elements(&self, _page: &MockPage, css: &[String]) -> Result<usize> {
        let mut state = self.lock();
        state.bump("remove_elements");
        let mut removed = 0;
        for selector in css {
            if let Some(e) = state.elements.get_mut(selector) {
                if e.attached() {
                    e.removed = true;
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    async fn evaluate(&self, _page: &MockPage, script: &str) -> Result<Value> {
        let mut state = self.lock();
        state.bump("evaluate");
        state.evaluated.push(script.to_string());
        let Some(queue) = state.scripts.get_mut(script) else {
            return Ok(Value::Bool(true));
        };
        Ok(if queue.len() > 1 {
            queue.pop_front().unwrap_or(Value::Null)
        } else {
            queue.front().cloned().unwrap_or(Value::Null)
        })
    }

    async fn mouse(&self, page: &MockPage, action: MouseAction) -> Result<()> {
        let effects = {
            let mut state = self.lock();
            state.bump("mouse");
            state.mouse.push(action);
            if action == MouseAction::Up {
                state.mouse_up_effects.clone()
            } else {
                Vec::new()
            }
        };
        self.fire(&page.id, effects);
        Ok(())
    }

    async fn press_key(&self, page: &MockPage, key: &str) -> Result<()> {
        let effects = {
            let mut state = self.lock();
            state.bump("press_key");
            state.keys.push(key.to_string());
            state
                .key_effects
                .iter()
                .filter(|(k, _)| k == key)
                .map(|(_, e)| e.clone())
                .collect::<Vec<_>>()
        };
        self.fire(&page.id, effects);
        Ok(())
    }

    async fn type_text(&self, _page: &MockPage, text: &str) -> Result<()> {
        let mut state = self.lock();
        state.bump("type_text");
        state.typed.push_str(text);
        Ok(())
    }

    async fn screenshot(&self, _page: &MockPage) -> Result<Vec<u8>> {
        self.lock().bump("screenshot");
        Ok(b"\x89PNG\r\n\x1a\nmock".to_vec())
    }

    fn dialog_events(&self, page: &MockPage) -> broadcast::Receiver<DialogInfo> {
        let mut state = self.lock();
        match state.page_mut(&page.id) {
            Ok(p) => p.dialogs.subscribe(),
            // closed page: the stream ends immediately
            Err(_) => broadcast::channel(1).1,
        }
    }

    async fn answer_dialog(&self, _page: &MockPage, response: DialogResponse) -> Result<()> {
        let mut state = self.lock();
        let open = state
            .open_dialog
            .take()
            .ok_or_else(|| E2eError::Dialog("no dialog is open".to_string()))?;
        state.dialog_responses.push(response.clone());

        if let Some(target) = open.report_to {
            let line = match (open.info.kind, &response) {
                (DialogKind::Prompt, DialogResponse::Accept { prompt_text: Some(text) }) => {
                    Some(format!("You entered {}", text))
                }
                (DialogKind::Prompt, _) => None,
                (_, DialogResponse::Accept { .. }) => Some("You selected Ok".to_string()),
                (_, DialogResponse::Dismiss) => Some("You selected Cancel".to_string()),
            };
            if let Some(line) = line {
                let element = state.elements.entry(target).or_insert_with(MockElement::new);
                element.reveal();
                element.text = line;
            }
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.lock().running
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = self.lock();
        state.running = false;
        state.pages.clear();
        Ok(())
    }
}

/// Hands every scenario attempt a fresh [`MockDriver`], prepared by the
/// given setup function.
pub struct MockSessionFactory {
    setup: Arc<dyn Fn(&MockDriver) + Send + Sync>,
    drivers: Mutex<Vec<MockDriver>>,
}

impl Default for MockSessionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSessionFactory {
    pub fn new() -> Self {
        Self::with_setup(|_| {})
    }

    pub fn with_setup<F>(setup: F) -> Self
    where
        F: Fn(&MockDriver) + Send + Sync + 'static,
    {
        Self {
            setup: Arc::new(setup),
            drivers: Mutex::new(Vec::new()),
        }
    }

    /// Drivers handed out so far, oldest first.
    pub fn drivers(&self) -> Vec<MockDriver> {
        self.drivers
            .lock()
            .map(|d| d.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn sessions_created(&self) -> usize {
        self.drivers().len()
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    type Driver = MockDriver;

    async fn create(&self, config: Arc<Config>) -> Result<Session<MockDriver>> {
        let mock = MockDriver::new();
        (self.setup)(&mock);
        self.drivers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(mock.clone());
        Session::start(mock, config).await
    }
}

//! The shared page utility every section object is built on.
//!
//! A [`Synchronizer`] is bound to one page (optionally scoped into frames) and
//! never touches an element without first waiting for it to reach the state
//! the action needs.

pub mod click;
pub mod intercept;
pub mod retry;
pub mod settle;
pub mod wait;

pub use click::ClickPath;
pub use intercept::{Armed, DialogHandle, EventHandle, EventKind, Triggered};
pub use retry::RetryPolicy;
pub use settle::{LoadState, SettleReport};
pub use wait::WaitState;

use crate::core::{BoundingBox, BrowserDriver, Config, MouseAction, Selector};
use crate::errors::{E2eError, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Intermediate pointer positions used when dragging, so that libraries which
/// only start a drag after a movement threshold see one.
const DRAG_STEPS: u32 = 5;

pub struct Synchronizer<D: BrowserDriver> {
    driver: Arc<D>,
    page: D::Page,
    config: Arc<Config>,
    frames: Vec<String>,
}

impl<D: BrowserDriver> Clone for Synchronizer<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            page: self.page.clone(),
            config: Arc::clone(&self.config),
            frames: self.frames.clone(),
        }
    }
}

impl<D: BrowserDriver> Synchronizer<D> {
    pub fn new(driver: Arc<D>, page: D::Page, config: Arc<Config>) -> Self {
        Self {
            driver,
            page,
            config,
            frames: Vec::new(),
        }
    }

    pub fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    pub fn page(&self) -> &D::Page {
        &self.page
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Same driver and settings, bound to another page.
    pub fn for_page(&self, page: D::Page) -> Self {
        Self::new(Arc::clone(&self.driver), page, Arc::clone(&self.config))
    }

    /// A read-only view into the iframe matched by `css`, nested inside any
    /// frame this synchronizer is already scoped to.
    pub fn frame(&self, css: &str) -> Self {
        let mut scoped = self.clone();
        scoped.frames.push(css.to_string());
        scoped
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.config.retry)
    }

    pub fn default_timeout(&self) -> Duration {
        self.config.timeouts.default_timeout()
    }

    /// Parses `raw` and prefixes the frame path this view is scoped to.
    pub fn selector(&self, raw: &str) -> Result<Selector> {
        if self.frames.is_empty() {
            return Selector::parse(raw);
        }
        let mut chain = self
            .frames
            .iter()
            .map(|css| format!("frame={}", css))
            .collect::<Vec<_>>();
        chain.push(raw.to_string());
        Selector::parse(&chain.join(" >> "))
    }

    pub async fn navigate(&self, path_or_url: &str) -> Result<()> {
        let url = self.config.resolve_url(path_or_url)?;
        debug!(url = %url, "navigating");
        self.driver.navigate(&self.page, &url).await?;
        self.wait_for_load_state(LoadState::Load, Some(self.config.timeouts.navigation()))
            .await
    }

    pub async fn current_url(&self) -> Result<String> {
        self.driver.current_url(&self.page).await
    }

    pub async fn title(&self) -> Result<String> {
        self.driver.title(&self.page).await
    }

    pub async fn fill(&self, raw: &str, value: &str) -> Result<()> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, WaitState::Visible, None)
            .await?;
        debug!(selector = %selector, "fill");
        self.driver.fill(&self.page, &selector, value).await
    }

    pub async fn select_option(&self, raw: &str, value: &str) -> Result<()> {
        self.select_options(raw, &[value]).await
    }

    pub async fn select_options(&self, raw: &str, values: &[&str]) -> Result<()> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, WaitState::Visible, None)
            .await?;
        let values = values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        self.driver
            .select_options(&self.page, &selector, &values)
            .await
    }

    pub async fn upload_file(&self, raw: &str, path: &Path) -> Result<()> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, WaitState::Visible, None)
            .await?;
        let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.driver
            .set_input_files(&self.page, &selector, &[absolute])
            .await
    }

    pub async fn check(&self, raw: &str) -> Result<()> {
        self.set_checked(raw, true).await
    }

    pub async fn uncheck(&self, raw: &str) -> Result<()> {
        self.set_checked(raw, false).await
    }

    async fn set_checked(&self, raw: &str, checked: bool) -> Result<()> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, WaitState::Attached, None)
            .await?;
        self.driver.set_checked(&self.page, &selector, checked).await
    }

    pub async fn hover(&self, raw: &str) -> Result<()> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, WaitState::Visible, None)
            .await?;
        self.driver.hover(&self.page, &selector).await
    }

    pub async fn press_key(&self, key: &str) -> Result<()> {
        self.driver.press_key(&self.page, key).await
    }

    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.driver.type_text(&self.page, text).await
    }

    pub async fn mouse(&self, action: MouseAction) -> Result<()> {
        self.driver.mouse(&self.page, action).await
    }

    pub async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    pub async fn text(&self, raw: &str) -> Result<String> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, WaitState::Visible, None)
            .await?;
        Ok(self
            .driver
            .text_content(&self.page, &selector)
            .await?
            .unwrap_or_default())
    }

    pub async fn error_message(&self, raw: &str) -> Result<String> {
        self.text(raw).await
    }

    pub async fn input_value(&self, raw: &str) -> Result<String> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, WaitState::Visible, None)
            .await?;
        self.driver.input_value(&self.page, &selector).await
    }

    pub async fn attribute(&self, raw: &str, name: &str) -> Result<Option<String>> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, WaitState::Attached, None)
            .await?;
        self.driver.attribute(&self.page, &selector, name).await
    }

    /// Text of every current match. Does not wait: an empty list is a valid answer.
    pub async fn all_text_contents(&self, raw: &str) -> Result<Vec<String>> {
        let selector = self.selector(raw)?;
        self.driver.all_text_contents(&self.page, &selector).await
    }

    pub async fn count(&self, raw: &str) -> Result<usize> {
        let selector = self.selector(raw)?;
        Ok(self.driver.probe(&self.page, &selector).await?.count)
    }

    /// Waits up to the probe bound and answers whether the element showed up.
    /// The only place a timeout is turned into a value instead of an error.
    pub async fn is_visible(&self, raw: &str) -> Result<bool> {
        match self
            .wait_for(raw, WaitState::Visible, Some(self.config.timeouts.probe()))
            .await
        {
            Ok(()) => Ok(true),
            Err(err) if err.is_timeout() => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub async fn is_enabled(&self, raw: &str) -> Result<bool> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, WaitState::Visible, None)
            .await?;
        Ok(self.driver.probe(&self.page, &selector).await?.enabled)
    }

    pub async fn bounding_box(&self, raw: &str) -> Result<BoundingBox> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, WaitState::Visible, None)
            .await?;
        self.driver
            .bounding_box(&self.page, &selector)
            .await?
            .ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))
    }

    pub async fn drag_and_drop(&self, source: &str, target: &str) -> Result<()> {
        let from = self.bounding_box(source).await?.center();
        let to = self.bounding_box(target).await?.center();
        debug!(source, target, "drag and drop");
        self.drag_between(from, to).await
    }

    /// Presses at the element's center and releases `dx`/`dy` pixels away.
    pub async fn drag_by_offset(&self, raw: &str, dx: f64, dy: f64) -> Result<()> {
        let (x, y) = self.bounding_box(raw).await?.center();
        self.drag_between((x, y), (x + dx, y + dy)).await
    }

    async fn drag_between(&self, from: (f64, f64), to: (f64, f64)) -> Result<()> {
        self.mouse(MouseAction::Move { x: from.0, y: from.1 })
            .await?;
        self.mouse(MouseAction::Down).await?;
        for step in 1..=DRAG_STEPS {
            let t = f64::from(step) / f64::from(DRAG_STEPS);
            self.mouse(MouseAction::Move {
                x: from.0 + (to.0 - from.0) * t,
                y: from.1 + (to.1 - from.1) * t,
            })
            .await?;
        }
        self.mouse(MouseAction::Up).await
    }

    pub async fn submit_form(&self, raw: &str) -> Result<()> {
        let selector = self.selector(raw)?;
        self.wait_for_selector(&selector, WaitState::Visible, None)
            .await?;
        let script = format!(
            r#"(function() {{
                const form = {}[0];
                if (!form) return false;
                if (form.requestSubmit) form.requestSubmit(); else form.submit();
                return true;
            }})()"#,
            selector.to_js()
        );
        let submitted = self.driver.evaluate(&self.page, &script).await?;
        if submitted.as_bool().unwrap_or(false) {
            Ok(())
        } else {
            Err(E2eError::ElementNotFound(selector.to_string()))
        }
    }

    pub async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        self.driver.evaluate(&self.page, script).await
    }

    pub async fn remove_elements(&self, css: &[String]) -> Result<usize> {
        self.driver.remove_elements(&self.page, css).await
    }

    pub async fn screenshot(&self, path: &Path) -> Result<()> {
        let bytes = self.driver.screenshot(&self.page).await?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    /// Rows of trimmed cell text; rows without any non-empty cell are dropped.
    pub async fn table_data(
        &self,
        table: &str,
        row_css: &str,
        cell_css: &str,
    ) -> Result<Vec<Vec<String>>> {
        let selector = self.selector(table)?;
        self.wait_for_selector(&selector, WaitState::Visible, None)
            .await?;
        let html = self.driver.outer_html(&self.page, &selector).await?;
        parse_table(&html, row_css, cell_css)
    }

    pub async fn close_page(&self) -> Result<()> {
        self.driver.close_page(&self.page).await
    }
}

fn css(raw: &str) -> Result<scraper::Selector> {
    scraper::Selector::parse(raw).map_err(|e| E2eError::InvalidSelector(format!("{}: {:?}", raw, e)))
}

pub(crate) fn parse_table(html: &str, row_css: &str, cell_css: &str) -> Result<Vec<Vec<String>>> {
    let fragment = scraper::Html::parse_fragment(html);
    let rows = css(row_css)?;
    let cells = css(cell_css)?;

    Ok(fragment
        .select(&rows)
        .map(|row| {
            row.select(&cells)
                .map(|cell| {
                    cell.text()
                        .collect::<String>()
                        .split_whitespace()
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDriver;

    #[test]
    fn parse_table_skips_padding_rows() {
        let html = r#"
            <div class="rt-tbody">
              <div class="rt-tr-group"><div class="rt-tr">
                <div class="rt-td">Cierra</div><div class="rt-td">Vega</div><div class="rt-td"> 39 </div>
              </div></div>
              <div class="rt-tr-group"><div class="rt-tr -padRow">
                <div class="rt-td">&nbsp;</div><div class="rt-td"> </div>
              </div></div>
            </div>"#;
        let rows = parse_table(html, ".rt-tr-group", ".rt-td").unwrap();
        assert_eq!(rows, vec![vec!["Cierra", "Vega", "39"]]);
    }

    #[test]
    fn parse_table_rejects_bad_css() {
        assert!(parse_table("<table></table>", "tr[", "td").is_err());
    }

    #[test]
    fn frame_scope_prefixes_selectors() {
        let mock = MockDriver::new();
        let sync = mock.synchronizer();
        let nested = sync.frame("#frame1").frame("iframe");
        assert_eq!(
            nested.selector("body").unwrap().to_string(),
            "frame=#frame1 >> frame=iframe >> body"
        );
        assert_eq!(sync.selector("body").unwrap().to_string(), "body");
    }

    #[tokio::test(start_paused = true)]
    async fn is_visible_turns_timeout_into_false() {
        let mock = MockDriver::new();
        mock.element("#present");
        let sync = mock.synchronizer();

        assert!(sync.is_visible("#present").await.unwrap());
        let started = tokio::time::Instant::now();
        assert!(!sync.is_visible("#absent").await.unwrap());
        assert!(started.elapsed() >= sync.config().timeouts.probe());
    }

    #[tokio::test(start_paused = true)]
    async fn fill_waits_for_late_element() {
        let mock = MockDriver::new();
        mock.element("#late").visible_after(Duration::from_millis(800));
        let sync = mock.synchronizer();

        sync.fill("#late", "hello").await.unwrap();
        assert_eq!(mock.value_of("#late"), "hello");
    }

    #[tokio::test(start_paused = true)]
    async fn drag_presses_moves_and_releases() {
        let mock = MockDriver::new();
        mock.element("#dragBox").bbox(0.0, 0.0, 20.0, 20.0);
        mock.element("#droppable").bbox(100.0, 0.0, 20.0, 20.0);
        let sync = mock.synchronizer();

        sync.drag_and_drop("#dragBox", "#droppable").await.unwrap();
        let moves = mock.mouse_actions();
        assert_eq!(moves.first(), Some(&MouseAction::Move { x: 10.0, y: 10.0 }));
        assert_eq!(moves[1], MouseAction::Down);
        assert_eq!(moves[moves.len() - 2], MouseAction::Move { x: 110.0, y: 10.0 });
        assert_eq!(moves.last(), Some(&MouseAction::Up));
    }

    #[tokio::test(start_paused = true)]
    async fn unchecking_clears_a_checked_box() {
        let mock = MockDriver::new();
        mock.element("#hobbies-checkbox-1");
        let sync = mock.synchronizer();

        sync.check("#hobbies-checkbox-1").await.unwrap();
        assert!(mock.is_checked("#hobbies-checkbox-1"));
        sync.uncheck("#hobbies-checkbox-1").await.unwrap();
        assert!(!mock.is_checked("#hobbies-checkbox-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn error_message_waits_for_the_message() {
        let mock = MockDriver::new();
        mock.element("#nameError")
            .text("Name is required")
            .visible_after(Duration::from_millis(300));
        let sync = mock.synchronizer();

        assert_eq!(sync.error_message("#nameError").await.unwrap(), "Name is required");
    }

    #[tokio::test(start_paused = true)]
    async fn is_enabled_reports_the_current_state() {
        let mock = MockDriver::new();
        mock.element("#submit").disabled();
        let sync = mock.synchronizer();

        assert!(!sync.is_enabled("#submit").await.unwrap());
        mock.element("#submit");
        assert!(sync.is_enabled("#submit").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn submit_form_runs_request_submit_on_the_form() {
        let mock = MockDriver::new();
        mock.element("#userForm");
        let sync = mock.synchronizer();

        sync.submit_form("#userForm").await.unwrap();

        let scripts = mock.evaluated_scripts();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains("requestSubmit"));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_form_without_a_form_is_not_found() {
        let mock = MockDriver::new();
        mock.element("#userForm");
        let sync = mock.synchronizer();
        sync.submit_form("#userForm").await.unwrap();
        let script = mock.evaluated_scripts().remove(0);
        mock.script_results(&script, vec![serde_json::Value::Bool(false)]);

        let err = sync.submit_form("#userForm").await.unwrap_err();
        assert!(matches!(err, E2eError::ElementNotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn typed_text_goes_to_the_focused_element() {
        let mock = MockDriver::new();
        let sync = mock.synchronizer();

        sync.type_text("Maha").await.unwrap();
        sync.type_text("rashtra").await.unwrap();

        assert_eq!(mock.typed_text(), "Maharashtra");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_navigation_is_reported_with_the_url() {
        let mock = MockDriver::new();
        mock.fail_navigation();
        let sync = mock.synchronizer();

        let err = sync.navigate("/elements").await.unwrap_err();
        assert!(matches!(&err, E2eError::NavigationFailed(url) if url.ends_with("/elements")));
    }
}

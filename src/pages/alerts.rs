use super::menu_item;
use crate::core::{BrowserDriver, DialogInfo};
use crate::errors::Result;
use crate::sync::{EventKind, Synchronizer, WaitState};
use std::time::Duration;
use tracing::info;

pub struct AlertsSelectors {
    pub group: &'static str,

    pub new_tab: &'static str,
    pub new_window: &'static str,
    pub new_window_message: &'static str,
    pub sample_heading: &'static str,

    pub alert: &'static str,
    pub timer_alert: &'static str,
    pub confirm: &'static str,
    pub prompt: &'static str,
    pub confirm_result: &'static str,
    pub prompt_result: &'static str,

    pub frame_body: &'static str,
    pub nested_child_frame: &'static str,

    pub show_small_modal: &'static str,
    pub show_large_modal: &'static str,
    pub close_small_modal: &'static str,
    pub close_large_modal: &'static str,
    pub modal_body: &'static str,
    pub modal_header: &'static str,
    pub modal_backdrop: &'static str,
}

pub static ALERTS: AlertsSelectors = AlertsSelectors {
    group: "Alerts",

    new_tab: "#tabButton",
    new_window: "#windowButton",
    new_window_message: "#messageWindowButton",
    sample_heading: "#sampleHeading",

    alert: "#alertButton",
    timer_alert: "#timerAlertButton",
    confirm: "#confirmButton",
    prompt: "#promtButton",
    confirm_result: "#confirmResult",
    prompt_result: "#promptResult",

    frame_body: "body",
    nested_child_frame: "iframe",

    show_small_modal: "#showSmallModal",
    show_large_modal: "#showLargeModal",
    close_small_modal: "#closeSmallModal",
    close_large_modal: "#closeLargeModal",
    modal_body: ".modal-body",
    modal_header: ".modal-header",
    modal_backdrop: ".modal-backdrop",
};

/// The timer alert opens five seconds after its click.
const TIMER_ALERT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct AlertsFramesWindowsPage<D: BrowserDriver> {
    sync: Synchronizer<D>,
    sel: &'static AlertsSelectors,
}

impl<D: BrowserDriver> AlertsFramesWindowsPage<D> {
    pub fn new(sync: Synchronizer<D>) -> Self {
        Self { sync, sel: &ALERTS }
    }

    pub fn selectors(&self) -> &'static AlertsSelectors {
        self.sel
    }

    pub fn sync(&self) -> &Synchronizer<D> {
        &self.sync
    }

    pub async fn open(&self) -> Result<()> {
        self.sync.navigate("/alertsWindows").await
    }

    async fn open_menu(&self, item: &str) -> Result<()> {
        self.sync.click(&menu_item(self.sel.group, item)).await?;
        Ok(())
    }

    pub async fn navigate_to_browser_windows(&self) -> Result<()> {
        self.open_menu("Browser Windows").await
    }

    pub async fn navigate_to_alerts(&self) -> Result<()> {
        self.open_menu(r#""Alerts""#).await
    }

    pub async fn navigate_to_frames(&self) -> Result<()> {
        self.open_menu(r#""Frames""#).await
    }

    pub async fn navigate_to_nested_frames(&self) -> Result<()> {
        self.open_menu("Nested Frames").await
    }

    pub async fn navigate_to_modal_dialogs(&self) -> Result<()> {
        self.open_menu("Modal Dialogs").await
    }

    /// Clicks the new-tab button and returns the loaded tab.
    pub async fn open_new_tab(&self) -> Result<D::Page> {
        self.sync.click_and_wait_for_new_page(self.sel.new_tab).await
    }

    pub async fn open_new_window(&self) -> Result<D::Page> {
        self.sync
            .click_and_wait_for_new_page(self.sel.new_window)
            .await
    }

    pub async fn open_new_window_message(&self) -> Result<D::Page> {
        self.sync
            .click_and_wait_for_new_page(self.sel.new_window_message)
            .await
    }

    /// A synchronizer bound to a page this section opened.
    pub fn on_page(&self, page: D::Page) -> Synchronizer<D> {
        self.sync.for_page(page)
    }

    pub async fn handle_simple_alert(&self) -> Result<DialogInfo> {
        let dialog = self.sync.click_and_intercept_dialog(self.sel.alert).await?;
        dialog.accept(None).await
    }

    pub async fn handle_timer_alert(&self) -> Result<DialogInfo> {
        let dialog = self
            .sync
            .arm(EventKind::Dialog)
            .await?
            .trigger(|| self.sync.click(self.sel.timer_alert))
            .await?
            .wait(Some(TIMER_ALERT_TIMEOUT))
            .await?
            .into_dialog()?;
        info!(message = %dialog.message(), "timer alert opened");
        dialog.accept(None).await
    }

    pub async fn handle_confirm_alert(&self, accept: bool) -> Result<DialogInfo> {
        let dialog = self
            .sync
            .click_and_intercept_dialog(self.sel.confirm)
            .await?;
        if accept {
            dialog.accept(None).await
        } else {
            dialog.dismiss().await
        }
    }

    pub async fn handle_prompt_alert(&self, text: &str) -> Result<DialogInfo> {
        let dialog = self.sync.click_and_intercept_dialog(self.sel.prompt).await?;
        dialog.accept(Some(text)).await
    }

    pub async fn confirm_result(&self) -> Result<String> {
        self.sync.text(self.sel.confirm_result).await
    }

    pub async fn prompt_result(&self) -> Result<String> {
        self.sync.text(self.sel.prompt_result).await
    }

    /// View into `#frame{n}` on the Frames page.
    pub fn frame(&self, n: u32) -> Synchronizer<D> {
        self.sync.frame(&format!("#frame{}", n))
    }

    pub async fn frame_heading(&self, n: u32) -> Result<String> {
        self.frame(n).text(self.sel.sample_heading).await
    }

    /// Parent and child views of the Nested Frames page.
    pub fn nested_frames(&self) -> (Synchronizer<D>, Synchronizer<D>) {
        let parent = self.frame(1);
        let child = parent.frame(self.sel.nested_child_frame);
        (parent, child)
    }

    pub async fn open_small_modal(&self) -> Result<()> {
        self.sync.click(self.sel.show_small_modal).await?;
        Ok(())
    }

    pub async fn open_large_modal(&self) -> Result<()> {
        self.sync.click(self.sel.show_large_modal).await?;
        Ok(())
    }

    pub async fn close_small_modal(&self) -> Result<()> {
        self.sync.click(self.sel.close_small_modal).await?;
        self.sync
            .wait_for(self.sel.modal_body, WaitState::Hidden, None)
            .await
    }

    pub async fn close_large_modal(&self) -> Result<()> {
        self.sync.click(self.sel.close_large_modal).await?;
        self.sync
            .wait_for(self.sel.modal_body, WaitState::Hidden, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DialogKind, DialogResponse};
    use crate::testing::{Effect, MockDriver};

    #[tokio::test(start_paused = true)]
    async fn confirm_dismiss_reports_cancel() {
        let mock = MockDriver::new();
        mock.element(ALERTS.confirm).on_click(
            Effect::dialog(DialogKind::Confirm, "Do you confirm action?")
                .reports_to(ALERTS.confirm_result),
        );
        let page = AlertsFramesWindowsPage::new(mock.synchronizer());

        let info = page.handle_confirm_alert(false).await.unwrap();
        assert_eq!(info.kind, DialogKind::Confirm);
        assert_eq!(page.confirm_result().await.unwrap(), "You selected Cancel");
        assert_eq!(mock.dialog_responses(), vec![DialogResponse::Dismiss]);
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_echoes_entered_text() {
        let mock = MockDriver::new();
        mock.element(ALERTS.prompt).on_click(
            Effect::dialog(DialogKind::Prompt, "Please enter your name")
                .reports_to(ALERTS.prompt_result),
        );
        let page = AlertsFramesWindowsPage::new(mock.synchronizer());

        page.handle_prompt_alert("Test Automation").await.unwrap();
        assert_eq!(
            page.prompt_result().await.unwrap(),
            "You entered Test Automation"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timer_alert_is_awaited_past_the_delay() {
        let mock = MockDriver::new();
        mock.element(ALERTS.timer_alert).on_click(
            Effect::dialog(DialogKind::Alert, "This alert appeared after 5 seconds")
                .after(Duration::from_secs(5)),
        );
        let page = AlertsFramesWindowsPage::new(mock.synchronizer());

        let info = page.handle_timer_alert().await.unwrap();
        assert!(info.message.contains("5 seconds"));
    }

    #[tokio::test(start_paused = true)]
    async fn new_tab_is_returned_loaded() {
        let mock = MockDriver::new();
        mock.element(ALERTS.new_tab)
            .on_click(Effect::new_page("https://demoqa.com/sample"));
        let page = AlertsFramesWindowsPage::new(mock.synchronizer());

        let tab = page.open_new_tab().await.unwrap();
        let tab_sync = page.on_page(tab);
        assert_eq!(
            tab_sync.current_url().await.unwrap(),
            "https://demoqa.com/sample"
        );
        tab_sync.close_page().await.unwrap();
        assert_eq!(mock.open_page_ids().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn frame_heading_reads_inside_the_frame() {
        let mock = MockDriver::new();
        mock.element("frame=#frame1 >> #sampleHeading")
            .text("This is a sample page");
        let page = AlertsFramesWindowsPage::new(mock.synchronizer());

        assert_eq!(
            page.frame_heading(1).await.unwrap(),
            "This is a sample page"
        );
        let (_, child) = page.nested_frames();
        assert_eq!(
            child.selector("body").unwrap().to_string(),
            "frame=#frame1 >> frame=iframe >> body"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn closing_modal_waits_until_hidden() {
        let mock = MockDriver::new();
        mock.element(ALERTS.close_large_modal)
            .on_click(Effect::hide(ALERTS.modal_body).after(Duration::from_millis(300)));
        mock.element(ALERTS.modal_body);
        let page = AlertsFramesWindowsPage::new(mock.synchronizer());

        page.close_large_modal().await.unwrap();
        assert!(!mock.is_shown(ALERTS.modal_body));
    }
}

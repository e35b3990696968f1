use super::{menu_item, nth};
use crate::core::BrowserDriver;
use crate::errors::{E2eError, Result};
use crate::sync::{Synchronizer, WaitState};
use std::time::Duration;
use tracing::debug;

pub struct WidgetsSelectors {
    pub group: &'static str,

    pub multiple_color_input: &'static str,
    pub single_color_input: &'static str,
    pub multi_values: &'static str,
    pub multi_value_remove: &'static str,
    pub single_value: &'static str,

    pub date_input: &'static str,
    pub date_time_input: &'static str,

    pub slider: &'static str,
    pub slider_value: &'static str,

    pub start_stop: &'static str,
    pub progress_bar: &'static str,
    pub reset: &'static str,

    pub what_tab: &'static str,
    pub origin_tab: &'static str,
    pub use_tab: &'static str,
    pub more_tab: &'static str,

    pub tooltip_button: &'static str,
    pub tooltip_text_field: &'static str,
    pub tooltip: &'static str,

    pub nav_menu: &'static str,

    pub old_select: &'static str,
    pub multi_select: &'static str,
    pub multi_select_checked: &'static str,
}

pub static WIDGETS: WidgetsSelectors = WidgetsSelectors {
    group: "Widgets",

    multiple_color_input: "#autoCompleteMultipleInput",
    single_color_input: "#autoCompleteSingleInput",
    multi_values: ".auto-complete__multi-value",
    multi_value_remove: ".auto-complete__multi-value__remove",
    single_value: ".auto-complete__single-value",

    date_input: "#datePickerMonthYearInput",
    date_time_input: "#dateAndTimePickerInput",

    slider: ".range-slider",
    slider_value: "#sliderValue",

    start_stop: "#startStopButton",
    progress_bar: ".progress-bar",
    reset: "#resetButton",

    what_tab: "#demo-tab-what",
    origin_tab: "#demo-tab-origin",
    use_tab: "#demo-tab-use",
    more_tab: "#demo-tab-more",

    tooltip_button: "#toolTipButton",
    tooltip_text_field: "#toolTipTextField",
    tooltip: ".tooltip-inner",

    nav_menu: "#nav",

    old_select: "#oldSelectMenu",
    multi_select: "#cars",
    multi_select_checked: "#cars option:checked",
};

/// Time the react-select suggestion list needs after typing.
const AUTOCOMPLETE_DELAY: Duration = Duration::from_millis(500);

pub struct WidgetsPage<D: BrowserDriver> {
    sync: Synchronizer<D>,
    sel: &'static WidgetsSelectors,
}

impl<D: BrowserDriver> WidgetsPage<D> {
    pub fn new(sync: Synchronizer<D>) -> Self {
        Self { sync, sel: &WIDGETS }
    }

    pub fn selectors(&self) -> &'static WidgetsSelectors {
        self.sel
    }

    pub fn sync(&self) -> &Synchronizer<D> {
        &self.sync
    }

    pub async fn open(&self) -> Result<()> {
        self.sync.navigate("/widgets").await
    }

    async fn open_menu(&self, item: &str) -> Result<()> {
        self.sync.click(&menu_item(self.sel.group, item)).await?;
        Ok(())
    }

    pub async fn navigate_to_accordian(&self) -> Result<()> {
        self.open_menu("Accordian").await
    }

    pub async fn navigate_to_auto_complete(&self) -> Result<()> {
        self.open_menu("Auto Complete").await
    }

    pub async fn navigate_to_date_picker(&self) -> Result<()> {
        self.open_menu("Date Picker").await
    }

    pub async fn navigate_to_slider(&self) -> Result<()> {
        self.open_menu("Slider").await
    }

    pub async fn navigate_to_progress_bar(&self) -> Result<()> {
        self.open_menu("Progress Bar").await
    }

    pub async fn navigate_to_tabs(&self) -> Result<()> {
        self.open_menu(r#""Tabs""#).await
    }

    pub async fn navigate_to_tool_tips(&self) -> Result<()> {
        self.open_menu("Tool Tips").await
    }

    pub async fn navigate_to_menu(&self) -> Result<()> {
        self.open_menu(r#""Menu""#).await
    }

    pub async fn navigate_to_select_menu(&self) -> Result<()> {
        self.open_menu("Select Menu").await
    }

    // Accordian

    pub fn section_heading(&self, n: u32) -> String {
        format!("#section{}Heading", n)
    }

    pub fn section_content(&self, n: u32) -> String {
        format!("#section{}Content", n)
    }

    pub async fn toggle_section(&self, n: u32) -> Result<()> {
        self.sync.click(&self.section_heading(n)).await?;
        Ok(())
    }

    pub async fn section_text(&self, n: u32) -> Result<String> {
        self.sync.text(&self.section_content(n)).await
    }

    /// Waits for the section body to collapse.
    pub async fn wait_for_section_collapsed(&self, n: u32) -> Result<()> {
        self.sync
            .wait_for(&self.section_content(n), WaitState::Hidden, None)
            .await
    }

    // Auto complete

    async fn pick_suggestion(&self, input: &str, value: &str) -> Result<()> {
        self.sync.fill(input, value).await?;
        self.sync.pause(AUTOCOMPLETE_DELAY).await;
        self.sync.press_key("Enter").await
    }

    pub async fn type_multiple_colors(&self, colors: &[String]) -> Result<()> {
        for color in colors {
            self.pick_suggestion(self.sel.multiple_color_input, color)
                .await?;
        }
        Ok(())
    }

    pub async fn type_single_color(&self, color: &str) -> Result<()> {
        self.pick_suggestion(self.sel.single_color_input, color)
            .await
    }

    pub async fn selected_colors(&self) -> Result<Vec<String>> {
        self.sync.all_text_contents(self.sel.multi_values).await
    }

    pub async fn single_color(&self) -> Result<String> {
        self.sync.text(self.sel.single_value).await
    }

    pub async fn remove_first_color(&self) -> Result<()> {
        self.sync.click(&nth(self.sel.multi_value_remove, 0)).await?;
        Ok(())
    }

    // Date pickers

    async fn type_date(&self, input: &str, value: &str) -> Result<()> {
        self.sync.click(input).await?;
        self.sync.fill(input, value).await?;
        self.sync.press_key("Enter").await
    }

    /// `date` in the picker's `MM/DD/YYYY` format.
    pub async fn set_date(&self, date: &str) -> Result<()> {
        self.type_date(self.sel.date_input, date).await
    }

    pub async fn set_date_and_time(&self, date_time: &str) -> Result<()> {
        self.type_date(self.sel.date_time_input, date_time).await
    }

    pub async fn date_value(&self) -> Result<String> {
        self.sync.input_value(self.sel.date_input).await
    }

    pub async fn date_time_value(&self) -> Result<String> {
        self.sync.input_value(self.sel.date_time_input).await
    }

    // Slider

    pub async fn slider_value(&self) -> Result<i64> {
        let raw = self.sync.input_value(self.sel.slider).await?;
        raw.trim()
            .parse()
            .map_err(|_| E2eError::JavaScriptFailed(format!("slider value {:?} is not a number", raw)))
    }

    /// Focuses the slider and steps it to `value` with the arrow keys.
    pub async fn move_slider(&self, value: i64) -> Result<()> {
        self.sync.click(self.sel.slider).await?;
        let current = self.slider_value().await?;
        let steps = value - current;
        let key = if steps > 0 { "ArrowRight" } else { "ArrowLeft" };
        debug!(from = current, to = value, "moving slider");
        for _ in 0..steps.unsigned_abs() {
            self.sync.press_key(key).await?;
        }
        Ok(())
    }

    // Progress bar

    pub async fn start_progress(&self) -> Result<()> {
        self.sync.click(self.sel.start_stop).await?;
        Ok(())
    }

    pub async fn stop_progress(&self) -> Result<()> {
        self.sync.click(self.sel.start_stop).await?;
        Ok(())
    }

    pub async fn reset_progress(&self) -> Result<()> {
        self.sync.click(self.sel.reset).await?;
        Ok(())
    }

    /// Waits until the bar's width reaches `percent`. A full run takes about
    /// ten seconds, so the action bound applies.
    pub async fn wait_for_progress(&self, percent: u32) -> Result<()> {
        let script = format!(
            r#"(() => {{
                const bar = document.querySelector('{}');
                return !!bar && parseInt(bar.style.width, 10) >= {};
            }})()"#,
            self.sel.progress_bar, percent
        );
        self.sync
            .wait_for_function(&script, Some(self.sync.config().timeouts.action()))
            .await
    }

    pub async fn progress_value(&self) -> Result<u32> {
        let raw = self
            .sync
            .attribute(self.sel.progress_bar, "aria-valuenow")
            .await?
            .unwrap_or_default();
        raw.trim()
            .parse()
            .map_err(|_| E2eError::JavaScriptFailed(format!("progress value {:?} is not a number", raw)))
    }

    // Tabs

    pub fn tab(&self, name: &str) -> Result<&'static str> {
        match name.to_ascii_lowercase().as_str() {
            "what" => Ok(self.sel.what_tab),
            "origin" => Ok(self.sel.origin_tab),
            "use" => Ok(self.sel.use_tab),
            "more" => Ok(self.sel.more_tab),
            other => Err(E2eError::UnknownTarget(format!("tab {}", other))),
        }
    }

    pub fn tab_pane(&self, name: &str) -> String {
        format!("#demo-tabpane-{}", name.to_ascii_lowercase())
    }

    /// Clicks the tab and waits for its pane.
    pub async fn switch_to_tab(&self, name: &str) -> Result<()> {
        self.sync.click(self.tab(name)?).await?;
        self.sync
            .wait_for(&self.tab_pane(name), WaitState::Visible, None)
            .await
    }

    // Tooltips

    pub async fn tooltip_text(&self) -> Result<String> {
        self.sync.hover(self.sel.tooltip_button).await?;
        self.sync.text(self.sel.tooltip).await
    }

    pub async fn text_field_tooltip(&self) -> Result<String> {
        self.sync.hover(self.sel.tooltip_text_field).await?;
        self.sync.text(self.sel.tooltip).await
    }

    // Menu

    /// Nav menu entry whose text is exactly `item`.
    pub fn menu_entry(&self, item: &str) -> String {
        format!(r#"{} >> text="{}""#, self.sel.nav_menu, item)
    }

    pub async fn hover_menu_item(&self, item: &str) -> Result<()> {
        self.sync.hover(&self.menu_entry(item)).await
    }

    // Select menus

    pub async fn select_old_style(&self, value: &str) -> Result<()> {
        self.sync.select_option(self.sel.old_select, value).await
    }

    pub async fn select_multiple(&self, values: &[&str]) -> Result<()> {
        self.sync.select_options(self.sel.multi_select, values).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::testing::{Effect, MockDriver};
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn slider_steps_with_arrow_keys() {
        let mock = MockDriver::new();
        mock.element(WIDGETS.slider).value("25");
        let page = WidgetsPage::new(mock.synchronizer());

        page.move_slider(30).await.unwrap();
        assert_eq!(mock.keys_pressed(), vec!["ArrowRight"; 5]);

        mock.element(WIDGETS.slider).value("30");
        page.move_slider(28).await.unwrap();
        assert_eq!(mock.keys_pressed()[5..], ["ArrowLeft", "ArrowLeft"]);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_wait_polls_until_threshold() {
        let mock = MockDriver::new();
        let page = WidgetsPage::new(mock.synchronizer());
        let script = format!(
            r#"(() => {{
                const bar = document.querySelector('{}');
                return !!bar && parseInt(bar.style.width, 10) >= {};
            }})()"#,
            WIDGETS.progress_bar, 50
        );
        mock.script_results(&script, vec![json!(false), json!(false), json!(true)]);

        page.wait_for_progress(50).await.unwrap();
        assert_eq!(mock.calls("evaluate"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_value_reads_aria_valuenow() {
        let mock = MockDriver::new();
        mock.element(WIDGETS.progress_bar).attr("aria-valuenow", "57");
        let page = WidgetsPage::new(mock.synchronizer());

        assert_eq!(page.progress_value().await.unwrap(), 57);
    }

    #[tokio::test(start_paused = true)]
    async fn tabs_are_resolved_by_name() {
        let mock = MockDriver::new();
        mock.element(WIDGETS.origin_tab)
            .on_click(Effect::show("#demo-tabpane-origin"));
        let page = WidgetsPage::new(mock.synchronizer());

        page.switch_to_tab("Origin").await.unwrap();
        assert!(mock.is_shown("#demo-tabpane-origin"));
        assert!(page.tab("history").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn tooltip_appears_after_hover() {
        let mock = MockDriver::new();
        mock.element(WIDGETS.tooltip_button).on_hover(
            Effect::set_text(WIDGETS.tooltip, "You hovered over the Button")
                .after(Duration::from_millis(200)),
        );
        let page = WidgetsPage::new(mock.synchronizer());

        assert_eq!(
            page.tooltip_text().await.unwrap(),
            "You hovered over the Button"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn multiple_colors_each_end_with_enter() {
        let mock = MockDriver::new();
        mock.element(WIDGETS.multiple_color_input);
        let page = WidgetsPage::new(mock.synchronizer());
        let colors = fixtures::colors()[..3].to_vec();

        page.type_multiple_colors(&colors).await.unwrap();
        assert_eq!(mock.keys_pressed(), vec!["Enter"; 3]);
        assert_eq!(mock.value_of(WIDGETS.multiple_color_input), colors[2]);
    }

    #[tokio::test(start_paused = true)]
    async fn collapsed_section_is_awaited() {
        let mock = MockDriver::new();
        mock.element("#section1Heading")
            .on_click(Effect::hide("#section1Content").after(Duration::from_millis(400)));
        mock.element("#section1Content").text("Lorem Ipsum is simply dummy text");
        let page = WidgetsPage::new(mock.synchronizer());

        assert!(page.section_text(1).await.unwrap().contains("Lorem Ipsum"));
        page.toggle_section(1).await.unwrap();
        page.wait_for_section_collapsed(1).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn multi_select_passes_every_value() {
        let mock = MockDriver::new();
        mock.element(WIDGETS.multi_select);
        let page = WidgetsPage::new(mock.synchronizer());

        page.select_multiple(&["volvo", "saab"]).await.unwrap();
        assert_eq!(mock.value_of(WIDGETS.multi_select), "volvo,saab");
    }
}

use super::{menu_item, nth};
use crate::core::BrowserDriver;
use crate::errors::Result;
use crate::fixtures::{DynamicProperties, TableRecord, TextBoxRecord};
use crate::sync::{Synchronizer, WaitState};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub struct ElementsSelectors {
    pub group: &'static str,

    pub full_name: &'static str,
    pub email: &'static str,
    pub current_address: &'static str,
    pub permanent_address: &'static str,
    pub submit: &'static str,
    pub output: &'static str,
    pub output_name: &'static str,
    pub output_email: &'static str,
    pub output_current_address: &'static str,
    pub output_permanent_address: &'static str,

    pub expand_all: &'static str,
    pub check_box_result: &'static str,

    pub radio_result: &'static str,
    pub no_radio: &'static str,

    pub add_new_record: &'static str,
    pub search_box: &'static str,
    pub edit_record: &'static str,
    pub delete_record: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub user_email: &'static str,
    pub age: &'static str,
    pub salary: &'static str,
    pub department: &'static str,
    pub table_body: &'static str,
    pub table_rows: &'static str,
    pub table_cells: &'static str,

    pub double_click: &'static str,
    pub right_click: &'static str,
    pub dynamic_click: &'static str,
    pub double_click_message: &'static str,
    pub right_click_message: &'static str,
    pub dynamic_click_message: &'static str,

    pub simple_link: &'static str,
    pub link_response: &'static str,

    pub upload_file: &'static str,
    pub uploaded_file_path: &'static str,

    pub enable_after: &'static str,
    pub color_change: &'static str,
    pub visible_after: &'static str,
}

pub static ELEMENTS: ElementsSelectors = ElementsSelectors {
    group: "Elements",

    full_name: "#userName",
    email: "#userEmail",
    current_address: "#currentAddress",
    permanent_address: "#permanentAddress",
    submit: "#submit",
    output: "#output",
    output_name: "#output #name",
    output_email: "#output #email",
    output_current_address: "#output #currentAddress",
    output_permanent_address: "#output #permanentAddress",

    expand_all: r#"button[title="Expand all"]"#,
    check_box_result: "#result",

    radio_result: ".text-success",
    no_radio: "#noRadio",

    add_new_record: "#addNewRecordButton",
    search_box: "#searchBox",
    edit_record: r#"[title="Edit"]"#,
    delete_record: r#"[title="Delete"]"#,
    first_name: "#firstName",
    last_name: "#lastName",
    user_email: "#userEmail",
    age: "#age",
    salary: "#salary",
    department: "#department",
    table_body: ".rt-tbody",
    table_rows: ".rt-tr-group",
    table_cells: ".rt-td",

    double_click: "#doubleClickBtn",
    right_click: "#rightClickBtn",
    dynamic_click: "//button[text()='Click Me']",
    double_click_message: "#doubleClickMessage",
    right_click_message: "#rightClickMessage",
    dynamic_click_message: "#dynamicClickMessage",

    simple_link: "#simpleLink",
    link_response: "#linkResponse",

    upload_file: "#uploadFile",
    uploaded_file_path: "#uploadedFilePath",

    enable_after: "#enableAfter",
    color_change: "#colorChange",
    visible_after: "#visibleAfter",
};

/// API links on the Links page and the status code each one reports.
pub const API_LINKS: [(&str, &str); 7] = [
    ("#created", "201"),
    ("#no-content", "204"),
    ("#moved", "301"),
    ("#bad-request", "400"),
    ("#unauthorized", "401"),
    ("#forbidden", "403"),
    ("#invalid-url", "404"),
];

/// Bound for a change scheduled `secs` after page load.
fn dynamic_timeout(secs: u64) -> Duration {
    Duration::from_secs(secs * 2)
}

pub struct ElementsPage<D: BrowserDriver> {
    sync: Synchronizer<D>,
    sel: &'static ElementsSelectors,
}

impl<D: BrowserDriver> ElementsPage<D> {
    pub fn new(sync: Synchronizer<D>) -> Self {
        Self {
            sync,
            sel: &ELEMENTS,
        }
    }

    pub fn selectors(&self) -> &'static ElementsSelectors {
        self.sel
    }

    pub fn sync(&self) -> &Synchronizer<D> {
        &self.sync
    }

    pub async fn open(&self) -> Result<()> {
        self.sync.navigate("/elements").await
    }

    async fn open_menu(&self, item: &str) -> Result<()> {
        self.sync.click(&menu_item(self.sel.group, item)).await?;
        Ok(())
    }

    pub async fn navigate_to_text_box(&self) -> Result<()> {
        self.open_menu("Text Box").await
    }

    pub async fn navigate_to_check_box(&self) -> Result<()> {
        self.open_menu("Check Box").await
    }

    pub async fn navigate_to_radio_button(&self) -> Result<()> {
        self.open_menu("Radio Button").await
    }

    pub async fn navigate_to_web_tables(&self) -> Result<()> {
        self.open_menu("Web Tables").await
    }

    pub async fn navigate_to_buttons(&self) -> Result<()> {
        self.open_menu("Buttons").await
    }

    pub async fn navigate_to_links(&self) -> Result<()> {
        self.open_menu("Links").await
    }

    pub async fn navigate_to_upload_download(&self) -> Result<()> {
        self.open_menu("Upload and Download").await
    }

    pub async fn navigate_to_dynamic_properties(&self) -> Result<()> {
        self.open_menu("Dynamic Properties").await
    }

    pub async fn fill_text_box_form(&self, data: &TextBoxRecord) -> Result<()> {
        self.sync.fill(self.sel.full_name, &data.full_name).await?;
        self.sync.fill(self.sel.email, &data.email).await?;
        self.sync
            .fill(self.sel.current_address, &data.current_address)
            .await?;
        self.sync
            .fill(self.sel.permanent_address, &data.permanent_address)
            .await?;
        self.sync.click(self.sel.submit).await?;
        Ok(())
    }

    pub async fn expand_check_box_tree(&self) -> Result<()> {
        self.sync.click(self.sel.expand_all).await?;
        Ok(())
    }

    pub async fn check_box_result(&self) -> Result<String> {
        self.sync.text(self.sel.check_box_result).await
    }

    pub async fn add_new_table_record(&self, record: &TableRecord) -> Result<()> {
        debug!(first_name = %record.first_name, "adding table record");
        self.sync.click(self.sel.add_new_record).await?;
        self.sync.fill(self.sel.first_name, &record.first_name).await?;
        self.sync.fill(self.sel.last_name, &record.last_name).await?;
        self.sync.fill(self.sel.user_email, &record.email).await?;
        self.sync.fill(self.sel.age, &record.age.to_string()).await?;
        self.sync
            .fill(self.sel.salary, &record.salary.to_string())
            .await?;
        self.sync.fill(self.sel.department, &record.department).await?;
        self.sync.click(self.sel.submit).await?;
        Ok(())
    }

    pub async fn search_table(&self, text: &str) -> Result<()> {
        self.sync.fill(self.sel.search_box, text).await
    }

    pub async fn edit_table_record(&self, row: usize) -> Result<()> {
        self.sync.click(&nth(self.sel.edit_record, row)).await?;
        Ok(())
    }

    pub async fn delete_table_record(&self, row: usize) -> Result<()> {
        self.sync.click(&nth(self.sel.delete_record, row)).await?;
        Ok(())
    }

    /// Non-empty rows of the web table, cells in column order.
    pub async fn table_records(&self) -> Result<Vec<Vec<String>>> {
        self.sync
            .table_data(self.sel.table_body, self.sel.table_rows, self.sel.table_cells)
            .await
    }

    pub async fn record_exists(&self, record: &TableRecord) -> Result<bool> {
        Ok(self
            .table_records()
            .await?
            .iter()
            .any(|row| record.matches_row(row)))
    }

    pub async fn upload_file(&self, path: &Path) -> Result<()> {
        self.sync.upload_file(self.sel.upload_file, path).await
    }

    pub async fn uploaded_file_path(&self) -> Result<String> {
        self.sync.text(self.sel.uploaded_file_path).await
    }

    pub async fn wait_for_button_enabled(&self, props: &DynamicProperties) -> Result<()> {
        self.sync
            .wait_for(
                self.sel.enable_after,
                WaitState::Enabled,
                Some(dynamic_timeout(props.enable_after_secs)),
            )
            .await
    }

    /// The color button turns red on the same timer as the enable button.
    pub async fn wait_for_color_change(&self, props: &DynamicProperties) -> Result<()> {
        let changed = format!("{}.{}", self.sel.color_change, props.color_change_class);
        self.sync
            .wait_for(
                &changed,
                WaitState::Visible,
                Some(dynamic_timeout(props.enable_after_secs)),
            )
            .await
    }

    pub async fn wait_for_button_visible(&self, props: &DynamicProperties) -> Result<()> {
        self.sync
            .wait_for(
                self.sel.visible_after,
                WaitState::Visible,
                Some(dynamic_timeout(props.visible_after_secs)),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::testing::{Effect, MockDriver};

    fn web_table(mock: &MockDriver) {
        for sel in [
            ELEMENTS.add_new_record,
            ELEMENTS.first_name,
            ELEMENTS.last_name,
            ELEMENTS.user_email,
            ELEMENTS.age,
            ELEMENTS.salary,
            ELEMENTS.department,
            ELEMENTS.submit,
        ] {
            mock.element(sel);
        }
        mock.element(ELEMENTS.table_body).html(
            r#"<div class="rt-tbody">
                <div class="rt-tr-group"><div class="rt-tr">
                  <div class="rt-td">Jane</div><div class="rt-td">Smith</div><div class="rt-td">28</div>
                  <div class="rt-td">jane.smith@example.com</div><div class="rt-td">45000</div>
                  <div class="rt-td">HR</div><div class="rt-td"></div>
                </div></div>
                <div class="rt-tr-group"><div class="rt-tr -padRow"><div class="rt-td"> </div></div></div>
            </div>"#,
        );
    }

    #[tokio::test(start_paused = true)]
    async fn text_box_form_fills_every_field_then_submits() {
        let mock = MockDriver::new();
        for sel in [
            ELEMENTS.full_name,
            ELEMENTS.email,
            ELEMENTS.current_address,
            ELEMENTS.permanent_address,
            ELEMENTS.submit,
        ] {
            mock.element(sel);
        }
        let page = ElementsPage::new(mock.synchronizer());
        let data = fixtures::text_box_data();

        page.fill_text_box_form(&data).await.unwrap();

        assert_eq!(mock.value_of("#userName"), "John Doe");
        assert_eq!(mock.value_of("#permanentAddress"), data.permanent_address);
        assert_eq!(mock.clicks_on("#submit"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn added_record_is_found_in_the_table() {
        let mock = MockDriver::new();
        web_table(&mock);
        let page = ElementsPage::new(mock.synchronizer());
        let record = fixtures::table_record();

        page.add_new_table_record(&record).await.unwrap();

        assert_eq!(mock.value_of("#age"), "28");
        assert_eq!(mock.value_of("#salary"), "45000");
        assert!(page.record_exists(&record).await.unwrap());
        assert_eq!(page.table_records().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn edit_targets_the_requested_row() {
        let mock = MockDriver::new();
        mock.element(r#"[title="Edit"] >> nth=0"#)
            .on_click(Effect::show("#registration-form-modal"));
        let page = ElementsPage::new(mock.synchronizer());

        page.edit_table_record(0).await.unwrap();
        assert!(mock.is_shown("#registration-form-modal"));
    }

    #[tokio::test(start_paused = true)]
    async fn dynamic_properties_wait_out_the_delay() {
        let mock = MockDriver::new();
        mock.element(ELEMENTS.enable_after)
            .enabled_after(Duration::from_secs(5));
        mock.element("#colorChange.text-danger")
            .visible_after(Duration::from_secs(5));
        mock.element(ELEMENTS.visible_after)
            .visible_after(Duration::from_secs(5));
        let page = ElementsPage::new(mock.synchronizer());
        let props = fixtures::dynamic_properties();

        page.wait_for_button_enabled(&props).await.unwrap();
        page.wait_for_color_change(&props).await.unwrap();
        page.wait_for_button_visible(&props).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn never_enabled_button_times_out() {
        let mock = MockDriver::new();
        mock.element(ELEMENTS.enable_after).disabled();
        let page = ElementsPage::new(mock.synchronizer());

        let err = page
            .wait_for_button_enabled(&fixtures::dynamic_properties())
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }
}

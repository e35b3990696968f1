//! The full set: validation paths, CRUD flows, windows, frames and the
//! pointer-driven widgets.

use super::{enter_section, ensure, FnScenario, ScenarioFuture, ScenarioRegistry, Section, Tier};
use crate::browser::Session;
use crate::core::{BrowserDriver, DialogKind, MouseAction};
use crate::errors::Result;
use crate::expect::pattern;
use crate::fixtures::{self, PersonalInfo, UPLOAD_FILE_NAME};
use crate::pages::elements::API_LINKS;
use crate::pages::{nth, ALERTS, ELEMENTS, FORMS, HOME, INTERACTIONS, WIDGETS};
use tracing::debug;

const FIELD_ERROR: &str = "field-error";
const SLIDER_TARGET: i64 = 75;
const RESIZE_MAX: (f64, f64) = (500.0, 300.0);
const RESIZE_MIN: f64 = 150.0;
const BANNER_URL: &str = r".*selenium-training";
const WINDOW_MESSAGE: &str = "Knowledge increases by sharing";
/// Frame selector with its declared width and height.
const FRAME_SIZES: [(&str, &str, &str); 2] = [
    ("#frame1", "500px", "350px"),
    ("#frame2", "100px", "100px"),
];
const PICKED_DATE_TIME: &str = "May 8, 2025 3:00 PM";
const DATE_FORMAT: &str = r"^\d{2}/\d{2}/\d{4}$";
const TEXT_FIELD_TOOLTIP: &str = "You hovered over the text field";
const CARS: [&str; 2] = ["volvo", "saab"];
const PICKED_GRID: [usize; 3] = [0, 4, 8];
const DROP_HIGHLIGHT: &str = "ui-state-highlight";
const AXIS_DRAG: f64 = 100.0;
/// How far past the container edge the contained box is pulled.
const CONTAINER_OVERSHOOT: f64 = 100.0;

fn regression<D, F>(name: &str, section: Section, body: F) -> FnScenario<D>
where
    D: BrowserDriver,
    F: for<'a> Fn(&'a Session<D>) -> ScenarioFuture<'a> + Send + Sync + 'static,
{
    FnScenario::new(name, Tier::Regression, section, body)
}

pub fn register<D: BrowserDriver>(registry: &mut ScenarioRegistry<D>) {
    use Section::*;

    registry.register(regression(
        "training banner opens in a new page",
        Home,
        |s| Box::pin(training_banner(s)),
    ));
    registry.register(regression(
        "check box tree reports checked leaves",
        Elements,
        |s| Box::pin(check_box_tree(s)),
    ));
    registry.register(regression(
        "web table record can be added, edited and deleted",
        Elements,
        |s| Box::pin(web_table_crud(s)),
    ));
    registry.register(regression(
        "home link and api links respond",
        Elements,
        |s| Box::pin(links(s)),
    ));
    registry.register(regression(
        "uploaded file path is shown",
        Elements,
        |s| Box::pin(upload_download(s)),
    ));
    registry.register(regression(
        "dynamic properties change after their delay",
        Elements,
        |s| Box::pin(dynamic_properties(s)),
    ));
    registry.register(regression(
        "empty practice form flags required fields",
        Forms,
        |s| Box::pin(required_fields(s)),
    ));
    registry.register(regression(
        "short mobile number is rejected",
        Forms,
        |s| Box::pin(mobile_validation(s)),
    ));
    registry.register(regression(
        "malformed email is rejected",
        Forms,
        |s| Box::pin(email_validation(s)),
    ));
    registry.register(regression(
        "city depends on the chosen state",
        Forms,
        |s| Box::pin(state_and_city(s)),
    ));
    registry.register(regression(
        "date of birth picker fills the input",
        Forms,
        |s| Box::pin(date_of_birth_picker(s)),
    ));
    registry.register(regression(
        "picture upload keeps the file name",
        Forms,
        |s| Box::pin(picture_upload(s)),
    ));
    registry.register(regression(
        "timer alert is accepted once it opens",
        Alerts,
        |s| Box::pin(timer_alert(s)),
    ));
    registry.register(regression(
        "new window opens the sample page",
        Alerts,
        |s| Box::pin(new_window(s)),
    ));
    registry.register(regression(
        "nested frames expose parent and child",
        Alerts,
        |s| Box::pin(nested_frames(s)),
    ));
    registry.register(regression(
        "large modal opens and closes",
        Alerts,
        |s| Box::pin(large_modal(s)),
    ));
    registry.register(regression(
        "dismissed confirm reports cancel",
        Alerts,
        |s| Box::pin(dismissed_confirm(s)),
    ));
    registry.register(regression(
        "message window opens",
        Alerts,
        |s| Box::pin(message_window(s)),
    ));
    registry.register(regression(
        "frames keep their declared sizes",
        Alerts,
        |s| Box::pin(frame_sizes(s)),
    ));
    registry.register(regression(
        "modal backdrop stays until the modal closes",
        Alerts,
        |s| Box::pin(modal_backdrop(s)),
    ));
    registry.register(regression(
        "accordion section collapses",
        Widgets,
        |s| Box::pin(accordion_collapse(s)),
    ));
    registry.register(regression(
        "single color is picked",
        Widgets,
        |s| Box::pin(single_color(s)),
    ));
    registry.register(regression(
        "picked color can be removed",
        Widgets,
        |s| Box::pin(remove_color(s)),
    ));
    registry.register(regression(
        "date and time picker keeps a typed value",
        Widgets,
        |s| Box::pin(date_and_time(s)),
    ));
    registry.register(regression(
        "invalid date is replaced with a valid one",
        Widgets,
        |s| Box::pin(date_validation(s)),
    ));
    registry.register(regression(
        "slider follows the arrow keys",
        Widgets,
        |s| Box::pin(slider(s)),
    ));
    registry.register(regression(
        "progress bar runs, stops and resets",
        Widgets,
        |s| Box::pin(progress_bar(s)),
    ));
    registry.register(regression(
        "progress bar runs to completion",
        Widgets,
        |s| Box::pin(progress_complete(s)),
    ));
    registry.register(regression(
        "more tab is disabled",
        Widgets,
        |s| Box::pin(disabled_tab(s)),
    ));
    registry.register(regression(
        "text field tooltip shows on hover",
        Widgets,
        |s| Box::pin(text_field_tooltip(s)),
    ));
    registry.register(regression(
        "nav menu opens its sub lists on hover",
        Widgets,
        |s| Box::pin(nav_menu(s)),
    ));
    registry.register(regression(
        "multi select keeps every picked car",
        Widgets,
        |s| Box::pin(multi_select(s)),
    ));
    registry.register(regression(
        "sortable item counts match the fixture",
        Interactions,
        |s| Box::pin(sortable_counts(s)),
    ));
    registry.register(regression(
        "sortable grid reorders on drag",
        Interactions,
        |s| Box::pin(grid_sorting(s)),
    ));
    registry.register(regression(
        "resizable box stays within its bounds",
        Interactions,
        |s| Box::pin(resize_bounds(s)),
    ));
    registry.register(regression(
        "selectable grid marks picked items",
        Interactions,
        |s| Box::pin(selectable_grid(s)),
    ));
    registry.register(regression(
        "selectable item toggles off",
        Interactions,
        |s| Box::pin(toggle_selection(s)),
    ));
    registry.register(regression(
        "accept drop target takes only the acceptable box",
        Interactions,
        |s| Box::pin(accept_drop(s)),
    ));
    registry.register(regression(
        "nested drop boxes highlight where dropped",
        Interactions,
        |s| Box::pin(nested_drop(s)),
    ));
    registry.register(regression(
        "axis restricted boxes move along one axis",
        Interactions,
        |s| Box::pin(axis_restriction(s)),
    ));
    registry.register(regression(
        "contained box stays inside its container",
        Interactions,
        |s| Box::pin(container_bounds(s)),
    ));
}

async fn check_box_tree<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Elements).await?;
    let elements = s.elements();
    elements.navigate_to_check_box().await?;
    elements.expand_check_box_tree().await?;

    let sync = elements.sync();
    sync.click("text=Downloads").await?;
    for leaf in ["downloads", "wordFile", "excelFile"] {
        sync.expect(ELEMENTS.check_box_result)
            .to_contain_text(leaf)
            .await?;
    }
    Ok(())
}

async fn web_table_crud<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Elements).await?;
    let elements = s.elements();
    elements.navigate_to_web_tables().await?;
    let sync = elements.sync();

    let record = fixtures::table_record();
    elements.add_new_table_record(&record).await?;
    elements.search_table(&record.first_name).await?;
    for cell in [&record.first_name, &record.last_name] {
        sync.expect(ELEMENTS.table_body).to_contain_text(cell).await?;
    }

    let renamed = format!("Updated{}", record.first_name);
    elements.edit_table_record(0).await?;
    sync.fill(ELEMENTS.first_name, &renamed).await?;
    sync.click(ELEMENTS.submit).await?;
    elements.search_table("Updated").await?;
    sync.expect(ELEMENTS.table_body)
        .to_contain_text(&renamed)
        .await?;

    elements.delete_table_record(0).await?;
    elements.search_table(&renamed).await?;
    sync.expect(ELEMENTS.table_body)
        .not_to_contain_text(&renamed)
        .await
}

async fn links<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Elements).await?;
    let elements = s.elements();
    elements.navigate_to_links().await?;
    let sync = elements.sync();

    let home = sync.click_and_wait_for_new_page(ELEMENTS.simple_link).await?;
    let home = sync.for_page(home);
    let home_url = format!(
        "^{}/?$",
        regex::escape(s.config().base_url.trim_end_matches('/'))
    );
    home.expect_page().to_have_url(&home_url).await?;
    home.close_page().await?;

    for (link, code) in API_LINKS {
        debug!(link, code, "calling api link");
        sync.click(link).await?;
        sync.expect(ELEMENTS.link_response)
            .to_contain_text(code)
            .await?;
    }
    Ok(())
}

async fn open_practice_form<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Forms).await?;
    s.forms().navigate_to_practice_form().await
}

async fn required_fields<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    open_practice_form(s).await?;
    let forms = s.forms();
    forms.submit().await?;

    for field in [
        FORMS.first_name,
        FORMS.last_name,
        FORMS.gender_group,
        FORMS.mobile,
    ] {
        forms.sync().expect(field).to_have_class(FIELD_ERROR).await?;
    }
    Ok(())
}

/// Submits `invalid` and expects `field` flagged, then submits the valid
/// record and expects the flag gone.
async fn rejects_then_accepts<D: BrowserDriver>(
    s: &Session<D>,
    field: &str,
    invalid: PersonalInfo,
) -> Result<()> {
    open_practice_form(s).await?;
    let forms = s.forms();

    forms.fill_personal_info(&invalid).await?;
    forms.submit().await?;
    forms.sync().expect(field).to_have_class(FIELD_ERROR).await?;

    forms.fill_personal_info(&fixtures::personal_info()).await?;
    forms.submit().await?;
    forms
        .sync()
        .expect(field)
        .not_to_have_class(FIELD_ERROR)
        .await
}

async fn mobile_validation<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    let invalid = PersonalInfo {
        mobile: "123".into(),
        ..fixtures::personal_info()
    };
    rejects_then_accepts(s, FORMS.mobile, invalid).await
}

async fn email_validation<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    let invalid = PersonalInfo {
        email: "invalid-email".into(),
        ..fixtures::personal_info()
    };
    rejects_then_accepts(s, FORMS.email, invalid).await
}

async fn state_and_city<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    open_practice_form(s).await?;
    let forms = s.forms();
    let address = fixtures::address();

    forms.fill_address(&address).await?;
    forms
        .sync()
        .expect(FORMS.state)
        .to_contain_text(&address.state)
        .await?;
    forms
        .sync()
        .expect(FORMS.city)
        .to_contain_text(&address.city)
        .await?;

    forms.clear_state().await?;
    forms.sync().expect(FORMS.city).to_be_disabled().await
}

async fn timer_alert<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_alerts().await?;

    let dialog = alerts.handle_timer_alert().await?;
    ensure(dialog.kind == DialogKind::Alert, || {
        format!("expected an alert, got {:?}", dialog.kind)
    })
}

async fn new_window<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_browser_windows().await?;

    let window = alerts.open_new_window().await?;
    let window = alerts.on_page(window);
    window.expect_page().to_have_url(r".*/sample").await?;
    window
        .expect(ALERTS.sample_heading)
        .to_have_text("This is a sample page")
        .await?;
    window.close_page().await
}

async fn nested_frames<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_nested_frames().await?;

    let (parent, child) = alerts.nested_frames();
    parent
        .expect(ALERTS.frame_body)
        .to_contain_text("Parent frame")
        .await?;
    child
        .expect(ALERTS.frame_body)
        .to_contain_text("Child Iframe")
        .await
}

async fn large_modal<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_modal_dialogs().await?;
    let sync = alerts.sync();

    alerts.open_large_modal().await?;
    sync.expect(ALERTS.modal_body).to_be_visible().await?;
    sync.expect(ALERTS.modal_body)
        .to_contain_text("Lorem Ipsum")
        .await?;
    sync.expect(ALERTS.modal_header)
        .to_contain_text("Large Modal")
        .await?;

    alerts.close_large_modal().await?;
    sync.expect(ALERTS.modal_body).to_be_hidden().await
}

async fn slider<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_slider().await?;

    widgets.move_slider(SLIDER_TARGET).await?;
    widgets
        .sync()
        .expect(WIDGETS.slider)
        .to_have_value(&SLIDER_TARGET.to_string())
        .await?;

    // focus stays on the slider after move_slider
    for _ in 0..5 {
        widgets.sync().press_key("ArrowRight").await?;
    }
    let value = widgets.slider_value().await?;
    ensure(value > SLIDER_TARGET, || {
        format!("slider at {} after stepping right from {}", value, SLIDER_TARGET)
    })
}

async fn progress_bar<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_progress_bar().await?;

    widgets.start_progress().await?;
    widgets.wait_for_progress(50).await?;
    widgets.stop_progress().await?;
    let reached = widgets.progress_value().await?;
    ensure(reached >= 50, || {
        format!("progress stopped at {}%, expected at least 50%", reached)
    })?;

    widgets.reset_progress().await?;
    widgets
        .sync()
        .expect(WIDGETS.progress_bar)
        .to_have_attribute("aria-valuenow", "0")
        .await
}

async fn grid_sorting<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Interactions).await?;
    let interactions = s.interactions();
    interactions.navigate_to_sortable().await?;
    interactions.switch_to_grid_view().await?;
    let sync = interactions.sync();

    sync.expect(INTERACTIONS.sortable_grid_items)
        .to_have_count(fixtures::interaction_data().grid_items.len())
        .await?;
    let first = interactions
        .grid_order()
        .await?
        .into_iter()
        .next()
        .unwrap_or_default();

    interactions.drag_grid_item(0, 3).await?;
    sync.expect(&nth(INTERACTIONS.sortable_grid_items, 3))
        .to_have_text(&first)
        .await
}

async fn resize_bounds<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Interactions).await?;
    let interactions = s.interactions();
    interactions.navigate_to_resizable().await?;

    let initial = interactions.box_size().await?;
    interactions.resize_box(50.0, 50.0).await?;
    let grown = interactions.box_size().await?;
    ensure(
        grown.width > initial.width && grown.height > initial.height,
        || format!("box did not grow: {:?} -> {:?}", initial, grown),
    )?;
    ensure(
        grown.width <= RESIZE_MAX.0 && grown.height <= RESIZE_MAX.1,
        || format!("box grew past {:?}: {:?}", RESIZE_MAX, grown),
    )?;

    interactions.resize_box(-200.0, -200.0).await?;
    let shrunk = interactions.box_size().await?;
    ensure(
        shrunk.width >= RESIZE_MIN && shrunk.height >= RESIZE_MIN,
        || format!("box shrank below {}: {:?}", RESIZE_MIN, shrunk),
    )
}

async fn training_banner<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Home).await?;
    let home = s.home();
    home.sync().expect(HOME.banner).to_be_visible().await?;

    let page = home.open_banner().await?;
    let popup = home.sync().for_page(page);
    popup.expect_page().to_have_url(BANNER_URL).await?;
    popup.close_page().await
}

async fn upload_download<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Elements).await?;
    let elements = s.elements();
    elements.navigate_to_upload_download().await?;

    elements
        .upload_file(&fixtures::upload_file_path(s.config()))
        .await?;
    let shown = elements.uploaded_file_path().await?;
    ensure(shown.ends_with(UPLOAD_FILE_NAME), || {
        format!("uploaded path {:?} does not end with {}", shown, UPLOAD_FILE_NAME)
    })
}

async fn dynamic_properties<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Elements).await?;
    let elements = s.elements();
    elements.navigate_to_dynamic_properties().await?;
    let props = fixtures::dynamic_properties();
    let sync = elements.sync();

    elements.wait_for_button_enabled(&props).await?;
    sync.expect(ELEMENTS.enable_after).to_be_enabled().await?;
    elements.wait_for_color_change(&props).await?;
    sync.expect(ELEMENTS.color_change)
        .to_have_class(&props.color_change_class)
        .await?;
    elements.wait_for_button_visible(&props).await
}

async fn date_of_birth_picker<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    open_practice_form(s).await?;
    let forms = s.forms();
    let dob = fixtures::date_of_birth();

    forms.set_date_of_birth(&dob).await?;
    forms
        .sync()
        .expect(FORMS.date_of_birth)
        .to_have_value(&dob.input_format())
        .await
}

async fn picture_upload<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    open_practice_form(s).await?;
    let forms = s.forms();

    forms
        .upload_picture(&fixtures::upload_file_path(s.config()))
        .await?;
    // browsers report the file under a fake directory
    let value = forms.sync().input_value(FORMS.picture).await?;
    ensure(value.ends_with(UPLOAD_FILE_NAME), || {
        format!("picture input holds {:?}", value)
    })
}

async fn dismissed_confirm<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_alerts().await?;

    let dialog = alerts.handle_confirm_alert(false).await?;
    ensure(dialog.kind == DialogKind::Confirm, || {
        format!("expected a confirm, got {:?}", dialog.kind)
    })?;
    let result = alerts.confirm_result().await?;
    ensure(result == "You selected Cancel", || {
        format!("confirm result was {:?}", result)
    })
}

async fn message_window<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_browser_windows().await?;

    let window = alerts.open_new_window_message().await?;
    let window = alerts.on_page(window);
    window
        .expect(ALERTS.frame_body)
        .to_contain_text(WINDOW_MESSAGE)
        .await?;
    window.close_page().await
}

async fn frame_sizes<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_frames().await?;

    let sync = alerts.sync();
    for (frame, width, height) in FRAME_SIZES {
        sync.expect(frame).to_have_attribute("width", width).await?;
        sync.expect(frame).to_have_attribute("height", height).await?;
    }
    Ok(())
}

async fn modal_backdrop<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_modal_dialogs().await?;
    let sync = alerts.sync();

    alerts.open_small_modal().await?;
    sync.expect(ALERTS.modal_backdrop).to_be_visible().await?;

    // a click on the backdrop corner leaves the dialog open
    sync.mouse(MouseAction::Move { x: 0.0, y: 0.0 }).await?;
    sync.mouse(MouseAction::Down).await?;
    sync.mouse(MouseAction::Up).await?;
    sync.expect(ALERTS.modal_body).to_be_visible().await?;

    alerts.close_small_modal().await?;
    sync.expect(ALERTS.modal_backdrop).to_be_hidden().await
}

async fn accordion_collapse<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_accordian().await?;

    let text = widgets.section_text(1).await?;
    ensure(text.contains("Lorem Ipsum"), || {
        format!("first section reads {:?}", text)
    })?;
    widgets.toggle_section(1).await?;
    widgets.wait_for_section_collapsed(1).await
}

async fn single_color<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_auto_complete().await?;

    let color = fixtures::colors().into_iter().next().unwrap_or_default();
    widgets.type_single_color(&color).await?;
    let picked = widgets.single_color().await?;
    ensure(picked == color, || {
        format!("picked {:?}, expected {:?}", picked, color)
    })
}

async fn remove_color<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_auto_complete().await?;

    let colors: Vec<String> = fixtures::colors().into_iter().take(2).collect();
    widgets.type_multiple_colors(&colors).await?;
    widgets.remove_first_color().await?;
    widgets
        .sync()
        .expect(WIDGETS.multi_values)
        .not_to_contain_text(&colors[0])
        .await?;
    let left = widgets.selected_colors().await?;
    ensure(left == colors[1..], || {
        format!("expected {:?} after removal, found {:?}", &colors[1..], left)
    })
}

async fn date_and_time<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_date_picker().await?;

    widgets.set_date_and_time(PICKED_DATE_TIME).await?;
    let value = widgets.date_time_value().await?;
    ensure(value.contains(PICKED_DATE_TIME), || {
        format!("date and time input holds {:?}", value)
    })
}

async fn date_validation<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_date_picker().await?;

    widgets.set_date("invalid").await?;
    let value = widgets.date_value().await?;
    ensure(pattern(DATE_FORMAT)?.is_match(&value), || {
        format!("date input kept {:?}", value)
    })
}

async fn progress_complete<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_progress_bar().await?;
    let sync = widgets.sync();

    widgets.start_progress().await?;
    widgets.wait_for_progress(100).await?;
    sync.expect(WIDGETS.progress_bar)
        .to_have_attribute("aria-valuenow", "100")
        .await?;
    sync.expect(WIDGETS.reset).to_be_visible().await
}

async fn disabled_tab<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_tabs().await?;

    widgets
        .sync()
        .expect(widgets.tab("more")?)
        .to_be_disabled()
        .await
}

async fn text_field_tooltip<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_tool_tips().await?;

    let text = widgets.text_field_tooltip().await?;
    ensure(text == TEXT_FIELD_TOOLTIP, || format!("tooltip read {:?}", text))
}

async fn nav_menu<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_menu().await?;

    for step in fixtures::menu_path().windows(2) {
        widgets.hover_menu_item(&step[0]).await?;
        widgets
            .sync()
            .expect(&widgets.menu_entry(&step[1]))
            .to_be_visible()
            .await?;
    }
    Ok(())
}

async fn multi_select<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_select_menu().await?;

    widgets.select_multiple(&CARS).await?;
    widgets
        .sync()
        .expect(WIDGETS.multi_select_checked)
        .to_have_count(CARS.len())
        .await
}

async fn sortable_counts<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Interactions).await?;
    let interactions = s.interactions();
    interactions.navigate_to_sortable().await?;
    let data = fixtures::interaction_data();
    let sync = interactions.sync();

    interactions.switch_to_list_view().await?;
    sync.expect(INTERACTIONS.sortable_list_items)
        .to_have_count(data.sortable_items.len())
        .await?;
    let list = interactions.list_order().await?;
    ensure(list == data.sortable_items, || {
        format!("list reads {:?}", list)
    })?;

    interactions.switch_to_grid_view().await?;
    sync.expect(INTERACTIONS.sortable_grid_items)
        .to_have_count(data.grid_items.len())
        .await
}

async fn selectable_grid<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Interactions).await?;
    let interactions = s.interactions();
    interactions.navigate_to_selectable().await?;
    interactions.switch_to_grid_view().await?;

    interactions.select_grid_items(&PICKED_GRID).await?;
    for index in PICKED_GRID {
        interactions
            .sync()
            .expect(&nth(INTERACTIONS.selectable_grid_items, index))
            .to_have_class("active")
            .await?;
    }
    Ok(())
}

async fn toggle_selection<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Interactions).await?;
    let interactions = s.interactions();
    interactions.navigate_to_selectable().await?;
    let first = nth(INTERACTIONS.selectable_list_items, 0);

    interactions.select_list_items(&[0]).await?;
    interactions
        .sync()
        .expect(&first)
        .to_have_class("active")
        .await?;
    interactions.select_list_items(&[0]).await?;
    interactions
        .sync()
        .expect(&first)
        .not_to_have_class("active")
        .await
}

async fn accept_drop<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Interactions).await?;
    let interactions = s.interactions();
    interactions.navigate_to_droppable().await?;
    interactions.switch_to_accept_tab().await?;
    let target = interactions.sync().expect(INTERACTIONS.accept_droppable);

    interactions.drag_to_accept_target(false).await?;
    target.not_to_have_class(DROP_HIGHLIGHT).await?;
    interactions.drag_to_accept_target(true).await?;
    target.to_have_class(DROP_HIGHLIGHT).await?;
    target.to_contain_text("Dropped!").await
}

async fn nested_drop<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Interactions).await?;
    let interactions = s.interactions();
    interactions.navigate_to_droppable().await?;
    interactions.switch_to_prevent_tab().await?;
    let sync = interactions.sync();

    interactions.drag_to_nested_target(false).await?;
    sync.expect(INTERACTIONS.outer_drop_box)
        .to_have_class(DROP_HIGHLIGHT)
        .await?;
    sync.expect(INTERACTIONS.inner_drop_box)
        .not_to_have_class(DROP_HIGHLIGHT)
        .await?;

    interactions.drag_to_nested_target(true).await?;
    sync.expect(INTERACTIONS.inner_drop_box)
        .to_have_class(DROP_HIGHLIGHT)
        .await
}

async fn axis_restriction<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Interactions).await?;
    let interactions = s.interactions();
    interactions.navigate_to_draggable().await?;
    interactions.switch_to_axis_restricted_tab().await?;
    let sync = interactions.sync();

    let before = sync.bounding_box(INTERACTIONS.restricted_x).await?;
    interactions.drag_restricted_x(AXIS_DRAG, AXIS_DRAG).await?;
    let after = sync.bounding_box(INTERACTIONS.restricted_x).await?;
    ensure(after.x > before.x && after.y == before.y, || {
        format!("x-only box moved {:?} -> {:?}", before, after)
    })?;

    let before = sync.bounding_box(INTERACTIONS.restricted_y).await?;
    interactions.drag_restricted_y(AXIS_DRAG, AXIS_DRAG).await?;
    let after = sync.bounding_box(INTERACTIONS.restricted_y).await?;
    ensure(after.y > before.y && after.x == before.x, || {
        format!("y-only box moved {:?} -> {:?}", before, after)
    })
}

async fn container_bounds<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Interactions).await?;
    let interactions = s.interactions();
    interactions.navigate_to_draggable().await?;
    interactions.switch_to_container_restricted_tab().await?;
    let sync = interactions.sync();

    let container = sync.bounding_box(INTERACTIONS.container).await?;
    interactions
        .drag_within_container(
            container.width + CONTAINER_OVERSHOOT,
            container.height + CONTAINER_OVERSHOOT,
        )
        .await?;
    let dragged = sync.bounding_box(INTERACTIONS.contained_box).await?;
    ensure(
        dragged.x + dragged.width <= container.x + container.width
            && dragged.y + dragged.height <= container.y + container.height,
        || format!("box {:?} left its container {:?}", dragged, container),
    )
}

//! The fast critical path: one or two scenarios per application section.

use super::{enter_section, ensure, FnScenario, ScenarioRegistry, Section, Tier};
use crate::browser::Session;
use crate::core::{BrowserDriver, DialogKind};
use crate::errors::Result;
use crate::fixtures;
use crate::pages::home::CARD_TITLES;
use crate::pages::{nth, ALERTS, ELEMENTS, FORMS, HOME, INTERACTIONS, WIDGETS};
use std::time::Duration;
use tracing::info;

const PROMPT_TEXT: &str = "Test Automation";
const PICKED_DATE: &str = "05/08/2025";
const SAMPLE_HEADING: &str = "This is a sample page";
const BUTTON_TOOLTIP: &str = "You hovered over the Button";
const OLD_SELECT_VALUE: &str = "3";
const TABS: [&str; 3] = ["what", "origin", "use"];
const FREE_DRAG: (f64, f64) = (100.0, 100.0);

pub fn register<D: BrowserDriver>(registry: &mut ScenarioRegistry<D>) {
    use Section::*;

    registry.register(FnScenario::new(
        "home page lists every section card",
        Tier::Smoke,
        Home,
        |s| Box::pin(home_cards(s)),
    ));
    registry.register(FnScenario::new(
        "text box form echoes submitted data",
        Tier::Smoke,
        Elements,
        |s| Box::pin(text_box_form(s)),
    ));
    registry.register(FnScenario::new(
        "radio button selection is reported",
        Tier::Smoke,
        Elements,
        |s| Box::pin(radio_buttons(s)),
    ));
    registry.register(FnScenario::new(
        "double, right and dynamic clicks are acknowledged",
        Tier::Smoke,
        Elements,
        |s| Box::pin(button_clicks(s)),
    ));
    registry.register(FnScenario::new(
        "student registration form reaches confirmation",
        Tier::Smoke,
        Forms,
        |s| Box::pin(student_registration(s)),
    ));
    registry.register(FnScenario::new(
        "subjects autocomplete adds and removes entries",
        Tier::Smoke,
        Forms,
        |s| Box::pin(subject_autocomplete(s)),
    ));
    registry.register(FnScenario::new(
        "new tab opens the sample page",
        Tier::Smoke,
        Alerts,
        |s| Box::pin(new_tab(s)),
    ));
    registry.register(FnScenario::new(
        "simple alert is accepted",
        Tier::Smoke,
        Alerts,
        |s| Box::pin(simple_alert(s)),
    ));
    registry.register(FnScenario::new(
        "accepted confirm reports ok",
        Tier::Smoke,
        Alerts,
        |s| Box::pin(confirm_alert(s)),
    ));
    registry.register(FnScenario::new(
        "prompt answer is echoed",
        Tier::Smoke,
        Alerts,
        |s| Box::pin(prompt_alert(s)),
    ));
    registry.register(FnScenario::new(
        "both frames show the sample page",
        Tier::Smoke,
        Alerts,
        |s| Box::pin(single_frames(s)),
    ));
    registry.register(FnScenario::new(
        "small modal opens and closes",
        Tier::Smoke,
        Alerts,
        |s| Box::pin(small_modal(s)),
    ));
    registry.register(FnScenario::new(
        "accordion section expands with content",
        Tier::Smoke,
        Widgets,
        |s| Box::pin(accordion(s)),
    ));
    registry.register(FnScenario::new(
        "several colors can be picked",
        Tier::Smoke,
        Widgets,
        |s| Box::pin(multiple_colors(s)),
    ));
    registry.register(FnScenario::new(
        "date picker keeps a typed date",
        Tier::Smoke,
        Widgets,
        |s| Box::pin(date_picker(s)),
    ));
    registry.register(FnScenario::new(
        "tabs switch their panes",
        Tier::Smoke,
        Widgets,
        |s| Box::pin(tabs(s)),
    ));
    registry.register(FnScenario::new(
        "button tooltip shows on hover",
        Tier::Smoke,
        Widgets,
        |s| Box::pin(button_tooltip(s)),
    ));
    registry.register(FnScenario::new(
        "old style select keeps the chosen option",
        Tier::Smoke,
        Widgets,
        |s| Box::pin(old_style_select(s)),
    ));
    registry.register(FnScenario::new(
        "sortable list reorders on drag",
        Tier::Smoke,
        Interactions,
        |s| Box::pin(sortable_list(s)),
    ));
    registry.register(FnScenario::new(
        "selectable list marks picked items",
        Tier::Smoke,
        Interactions,
        |s| Box::pin(selectable_list(s)),
    ));
    registry.register(FnScenario::new(
        "simple drop highlights the target",
        Tier::Smoke,
        Interactions,
        |s| Box::pin(simple_drop(s)),
    ));
    registry.register(FnScenario::new(
        "drag box moves freely",
        Tier::Smoke,
        Interactions,
        |s| Box::pin(free_drag(s)),
    ));
}

async fn home_cards<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Home).await?;
    let home = s.home();
    home.sync().expect_page().to_have_title("DEMOQA").await?;
    let titles = home.card_titles().await?;
    ensure(titles == CARD_TITLES, || {
        format!("expected cards {:?}, found {:?}", CARD_TITLES, titles)
    })?;
    home.sync().expect(HOME.banner).to_be_visible().await
}

async fn text_box_form<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Elements).await?;
    let elements = s.elements();
    elements.navigate_to_text_box().await?;

    let data = fixtures::text_box_data();
    elements.fill_text_box_form(&data).await?;

    let sync = elements.sync();
    sync.expect(ELEMENTS.output)
        .within(Duration::from_secs(10))
        .to_be_visible()
        .await?;
    sync.expect(ELEMENTS.output_name)
        .to_contain_text(&data.full_name)
        .await?;
    sync.expect(ELEMENTS.output_email)
        .to_contain_text(&data.email)
        .await?;
    sync.expect(ELEMENTS.output_current_address)
        .to_contain_text(&data.current_address)
        .await?;
    sync.expect(ELEMENTS.output_permanent_address)
        .to_contain_text(&data.permanent_address)
        .await
}

async fn radio_buttons<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Elements).await?;
    let elements = s.elements();
    elements.navigate_to_radio_button().await?;

    let sync = elements.sync();
    for choice in ["Yes", "Impressive"] {
        sync.retry_click(&format!("text={}", choice)).await?;
        sync.expect(ELEMENTS.radio_result).to_have_text(choice).await?;
    }
    Ok(())
}

async fn button_clicks<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Elements).await?;
    let elements = s.elements();
    elements.navigate_to_buttons().await?;

    let sync = elements.sync();
    sync.double_click(ELEMENTS.double_click).await?;
    sync.expect(ELEMENTS.double_click_message)
        .to_be_visible()
        .await?;
    sync.right_click(ELEMENTS.right_click).await?;
    sync.expect(ELEMENTS.right_click_message)
        .to_be_visible()
        .await?;
    sync.retry_click(ELEMENTS.dynamic_click).await?;
    sync.expect(ELEMENTS.dynamic_click_message)
        .to_be_visible()
        .await
}

pub(crate) async fn student_registration<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Forms).await?;
    let forms = s.forms();
    forms.navigate_to_practice_form().await?;

    let form = fixtures::registration_form(s.config());
    forms.fill_student_registration_form(&form).await?;

    forms
        .sync()
        .expect(FORMS.modal)
        .within(Duration::from_secs(15))
        .to_be_visible()
        .await?;

    let info = &form.personal_info;
    let gender = info.gender.to_string();
    for (label, expected) in [
        ("Student Name", info.full_name()),
        ("Student Email", info.email.clone()),
        ("Gender", gender),
        ("Mobile", info.mobile.clone()),
    ] {
        let value = forms.confirmation_value(label).await?.unwrap_or_default();
        ensure(value.contains(&expected), || {
            format!("confirmation {} was {:?}, expected {:?}", label, value, expected)
        })?;
    }
    Ok(())
}

async fn subject_autocomplete<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Forms).await?;
    let forms = s.forms();
    forms.navigate_to_practice_form().await?;

    let subjects = fixtures::subjects();
    forms.select_subjects(&subjects).await?;
    let sync = forms.sync();
    for subject in &subjects {
        sync.expect(FORMS.subject_values)
            .to_contain_text(subject)
            .await?;
    }

    forms.remove_first_subject().await?;
    sync.expect(FORMS.subject_values)
        .not_to_contain_text(&subjects[0])
        .await?;
    let left = forms.selected_subjects().await?;
    ensure(left == subjects[1..], || {
        format!("expected {:?} after removal, found {:?}", &subjects[1..], left)
    })
}

async fn new_tab<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_browser_windows().await?;

    let tab = alerts.open_new_tab().await?;
    let tab = alerts.on_page(tab);
    tab.expect_page().to_have_url(r".*/sample").await?;
    tab.expect(ALERTS.sample_heading)
        .to_have_text(SAMPLE_HEADING)
        .await?;
    tab.close_page().await
}

async fn simple_alert<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_alerts().await?;

    let dialog = alerts.handle_simple_alert().await?;
    info!(message = %dialog.message, "alert accepted");
    ensure(dialog.kind == DialogKind::Alert, || {
        format!("expected an alert, got {:?}", dialog.kind)
    })
}

async fn confirm_alert<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_alerts().await?;

    alerts.handle_confirm_alert(true).await?;
    alerts
        .sync()
        .expect(ALERTS.confirm_result)
        .to_have_text("You selected Ok")
        .await
}

async fn prompt_alert<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_alerts().await?;

    alerts.handle_prompt_alert(PROMPT_TEXT).await?;
    alerts
        .sync()
        .expect(ALERTS.prompt_result)
        .to_have_text(&format!("You entered {}", PROMPT_TEXT))
        .await
}

async fn single_frames<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_frames().await?;

    for n in [1, 2] {
        let heading = alerts.frame_heading(n).await?;
        ensure(heading == SAMPLE_HEADING, || {
            format!("frame{} heading was {:?}", n, heading)
        })?;
    }
    Ok(())
}

async fn small_modal<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Alerts).await?;
    let alerts = s.alerts();
    alerts.navigate_to_modal_dialogs().await?;
    let sync = alerts.sync();

    alerts.open_small_modal().await?;
    sync.expect(ALERTS.modal_body).to_be_visible().await?;
    sync.expect(ALERTS.modal_body)
        .to_contain_text("This is a small modal")
        .await?;
    sync.expect(ALERTS.modal_header)
        .to_contain_text("Small Modal")
        .await?;

    alerts.close_small_modal().await?;
    sync.expect(ALERTS.modal_body).to_be_hidden().await
}

async fn accordion<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_accordian().await?;

    // section 1 starts open, section 2 collapsed
    widgets.toggle_section(2).await?;
    let content = widgets.section_content(2);
    widgets.sync().expect(&content).to_be_visible().await?;
    widgets
        .sync()
        .expect(&content)
        .to_contain_text("Lorem Ipsum")
        .await
}

async fn multiple_colors<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_auto_complete().await?;

    let colors: Vec<String> = fixtures::colors().into_iter().take(3).collect();
    widgets.type_multiple_colors(&colors).await?;
    for color in &colors {
        widgets
            .sync()
            .expect(WIDGETS.multi_values)
            .to_contain_text(color)
            .await?;
    }
    Ok(())
}

async fn date_picker<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_date_picker().await?;

    widgets.set_date(PICKED_DATE).await?;
    widgets
        .sync()
        .expect(WIDGETS.date_input)
        .to_have_value(PICKED_DATE)
        .await
}

async fn tabs<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_tabs().await?;

    for name in TABS {
        widgets.switch_to_tab(name).await?;
        widgets
            .sync()
            .expect(&widgets.tab_pane(name))
            .to_be_visible()
            .await?;
    }
    Ok(())
}

async fn button_tooltip<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_tool_tips().await?;

    let text = widgets.tooltip_text().await?;
    ensure(text == BUTTON_TOOLTIP, || format!("tooltip read {:?}", text))
}

async fn old_style_select<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Widgets).await?;
    let widgets = s.widgets();
    widgets.navigate_to_select_menu().await?;

    widgets.select_old_style(OLD_SELECT_VALUE).await?;
    widgets
        .sync()
        .expect(WIDGETS.old_select)
        .to_have_value(OLD_SELECT_VALUE)
        .await
}

async fn sortable_list<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Interactions).await?;
    let interactions = s.interactions();
    interactions.navigate_to_sortable().await?;
    interactions.switch_to_list_view().await?;

    let before = interactions.list_order().await?;
    let moved = before.first().cloned().unwrap_or_default();
    interactions.drag_list_item(0, 2).await?;
    interactions
        .sync()
        .expect(&nth(INTERACTIONS.sortable_list_items, 2))
        .to_have_text(&moved)
        .await
}

async fn selectable_list<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Interactions).await?;
    let interactions = s.interactions();
    interactions.navigate_to_selectable().await?;

    let picked = [0, 2];
    interactions.select_list_items(&picked).await?;
    for index in picked {
        interactions
            .sync()
            .expect(&nth(INTERACTIONS.selectable_list_items, index))
            .to_have_class("active")
            .await?;
    }
    Ok(())
}

async fn simple_drop<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Interactions).await?;
    let interactions = s.interactions();
    interactions.navigate_to_droppable().await?;

    interactions.drag_to_droppable().await?;
    let target = interactions.sync().expect(INTERACTIONS.simple_droppable);
    target.to_have_class("ui-state-highlight").await?;
    target.to_contain_text("Dropped!").await
}

async fn free_drag<D: BrowserDriver>(s: &Session<D>) -> Result<()> {
    enter_section(s, Section::Interactions).await?;
    let interactions = s.interactions();
    interactions.navigate_to_draggable().await?;
    let sync = interactions.sync();

    let before = sync.bounding_box(INTERACTIONS.drag_box).await?;
    interactions.drag_by_offset(FREE_DRAG.0, FREE_DRAG.1).await?;
    let after = sync.bounding_box(INTERACTIONS.drag_box).await?;
    ensure(after.x > before.x && after.y > before.y, || {
        format!("drag box did not move: {:?} -> {:?}", before, after)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::pages::menu_item;
    use crate::suite::{Runner, ScenarioFilter, ScenarioStatus};
    use crate::testing::{Effect, MockDriver, MockSessionFactory};
    use std::sync::Arc;

    fn session(mock: &MockDriver) -> Session<MockDriver> {
        Session::attach(
            Arc::new(mock.clone()),
            mock.main_page(),
            Arc::new(Config::default()),
        )
    }

    /// The home card and sidebar entry a scenario follows.
    fn section(mock: &MockDriver, card: &str, group: &str, item: &str) {
        mock.element(card);
        mock.element(&menu_item(group, item));
    }

    fn practice_form_site(mock: &MockDriver) {
        mock.element(HOME.forms_card);
        mock.element(&menu_item(FORMS.group, "Practice Form"));
        mock.practice_form(&fixtures::date_of_birth());
    }

    fn text_box_site(mock: &MockDriver) {
        mock.element(HOME.elements_card);
        mock.element(&menu_item(ELEMENTS.group, "Text Box"));
        for sel in [
            ELEMENTS.full_name,
            ELEMENTS.email,
            ELEMENTS.current_address,
            ELEMENTS.permanent_address,
        ] {
            mock.element(sel);
        }
        mock.element(ELEMENTS.submit).on_click(Effect::custom(|m| {
            let echoed = [
                (ELEMENTS.output_name, "Name:", m.value_of(ELEMENTS.full_name)),
                (ELEMENTS.output_email, "Email:", m.value_of(ELEMENTS.email)),
                (
                    ELEMENTS.output_current_address,
                    "Current Address :",
                    m.value_of(ELEMENTS.current_address),
                ),
                (
                    ELEMENTS.output_permanent_address,
                    "Permananet Address :",
                    m.value_of(ELEMENTS.permanent_address),
                ),
            ];
            m.element(ELEMENTS.output);
            for (sel, label, value) in echoed {
                m.element(sel).text(&format!("{}{}", label, value));
            }
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn practice_form_passes_through_the_runner() {
        let factory = Arc::new(MockSessionFactory::with_setup(practice_form_site));
        let runner = Runner::new(Arc::clone(&factory), Config::default());
        let mut registry = ScenarioRegistry::new();
        register(&mut registry);
        let selected = registry.select(
            &ScenarioFilter::new(&[], Some("student registration")).unwrap(),
        );
        assert_eq!(selected.len(), 1);

        let report = runner.run(selected).await;

        assert!(report.success(), "{:?}", report.lines());
        assert_eq!(report.scenarios[0].status, ScenarioStatus::Passed);
        let mock = &factory.drivers()[0];
        assert_eq!(mock.clicks_on(HOME.forms_card), 1);
        assert!(mock.text_of(FORMS.modal).contains("John Doe"));
        assert!(mock.text_of(FORMS.modal).contains("john.doe@example.com"));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_confirmation_fails_the_scenario() {
        // no submit effect, so the modal never renders
        let factory = Arc::new(MockSessionFactory::with_setup(|m| {
            practice_form_site(m);
            m.element(FORMS.submit);
        }));
        let mut config = Config::default();
        config.runner.retries = 0;
        let runner = Runner::new(factory, config);
        let mut registry = ScenarioRegistry::new();
        register(&mut registry);

        let report = runner
            .run(
                registry.select(&ScenarioFilter::new(&[], Some("student registration")).unwrap()),
            )
            .await;

        assert!(!report.success());
        let error = report.scenarios[0].error.clone().unwrap_or_default();
        assert!(error.contains(".modal-content"), "{}", error);
    }

    #[tokio::test(start_paused = true)]
    async fn text_box_scenario_reads_back_the_output() {
        let mock = MockDriver::new();
        text_box_site(&mock);

        text_box_form(&session(&mock)).await.unwrap();

        assert_eq!(mock.value_of(ELEMENTS.full_name), "John Doe");
        assert!(mock.text_of(ELEMENTS.output_email).contains("john.doe@example.com"));
    }

    #[tokio::test(start_paused = true)]
    async fn button_clicks_use_the_matching_click_kind() {
        let mock = MockDriver::new();
        section(&mock, HOME.elements_card, ELEMENTS.group, "Buttons");
        mock.element(ELEMENTS.double_click)
            .on_double_click(Effect::show(ELEMENTS.double_click_message));
        mock.element(ELEMENTS.right_click)
            .on_right_click(Effect::show(ELEMENTS.right_click_message));
        mock.element(ELEMENTS.dynamic_click)
            .on_click(Effect::show(ELEMENTS.dynamic_click_message));

        button_clicks(&session(&mock)).await.unwrap();

        assert_eq!(mock.clicks_on(ELEMENTS.double_click), 1);
        assert_eq!(mock.clicks_on(ELEMENTS.right_click), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn plain_click_does_not_satisfy_double_click() {
        let mock = MockDriver::new();
        section(&mock, HOME.elements_card, ELEMENTS.group, "Buttons");
        mock.element(ELEMENTS.double_click)
            .on_click(Effect::show(ELEMENTS.double_click_message));

        let err = button_clicks(&session(&mock)).await.unwrap_err();
        assert!(err.is_assertion());
        assert!(err.to_string().contains(ELEMENTS.double_click_message));
    }

    #[tokio::test(start_paused = true)]
    async fn removing_a_subject_keeps_the_rest() {
        let mock = MockDriver::new();
        section(&mock, HOME.forms_card, FORMS.group, "Practice Form");
        mock.element(FORMS.subjects);
        mock.element(FORMS.subject_values)
            .texts(&["Maths", "English", "Computer Science"]);
        mock.element(&nth(FORMS.subject_remove, 0))
            .on_click(Effect::custom(|m| {
                m.existing(FORMS.subject_values)
                    .texts(&["English", "Computer Science"]);
            }));

        subject_autocomplete(&session(&mock)).await.unwrap();

        assert_eq!(mock.keys_pressed(), vec!["Enter"; 3]);
        assert_eq!(mock.clicks_on(&nth(FORMS.subject_remove, 0)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn both_frames_are_read() {
        let mock = MockDriver::new();
        section(&mock, HOME.alerts_card, ALERTS.group, r#""Frames""#);
        mock.element("frame=#frame1 >> #sampleHeading").text(SAMPLE_HEADING);
        mock.element("frame=#frame2 >> #sampleHeading").text("Frame not loaded");

        let err = single_frames(&session(&mock)).await.unwrap_err();
        assert!(err.to_string().contains("frame2"), "{}", err);

        mock.element("frame=#frame2 >> #sampleHeading").text(SAMPLE_HEADING);
        single_frames(&session(&mock)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn small_modal_opens_and_closes() {
        let mock = MockDriver::new();
        section(&mock, HOME.alerts_card, ALERTS.group, "Modal Dialogs");
        mock.element(ALERTS.show_small_modal)
            .on_click(Effect::custom(|m| {
                m.element(ALERTS.modal_body)
                    .text("This is a small modal. It has very less content");
                m.element(ALERTS.modal_header).text("Small Modal");
            }));
        mock.element(ALERTS.close_small_modal)
            .on_click(Effect::hide(ALERTS.modal_body).after(Duration::from_millis(300)));

        small_modal(&session(&mock)).await.unwrap();

        assert!(!mock.is_shown(ALERTS.modal_body));
    }

    #[tokio::test(start_paused = true)]
    async fn every_tab_pane_is_shown() {
        let mock = MockDriver::new();
        section(&mock, HOME.widgets_card, WIDGETS.group, r#""Tabs""#);
        for (tab, name) in [
            (WIDGETS.what_tab, "what"),
            (WIDGETS.origin_tab, "origin"),
            (WIDGETS.use_tab, "use"),
        ] {
            mock.element(tab)
                .on_click(Effect::show(&format!("#demo-tabpane-{}", name)));
        }

        tabs(&session(&mock)).await.unwrap();

        assert_eq!(mock.clicks_on(WIDGETS.use_tab), 1);
        assert!(mock.is_shown("#demo-tabpane-use"));
    }

    #[tokio::test(start_paused = true)]
    async fn tooltip_is_read_after_hover() {
        let mock = MockDriver::new();
        section(&mock, HOME.widgets_card, WIDGETS.group, "Tool Tips");
        mock.element(WIDGETS.tooltip_button).on_hover(
            Effect::set_text(WIDGETS.tooltip, BUTTON_TOOLTIP).after(Duration::from_millis(200)),
        );

        button_tooltip(&session(&mock)).await.unwrap();

        assert_eq!(mock.calls("hover"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn old_select_takes_the_option_value() {
        let mock = MockDriver::new();
        section(&mock, HOME.widgets_card, WIDGETS.group, "Select Menu");
        mock.element(WIDGETS.old_select).value("red");

        old_style_select(&session(&mock)).await.unwrap();

        assert_eq!(mock.value_of(WIDGETS.old_select), OLD_SELECT_VALUE);
    }

    #[tokio::test(start_paused = true)]
    async fn drag_box_follows_the_pointer() {
        let mock = MockDriver::new();
        section(&mock, HOME.interactions_card, INTERACTIONS.group, "Dragabble");
        mock.element(INTERACTIONS.drag_box).bbox(10.0, 10.0, 100.0, 100.0);
        mock.on_mouse_up(Effect::custom(|m| {
            if let Some(((fx, fy), (tx, ty))) = m.last_drag() {
                m.existing(INTERACTIONS.drag_box)
                    .bbox(10.0 + tx - fx, 10.0 + ty - fy, 100.0, 100.0);
            }
        }));

        free_drag(&session(&mock)).await.unwrap();

        assert_eq!(
            mock.last_drag(),
            Some(((60.0, 60.0), (60.0 + FREE_DRAG.0, 60.0 + FREE_DRAG.1)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn pinned_drag_box_fails_the_scenario() {
        let mock = MockDriver::new();
        section(&mock, HOME.interactions_card, INTERACTIONS.group, "Dragabble");
        mock.element(INTERACTIONS.drag_box).bbox(10.0, 10.0, 100.0, 100.0);

        let err = free_drag(&session(&mock)).await.unwrap_err();
        assert!(err.is_assertion());
    }

    #[test]
    fn every_smoke_scenario_is_tagged_smoke() {
        let mut registry = ScenarioRegistry::<MockDriver>::new();
        register(&mut registry);
        assert_eq!(registry.len(), 22);
        assert!(registry.all().iter().all(|s| s.tier() == Tier::Smoke));
    }
}

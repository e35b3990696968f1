use super::{menu_item, nth};
use crate::core::BrowserDriver;
use crate::errors::Result;
use crate::fixtures::{Address, DateOfBirth, Gender, Hobby, PersonalInfo, RegistrationForm};
use crate::sync::{Synchronizer, WaitState};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub struct FormsSelectors {
    pub group: &'static str,
    pub form: &'static str,

    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: &'static str,
    pub gender_male: &'static str,
    pub gender_female: &'static str,
    pub gender_other: &'static str,
    pub gender_group: &'static str,
    pub mobile: &'static str,

    pub date_of_birth: &'static str,
    pub month_select: &'static str,
    pub year_select: &'static str,

    pub subjects: &'static str,
    pub subject_values: &'static str,
    pub subject_remove: &'static str,
    pub hobby_sports: &'static str,
    pub hobby_reading: &'static str,
    pub hobby_music: &'static str,

    pub picture: &'static str,

    pub current_address: &'static str,
    pub state: &'static str,
    pub state_clear: &'static str,
    pub city: &'static str,

    pub submit: &'static str,
    pub ad_banner: &'static str,

    pub modal: &'static str,
    pub modal_title: &'static str,
    pub modal_rows: &'static str,
    pub modal_cells: &'static str,
}

pub static FORMS: FormsSelectors = FormsSelectors {
    group: "Forms",
    form: "#userForm",

    first_name: "#firstName",
    last_name: "#lastName",
    email: "#userEmail",
    gender_male: "#gender-radio-1",
    gender_female: "#gender-radio-2",
    gender_other: "#gender-radio-3",
    gender_group: r#"[name="gender"]"#,
    mobile: "#userNumber",

    date_of_birth: "#dateOfBirthInput",
    month_select: ".react-datepicker__month-select",
    year_select: ".react-datepicker__year-select",

    subjects: "#subjectsInput",
    subject_values: ".subjects-auto-complete__multi-value",
    subject_remove: ".subjects-auto-complete__multi-value__remove",
    hobby_sports: "#hobbies-checkbox-1",
    hobby_reading: "#hobbies-checkbox-2",
    hobby_music: "#hobbies-checkbox-3",

    picture: "#uploadPicture",

    current_address: "#currentAddress",
    state: "#state",
    state_clear: "#state .css-19bqh2r",
    city: "#city",

    submit: "#submit",
    ad_banner: "#fixedban",

    modal: ".modal-content",
    modal_title: "#example-modal-sizes-title-lg",
    modal_rows: "tbody tr",
    modal_cells: "td",
};

/// Lets the react-select suggestion list catch up with typed input.
const SUGGESTION_DELAY: Duration = Duration::from_millis(500);

pub struct FormsPage<D: BrowserDriver> {
    sync: Synchronizer<D>,
    sel: &'static FormsSelectors,
}

impl<D: BrowserDriver> FormsPage<D> {
    pub fn new(sync: Synchronizer<D>) -> Self {
        Self { sync, sel: &FORMS }
    }

    pub fn selectors(&self) -> &'static FormsSelectors {
        self.sel
    }

    pub fn sync(&self) -> &Synchronizer<D> {
        &self.sync
    }

    pub fn gender_radio(&self, gender: Gender) -> &'static str {
        match gender {
            Gender::Male => self.sel.gender_male,
            Gender::Female => self.sel.gender_female,
            Gender::Other => self.sel.gender_other,
        }
    }

    pub fn hobby_checkbox(&self, hobby: Hobby) -> &'static str {
        match hobby {
            Hobby::Sports => self.sel.hobby_sports,
            Hobby::Reading => self.sel.hobby_reading,
            Hobby::Music => self.sel.hobby_music,
        }
    }

    pub async fn open(&self) -> Result<()> {
        self.sync.navigate("/automation-practice-form").await
    }

    pub async fn navigate_to_practice_form(&self) -> Result<()> {
        self.sync
            .click(&menu_item(self.sel.group, "Practice Form"))
            .await?;
        Ok(())
    }

    /// The gender radios sit under their labels and the fixed ad banner, so
    /// the banner is removed and the radio is clicked through the DOM.
    pub async fn fill_personal_info(&self, info: &PersonalInfo) -> Result<()> {
        self.sync.fill(self.sel.first_name, &info.first_name).await?;
        self.sync.fill(self.sel.last_name, &info.last_name).await?;
        self.sync.fill(self.sel.email, &info.email).await?;
        self.sync
            .remove_elements(&[self.sel.ad_banner.to_string()])
            .await?;
        self.sync.dom_click(self.gender_radio(info.gender)).await?;
        self.sync.fill(self.sel.mobile, &info.mobile).await
    }

    pub async fn set_date_of_birth(&self, date: &DateOfBirth) -> Result<()> {
        self.sync.click(self.sel.date_of_birth).await?;
        self.sync
            .select_option(self.sel.month_select, &date.month_value())
            .await?;
        self.sync
            .select_option(self.sel.year_select, &date.year_value())
            .await?;
        self.sync.click(&date.day_selector()).await?;
        Ok(())
    }

    pub async fn select_subjects(&self, subjects: &[String]) -> Result<()> {
        for subject in subjects {
            self.sync
                .wait_for(self.sel.subjects, WaitState::Visible, None)
                .await?;
            self.sync.fill(self.sel.subjects, subject).await?;
            self.sync.pause(SUGGESTION_DELAY).await;
            self.sync.press_key("Enter").await?;
        }
        Ok(())
    }

    pub async fn selected_subjects(&self) -> Result<Vec<String>> {
        self.sync.all_text_contents(self.sel.subject_values).await
    }

    pub async fn remove_first_subject(&self) -> Result<()> {
        self.sync.click(&nth(self.sel.subject_remove, 0)).await?;
        Ok(())
    }

    pub async fn select_hobbies(&self, hobbies: &[Hobby]) -> Result<()> {
        for hobby in hobbies {
            self.sync.check(self.hobby_checkbox(*hobby)).await?;
        }
        Ok(())
    }

    pub async fn upload_picture(&self, path: &Path) -> Result<()> {
        self.sync.upload_file(self.sel.picture, path).await
    }

    async fn choose_from_dropdown(&self, dropdown: &str, value: &str) -> Result<()> {
        self.sync.click(dropdown).await?;
        self.sync.type_text(value).await?;
        self.sync.pause(SUGGESTION_DELAY).await;
        self.sync.press_key("Enter").await
    }

    pub async fn fill_address(&self, address: &Address) -> Result<()> {
        self.sync
            .fill(self.sel.current_address, &address.current)
            .await?;
        self.choose_from_dropdown(self.sel.state, &address.state)
            .await?;
        self.choose_from_dropdown(self.sel.city, &address.city).await
    }

    pub async fn clear_state(&self) -> Result<()> {
        self.sync.click(self.sel.state_clear).await?;
        Ok(())
    }

    pub async fn submit(&self) -> Result<()> {
        let path = self.sync.click(self.sel.submit).await?;
        debug!(?path, "practice form submitted");
        Ok(())
    }

    pub async fn fill_student_registration_form(&self, form: &RegistrationForm) -> Result<()> {
        info!(
            student = %form.personal_info.full_name(),
            "filling student registration form"
        );
        self.fill_personal_info(&form.personal_info).await?;
        self.set_date_of_birth(&form.date_of_birth).await?;
        self.select_subjects(&form.subjects).await?;
        self.select_hobbies(&form.hobbies).await?;
        if let Some(picture) = &form.picture {
            self.upload_picture(picture).await?;
        }
        self.fill_address(&form.address).await?;
        self.submit().await
    }

    pub async fn is_confirmation_visible(&self) -> Result<bool> {
        self.sync.is_visible(self.sel.modal).await
    }

    /// Label/value pairs of the submission modal.
    pub async fn confirmation(&self) -> Result<Vec<(String, String)>> {
        let rows = self
            .sync
            .table_data(self.sel.modal, self.sel.modal_rows, self.sel.modal_cells)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let mut cells = row.into_iter();
                Some((cells.next()?, cells.next().unwrap_or_default()))
            })
            .collect())
    }

    pub async fn confirmation_value(&self, label: &str) -> Result<Option<String>> {
        Ok(self
            .confirmation()
            .await?
            .into_iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::fixtures;
    use crate::testing::MockDriver;

    #[tokio::test(start_paused = true)]
    async fn registration_form_reaches_confirmation() {
        let mock = MockDriver::new();
        let dob = fixtures::date_of_birth();
        mock.practice_form(&dob);
        let page = FormsPage::new(mock.synchronizer());
        let form = fixtures::registration_form(&Config::default());

        page.fill_student_registration_form(&form).await.unwrap();

        assert!(page.is_confirmation_visible().await.unwrap());
        let confirmation = page.confirmation().await.unwrap();
        assert!(confirmation
            .iter()
            .any(|(label, value)| label == "Student Name" && value == "John Doe"));
        assert_eq!(
            page.confirmation_value("Student Email").await.unwrap().as_deref(),
            Some("john.doe@example.com")
        );
        assert_eq!(
            page.confirmation_value("Date of Birth").await.unwrap().as_deref(),
            Some("15 July,1990")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn personal_info_removes_banner_and_clicks_radio_through_dom() {
        let mock = MockDriver::new();
        mock.practice_form(&fixtures::date_of_birth());
        mock.element(FORMS.ad_banner);
        mock.existing(FORMS.gender_male).blocked_by("label");
        let page = FormsPage::new(mock.synchronizer());

        page.fill_personal_info(&fixtures::personal_info())
            .await
            .unwrap();

        assert!(!mock.has_element(FORMS.ad_banner));
        assert_eq!(mock.calls("dom_click"), 1);
        assert_eq!(mock.clicks_on(FORMS.gender_male), 1);
        assert_eq!(mock.value_of(FORMS.mobile), "1234567890");
    }

    #[tokio::test(start_paused = true)]
    async fn date_of_birth_uses_zero_based_month_value() {
        let mock = MockDriver::new();
        let dob = fixtures::date_of_birth();
        mock.practice_form(&dob);
        let page = FormsPage::new(mock.synchronizer());

        page.set_date_of_birth(&dob).await.unwrap();

        assert_eq!(mock.value_of(FORMS.month_select), "6");
        assert_eq!(mock.value_of(FORMS.year_select), "1990");
        assert_eq!(mock.clicks_on(&dob.day_selector()), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn subjects_wait_for_suggestions_before_enter() {
        let mock = MockDriver::new();
        mock.element(FORMS.subjects);
        let page = FormsPage::new(mock.synchronizer());
        let started = tokio::time::Instant::now();

        page.select_subjects(&fixtures::subjects()).await.unwrap();

        assert_eq!(mock.keys_pressed(), vec!["Enter"; 3]);
        assert!(started.elapsed() >= SUGGESTION_DELAY * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn hobbies_are_checked() {
        let mock = MockDriver::new();
        mock.practice_form(&fixtures::date_of_birth());
        let page = FormsPage::new(mock.synchronizer());

        page.select_hobbies(&[Hobby::Sports, Hobby::Music])
            .await
            .unwrap();

        assert!(mock.is_checked(FORMS.hobby_sports));
        assert!(!mock.is_checked(FORMS.hobby_reading));
        assert!(mock.is_checked(FORMS.hobby_music));
    }
}

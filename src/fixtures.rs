//! Literal input records used by the scenarios.

use crate::core::Config;
use chrono::Month;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const UPLOAD_FILE_NAME: &str = "sample.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hobby {
    Sports,
    Reading,
    Music,
}

impl fmt::Display for Hobby {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Hobby::Sports => "Sports",
            Hobby::Reading => "Reading",
            Hobby::Music => "Music",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
    pub mobile: String,
}

impl PersonalInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// `month` is the value of the datepicker's month `<select>`, which counts
/// from zero: 6 is July.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOfBirth {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl DateOfBirth {
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month + 1)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or("", |m| m.name())
    }

    pub fn month_value(&self) -> String {
        self.month.to_string()
    }

    pub fn year_value(&self) -> String {
        self.year.to_string()
    }

    /// Day cell inside the open month, excluding the greyed days of the
    /// neighbouring months.
    pub fn day_selector(&self) -> String {
        format!(
            ".react-datepicker__day--{:03}:not(.react-datepicker__day--outside-month)",
            self.day
        )
    }

    /// How the input shows the picked date, e.g. `15 Jul 1990`.
    pub fn input_format(&self) -> String {
        let month = self.month_name();
        format!("{:02} {} {}", self.day, month.get(..3).unwrap_or(month), self.year)
    }

    /// How the submission modal renders the date, e.g. `15 July,1990`.
    pub fn modal_format(&self) -> String {
        format!("{:02} {},{}", self.day, self.month_name(), self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub current: String,
    pub state: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub email: String,
    pub salary: u32,
    pub department: String,
}

impl TableRecord {
    /// Cell order of the web table: first name, last name, age, email,
    /// salary, department.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.first_name.clone(),
            self.last_name.clone(),
            self.age.to_string(),
            self.email.clone(),
            self.salary.to_string(),
            self.department.clone(),
        ]
    }

    pub fn matches_row(&self, row: &[String]) -> bool {
        let expected = self.cells();
        row.len() >= expected.len() && row.iter().zip(&expected).all(|(a, b)| a == b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBoxRecord {
    pub full_name: String,
    pub email: String,
    pub current_address: String,
    pub permanent_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub personal_info: PersonalInfo,
    pub date_of_birth: DateOfBirth,
    pub subjects: Vec<String>,
    pub hobbies: Vec<Hobby>,
    pub picture: Option<PathBuf>,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicProperties {
    pub enable_after_secs: u64,
    pub color_change_class: String,
    pub visible_after_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionData {
    pub sortable_items: Vec<String>,
    pub grid_items: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn personal_info() -> PersonalInfo {
    PersonalInfo {
        first_name: "John".into(),
        last_name: "Doe".into(),
        email: "john.doe@example.com".into(),
        gender: Gender::Male,
        mobile: "1234567890".into(),
    }
}

pub fn date_of_birth() -> DateOfBirth {
    DateOfBirth {
        day: 15,
        month: 6,
        year: 1990,
    }
}

pub fn subjects() -> Vec<String> {
    owned(&["Maths", "English", "Computer Science"])
}

pub fn hobbies() -> Vec<Hobby> {
    vec![Hobby::Sports, Hobby::Reading, Hobby::Music]
}

pub fn address() -> Address {
    Address {
        current: "123 Test Street, Test City".into(),
        state: "NCR".into(),
        city: "Delhi".into(),
    }
}

pub fn table_record() -> TableRecord {
    TableRecord {
        first_name: "Jane".into(),
        last_name: "Smith".into(),
        age: 28,
        email: "jane.smith@example.com".into(),
        salary: 45000,
        department: "HR".into(),
    }
}

pub fn text_box_data() -> TextBoxRecord {
    TextBoxRecord {
        full_name: "John Doe".into(),
        email: "john.doe@example.com".into(),
        current_address: "123 Current St, Test City".into(),
        permanent_address: "456 Permanent Ave, Test City".into(),
    }
}

pub fn upload_file_path(config: &Config) -> PathBuf {
    config.fixture_path(UPLOAD_FILE_NAME)
}

pub fn registration_form(config: &Config) -> RegistrationForm {
    RegistrationForm {
        personal_info: personal_info(),
        date_of_birth: date_of_birth(),
        subjects: subjects(),
        hobbies: hobbies(),
        picture: Some(upload_file_path(config)),
        address: address(),
    }
}

pub fn colors() -> Vec<String> {
    owned(&[
        "Red", "Blue", "Green", "Yellow", "Purple", "Black", "White", "Orange",
    ])
}

/// Nav menu entries from a top-level item down to a leaf; each opens the
/// next on hover.
pub fn menu_path() -> Vec<String> {
    owned(&["Main Item 2", "SUB SUB LIST »", "Sub Sub Item 1"])
}

pub fn dynamic_properties() -> DynamicProperties {
    DynamicProperties {
        enable_after_secs: 5,
        color_change_class: "text-danger".into(),
        visible_after_secs: 5,
    }
}

pub fn interaction_data() -> InteractionData {
    InteractionData {
        sortable_items: owned(&["One", "Two", "Three", "Four", "Five", "Six"]),
        grid_items: owned(&[
            "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_select_value_is_zero_based() {
        let dob = date_of_birth();
        assert_eq!(dob.month_value(), "6");
        assert_eq!(dob.month_name(), "July");
        assert_eq!(dob.modal_format(), "15 July,1990");
        assert_eq!(dob.input_format(), "15 Jul 1990");
    }

    #[test]
    fn day_selector_pads_and_skips_outside_days() {
        let dob = DateOfBirth {
            day: 5,
            month: 0,
            year: 2000,
        };
        assert_eq!(
            dob.day_selector(),
            ".react-datepicker__day--005:not(.react-datepicker__day--outside-month)"
        );
        assert_eq!(dob.modal_format(), "05 January,2000");
    }

    #[test]
    fn out_of_range_month_has_no_name() {
        let dob = DateOfBirth {
            day: 1,
            month: 12,
            year: 2000,
        };
        assert_eq!(dob.month_name(), "");
    }

    #[test]
    fn table_record_matches_rendered_row() {
        let record = table_record();
        let row = owned(&["Jane", "Smith", "28", "jane.smith@example.com", "45000", "HR", ""]);
        assert!(record.matches_row(&row));
        assert!(!record.matches_row(&row[..3]));
    }

    #[test]
    fn registration_form_points_at_fixture_dir() {
        let form = registration_form(&Config::default());
        assert_eq!(form.picture, Some(PathBuf::from("testdata/sample.jpg")));
        assert_eq!(form.personal_info.full_name(), "John Doe");
    }
}

//! One facade per application section.
//!
//! Each page object pairs a `static` selector catalog with a [`Synchronizer`]
//! and exposes the section's user-level actions. Page objects hold no other
//! state; composite actions run step by step and stop at the first failure.
//!
//! [`Synchronizer`]: crate::sync::Synchronizer

pub mod alerts;
pub mod elements;
pub mod forms;
pub mod home;
pub mod interactions;
pub mod widgets;

pub use alerts::{AlertsFramesWindowsPage, ALERTS};
pub use elements::{ElementsPage, ELEMENTS};
pub use forms::{FormsPage, FORMS};
pub use home::{HomePage, HOME};
pub use interactions::{InteractionsPage, INTERACTIONS};
pub use widgets::{WidgetsPage, WIDGETS};

/// Sidebar entry `item` inside the menu group titled `group`.
pub fn menu_item(group: &str, item: &str) -> String {
    format!(r#".element-group:has-text("{}") >> text={}"#, group, item)
}

/// Nth match of `selector`, counting from zero.
pub fn nth(selector: &str, index: usize) -> String {
    format!("{} >> nth={}", selector, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Selector;

    #[test]
    fn menu_items_parse_into_two_parts() {
        let raw = menu_item("Elements", "Web Tables");
        let selector = Selector::parse(&raw).unwrap();
        assert_eq!(selector.parts().len(), 2);
    }

    #[test]
    fn nth_matches_selector_nth() {
        let built = Selector::parse("[title=\"Edit\"]").unwrap().nth(1);
        assert_eq!(nth("[title=\"Edit\"]", 1), built.to_string());
    }
}

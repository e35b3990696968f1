use crate::core::BrowserDriver;
use crate::errors::Result;
use crate::sync::{Synchronizer, WaitState};

pub struct HomeSelectors {
    pub cards: &'static str,
    pub card_titles: &'static str,
    pub elements_card: &'static str,
    pub forms_card: &'static str,
    pub alerts_card: &'static str,
    pub widgets_card: &'static str,
    pub interactions_card: &'static str,
    pub banner: &'static str,
}

pub static HOME: HomeSelectors = HomeSelectors {
    cards: ".category-cards .card",
    card_titles: ".category-cards .card h5",
    elements_card: r#"div.card:has-text("Elements")"#,
    forms_card: r#"div.card:has-text("Forms")"#,
    alerts_card: r#"div.card:has-text("Alerts, Frame & Windows")"#,
    widgets_card: r#"div.card:has-text("Widgets")"#,
    interactions_card: r#"div.card:has-text("Interactions")"#,
    banner: ".home-banner a img",
};

pub const CARD_TITLES: [&str; 6] = [
    "Elements",
    "Forms",
    "Alerts, Frame & Windows",
    "Widgets",
    "Interactions",
    "Book Store Application",
];

pub struct HomePage<D: BrowserDriver> {
    sync: Synchronizer<D>,
    sel: &'static HomeSelectors,
}

impl<D: BrowserDriver> HomePage<D> {
    pub fn new(sync: Synchronizer<D>) -> Self {
        Self { sync, sel: &HOME }
    }

    pub fn selectors(&self) -> &'static HomeSelectors {
        self.sel
    }

    pub fn sync(&self) -> &Synchronizer<D> {
        &self.sync
    }

    pub async fn open(&self) -> Result<()> {
        self.sync.navigate("/").await
    }

    pub async fn click_elements_card(&self) -> Result<()> {
        self.sync.click(self.sel.elements_card).await.map(drop)
    }

    pub async fn click_forms_card(&self) -> Result<()> {
        self.sync.click(self.sel.forms_card).await.map(drop)
    }

    pub async fn click_alerts_card(&self) -> Result<()> {
        self.sync.click(self.sel.alerts_card).await.map(drop)
    }

    pub async fn click_widgets_card(&self) -> Result<()> {
        self.sync.click(self.sel.widgets_card).await.map(drop)
    }

    pub async fn click_interactions_card(&self) -> Result<()> {
        self.sync.click(self.sel.interactions_card).await.map(drop)
    }

    /// Clicks the training banner and returns the page it opens.
    pub async fn open_banner(&self) -> Result<D::Page> {
        self.sync.click_and_wait_for_new_page(self.sel.banner).await
    }

    pub async fn card_titles(&self) -> Result<Vec<String>> {
        self.sync
            .wait_for(self.sel.cards, WaitState::Visible, None)
            .await?;
        self.sync.all_text_contents(self.sel.card_titles).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Effect, MockDriver};

    #[tokio::test(start_paused = true)]
    async fn card_click_navigates_once_visible() {
        let mock = MockDriver::new();
        mock.element(HOME.forms_card)
            .visible_after(std::time::Duration::from_millis(300))
            .on_click(Effect::navigate("https://demoqa.com/forms"));
        let home = HomePage::new(mock.synchronizer());

        home.open().await.unwrap();
        home.click_forms_card().await.unwrap();
        assert_eq!(
            home.sync().current_url().await.unwrap(),
            "https://demoqa.com/forms"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn banner_opens_a_new_page() {
        let mock = MockDriver::new();
        mock.element(HOME.banner)
            .on_click(Effect::new_page("https://www.toolsqa.com/selenium-training/"));
        let home = HomePage::new(mock.synchronizer());

        let page = home.open_banner().await.unwrap();
        assert_eq!(
            mock.url_of(&page).as_deref(),
            Some("https://www.toolsqa.com/selenium-training/")
        );
        assert_eq!(mock.open_page_ids().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn lists_card_titles() {
        let mock = MockDriver::new();
        mock.element(HOME.cards).count(6);
        mock.element(HOME.card_titles).texts(&CARD_TITLES);
        let home = HomePage::new(mock.synchronizer());

        assert_eq!(home.card_titles().await.unwrap(), CARD_TITLES);
    }
}

use crate::core::{BrowserDriver, Config};
use crate::errors::Result;
use crate::pages::{
    AlertsFramesWindowsPage, ElementsPage, FormsPage, HomePage, InteractionsPage, WidgetsPage,
};
use crate::sync::Synchronizer;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Live browser context for one scenario: the driver, the page the scenario
/// starts on, and the settings every synchronizer built from it shares.
pub struct Session<D: BrowserDriver> {
    id: String,
    driver: Arc<D>,
    config: Arc<Config>,
    main: D::Page,
}

impl<D: BrowserDriver> Session<D> {
    /// Launches the driver and opens the main page.
    pub async fn start(mut driver: D, config: Arc<Config>) -> Result<Self> {
        driver.launch(&config.browser).await?;
        let main = driver.new_page().await?;
        let session = Self::attach(Arc::new(driver), main, config);
        info!(session = %session.id, "session started");
        Ok(session)
    }

    /// Wraps an already running driver and page.
    pub fn attach(driver: Arc<D>, main: D::Page, config: Arc<Config>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            driver,
            config,
            main,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn main_page(&self) -> &D::Page {
        &self.main
    }

    pub fn sync(&self) -> Synchronizer<D> {
        Synchronizer::new(
            Arc::clone(&self.driver),
            self.main.clone(),
            Arc::clone(&self.config),
        )
    }

    pub fn on_page(&self, page: D::Page) -> Synchronizer<D> {
        self.sync().for_page(page)
    }

    pub fn home(&self) -> HomePage<D> {
        HomePage::new(self.sync())
    }

    pub fn elements(&self) -> ElementsPage<D> {
        ElementsPage::new(self.sync())
    }

    pub fn forms(&self) -> FormsPage<D> {
        FormsPage::new(self.sync())
    }

    pub fn alerts(&self) -> AlertsFramesWindowsPage<D> {
        AlertsFramesWindowsPage::new(self.sync())
    }

    pub fn widgets(&self) -> WidgetsPage<D> {
        WidgetsPage::new(self.sync())
    }

    pub fn interactions(&self) -> InteractionsPage<D> {
        InteractionsPage::new(self.sync())
    }

    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        self.driver.screenshot(&self.main).await
    }

    /// Closes every page and, when no synchronizer outlives the session, the
    /// browser itself.
    pub async fn close(self) -> Result<()> {
        for page in self.driver.pages().await.unwrap_or_default() {
            if let Err(err) = self.driver.close_page(&page).await {
                debug!(session = %self.id, error = %err, "page already gone");
            }
        }

        match Arc::try_unwrap(self.driver) {
            Ok(mut driver) => driver.close().await?,
            Err(_) => warn!(session = %self.id, "driver still shared, leaving browser open"),
        }
        info!(session = %self.id, "session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDriver;

    #[tokio::test(start_paused = true)]
    async fn page_objects_share_the_main_page() {
        let mock = MockDriver::new();
        let session = Session::start(mock.clone(), Arc::new(Config::default()))
            .await
            .unwrap();

        session.forms().open().await.unwrap();
        assert_eq!(
            session.sync().current_url().await.unwrap(),
            "https://demoqa.com/automation-practice-form"
        );
        assert_eq!(
            mock.url_of(session.main_page()).as_deref(),
            Some("https://demoqa.com/automation-practice-form")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn close_shuts_the_driver_down() {
        let mock = MockDriver::new();
        let session = Session::start(mock.clone(), Arc::new(Config::default()))
            .await
            .unwrap();
        assert_eq!(session.id().len(), 36);

        session.close().await.unwrap();

        assert!(!mock.is_running());
        assert!(mock.open_page_ids().is_empty());
    }
}

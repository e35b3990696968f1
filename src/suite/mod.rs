//! Declarative scenarios and the runner that executes them.
//!
//! Scenarios are tagged with a [`Tier`] and the application [`Section`] they
//! exercise. The runner gives each one a fresh [`Session`](crate::browser::Session),
//! bounds it with the scenario timeout, retries it as configured, and collects
//! a [`SuiteReport`].

pub mod regression;
pub mod registry;
pub mod runner;
pub mod scenario;
pub mod smoke;

pub use registry::{ScenarioFilter, ScenarioRegistry, Tag};
pub use runner::{Runner, ScenarioReport, ScenarioStatus, SessionFactory, SuiteReport};
pub use scenario::{FnScenario, Scenario, ScenarioFuture};

use crate::browser::Session;
use crate::core::BrowserDriver;
use crate::errors::{E2eError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// The fast critical path.
    Smoke,
    Regression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Home,
    Elements,
    Forms,
    Alerts,
    Widgets,
    Interactions,
}

impl Tier {
    pub const ALL: [Tier; 2] = [Tier::Smoke, Tier::Regression];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Smoke => "smoke",
            Tier::Regression => "regression",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| E2eError::UnknownTarget(format!("tier '{}'", raw)))
    }
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Home,
        Section::Elements,
        Section::Forms,
        Section::Alerts,
        Section::Widgets,
        Section::Interactions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Elements => "elements",
            Section::Forms => "forms",
            Section::Alerts => "alerts",
            Section::Widgets => "widgets",
            Section::Interactions => "interactions",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| E2eError::UnknownTarget(format!("section '{}'", raw)))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opens the home page and follows the card for `section`, letting the
/// network go quiet before and after the click.
pub async fn enter_section<D: BrowserDriver>(session: &Session<D>, section: Section) -> Result<()> {
    let home = session.home();
    home.open().await?;
    home.sync().wait_for_network_idle(None).await?;
    match section {
        Section::Home => return Ok(()),
        Section::Elements => home.click_elements_card().await?,
        Section::Forms => home.click_forms_card().await?,
        Section::Alerts => home.click_alerts_card().await?,
        Section::Widgets => home.click_widgets_card().await?,
        Section::Interactions => home.click_interactions_card().await?,
    }
    home.sync().wait_for_network_idle(None).await
}

/// Plain value checks inside scenarios fail the same way `expect` does.
pub(crate) fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::Assertion(message()))
    }
}

/// Every built-in scenario, smoke tier first.
pub fn default_registry<D: BrowserDriver>() -> ScenarioRegistry<D> {
    let mut registry = ScenarioRegistry::new();
    smoke::register(&mut registry);
    regression::register(&mut registry);
    registry
}

use super::{Section, Tier};
use crate::browser::Session;
use crate::core::BrowserDriver;
use crate::errors::Result;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

pub type ScenarioFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// One end-to-end test case.
#[async_trait]
pub trait Scenario<D: BrowserDriver>: Send + Sync {
    fn name(&self) -> &str;

    fn tier(&self) -> Tier;

    fn section(&self) -> Section;

    async fn run(&self, session: &Session<D>) -> Result<()>;
}

/// A scenario backed by a plain async function.
pub struct FnScenario<D: BrowserDriver> {
    name: String,
    tier: Tier,
    section: Section,
    body: Box<dyn for<'a> Fn(&'a Session<D>) -> ScenarioFuture<'a> + Send + Sync>,
}

impl<D: BrowserDriver> FnScenario<D> {
    pub fn new<F>(name: &str, tier: Tier, section: Section, body: F) -> Self
    where
        F: for<'a> Fn(&'a Session<D>) -> ScenarioFuture<'a> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            tier,
            section,
            body: Box::new(body),
        }
    }
}

#[async_trait]
impl<D: BrowserDriver> Scenario<D> for FnScenario<D> {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> Tier {
        self.tier
    }

    fn section(&self) -> Section {
        self.section
    }

    async fn run(&self, session: &Session<D>) -> Result<()> {
        (self.body)(session).await
    }
}

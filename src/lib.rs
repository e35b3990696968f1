//! Page Object Model end-to-end suite for <https://demoqa.com>.
//!
//! Scenarios talk to page objects, page objects talk to a [`Synchronizer`],
//! and the synchronizer talks to a [`BrowserDriver`]. Chrome drives the real
//! runs; [`testing::MockDriver`] stands in for it in unit tests.

pub mod browser;
pub mod core;
pub mod errors;
pub mod expect;
pub mod fixtures;
pub mod pages;
pub mod suite;
pub mod sync;
pub mod testing;

#[cfg(feature = "chrome")]
pub use browser::{ChromeDriver, ChromeSessionFactory};
pub use browser::Session;
pub use crate::core::{BrowserDriver, Config, Selector};
pub use errors::{E2eError, Result};
pub use suite::{Runner, ScenarioFilter, SuiteReport};
pub use sync::{Synchronizer, WaitState};

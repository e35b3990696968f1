//! Concrete browser plumbing: the Chrome driver and the per-scenario session.

#[cfg(feature = "chrome")]
pub mod chrome;
#[cfg(feature = "chrome")]
mod scripts;
pub mod session;

#[cfg(feature = "chrome")]
pub use chrome::{ChromeDriver, ChromePage, ChromeSessionFactory};
pub use session::Session;

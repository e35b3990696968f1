use crate::errors::{E2eError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://demoqa.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub browser: BrowserConfig,
    pub timeouts: TimeoutConfig,
    pub retry: RetryConfig,
    pub settle: SettleConfig,
    pub runner: RunnerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub ignore_https_errors: bool,
    /// Pause after every mutating action.
    pub slow_mo_ms: u64,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Fallback for every bounded wait that does not pass its own timeout.
    pub default_ms: u64,
    /// Bound used by `is_visible` style probes.
    pub probe_ms: u64,
    pub action_ms: u64,
    pub navigation_ms: u64,
    pub expect_ms: u64,
    pub scenario_ms: u64,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub click_attempts: u32,
    pub backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    pub quiet_window_ms: u64,
    pub overlay_selectors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub workers: usize,
    pub retries: u32,
    pub screenshot_on_failure: bool,
    pub report_path: Option<PathBuf>,
    pub fixtures_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: BrowserConfig::default(),
            timeouts: TimeoutConfig::default(),
            retry: RetryConfig::default(),
            settle: SettleConfig::default(),
            runner: RunnerConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            user_agent: None,
            ignore_https_errors: true,
            slow_mo_ms: 100,
            args: vec![],
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_ms: 10_000,
            probe_ms: 5_000,
            action_ms: 20_000,
            navigation_ms: 30_000,
            expect_ms: 15_000,
            scenario_ms: 120_000,
            poll_interval_ms: 100,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            click_attempts: 3,
            backoff_ms: 500,
        }
    }
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            quiet_window_ms: 500,
            overlay_selectors: vec![
                "#fixedban".to_string(),
                "#adplus-anchor".to_string(),
                "iframe[id^='google_ads_iframe']".to_string(),
                "footer".to_string(),
            ],
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            retries: 1,
            screenshot_on_failure: true,
            report_path: None,
            fixtures_dir: PathBuf::from("testdata"),
        }
    }
}

impl TimeoutConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_ms)
    }

    pub fn probe(&self) -> Duration {
        Duration::from_millis(self.probe_ms)
    }

    pub fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn expect(&self) -> Duration {
        Duration::from_millis(self.expect_ms)
    }

    pub fn scenario(&self) -> Duration {
        Duration::from_millis(self.scenario_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Config {
    /// Reads a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults (or the given file) with environment overrides applied.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// `CI` switches to the serial, retry-twice profile; `DEMOQA_BASE_URL` and
    /// `DEMOQA_HEADLESS` override the target and window mode.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup("CI").is_some_and(|v| !v.is_empty()) {
            self.runner.workers = 1;
            self.runner.retries = 2;
        }

        if let Some(base_url) = lookup("DEMOQA_BASE_URL") {
            self.base_url = base_url;
        }

        if let Some(headless) = lookup("DEMOQA_HEADLESS") {
            self.browser.headless = match headless.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(E2eError::Configuration(format!(
                        "DEMOQA_HEADLESS must be a boolean, got '{}'",
                        other
                    )))
                }
            };
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url).map_err(|e| {
            E2eError::Configuration(format!("invalid base_url '{}': {}", self.base_url, e))
        })?;

        if self.runner.workers == 0 {
            return Err(E2eError::Configuration(
                "runner.workers must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolves `/forms` style paths against the base URL; absolute URLs pass through.
    pub fn resolve_url(&self, path_or_url: &str) -> Result<String> {
        let base = url::Url::parse(&self.base_url)
            .map_err(|e| E2eError::Configuration(e.to_string()))?;
        base.join(path_or_url)
            .map(|u| u.to_string())
            .map_err(|e| E2eError::NavigationFailed(format!("{}: {}", path_or_url, e)))
    }

    pub fn fixture_path(&self, name: &str) -> PathBuf {
        self.runner.fixtures_dir.join(name)
    }
}

use super::scenario::Scenario;
use super::{Section, Tier};
use crate::browser::Session;
use crate::core::{BrowserDriver, Config};
use crate::errors::{E2eError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};

/// Creates the isolated session each scenario attempt runs in.
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    type Driver: BrowserDriver;

    async fn create(&self, config: Arc<Config>) -> Result<Session<Self::Driver>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    /// Failed at least once, then passed on a retry.
    Flaky,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub tier: Tier,
    pub section: Section,
    pub status: ScenarioStatus,
    pub attempts: u32,
    pub duration_ms: u64,
    pub session_id: Option<String>,
    /// Error of the last failed attempt.
    pub error: Option<String>,
    /// Base64 PNG taken when the last failed attempt ended.
    pub screenshot: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub workers: usize,
    pub passed: usize,
    pub flaky: usize,
    pub failed: usize,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// One line per scenario, in the order they were selected.
    pub fn lines(&self) -> Vec<String> {
        self.scenarios
            .iter()
            .map(|s| {
                let mark = match s.status {
                    ScenarioStatus::Passed => "ok",
                    ScenarioStatus::Flaky => "flaky",
                    ScenarioStatus::Failed => "FAILED",
                };
                let mut line = format!(
                    "[{}] {} > {} ... {} ({}ms)",
                    s.tier, s.section, s.name, mark, s.duration_ms
                );
                if let Some(err) = &s.error {
                    if s.status == ScenarioStatus::Failed {
                        line.push_str(&format!("\n    {}", err));
                    }
                }
                line
            })
            .collect()
    }
}

struct Attempt {
    session_id: Option<String>,
    result: Result<()>,
    screenshot: Option<String>,
}

/// Runs scenarios in parallel up to the configured worker count, each on its
/// own session.
pub struct Runner<F: SessionFactory> {
    factory: Arc<F>,
    config: Arc<Config>,
}

impl<F: SessionFactory> Runner<F> {
    pub fn new(factory: Arc<F>, config: Config) -> Self {
        Self {
            factory,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self, scenarios: Vec<Arc<dyn Scenario<F::Driver>>>) -> SuiteReport {
        let workers = self.config.runner.workers.max(1);
        let started_at = Utc::now();
        let clock = Instant::now();
        info!(scenarios = scenarios.len(), workers, "suite started");

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut handles = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let semaphore = Arc::clone(&semaphore);
            let factory = Arc::clone(&self.factory);
            let config = Arc::clone(&self.config);
            let name = scenario.name().to_string();
            let (tier, section) = (scenario.tier(), scenario.section());

            let handle = tokio::spawn(async move {
                // The semaphore is never closed.
                let _permit = semaphore.acquire_owned().await.ok();
                run_scenario(factory.as_ref(), config, scenario.as_ref()).await
            });
            handles.push((name, tier, section, handle));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (name, tier, section, handle) in handles {
            let report = match handle.await {
                Ok(report) => report,
                Err(join_err) => {
                    error!(scenario = %name, error = %join_err, "scenario task panicked");
                    let now = Utc::now();
                    ScenarioReport {
                        name,
                        tier,
                        section,
                        status: ScenarioStatus::Failed,
                        attempts: 0,
                        duration_ms: 0,
                        session_id: None,
                        error: Some(join_err.to_string()),
                        screenshot: None,
                        started_at: now,
                        finished_at: now,
                    }
                }
            };
            reports.push(report);
        }

        let count = |status: ScenarioStatus| reports.iter().filter(|r| r.status == status).count();
        let (passed, flaky, failed) = (
            count(ScenarioStatus::Passed),
            count(ScenarioStatus::Flaky),
            count(ScenarioStatus::Failed),
        );
        let report = SuiteReport {
            started_at,
            finished_at: Utc::now(),
            duration_ms: clock.elapsed().as_millis() as u64,
            workers,
            passed,
            flaky,
            failed,
            scenarios: reports,
        };
        info!(
            passed = report.passed,
            flaky = report.flaky,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "suite finished"
        );
        report
    }
}

async fn run_scenario<F: SessionFactory>(
    factory: &F,
    config: Arc<Config>,
    scenario: &dyn Scenario<F::Driver>,
) -> ScenarioReport {
    let started_at = Utc::now();
    let clock = Instant::now();
    let max_attempts = config.runner.retries + 1;
    let mut last = None;
    let mut attempts = 0;

    for attempt in 1..=max_attempts {
        attempts = attempt;
        let outcome = run_attempt(factory, Arc::clone(&config), scenario, attempt).await;
        let passed = outcome.result.is_ok();
        last = Some(outcome);
        if passed {
            break;
        }
        if attempt < max_attempts {
            info!(scenario = scenario.name(), attempt, "retrying scenario");
        }
    }

    let status = match &last {
        Some(a) if a.result.is_ok() && attempts == 1 => ScenarioStatus::Passed,
        Some(a) if a.result.is_ok() => ScenarioStatus::Flaky,
        _ => ScenarioStatus::Failed,
    };
    let (session_id, error, screenshot) = match last {
        Some(a) => (a.session_id, a.result.err().map(|e| e.to_string()), a.screenshot),
        None => (None, None, None),
    };

    ScenarioReport {
        name: scenario.name().to_string(),
        tier: scenario.tier(),
        section: scenario.section(),
        status,
        attempts,
        duration_ms: clock.elapsed().as_millis() as u64,
        session_id,
        error,
        screenshot,
        started_at,
        finished_at: Utc::now(),
    }
}

async fn run_attempt<F: SessionFactory>(
    factory: &F,
    config: Arc<Config>,
    scenario: &dyn Scenario<F::Driver>,
    attempt: u32,
) -> Attempt {
    let session = match factory.create(Arc::clone(&config)).await {
        Ok(session) => session,
        Err(err) => {
            warn!(scenario = scenario.name(), attempt, error = %err, "session could not start");
            return Attempt {
                session_id: None,
                result: Err(err),
                screenshot: None,
            };
        }
    };

    let span = info_span!(
        "scenario",
        scenario = scenario.name(),
        session = session.id(),
        attempt
    );
    let limit = config.timeouts.scenario();
    let result = async {
        info!("scenario started");
        let result = match tokio::time::timeout(limit, scenario.run(&session)).await {
            Ok(result) => result,
            Err(_) => Err(E2eError::timeout(
                scenario.name(),
                "finished",
                limit.as_millis() as u64,
            )),
        };
        match &result {
            Ok(()) => info!("scenario passed"),
            Err(err) => warn!(error = %err, "scenario failed"),
        }
        result
    }
    .instrument(span)
    .await;

    let screenshot = if result.is_err() && config.runner.screenshot_on_failure {
        match session.screenshot().await {
            Ok(png) => Some(STANDARD.encode(png)),
            Err(err) => {
                warn!(error = %err, "failure screenshot not taken");
                None
            }
        }
    } else {
        None
    };

    let session_id = session.id().to_string();
    if let Err(err) = session.close().await {
        warn!(session = %session_id, error = %err, "session did not close cleanly");
    }

    Attempt {
        session_id: Some(session_id),
        result,
        screenshot,
    }
}

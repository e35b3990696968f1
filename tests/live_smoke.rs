//! Smoke tier against the live site. Needs Chrome and network access:
//! `cargo test --test live_smoke -- --ignored`

use demoqa_e2e::core::config::BrowserConfig;
use demoqa_e2e::suite::{self, Runner, ScenarioFilter, ScenarioStatus};
use demoqa_e2e::{BrowserDriver, ChromeDriver, ChromeSessionFactory, Config};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
#[ignore = "drives a real browser against demoqa.com"]
async fn smoke_tier_passes() {
    let config = Config::load(None).expect("config");
    let registry = suite::default_registry::<ChromeDriver>();
    let filter = ScenarioFilter::new(&["smoke".to_string()], None).unwrap();
    let selected = registry.select(&filter);
    assert!(!selected.is_empty());

    let runner = Runner::new(Arc::new(ChromeSessionFactory), config);
    let report = runner.run(selected).await;

    for line in report.lines() {
        println!("{}", line);
    }
    assert!(report.success(), "{} smoke scenario(s) failed", report.failed);
    assert!(report
        .scenarios
        .iter()
        .all(|s| s.status != ScenarioStatus::Failed));
}

// On a single-threaded runtime a timeout can only fire while navigation yields.
#[tokio::test(flavor = "current_thread")]
#[ignore = "drives a real browser against demoqa.com"]
async fn navigation_does_not_block_the_runtime() {
    let mut driver = ChromeDriver::new();
    driver
        .launch(&BrowserConfig::default())
        .await
        .expect("launch");
    let page = driver.new_page().await.expect("page");

    let outcome = tokio::time::timeout(
        Duration::from_millis(1),
        driver.navigate(&page, "https://demoqa.com/"),
    )
    .await;

    assert!(outcome.is_err(), "navigation finished without yielding");
    driver.close().await.expect("close");
}

//! Web-first assertions: each one re-queries the page until the expected
//! state shows up or the expect timeout runs out, then fails with
//! [`E2eError::Assertion`]. Assertions are never retried beyond their own
//! polling.

use crate::core::{BrowserDriver, ElementProbe, Selector};
use crate::errors::{E2eError, Result};
use crate::sync::wait::Deadline;
use crate::sync::Synchronizer;
use regex::Regex;
use std::future::Future;
use std::time::Duration;
use tracing::trace;

struct Check {
    pass: bool,
    actual: String,
}

pub struct Expectation<'a, D: BrowserDriver> {
    sync: &'a Synchronizer<D>,
    target: String,
    timeout: Duration,
}

pub struct PageExpectation<'a, D: BrowserDriver> {
    sync: &'a Synchronizer<D>,
    timeout: Duration,
}

impl<D: BrowserDriver> Synchronizer<D> {
    pub fn expect(&self, raw: &str) -> Expectation<'_, D> {
        Expectation {
            sync: self,
            target: raw.to_string(),
            timeout: self.config().timeouts.expect(),
        }
    }

    pub fn expect_page(&self) -> PageExpectation<'_, D> {
        PageExpectation {
            sync: self,
            timeout: self.config().timeouts.expect(),
        }
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn pattern(raw: &str) -> Result<Regex> {
    Regex::new(raw).map_err(|e| E2eError::Configuration(format!("bad pattern {}: {}", raw, e)))
}

async fn poll<F, Fut>(
    interval: Duration,
    timeout: Duration,
    target: &str,
    expectation: &str,
    mut check: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Check>>,
{
    let deadline = Deadline::new(timeout, interval);
    let mut last = String::from("nothing");

    loop {
        match check().await {
            Ok(c) if c.pass => {
                trace!(subject = target, expectation, "assertion passed");
                return Ok(());
            }
            Ok(c) => last = c.actual,
            Err(err) => last = err.to_string(),
        }

        if !deadline.tick().await {
            return Err(E2eError::Assertion(format!(
                "expected {} {} within {}ms, last saw {}",
                target,
                expectation,
                timeout.as_millis(),
                last
            )));
        }
    }
}

impl<'a, D: BrowserDriver> Expectation<'a, D> {
    pub fn within(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn check<F, Fut>(&self, expectation: &str, mut observe: F) -> Result<()>
    where
        F: FnMut(Selector) -> Fut,
        Fut: Future<Output = Result<Check>>,
    {
        let selector = self.sync.selector(&self.target)?;
        poll(
            self.sync.config().timeouts.poll_interval(),
            self.timeout,
            &self.target,
            expectation,
            || observe(selector.clone()),
        )
        .await
    }

    async fn probe_holds(&self, expectation: &str, holds: fn(&ElementProbe) -> bool) -> Result<()> {
        let sync = self.sync;
        self.check(expectation, |selector| async move {
            let probe = sync.driver().probe(sync.page(), &selector).await?;
            Ok(Check {
                pass: holds(&probe),
                actual: format!("{:?}", probe),
            })
        })
        .await
    }

    pub async fn to_be_visible(&self) -> Result<()> {
        self.probe_holds("to be visible", |p| p.visible).await
    }

    pub async fn to_be_hidden(&self) -> Result<()> {
        self.probe_holds("to be hidden", |p| !p.visible).await
    }

    pub async fn to_be_enabled(&self) -> Result<()> {
        self.probe_holds("to be enabled", |p| p.attached && p.enabled)
            .await
    }

    pub async fn to_be_disabled(&self) -> Result<()> {
        self.probe_holds("to be disabled", |p| p.attached && !p.enabled)
            .await
    }

    pub async fn to_have_count(&self, expected: usize) -> Result<()> {
        let sync = self.sync;
        self.check(&format!("to have count {}", expected), |selector| async move {
            let count = sync.driver().probe(sync.page(), &selector).await?.count;
            Ok(Check {
                pass: count == expected,
                actual: count.to_string(),
            })
        })
        .await
    }

    /// Whitespace-normalised text of the first match equals `expected`.
    pub async fn to_have_text(&self, expected: &str) -> Result<()> {
        let sync = self.sync;
        let expected = normalize(expected);
        let expected = expected.as_str();
        self.check(&format!("to have text {:?}", expected), |selector| async move {
            let text = sync
                .driver()
                .text_content(sync.page(), &selector)
                .await?
                .unwrap_or_default();
            let text = normalize(&text);
            Ok(Check {
                pass: text == expected,
                actual: format!("{:?}", text),
            })
        })
        .await
    }

    /// Some match contains `expected`.
    pub async fn to_contain_text(&self, expected: &str) -> Result<()> {
        self.texts_check(expected, true).await
    }

    /// No match contains `expected`; no match at all passes.
    pub async fn not_to_contain_text(&self, expected: &str) -> Result<()> {
        self.texts_check(expected, false).await
    }

    async fn texts_check(&self, expected: &str, present: bool) -> Result<()> {
        let sync = self.sync;
        let expectation = if present {
            format!("to contain text {:?}", expected)
        } else {
            format!("not to contain text {:?}", expected)
        };
        self.check(&expectation, |selector| async move {
            let texts = sync
                .driver()
                .all_text_contents(sync.page(), &selector)
                .await?;
            let found = texts.iter().any(|t| t.contains(expected));
            Ok(Check {
                pass: found == present,
                actual: format!("{:?}", texts),
            })
        })
        .await
    }

    /// `class` attribute of the first match matches the regex `class_pattern`.
    pub async fn to_have_class(&self, class_pattern: &str) -> Result<()> {
        self.class_check(class_pattern, true).await
    }

    pub async fn not_to_have_class(&self, class_pattern: &str) -> Result<()> {
        self.class_check(class_pattern, false).await
    }

    async fn class_check(&self, class_pattern: &str, present: bool) -> Result<()> {
        let sync = self.sync;
        let re = pattern(class_pattern)?;
        let re = &re;
        let expectation = if present {
            format!("to have class /{}/", class_pattern)
        } else {
            format!("not to have class /{}/", class_pattern)
        };
        self.check(&expectation, |selector| async move {
            let class = sync
                .driver()
                .attribute(sync.page(), &selector, "class")
                .await?
                .unwrap_or_default();
            Ok(Check {
                pass: re.is_match(&class) == present,
                actual: format!("class {:?}", class),
            })
        })
        .await
    }

    pub async fn to_have_value(&self, expected: &str) -> Result<()> {
        let sync = self.sync;
        self.check(&format!("to have value {:?}", expected), |selector| async move {
            let value = sync.driver().input_value(sync.page(), &selector).await?;
            Ok(Check {
                pass: value == expected,
                actual: format!("{:?}", value),
            })
        })
        .await
    }

    pub async fn to_have_attribute(&self, name: &str, expected: &str) -> Result<()> {
        let sync = self.sync;
        self.check(
            &format!("to have {}={:?}", name, expected),
            |selector| async move {
                let value = sync.driver().attribute(sync.page(), &selector, name).await?;
                Ok(Check {
                    pass: value.as_deref() == Some(expected),
                    actual: format!("{:?}", value),
                })
            },
        )
        .await
    }
}

impl<'a, D: BrowserDriver> PageExpectation<'a, D> {
    pub fn within(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn to_have_url(&self, url_pattern: &str) -> Result<()> {
        let sync = self.sync;
        let re = pattern(url_pattern)?;
        let re = &re;
        poll(
            sync.config().timeouts.poll_interval(),
            self.timeout,
            "page",
            &format!("to have url /{}/", url_pattern),
            || async move {
                let url = sync.current_url().await?;
                Ok(Check {
                    pass: re.is_match(&url),
                    actual: url,
                })
            },
        )
        .await
    }

    pub async fn to_have_title(&self, expected: &str) -> Result<()> {
        let sync = self.sync;
        poll(
            sync.config().timeouts.poll_interval(),
            self.timeout,
            "page",
            &format!("to have title {:?}", expected),
            || async move {
                let title = sync.title().await?;
                Ok(Check {
                    pass: title == expected,
                    actual: title,
                })
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Effect, MockDriver};
    use tokio::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test(start_paused = true)]
    async fn passes_once_the_state_appears() {
        let mock = MockDriver::new();
        mock.element("#resetButton")
            .visible_after(Duration::from_secs(3));
        let sync = mock.synchronizer();

        assert_ok!(sync.expect("#resetButton").to_be_visible().await);
    }

    #[tokio::test(start_paused = true)]
    async fn fails_as_assertion_after_the_expect_timeout() {
        let mock = MockDriver::new();
        mock.element("#section1Content").hidden();
        let sync = mock.synchronizer();
        let started = Instant::now();

        let err = assert_err!(sync.expect("#section1Content").to_be_visible().await);
        assert!(err.is_assertion());
        assert_eq!(started.elapsed(), sync.config().timeouts.expect());
    }

    #[tokio::test(start_paused = true)]
    async fn class_patterns_are_regexes() {
        let mock = MockDriver::new();
        mock.element("#droppable")
            .classes("drop-box ui-droppable ui-state-highlight");
        let sync = mock.synchronizer();

        assert_ok!(sync.expect("#droppable").to_have_class("ui-state-highlight").await);
        let err = assert_err!(
            sync.expect("#droppable")
                .within(Duration::from_millis(300))
                .not_to_have_class("highlight$")
                .await
        );
        assert!(err.is_assertion());
        assert!(assert_err!(sync.expect("#droppable").to_have_class("(").await)
            .to_string()
            .contains("bad pattern"));
    }

    #[tokio::test(start_paused = true)]
    async fn text_disappears_after_removal() {
        let mock = MockDriver::new();
        mock.element(".auto-complete__multi-value__remove")
            .on_click(Effect::remove(".auto-complete__multi-value").after(Duration::from_millis(200)));
        mock.element(".auto-complete__multi-value")
            .texts(&["Red", "Blue"]);
        let sync = mock.synchronizer();

        assert_ok!(sync.expect(".auto-complete__multi-value").to_contain_text("Blue").await);
        sync.click(".auto-complete__multi-value__remove").await.unwrap();
        assert_ok!(
            sync.expect(".auto-complete__multi-value")
                .not_to_contain_text("Red")
                .await
        );
    }

    #[tokio::test(start_paused = true)]
    async fn text_is_whitespace_normalised() {
        let mock = MockDriver::new();
        mock.element("#name").text("  Name:John\n  Doe ");
        let sync = mock.synchronizer();

        assert_ok!(sync.expect("#name").to_have_text("Name:John Doe").await);
    }

    #[tokio::test(start_paused = true)]
    async fn count_value_and_attribute() {
        let mock = MockDriver::new();
        mock.element(".grid-container .list-group-item").count(9);
        mock.element("#oldSelectMenu").value("3");
        mock.element(".progress-bar").attr("aria-valuenow", "100");
        let sync = mock.synchronizer();

        assert_ok!(sync.expect(".grid-container .list-group-item").to_have_count(9).await);
        assert_ok!(sync.expect("#oldSelectMenu").to_have_value("3").await);
        assert_ok!(
            sync.expect(".progress-bar")
                .to_have_attribute("aria-valuenow", "100")
                .await
        );
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_tab_is_detected() {
        let mock = MockDriver::new();
        mock.element("#demo-tab-more").disabled();
        let sync = mock.synchronizer();

        assert_ok!(sync.expect("#demo-tab-more").to_be_disabled().await);
    }

    #[tokio::test(start_paused = true)]
    async fn page_url_is_matched_by_pattern() {
        let mock = MockDriver::new();
        mock.element("#item-0").on_click(
            Effect::navigate("https://demoqa.com/text-box").after(Duration::from_millis(500)),
        );
        let sync = mock.synchronizer();

        sync.click("#item-0").await.unwrap();
        assert_ok!(sync.expect_page().to_have_url(r"/text-box$").await);
        assert_ok!(sync.expect_page().to_have_title("DEMOQA").await);
    }
}

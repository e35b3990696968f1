use super::scenario::Scenario;
use super::{Section, Tier};
use crate::core::BrowserDriver;
use crate::errors::{E2eError, Result};
use regex::Regex;
use std::sync::Arc;

/// A `--tag` value: either a tier or a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Tier(Tier),
    Section(Section),
}

impl Tag {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim().trim_start_matches('@');
        Tier::parse(raw)
            .map(Tag::Tier)
            .or_else(|_| Section::parse(raw).map(Tag::Section))
            .map_err(|_| E2eError::UnknownTarget(format!("tag '{}'", raw)))
    }
}

/// Selects scenarios by tag and by a pattern over their names. Every given
/// tag must match.
#[derive(Debug, Clone, Default)]
pub struct ScenarioFilter {
    pub tags: Vec<Tag>,
    pub grep: Option<Regex>,
}

impl ScenarioFilter {
    pub fn new(tags: &[String], grep: Option<&str>) -> Result<Self> {
        let tags = tags
            .iter()
            .map(|t| Tag::parse(t))
            .collect::<Result<Vec<_>>>()?;
        let grep = grep
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    E2eError::Configuration(format!("bad --grep pattern '{}': {}", pattern, e))
                })
            })
            .transpose()?;
        Ok(Self { tags, grep })
    }

    pub fn matches<D: BrowserDriver>(&self, scenario: &dyn Scenario<D>) -> bool {
        let tagged = self.tags.iter().all(|tag| match tag {
            Tag::Tier(tier) => scenario.tier() == *tier,
            Tag::Section(section) => scenario.section() == *section,
        });
        let named = self
            .grep
            .as_ref()
            .map_or(true, |re| re.is_match(scenario.name()));
        tagged && named
    }
}

pub struct ScenarioRegistry<D: BrowserDriver> {
    scenarios: Vec<Arc<dyn Scenario<D>>>,
}

impl<D: BrowserDriver> Default for ScenarioRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: BrowserDriver> ScenarioRegistry<D> {
    pub fn new() -> Self {
        Self {
            scenarios: Vec::new(),
        }
    }

    pub fn register<S: Scenario<D> + 'static>(&mut self, scenario: S) {
        self.scenarios.push(Arc::new(scenario));
    }

    pub fn all(&self) -> &[Arc<dyn Scenario<D>>] {
        &self.scenarios
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Scenario<D>>> {
        self.scenarios.iter().find(|s| s.name() == name).cloned()
    }

    /// Matching scenarios in registration order.
    pub fn select(&self, filter: &ScenarioFilter) -> Vec<Arc<dyn Scenario<D>>> {
        self.scenarios
            .iter()
            .filter(|s| filter.matches(s.as_ref()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::FnScenario;
    use crate::testing::MockDriver;

    fn registry() -> ScenarioRegistry<MockDriver> {
        let mut registry = ScenarioRegistry::new();
        for (name, tier, section) in [
            ("text box form", Tier::Smoke, Section::Elements),
            ("web table crud", Tier::Regression, Section::Elements),
            ("practice form", Tier::Smoke, Section::Forms),
        ] {
            registry.register(FnScenario::new(name, tier, section, |_| {
                Box::pin(async { Ok(()) })
            }));
        }
        registry
    }

    fn names(selected: &[Arc<dyn Scenario<MockDriver>>]) -> Vec<&str> {
        selected.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn tags_accept_tiers_and_sections() {
        assert_eq!(Tag::parse("@smoke").unwrap(), Tag::Tier(Tier::Smoke));
        assert_eq!(
            Tag::parse("interactions").unwrap(),
            Tag::Section(Section::Interactions)
        );
        assert!(Tag::parse("bookstore").is_err());
    }

    #[test]
    fn tags_combine_with_and() {
        let registry = registry();
        let filter =
            ScenarioFilter::new(&["smoke".to_string(), "elements".to_string()], None).unwrap();
        let selected = registry.select(&filter);
        assert_eq!(names(&selected), vec!["text box form"]);
    }

    #[test]
    fn grep_matches_names() {
        let registry = registry();
        let filter = ScenarioFilter::new(&[], Some("form$")).unwrap();
        let selected = registry.select(&filter);
        assert_eq!(names(&selected), vec!["text box form", "practice form"]);
    }

    #[test]
    fn empty_filter_selects_everything() {
        let registry = registry();
        assert_eq!(registry.select(&ScenarioFilter::default()).len(), 3);
        assert!(registry.get("web table crud").is_some());
    }

    #[test]
    fn bad_grep_is_a_configuration_error() {
        let err = ScenarioFilter::new(&[], Some("(")).unwrap_err();
        assert!(matches!(err, E2eError::Configuration(_)));
    }
}

//! Device role classification.
//!
//! Rules are evaluated in a fixed order and the first match wins. Declared
//! roles are checked against fixed keywords; model strings and names are
//! checked against the configurable pattern lists in [`ClassifierConfig`].

use crate::config::ClassifierConfig;
use crate::diagnostics::{MatchField, RuleMatch};
use crate::error::{Error, Result};
use crate::model::{DeviceCategory, DeviceRecord};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Tier-3 keyword matching must not fire on "access point", which rule 7 owns.
static ACCESS_POINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"access point").unwrap());

#[derive(Debug, Clone)]
struct PatternList {
    patterns: Vec<(String, Regex)>,
}

impl PatternList {
    fn compile(name: &str, sources: &[String]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(sources.len());
        for source in sources {
            let trimmed = source.trim();
            if trimmed.is_empty() {
                continue;
            }
            let regex = RegexBuilder::new(trimmed)
                .case_insensitive(true)
                .build()
                .map_err(|err| Error::Config(format!("{name}: {err}")))?;
            patterns.push((trimmed.to_string(), regex));
        }
        Ok(Self { patterns })
    }

    fn first_match(&self, haystack: &str) -> Option<&str> {
        if haystack.is_empty() {
            return None;
        }
        self.patterns
            .iter()
            .find(|(_, regex)| regex.is_match(haystack))
            .map(|(source, _)| source.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: DeviceCategory,
    /// `None` when no rule fired and the device fell through to `Other`.
    pub matched: Option<RuleMatch>,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    switch_family: PatternList,
    distribution: PatternList,
    access: PatternList,
    router: PatternList,
    firewall: PatternList,
    server: PatternList,
    wireless: PatternList,
    wireless_name: PatternList,
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            switch_family: PatternList::compile("switchFamilyTokens", &config.switch_family_tokens)?,
            distribution: PatternList::compile(
                "distributionModelTokens",
                &config.distribution_model_tokens,
            )?,
            access: PatternList::compile("accessModelTokens", &config.access_model_tokens)?,
            router: PatternList::compile("routerModelTokens", &config.router_model_tokens)?,
            firewall: PatternList::compile("firewallModelTokens", &config.firewall_model_tokens)?,
            server: PatternList::compile("serverModelTokens", &config.server_model_tokens)?,
            wireless: PatternList::compile("wirelessModelTokens", &config.wireless_model_tokens)?,
            wireless_name: PatternList::compile(
                "wirelessNameTokens",
                &config.wireless_name_tokens,
            )?,
        })
    }

    pub fn classify(&self, device: &DeviceRecord) -> DeviceCategory {
        self.explain(device).category
    }

    /// Classifies and reports which field and token decided the category.
    pub fn explain(&self, device: &DeviceRecord) -> Classification {
        let role = normalize(device.declared_role.as_deref());
        let model = normalize(device.model.as_deref());
        let name = normalize(Some(device.name.as_str()));

        let role_tier = ACCESS_POINT_RE.replace_all(&role, " ");
        let model_tier = ACCESS_POINT_RE.replace_all(&model, " ");

        if role.contains("core") {
            return hit(DeviceCategory::Core, MatchField::Role, "core");
        }
        if let Some(token) = self.switch_family.first_match(&model) {
            if model.contains("core") {
                return hit(DeviceCategory::Core, MatchField::Model, token);
            }
        }

        if role.contains("distribution") {
            return hit(DeviceCategory::Distribution, MatchField::Role, "distribution");
        }
        if let Some(token) = self.distribution.first_match(&model) {
            return hit(DeviceCategory::Distribution, MatchField::Model, token);
        }

        if role_tier.contains("access") {
            return hit(DeviceCategory::Access, MatchField::Role, "access");
        }
        if let Some(token) = self.access.first_match(&model_tier) {
            return hit(DeviceCategory::Access, MatchField::Model, token);
        }

        if role.contains("router") {
            return hit(DeviceCategory::Router, MatchField::Role, "router");
        }
        if let Some(token) = self.router.first_match(&model) {
            return hit(DeviceCategory::Router, MatchField::Model, token);
        }

        if role.contains("firewall") {
            return hit(DeviceCategory::Firewall, MatchField::Role, "firewall");
        }
        if let Some(token) = self.firewall.first_match(&model) {
            return hit(DeviceCategory::Firewall, MatchField::Model, token);
        }

        if role.contains("server") {
            return hit(DeviceCategory::Server, MatchField::Role, "server");
        }
        if let Some(token) = self.server.first_match(&model) {
            return hit(DeviceCategory::Server, MatchField::Model, token);
        }

        for keyword in ["wireless", "access point"] {
            if role.contains(keyword) {
                return hit(DeviceCategory::WirelessController, MatchField::Role, keyword);
            }
        }
        if let Some(token) = self.wireless.first_match(&model) {
            return hit(DeviceCategory::WirelessController, MatchField::Model, token);
        }
        if let Some(token) = self.wireless_name.first_match(&name) {
            return hit(DeviceCategory::WirelessController, MatchField::Name, token);
        }

        Classification {
            category: DeviceCategory::Other,
            matched: None,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        // The built-in token lists are plain words and always compile.
        Self::new(&ClassifierConfig::default()).expect("default classifier patterns are valid")
    }
}

fn hit(category: DeviceCategory, field: MatchField, token: &str) -> Classification {
    Classification {
        category,
        matched: Some(RuleMatch {
            field,
            token: token.to_string(),
        }),
    }
}

fn normalize(value: Option<&str>) -> String {
    let value = value.unwrap_or("").trim();
    WHITESPACE_RE.replace_all(value, " ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, role: Option<&str>, model: Option<&str>) -> DeviceRecord {
        DeviceRecord {
            id: 1,
            name: name.to_string(),
            declared_role: role.map(str::to_string),
            model: model.map(str::to_string),
            manufacturer: None,
            site_id: 1,
            site_name: "HQ".to_string(),
            interface_count: 0,
            status: None,
            primary_ip: None,
        }
    }

    #[test]
    fn empty_record_is_other() {
        let classifier = Classifier::default();
        let result = classifier.explain(&device("", None, None));
        assert_eq!(result.category, DeviceCategory::Other);
        assert!(result.matched.is_none());
    }

    #[test]
    fn model_only_access_switch() {
        let classifier = Classifier::default();
        let record = device("bldg-a-sw1", Some(""), Some("Cisco Catalyst 9300 Access"));
        assert_eq!(classifier.classify(&record), DeviceCategory::Access);
    }

    #[test]
    fn core_needs_switch_family_and_core_in_model() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify(&device("x", None, Some("Nexus Core 9K"))),
            DeviceCategory::Core
        );
        assert_eq!(
            classifier.classify(&device("x", None, Some("CoreRouter ASR"))),
            DeviceCategory::Router
        );
        assert_eq!(
            classifier.classify(&device("x", Some("Core Switch"), None)),
            DeviceCategory::Core
        );
    }

    #[test]
    fn rules_are_ordered_by_category() {
        let classifier = Classifier::default();
        let record = device("edge", Some("Firewall"), Some("Catalyst 9300"));
        // Access model token is checked before the firewall role keyword.
        assert_eq!(classifier.classify(&record), DeviceCategory::Access);
        let record = device("edge", Some("Distribution"), Some("PA-3220"));
        assert_eq!(classifier.classify(&record), DeviceCategory::Distribution);
    }

    #[test]
    fn access_point_role_is_wireless() {
        let classifier = Classifier::default();
        let result = classifier.explain(&device("lobby", Some("Access  Point"), None));
        assert_eq!(result.category, DeviceCategory::WirelessController);
        assert_eq!(
            result.matched,
            Some(RuleMatch {
                field: MatchField::Role,
                token: "access point".to_string()
            })
        );
    }

    #[test]
    fn name_fallback_for_wireless() {
        let classifier = Classifier::default();
        let result = classifier.explain(&device("floor2-AP-07", None, Some("Unknown")));
        assert_eq!(result.category, DeviceCategory::WirelessController);
        assert_eq!(result.matched.unwrap().field, MatchField::Name);
    }

    #[test]
    fn configured_patterns_replace_defaults() {
        let config = ClassifierConfig {
            router_model_tokens: vec![r"edge-gw-\d+".to_string()],
            ..ClassifierConfig::default()
        };
        let classifier = Classifier::new(&config).unwrap();
        assert_eq!(
            classifier.classify(&device("x", None, Some("EDGE-GW-200"))),
            DeviceCategory::Router
        );
        assert_eq!(
            classifier.classify(&device("x", None, Some("ISR4451"))),
            DeviceCategory::Other
        );
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let config = ClassifierConfig {
            server_model_tokens: vec!["(".to_string()],
            ..ClassifierConfig::default()
        };
        let err = Classifier::new(&config).unwrap_err();
        assert!(matches!(err, Error::Config(message) if message.starts_with("serverModelTokens")));
    }
}

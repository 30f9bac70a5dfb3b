// src/services/useragent.rs

//! User-agent classification using ua-parser rules.

use std::path::Path;

use uaparser::{Parser, UserAgentParser};

use crate::error::{AppError, Result};
use crate::models::UserAgentInfo;

/// Classifies raw user-agent strings.
///
/// Classification never fails; unknown agents yield the "Other" family or
/// empty fields.
pub trait UserAgentClassifier: Send + Sync {
    fn classify(&self, user_agent: &str) -> UserAgentInfo;
}

/// Classifier compiled from a ua-parser `regexes.yaml`.
pub struct UapClassifier {
    parser: UserAgentParser,
}

impl UapClassifier {
    /// Compile the rule file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let classifier = Self::from_bytes(&bytes)
            .map_err(|e| AppError::user_agent(path.display().to_string(), e))?;
        log::info!("Loaded user-agent rules from {}", path.display());
        Ok(classifier)
    }

    /// Compile rules from YAML bytes.
    pub fn from_bytes(yaml: &[u8]) -> std::result::Result<Self, String> {
        let parser = UserAgentParser::from_bytes(yaml).map_err(|e| format!("{e:?}"))?;
        Ok(Self { parser })
    }
}

impl UserAgentClassifier for UapClassifier {
    fn classify(&self, user_agent: &str) -> UserAgentInfo {
        let client = self.parser.parse(user_agent);

        UserAgentInfo {
            browser_family: client.user_agent.family.to_string(),
            browser_major: text(client.user_agent.major),
            browser_minor: text(client.user_agent.minor),
            browser_patch: text(client.user_agent.patch),
            os_family: client.os.family.to_string(),
            os_major: text(client.os.major),
            os_minor: text(client.os.minor),
            os_patch: text(client.os.patch),
            os_patch_minor: text(client.os.patch_minor),
            device_family: client.device.family.to_string(),
            device_brand: text(client.device.brand),
            device_model: text(client.device.model),
        }
    }
}

/// Classifier used when user-agent enrichment is disabled.
pub struct DisabledClassifier;

impl UserAgentClassifier for DisabledClassifier {
    fn classify(&self, _user_agent: &str) -> UserAgentInfo {
        UserAgentInfo::default()
    }
}

fn text<S: ToString>(value: Option<S>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = r#"
user_agent_parsers:
  - regex: '(Firefox)/(\d+)\.(\d+)'
os_parsers:
  - regex: '(Windows NT) (\d+)\.(\d+)'
device_parsers:
  - regex: '(iPhone)'
    device_replacement: 'iPhone'
    brand_replacement: 'Apple'
    model_replacement: 'iPhone'
"#;

    fn classifier() -> UapClassifier {
        UapClassifier::from_bytes(RULES.as_bytes()).unwrap()
    }

    #[test]
    fn test_classify_known_agent() {
        let info = classifier()
            .classify("Mozilla/5.0 (Windows NT 10.0; rv:109.0) Gecko/20100101 Firefox/115.0");
        assert_eq!(info.browser_family, "Firefox");
        assert_eq!(info.browser_major, "115");
        assert_eq!(info.browser_minor, "0");
        assert_eq!(info.os_family, "Windows NT");
        assert_eq!(info.os_major, "10");
    }

    #[test]
    fn test_classify_unknown_agent_is_other() {
        let info = classifier().classify("curl/8.0");
        assert_eq!(info.browser_family, "Other");
        assert_eq!(info.browser_major, "");
        assert_eq!(info.os_family, "Other");
        assert_eq!(info.device_family, "Other");
    }

    #[test]
    fn test_from_path_missing_file() {
        assert!(UapClassifier::from_path("/nonexistent/regexes.yaml").is_err());
    }

    #[test]
    fn test_disabled_classifier_is_empty() {
        assert_eq!(DisabledClassifier.classify("anything"), UserAgentInfo::default());
    }
}

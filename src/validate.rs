use crate::backend::{ConfigValidator, ValidationError};
use crate::config::{Config, DEFAULT_DOMAIN};
use serde_json::Value;
use std::collections::HashSet;

/// Default [`ConfigValidator`]: the configuration must deserialize into
/// [`Config`] and satisfy the site invariants.
///
/// Checked invariants:
/// - at least one page (the first one is the home page);
/// - page identifiers are non-empty and unique;
/// - `domain` is one of the allowed domains;
/// - `subdomain` only uses lowercase ASCII letters, digits and hyphens.
///
/// # Examples
///
/// ```
/// use sitefold::{Config, ConfigValidator, SchemaValidator};
///
/// let validator = SchemaValidator::new();
/// let raw = serde_json::to_value(Config::default()).unwrap();
/// assert!(validator.validate(&raw));
/// assert!(!validator.validate(&serde_json::json!({"title": 3})));
/// ```
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    allowed_domains: Vec<String>,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        SchemaValidator::new()
    }
}

impl SchemaValidator {
    /// A validator accepting only [`DEFAULT_DOMAIN`].
    pub fn new() -> Self {
        SchemaValidator::with_domains([DEFAULT_DOMAIN])
    }

    /// A validator accepting the given domains.
    pub fn with_domains<I, D>(domains: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        SchemaValidator {
            allowed_domains: domains.into_iter().map(Into::into).collect(),
        }
    }

    /// Every problem found in `raw`, empty when it is valid.
    pub fn errors(&self, raw: &Value) -> Vec<ValidationError> {
        let config: Config = match serde_json::from_value(raw.clone()) {
            Ok(config) => config,
            Err(e) => return vec![ValidationError::new("", e.to_string())],
        };

        let mut errors = Vec::new();

        if config.pages.is_empty() {
            errors.push(ValidationError::new("/pages", "a site needs at least one page"));
        }

        let mut seen = HashSet::new();
        for (i, page) in config.pages.iter().enumerate() {
            if page.uuid.is_empty() {
                errors.push(ValidationError::new(
                    format!("/pages/{i}/uuid"),
                    "page identifier is empty",
                ));
            } else if !seen.insert(page.uuid.as_str()) {
                errors.push(ValidationError::new(
                    format!("/pages/{i}/uuid"),
                    format!("duplicate page identifier '{}'", page.uuid),
                ));
            }
        }

        if !self.allowed_domains.iter().any(|d| *d == config.domain) {
            errors.push(ValidationError::new(
                "/domain",
                format!("domain '{}' is not allowed", config.domain),
            ));
        }

        if !config
            .subdomain
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            errors.push(ValidationError::new(
                "/subdomain",
                "subdomain may only contain a-z, 0-9 and '-'",
            ));
        }

        errors
    }
}

impl ConfigValidator for SchemaValidator {
    fn validate(&self, raw: &Value) -> bool {
        self.errors(raw).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_default() -> Value {
        serde_json::to_value(Config::default()).unwrap()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SchemaValidator::new().errors(&raw_default()).is_empty());
    }

    #[test]
    fn shape_error_reported_at_root() {
        let errors = SchemaValidator::new().errors(&json!({"pages": "nope"}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "");
    }

    #[test]
    fn rejects_empty_pages_and_foreign_domain() {
        let mut raw = raw_default();
        raw["pages"] = json!([]);
        raw["domain"] = json!(".elsewhere.com");
        let errors = SchemaValidator::new().errors(&raw);
        let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/pages", "/domain"]);
    }

    #[test]
    fn rejects_duplicate_uuids() {
        let mut raw = raw_default();
        let page = raw["pages"][0].clone();
        raw["pages"] = json!([page.clone(), page]);
        let errors = SchemaValidator::new().errors(&raw);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "/pages/1/uuid");
    }

    #[test]
    fn rejects_bad_subdomain() {
        let mut raw = raw_default();
        raw["subdomain"] = json!("My Site");
        assert!(!SchemaValidator::new().validate(&raw));
    }

    #[test]
    fn custom_domains() {
        let mut raw = raw_default();
        raw["domain"] = json!(".example.org");
        assert!(SchemaValidator::with_domains([".example.org"]).validate(&raw));
        assert!(!SchemaValidator::new().validate(&raw));
    }
}

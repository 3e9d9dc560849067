//! Link routing configuration entity.

use serde::{Deserialize, Serialize};

/// A single geo-routing rule: visitors whose country matches `country` are
/// sent to `destination`.
///
/// `"*"` matches any country. Matching is ASCII-case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub country: String,
    pub destination: String,
}

impl RoutingRule {
    /// Returns true if this rule applies to the given country code.
    pub fn matches(&self, country_code: &str) -> bool {
        self.country == "*" || self.country.eq_ignore_ascii_case(country_code)
    }
}

/// Routing configuration for one short link.
///
/// Read-only to this service: links are created and updated by an external
/// management collaborator. The ordered `rules` list is evaluated
/// first-match-wins; `default_destination` applies when no rule matches.
#[derive(Debug, Clone)]
pub struct RoutingInfo {
    pub account_id: String,
    pub rules: Vec<RoutingRule>,
    pub default_destination: String,
}

impl RoutingInfo {
    /// Creates a routing configuration.
    pub fn new(
        account_id: impl Into<String>,
        rules: Vec<RoutingRule>,
        default_destination: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            rules,
            default_destination: default_destination.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_matches_exact_country() {
        let rule = RoutingRule {
            country: "US".to_string(),
            destination: "https://example.com/us".to_string(),
        };

        assert!(rule.matches("US"));
        assert!(rule.matches("us"));
        assert!(!rule.matches("DE"));
    }

    #[test]
    fn test_wildcard_rule_matches_everything() {
        let rule = RoutingRule {
            country: "*".to_string(),
            destination: "https://example.com/any".to_string(),
        };

        assert!(rule.matches("US"));
        assert!(rule.matches("DE"));
        assert!(rule.matches("XX"));
    }

    #[test]
    fn test_routing_info_creation() {
        let info = RoutingInfo::new(
            "acct-1",
            vec![RoutingRule {
                country: "DE".to_string(),
                destination: "https://example.de".to_string(),
            }],
            "https://example.com",
        );

        assert_eq!(info.account_id, "acct-1");
        assert_eq!(info.rules.len(), 1);
        assert_eq!(info.default_destination, "https://example.com");
    }

    #[test]
    fn test_rules_serialize_round_trip() {
        let rules = vec![
            RoutingRule {
                country: "US".to_string(),
                destination: "https://example.com/us".to_string(),
            },
            RoutingRule {
                country: "*".to_string(),
                destination: "https://example.com".to_string(),
            },
        ];

        let json = serde_json::to_string(&rules).unwrap();
        let parsed: Vec<RoutingRule> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rules);
    }
}

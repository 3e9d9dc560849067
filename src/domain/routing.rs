//! Pure routing decision logic.
//!
//! Mapping a (link configuration, geo signal) pair to a destination is a pure
//! function: no I/O, no clock, no allocation beyond the borrowed result. The
//! policy is first-match-wins over the ordered rule list - no reordering, no
//! scoring.

use thiserror::Error;

use crate::domain::entities::RoutingRule;

/// Routing failures caused by link misconfiguration, not by the visitor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    /// No rule matched and the link has no default destination.
    #[error("no destination configured for this link")]
    NoDestination,
}

/// Resolves the destination for a visitor from the given country.
///
/// Rules are evaluated in list order; the first rule whose predicate matches
/// `country_code` wins. When no rule matches, `default_destination` is
/// returned. An empty default with no matching rule is a configuration error.
pub fn resolve<'a>(
    rules: &'a [RoutingRule],
    country_code: &str,
    default_destination: &'a str,
) -> Result<&'a str, RoutingError> {
    for rule in rules {
        if rule.matches(country_code) {
            return Ok(&rule.destination);
        }
    }

    if default_destination.is_empty() {
        return Err(RoutingError::NoDestination);
    }

    Ok(default_destination)
}

//! Link resolution service.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::RoutingInfo;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Resolves a short link id into its routing configuration.
///
/// Stateless per request: every call is one storage read with no caching in
/// between, so management-side updates are visible on the next redirect.
pub struct LinkResolver {
    links: Arc<dyn LinkRepository>,
}

impl LinkResolver {
    /// Creates a new resolver over the given link store.
    pub fn new(links: Arc<dyn LinkRepository>) -> Self {
        Self { links }
    }

    /// Fetches routing configuration for a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the id does not exist; the
    /// redirect handler turns this into a 404, never a 5xx.
    pub async fn get_routing_info(&self, link_id: &str) -> Result<RoutingInfo, AppError> {
        self.links
            .get_routing_info(link_id)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": link_id })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RoutingRule;
    use crate::domain::repositories::MockLinkRepository;

    #[tokio::test]
    async fn test_resolves_existing_link() {
        let mut links = MockLinkRepository::new();
        links.expect_get_routing_info().returning(|_| {
            Ok(Some(RoutingInfo::new(
                "acct-1",
                vec![RoutingRule {
                    country: "US".to_string(),
                    destination: "https://example.com/us".to_string(),
                }],
                "https://example.com",
            )))
        });

        let resolver = LinkResolver::new(Arc::new(links));
        let info = resolver.get_routing_info("abc").await.unwrap();

        assert_eq!(info.account_id, "acct-1");
        assert_eq!(info.rules.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_link_is_not_found() {
        let mut links = MockLinkRepository::new();
        links.expect_get_routing_info().returning(|_| Ok(None));

        let resolver = LinkResolver::new(Arc::new(links));
        let err = resolver.get_routing_info("missing").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }
}

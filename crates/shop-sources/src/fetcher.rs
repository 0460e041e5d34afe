//! Dual-source fetching
//!
//! Both backends are queried concurrently for the same collection. A failing
//! backend degrades to "no data" for that side; the fetch itself never fails.
//! [`DualSourceFetcher::fetch_merged`] normalizes both sides, merges them
//! with the primary taking precedence, and retries the fallback source once
//! when the merge comes back empty.

use crate::backend::Target;
use serde_json::Value;
use shop_model::{merge_counted, normalize, CatalogRecord, Resource};

/// Raw payloads from one concurrent fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePair {
    /// Primary source payload, absent when that request failed
    pub primary: Option<Value>,
    /// Secondary source payload, absent when that request failed
    pub secondary: Option<Value>,
}

impl SourcePair {
    /// Whether both sides failed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }
}

/// Which source gets a second, single-source request when the merged
/// result is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    /// Retry the primary source
    #[default]
    Primary,
    /// Retry the secondary source
    Secondary,
    /// Return the empty result
    Disabled,
}

/// Concurrent reader over two sources
#[derive(Debug, Clone)]
pub struct DualSourceFetcher {
    primary: Target,
    secondary: Target,
    fallback: Fallback,
}

impl DualSourceFetcher {
    /// Create fetcher; `primary` wins id collisions
    #[must_use]
    pub fn new(primary: Target, secondary: Target) -> Self {
        Self {
            primary,
            secondary,
            fallback: Fallback::default(),
        }
    }

    /// With fallback policy
    #[inline]
    #[must_use]
    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Fetch one collection from both sources concurrently
    ///
    /// Each side is bounded by its backend's request timeout, so the whole
    /// call takes about as long as the slower side.
    pub async fn fetch(&self, resource: Resource) -> SourcePair {
        let (primary, secondary) = futures::join!(
            list_side(&self.primary, resource),
            list_side(&self.secondary, resource),
        );
        if primary.is_none() && secondary.is_none() {
            tracing::warn!(%resource, "Both sources failed");
        }
        SourcePair { primary, secondary }
    }

    /// Fetch, normalize and merge one collection
    pub async fn fetch_merged<R: CatalogRecord>(&self) -> Vec<R> {
        let pair = self.fetch(R::RESOURCE).await;
        let primary = pair.primary.as_ref().map(normalize::<R>).unwrap_or_default();
        let secondary = pair
            .secondary
            .as_ref()
            .map(normalize::<R>)
            .unwrap_or_default();

        let (from_primary, from_secondary) = (primary.len(), secondary.len());
        let merged = merge_counted(primary, secondary);
        tracing::debug!(
            resource = %R::RESOURCE,
            primary = from_primary,
            secondary = from_secondary,
            shadowed = merged.shadowed,
            total = merged.records.len(),
            "Merged sources"
        );

        if merged.records.is_empty() {
            if let Some(target) = self.fallback_target() {
                tracing::info!(resource = %R::RESOURCE, source = target.name(), "Empty merge, retrying fallback source");
                let records = list_side(target, R::RESOURCE)
                    .await
                    .as_ref()
                    .map(normalize::<R>)
                    .unwrap_or_default();
                return merge_counted(records, Vec::new()).records;
            }
        }
        merged.records
    }

    fn fallback_target(&self) -> Option<&Target> {
        match self.fallback {
            Fallback::Primary => Some(&self.primary),
            Fallback::Secondary => Some(&self.secondary),
            Fallback::Disabled => None,
        }
    }
}

async fn list_side(target: &Target, resource: Resource) -> Option<Value> {
    match target.backend().list(resource, &[]).await {
        Ok(payload) => Some(payload),
        Err(error) => {
            tracing::warn!(source = target.name(), %resource, %error, "Source fetch failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockSourceBackend;
    use crate::error::SourceError;
    use serde_json::json;
    use shop_model::{Product, RecordId};
    use std::sync::Arc;

    fn target(name: &str, mock: MockSourceBackend) -> Target {
        Target::new(name, Arc::new(mock))
    }

    fn serving(payloads: Vec<Result<Value, u16>>) -> MockSourceBackend {
        let mut mock = MockSourceBackend::new();
        let count = payloads.len();
        let mut payloads = payloads.into_iter();
        mock.expect_list().times(count).returning(move |_, _| {
            payloads
                .next()
                .unwrap_or(Err(500))
                .map_err(|status| SourceError::Status {
                    status,
                    url: "mock".into(),
                })
        });
        mock
    }

    #[tokio::test]
    async fn one_side_failing_yields_the_other() {
        let seed = serving(vec![Err(500)]);
        let live = serving(vec![Ok(json!([{"id": 81, "name": "Fan", "price": 990}]))]);
        let fetcher = DualSourceFetcher::new(target("seed", seed), target("live", live))
            .with_fallback(Fallback::Disabled);

        let pair = fetcher.fetch(Resource::Products).await;
        assert!(pair.primary.is_none());
        assert!(pair.secondary.is_some());
    }

    #[tokio::test]
    async fn merged_prefers_primary_on_collision() {
        let seed = serving(vec![Ok(json!({"products": [{"id": 5, "name": "Seed", "price": 1}]}))]);
        let live = serving(vec![Ok(json!([
            {"id": "5", "name": "Live", "price": 2},
            {"id": 90, "name": "New", "price": 3}
        ]))]);
        let fetcher = DualSourceFetcher::new(target("seed", seed), target("live", live));

        let products: Vec<Product> = fetcher.fetch_merged().await;
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Seed");
        assert_eq!(products[1].id, RecordId::Numeric(90));
    }

    #[tokio::test]
    async fn empty_merge_retries_fallback_once() {
        let seed = serving(vec![
            Err(503),
            Ok(json!({"products": [{"id": 1, "name": "Rice", "price": 35}]})),
        ]);
        let live = serving(vec![Ok(json!([]))]);
        let fetcher = DualSourceFetcher::new(target("seed", seed), target("live", live));

        let products: Vec<Product> = fetcher.fetch_merged().await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Rice");
    }

    #[tokio::test]
    async fn fallback_payload_is_deduplicated() {
        let seed = serving(vec![
            Err(503),
            Ok(json!([
                {"id": 1, "name": "A", "price": 10},
                {"id": "1", "name": "B", "price": 11}
            ])),
        ]);
        let live = serving(vec![Ok(json!([]))]);
        let fetcher = DualSourceFetcher::new(target("seed", seed), target("live", live));

        let products: Vec<Product> = fetcher.fetch_merged().await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "A");
    }

    #[tokio::test]
    async fn both_failing_without_fallback_is_empty() {
        let fetcher = DualSourceFetcher::new(
            target("seed", serving(vec![Err(500)])),
            target("live", serving(vec![Err(502)])),
        )
        .with_fallback(Fallback::Disabled);

        assert!(fetcher.fetch(Resource::Orders).await.is_empty());
        let products: Vec<Product> = DualSourceFetcher::new(
            target("seed", serving(vec![Err(500)])),
            target("live", serving(vec![Err(502)])),
        )
        .with_fallback(Fallback::Disabled)
        .fetch_merged()
        .await;
        assert!(products.is_empty());
    }
}

//! Per-author timeline statistics.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::AppResult;
use crate::models::{AuthorStats, TimelineEntry};
use crate::provider::TimelineSource;
use crate::validation::validate_token_pair;

/// Computes author rankings from the signed-in user's timeline.
///
/// Nothing is cached: every call fetches and aggregates afresh.
#[derive(Clone)]
pub struct StatsService {
    timeline: Arc<dyn TimelineSource>,
}

impl StatsService {
    pub fn new(timeline: Arc<dyn TimelineSource>) -> Self {
        Self { timeline }
    }

    /// Fetch the timeline for these credentials and rank its authors.
    ///
    /// # Errors
    ///
    /// - `AppError::Validation` if either credential is empty; the timeline
    ///   is not fetched
    /// - `AppError::Upstream` if the fetch fails (single attempt, no retry)
    #[instrument(skip_all)]
    pub async fn compute_stats(
        &self,
        access_token: &str,
        access_secret: &str,
    ) -> AppResult<Vec<AuthorStats>> {
        validate_token_pair(access_token, access_secret, "access")?;

        let entries = self
            .timeline
            .fetch_timeline(access_token, access_secret)
            .await
            .map_err(|e| e.into_upstream())?;

        let stats = aggregate(&entries);
        debug!(entries = entries.len(), authors = stats.len(), "Computed author stats");
        Ok(stats)
    }
}

/// Group entries by handle and rank by entry count.
///
/// - One `AuthorStats` per distinct handle
/// - `display_name` comes from the first entry seen for that handle
/// - Ordered by `count` descending, then `handle` ascending
pub fn aggregate(entries: &[TimelineEntry]) -> Vec<AuthorStats> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut stats: Vec<AuthorStats> = Vec::new();

    for entry in entries {
        match position.get(entry.author_handle.as_str()) {
            Some(&index) => {
                if let Some(existing) = stats.get_mut(index) {
                    existing.count = existing.count.saturating_add(1);
                }
            }
            None => {
                position.insert(entry.author_handle.as_str(), stats.len());
                stats.push(AuthorStats {
                    display_name: entry.author_name.clone(),
                    handle: entry.author_handle.clone(),
                    count: 1,
                });
            }
        }
    }

    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.handle.cmp(&b.handle)));
    stats
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::provider::mock::StubTimeline;

    fn entry(name: &str, handle: &str) -> TimelineEntry {
        TimelineEntry::new(name, handle)
    }

    fn sample_entries() -> Vec<TimelineEntry> {
        vec![
            entry("John Smith1", "jsmith1"),
            entry("John Smith0", "jsmith0"),
            entry("John Smith2", "jsmith2"),
            entry("John Smith0", "jsmith0"),
        ]
    }

    #[test]
    fn test_aggregate_counts_and_orders() {
        let stats = aggregate(&sample_entries());

        assert_eq!(stats.len(), 3);
        assert_eq!(
            stats[0],
            AuthorStats {
                display_name: "John Smith0".to_string(),
                handle: "jsmith0".to_string(),
                count: 2,
            }
        );
    }

    #[test]
    fn test_aggregate_ties_break_by_handle() {
        let stats = aggregate(&sample_entries());

        let handles: Vec<&str> = stats.iter().map(|s| s.handle.as_str()).collect();
        assert_eq!(handles, vec!["jsmith0", "jsmith1", "jsmith2"]);
    }

    #[test]
    fn test_aggregate_keeps_first_display_name() {
        let entries = vec![
            entry("Old Name", "renamer"),
            entry("New Name", "renamer"),
        ];

        let stats = aggregate(&entries);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].display_name, "Old Name");
        assert_eq!(stats[0].count, 2);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_one_stat_per_handle_with_matching_counts() {
        let handles = ["a", "b", "a", "c", "b", "a", "d", "c", "a"];
        let entries: Vec<TimelineEntry> = handles.iter().map(|h| entry(h, h)).collect();

        let stats = aggregate(&entries);

        assert_eq!(stats.len(), 4);
        for stat in &stats {
            let expected = handles.iter().filter(|h| **h == stat.handle).count() as u32;
            assert_eq!(stat.count, expected, "count for {}", stat.handle);
        }
        assert!(stats.windows(2).all(|w| w[0].count >= w[1].count));
        let total: u32 = stats.iter().map(|s| s.count).sum();
        assert_eq!(total as usize, handles.len());
    }

    #[tokio::test]
    async fn test_compute_stats_success() {
        let timeline = Arc::new(StubTimeline::with_entries(sample_entries()));
        let service = StatsService::new(timeline.clone());

        let stats = service.compute_stats("token", "secret").await.unwrap();

        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].handle, "jsmith0");
        assert_eq!(stats[0].count, 2);
        assert_eq!(
            timeline.last_credentials(),
            Some(("token".to_string(), "secret".to_string()))
        );
    }

    #[tokio::test]
    async fn test_compute_stats_missing_credentials_skips_fetch() {
        let timeline = Arc::new(StubTimeline::with_entries(sample_entries()));
        let service = StatsService::new(timeline.clone());

        assert!(service.compute_stats("token", "").await.unwrap_err().is_validation());
        assert!(service.compute_stats("", "secret").await.unwrap_err().is_validation());
        assert_eq!(timeline.calls(), 0);
    }

    #[tokio::test]
    async fn test_compute_stats_forwards_long_credentials() {
        let timeline = Arc::new(StubTimeline::with_entries(vec![entry("A", "a")]));
        let service = StatsService::new(timeline.clone());
        let token = "t".repeat(600);

        let stats = service.compute_stats(&token, "secret").await.unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(timeline.calls(), 1);
        assert_eq!(
            timeline.last_credentials(),
            Some((token, "secret".to_string()))
        );
    }

    #[tokio::test]
    async fn test_compute_stats_upstream_failure() {
        let timeline = Arc::new(StubTimeline::failing());
        let service = StatsService::new(timeline.clone());

        let err = service.compute_stats("token", "secret").await.unwrap_err();

        assert!(err.is_upstream());
        assert!(err.to_string().contains("stub: timeline unavailable"));
        assert_eq!(timeline.calls(), 1);
    }

    #[tokio::test]
    async fn test_compute_stats_empty_timeline() {
        let service = StatsService::new(Arc::new(StubTimeline::with_entries(vec![])));

        let stats = service.compute_stats("token", "secret").await.unwrap();

        assert!(stats.is_empty());
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::SearchCriteria;
use crate::domain::{Listing, Source};
use crate::error::Result;

pub mod redfin;
pub mod rentcast;
pub mod zillow;

/// Core trait every listing provider implements. Each adapter owns the
/// mapping from its provider's response shape into the canonical `Listing`
/// schema; adapters perform no scoring and no cross-source comparison.
#[async_trait::async_trait]
pub trait ListingSource: Send + Sync {
    fn source(&self) -> Source;

    /// Fetch listings matching the criteria, fully normalized.
    async fn fetch(&self, criteria: &SearchCriteria) -> Result<Vec<Listing>>;
}

/// Fans all adapters out concurrently and joins them. A failed source is
/// logged and skipped; the batch continues with whatever succeeded.
pub async fn fetch_all(
    sources: Vec<Box<dyn ListingSource>>,
    criteria: &SearchCriteria,
) -> Vec<Listing> {
    let mut tasks = JoinSet::new();
    for source in sources {
        let criteria = criteria.clone();
        tasks.spawn(async move {
            let id = source.source();
            (id, source.fetch(&criteria).await)
        });
    }

    let mut all = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((source, Ok(listings))) => {
                info!(source = %source, count = listings.len(), "source fetch complete");
                all.extend(listings);
            }
            Ok((source, Err(e))) => {
                warn!(source = %source, "source unavailable, continuing without it: {e}");
            }
            Err(e) => {
                warn!("source task aborted: {e}");
            }
        }
    }
    all
}

/// Listed-date strings arrive in several shapes (RFC 3339, date-only,
/// naive datetimes). Unparseable dates degrade to unknown.
pub(crate) fn parse_listed_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_date_shapes() {
        assert!(parse_listed_date("2025-05-30T18:22:00Z").is_some());
        assert!(parse_listed_date("2025-05-30T18:22:00").is_some());
        assert!(parse_listed_date("2025-05-30").is_some());
        assert!(parse_listed_date("yesterday").is_none());
    }
}

use std::sync::Arc;
use tokio::sync::RwLock;

use super::api::{ClientResult, ShiftApi};
use crate::models::LocationOptions;

/// Location options cached against the server's `lastUpdated` stamp.
///
/// Each read first asks for the remote timestamp and only downloads the
/// option list when nothing is cached or the remote stamp is newer. If the
/// timestamp check fails, the cached list is served.
pub struct LocationCache {
    api: Arc<dyn ShiftApi>,
    cached: RwLock<Option<LocationOptions>>,
}

impl LocationCache {
    pub fn new(api: Arc<dyn ShiftApi>) -> Self {
        Self {
            api,
            cached: RwLock::new(None),
        }
    }

    pub async fn options(&self) -> ClientResult<Vec<String>> {
        let cached = self.cached.read().await.clone();

        let remote = match self.api.locations_last_updated().await {
            Ok(stamp) => stamp,
            Err(e) => {
                return match cached {
                    Some(current) => {
                        tracing::warn!(error = %e, "Location timestamp check failed, serving cached options");
                        Ok(current.options)
                    }
                    None => Err(e),
                };
            }
        };

        if let Some(current) = cached {
            if current.last_updated >= remote {
                return Ok(current.options);
            }
        }

        let fresh = self.api.locations().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to refresh location options");
            e
        })?;
        tracing::debug!(count = fresh.options.len(), last_updated = %fresh.last_updated, "Location options refreshed");

        let options = fresh.options.clone();
        *self.cached.write().await = Some(fresh);
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeApi;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_refetch_only_when_remote_advances() {
        let api = Arc::new(FakeApi::new());
        let t0 = Utc::now();
        api.set_locations(vec!["Gate 4".to_string()], t0);
        let cache = LocationCache::new(api.clone());

        assert_eq!(cache.options().await.unwrap(), vec!["Gate 4".to_string()]);
        assert_eq!(cache.options().await.unwrap(), vec!["Gate 4".to_string()]);
        assert_eq!(api.location_fetches(), 1);

        api.set_locations(vec!["Gate 4".to_string(), "Ramp".to_string()], t0 + Duration::minutes(5));
        assert_eq!(cache.options().await.unwrap().len(), 2);
        assert_eq!(api.location_fetches(), 2);
    }

    #[tokio::test]
    async fn test_stale_cache_served_when_check_fails() {
        let api = Arc::new(FakeApi::new());
        api.set_locations(vec!["Ramp".to_string()], Utc::now());
        let cache = LocationCache::new(api.clone());
        cache.options().await.unwrap();

        api.set_offline(true);
        assert_eq!(cache.options().await.unwrap(), vec!["Ramp".to_string()]);
    }
}

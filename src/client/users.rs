use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use super::api::{ClientResult, ShiftApi};
use super::fanout::fetch_referenced;
use crate::models::UserRef;

/// Client-side cache of user projections used to label offers and shifts.
#[derive(Clone)]
pub struct UserDirectory {
    api: Arc<dyn ShiftApi>,
    cache: Cache<String, UserRef>,
}

impl UserDirectory {
    pub fn new(api: Arc<dyn ShiftApi>, ttl: Duration) -> Self {
        let cache = Cache::builder().time_to_live(ttl).max_capacity(1_000).build();
        Self { api, cache }
    }

    pub async fn get(&self, uid: &str) -> ClientResult<UserRef> {
        if let Some(user) = self.cache.get(uid).await {
            return Ok(user);
        }

        let user = self.api.user(uid).await?;
        self.cache.insert(uid.to_string(), user.clone()).await;
        Ok(user)
    }

    /// Resolves several users at once; unknown or failing ids are skipped.
    pub async fn resolve_many(&self, uids: &[String]) -> Vec<UserRef> {
        fetch_referenced(uids.iter().map(String::as_str), |uid| {
            let uid: &str = *uid;
            self.get(uid)
        })
        .await
    }

    pub async fn forget(&self, uid: &str) {
        self.cache.invalidate(uid).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeApi;

    #[tokio::test]
    async fn test_second_lookup_served_from_cache() {
        let api = Arc::new(FakeApi::new());
        api.add_user("U7", "Lena");
        let directory = UserDirectory::new(api.clone(), Duration::from_secs(60));

        assert_eq!(directory.get("U7").await.unwrap().first_name, "Lena");
        assert_eq!(directory.get("U7").await.unwrap().first_name, "Lena");
        assert_eq!(api.user_fetches(), 1);

        directory.forget("U7").await;
        directory.get("U7").await.unwrap();
        assert_eq!(api.user_fetches(), 2);
    }

    #[tokio::test]
    async fn test_resolve_many_skips_unknown() {
        let api = Arc::new(FakeApi::new());
        api.add_user("U1", "Ana");
        api.add_user("U2", "Sam");
        let directory = UserDirectory::new(api, Duration::from_secs(60));

        let uids = vec!["U1".to_string(), "ghost".to_string(), "U2".to_string()];
        assert_eq!(directory.resolve_many(&uids).await.len(), 2);
    }
}

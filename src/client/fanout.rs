use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt::Display;
use std::future::Future;

use super::api::{ClientResult, ShiftApi};
use crate::models::Shift;

/// Fetches every referenced document concurrently and returns the ones that
/// arrived, in completion order.
///
/// A failed fetch is logged and left out; it never fails the batch.
pub async fn fetch_referenced<K, T, E, F, Fut>(refs: impl IntoIterator<Item = K>, fetch: F) -> Vec<T>
where
    K: Display,
    E: Display,
    F: Fn(&K) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut in_flight: FuturesUnordered<_> = refs
        .into_iter()
        .map(|key| {
            let request = fetch(&key);
            async move { (key, request.await) }
        })
        .collect();

    let mut fetched = Vec::with_capacity(in_flight.len());
    while let Some((key, outcome)) = in_flight.next().await {
        match outcome {
            Ok(item) => fetched.push(item),
            Err(e) => tracing::warn!(reference = %key, error = %e, "Skipping referenced document"),
        }
    }
    fetched
}

pub fn sort_by_start(shifts: &mut [Shift]) {
    shifts.sort_by_key(|s| s.start);
}

/// The shifts `uid` has listed, soonest first.
pub async fn load_offered_shifts(api: &dyn ShiftApi, uid: &str) -> ClientResult<Vec<Shift>> {
    let refs = api.offered_refs(uid).await.map_err(|e| {
        tracing::error!(error = %e, uid, "Failed to load offered shift refs");
        e
    })?;

    let mut shifts = fetch_referenced(refs, |id| api.shift(*id)).await;
    sort_by_start(&mut shifts);
    Ok(shifts)
}

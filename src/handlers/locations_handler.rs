use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    models::{LocationOptions, LocationsLastUpdated},
    AppResult, AppState,
};

/// GET /api/locations
#[utoipa::path(
    get,
    path = "/api/locations",
    responses(
        (status = 200, description = "Selectable shift locations", body = LocationOptions)
    ),
    tag = "locations"
)]
pub async fn get_locations(State(state): State<Arc<AppState>>) -> AppResult<Json<LocationOptions>> {
    let locations = state.engine.locations().await?;
    Ok(Json(locations))
}

/// GET /api/locations/last-updated
///
/// Lets clients decide whether their cached option list is stale without
/// downloading it.
#[utoipa::path(
    get,
    path = "/api/locations/last-updated",
    responses(
        (status = 200, description = "Timestamp of the last change to the location list", body = LocationsLastUpdated)
    ),
    tag = "locations"
)]
pub async fn get_locations_last_updated(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<LocationsLastUpdated>> {
    let locations = state.engine.locations().await?;
    Ok(Json(LocationsLastUpdated {
        last_updated: locations.last_updated,
    }))
}

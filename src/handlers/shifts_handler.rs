use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    extractors::AuthenticatedUser,
    models::{Offer, Shift},
    AppResult, AppState,
};

/// GET /api/shifts/{id}
#[utoipa::path(
    get,
    path = "/api/shifts/{id}",
    params(
        ("id" = Uuid, Path, description = "Shift id")
    ),
    responses(
        (status = 200, description = "Shift with its effective status", body = Shift),
        (status = 404, description = "Shift not found")
    ),
    tag = "shifts",
    security(("bearer_auth" = []))
)]
pub async fn get_shift(
    State(state): State<Arc<AppState>>,
    _auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Shift>> {
    let shift = state.engine.shift(id).await?;
    Ok(Json(shift))
}

/// GET /api/shifts/mine
#[utoipa::path(
    get,
    path = "/api/shifts/mine",
    responses(
        (status = 200, description = "Shifts offered by the caller, oldest listing first", body = Vec<Shift>)
    ),
    tag = "shifts",
    security(("bearer_auth" = []))
)]
pub async fn get_my_shifts(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<Shift>>> {
    let shifts = state.engine.my_shifts(&auth.uid).await?;
    tracing::debug!(uid = %auth.uid, count = shifts.len(), "Listed own shifts");
    Ok(Json(shifts))
}

/// GET /api/shifts/pickable
#[utoipa::path(
    get,
    path = "/api/shifts/pickable",
    responses(
        (status = 200, description = "Available shifts from other users that have not ended", body = Vec<Shift>)
    ),
    tag = "shifts",
    security(("bearer_auth" = []))
)]
pub async fn get_pickable_shifts(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<Shift>>> {
    let shifts = state.engine.pickable_shifts(&auth.uid).await?;
    Ok(Json(shifts))
}

/// GET /api/shifts/{id}/offers
#[utoipa::path(
    get,
    path = "/api/shifts/{id}/offers",
    params(
        ("id" = Uuid, Path, description = "Shift id")
    ),
    responses(
        (status = 200, description = "Every offer made on the shift", body = Vec<Offer>),
        (status = 403, description = "Only the shift owner can list its offers"),
        (status = 404, description = "Shift not found")
    ),
    tag = "shifts",
    security(("bearer_auth" = []))
)]
pub async fn get_shift_offers(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Offer>>> {
    let offers = state.engine.offers_for_shift(&auth.uid, id).await?;
    Ok(Json(offers))
}

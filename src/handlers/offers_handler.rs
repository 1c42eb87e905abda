use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{extractors::AuthenticatedUser, models::Offer, AppResult, AppState};

/// GET /api/offers/{id}
#[utoipa::path(
    get,
    path = "/api/offers/{id}",
    params(
        ("id" = Uuid, Path, description = "Offer id")
    ),
    responses(
        (status = 200, description = "Offer visible to its author and to the shift owner", body = Offer),
        (status = 403, description = "Offer belongs to someone else"),
        (status = 404, description = "Offer not found")
    ),
    tag = "offers",
    security(("bearer_auth" = []))
)]
pub async fn get_offer(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Offer>> {
    let offer = state.engine.offer(&auth.uid, id).await?;
    Ok(Json(offer))
}

/// GET /api/offers/mine
#[utoipa::path(
    get,
    path = "/api/offers/mine",
    responses(
        (status = 200, description = "Offers made by the caller, oldest first", body = Vec<Offer>)
    ),
    tag = "offers",
    security(("bearer_auth" = []))
)]
pub async fn get_my_offers(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<Offer>>> {
    let offers = state.engine.my_offers(&auth.uid).await?;
    Ok(Json(offers))
}

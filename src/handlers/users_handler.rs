use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    extractors::AuthenticatedUser,
    models::{OfferedShiftRefs, UserRef},
    AppResult, AppState,
};

/// GET /api/users/{uid}
#[utoipa::path(
    get,
    path = "/api/users/{uid}",
    params(
        ("uid" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Public profile of the user", body = UserRef),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _auth: AuthenticatedUser,
    Path(uid): Path<String>,
) -> AppResult<Json<UserRef>> {
    let user = state.engine.user(&uid).await?;
    Ok(Json(user))
}

/// GET /api/users/{uid}/shifts/offered
#[utoipa::path(
    get,
    path = "/api/users/{uid}/shifts/offered",
    params(
        ("uid" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Ids of the shifts the user has listed", body = OfferedShiftRefs)
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn get_offered_shift_refs(
    State(state): State<Arc<AppState>>,
    _auth: AuthenticatedUser,
    Path(uid): Path<String>,
) -> AppResult<Json<OfferedShiftRefs>> {
    let refs = state.engine.offered_refs(&uid).await?;
    tracing::debug!(uid = %uid, count = refs.refs.len(), "Resolved offered shift refs");
    Ok(Json(refs))
}

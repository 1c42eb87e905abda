use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    extractors::AuthenticatedUser,
    models::{
        DeleteAccountInput, DeleteShiftInput, DeleteShiftResponse, NewAccount, PickupShiftInput,
        PickupShiftResponse, RespondToOfferInput, RespondToOfferResult, SaveShiftResponse, Shift,
        ShiftMutationResponse, SuccessResponse, UserRef,
    },
    AppError, AppResult, AppState,
};

/// POST /rpc/createAccount
#[utoipa::path(
    post,
    path = "/rpc/createAccount",
    request_body = NewAccount,
    responses(
        (status = 200, description = "Account created for the caller", body = UserRef),
        (status = 422, description = "First invalid field of the account form"),
        (status = 409, description = "Account already exists")
    ),
    tag = "rpc",
    security(("bearer_auth" = []))
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<NewAccount>,
) -> AppResult<Json<UserRef>> {
    let user = state.engine.create_account(&auth.uid, input).await?;
    Ok(Json(user))
}

/// POST /rpc/saveShift
#[utoipa::path(
    post,
    path = "/rpc/saveShift",
    request_body = Shift,
    responses(
        (status = 200, description = "Shift listed as available", body = SaveShiftResponse),
        (status = 422, description = "Shift failed validation (date, duration, location or availabilities)")
    ),
    tag = "rpc",
    security(("bearer_auth" = []))
)]
pub async fn save_shift(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(draft): Json<Shift>,
) -> AppResult<Json<SaveShiftResponse>> {
    let shift = state.engine.save_shift(&auth.uid, draft).await?;
    let shift_id = shift.id.ok_or_else(|| {
        tracing::error!(uid = %auth.uid, "Saved shift came back without an id");
        AppError::Internal("Saved shift has no id".to_string())
    })?;

    Ok(Json(SaveShiftResponse { shift_id }))
}

/// POST /rpc/editShift
#[utoipa::path(
    post,
    path = "/rpc/editShift",
    request_body = Shift,
    responses(
        (status = 200, description = "Shift updated", body = ShiftMutationResponse),
        (status = 403, description = "Caller does not own the shift"),
        (status = 409, description = "Shift is no longer editable"),
        (status = 422, description = "Shift failed validation")
    ),
    tag = "rpc",
    security(("bearer_auth" = []))
)]
pub async fn edit_shift(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(edit): Json<Shift>,
) -> AppResult<Json<ShiftMutationResponse>> {
    state.engine.edit_shift(&auth.uid, edit).await?;

    Ok(Json(ShiftMutationResponse {
        success: true,
        message: Some("Shift updated".to_string()),
    }))
}

/// POST /rpc/deleteShift
#[utoipa::path(
    post,
    path = "/rpc/deleteShift",
    request_body = DeleteShiftInput,
    responses(
        (status = 200, description = "Shift deleted; pending offers declined", body = DeleteShiftResponse),
        (status = 403, description = "Caller does not own the shift"),
        (status = 404, description = "Shift not found")
    ),
    tag = "rpc",
    security(("bearer_auth" = []))
)]
pub async fn delete_shift(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<DeleteShiftInput>,
) -> AppResult<Json<DeleteShiftResponse>> {
    let declined_offers = state.engine.delete_shift(&auth.uid, input.shift_id).await?;

    Ok(Json(DeleteShiftResponse {
        success: true,
        declined_offers,
    }))
}

/// POST /rpc/pickupShift
#[utoipa::path(
    post,
    path = "/rpc/pickupShift",
    request_body = PickupShiftInput,
    responses(
        (status = 200, description = "Offer created in pending state", body = PickupShiftResponse),
        (status = 400, description = "Caller tried to pick up their own shift"),
        (status = 404, description = "Shift not found"),
        (status = 409, description = "Shift no longer available or offer already pending")
    ),
    tag = "rpc",
    security(("bearer_auth" = []))
)]
pub async fn pickup_shift(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<PickupShiftInput>,
) -> AppResult<Json<PickupShiftResponse>> {
    let offer = state.engine.submit_offer(&auth.uid, input).await?;
    Ok(Json(PickupShiftResponse { offer_id: offer.id }))
}

/// POST /rpc/respondToOffer
#[utoipa::path(
    post,
    path = "/rpc/respondToOffer",
    request_body = RespondToOfferInput,
    responses(
        (status = 200, description = "Offer resolved", body = RespondToOfferResult),
        (status = 403, description = "Caller does not own the shift"),
        (status = 404, description = "Offer or shift not found"),
        (status = 409, description = "Offer already resolved or shift already taken")
    ),
    tag = "rpc",
    security(("bearer_auth" = []))
)]
pub async fn respond_to_offer(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<RespondToOfferInput>,
) -> AppResult<Json<RespondToOfferResult>> {
    let result = state.engine.respond_to_offer(&auth.uid, input).await?;
    Ok(Json(result))
}

/// POST /rpc/deleteAccount
#[utoipa::path(
    post,
    path = "/rpc/deleteAccount",
    request_body = DeleteAccountInput,
    responses(
        (status = 200, description = "Account, shifts and pending offers removed", body = SuccessResponse),
        (status = 403, description = "Caller may only delete their own account"),
        (status = 422, description = "Invalid user id")
    ),
    tag = "rpc",
    security(("bearer_auth" = []))
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<DeleteAccountInput>,
) -> AppResult<Json<SuccessResponse>> {
    state.engine.delete_account(&auth.uid, &input.user_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

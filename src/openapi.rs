use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::Modify;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shift Radar API",
        version = "0.1.0",
        description = "Shift listing and offer negotiation between employees"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // RPC
        crate::handlers::rpc_handler::create_account,
        crate::handlers::rpc_handler::save_shift,
        crate::handlers::rpc_handler::edit_shift,
        crate::handlers::rpc_handler::delete_shift,
        crate::handlers::rpc_handler::pickup_shift,
        crate::handlers::rpc_handler::respond_to_offer,
        crate::handlers::rpc_handler::delete_account,

        // Shifts
        crate::handlers::shifts_handler::get_shift,
        crate::handlers::shifts_handler::get_my_shifts,
        crate::handlers::shifts_handler::get_pickable_shifts,
        crate::handlers::shifts_handler::get_shift_offers,

        // Offers
        crate::handlers::offers_handler::get_offer,
        crate::handlers::offers_handler::get_my_offers,

        // Users
        crate::handlers::users_handler::get_user,
        crate::handlers::users_handler::get_offered_shift_refs,

        // Locations
        crate::handlers::locations_handler::get_locations,
        crate::handlers::locations_handler::get_locations_last_updated,
    ),
    components(
        schemas(
            // Core models
            crate::models::Shift,
            crate::models::ShiftStatus,
            crate::models::Compensation,
            crate::models::CompensationKind,
            crate::models::Availability,
            crate::models::Offer,
            crate::models::OfferStatus,
            crate::models::OfferDecision,
            crate::models::UserRef,
            crate::models::LocationOptions,
            crate::models::LocationsLastUpdated,
            crate::models::OfferedShiftRefs,

            // RPC payloads
            crate::models::NewAccount,
            crate::models::SaveShiftResponse,
            crate::models::ShiftMutationResponse,
            crate::models::DeleteShiftInput,
            crate::models::DeleteShiftResponse,
            crate::models::PickupShiftInput,
            crate::models::PickupShiftResponse,
            crate::models::RespondToOfferInput,
            crate::models::RespondToOfferResult,
            crate::models::DeleteAccountInput,
            crate::models::SuccessResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "rpc", description = "State-changing calls on shifts, offers and accounts"),
        (name = "shifts", description = "Shift reads"),
        (name = "offers", description = "Offer reads"),
        (name = "users", description = "User profiles"),
        (name = "locations", description = "Selectable shift locations"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_rpc_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/rpc/respondToOffer"));
        assert!(doc.paths.paths.contains_key("/api/users/{uid}/shifts/offered"));
    }
}

use axum::{
    extract::Request,
    http::{header, header::InvalidHeaderValue, HeaderName, HeaderValue, Method},
    middleware,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{handlers, middleware::RequestId, openapi::ApiDoc};

pub fn build_router(state: Arc<crate::AppState>) -> Result<Router, InvalidHeaderValue> {
    let cors = CorsLayer::new()
        .allow_origin(state.config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([HeaderName::from_static("x-request-id")])
        .allow_credentials(true);

    // RPC routes
    let rpc_routes = Router::new()
        .route("/createAccount", post(handlers::rpc_handler::create_account))
        .route("/saveShift", post(handlers::rpc_handler::save_shift))
        .route("/editShift", post(handlers::rpc_handler::edit_shift))
        .route("/deleteShift", post(handlers::rpc_handler::delete_shift))
        .route("/pickupShift", post(handlers::rpc_handler::pickup_shift))
        .route("/respondToOffer", post(handlers::rpc_handler::respond_to_offer))
        .route("/deleteAccount", post(handlers::rpc_handler::delete_account));

    // Shift routes; static segments take priority over {id}
    let shift_routes = Router::new()
        .route("/mine", get(handlers::shifts_handler::get_my_shifts))
        .route("/pickable", get(handlers::shifts_handler::get_pickable_shifts))
        .route("/{id}", get(handlers::shifts_handler::get_shift))
        .route("/{id}/offers", get(handlers::shifts_handler::get_shift_offers));

    // Offer routes
    let offer_routes = Router::new()
        .route("/mine", get(handlers::offers_handler::get_my_offers))
        .route("/{id}", get(handlers::offers_handler::get_offer));

    // User routes
    let user_routes = Router::new()
        .route("/{uid}", get(handlers::users_handler::get_user))
        .route(
            "/{uid}/shifts/offered",
            get(handlers::users_handler::get_offered_shift_refs),
        );

    // Location routes
    let location_routes = Router::new()
        .route("/", get(handlers::locations_handler::get_locations))
        .route(
            "/last-updated",
            get(handlers::locations_handler::get_locations_last_updated),
        );

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or_default();
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/rpc", rpc_routes)
        .nest("/api/shifts", shift_routes)
        .nest("/api/offers", offer_routes)
        .nest("/api/users", user_routes)
        .nest("/api/locations", location_routes)
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/swagger-ui", get(swagger_ui))
        .layer(middleware::from_fn(crate::middleware::metrics_middleware))
        .layer(trace)
        // Outside the trace layer so the span sees the id.
        .layer(middleware::from_fn(crate::middleware::request_id_middleware))
        .layer(cors)
        .with_state(state);

    Ok(router)
}

async fn swagger_ui() -> Html<&'static str> {
    Html(r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Shift Radar API</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: '/api-docs/openapi.json',
                dom_id: '#swagger-ui',
            });
        };
    </script>
</body>
</html>
    "#)
}

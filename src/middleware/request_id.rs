use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Correlation id for one request, available as a request extension to every
/// layer inside `request_id_middleware`.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Reuses a caller-supplied `X-Request-ID` or mints a new one, and echoes it
/// back on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Extension, Router};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|Extension(id): Extension<RequestId>| async move { id.0 }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_minted_id_visible_inside_and_echoed() {
        let response = app()
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let echoed = response.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&echoed).is_ok());
        assert_eq!(body_text(response).await, echoed);
    }

    #[tokio::test]
    async fn test_caller_id_reused() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header(REQUEST_ID_HEADER, "req-42")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
        assert_eq!(body_text(response).await, "req-42");
    }
}

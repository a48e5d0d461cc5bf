//! Response construction.
//!
//! # Responsibilities
//! - Render gate rejections as `{message, statusCode}` JSON
//! - Merge admission headers into whatever response goes out
//! - Provide the JSON fallback for unknown routes

use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::gate::Rejection;
use crate::security::headers::X_POWERED_BY;

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// Overwrite response headers with the admission headers.
pub fn apply_headers(response: &mut Response, headers: HeaderMap, hide_powered_by: bool) {
    let target = response.headers_mut();
    if hide_powered_by {
        target.remove(X_POWERED_BY);
    }
    target.extend(headers);
}

/// Fallback for routes nothing else claimed.
pub async fn not_found(method: Method, uri: Uri) -> Response {
    let body = serde_json::json!({
        "message": format!("Cannot {} {}", method, uri.path()),
        "statusCode": StatusCode::NOT_FOUND.as_u16(),
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn rejection_renders_json() {
        let response = Rejection::admin_forbidden().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers()["content-type"], "application/json");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "Forbidden resource", "statusCode": 403 })
        );
    }

    #[tokio::test]
    async fn fallback_names_method_and_path() {
        let response = not_found(Method::DELETE, Uri::from_static("/nope?x=1")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Cannot DELETE /nope");
        assert_eq!(json["statusCode"], 404);
    }

    #[test]
    fn apply_headers_overwrites_and_strips() {
        let mut response = StatusCode::OK.into_response();
        response
            .headers_mut()
            .insert("x-powered-by", HeaderValue::from_static("Express"));
        response
            .headers_mut()
            .insert("x-frame-options", HeaderValue::from_static("SAMEORIGIN"));

        let mut headers = HeaderMap::new();
        headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
        apply_headers(&mut response, headers, true);

        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert!(response.headers().get("x-powered-by").is_none());
    }
}

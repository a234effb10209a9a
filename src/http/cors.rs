use crate::http::AppState;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

const ALLOWED_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";
const PREFLIGHT_MAX_AGE: &str = "600";

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn insert_allow_origin(headers: &mut HeaderMap, allow_origin: &str) {
    if let Ok(value) = HeaderValue::from_str(allow_origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    if allow_origin != "*" {
        headers.append(header::VARY, HeaderValue::from_static("origin"));
    }
}

pub async fn cors_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !state.cors.is_enabled() {
        return next.run(req).await;
    }
    let Some(origin) = header_str(req.headers(), header::ORIGIN) else {
        return next.run(req).await;
    };

    let allow_origin = state.cors.allow_origin(&origin).map(ToString::to_string);
    let is_preflight = req.method() == Method::OPTIONS
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    if is_preflight {
        let Some(allow_origin) = allow_origin else {
            tracing::debug!("Rejected CORS preflight from {}", origin);
            return (StatusCode::BAD_REQUEST, "Disallowed CORS origin").into_response();
        };

        let mut resp = StatusCode::NO_CONTENT.into_response();
        let headers = resp.headers_mut();
        insert_allow_origin(headers, &allow_origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        // 允許任何標頭：回傳請求中列出的標頭
        if let Some(requested) =
            header_str(req.headers(), header::ACCESS_CONTROL_REQUEST_HEADERS)
        {
            if let Ok(value) = HeaderValue::from_str(&requested) {
                headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, value);
            }
        }
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE),
        );
        return resp;
    }

    let mut resp = next.run(req).await;
    if let Some(allow_origin) = allow_origin {
        insert_allow_origin(resp.headers_mut(), &allow_origin);
    }
    resp
}

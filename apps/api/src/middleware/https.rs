//! Production-only redirect of plain-HTTP requests to HTTPS.

use axum::{
    extract::Request,
    http::header::HOST,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// TLS is terminated in front of the service, so the scheme comes from
/// `X-Forwarded-Proto`; a missing header means plain HTTP.
pub async fn redirect_to_https(request: Request, next: Next) -> Response {
    let is_https = request
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"));

    if is_https {
        return next.run(request).await;
    }

    let host = request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let host = host.strip_suffix(":80").unwrap_or(host);
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or("/");

    Redirect::temporary(&format!("https://{host}{path}")).into_response()
}

use crate::auth::user_id_from_headers;
use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Logs one line per request: method, path, resolved caller id, status and
/// latency. The caller id comes from the same header the `AuthedUser`
/// extractor reads, so log lines can be correlated with a user's threads.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let user = user_id_from_headers(req.headers()).unwrap_or_else(|| "anonymous".to_string());
    let start = Instant::now();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        user = %user,
        status = %status,
        duration_ms = %duration.as_millis(),
        "request processed"
    );

    response
}

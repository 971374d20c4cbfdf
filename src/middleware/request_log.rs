use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::utils::logger::LOGGER;

/// Logs method, path, status and latency of every request.
pub async fn request_log(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start_time = Instant::now();

    let response = next.run(request).await;

    LOGGER.log_request(
        &method,
        &path,
        response.status().as_u16(),
        start_time.elapsed().as_millis(),
    );
    response
}

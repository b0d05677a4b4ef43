use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{FixedOffset, Offset, Utc};
use contracts::shared::format::format_grouped;

/// Korea Standard Time, used for request log timestamps
fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix())
}

/// Middleware logging every request: time, duration, body size, status, method, path.
///
/// The response body is buffered to learn its real size.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();
    let timestamp = Utc::now().with_timezone(&kst());

    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(
                time = %timestamp.format("%H:%M:%S"),
                duration_ms = start.elapsed().as_millis() as u64,
                status = parts.status.as_u16(),
                %method,
                path = uri.path(),
                "failed to read response body: {}",
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    let size = format_grouped(bytes.len() as f64, 0);
    let duration_ms = start.elapsed().as_millis() as u64;
    if parts.status.is_success() {
        tracing::info!(
            time = %timestamp.format("%H:%M:%S"),
            duration_ms,
            size = %size,
            status = parts.status.as_u16(),
            %method,
            path = uri.path(),
            "request"
        );
    } else {
        tracing::warn!(
            time = %timestamp.format("%H:%M:%S"),
            duration_ms,
            size = %size,
            status = parts.status.as_u16(),
            %method,
            path = uri.path(),
            "request"
        );
    }

    Response::from_parts(parts, Body::from(bytes))
}

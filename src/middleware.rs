//! HTTP request tracking middleware

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use std::time::Instant;

/// Record latency and count for every request
pub async fn track_metrics(req: Request, next: Next) -> Result<Response, StatusCode> {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    crate::metrics::HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);

    crate::metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    Ok(response)
}

/// Known routes keep their path; anything else collapses to one label so
/// scanners probing random URLs cannot blow up label cardinality.
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    let trimmed = if trimmed.is_empty() { "/" } else { trimmed };

    match trimmed {
        "/" | "/health" | "/health/live" | "/health/ready" | "/metrics" => trimmed.to_string(),
        p if p.starts_with("/api/coverage/")
            && p["/api/coverage/".len()..]
                .chars()
                .all(|c| c.is_ascii_lowercase()) =>
        {
            p.to_string()
        }
        _ => "/{other}".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/api/coverage/matrix"), "/api/coverage/matrix");
        assert_eq!(normalize_path("/api/coverage/filters/"), "/api/coverage/filters");
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
        assert_eq!(normalize_path("/wp-admin/setup.php"), "/{other}");
        assert_eq!(normalize_path("/api/coverage/../etc"), "/{other}");
    }
}

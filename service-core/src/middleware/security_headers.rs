use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Paths rendered in a browser: the landing page, its assets, uploaded files.
fn is_browser_route(path: &str) -> bool {
    path == "/" || path.starts_with("/static/") || path.starts_with("/uploads/")
}

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let browser_route = is_browser_route(req.uri().path());

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );

    if browser_route {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; \
                 script-src 'self'; \
                 style-src 'self' 'unsafe-inline'; \
                 img-src 'self' data: blob:; \
                 connect-src 'self'; \
                 frame-ancestors 'none'",
            ),
        );
    } else {
        // JSON-only routes never load subresources
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::is_browser_route;

    #[test]
    fn classifies_routes() {
        assert!(is_browser_route("/"));
        assert!(is_browser_route("/static/js/script.js"));
        assert!(is_browser_route("/uploads/cat.png"));
        assert!(!is_browser_route("/chat"));
        assert!(!is_browser_route("/health"));
    }
}

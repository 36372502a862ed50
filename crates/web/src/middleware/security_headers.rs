//! Security headers middleware.
//!
//! Every response gets a locked-down header set. Pages only load first-party
//! styles and images (including uploaded profile pictures under `/media`), and
//! forms post back to this origin.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'none'; \
     script-src 'self'; \
     style-src 'self'; \
     img-src 'self'; \
     font-src 'self'; \
     connect-src 'self'; \
     object-src 'none'; \
     base-uri 'self'; \
     form-action 'self'; \
     frame-ancestors 'none'";

const PERMISSIONS_POLICY_VALUE: &str =
    "camera=(), geolocation=(), microphone=(), payment=(), usb=(), interest-cohort=()";

/// Add security headers to all responses.
///
/// Responses outside `/static` and `/media` are additionally marked
/// `Cache-Control: no-store` since they contain per-user order data.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let cacheable = is_public_asset(request.uri().path());

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(PERMISSIONS_POLICY_VALUE),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    if !cacheable {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    response
}

fn is_public_asset(path: &str) -> bool {
    path.starts_with("/static/") || path.starts_with("/media/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_asset_paths() {
        assert!(is_public_asset("/static/css/main.css"));
        assert!(is_public_asset("/media/profile1.png"));
        assert!(!is_public_asset("/customer/1/"));
        assert!(!is_public_asset("/mediafile"));
    }
}

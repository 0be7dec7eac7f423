//! API layer - HTTP entry points.

pub mod http;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

/// Build the CORS layer from a configured origin list.
///
/// `None` or an empty list disables CORS, `"*"` allows any origin, anything
/// else is a comma-separated list of origins. Unparseable origins are skipped.
pub fn cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins.map(str::trim).filter(|s| !s.is_empty())?;

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ])
        // JSON bodies and bearer tokens both trigger preflights.
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_without_origins() {
        assert!(cors_layer(None).is_none());
        assert!(cors_layer(Some("  ")).is_none());
        assert!(cors_layer(Some(" , ,")).is_none());
    }

    #[test]
    fn enabled_for_wildcard_and_lists() {
        assert!(cors_layer(Some("*")).is_some());
        assert!(cors_layer(Some("http://localhost:5173, https://whatif.example")).is_some());
    }
}

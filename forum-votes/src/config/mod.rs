//! Configuration module for the Forum Votes service.
//! Defines the service settings, CORS policy and dependency wiring.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{LogFormat, Settings, StorageBackend};

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

use crate::errors::ServerError;

/// Create the CORS layer allowing the configured origins.
///
/// The identity header is allowed so browser clients behind the gateway can send it.
pub fn create_cors_layer(settings: &Settings) -> Result<CorsLayer, ServerError> {
    let origins = settings
        .cors_allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| ServerError::invalid("CORS_ALLOWED_ORIGINS", origin.as_str()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let identity_header = settings
        .user_id_header
        .parse::<HeaderName>()
        .map_err(|_| ServerError::invalid("USER_ID_HEADER", settings.user_id_header.as_str()))?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, identity_header]))
}

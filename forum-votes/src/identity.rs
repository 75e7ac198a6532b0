//! Resolution of the caller's identity.
//!
//! Authentication happens upstream. The service trusts whatever identity the
//! provider returns.
use axum::http::HeaderMap;
use forum_votes_shared::types::UserIdentity;
use tracing::debug;
use uuid::Uuid;

/// Supplies the identity of the caller of a request.
pub trait IdentityProvider: Send + Sync {
    /// Returns the verified caller, `None` if the request is anonymous.
    fn current_user(&self, headers: &HeaderMap) -> Option<UserIdentity>;
}

/// Reads the caller's user id from a header set by the auth gateway.
#[derive(Debug, Clone)]
pub struct HeaderIdentityProvider {
    header: String,
}

impl HeaderIdentityProvider {
    pub fn new(header: impl Into<String>) -> Self {
        Self { header: header.into() }
    }
}

impl IdentityProvider for HeaderIdentityProvider {
    fn current_user(&self, headers: &HeaderMap) -> Option<UserIdentity> {
        let raw = headers.get(self.header.as_str())?.to_str().ok()?;
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Some(UserIdentity::from(id)),
            Err(e) => {
                debug!(header = %self.header, error = %e, "Ignoring malformed identity header");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_reads_uuid_from_header() {
        let provider = HeaderIdentityProvider::new("x-user-id");
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_str(&id.to_string()).unwrap());

        assert_eq!(provider.current_user(&headers), Some(UserIdentity::from(id)));
    }

    #[test]
    fn test_missing_or_malformed_header_is_anonymous() {
        let provider = HeaderIdentityProvider::new("x-user-id");
        assert_eq!(provider.current_user(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("not-a-uuid"));
        assert_eq!(provider.current_user(&headers), None);
    }
}

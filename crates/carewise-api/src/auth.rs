use crate::error::ApiError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Identity of the caller, as established by the upstream auth layer.
///
/// This service never verifies credentials itself; the gateway in front of
/// it authenticates the user and injects the id as an `X-User-Id` header.
/// Requests without the header are rejected before any handler runs.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub String);

/// Extract the caller id from the `X-User-Id` header, if present and
/// non-blank. Shared by the extractor and the request logging middleware.
pub fn user_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_id_from_headers(&parts.headers)
            .map(AuthedUser)
            .ok_or(ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_trimmed_user_id() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("  u1  "));
        assert_eq!(user_id_from_headers(&headers), Some("u1".to_string()));
    }

    #[test]
    fn rejects_missing_header() {
        assert_eq!(user_id_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn rejects_blank_header() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("   "));
        assert_eq!(user_id_from_headers(&headers), None);
    }
}

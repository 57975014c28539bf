use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::types::RequestContext;

pub mod admin;
pub mod auth;

fn header_str(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Extract the ip/user-agent/device triple once at the boundary. Infallible:
/// absent headers degrade to empty/unknown values rather than rejecting the
/// request.
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        // First hop of x-forwarded-for is the client.
        let ip = header_str(parts, "x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|s| s.trim().to_owned()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_owned());
        let user_agent = header_str(parts, "user-agent").unwrap_or_default();
        let device = header_str(parts, "x-device-id").unwrap_or_default();

        async move {
            Ok(RequestContext {
                ip,
                user_agent,
                device,
            })
        }
    }
}

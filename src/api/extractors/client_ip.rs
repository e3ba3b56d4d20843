//! Client address of a request, as recorded with login attempts.

use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

/// First `X-Forwarded-For` hop, else the socket peer address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string);

        let peer = || {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        };

        Ok(ClientIp(forwarded.or_else(peer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> ClientIp {
        let (mut parts, _) = request.into_parts();
        ClientIp::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_forwarded_hop_wins() {
        let request = Request::builder()
            .header("x-forwarded-for", "200.1.2.3, 10.0.0.1")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await, ClientIp(Some("200.1.2.3".into())));
    }

    #[tokio::test]
    async fn test_missing_address_is_none() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(extract(request).await, ClientIp(None));
    }
}

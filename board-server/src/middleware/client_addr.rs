use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

const FALLBACK_ADDR: &str = "127.0.0.1";

/// Origin address of the caller, used as the anonymous identity for votes
/// and stored with every post and comment.
///
/// The first `X-Forwarded-For` entry wins, then the socket peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(addr) = forwarded {
            return Ok(ClientAddr(addr.to_string()));
        }

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(ClientAddr(peer.unwrap_or_else(|| FALLBACK_ADDR.to_string())))
    }
}

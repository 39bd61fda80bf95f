//! Client identification for rate limiting.
//!
//! The token is the peer address of the connection. Behind a trusted
//! proxy (`server.trust_forwarded_headers`) the first address in
//! `x-forwarded-for` wins, then `x-real-ip`, then the peer. Requests
//! with no usable address share the [`ANONYMOUS`] token.

use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::state::AppState;

/// Token shared by requests that carry no client address.
pub const ANONYMOUS: &str = "anonymous";

/// Opaque per-client rate-limit key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientToken(String);

impl ClientToken {
    /// Derive the token from the peer address, or from the forwarding
    /// headers when `trust_forwarded` is set.
    pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> Self {
        let from_peer = || {
            peer.map_or_else(
                || Self(String::from(ANONYMOUS)),
                |addr| Self(addr.ip().to_string()),
            )
        };
        if !trust_forwarded {
            return from_peer();
        }

        let forwarded = header_value(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let real_ip = || {
            header_value(headers, "x-real-ip")
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        forwarded
            .or_else(real_ip)
            .map_or_else(from_peer, |addr| Self(addr.to_owned()))
    }

    /// The token as a string key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl FromRequestParts<Arc<AppState>> for ClientToken {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::resolve(
            &parts.headers,
            peer,
            state.trust_forwarded_headers,
        ))
    }
}

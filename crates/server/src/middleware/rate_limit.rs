//! Rate limiting for credential endpoints using governor and `tower_governor`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use thiserror::Error;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Seconds to replenish one request.
const AUTH_REPLENISH_SECONDS: u64 = 6;

/// Requests allowed in a burst.
const AUTH_BURST_SIZE: u32 = 5;

/// Rate limiter settings were rejected by governor.
#[derive(Debug, Error)]
#[error("invalid rate limiter configuration")]
pub struct RateLimitConfigError;

/// Key extractor for the client IP.
///
/// Uses the socket peer address. Behind a trusted reverse proxy the
/// `X-Forwarded-For` (first hop) and `X-Real-IP` headers take precedence;
/// otherwise they are ignored, since any client can set them.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    trust_proxy: bool,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub const fn new(trust_proxy: bool) -> Self {
        Self { trust_proxy }
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    // X-Forwarded-For (first IP in the chain)
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        })
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.trust_proxy
            && let Some(ip) = forwarded_ip(req.headers())
        {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the rate limiter for signup and login: ~10 requests per minute per IP.
///
/// Replenishes one request every 6 seconds with a burst of 5, slowing
/// credential stuffing and mass account creation.
///
/// `trust_proxy` selects whether proxy headers identify the client.
///
/// # Errors
///
/// Returns `RateLimitConfigError` if governor rejects the quota.
pub fn auth_rate_limiter(trust_proxy: bool) -> Result<RateLimiterLayer, RateLimitConfigError> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trust_proxy))
        .per_second(AUTH_REPLENISH_SECONDS)
        .burst_size(AUTH_BURST_SIZE)
        .finish()
        .ok_or(RateLimitConfigError)?;
    Ok(GovernorLayer::new(Arc::new(config)))
}
